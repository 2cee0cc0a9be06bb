mod error;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod process;
mod settings;
mod types;

pub use error::EncodeError;
pub use ffmpeg_cmd::{
    build_ffmpeg_args, encode, format_ffmpeg_cmd, frame_path, frame_pattern,
    split_additional_args,
};
pub use ffmpeg_info::{encoder_available, ffmpeg_version};
pub use process::{EncoderRunner, run_encoder};
pub use settings::{Adjustment, BitrateSettings, SceneInfo, Settings};
pub use types::{
    BIT_DEPTHS, BitDepth, CODECS, CONTAINERS, Codec, Container, Operation, Preset, valid_codecs,
    valid_depths,
};
