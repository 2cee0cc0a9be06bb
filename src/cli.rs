use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ffexport::engine::{BitDepth, Codec, Container, Operation, Preset};

#[derive(Parser)]
#[command(name = "ffexport")]
#[command(about = "Render frames or reencode video through an external FFmpeg", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors, and hide ffmpeg's own output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the scene frame by frame with a render command, then encode the frames
    Render {
        /// Command that renders one frame; {frame}, {frame:05} and {output} are substituted
        #[arg(long, value_name = "TEMPLATE")]
        render_cmd: String,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Encode an already rendered series of numbered PNG frames
    Encode {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Reencode an input video with custom parameters
    Reencode {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show the ffmpeg command for an operation without executing it
    DryRun {
        /// Operation to build the command for
        #[arg(value_enum)]
        operation: Operation,

        /// Print the argument vector as a JSON array
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// List codecs and bit depths available for each container
    Codecs {
        /// Only show this container
        #[arg(long, value_enum)]
        container: Option<Container>,
    },

    /// Check if ffmpeg is installed and which encoders it provides
    CheckFfmpeg {
        /// Path to the ffmpeg binary (defaults to the configured path)
        #[arg(long)]
        ffmpeg: Option<PathBuf>,
    },

    /// Print the merged settings as TOML
    ShowSettings {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Write the merged settings to a project settings file
    SaveSettings {
        /// Destination TOML file
        file: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,
}

/// Overrides on top of the config defaults and the project settings file
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Project settings file (TOML)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Output file with extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input video (reencode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Folder holding numbered frames
    #[arg(long)]
    pub frame_dir: Option<PathBuf>,

    /// Keep rendered frames in --frame-dir instead of a temporary folder
    #[arg(long)]
    pub store_frames: bool,

    /// Path to the ffmpeg binary
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub container: Option<Container>,

    #[arg(long, value_enum)]
    pub codec: Option<Codec>,

    #[arg(long, value_enum)]
    pub bit_depth: Option<BitDepth>,

    /// Encoding speed; faster means larger files
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Constant rate factor (0-51)
    #[arg(long, conflicts_with = "constant_bitrate")]
    pub crf: Option<u8>,

    /// Use constrained bitrate instead of CRF
    #[arg(long)]
    pub constant_bitrate: bool,

    /// Target video bitrate (kbit/s)
    #[arg(long, value_name = "KBPS")]
    pub bitrate: Option<u32>,

    /// Minimum bitrate (kbit/s)
    #[arg(long, value_name = "KBPS")]
    pub min_bitrate: Option<u32>,

    /// Maximum bitrate (kbit/s)
    #[arg(long, value_name = "KBPS")]
    pub max_bitrate: Option<u32>,

    /// Buffer size (kbit)
    #[arg(long, value_name = "KB")]
    pub buffer: Option<u32>,

    /// Mux rate (kbit/s)
    #[arg(long, value_name = "KBPS")]
    pub mux_rate: Option<u32>,

    /// Mux packet size (bytes)
    #[arg(long, value_name = "BYTES")]
    pub mux_packet: Option<u32>,

    /// Additional ffmpeg parameters, shell-quoted (e.g. '-vf "scale=1280:-1"')
    #[arg(long, allow_hyphen_values = true)]
    pub params: Option<String>,

    /// Frame rate of the scene
    #[arg(long)]
    pub fps: Option<f64>,

    /// First frame to render / encode
    #[arg(long)]
    pub frame_start: Option<u32>,

    /// Last frame to render (inclusive)
    #[arg(long)]
    pub frame_end: Option<u32>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
