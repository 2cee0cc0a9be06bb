use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the encoder's input comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Render the scene to numbered frames, then encode them
    #[default]
    Render,
    /// Encode an already rendered series of frames
    Encode,
    /// Reencode an existing video file
    Reencode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    Matroska,
    Mp4,
    Webm,
    Gif,
}

pub const CONTAINERS: &[Container] = &[
    Container::Matroska,
    Container::Mp4,
    Container::Webm,
    Container::Gif,
];

impl Container {
    /// Value passed to `-f`
    pub fn ffmpeg_format(self) -> &'static str {
        match self {
            Container::Matroska => "matroska",
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
            Container::Gif => "gif",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Container::Matroska => "Matroska",
            Container::Mp4 => "MPEG-4",
            Container::Webm => "WebM",
            Container::Gif => "GIF",
        }
    }

    /// GIF output is governed by the container alone: no codec, rate control or pixel format
    pub fn is_gif(self) -> bool {
        self == Container::Gif
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    H264,
    H265,
    Av1,
    Vp9,
}

pub const CODECS: &[Codec] = &[Codec::H264, Codec::H265, Codec::Av1, Codec::Vp9];

impl Codec {
    /// Encoder name passed to `-c:v`
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Codec::H264 => "libx264",
            Codec::H265 => "libx265",
            Codec::Av1 => "libaom-av1",
            Codec::Vp9 => "libvpx-vp9",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Codec::H264 => "H.264",
            Codec::H265 => "H.265",
            Codec::Av1 => "AV1",
            Codec::Vp9 => "VP9",
        }
    }

    /// Flag and value for the encoder speed knob.
    ///
    /// x264/x265 take the preset name. libvpx-vp9 and libaom-av1 take `-cpu-used`
    /// on their own numeric scales (VP9: 6/3/0, AV1: 8/5/2).
    pub fn speed_args(self, preset: Preset) -> (&'static str, String) {
        match self {
            Codec::H264 | Codec::H265 => ("-preset", preset.x26x_name().to_string()),
            Codec::Vp9 => {
                let cpu_used = match preset {
                    Preset::Fast => 6,
                    Preset::Balanced => 3,
                    Preset::Slow => 0,
                };
                ("-cpu-used", cpu_used.to_string())
            }
            Codec::Av1 => {
                let cpu_used = match preset {
                    Preset::Fast => 8,
                    Preset::Balanced => 5,
                    Preset::Slow => 2,
                };
                ("-cpu-used", cpu_used.to_string())
            }
        }
    }
}

/// Output pixel format bit depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum BitDepth {
    #[default]
    #[serde(rename = "8")]
    #[value(name = "8")]
    Eight,
    #[serde(rename = "10")]
    #[value(name = "10")]
    Ten,
    #[serde(rename = "12")]
    #[value(name = "12")]
    Twelve,
}

pub const BIT_DEPTHS: &[BitDepth] = &[BitDepth::Eight, BitDepth::Ten, BitDepth::Twelve];

impl BitDepth {
    pub fn pix_fmt(self) -> &'static str {
        match self {
            BitDepth::Eight => "yuv420p",
            BitDepth::Ten => "yuv420p10le",
            BitDepth::Twelve => "yuv420p12le",
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Ten => 10,
            BitDepth::Twelve => 12,
        }
    }
}

/// Encoding speed. Slower presets trade time for smaller files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Fast,
    #[default]
    Balanced,
    Slow,
}

impl Preset {
    /// x264/x265 preset name
    pub fn x26x_name(self) -> &'static str {
        match self {
            Preset::Fast => "veryfast",
            Preset::Balanced => "medium",
            Preset::Slow => "veryslow",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Render => "render",
            Operation::Encode => "encode",
            Operation::Reencode => "reencode",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ffmpeg_format())
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Codecs the container can carry, in display order
pub fn valid_codecs(container: Container) -> &'static [Codec] {
    match container {
        Container::Webm => &CODECS[2..],
        Container::Mp4 => &CODECS[..3],
        Container::Matroska | Container::Gif => CODECS,
    }
}

/// Bit depths the codec's encoder is exposed with
pub fn valid_depths(codec: Codec) -> &'static [BitDepth] {
    match codec {
        Codec::Av1 => &BIT_DEPTHS[..1],
        Codec::H264 => &BIT_DEPTHS[..2],
        Codec::H265 | Codec::Vp9 => BIT_DEPTHS,
    }
}
