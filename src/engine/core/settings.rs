use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{BitDepth, Codec, Container, Operation, Preset, valid_codecs, valid_depths};

// Defaults match what a fresh project starts with
fn default_crf() -> u8 {
    23
}
fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}
fn default_media_file() -> PathBuf {
    PathBuf::from("myFile.mkv")
}
fn default_frame_dir() -> PathBuf {
    PathBuf::from("./myFrames")
}
fn default_target_kbps() -> u32 {
    6000
}
fn default_max_kbps() -> u32 {
    9000
}
fn default_buffer_kb() -> u32 {
    1792
}
fn default_mux_rate_kbps() -> u32 {
    10080
}
fn default_mux_packet_bytes() -> u32 {
    2048
}
fn default_fps() -> f64 {
    24.0
}
fn default_frame_start() -> u32 {
    1
}
fn default_frame_end() -> u32 {
    250
}

/// Constrained bitrate parameters (used when `constant_bitrate` is on)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitrateSettings {
    #[serde(default = "default_target_kbps")]
    pub target_kbps: u32,
    #[serde(default)]
    pub min_kbps: u32,
    #[serde(default = "default_max_kbps")]
    pub max_kbps: u32,
    #[serde(default = "default_buffer_kb")]
    pub buffer_kb: u32,
    #[serde(default = "default_mux_rate_kbps")]
    pub mux_rate_kbps: u32,
    /// Raw byte count, passed to `-pkt_size` without a unit suffix
    #[serde(default = "default_mux_packet_bytes")]
    pub mux_packet_bytes: u32,
}

impl Default for BitrateSettings {
    fn default() -> Self {
        Self {
            target_kbps: default_target_kbps(),
            min_kbps: 0,
            max_kbps: default_max_kbps(),
            buffer_kb: default_buffer_kb(),
            mux_rate_kbps: default_mux_rate_kbps(),
            mux_packet_bytes: default_mux_packet_bytes(),
        }
    }
}

/// User-chosen export settings, persisted per project.
///
/// Both the CRF value and the bitrate block are kept regardless of which one
/// `constant_bitrate` selects, so toggling the mode never loses values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub operation: Operation,
    #[serde(default)]
    pub container: Container,
    #[serde(default)]
    pub codec: Codec,
    #[serde(default)]
    pub bit_depth: BitDepth,
    #[serde(default)]
    pub preset: Preset,

    // Rate control
    #[serde(default)]
    pub constant_bitrate: bool,
    #[serde(default = "default_crf")]
    pub crf: u8, // 0-51
    #[serde(default)]
    pub bitrate: BitrateSettings,

    // Paths
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_media_file")]
    pub input: PathBuf,
    #[serde(default = "default_media_file")]
    pub output: PathBuf,
    #[serde(default = "default_frame_dir")]
    pub frame_dir: PathBuf,

    /// Extra ffmpeg arguments, split with shell quoting rules
    #[serde(default)]
    pub extra_args: String,

    /// Keep rendered frames in `frame_dir` instead of a temporary directory
    #[serde(default)]
    pub store_frames: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            operation: Operation::default(),
            container: Container::default(),
            codec: Codec::default(),
            bit_depth: BitDepth::default(),
            preset: Preset::default(),
            constant_bitrate: false,
            crf: default_crf(),
            bitrate: BitrateSettings::default(),
            ffmpeg_path: default_ffmpeg_path(),
            input: default_media_file(),
            output: default_media_file(),
            frame_dir: default_frame_dir(),
            extra_args: String::new(),
            store_frames: false,
        }
    }
}

/// A choice that `Settings::normalize` had to replace
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    Codec { from: Codec, to: Codec },
    BitDepth { from: BitDepth, to: BitDepth },
}

impl std::fmt::Display for Adjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Adjustment::Codec { from, to } => {
                write!(f, "codec {} not available, using {}", from, to)
            }
            Adjustment::BitDepth { from, to } => {
                write!(f, "bit depth {} not available, using {}", from, to)
            }
        }
    }
}

impl Settings {
    /// Replace a codec or bit depth that the current container/codec does not
    /// allow with the first allowed choice. GIF output leaves both untouched.
    pub fn normalize(&mut self) -> Vec<Adjustment> {
        let mut adjustments = Vec::new();
        if self.container.is_gif() {
            return adjustments;
        }

        let codecs = valid_codecs(self.container);
        if !codecs.contains(&self.codec) {
            let to = codecs[0];
            adjustments.push(Adjustment::Codec {
                from: self.codec,
                to,
            });
            self.codec = to;
        }

        let depths = valid_depths(self.codec);
        if !depths.contains(&self.bit_depth) {
            let to = depths[0];
            adjustments.push(Adjustment::BitDepth {
                from: self.bit_depth,
                to,
            });
            self.bit_depth = to;
        }

        adjustments
    }

    /// Load project settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Save project settings as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }
}

/// Timing sourced from the host project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneInfo {
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_frame_start")]
    pub frame_start: u32,
    #[serde(default = "default_frame_end")]
    pub frame_end: u32, // inclusive
}

impl Default for SceneInfo {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            frame_start: default_frame_start(),
            frame_end: default_frame_end(),
        }
    }
}

impl SceneInfo {
    /// Number of frames in the inclusive range (0 if the range is inverted)
    pub fn frame_count(&self) -> u32 {
        if self.frame_end < self.frame_start {
            0
        } else {
            (self.frame_end - self.frame_start).saturating_add(1)
        }
    }
}
