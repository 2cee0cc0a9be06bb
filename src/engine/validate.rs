//! Rule checks for settings before building an ffmpeg command.

use crate::engine::core::{Operation, SceneInfo, Settings, valid_codecs, valid_depths};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate settings and scene timing. Returns every problem found.
pub fn validate_settings(
    settings: &Settings,
    scene: &SceneInfo,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Dependent options only matter when the container carries a codec
    if !settings.container.is_gif() {
        if !valid_codecs(settings.container).contains(&settings.codec) {
            errors.push(err(
                "codec",
                format!(
                    "{} cannot be stored in {}",
                    settings.codec,
                    settings.container.label()
                ),
            ));
        } else if !valid_depths(settings.codec).contains(&settings.bit_depth) {
            errors.push(err(
                "bit_depth",
                format!("{} is not available for {}", settings.bit_depth, settings.codec),
            ));
        }

        if settings.constant_bitrate {
            let rate = &settings.bitrate;
            if rate.max_kbps > 0 && rate.min_kbps > rate.max_kbps {
                errors.push(err(
                    "bitrate.min_kbps",
                    format!(
                        "minimum bitrate {}k exceeds maximum {}k",
                        rate.min_kbps, rate.max_kbps
                    ),
                ));
            }
        } else if settings.crf > 51 {
            errors.push(err("crf", format!("must be 0-51, got {}", settings.crf)));
        }
    }

    if settings.ffmpeg_path.as_os_str().is_empty() {
        errors.push(err("ffmpeg_path", "must not be empty"));
    }
    if settings.output.as_os_str().is_empty() {
        errors.push(err("output", "must not be empty"));
    }

    match settings.operation {
        Operation::Reencode => {
            if settings.input.as_os_str().is_empty() {
                errors.push(err("input", "required for reencode"));
            }
        }
        Operation::Encode => {
            if settings.frame_dir.as_os_str().is_empty() {
                errors.push(err("frame_dir", "required for encode"));
            }
        }
        Operation::Render => {
            if settings.store_frames && settings.frame_dir.as_os_str().is_empty() {
                errors.push(err("frame_dir", "required when storing frames"));
            }
        }
    }

    // -r is emitted in every mode
    if !(scene.fps.is_finite() && scene.fps > 0.0) {
        errors.push(err("fps", format!("must be positive, got {}", scene.fps)));
    }
    if settings.operation != Operation::Reencode && scene.frame_start > scene.frame_end {
        errors.push(err(
            "frame_start",
            format!(
                "start frame {} is after end frame {}",
                scene.frame_start, scene.frame_end
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn err(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}
