use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// Check if ffmpeg is available and return its version line
pub fn ffmpeg_version(ffmpeg_path: &Path) -> Result<String> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .output()
        .with_context(|| {
            format!(
                "Failed to execute {}. Is ffmpeg installed and in PATH?",
                ffmpeg_path.display()
            )
        })?;

    if !output.status.success() {
        anyhow::bail!("ffmpeg command failed with status: {}", output.status);
    }

    Ok(parse_version_line(&String::from_utf8_lossy(&output.stdout)))
}

/// Check whether this ffmpeg build lists the given encoder (e.g. "libaom-av1")
pub fn encoder_available(ffmpeg_path: &Path, encoder: &str) -> bool {
    let output = Command::new(ffmpeg_path)
        .arg("-hide_banner")
        .arg("-encoders")
        .output();

    match output {
        Ok(out) if out.status.success() => {
            list_has_encoder(&String::from_utf8_lossy(&out.stdout), encoder)
        }
        _ => false,
    }
}

fn parse_version_line(stdout: &str) -> String {
    stdout
        .lines()
        .next()
        .unwrap_or("Unknown version")
        .to_string()
}

/// Encoder listing lines look like ` V....D libx264   libx264 H.264 / AVC ...`
fn list_has_encoder(listing: &str, encoder: &str) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(encoder))
}
