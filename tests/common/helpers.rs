#![allow(dead_code)]

use anyhow::Result;
use ffexport::engine::{
    Codec, Container, EncoderRunner, FrameProgress, Operation, SceneInfo, Settings,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Encode settings for an mp4/H.264 export from `/frames`
pub fn encode_settings() -> Settings {
    Settings {
        operation: Operation::Encode,
        container: Container::Mp4,
        codec: Codec::H264,
        frame_dir: PathBuf::from("/frames"),
        output: PathBuf::from("out.mp4"),
        ..Default::default()
    }
}

/// Reencode settings reading `in.mkv`
pub fn reencode_settings() -> Settings {
    Settings {
        operation: Operation::Reencode,
        input: PathBuf::from("in.mkv"),
        output: PathBuf::from("out.mkv"),
        ..Default::default()
    }
}

pub fn scene(fps: f64, frame_start: u32, frame_end: u32) -> SceneInfo {
    SceneInfo {
        fps,
        frame_start,
        frame_end,
    }
}

/// Settings for render mode with a stand-in encoder program
pub fn render_settings(ffmpeg: &str, output: &Path) -> Settings {
    Settings {
        operation: Operation::Render,
        ffmpeg_path: PathBuf::from(ffmpeg),
        output: output.to_path_buf(),
        ..Default::default()
    }
}

/// Renderer that writes a placeholder PNG and remembers every path it wrote
#[derive(Default)]
pub struct RecordingRenderer {
    pub paths: Vec<PathBuf>,
    /// Fail on this frame instead of writing it
    pub fail_on: Option<u32>,
}

impl ffexport::engine::FrameRenderer for RecordingRenderer {
    fn render_frame(&mut self, frame: u32, path: &Path) -> Result<()> {
        if self.fail_on == Some(frame) {
            anyhow::bail!("renderer crashed on frame {}", frame);
        }
        fs::write(path, b"\x89PNG")?;
        self.paths.push(path.to_path_buf());
        Ok(())
    }
}

impl RecordingRenderer {
    /// Directory the frames were written into
    pub fn frame_dir(&self) -> Option<&Path> {
        self.paths.first().and_then(|p| p.parent())
    }
}

pub fn quiet_runner() -> EncoderRunner {
    EncoderRunner::capturing()
}

pub fn ignore_progress() -> impl FnMut(FrameProgress) {
    |_| {}
}

/// Write an executable shell script standing in for ffmpeg.
///
/// It records its arguments (one per line) to `<dir>/args.txt`, lists the
/// folder behind the `-i` pattern into `<dir>/frames.txt`, then exits with `code`.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, code: i32) -> PathBuf {
    let on_input = format!(
        r#"ls "$(dirname "$a")" > "{}""#,
        dir.join("frames.txt").display()
    );
    write_fake_ffmpeg(dir, code, &on_input)
}

/// Like `fake_ffmpeg`, but deletes the folder behind the `-i` pattern
/// so removing it afterwards fails.
#[cfg(unix)]
pub fn fake_ffmpeg_removing_frames(dir: &Path, code: i32) -> PathBuf {
    write_fake_ffmpeg(dir, code, r#"rm -rf "$(dirname "$a")""#)
}

#[cfg(unix)]
fn write_fake_ffmpeg(dir: &Path, code: i32, on_input: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-ffmpeg.sh");
    let body = format!(
        r#"#!/bin/sh
printf '%s\n' "$@" > "{args}"
prev=""
for a in "$@"; do
  if [ "$prev" = "-i" ]; then {on_input}; fi
  prev="$a"
done
exit {code}
"#,
        args = dir.join("args.txt").display(),
        on_input = on_input,
        code = code,
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Lines recorded by `fake_ffmpeg`
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
