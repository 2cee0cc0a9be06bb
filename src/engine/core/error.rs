use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::ffmpeg_cmd::format_ffmpeg_cmd;

/// Failures of a render / encode / reencode operation
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("ffmpeg not found at '{}'", path.display())]
    EncoderNotFound { path: PathBuf },

    #[error("Failed to launch ffmpeg at '{}'", path.display())]
    EncoderLaunch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for ffmpeg at '{}'", path.display())]
    EncoderWait {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ffmpeg exited with {}: {}", describe_code(*code), format_ffmpeg_cmd(args))]
    EncoderExit {
        /// None when the process was terminated by a signal
        code: Option<i32>,
        args: Vec<String>,
        stderr_tail: Option<String>,
    },

    #[error("Failed to render frame {frame}")]
    Render {
        frame: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to remove frame directory '{}'", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create frame directory")]
    FrameDir {
        #[source]
        source: io::Error,
    },

    #[error("Frames folder '{}' does not exist", path.display())]
    FrameDirMissing { path: PathBuf },

    #[error("Input file '{}' does not exist", path.display())]
    InputMissing { path: PathBuf },

    #[error("Render operation needs a frame renderer")]
    RendererMissing,
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl EncodeError {
    /// Exit code of a failed encoder run
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            EncodeError::EncoderExit { code, .. } => *code,
            _ => None,
        }
    }
}
