//! Synchronous encoder invocation.
//!
//! The argument vector is handed to the OS as-is (no shell), the caller is
//! blocked until the encoder exits, and a nonzero exit becomes
//! `EncodeError::EncoderExit` carrying the code and the full vector.

use super::error::EncodeError;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// Lines of stderr kept for the error report
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct EncoderRunner {
    /// Collect stderr instead of letting it through to the terminal.
    /// The last lines are attached to exit failures.
    pub capture_stderr: bool,
}

impl EncoderRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capturing() -> Self {
        Self {
            capture_stderr: true,
        }
    }

    /// Run `args[0]` with `args[1..]` and wait for it to exit
    pub fn run(&self, args: &[String]) -> Result<(), EncodeError> {
        let Some((program, rest)) = args.split_first() else {
            return Err(EncodeError::EncoderNotFound {
                path: PathBuf::new(),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(rest);
        cmd.stdin(Stdio::null());
        if self.capture_stderr {
            cmd.stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|source| launch_error(program, source))?;
        debug!(pid = child.id(), program = %program, "Encoder started");

        let stderr_thread = child.stderr.take().map(|stderr| {
            std::thread::spawn(move || {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                let reader = BufReader::new(stderr);
                for line in reader.lines().map_while(Result::ok) {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                Vec::from(tail).join("\n")
            })
        });

        let status = child.wait().map_err(|source| wait_error(program, source))?;

        let stderr_tail = stderr_thread.and_then(|handle| handle.join().ok());
        if let Some(tail) = stderr_tail.as_deref().filter(|t| !t.is_empty()) {
            debug!("ffmpeg stderr:\n{}", tail);
        }

        check_status(status, args, stderr_tail)
    }
}

fn launch_error(program: &str, source: io::Error) -> EncodeError {
    let path = PathBuf::from(program);
    if source.kind() == io::ErrorKind::NotFound {
        EncodeError::EncoderNotFound { path }
    } else {
        EncodeError::EncoderLaunch { path, source }
    }
}

fn wait_error(program: &str, source: io::Error) -> EncodeError {
    EncodeError::EncoderWait {
        path: PathBuf::from(program),
        source,
    }
}

fn check_status(
    status: ExitStatus,
    args: &[String],
    stderr_tail: Option<String>,
) -> Result<(), EncodeError> {
    if status.success() {
        debug!("Encoder finished successfully");
        return Ok(());
    }

    Err(EncodeError::EncoderExit {
        code: status.code(),
        args: args.to_vec(),
        stderr_tail: stderr_tail.filter(|t| !t.is_empty()),
    })
}

/// Run the encoder with stderr passed through to the terminal
pub fn run_encoder(args: &[String]) -> Result<(), EncodeError> {
    EncoderRunner::new().run(args)
}
