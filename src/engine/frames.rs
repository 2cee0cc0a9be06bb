// Frame production for render mode

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::core::{
    EncodeError, EncoderRunner, SceneInfo, Settings, encode, frame_path, split_additional_args,
};

/// Host-side renderer: produces exactly one PNG per call.
///
/// `path` always ends in `<frame:05>.png`; implementations must write PNG there
/// regardless of the project's usual output format and return an error if the
/// frame could not be produced.
pub trait FrameRenderer {
    fn render_frame(&mut self, frame: u32, path: &Path) -> Result<()>;
}

impl<F> FrameRenderer for F
where
    F: FnMut(u32, &Path) -> Result<()>,
{
    fn render_frame(&mut self, frame: u32, path: &Path) -> Result<()> {
        self(frame, path)
    }
}

/// Progress update sent after every rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameProgress {
    pub frame: u32,
    pub done: u32,
    pub total: u32,
}

impl FrameProgress {
    pub fn pct(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.done as f64 / self.total as f64 * 100.0
    }
}

/// Renders frames by running an external command once per frame.
///
/// The template is split with shell quoting rules; `{frame}`, `{frame:05}` and
/// `{output}` are substituted in every token, e.g.
/// `blender -b scene.blend -o {output} -F PNG -f {frame}`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    template: Vec<String>,
    /// Send the render command's stdout/stderr to null
    pub quiet: bool,
}

impl CommandRenderer {
    pub fn new(template: &str) -> Result<Self> {
        let template = split_additional_args(template);
        if template.is_empty() {
            anyhow::bail!("Render command is empty");
        }
        Ok(Self {
            template,
            quiet: false,
        })
    }

    /// Expand the template for one frame
    pub fn command_for(&self, frame: u32, path: &Path) -> Vec<String> {
        let output = path.to_string_lossy();
        self.template
            .iter()
            .map(|token| {
                token
                    .replace("{frame:05}", &format!("{:05}", frame))
                    .replace("{frame}", &frame.to_string())
                    .replace("{output}", &output)
            })
            .collect()
    }
}

impl FrameRenderer for CommandRenderer {
    fn render_frame(&mut self, frame: u32, path: &Path) -> Result<()> {
        let argv = self.command_for(frame, path);
        let (program, rest) = argv
            .split_first()
            .context("Render command is empty")?;

        let mut cmd = Command::new(program);
        cmd.args(rest).stdin(Stdio::null());
        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run render command '{}'", program))?;
        if !status.success() {
            anyhow::bail!("Render command exited with status: {}", status);
        }
        Ok(())
    }
}

/// Where frames go for one render run
enum FrameDir {
    /// Removed after encoding
    Temporary(TempDir),
    /// User-chosen, left intact
    Retained(PathBuf),
}

impl FrameDir {
    fn prepare(settings: &Settings) -> Result<Self, EncodeError> {
        if settings.store_frames {
            fs::create_dir_all(&settings.frame_dir)
                .map_err(|source| EncodeError::FrameDir { source })?;
            Ok(FrameDir::Retained(settings.frame_dir.clone()))
        } else {
            let dir = tempfile::Builder::new()
                .prefix("ffexport-frames-")
                .tempdir()
                .map_err(|source| EncodeError::FrameDir { source })?;
            Ok(FrameDir::Temporary(dir))
        }
    }

    fn path(&self) -> &Path {
        match self {
            FrameDir::Temporary(dir) => dir.path(),
            FrameDir::Retained(path) => path,
        }
    }

    /// Remove a temporary directory. Errors are returned, not raised.
    fn finish(self) -> Option<EncodeError> {
        match self {
            FrameDir::Retained(_) => None,
            FrameDir::Temporary(dir) => {
                let path = dir.path().to_path_buf();
                match dir.close() {
                    Ok(()) => {
                        debug!(dir = %path.display(), "Removed temporary frames");
                        None
                    }
                    Err(source) => Some(EncodeError::Cleanup { path, source }),
                }
            }
        }
    }
}

/// Render every frame of the scene into `frame_dir`, one at a time.
///
/// `on_progress` runs between frames, before the next render starts.
pub fn render_frames(
    renderer: &mut dyn FrameRenderer,
    scene: &SceneInfo,
    frame_dir: &Path,
    on_progress: &mut dyn FnMut(FrameProgress),
) -> Result<u32, EncodeError> {
    let total = scene.frame_count();
    let mut done = 0;

    for frame in scene.frame_start..=scene.frame_end {
        let path = frame_path(frame_dir, frame);
        renderer
            .render_frame(frame, &path)
            .map_err(|source| EncodeError::Render { frame, source })?;

        if !path.is_file() {
            return Err(EncodeError::Render {
                frame,
                source: anyhow::anyhow!("renderer did not write {}", path.display()),
            });
        }

        done += 1;
        on_progress(FrameProgress { frame, done, total });
    }

    Ok(done)
}

/// Result of a finished render / encode / reencode
#[derive(Debug, Default)]
pub struct RenderSummary {
    pub frames_rendered: u32,
    /// Set when frames were stored in the user's directory
    pub retained_frame_dir: Option<PathBuf>,
    /// Temporary directory removal failed; the encode itself succeeded
    pub cleanup_warning: Option<EncodeError>,
    /// The encoder argument vector that ran
    pub args: Vec<String>,
}

/// Render the scene to PNG frames, encode them, then clean up.
///
/// The temporary directory is removed whether rendering or encoding fails;
/// a removal failure never replaces the primary error.
pub fn render_and_encode(
    settings: &Settings,
    scene: &SceneInfo,
    renderer: &mut dyn FrameRenderer,
    runner: &EncoderRunner,
    on_progress: &mut dyn FnMut(FrameProgress),
) -> Result<RenderSummary, EncodeError> {
    let frame_dir = FrameDir::prepare(settings)?;
    info!(
        dir = %frame_dir.path().display(),
        frames = scene.frame_count(),
        "Rendering frames"
    );

    let result = render_frames(renderer, scene, frame_dir.path(), on_progress).and_then(
        |frames_rendered| {
            let encode_settings = Settings {
                frame_dir: frame_dir.path().to_path_buf(),
                ..settings.clone()
            };
            encode(&encode_settings, scene, runner).map(|args| (frames_rendered, args))
        },
    );

    let retained_frame_dir = match &frame_dir {
        FrameDir::Retained(path) => Some(path.clone()),
        FrameDir::Temporary(_) => None,
    };
    let cleanup_warning = frame_dir.finish();
    if let Some(err) = &cleanup_warning {
        warn!("{}", error_chain(err));
    }

    let (frames_rendered, args) = result?;
    Ok(RenderSummary {
        frames_rendered,
        retained_frame_dir,
        cleanup_warning,
        args,
    })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
