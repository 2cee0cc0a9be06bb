// Dispatch of the three export operations

use tracing::info;

use super::core::{EncodeError, EncoderRunner, Operation, SceneInfo, Settings, encode};
use super::frames::{FrameProgress, FrameRenderer, RenderSummary, render_and_encode};

/// Run whatever `settings.operation` asks for.
///
/// Render needs a renderer; encode and reencode check that their input
/// exists before ffmpeg is started.
pub fn run_operation(
    settings: &Settings,
    scene: &SceneInfo,
    renderer: Option<&mut dyn FrameRenderer>,
    runner: &EncoderRunner,
    on_progress: &mut dyn FnMut(FrameProgress),
) -> Result<RenderSummary, EncodeError> {
    info!(operation = %settings.operation, "Starting export");

    match settings.operation {
        Operation::Render => {
            let renderer = renderer.ok_or(EncodeError::RendererMissing)?;
            render_and_encode(settings, scene, renderer, runner, on_progress)
        }
        Operation::Encode => {
            if !settings.frame_dir.is_dir() {
                return Err(EncodeError::FrameDirMissing {
                    path: settings.frame_dir.clone(),
                });
            }
            let args = encode(settings, scene, runner)?;
            Ok(RenderSummary {
                retained_frame_dir: Some(settings.frame_dir.clone()),
                args,
                ..Default::default()
            })
        }
        Operation::Reencode => {
            if !settings.input.exists() {
                return Err(EncodeError::InputMissing {
                    path: settings.input.clone(),
                });
            }
            let args = encode(settings, scene, runner)?;
            Ok(RenderSummary {
                args,
                ..Default::default()
            })
        }
    }
}
