// Export engine - independent of the CLI

pub mod core;
pub mod frames;
pub mod pipeline;
pub mod validate;

pub use core::*;
pub use frames::{
    CommandRenderer, FrameProgress, FrameRenderer, RenderSummary, render_and_encode,
    render_frames,
};
pub use pipeline::run_operation;
pub use validate::{ValidationError, validate_settings};
