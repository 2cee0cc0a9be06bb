use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// dry-run output. `RUST_LOG` directives are combined with `level`.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level.parse()?);
    let stderr = fmt::Layer::new()
        .with_ansi(std::io::stderr().is_terminal())
        .with_timer(LocalTimer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr).try_init()?;
    Ok(())
}
