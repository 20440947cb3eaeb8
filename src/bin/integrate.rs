use anyhow::Result;
use skipscrub::{history::RunLog, integrate, PipelineDirs};
use tracing_subscriber::{fmt, EnvFilter};

/// Run the skiptrace merger stage on its own.
fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let dirs = PipelineDirs::default();
    let log = RunLog::new(&dirs.history)?;
    if let Err(e) = integrate::run(&dirs.t1_input, &dirs.t1_output, &log) {
        tracing::error!("skiptrace merger failed: {}", e);
    }
    Ok(())
}
