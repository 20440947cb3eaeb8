use anyhow::Result;
use skipscrub::{history::RunLog, normalize, PipelineDirs};
use tracing_subscriber::{fmt, EnvFilter};

/// Run the contact normalizer stage on its own.
fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let dirs = PipelineDirs::default();
    let log = RunLog::new(&dirs.history)?;
    if let Err(e) = normalize::run(&dirs.input, &dirs.output, &log) {
        tracing::error!("contact normalizer failed: {}", e);
    }
    Ok(())
}
