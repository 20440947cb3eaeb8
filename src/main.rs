use anyhow::Result;
use skipscrub::{history::RunLog, integrate, normalize, scrub, PipelineDirs};
use std::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure dirs ───────────────────────────────────────────
    let dirs = PipelineDirs::default();
    for d in [
        &dirs.input,
        &dirs.output,
        &dirs.t1_input,
        &dirs.t1_output,
        &dirs.result,
    ] {
        fs::create_dir_all(d)?;
    }
    let log = RunLog::new(&dirs.history)?;

    // ─── 3) run the stages in dependency order ───────────────────────
    // A failed stage is terminal for that stage only; the next stage's own
    // input discovery reports anything it is now missing.
    if let Err(e) = normalize::run(&dirs.input, &dirs.output, &log) {
        error!("contact normalizer failed: {}", e);
    }
    if let Err(e) = integrate::run(&dirs.t1_input, &dirs.t1_output, &log) {
        error!("skiptrace merger failed: {}", e);
    }
    if let Err(e) = scrub::run(&dirs.t1_input, &dirs.t1_output, &dirs.result, &log) {
        error!("litigator scrub failed: {}", e);
    }

    info!("all done");
    Ok(())
}
