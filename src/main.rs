use anyhow::{Context, Result};
use clemency_scraper::{output, Aggregator, Config, HttpSource};
use std::{env, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,clemency_scraper=debug"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config_path = env::args().nth(1).map(PathBuf::from);
    let cfg = Config::load(config_path.as_deref())?;
    info!(
        site_root = %cfg.site_root,
        sources = cfg.sources.len(),
        policy = ?cfg.failure_policy,
        "config loaded"
    );

    let source = HttpSource::new(&cfg.user_agent, cfg.timeout())?;
    let aggregator = Aggregator::new(source, cfg.site_root.clone()).with_policy(cfg.failure_policy);

    // ─── 3) one sequential run per status category ──────────────────
    for src in &cfg.sources {
        let start = Instant::now();
        let out = aggregator
            .run_with_report(&src.directory_url, &src.locator, src.status)
            .with_context(|| format!("collecting {} records", src.status))?;

        output::write_outputs(&out.table, &cfg.output_dir, src.status)?;
        info!(
            status = %src.status,
            records = out.table.len(),
            pages = out.report.pages_seen,
            skipped_pages = out.report.skipped_pages.len(),
            skipped_tables = out.report.skipped_tables.len(),
            elapsed = ?start.elapsed(),
            "category done"
        );
    }

    info!("all done");
    Ok(())
}
