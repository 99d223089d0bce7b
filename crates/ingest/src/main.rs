//! Offline ingestion entry point: embed every catalog image and publish
//! the vector file the query service loads at startup.

use ingest::IngestConfig;
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = IngestConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(cfg.log_level.as_str())
        .with_target(false)
        .init();

    let embedder = embed::build_embedder(&cfg.embed)?;
    let report = ingest::run(&cfg, embedder.as_ref())?;

    info!(
        embedded = report.embedded,
        skipped = report.skipped.len(),
        "ingest run finished"
    );
    for skip in &report.skipped {
        info!(id = %skip.id, reason = %skip.reason, "entry excluded from index");
    }

    Ok(())
}
