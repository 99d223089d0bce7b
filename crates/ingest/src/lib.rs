//! Offline ingestion pipeline for the lookalike catalog.
//!
//! Reads the product catalog, embeds every product image, and publishes
//! the full vector set as one atomic write. Each entry moves through a
//! small linear state machine: pending → embedded → appended on success,
//! or pending → skipped with a recorded reason.
//!
//! ## Failure policy
//!
//! A missing image file, an undecodable image, or an embedding failure
//! for one entry is non-fatal: the entry is logged, recorded in the
//! [`IngestReport`], and excluded from the output. One bad catalog row
//! must not block the rest of the run.
//!
//! The whole run aborts only when the catalog itself is unusable, when
//! the produced record set fails index validation, or when zero entries
//! embedded — publishing an empty index would silently break the query
//! service, so that case is a hard failure that leaves any previously
//! published vector file untouched.
//!
//! Entries are processed one at a time; output ordering is catalog
//! order, so the published file depends only on the input set and the
//! embeddings, not on processing order.

use std::path::Path;
use std::time::Instant;

use catalog::{CatalogError, ProductEntry};
use embed::ImageEmbedder;
use index::{IndexError, VectorIndex, VectorRecord};
use thiserror::Error;
use tracing::{info, warn};

mod config;

pub use crate::config::IngestConfig;

/// Why a single catalog entry was excluded from the output index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The catalog row has no `image_path`.
    #[error("no image path in catalog entry")]
    MissingImagePath,
    /// The image file does not exist.
    #[error("image file not found: {0}")]
    ImageMissing(String),
    /// The file exists but could not be decoded as an image.
    #[error("image unreadable: {0}")]
    ImageUnreadable(String),
    /// The embedding provider failed for this image.
    #[error("embedding failed: {0}")]
    Embedding(String),
}

/// One skipped entry and the reason it was excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub id: String,
    pub reason: SkipReason,
}

/// Outcome of a completed (not aborted) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Entries that made it into the published vector file.
    pub embedded: usize,
    /// Entries excluded from the output, with reasons, in catalog order.
    pub skipped: Vec<SkippedEntry>,
}

/// Errors that abort a whole ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Catalog file missing or unparsable.
    #[error("catalog failure: {0}")]
    Catalog(#[from] CatalogError),
    /// The produced records failed index validation, or the vector file
    /// could not be written.
    #[error("index failure: {0}")]
    Index(#[from] IndexError),
    /// Every entry failed; nothing was written.
    #[error("no embeddings were produced; refusing to publish an empty index")]
    NoEmbeddings,
}

/// Run the full pipeline: catalog → embeddings → atomic publish.
pub fn run(cfg: &IngestConfig, embedder: &dyn ImageEmbedder) -> Result<IngestReport, IngestError> {
    let start = Instant::now();
    let entries = catalog::load_entries(&cfg.catalog_path)?;
    info!(
        catalog = %cfg.catalog_path.display(),
        entries = entries.len(),
        model = %cfg.embed.model_name,
        "ingest_started"
    );

    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();

    for entry in &entries {
        match embed_entry(entry, embedder) {
            Ok(vector) => {
                info!(id = %entry.id, dimension = vector.len(), "entry_embedded");
                records.push(VectorRecord {
                    id: entry.id.clone(),
                    vector,
                });
            }
            Err(reason) => {
                warn!(id = %entry.id, reason = %reason, "entry_skipped");
                skipped.push(SkippedEntry {
                    id: entry.id.clone(),
                    reason,
                });
            }
        }
    }

    if records.is_empty() {
        warn!("ingest_aborted: no embeddings produced");
        return Err(IngestError::NoEmbeddings);
    }

    // Validate the full set through the same path the query service
    // loads with, then publish in one atomic step.
    let embedded = records.len();
    VectorIndex::from_records(records.clone())?;
    index::write_atomic(&cfg.output_path, &records)?;

    info!(
        output = %cfg.output_path.display(),
        embedded,
        skipped = skipped.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ingest_completed"
    );

    Ok(IngestReport { embedded, skipped })
}

/// Embed one catalog entry, mapping every per-entry failure mode to a
/// recorded skip reason.
fn embed_entry(entry: &ProductEntry, embedder: &dyn ImageEmbedder) -> Result<Vec<f32>, SkipReason> {
    let path = entry
        .image_path
        .as_deref()
        .ok_or(SkipReason::MissingImagePath)?;
    if !Path::new(path).exists() {
        return Err(SkipReason::ImageMissing(path.to_string()));
    }

    let decoded =
        image::open(path).map_err(|err| SkipReason::ImageUnreadable(err.to_string()))?;
    let rgb = decoded.to_rgb8();

    embedder
        .embed(&rgb)
        .map_err(|err| SkipReason::Embedding(err.to_string()))
}
