//! Product catalog access for the lookalike pipeline.
//!
//! Two views over the same `metadata.json` file:
//!
//! - [`ProductEntry`] — what ingestion needs: an id, an image path, and
//!   whatever display attributes the catalog authors wrote. Read-only.
//! - [`MetadataCatalog`] — what the query service needs: a mapping from
//!   product id to the full metadata record, used to join ranked ids back
//!   into client-facing results.
//!
//! Both are loaded once. A catalog file that is missing, not a JSON array,
//! or that contains a record without a string `id` rejects the whole load;
//! callers decide whether that is fatal (it is, for both consumers).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading catalog files.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read at all.
    #[error("catalog unreadable: {0}")]
    Io(#[from] std::io::Error),
    /// The file content is not a JSON array of records.
    #[error("catalog malformed: {0}")]
    Parse(#[from] serde_json::Error),
    /// A record has no usable `id` field.
    #[error("catalog record {position} is missing a string `id`")]
    MissingId { position: usize },
}

/// One catalog row as ingestion sees it.
///
/// `image_path` is optional on purpose: rows without one are a known
/// catalog-authoring failure mode and are skipped (with a recorded
/// reason) by the ingestion pipeline rather than aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductEntry {
    /// Unique product identifier.
    pub id: String,
    /// Path to the product image, relative to the ingestion working dir.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Display attributes; opaque to the pipeline.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

/// Load the catalog as ingestion input, in file order.
pub fn load_entries(path: &Path) -> Result<Vec<ProductEntry>, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let entries: Vec<ProductEntry> = serde_json::from_str(&raw)?;
    for (position, entry) in entries.iter().enumerate() {
        if entry.id.trim().is_empty() {
            return Err(CatalogError::MissingId { position });
        }
    }
    info!(path = %path.display(), entries = entries.len(), "catalog_loaded");
    Ok(entries)
}

/// Query-time metadata join table: product id → full metadata record.
#[derive(Debug, Clone, Default)]
pub struct MetadataCatalog {
    by_id: HashMap<String, Value>,
}

impl MetadataCatalog {
    /// Load the metadata file once, keyed by `id`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<Value> = serde_json::from_str(&raw)?;
        let catalog = Self::from_records(records)?;
        info!(path = %path.display(), products = catalog.len(), "metadata_loaded");
        Ok(catalog)
    }

    /// Build the join table from already-parsed records.
    pub fn from_records(records: Vec<Value>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.trim().is_empty())
                .ok_or(CatalogError::MissingId { position })?
                .to_string();
            by_id.insert(id, record);
        }
        Ok(Self { by_id })
    }

    /// Full metadata record for a product, if the catalog knows it.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
