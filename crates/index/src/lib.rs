//! # Lookalike Index
//!
//! The in-memory vector index behind the query service, plus the persisted
//! file format shared with the ingestion pipeline.
//!
//! The persisted form is deliberately plain: a JSON array of
//! `{"id": ..., "vector": [...]}` records, no schema version, no framing.
//! This crate owns that format in both directions — [`VectorIndex::load`]
//! reads it, [`write_atomic`] publishes it — so the two halves of the
//! system cannot drift apart.
//!
//! ## Consistency contract
//!
//! Loading is all-or-nothing. The first malformed record, empty or
//! duplicate id, or vector whose length differs from the rest fails the
//! whole load; a partially loaded index is never handed out. Ranking a
//! query against inconsistent-length vectors is meaningless, so the
//! mismatch is a hard error here rather than something downstream has to
//! defend against.
//!
//! Once loaded, an index is immutable and iterates its entries in file
//! order. That ordering is the tie-break contract the ranker relies on:
//! two entries with identical scores come back in the order the file
//! stored them, every time.
//!
//! ## Example
//!
//! ```
//! use lookalike_index::{VectorIndex, VectorRecord};
//!
//! let index = VectorIndex::from_records(vec![
//!     VectorRecord { id: "p1".into(), vector: vec![1.0, 0.0] },
//!     VectorRecord { id: "p2".into(), vector: vec![0.0, 1.0] },
//! ])
//! .unwrap();
//!
//! assert_eq!(index.len(), 2);
//! assert_eq!(index.dimension(), Some(2));
//! assert_eq!(index.lookup("p1"), Some(&[1.0, 0.0][..]));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// One persisted record: a product id and its embedding.
///
/// Both fields are required; a record missing either one makes the whole
/// file malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    /// Unique product identifier.
    pub id: String,
    /// Embedding values, all the same length within one file.
    pub vector: Vec<f32>,
}

/// Errors raised while loading or writing the vector file.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The source could not be read or the output could not be written.
    #[error("vector file io failure: {0}")]
    Io(#[from] std::io::Error),
    /// The content is not a JSON array of `{id, vector}` records.
    #[error("vector file malformed: {0}")]
    Parse(#[from] serde_json::Error),
    /// A record carries an empty id.
    #[error("vector record {position} has an empty id")]
    EmptyId { position: usize },
    /// The same id appears more than once.
    #[error("duplicate id in vector file: {0}")]
    DuplicateId(String),
    /// A vector's length differs from the dimension established by the
    /// first record. Fail fast; never truncate or pad.
    #[error("embedding for {id} has length {actual}, index dimension is {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
}

/// Immutable id → embedding mapping, built once, shared read-only.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<VectorRecord>,
    by_id: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl VectorIndex {
    /// Load and validate the whole persisted file.
    ///
    /// Either every record loads and validates, or the call fails and no
    /// index exists — the caller (the query service at startup) must not
    /// serve queries in that case.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<VectorRecord> = serde_json::from_str(&raw)?;
        let index = Self::from_records(records)?;
        info!(
            path = %path.display(),
            entries = index.len(),
            dimension = index.dimension(),
            "vector_index_loaded"
        );
        Ok(index)
    }

    /// Build an index from in-memory records, applying the same
    /// validation as [`load`](Self::load).
    ///
    /// The ingestion pipeline runs its output through this before
    /// persisting, so an inconsistent record set can never be published.
    pub fn from_records(records: Vec<VectorRecord>) -> Result<Self, IndexError> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut dimension = None;

        for (position, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(IndexError::EmptyId { position });
            }
            let expected = *dimension.get_or_insert(record.vector.len());
            if record.vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    id: record.id.clone(),
                    expected,
                    actual: record.vector.len(),
                });
            }
            if by_id.insert(record.id.clone(), position).is_some() {
                return Err(IndexError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self {
            entries: records,
            by_id,
            dimension,
        })
    }

    /// Embedding for a product id, if indexed.
    pub fn lookup(&self, id: &str) -> Option<&[f32]> {
        self.by_id
            .get(id)
            .map(|&position| self.entries[position].vector.as_slice())
    }

    /// All entries, in file order. Deterministic for the lifetime of
    /// this instance.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|record| (record.id.as_str(), record.vector.as_slice()))
    }

    /// Embedding length shared by every entry; `None` only when the
    /// index is empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Persist records as one atomic step: serialize, write to a sibling
/// temp file, then rename over the target.
///
/// An interrupted run leaves at worst a stray temp file — never a
/// half-written file where a previously valid one used to be.
pub fn write_atomic(path: &Path, records: &[VectorRecord]) -> Result<(), IndexError> {
    let payload = serde_json::to_vec_pretty(records)?;

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, &payload)?;
    std::fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), records = records.len(), "vector_file_written");
    Ok(())
}
