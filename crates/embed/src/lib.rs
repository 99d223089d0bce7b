//! Embedding provider interface for the lookalike pipeline.
//!
//! The actual inference model is an external collaborator: both halves of
//! the system (ingestion and the query service) only ever see the
//! [`ImageEmbedder`] trait. The contract is small and strict:
//!
//! - `dimension()` is fixed for the provider's lifetime, so every vector
//!   the provider ever emits has the same length;
//! - `embed` takes an [`RgbImage`], which makes the 3-channel requirement
//!   a type-level fact rather than a runtime convention. Callers convert
//!   with `DynamicImage::to_rgb8()`, a no-op for images already in RGB.
//!
//! The crate ships one concrete backend: a deterministic stub that
//! derives a vector from a hash of the pixel data. It is cheap,
//! reproducible, and dimension-faithful, which is everything ingestion
//! tests and the query-path plumbing need. A real model backend plugs in
//! through [`build_embedder`].

mod config;
mod error;
mod normalize;
mod stub;

use image::RgbImage;
use std::sync::Arc;
use tracing::info;

pub use crate::config::EmbedConfig;
pub use crate::error::EmbedError;
pub use crate::normalize::l2_normalize_in_place;
pub use crate::stub::StubEmbedder;

/// Shared handle to a configured embedding provider.
pub type EmbedderHandle = Arc<dyn ImageEmbedder>;

/// Maps a 3-channel image to a fixed-dimension vector.
pub trait ImageEmbedder: Send + Sync {
    /// Embedding length; constant for the provider's lifetime.
    fn dimension(&self) -> usize;

    /// Embed one image. The returned vector always has
    /// [`dimension()`](Self::dimension) elements.
    fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, EmbedError>;
}

impl std::fmt::Debug for dyn ImageEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageEmbedder")
            .field("dimension", &self.dimension())
            .finish()
    }
}

/// Construct the embedder selected by `cfg.mode`.
///
/// Device selection is part of the config and resolved here, once, at
/// construction; nothing queries hardware per call. Unknown modes fail
/// with [`EmbedError::InvalidConfig`] — that arm is where a real model
/// backend would be wired in.
pub fn build_embedder(cfg: &EmbedConfig) -> Result<EmbedderHandle, EmbedError> {
    match cfg.mode.as_str() {
        "stub" => {
            let embedder = StubEmbedder::new(cfg.clone())?;
            info!(
                mode = %cfg.mode,
                model = %cfg.model_name,
                dimension = cfg.dimension,
                device = %cfg.device,
                normalize = cfg.normalize,
                "embedder_ready"
            );
            Ok(Arc::new(embedder))
        }
        other => Err(EmbedError::InvalidConfig(format!(
            "unknown embedder mode `{other}`"
        ))),
    }
}
