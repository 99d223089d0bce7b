use serde::{Deserialize, Serialize};

/// Runtime configuration for embedder construction.
///
/// Cheap to clone and serializable, so the ingest and server configs can
/// carry it as a nested section and both processes are guaranteed to
/// describe the same provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedConfig {
    /// Backend selector. `"stub"` is the deterministic pixel-hash
    /// backend; anything else is rejected at construction.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Friendly label for logs and diagnostics.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Embedding length every produced vector must have.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Compute device, resolved once at construction and injected into
    /// the backend — never queried ad hoc per call.
    #[serde(default = "default_device")]
    pub device: String,
    /// L2-normalize produced vectors (recommended for cosine ranking).
    #[serde(default = "default_true")]
    pub normalize: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            model_name: default_model_name(),
            dimension: default_dimension(),
            device: default_device(),
            normalize: default_true(),
        }
    }
}

fn default_mode() -> String {
    "stub".to_string()
}

fn default_model_name() -> String {
    "pixel-hash-stub".to_string()
}

fn default_dimension() -> usize {
    // Matches the vector length of the CLIP ViT-B/32 deployments this
    // service is index-compatible with.
    512
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_true() -> bool {
    true
}
