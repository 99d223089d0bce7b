use thiserror::Error;

/// Errors surfaced by embedder construction and inference.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Configuration is inconsistent or names an unknown backend.
    #[error("invalid embed config: {0}")]
    InvalidConfig(String),
    /// The backend failed to produce a vector for a decodable image.
    #[error("inference failure: {0}")]
    Inference(String),
    /// Low-level IO failure while touching model assets.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
