use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use catalog::MetadataCatalog;
use embed::EmbedderHandle;
use index::VectorIndex;
use std::sync::Arc;
use tracing::info;

/// Shared application state.
///
/// Built exactly once at startup and handed to every request handler by
/// `Arc`; nothing in it is mutated afterwards. Tests construct isolated
/// instances through [`ServerState::from_parts`].
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Vector index (immutable, shared across requests)
    pub index: Arc<VectorIndex>,

    /// Product metadata join table
    pub metadata: Arc<MetadataCatalog>,

    /// Embedding provider
    pub embedder: EmbedderHandle,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("index", &self.index)
            .field("metadata", &self.metadata)
            .field("embedder", &format_args!("<dyn ImageEmbedder>"))
            .finish()
    }
}

impl ServerState {
    /// Load everything the service needs to serve queries.
    ///
    /// Any failure here — unreadable or malformed vector file, index
    /// dimension differing from what the configured embedder produces,
    /// unreadable metadata — is a startup failure: the process refuses
    /// to accept traffic rather than serve wrong rankings.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let embedder = embed::build_embedder(&config.embed)?;
        let index = VectorIndex::load(&config.vectors_file)?;
        let metadata = MetadataCatalog::load(&config.metadata_file)?;

        Self::from_parts(config, index, metadata, embedder)
    }

    /// Assemble state from already-built components, applying the same
    /// index/embedder compatibility check as [`new`](Self::new).
    pub fn from_parts(
        config: ServerConfig,
        index: VectorIndex,
        metadata: MetadataCatalog,
        embedder: EmbedderHandle,
    ) -> ServerResult<Self> {
        if config.top_k == 0 {
            return Err(ServerError::Config("top_k must be greater than zero".into()));
        }
        if let Some(index_dim) = index.dimension() {
            if index_dim != embedder.dimension() {
                return Err(ServerError::Config(format!(
                    "index dimension {index_dim} does not match embedder dimension {}; \
                     re-run ingestion with the configured provider",
                    embedder.dimension()
                )));
            }
        }

        info!(
            indexed = index.len(),
            dimension = index.dimension(),
            products = metadata.len(),
            top_k = config.top_k,
            "server state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            index: Arc::new(index),
            metadata: Arc::new(metadata),
            embedder,
        })
    }
}
