//! Lookalike Server - HTTP query service for visual product similarity.
//!
//! Serves the online half of the lookalike system: at startup it loads
//! the vector index published by the ingestion pipeline, validates it
//! against the configured embedding provider, and then answers similarity
//! queries over an immutable, lock-free shared state.
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe with index/metadata counts
//! - `POST /find-similar-products` - Raw image bytes in, ranked
//!   `{product, similarity}` pairs out (at most `top_k`, default 10)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
