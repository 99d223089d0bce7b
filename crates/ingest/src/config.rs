use embed::EmbedConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ingestion run configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Product catalog file (JSON array of entries with `id`,
    /// `image_path`, and display attributes).
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Vector file published at the end of a successful run.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Log filter for the binary.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding provider settings; must describe the same provider the
    /// query service is configured with, or the service will refuse the
    /// published index at startup.
    #[serde(default)]
    pub embed: EmbedConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            output_path: default_output_path(),
            log_level: default_log_level(),
            embed: EmbedConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Load configuration from an optional `ingest` file and
    /// `LOOKALIKE_INGEST__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("ingest").required(false))
            .add_source(config::Environment::with_prefix("LOOKALIKE_INGEST").separator("__"));

        Ok(builder.build()?.try_deserialize()?)
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/metadata.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/product_vectors.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_paths() {
        let cfg = IngestConfig::default();
        assert_eq!(cfg.catalog_path, PathBuf::from("data/metadata.json"));
        assert_eq!(cfg.output_path, PathBuf::from("data/product_vectors.json"));
        assert_eq!(cfg.embed.mode, "stub");
    }
}
