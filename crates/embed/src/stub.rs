use fxhash::hash64;
use image::RgbImage;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbedConfig, EmbedError, ImageEmbedder};

/// Deterministic embedder backed by a hash of the pixel data.
///
/// Generates sinusoid values derived from the image hash: the same pixels
/// always produce the same vector, different pixels almost always produce
/// a different one, and the output dimension is whatever the config says.
/// That makes it a faithful stand-in for a real model everywhere the rest
/// of the system only cares about the provider contract.
#[derive(Debug)]
pub struct StubEmbedder {
    cfg: EmbedConfig,
}

impl StubEmbedder {
    pub fn new(cfg: EmbedConfig) -> Result<Self, EmbedError> {
        if cfg.dimension == 0 {
            return Err(EmbedError::InvalidConfig(
                "embedding dimension must be greater than zero".into(),
            ));
        }
        if cfg.device != "cpu" {
            return Err(EmbedError::InvalidConfig(format!(
                "stub embedder only supports device `cpu`, got `{}`",
                cfg.device
            )));
        }
        Ok(Self { cfg })
    }
}

impl ImageEmbedder for StubEmbedder {
    fn dimension(&self) -> usize {
        self.cfg.dimension
    }

    fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, EmbedError> {
        let h = hash64(image.as_raw());

        let mut v = vec![0f32; self.cfg.dimension];
        for (idx, value) in v.iter_mut().enumerate() {
            let lane = h.rotate_left((idx % 64) as u32);
            *value = ((lane & 0xFFFF) as f32 * 0.0003).sin();
        }

        if self.cfg.normalize {
            l2_normalize_in_place(&mut v);
        }
        Ok(v)
    }
}
