// ============================================================
// Layer 4 — Synthetic Images
// ============================================================
// Real dataset loading is out of scope, so the CLI and the
// tests train on a toy dataset instead. Each image is a smooth
// linear gradient per channel:
//
//   pixel(r, c, k) = clamp(base_k + dy_k * r/31 + dx_k * c/31, 0, 1)
//
// with base_k ∈ [0, 1) and dy_k, dx_k ∈ [-0.5, 0.5) drawn from a
// seeded RNG. Nine numbers describe a whole image, which makes
// it an easy target for an autoencoder with a small latent
// space: the loss falls within a few epochs.

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::image::{Image, IMAGE_CHANNELS, IMAGE_HEIGHT, IMAGE_LEN, IMAGE_WIDTH};
use crate::domain::traits::ImageSource;

/// Deterministic generator of `count` gradient images.
#[derive(Debug, Clone)]
pub struct SyntheticImages {
    count: usize,
    seed:  u64,
}

impl SyntheticImages {
    pub fn new(count: usize, seed: u64) -> Self {
        Self { count, seed }
    }

    fn gradient(rng: &mut StdRng) -> Result<Image> {
        let params: Vec<(f32, f32, f32)> = (0..IMAGE_CHANNELS)
            .map(|_| {
                (
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                )
            })
            .collect();

        let mut pixels = Vec::with_capacity(IMAGE_LEN);
        for row in 0..IMAGE_HEIGHT {
            let y = row as f32 / (IMAGE_HEIGHT - 1) as f32;
            for col in 0..IMAGE_WIDTH {
                let x = col as f32 / (IMAGE_WIDTH - 1) as f32;
                for &(base, dy, dx) in &params {
                    pixels.push((base + dy * y + dx * x).clamp(0.0, 1.0));
                }
            }
        }
        Image::new(pixels)
    }
}

impl ImageSource for SyntheticImages {
    fn images(&self) -> Result<Vec<Image>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let images = (0..self.count)
            .map(|_| Self::gradient(&mut rng))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!("Generated {} synthetic images (seed={})", images.len(), self.seed);
        Ok(images)
    }
}
