// ============================================================
// Layer 3 — Image Domain Type
// ============================================================
// The autoencoder works on fixed-size colour images:
//   height = 32, width = 32, channels = 3
//
// Pixels are stored flat in height-width-channel (HWC) order,
// i.e. the value for row r, column c, channel k lives at
//   (r * IMAGE_WIDTH + c) * IMAGE_CHANNELS + k
//
// This is the same layout callers hand tensors over in, so the
// batcher can copy samples straight into an [N, 32, 32, 3] tensor.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub const IMAGE_HEIGHT:   usize = 32;
pub const IMAGE_WIDTH:    usize = 32;
pub const IMAGE_CHANNELS: usize = 3;

/// Number of values in one image (32 * 32 * 3 = 3072)
pub const IMAGE_LEN: usize = IMAGE_HEIGHT * IMAGE_WIDTH * IMAGE_CHANNELS;

/// One 32×32×3 image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pixels: Vec<f32>,
}

impl Image {
    /// Wrap a flat HWC pixel buffer.
    ///
    /// Fails if the buffer is not exactly IMAGE_LEN long or holds
    /// NaN / infinite values.
    pub fn new(pixels: Vec<f32>) -> Result<Self> {
        if pixels.len() != IMAGE_LEN {
            bail!(
                "Image must have {} values ({}x{}x{}), got {}",
                IMAGE_LEN, IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_CHANNELS,
                pixels.len()
            );
        }
        if let Some(pos) = pixels.iter().position(|p| !p.is_finite()) {
            bail!("Image pixel at index {pos} is not finite");
        }
        Ok(Self { pixels })
    }

    /// An image with every pixel set to `value`
    #[cfg(test)]
    pub fn filled(value: f32) -> Self {
        Self { pixels: vec![value; IMAGE_LEN] }
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_correct_length() {
        let img = Image::new(vec![0.5; IMAGE_LEN]).unwrap();
        assert_eq!(img.pixels().len(), 3072);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(Image::new(vec![0.0; 100]).is_err());
        assert!(Image::new(vec![0.0; IMAGE_LEN + 1]).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut pixels = vec![0.0; IMAGE_LEN];
        pixels[17] = f32::NAN;
        let err = Image::new(pixels).unwrap_err();
        assert!(err.to_string().contains("17"));
    }

    #[test]
    fn test_filled() {
        let img = Image::filled(0.25);
        assert!(img.pixels().iter().all(|&p| p == 0.25));
    }
}
