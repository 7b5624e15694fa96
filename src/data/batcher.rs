// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<Image> into
// one float tensor.
//
// How batching works here:
//   Input:  Vec of N Images, each 3072 values in HWC order
//   Output: ImageBatch with a tensor of shape [N, 32, 32, 3]
//
//   We concatenate every image's pixel buffer into one long Vec
//   and hand it to Burn together with the target shape:
//   [img1_px1, ..., img1_px3072, img2_px1, ..., imgN_px3072] → [N, 32, 32, 3]
//
// No padding logic is needed because every Image is guaranteed
// to be exactly 3072 values by its constructor.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::image::{Image, IMAGE_CHANNELS, IMAGE_HEIGHT, IMAGE_LEN, IMAGE_WIDTH};

// ─── ImageBatch ───────────────────────────────────────────────────────────────
/// A batch of images ready for the model forward pass.
/// The same tensor is both input and reconstruction target.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Images, shape [batch_size, 32, 32, 3]
    pub images: Tensor<B, 4>,
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the
/// correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<Image, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<Image>) -> ImageBatch<B> {
        let batch_size = items.len();

        let mut flat = Vec::with_capacity(batch_size * IMAGE_LEN);
        for image in &items {
            flat.extend_from_slice(image.pixels());
        }

        let data   = TensorData::new(flat, [batch_size, IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_CHANNELS]);
        let images = Tensor::<B, 4>::from_data(data, &self.device);

        ImageBatch { images }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shape() {
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![Image::filled(0.0), Image::filled(1.0), Image::filled(0.5)]);
        assert_eq!(batch.images.dims(), [3, 32, 32, 3]);
    }

    #[test]
    fn test_batch_preserves_pixel_order() {
        let mut pixels = vec![0.0f32; IMAGE_LEN];
        // row 0, col 1, channel 2
        pixels[IMAGE_CHANNELS + 2] = 0.75;
        let image = Image::new(pixels).unwrap();

        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![Image::filled(0.25), image]);

        let value: f32 = batch.images.clone()
            .slice([1..2, 0..1, 1..2, 2..3])
            .into_scalar();
        assert_eq!(value, 0.75);

        let first: f32 = batch.images.slice([0..1, 5..6, 5..6, 0..1]).into_scalar();
        assert_eq!(first, 0.25);
    }
}
