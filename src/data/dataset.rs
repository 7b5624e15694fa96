use burn::data::dataset::Dataset;

use crate::domain::image::Image;

/// In-memory image dataset. The autoencoder's target is its
/// input, so a sample is just the image.
pub struct ImageDataset {
    images: Vec<Image>,
}

impl ImageDataset {
    pub fn new(images: Vec<Image>) -> Self { Self { images } }
}

impl Dataset<Image> for ImageDataset {
    fn get(&self, index: usize) -> Option<Image> {
        self.images.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_len() {
        let ds = ImageDataset::new(vec![Image::filled(0.1), Image::filled(0.9)]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1), Some(Image::filled(0.9)));
        assert_eq!(ds.get(2), None);
    }
}
