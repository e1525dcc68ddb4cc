//! Decoded images held by the editor.

use image::{DynamicImage, GenericImageView};

use crate::scaling::ImageSize;

/// A decoded bitmap with its intrinsic size.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pixels: DynamicImage,
    size: ImageSize,
}

impl LoadedImage {
    /// Decode encoded image bytes (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let pixels = image::load_from_memory(bytes)?;
        log::debug!("Decoded image: {}x{}", pixels.width(), pixels.height());
        Ok(Self::from_image(pixels))
    }

    /// Wrap an already decoded image.
    pub fn from_image(pixels: DynamicImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            pixels,
            size: ImageSize::new(width, height),
        }
    }

    /// Intrinsic (canonical) size.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Decoded pixels.
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::png_bytes;
    use super::*;

    #[test]
    fn test_decode_png() {
        let image = LoadedImage::decode(&png_bytes(40, 30)).unwrap();
        assert_eq!(image.size(), ImageSize::new(40, 30));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(LoadedImage::decode(b"definitely not an image").is_err());
    }
}
