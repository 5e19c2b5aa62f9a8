//! Query image decoding and validation.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::{SimilarityError, SimilarityResult};

/// A query image that is known to decode.
///
/// Keeps the original encoded bytes, which are what the embedding endpoint
/// receives.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: ImageFormat,
}

impl DecodedImage {
    /// Sniff the format from content and fully decode it.
    pub fn decode(bytes: Vec<u8>) -> SimilarityResult<Self> {
        if bytes.is_empty() {
            return Err(SimilarityError::ImageDecode("empty image".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| SimilarityError::ImageDecode(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| SimilarityError::ImageDecode("unrecognized image format".to_string()))?;
        let decoded = reader
            .decode()
            .map_err(|e| SimilarityError::ImageDecode(e.to_string()))?;

        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            format,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let image = DecodedImage::decode(encode_png(4, 3)).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = DecodedImage::decode(b"definitely not an image".to_vec());
        assert!(matches!(result, Err(SimilarityError::ImageDecode(_))));
    }

    #[test]
    fn test_decode_rejects_empty() {
        let result = DecodedImage::decode(Vec::new());
        assert!(matches!(result, Err(SimilarityError::ImageDecode(_))));
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let mut bytes = encode_png(8, 8);
        bytes.truncate(bytes.len() / 2);
        assert!(DecodedImage::decode(bytes).is_err());
    }
}
