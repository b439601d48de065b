//! Face-crop extraction from decoded frames.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;

use clens_models::NormalizedRect;

/// Errors producing a crop from a detection's bounding box.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Bounding box has non-finite coordinates")]
    InvalidBox,

    #[error("Bounding box lies outside the frame")]
    OutsideFrame,

    #[error("Failed to encode crop: {0}")]
    Encode(#[from] image::ImageError),
}

/// Cut a detection's region out of the frame and encode it as JPEG.
///
/// The normalized box is converted with truncating pixel math and clamped
/// to the frame bounds; a box that clamps to zero area is rejected. The
/// JPEG bytes go straight to the face-attribute service, which accepts
/// lossy compression.
pub fn encode_crop(frame: &DynamicImage, bbox: &NormalizedRect) -> Result<Vec<u8>, CropError> {
    if !bbox.is_finite() {
        return Err(CropError::InvalidBox);
    }

    let (img_width, img_height) = frame.dimensions();
    let rect = bbox.to_pixel_rect(img_width, img_height).clamped(img_width, img_height);
    if rect.is_empty() {
        return Err(CropError::OutsideFrame);
    }

    let crop = frame.crop_imm(
        rect.left as u32,
        rect.top as u32,
        rect.width() as u32,
        rect.height() as u32,
    );

    let mut buffer = Cursor::new(Vec::new());
    crop.write_to(&mut buffer, ImageFormat::Jpeg)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn test_frame(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40])))
    }

    #[test]
    fn test_encode_crop_dimensions() {
        let frame = test_frame(1000, 500);
        let bbox = NormalizedRect::new(0.1, 0.1, 0.2, 0.3);

        let jpeg = encode_crop(&frame, &bbox).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (200, 150));
    }

    #[test]
    fn test_encode_crop_clamps_overflowing_box() {
        let frame = test_frame(100, 100);
        let bbox = NormalizedRect::new(0.9, 0.9, 0.5, 0.5);

        let jpeg = encode_crop(&frame, &bbox).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (10, 10));
    }

    #[test]
    fn test_encode_crop_rejects_box_outside_frame() {
        let frame = test_frame(100, 100);
        let bbox = NormalizedRect::new(2.0, 2.0, 0.5, 0.5);
        assert!(matches!(encode_crop(&frame, &bbox), Err(CropError::OutsideFrame)));
    }

    #[test]
    fn test_encode_crop_rejects_non_finite_box() {
        let frame = test_frame(100, 100);
        let bbox = NormalizedRect::new(f64::NAN, 0.1, 0.2, 0.2);
        assert!(matches!(encode_crop(&frame, &bbox), Err(CropError::InvalidBox)));
    }

    #[test]
    fn test_encode_crop_rejects_zero_size_box() {
        let frame = test_frame(100, 100);
        let bbox = NormalizedRect::new(0.5, 0.5, 0.0, 0.0);
        assert!(matches!(encode_crop(&frame, &bbox), Err(CropError::OutsideFrame)));
    }
}
