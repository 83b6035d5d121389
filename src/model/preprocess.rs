//! Image preprocessing: bytes -> fixed-size input batch

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageReader, RgbImage};
use ndarray::Array4;

use super::{InputLayout, InputSpec, CHANNELS};

/// Decode an uploaded image, guessing the format from its content
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?;

    reader.decode()
}

/// Convert to RGB and resize to the model resolution
pub fn normalize(image: &DynamicImage, size: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    if rgb.width() == size && rgb.height() == size {
        return rgb;
    }
    image::imageops::resize(&rgb, size, size, FilterType::CatmullRom)
}

/// Build the `[1, ...]` input tensor for `spec`
pub fn to_batch(image: &DynamicImage, spec: &InputSpec) -> Array4<f32> {
    let rgb = normalize(image, spec.size);
    let range = spec.pixel_range;

    match spec.layout {
        InputLayout::Nhwc => {
            let s = spec.size as usize;
            Array4::from_shape_fn((1, s, s, CHANNELS), |(_, y, x, c)| {
                range.scale(rgb.get_pixel(x as u32, y as u32)[c])
            })
        }
        InputLayout::Nchw => {
            let s = spec.size as usize;
            Array4::from_shape_fn((1, CHANNELS, s, s), |(_, c, y, x)| {
                range.scale(rgb.get_pixel(x as u32, y as u32)[c])
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PixelRange;
    use image::{GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_png_and_garbage() {
        let img = RgbImage::from_pixel(5, 3, Rgb([10, 20, 30]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);

        let decoded = decode(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));

        let err = decode(b"definitely not an image").unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_nhwc_batch_from_grayscale() {
        let gray = GrayImage::from_pixel(40, 17, Luma([200]));
        let spec = InputSpec { size: 8, ..Default::default() };

        let batch = to_batch(&DynamicImage::ImageLuma8(gray), &spec);
        assert_eq!(batch.shape(), &[1, 8, 8, 3]);
        // Gray expands to three equal channels, raw range
        assert!(batch.iter().all(|&v| (v - 200.0).abs() < 1.0));
    }

    #[test]
    fn test_nchw_batch_channel_order() {
        let rgba = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 51, 0]));
        let spec = InputSpec {
            size: 4,
            layout: InputLayout::Nchw,
            pixel_range: PixelRange::Unit,
        };

        let batch = to_batch(&DynamicImage::ImageRgba8(rgba), &spec);
        assert_eq!(batch.shape(), &[1, 3, 4, 4]);
        assert!((batch[[0, 0, 2, 3]] - 1.0).abs() < 1e-6);
        assert!(batch[[0, 1, 0, 0]].abs() < 1e-6);
        assert!((batch[[0, 2, 1, 1]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_no_resize_when_already_sized() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([1, 2, 3]));
        let spec = InputSpec { size: 2, ..Default::default() };

        let batch = to_batch(&DynamicImage::ImageRgb8(img), &spec);
        assert_eq!(batch[[0, 0, 1, 0]], 1.0);
        assert_eq!(batch[[0, 0, 1, 2]], 3.0);
        assert_eq!(batch[[0, 1, 1, 0]], 0.0);
    }
}
