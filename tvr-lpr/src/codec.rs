//! Image loading and encoding
//!
//! Camera exports and video decoders hand over BGR byte buffers; everything
//! downstream works in RGB, so the codec owns the channel swap.

use std::path::Path;

use image::RgbImage;

use crate::error::{LprError, Result};

/// Image decode/encode seam
pub trait ImageCodec: Send + Sync {
    /// Read and decode an image file into RGB
    fn load_image(&self, path: &Path) -> Result<RgbImage>;

    /// Encode an RGB image as PNG bytes
    fn encode_png(&self, image: &RgbImage) -> Result<Vec<u8>>;
}

/// Codec backed by the `image` crate
pub struct DiskImageCodec;

impl ImageCodec for DiskImageCodec {
    fn load_image(&self, path: &Path) -> Result<RgbImage> {
        let bytes = std::fs::read(path)?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| LprError::Image(format!("Failed to decode {}: {}", path.display(), e)))?;
        Ok(image.to_rgb8())
    }

    fn encode_png(&self, image: &RgbImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .map_err(|e| LprError::Image(format!("Failed to encode PNG: {}", e)))?;
        Ok(bytes)
    }
}

/// Reinterpret a raw BGR buffer as an RGB image by reversing the channel order
pub fn bgr_to_rgb(data: &[u8], width: u32, height: u32) -> Result<RgbImage> {
    let expected = (width * height * 3) as usize;
    if data.len() != expected {
        return Err(LprError::Image(format!(
            "BGR buffer is {} bytes, expected {} for {}x{}",
            data.len(),
            expected,
            width,
            height
        )));
    }

    let mut rgb = data.to_vec();
    for pixel in rgb.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| LprError::Image("BGR buffer did not fit image dimensions".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgr_buffer_loads_with_channels_reversed() {
        // One blue pixel, one red pixel, in BGR order
        let data = vec![255, 0, 0, 0, 0, 255];
        let image = bgr_to_rgb(&data, 2, 1).unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255]); // blue in RGB
        assert_eq!(image.get_pixel(1, 0).0, [255, 0, 0]); // red in RGB
    }

    #[test]
    fn test_bgr_buffer_wrong_size_rejected() {
        assert!(bgr_to_rgb(&[0, 0, 0], 2, 1).is_err());
    }

    #[test]
    fn test_png_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plate.png");

        let mut source = RgbImage::new(4, 2);
        source.put_pixel(1, 1, image::Rgb([10, 200, 30]));
        source.save(&path).unwrap();

        let codec = DiskImageCodec;
        let loaded = codec.load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.get_pixel(1, 1).0, [10, 200, 30]);

        let png = codec.encode_png(&loaded).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 200, 30]);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let codec = DiskImageCodec;
        assert!(codec.load_image(Path::new("/no/such/image.jpg")).is_err());
    }
}
