//! Annotation overlay
//!
//! Draws the detected region and places the recognized text just above it so
//! reviewers can eyeball the read against the plate itself.

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

use crate::error::{LprError, Result};
use crate::types::BoundingBox;

/// Overlay color for box and label
const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Label text height in pixels
const LABEL_SCALE: f32 = 18.0;

/// Load a TTF/OTF font for label rendering
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| LprError::Image(format!("Failed to parse font {}: {}", path.display(), e)))
}

/// Draw the region outline and, when a font is available, the text label
/// above the box origin
pub fn annotate_plate(
    image: &mut RgbImage,
    bbox: &BoundingBox,
    text: &str,
    font: Option<&FontArc>,
) {
    let clamped = bbox.clamped(image.width(), image.height());

    draw_hollow_rect_mut(
        image,
        Rect::at(clamped.x, clamped.y).of_size(clamped.width as u32, clamped.height as u32),
        OVERLAY_COLOR,
    );

    if text.is_empty() {
        return;
    }

    if let Some(font) = font {
        let (label_x, label_y) = clamped.label_origin();
        draw_text_mut(
            image,
            OVERLAY_COLOR,
            label_x,
            label_y,
            PxScale::from(LABEL_SCALE),
            font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_outline_drawn() {
        let mut image = RgbImage::new(100, 100);
        let bbox = BoundingBox::new(10, 10, 30, 20);

        annotate_plate(&mut image, &bbox, "", None);

        // Corner and edge pixels take the overlay color
        assert_eq!(image.get_pixel(10, 10).0, [0, 255, 0]);
        assert_eq!(image.get_pixel(39, 10).0, [0, 255, 0]);
        assert_eq!(image.get_pixel(10, 29).0, [0, 255, 0]);
        // Interior stays untouched
        assert_eq!(image.get_pixel(20, 20).0, [0, 0, 0]);
    }

    #[test]
    fn test_out_of_bounds_box_is_clamped() {
        let mut image = RgbImage::new(50, 50);
        let bbox = BoundingBox::new(-10, -10, 200, 200);

        // Must not panic
        annotate_plate(&mut image, &bbox, "", None);
        assert_eq!(image.get_pixel(0, 0).0, [0, 255, 0]);
    }

    #[test]
    fn test_text_without_font_draws_box_only() {
        let mut with_text = RgbImage::new(100, 100);
        let mut without_text = RgbImage::new(100, 100);
        let bbox = BoundingBox::new(10, 40, 30, 20);

        annotate_plate(&mut with_text, &bbox, "ABC123", None);
        annotate_plate(&mut without_text, &bbox, "", None);

        assert_eq!(with_text.as_raw(), without_text.as_raw());
    }
}
