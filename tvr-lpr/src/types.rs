//! Shared recognition types

use serde::{Deserialize, Serialize};

/// Vertical gap between a region and its text label, in pixels
pub const LABEL_OFFSET: i32 = 20;

/// Axis-aligned bounding box in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Where the text label is drawn: just above the box origin, clamped to
    /// stay inside the image
    pub fn label_origin(&self) -> (i32, i32) {
        (self.x, (self.y - LABEL_OFFSET).max(0))
    }

    /// Intersection-over-union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let intersection = ((x2 - x1).max(0) * (y2 - y1).max(0)) as f32;
        let union = (self.width * self.height + other.width * other.height) as f32 - intersection;

        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    /// Clamp the box to the bounds of a width x height image
    pub fn clamped(&self, image_width: u32, image_height: u32) -> BoundingBox {
        let x = self.x.clamp(0, image_width as i32 - 1);
        let y = self.y.clamp(0, image_height as i32 - 1);
        let width = self.width.min(image_width as i32 - x).max(1);
        let height = self.height.min(image_height as i32 - y).max(1);
        BoundingBox { x, y, width, height }
    }
}

/// Detected plate region with its confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateRegion {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_origin_above_box() {
        let bbox = BoundingBox::new(50, 50, 200, 200);
        assert_eq!(bbox.label_origin(), (50, 30));
    }

    #[test]
    fn test_label_origin_clamped_at_top_edge() {
        let bbox = BoundingBox::new(50, 10, 200, 200);
        assert_eq!(bbox.label_origin(), (50, 0));
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = BoundingBox::new(0, 0, 100, 100);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(100, 100, 10, 10);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        let a = BoundingBox::new(0, 0, 100, 100);
        let b = BoundingBox::new(50, 0, 100, 100);
        // Intersection 50x100 = 5000, union 15000
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_inside_image() {
        let bbox = BoundingBox::new(-10, -10, 50, 50).clamped(100, 100);
        assert_eq!(bbox.x, 0);
        assert_eq!(bbox.y, 0);

        let bbox = BoundingBox::new(90, 90, 50, 50).clamped(100, 100);
        assert_eq!(bbox.x + bbox.width, 100);
        assert_eq!(bbox.y + bbox.height, 100);
    }
}
