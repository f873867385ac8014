//! License plate detection
//!
//! The concrete detector wraps a pretrained YOLOv5-style ONNX model. The
//! repository contributes no detection algorithm of its own - preprocessing,
//! output decoding, and non-maximum suppression are the only logic here.

use image::RgbImage;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::{LprError, Result};
use crate::types::{BoundingBox, PlateRegion};

/// Object detection seam
pub trait PlateDetector: Send + Sync {
    /// Detect the most confident plate region, if any
    fn detect(&self, image: &RgbImage) -> Result<Option<PlateRegion>>;
}

/// Detector configuration
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Square input size the model was exported with
    pub input_size: u32,
    /// Objectness threshold
    pub confidence_threshold: f32,
    /// Class score threshold
    pub class_threshold: f32,
    /// IoU threshold for non-maximum suppression
    pub iou_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            confidence_threshold: 0.4,
            class_threshold: 0.25,
            iou_threshold: 0.5,
        }
    }
}

/// YOLOv5-style ONNX plate detector
pub struct OnnxPlateDetector {
    /// Inference takes the session mutably; the lock keeps detect() shareable
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    config: DetectorConfig,
}

impl OnnxPlateDetector {
    /// Load the ONNX model from a file
    pub fn new(model_path: &Path, config: DetectorConfig) -> Result<Self> {
        info!("Loading plate detection model from {:?}", model_path);

        let session = load_session(model_path)
            .map_err(|e| LprError::Detection(format!("Failed to load model: {}", e)))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| LprError::Detection("Model has no inputs".to_string()))?;

        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| LprError::Detection("Model has no outputs".to_string()))?;

        info!("Model loaded. Input: {}, output: {}", input_name, output_name);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            config,
        })
    }
}

impl PlateDetector for OnnxPlateDetector {
    fn detect(&self, image: &RgbImage) -> Result<Option<PlateRegion>> {
        let tensor = image_to_tensor(image, self.config.input_size);

        let mut session = self
            .session
            .lock()
            .map_err(|_| LprError::Detection("Detector lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![
                self.input_name.as_str() => TensorRef::from_array_view(&tensor)
                    .map_err(|e| LprError::Detection(format!("Failed to build input: {}", e)))?
            ])
            .map_err(|e| LprError::Detection(format!("Inference failed: {}", e)))?;

        let output = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()
            .map_err(|e| LprError::Detection(format!("Failed to read output: {}", e)))?;

        // Output shape is [1, anchors, row_len] with row layout
        // cx, cy, w, h, objectness, class scores...
        let row_len = *output
            .shape()
            .last()
            .ok_or_else(|| LprError::Detection("Output tensor has no shape".to_string()))?;

        let output = output
            .as_slice()
            .ok_or_else(|| LprError::Detection("Output tensor not contiguous".to_string()))?;

        let x_factor = image.width() as f32 / self.config.input_size as f32;
        let y_factor = image.height() as f32 / self.config.input_size as f32;

        let candidates = decode_predictions(
            output,
            row_len,
            x_factor,
            y_factor,
            self.config.confidence_threshold,
            self.config.class_threshold,
        );
        debug!("{} candidate boxes above threshold", candidates.len());

        let kept = non_max_suppression(candidates, self.config.iou_threshold);

        // Only the single most confident plate is of interest
        Ok(kept
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|region| PlateRegion {
                bbox: region.bbox.clamped(image.width(), image.height()),
                confidence: region.confidence,
            }))
    }
}

fn load_session(model_path: &Path) -> ort::Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(model_path)
}

/// Resize to the model's square input and normalize to NCHW [0,1] floats
pub fn image_to_tensor(image: &RgbImage, input_size: u32) -> Array4<f32> {
    let resized = image::imageops::resize(
        image,
        input_size,
        input_size,
        image::imageops::FilterType::Triangle,
    );

    let size = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel.0[c] as f32 / 255.0;
        }
    }

    tensor
}

/// Decode raw predictions into image-space candidate boxes
///
/// Each row holds cx, cy, w, h in model input coordinates followed by the
/// objectness score and per-class scores. Coordinates are scaled back to the
/// source image by the per-axis factors.
pub fn decode_predictions(
    output: &[f32],
    row_len: usize,
    x_factor: f32,
    y_factor: f32,
    confidence_threshold: f32,
    class_threshold: f32,
) -> Vec<PlateRegion> {
    let mut candidates = Vec::new();

    if row_len < 6 {
        return candidates;
    }

    for row in output.chunks_exact(row_len) {
        let confidence = row[4];
        if confidence <= confidence_threshold {
            continue;
        }

        let class_score = row[5..].iter().fold(f32::MIN, |acc, &s| acc.max(s));
        if class_score <= class_threshold {
            continue;
        }

        let cx = row[0];
        let cy = row[1];
        let w = row[2];
        let h = row[3];

        let left = (cx - 0.5 * w) * x_factor;
        let top = (cy - 0.5 * h) * y_factor;
        let width = w * x_factor;
        let height = h * y_factor;

        candidates.push(PlateRegion {
            bbox: BoundingBox::new(left as i32, top as i32, width as i32, height as i32),
            confidence,
        });
    }

    candidates
}

/// Greedy IoU-based non-maximum suppression
pub fn non_max_suppression(mut candidates: Vec<PlateRegion>, iou_threshold: f32) -> Vec<PlateRegion> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<PlateRegion> = Vec::new();
    for candidate in candidates {
        if kept
            .iter()
            .all(|k| k.bbox.iou(&candidate.bbox) <= iou_threshold)
        {
            kept.push(candidate);
        }
    }

    kept
}
