//! # tvr-lpr
//!
//! License plate recognition utility for the TVR reporting service. Decodes a
//! photo or video frame, finds the plate with a pretrained object detector,
//! reads the text through a hosted vision API, and overlays the result for
//! display. Detection and recognition are delegated entirely to the wrapped
//! model and service.

pub mod annotate;
pub mod codec;
pub mod detector;
pub mod error;
pub mod ocr;
pub mod recognizer;
pub mod types;
pub mod video;

pub use codec::{bgr_to_rgb, DiskImageCodec, ImageCodec};
pub use detector::{DetectorConfig, OnnxPlateDetector, PlateDetector};
pub use error::{LprError, Result};
pub use ocr::{TextRecognizer, VisionOcrClient};
pub use recognizer::{PlateRecognizer, VideoStats};
pub use types::{BoundingBox, PlateRegion};
