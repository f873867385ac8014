//! Plate recognition pipeline
//!
//! Composes the codec, detector, and OCR seams: decode the image, find the
//! plate region, read its text, and overlay the result. All recognition work
//! happens in the wrapped components; this type only marshals arguments and
//! coordinates between stages.

use std::path::Path;

use ab_glyph::FontArc;
use image::RgbImage;
use tracing::debug;

use crate::annotate::annotate_plate;
use crate::codec::ImageCodec;
use crate::detector::PlateDetector;
use crate::error::Result;
use crate::ocr::TextRecognizer;
use crate::types::PlateRegion;
use crate::video::{FrameSink, FrameSource};

/// Per-run statistics for video processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoStats {
    /// Frames read from the source
    pub frames: u64,
    /// Frames on which a non-empty plate text was read
    pub plates_read: u64,
}

/// License plate recognizer
pub struct PlateRecognizer {
    codec: Box<dyn ImageCodec>,
    detector: Box<dyn PlateDetector>,
    ocr: Box<dyn TextRecognizer>,
    font: Option<FontArc>,
}

impl PlateRecognizer {
    pub fn new(
        codec: Box<dyn ImageCodec>,
        detector: Box<dyn PlateDetector>,
        ocr: Box<dyn TextRecognizer>,
    ) -> Self {
        Self {
            codec,
            detector,
            ocr,
            font: None,
        }
    }

    /// Use a font for the text overlay; without one only the box is drawn
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Recognize the plate in an image file
    ///
    /// Returns the recognized text (empty when no plate is found or the OCR
    /// reads nothing) together with the annotated image.
    pub async fn recognize_license_plate(&self, path: &Path) -> Result<(String, RgbImage)> {
        let image = self.codec.load_image(path)?;
        self.recognize_image(&image).await
    }

    /// Recognize the plate in an already-decoded image
    pub async fn recognize_image(&self, image: &RgbImage) -> Result<(String, RgbImage)> {
        let Some(region) = self.detect_plate(image)? else {
            debug!("No plate region detected");
            return Ok((String::new(), image.clone()));
        };

        let text = self.extract_plate_text(image, &region).await?;
        let annotated = self.annotate_image(image, &text, &region);

        Ok((text, annotated))
    }

    /// Locate the plate region, if any
    pub fn detect_plate(&self, image: &RgbImage) -> Result<Option<PlateRegion>> {
        self.detector.detect(image)
    }

    /// Crop the region and hand it to the OCR service
    pub async fn extract_plate_text(
        &self,
        image: &RgbImage,
        region: &PlateRegion,
    ) -> Result<String> {
        let bbox = region.bbox.clamped(image.width(), image.height());
        let roi = image::imageops::crop_imm(
            image,
            bbox.x as u32,
            bbox.y as u32,
            bbox.width as u32,
            bbox.height as u32,
        )
        .to_image();

        let encoded = self.codec.encode_png(&roi)?;
        self.ocr.recognize(&encoded).await
    }

    /// Overlay the region and text onto a copy of the image
    pub fn annotate_image(&self, image: &RgbImage, text: &str, region: &PlateRegion) -> RgbImage {
        let mut annotated = image.clone();
        annotate_plate(&mut annotated, &region.bbox, text, self.font.as_ref());
        annotated
    }

    /// Run recognition over every frame of a video, writing annotated frames
    /// to the sink
    pub async fn process_video(
        &self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> Result<VideoStats> {
        let mut stats = VideoStats::default();

        while let Some(frame) = source.next_frame()? {
            stats.frames += 1;

            let (text, annotated) = self.recognize_image(&frame).await?;
            if !text.is_empty() {
                stats.plates_read += 1;
            }

            sink.write_frame(&annotated)?;
        }

        debug!(
            "Processed {} frames, read {} plates",
            stats.frames, stats.plates_read
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LprError;
    use crate::types::BoundingBox;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Codec that returns a fixed image regardless of path
    struct FixedCodec {
        image: RgbImage,
    }

    impl ImageCodec for FixedCodec {
        fn load_image(&self, _path: &Path) -> Result<RgbImage> {
            Ok(self.image.clone())
        }

        fn encode_png(&self, image: &RgbImage) -> Result<Vec<u8>> {
            Ok(image.as_raw().clone())
        }
    }

    /// Detector that returns a fixed region (or nothing)
    struct FixedDetector {
        region: Option<PlateRegion>,
        calls: Arc<AtomicUsize>,
    }

    impl PlateDetector for FixedDetector {
        fn detect(&self, _image: &RgbImage) -> Result<Option<PlateRegion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.region)
        }
    }

    /// OCR that returns a fixed string and records what it was given
    struct FixedOcr {
        text: String,
        calls: Arc<AtomicUsize>,
        last_payload_len: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextRecognizer for FixedOcr {
        async fn recognize(&self, image_bytes: &[u8]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_payload_len
                .store(image_bytes.len(), Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    fn region(x: i32, y: i32, w: i32, h: i32) -> PlateRegion {
        PlateRegion {
            bbox: BoundingBox::new(x, y, w, h),
            confidence: 0.9,
        }
    }

    fn recognizer_with(
        image: RgbImage,
        detected: Option<PlateRegion>,
        ocr_text: &str,
    ) -> (PlateRecognizer, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let detector_calls = Arc::new(AtomicUsize::new(0));
        let ocr_calls = Arc::new(AtomicUsize::new(0));

        let recognizer = PlateRecognizer::new(
            Box::new(FixedCodec { image }),
            Box::new(FixedDetector {
                region: detected,
                calls: detector_calls.clone(),
            }),
            Box::new(FixedOcr {
                text: ocr_text.to_string(),
                calls: ocr_calls.clone(),
                last_payload_len: Arc::new(AtomicUsize::new(0)),
            }),
        );

        (recognizer, detector_calls, ocr_calls)
    }

    #[tokio::test]
    async fn test_recognize_returns_mocked_text_and_region() {
        let image = RgbImage::new(640, 480);
        let expected_region = region(50, 50, 200, 100);
        let (recognizer, detector_calls, ocr_calls) =
            recognizer_with(image.clone(), Some(expected_region), "ABC123");

        let detected = recognizer.detect_plate(&image).unwrap();
        assert_eq!(detected, Some(expected_region));

        let (text, annotated) = recognizer
            .recognize_license_plate(Path::new("mock_image.jpg"))
            .await
            .unwrap();

        assert_eq!(text, "ABC123");
        assert_eq!(annotated.dimensions(), image.dimensions());
        // Detector ran twice (explicit detect + pipeline), OCR once
        assert_eq!(detector_calls.load(Ordering::SeqCst), 2);
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_ocr_text_passes_through() {
        let image = RgbImage::new(640, 480);
        let (recognizer, _, _) = recognizer_with(image, Some(region(50, 50, 200, 100)), "");

        let (text, annotated) = recognizer
            .recognize_license_plate(Path::new("mock_image.jpg"))
            .await
            .unwrap();

        assert_eq!(text, "");
        assert_eq!(annotated.dimensions(), (640, 480));
    }

    #[tokio::test]
    async fn test_no_detection_skips_ocr() {
        let image = RgbImage::new(640, 480);
        let (recognizer, detector_calls, ocr_calls) = recognizer_with(image, None, "ABC123");

        let (text, _) = recognizer
            .recognize_license_plate(Path::new("mock_image.jpg"))
            .await
            .unwrap();

        assert_eq!(text, "");
        assert_eq!(detector_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ocr_receives_cropped_region() {
        let image = RgbImage::new(640, 480);
        let payload_len = Arc::new(AtomicUsize::new(0));

        let recognizer = PlateRecognizer::new(
            Box::new(FixedCodec {
                image: image.clone(),
            }),
            Box::new(FixedDetector {
                region: Some(region(50, 50, 200, 100)),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(FixedOcr {
                text: "XYZ".to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
                last_payload_len: payload_len.clone(),
            }),
        );

        recognizer.recognize_image(&image).await.unwrap();

        // FixedCodec "encodes" to raw RGB, so the payload length pins the crop
        assert_eq!(payload_len.load(Ordering::SeqCst), 200 * 100 * 3);
    }

    #[tokio::test]
    async fn test_annotation_marks_region_outline() {
        let image = RgbImage::new(640, 480);
        let (recognizer, _, _) = recognizer_with(image.clone(), Some(region(50, 50, 200, 100)), "A");

        let (_, annotated) = recognizer.recognize_image(&image).await.unwrap();

        assert_eq!(annotated.get_pixel(50, 50).0, [0, 255, 0]);
        assert_eq!(annotated.get_pixel(249, 50).0, [0, 255, 0]);
    }

    struct VecSource {
        frames: Vec<RgbImage>,
        index: usize,
    }

    impl FrameSource for VecSource {
        fn next_frame(&mut self) -> Result<Option<RgbImage>> {
            let frame = self.frames.get(self.index).cloned();
            self.index += 1;
            Ok(frame)
        }
    }

    #[derive(Default)]
    struct VecSink {
        written: Vec<RgbImage>,
    }

    impl FrameSink for VecSink {
        fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
            self.written.push(frame.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_process_video_visits_every_frame_once() {
        let image = RgbImage::new(64, 48);
        let (recognizer, detector_calls, _) =
            recognizer_with(image.clone(), Some(region(5, 5, 20, 10)), "PLT-1");

        let mut source = VecSource {
            frames: vec![image.clone(), image.clone(), image],
            index: 0,
        };
        let mut sink = VecSink::default();

        let stats = recognizer
            .process_video(&mut source, &mut sink)
            .await
            .unwrap();

        assert_eq!(stats.frames, 3);
        assert_eq!(stats.plates_read, 3);
        assert_eq!(sink.written.len(), 3);
        assert_eq!(detector_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_process_video_empty_source() {
        let (recognizer, _, _) = recognizer_with(RgbImage::new(8, 8), None, "");

        let mut source = VecSource {
            frames: Vec::new(),
            index: 0,
        };
        let mut sink = VecSink::default();

        let stats = recognizer
            .process_video(&mut source, &mut sink)
            .await
            .unwrap();
        assert_eq!(stats, VideoStats::default());
    }

    /// Detector errors surface instead of being swallowed
    struct FailingDetector;

    impl PlateDetector for FailingDetector {
        fn detect(&self, _image: &RgbImage) -> Result<Option<PlateRegion>> {
            Err(LprError::Detection("model exploded".to_string()))
        }
    }

    #[tokio::test]
    async fn test_detector_error_propagates() {
        let recognizer = PlateRecognizer::new(
            Box::new(FixedCodec {
                image: RgbImage::new(8, 8),
            }),
            Box::new(FailingDetector),
            Box::new(FixedOcr {
                text: String::new(),
                calls: Arc::new(AtomicUsize::new(0)),
                last_payload_len: Arc::new(AtomicUsize::new(0)),
            }),
        );

        let result = recognizer
            .recognize_license_plate(Path::new("mock_image.jpg"))
            .await;
        assert!(matches!(result, Err(LprError::Detection(_))));
    }
}
