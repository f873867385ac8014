//! Frame sources and sinks for video processing
//!
//! Decoding container formats is out of scope; callers extract frames with
//! their tool of choice and point [`ImageDirSource`] at the directory, or
//! implement [`FrameSource`] over a live decoder.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::codec::ImageCodec;
use crate::error::Result;

/// Pull-based frame supplier
pub trait FrameSource {
    /// Next frame, or None at end of stream
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Destination for processed frames
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;
}

/// Frame source over a directory of extracted frame images, in name order
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
    index: usize,
    codec: Box<dyn ImageCodec>,
}

impl ImageDirSource {
    pub fn new(dir: &Path, codec: Box<dyn ImageCodec>) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        Ok(Self {
            paths,
            index: 0,
            codec,
        })
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.get(self.index) else {
            return Ok(None);
        };
        self.index += 1;
        self.codec.load_image(path).map(Some)
    }
}

/// Frame sink writing numbered PNGs into a directory
pub struct ImageDirSink {
    dir: PathBuf,
    index: usize,
}

impl ImageDirSink {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            index: 0,
        })
    }
}

impl FrameSink for ImageDirSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.index));
        self.index += 1;
        frame
            .save(&path)
            .map_err(|e| crate::error::LprError::Image(format!("Failed to save frame: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DiskImageCodec;

    #[test]
    fn test_dir_source_reads_frames_in_name_order() {
        let tmp = tempfile::tempdir().unwrap();

        let mut first = RgbImage::new(2, 2);
        first.put_pixel(0, 0, image::Rgb([1, 0, 0]));
        first.save(tmp.path().join("frame_000000.png")).unwrap();

        let mut second = RgbImage::new(2, 2);
        second.put_pixel(0, 0, image::Rgb([2, 0, 0]));
        second.save(tmp.path().join("frame_000001.png")).unwrap();

        let mut source = ImageDirSource::new(tmp.path(), Box::new(DiskImageCodec)).unwrap();

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.get_pixel(0, 0).0, [1, 0, 0]);
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.get_pixel(0, 0).0, [2, 0, 0]);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_dir_sink_writes_numbered_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("out");

        let mut sink = ImageDirSink::new(&out_dir).unwrap();
        sink.write_frame(&RgbImage::new(2, 2)).unwrap();
        sink.write_frame(&RgbImage::new(2, 2)).unwrap();

        assert!(out_dir.join("frame_000000.png").exists());
        assert!(out_dir.join("frame_000001.png").exists());
    }
}
