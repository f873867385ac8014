//! tvr-lpr - recognize a license plate in a photo or extracted video frames

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tvr_lpr::annotate::load_font;
use tvr_lpr::video::{ImageDirSink, ImageDirSource};
use tvr_lpr::{DetectorConfig, DiskImageCodec, OnnxPlateDetector, PlateRecognizer, VisionOcrClient};

#[derive(Parser, Debug)]
#[command(name = "tvr-lpr", about = "License plate recognition utility")]
struct Args {
    /// Image file to recognize
    #[arg(required_unless_present = "frames")]
    image: Option<PathBuf>,

    /// Directory of extracted video frames to process instead of one image
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Where to write the annotated image (or frames, with --frames)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Plate detection ONNX model
    #[arg(long, default_value = "models/plate_best.onnx")]
    model: PathBuf,

    /// TTF font for the text overlay
    #[arg(long)]
    font: Option<PathBuf>,

    /// Vision API key
    #[arg(long, env = "TVR_VISION_API_KEY")]
    api_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let detector = OnnxPlateDetector::new(&args.model, DetectorConfig::default())
        .context("Failed to load detection model")?;
    let ocr = VisionOcrClient::new(args.api_key).context("Failed to build OCR client")?;

    let mut recognizer =
        PlateRecognizer::new(Box::new(DiskImageCodec), Box::new(detector), Box::new(ocr));
    if let Some(font_path) = &args.font {
        recognizer = recognizer.with_font(load_font(font_path)?);
    }

    if let Some(frames_dir) = &args.frames {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| frames_dir.join("annotated"));

        let mut source = ImageDirSource::new(frames_dir, Box::new(DiskImageCodec))?;
        let mut sink = ImageDirSink::new(&output)?;

        let stats = recognizer.process_video(&mut source, &mut sink).await?;
        info!(
            "Processed {} frames, read {} plates, annotated frames in {}",
            stats.frames,
            stats.plates_read,
            output.display()
        );
        return Ok(());
    }

    let image = args.image.expect("clap enforces image or --frames");
    let (text, annotated) = recognizer.recognize_license_plate(&image).await?;

    if text.is_empty() {
        println!("No plate text recognized");
    } else {
        println!("{}", text);
    }

    if let Some(output) = &args.output {
        annotated
            .save(output)
            .with_context(|| format!("Failed to save {}", output.display()))?;
        info!("Annotated image written to {}", output.display());
    }

    Ok(())
}
