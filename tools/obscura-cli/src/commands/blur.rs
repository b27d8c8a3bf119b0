//! Blur faces across an ordered frame sequence.

use std::path::PathBuf;

use obscura_common::config::AppConfig;
use obscura_media_model::{parse_detections, FrameBuf};
use obscura_vision_core::{
    DirectoryCropSink, ReplayDetector, SadTracker, TrackingConfig, VideoSession,
};

pub fn run(
    frames_dir: PathBuf,
    detections_path: PathBuf,
    out_dir: PathBuf,
    detection_interval: u64,
    grace: u32,
    save_crop: bool,
) -> anyhow::Result<()> {
    let detections_content = std::fs::read_to_string(&detections_path).map_err(|_| {
        anyhow::anyhow!("Detections file not found: {}", detections_path.display())
    })?;
    let detections = parse_detections(&detections_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse detections: {e}"))?;
    println!("Loaded {} detections", detections.len());

    let frame_paths = list_frames(&frames_dir)?;
    if frame_paths.is_empty() {
        anyhow::bail!("No frames found in {}", frames_dir.display());
    }
    println!("Processing {} frames from {}", frame_paths.len(), frames_dir.display());

    let config = TrackingConfig {
        detection_interval,
        lost_grace_frames: grace,
        ..Default::default()
    };
    let mut session = VideoSession::new(
        config,
        Box::new(ReplayDetector::new(detections)),
        Box::new(SadTracker::with_defaults()),
    );
    if save_crop {
        let crops_dir = AppConfig::load().crops_dir;
        session = session.with_crop_sink(Box::new(DirectoryCropSink::new(crops_dir)));
    }

    std::fs::create_dir_all(&out_dir)?;

    let mut blurred_total = 0usize;
    for path in &frame_paths {
        let decoded = image::open(path)
            .map_err(|e| anyhow::anyhow!("Invalid image {}: {e}", path.display()))?
            .to_rgb8();
        let (width, height) = decoded.dimensions();
        let mut frame = FrameBuf::from_raw(width, height, decoded.into_raw())
            .map_err(|e| anyhow::anyhow!("Invalid image {}: {e}", path.display()))?;

        match session.process_frame(&mut frame) {
            obscura_vision_core::FrameVerdict::Processed { blurred } => blurred_total += blurred,
            obscura_vision_core::FrameVerdict::Reset => {
                tracing::warn!(path = %path.display(), "frame size changed, passing through");
            }
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Frame path has no file name: {}", path.display()))?;
        let out_path = out_dir.join(file_name);
        let (width, height) = frame.dimensions();
        let encoded = image::RgbImage::from_raw(width, height, frame.into_raw())
            .ok_or_else(|| anyhow::anyhow!("Frame buffer shape mismatch"))?;
        encoded
            .save(&out_path)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", out_path.display()))?;
    }

    println!(
        "Done: {} frames written to {} ({} regions blurred)",
        frame_paths.len(),
        out_dir.display(),
        blurred_total
    );
    Ok(())
}

/// Image files in the directory, sorted by filename.
fn list_frames(dir: &PathBuf) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|_| anyhow::anyhow!("Frames directory not found: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("png" | "jpg" | "jpeg" | "bmp")
            )
        })
        .collect();
    paths.sort();
    Ok(paths)
}
