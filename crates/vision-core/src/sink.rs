//! Diagnostic crop sink.
//!
//! The session writes one face crop per stream lifetime through this seam.
//! The sink is injected at construction; the "already fired" latch lives in
//! the session, so a sink only ever decides *where* a crop goes.

use std::path::PathBuf;

use chrono::Utc;
use obscura_common::{ObscuraError, ObscuraResult};
use obscura_media_model::FrameBuf;

/// Receives the one-shot diagnostic face crop.
pub trait CropSink {
    fn save(&mut self, crop: &FrameBuf) -> ObscuraResult<()>;
}

/// Discards crops. The default for headless sessions.
#[derive(Debug, Default)]
pub struct NullCropSink;

impl CropSink for NullCropSink {
    fn save(&mut self, _crop: &FrameBuf) -> ObscuraResult<()> {
        Ok(())
    }
}

/// Writes crops as PNG files into a directory, one per call, with a
/// timestamp-derived collision-resistant filename.
#[derive(Debug, Clone)]
pub struct DirectoryCropSink {
    dir: PathBuf,
}

impl DirectoryCropSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CropSink for DirectoryCropSink {
    fn save(&mut self, crop: &FrameBuf) -> ObscuraResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let path = self.dir.join(format!("face_{stamp}.png"));

        let (width, height) = crop.dimensions();
        let img = image::RgbImage::from_raw(width, height, crop.data().to_vec())
            .ok_or_else(|| ObscuraError::vision("crop buffer shape mismatch"))?;
        img.save(&path)
            .map_err(|e| ObscuraError::vision(format!("failed to write {}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), "saved diagnostic face crop");
        Ok(())
    }
}
