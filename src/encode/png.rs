use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WarpmorphError, WarpmorphResult};
use crate::raster::decode::save_png;
use crate::raster::image::Image;

/// Writes each frame to `<dir>/frame_00000.png`, `frame_00001.png`, ...
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            written: Vec::new(),
        }
    }

    pub fn frame_path(dir: &Path, idx: FrameIndex) -> PathBuf {
        dir.join(format!("frame_{:05}.png", idx.0))
    }

    /// Files written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> WarpmorphResult<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Image) -> WarpmorphResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WarpmorphError::evaluation("png sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(WarpmorphError::evaluation(
                "png sink received out-of-order frame index",
            ));
        }
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(WarpmorphError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        self.last_idx = Some(idx);

        let path = Self::frame_path(&self.dir, idx);
        save_png(frame, &path)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> WarpmorphResult<()> {
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
