use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::WarpmorphResult;
use crate::raster::image::Image;

/// Configuration provided to a [`FrameSink`] at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Sink contract for consuming generated frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, starting
/// at 0, between one `begin` and one `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> WarpmorphResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &Image) -> WarpmorphResult<()>;
    fn end(&mut self) -> WarpmorphResult<()>;
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn begin(&mut self, cfg: SinkConfig) -> WarpmorphResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Image) -> WarpmorphResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> WarpmorphResult<()> {
        (**self).end()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    ended: bool,
    /// Frames in delivery order.
    pub frames: Vec<(FrameIndex, Image)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// `true` once `end` has been called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> WarpmorphResult<()> {
        self.cfg = Some(cfg);
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Image) -> WarpmorphResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> WarpmorphResult<()> {
        self.ended = true;
        Ok(())
    }
}
