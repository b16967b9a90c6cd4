//! Frame sinks: where generated frames go once the sequencer hands them over.

pub(crate) mod ffmpeg;
pub(crate) mod png;
pub(crate) mod sink;

use std::path::Path;

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::png::PngSequenceSink;
use crate::encode::sink::FrameSink;
use crate::foundation::error::WarpmorphResult;

/// Pick a sink for an output path.
///
/// A path ending in a separator, or with no extension, is a PNG-sequence directory; otherwise the
/// extension selects the ffmpeg container (`mp4`, `webm`, `gif`, `webp`).
pub fn sink_for_path(path: &Path) -> WarpmorphResult<Box<dyn FrameSink>> {
    if is_sequence_dir(path) {
        return Ok(Box::new(PngSequenceSink::new(path)));
    }
    Ok(Box::new(FfmpegSink::new(FfmpegSinkOpts::new(path)?)))
}

pub(crate) fn is_sequence_dir(path: &Path) -> bool {
    let s = path.as_os_str().to_string_lossy();
    s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR) || path.extension().is_none()
}
