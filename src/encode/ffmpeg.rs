use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WarpmorphError, WarpmorphResult};
use crate::raster::image::{Channels, Image};

/// Container/codec family chosen from the output file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// H.264 in MP4, yuv420p.
    Mp4,
    /// VP9 in WebM.
    Webm,
    /// Animated GIF, looping.
    Gif,
    /// Animated WebP, looping, alpha preserved.
    Webp,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> WarpmorphResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::Webp),
            _ => Err(WarpmorphError::validation(format!(
                "unsupported output extension '{ext}' for '{}' (expected mp4, webm, gif or webp)",
                path.display()
            ))),
        }
    }

    /// Whether frames are streamed with alpha; other formats get alpha flattened first.
    fn keeps_alpha(self) -> bool {
        matches!(self, Self::Webp)
    }

    fn output_args(self) -> &'static [&'static str] {
        match self {
            // yuv420p needs even dimensions; pad odd sizes by one pixel.
            Self::Mp4 => &[
                "-vf",
                "pad=ceil(iw/2)*2:ceil(ih/2)*2",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ],
            Self::Webm => &[
                "-vf",
                "pad=ceil(iw/2)*2:ceil(ih/2)*2",
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                "yuv420p",
                "-b:v",
                "0",
                "-crf",
                "32",
            ],
            Self::Gif => &["-loop", "0", "-f", "gif"],
            Self::Webp => &["-c:v", "libwebp", "-lossless", "0", "-q:v", "80", "-loop", "0"],
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    pub format: OutputFormat,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha for formats without it (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Options for `out_path`, with the format taken from its extension.
    pub fn new(out_path: impl Into<PathBuf>) -> WarpmorphResult<Self> {
        let out_path = out_path.into();
        let format = OutputFormat::from_path(&out_path)?;
        Ok(Self {
            out_path,
            format,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        })
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn input_pix_fmt(&self) -> &'static str {
        if self.opts.format.keeps_alpha() {
            "rgba"
        } else {
            "rgb24"
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> WarpmorphResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(WarpmorphError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(WarpmorphError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(WarpmorphError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(WarpmorphError::evaluation(
                "ffmpeg is required for video output, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            self.input_pix_fmt(),
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);
        cmd.args(self.opts.format.output_args());
        cmd.arg(&self.opts.out_path);
        tracing::debug!(?cmd, "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            WarpmorphError::evaluation(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WarpmorphError::evaluation("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| WarpmorphError::evaluation("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let bpp = if self.opts.format.keeps_alpha() { 4 } else { 3 };
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * bpp];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Image) -> WarpmorphResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WarpmorphError::evaluation("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(WarpmorphError::evaluation(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(WarpmorphError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        let bytes: &[u8] = match (self.opts.format.keeps_alpha(), frame.channels()) {
            (false, Channels::Rgb) => frame.as_bytes(),
            (false, Channels::Rgba) => {
                flatten_over_bg_to_rgb8(&mut self.scratch, frame.as_bytes(), self.opts.bg_rgba)?;
                &self.scratch
            }
            (true, Channels::Rgba) => frame.as_bytes(),
            (true, Channels::Rgb) => {
                expand_rgb8_to_opaque_rgba8(&mut self.scratch, frame.as_bytes())?;
                &self.scratch
            }
        };

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(WarpmorphError::evaluation("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(bytes).map_err(|e| {
            WarpmorphError::evaluation(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> WarpmorphResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| WarpmorphError::evaluation("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            WarpmorphError::evaluation(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WarpmorphError::evaluation("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| {
                    WarpmorphError::evaluation(format!("ffmpeg stderr read failed: {e}"))
                })?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(WarpmorphError::evaluation(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        tracing::info!(path = %self.opts.out_path.display(), "ffmpeg output finalized");
        Ok(())
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Composite straight-alpha RGBA8 over an opaque background into RGB8.
fn flatten_over_bg_to_rgb8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> WarpmorphResult<()> {
    if !src.len().is_multiple_of(4) || dst.len() / 3 != src.len() / 4 {
        return Err(WarpmorphError::validation(
            "flatten_over_bg_to_rgb8 expects matching rgba8/rgb8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - a;
        for k in 0..3 {
            let v = u16::from(s[k]) * a + u16::from(bg_rgba[k]) * inv;
            d[k] = ((v + 127) / 255) as u8;
        }
    }
    Ok(())
}

fn expand_rgb8_to_opaque_rgba8(dst: &mut [u8], src: &[u8]) -> WarpmorphResult<()> {
    if !src.len().is_multiple_of(3) || dst.len() / 4 != src.len() / 3 {
        return Err(WarpmorphError::validation(
            "expand_rgb8_to_opaque_rgba8 expects matching rgb8/rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(3)) {
        d[..3].copy_from_slice(s);
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> WarpmorphResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
