use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WarpmorphError, WarpmorphResult};
use crate::raster::image::Image;
use crate::sequence::cancel::CancelToken;
use crate::sequence::frames::FrameSource;

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Options controlling [`run_to_sink`].
#[derive(Clone, Debug)]
pub struct RunOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames dispatched to the pool per batch.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Bounded channel capacity between frame workers and the sink thread.
    pub channel_capacity: usize,
    /// Frame rate handed to the sink.
    pub fps: Fps,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            channel_capacity: 4,
            fps: Fps::DEFAULT,
        }
    }
}

/// Reported after each frame reaches the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub frame_index: FrameIndex,
    pub total_frames: u64,
}

/// Outcome of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames the source would produce.
    pub frames_total: u64,
    /// Frames handed to the sink, always a prefix `0..frames_delivered`.
    pub frames_delivered: u64,
    pub cancelled: bool,
}

/// Render every frame of `source` and stream them into `sink` in index order.
///
/// The sink runs on its own thread behind a bounded channel, so a slow sink throttles frame
/// production instead of dropping frames. With `parallel`, out-of-order worker completion is
/// reordered at the sink boundary. When `cancel` fires, no new frames are started; the sink
/// receives the contiguous prefix that finished, then `end()`.
#[tracing::instrument(skip_all, fields(frames = source.frame_count(), parallel = opts.parallel))]
pub fn run_to_sink<S: FrameSource>(
    source: &S,
    sink: &mut dyn FrameSink,
    opts: &RunOpts,
    cancel: &CancelToken,
    progress: &mut (dyn FnMut(Progress) + Send),
) -> WarpmorphResult<RunStats> {
    let total = source.frame_count();
    if total == 0 {
        return Err(WarpmorphError::validation("run needs at least one frame"));
    }
    let (width, height) = source.dimensions();
    let cfg = SinkConfig {
        width,
        height,
        fps: opts.fps,
    };

    let cap = opts.channel_capacity.max(1);
    let bytes_per_frame = u64::from(width)
        .saturating_mul(u64::from(height))
        .saturating_mul(4)
        .max(1);
    let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
    let chunk_size = normalized_chunk_size(opts.chunk_size)
        .min(max_chunk_by_mem)
        .min(total);

    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    std::thread::scope(|scope| -> WarpmorphResult<RunStats> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
        let sink_ref: &mut dyn FrameSink = sink;
        let progress_ref: &mut (dyn FnMut(Progress) + Send) = progress;

        // Sink thread: in-order delivery regardless of completion order. Stops at the first gap
        // once producers hang up.
        let writer = scope.spawn(move || -> WarpmorphResult<u64> {
            sink_ref.begin(cfg)?;

            let mut next = 0u64;
            let mut pending = HashMap::<u64, Image>::new();
            while next < total {
                let Ok(msg) = rx.recv() else {
                    break;
                };
                pending.insert(msg.idx.0, msg.image);
                while let Some(image) = pending.remove(&next) {
                    sink_ref.push_frame(FrameIndex(next), &image)?;
                    progress_ref(Progress {
                        frame_index: FrameIndex(next),
                        total_frames: total,
                    });
                    next += 1;
                }
            }
            if !pending.is_empty() {
                tracing::debug!(discarded = pending.len(), "dropping frames past the first gap");
            }

            sink_ref.end()?;
            Ok(next)
        });

        let produced = match pool.as_ref() {
            Some(pool) => produce_parallel(source, pool, &tx, cancel, total, chunk_size),
            None => produce_sequential(source, &tx, cancel, total),
        };

        drop(tx);
        let written = writer
            .join()
            .map_err(|_| WarpmorphError::evaluation("sink thread panicked"))?;

        // A sink failure closes the channel, so report it ahead of the producer's send error.
        let delivered = written?;
        let cancelled = produced?;

        if !cancelled && delivered != total {
            return Err(WarpmorphError::evaluation(format!(
                "sink received {delivered} of {total} frames"
            )));
        }
        if cancelled {
            tracing::info!(delivered, total, "run cancelled");
        } else {
            tracing::info!(delivered, "run complete");
        }
        Ok(RunStats {
            frames_total: total,
            frames_delivered: delivered,
            cancelled,
        })
    })
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    image: Image,
}

fn send(tx: &mpsc::SyncSender<FrameMsg>, idx: FrameIndex, image: Image) -> WarpmorphResult<()> {
    tx.send(FrameMsg { idx, image })
        .map_err(|_| WarpmorphError::evaluation("sink thread is not accepting frames"))
}

/// Returns whether the run was cancelled.
fn produce_sequential<S: FrameSource>(
    source: &S,
    tx: &mpsc::SyncSender<FrameMsg>,
    cancel: &CancelToken,
    total: u64,
) -> WarpmorphResult<bool> {
    let mut scratch = source.new_scratch();
    for f in 0..total {
        if cancel.is_cancelled() {
            return Ok(true);
        }
        let image = source.render_with(FrameIndex(f), &mut scratch)?;
        send(tx, FrameIndex(f), image)?;
    }
    Ok(false)
}

fn produce_parallel<S: FrameSource>(
    source: &S,
    pool: &rayon::ThreadPool,
    tx: &mpsc::SyncSender<FrameMsg>,
    cancel: &CancelToken,
    total: u64,
    chunk_size: u64,
) -> WarpmorphResult<bool> {
    let skipped = AtomicBool::new(false);
    let mut chunk_start = 0u64;
    while chunk_start < total {
        if cancel.is_cancelled() {
            return Ok(true);
        }
        let chunk_end = (chunk_start + chunk_size).min(total);
        let tx = tx.clone();
        pool.install(|| {
            (chunk_start..chunk_end).into_par_iter().try_for_each_init(
                || source.new_scratch(),
                |scratch, f| -> WarpmorphResult<()> {
                    if cancel.is_cancelled() {
                        skipped.store(true, Ordering::Relaxed);
                        return Ok(());
                    }
                    let image = source.render_with(FrameIndex(f), scratch)?;
                    send(&tx, FrameIndex(f), image)
                },
            )
        })?;
        chunk_start = chunk_end;
    }
    Ok(skipped.load(Ordering::Relaxed))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> WarpmorphResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(WarpmorphError::validation(
            "run 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| WarpmorphError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/runner.rs"]
mod tests;
