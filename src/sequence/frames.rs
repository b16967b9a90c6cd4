use std::iter::FusedIterator;

use crate::distort::params::DistortionParams;
use crate::distort::sampler::distort;
use crate::foundation::core::{FrameIndex, Point};
use crate::foundation::error::{WarpmorphError, WarpmorphResult};
use crate::morph::blend::MorphBlender;
use crate::morph::params::MorphParams;
use crate::raster::image::{Frame, Image};
use crate::raster::pool::BufferPool;

/// Random-access view of a generation run: every frame is a pure function of its index.
///
/// `Scratch` is per-worker state reused across frames (one per rayon worker when rendering in
/// parallel).
pub trait FrameSource: Sync {
    type Scratch: Send;

    fn frame_count(&self) -> u64;

    fn dimensions(&self) -> (u32, u32);

    fn new_scratch(&self) -> Self::Scratch;

    fn render_with(&self, index: FrameIndex, scratch: &mut Self::Scratch)
    -> WarpmorphResult<Image>;

    fn render_frame(&self, index: FrameIndex) -> WarpmorphResult<Image> {
        let mut scratch = self.new_scratch();
        self.render_with(index, &mut scratch)
    }
}

fn check_index(index: FrameIndex, frame_count: u64) -> WarpmorphResult<()> {
    if index.0 >= frame_count {
        return Err(WarpmorphError::validation(format!(
            "frame {} is outside 0..{frame_count}",
            index.0
        )));
    }
    Ok(())
}

/// Animated distortion of one still image.
#[derive(Clone, Debug)]
pub struct DistortionSequence {
    image: Image,
    params: DistortionParams,
    frame_count: u64,
}

impl DistortionSequence {
    pub fn params(&self) -> &DistortionParams {
        &self.params
    }
}

impl FrameSource for DistortionSequence {
    type Scratch = ();

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn new_scratch(&self) -> Self::Scratch {}

    fn render_with(&self, index: FrameIndex, _: &mut ()) -> WarpmorphResult<Image> {
        check_index(index, self.frame_count)?;
        let time = self.params.time_at(index.0, self.frame_count);
        distort(&self.image, &self.params, time)
    }
}

/// Morph between two images; the triangulation is computed once at construction.
#[derive(Clone, Debug)]
pub struct MorphSequence {
    blender: MorphBlender,
    params: MorphParams,
}

impl MorphSequence {
    pub fn blender(&self) -> &MorphBlender {
        &self.blender
    }

    pub fn params(&self) -> &MorphParams {
        &self.params
    }
}

impl FrameSource for MorphSequence {
    type Scratch = BufferPool<u32>;

    fn frame_count(&self) -> u64 {
        self.params.frame_count
    }

    fn dimensions(&self) -> (u32, u32) {
        self.blender.dimensions()
    }

    fn new_scratch(&self) -> Self::Scratch {
        BufferPool::default()
    }

    fn render_with(
        &self,
        index: FrameIndex,
        pool: &mut BufferPool<u32>,
    ) -> WarpmorphResult<Image> {
        check_index(index, self.params.frame_count)?;
        self.blender.render_pooled(self.params.t_at(index.0), pool)
    }
}

/// Lazy, in-order frame iterator over a [`FrameSource`]. Fused after the first error.
pub struct Frames<S: FrameSource> {
    source: S,
    scratch: S::Scratch,
    next: u64,
    failed: bool,
}

pub type DistortionFrames = Frames<DistortionSequence>;
pub type MorphFrames = Frames<MorphSequence>;

impl<S: FrameSource> Frames<S> {
    fn new(source: S) -> Self {
        let scratch = source.new_scratch();
        Self {
            source,
            scratch,
            next: 0,
            failed: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drop the iterator state and keep the random-access source (e.g. for [`run_to_sink`]).
    ///
    /// [`run_to_sink`]: crate::run_to_sink
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: FrameSource> Iterator for Frames<S> {
    type Item = WarpmorphResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.source.frame_count() {
            return None;
        }
        let index = FrameIndex(self.next);
        self.next += 1;

        let res = self.source.render_with(index, &mut self.scratch);
        tracing::debug!(frame = index.0, ok = res.is_ok(), "frame generated");
        match res {
            Ok(image) => Some(Ok(Frame { index, image })),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = self.source.frame_count().saturating_sub(self.next);
        let left = usize::try_from(left).unwrap_or(usize::MAX);
        (0, Some(left))
    }
}

impl<S: FrameSource> FusedIterator for Frames<S> {}

/// Validate and prepare a `frame_count`-frame distortion of `image`.
#[tracing::instrument(level = "debug", skip(image, params), fields(w = image.width(), h = image.height()))]
pub fn generate_distortion_frames(
    image: &Image,
    params: DistortionParams,
    frame_count: u64,
) -> WarpmorphResult<DistortionFrames> {
    if frame_count == 0 {
        return Err(WarpmorphError::validation("frame_count must be >= 1"));
    }
    let (w, h) = image.dimensions();
    params.validate(w, h)?;
    Ok(Frames::new(DistortionSequence {
        image: image.clone(),
        params,
        frame_count,
    }))
}

/// Validate both images and point sets, triangulate once, and prepare the morph frames.
#[tracing::instrument(level = "debug", skip_all, fields(points = points_a.len(), frames = params.frame_count))]
pub fn generate_morph_frames(
    image_a: &Image,
    points_a: &[Point],
    image_b: &Image,
    points_b: &[Point],
    params: MorphParams,
) -> WarpmorphResult<MorphFrames> {
    params.validate()?;
    let blender = MorphBlender::prepare(image_a, points_a, image_b, points_b)?
        .with_cross_dissolve(params.cross_dissolve);
    tracing::debug!(triangles = blender.triangulation().len(), "morph prepared");
    Ok(Frames::new(MorphSequence { blender, params }))
}

/// Distort a stream of video frames; frame `f` of the stream uses the run time for index `f`.
///
/// `period` is the frame count used by looped noise to map indices onto the loop phase; other
/// effects ignore it.
pub fn distort_frame_stream<I>(
    frames: I,
    params: DistortionParams,
    period: u64,
) -> DistortStream<I::IntoIter>
where
    I: IntoIterator<Item = Image>,
{
    DistortStream {
        inner: frames.into_iter(),
        params,
        period,
        next: 0,
        done: false,
    }
}

/// Iterator returned by [`distort_frame_stream`]. Fused after the first error.
pub struct DistortStream<I> {
    inner: I,
    params: DistortionParams,
    period: u64,
    next: u64,
    done: bool,
}

impl<I: Iterator<Item = Image>> Iterator for DistortStream<I> {
    type Item = WarpmorphResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(src) = self.inner.next() else {
            self.done = true;
            return None;
        };
        let index = FrameIndex(self.next);
        self.next += 1;

        let time = self.params.time_at(index.0, self.period);
        match distort(&src, &self.params, time) {
            Ok(image) => Some(Ok(Frame { index, image })),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<I: Iterator<Item = Image>> FusedIterator for DistortStream<I> {}

#[cfg(test)]
#[path = "../../tests/unit/sequence/frames.rs"]
mod tests;
