//! warpmorph is an image-transformation engine for animated procedural distortions and
//! feature-based morphing.
//!
//! - Distort a still image with [`generate_distortion_frames`] (wave or coherent-noise warps), or a
//!   video frame stream with [`distort_frame_stream`]
//! - Morph between two images through corresponding control points with [`generate_morph_frames`]
//! - Stream any generation into a [`FrameSink`] with [`run_to_sink`]
//!
//! Generations are lazy and deterministic: the same inputs always yield the same frames.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod distort;
pub(crate) mod encode;
pub(crate) mod morph;
pub(crate) mod noise;
pub(crate) mod raster;
pub(crate) mod sequence;

pub use crate::foundation::core::{Affine, Fps, FrameIndex, Point, Vec2};
pub use crate::foundation::error::{WarpmorphError, WarpmorphResult};

pub use crate::animation::ease::Ease;
pub use crate::distort::params::{
    DistortionParams, NoiseParams, WaveAxes, WaveComponent, WaveParams, WaveShape,
    phase_step_for_loop,
};
pub use crate::distort::sampler::distort;
pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, OutputFormat, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::encode::sink_for_path;
pub use crate::morph::affine::triangle_to_triangle;
pub use crate::morph::blend::MorphBlender;
pub use crate::morph::params::MorphParams;
pub use crate::morph::points::{
    image_corners, interpolate_points, validate_point_pair, validate_point_set,
    with_boundary_point_pair,
};
pub use crate::morph::triangulate::{Triangulation, triangulate};
pub use crate::noise::field::NoiseField;
pub use crate::raster::decode::{decode_image, load_image, resize_image, save_png};
pub use crate::raster::image::{Channels, Frame, Image};
pub use crate::sequence::cancel::CancelToken;
pub use crate::sequence::frames::{
    DistortStream, DistortionFrames, DistortionSequence, FrameSource, Frames, MorphFrames,
    MorphSequence, distort_frame_stream, generate_distortion_frames, generate_morph_frames,
};
pub use crate::sequence::runner::{Progress, RunOpts, RunStats, run_to_sink};
