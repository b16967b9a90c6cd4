//! Animated procedural distortions (wave and coherent-noise warps).

pub(crate) mod params;
pub(crate) mod sampler;
