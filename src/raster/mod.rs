//! Immutable pixel buffers and the sampling/decoding helpers built on them.

pub(crate) mod decode;
pub(crate) mod image;
pub(crate) mod pool;
pub(crate) mod sample;
