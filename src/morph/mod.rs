//! Feature-based morphing: point sets, Delaunay triangulation, per-triangle warp and blend.

pub(crate) mod affine;
pub(crate) mod blend;
pub(crate) mod params;
pub(crate) mod points;
pub(crate) mod triangulate;
