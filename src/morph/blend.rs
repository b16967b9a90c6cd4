use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::{Affine, Point};
use crate::foundation::error::{WarpmorphError, WarpmorphResult};
use crate::foundation::math::{lerp, to_u8};
use crate::morph::affine::{Barycentric, triangle_to_triangle};
use crate::morph::points::{interpolate_points, validate_point_pair};
use crate::morph::triangulate::{Triangulation, triangulate};
use crate::raster::image::Image;
use crate::raster::pool::{BufferKey, BufferPool};
use crate::raster::sample::sample_bilinear;

const NO_OWNER: u32 = u32::MAX;
/// Barycentric slack so pixel centres on shared edges are never missed.
const INSIDE_EPS: f64 = 1e-9;

/// Per-frame geometry of one interpolated triangle.
struct TriangleMap {
    bary: Barycentric,
    /// Interpolated-frame pixel to start-image coordinates.
    to_start: Affine,
    /// Interpolated-frame pixel to end-image coordinates.
    to_end: Affine,
    min: Point,
    max: Point,
}

/// Warps and blends two images through a shared triangulation of corresponding points.
#[derive(Clone, Debug)]
pub struct MorphBlender {
    start: Image,
    end: Image,
    start_points: Vec<Point>,
    end_points: Vec<Point>,
    triangulation: Arc<Triangulation>,
    cross_dissolve: bool,
}

impl MorphBlender {
    /// Validate inputs against an existing triangulation of the point sets.
    pub fn new(
        start: &Image,
        start_points: &[Point],
        end: &Image,
        end_points: &[Point],
        triangulation: Arc<Triangulation>,
    ) -> WarpmorphResult<Self> {
        validate_inputs(start, start_points, end, end_points)?;
        if triangulation.point_count() != start_points.len() {
            return Err(WarpmorphError::validation(format!(
                "triangulation was built for {} points, point sets have {}",
                triangulation.point_count(),
                start_points.len()
            )));
        }
        if triangulation.len() >= NO_OWNER as usize {
            return Err(WarpmorphError::validation("too many triangles for the owner map"));
        }

        let (start, end) = if start.channels() == end.channels() {
            (start.clone(), end.clone())
        } else {
            tracing::debug!("channel counts differ; promoting both images to RGBA");
            (start.to_rgba(), end.to_rgba())
        };

        Ok(Self {
            start,
            end,
            start_points: start_points.to_vec(),
            end_points: end_points.to_vec(),
            triangulation,
            cross_dissolve: true,
        })
    }

    /// Validate, then triangulate the midpoint shape of both point sets once.
    #[tracing::instrument(level = "debug", skip_all, fields(points = start_points.len()))]
    pub fn prepare(
        start: &Image,
        start_points: &[Point],
        end: &Image,
        end_points: &[Point],
    ) -> WarpmorphResult<Self> {
        validate_inputs(start, start_points, end, end_points)?;
        let mid = interpolate_points(start_points, end_points, 0.5);
        let triangulation = Arc::new(triangulate(&mid)?);
        Self::new(start, start_points, end, end_points, triangulation)
    }

    pub fn with_cross_dissolve(mut self, on: bool) -> Self {
        self.cross_dissolve = on;
        self
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.start.dimensions()
    }

    /// Render the morph at blend parameter `t` in `[0, 1]`.
    pub fn render(&self, t: f64) -> WarpmorphResult<Image> {
        let mut pool = BufferPool::default();
        self.render_pooled(t, &mut pool)
    }

    pub(crate) fn render_pooled(
        &self,
        t: f64,
        pool: &mut BufferPool<u32>,
    ) -> WarpmorphResult<Image> {
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(WarpmorphError::validation(format!(
                "morph parameter t={t} outside [0, 1]"
            )));
        }

        let (w, h) = self.start.dimensions();
        let maps = self.triangle_maps(t);

        let key = BufferKey::new(w, h, 1);
        let mut owner = pool.borrow(key, NO_OWNER);
        fill_owner_map(&mut owner, &maps, w, h);

        let c = self.start.channels().count();
        let row_len = w as usize * c;
        let mut out = vec![0u8; row_len * h as usize];

        out.par_chunks_mut(row_len)
            .zip(owner.par_chunks(w as usize))
            .enumerate()
            .for_each(|(y, (row, owners))| {
                let yf = y as f64;
                let mut a = [0.0f64; 4];
                let mut b = [0.0f64; 4];
                for (x, &o) in owners.iter().enumerate() {
                    let p = Point::new(x as f64, yf);
                    match maps.get(o as usize).and_then(Option::as_ref) {
                        Some(m) => {
                            let ps = m.to_start * p;
                            let pe = m.to_end * p;
                            sample_bilinear(&self.start, ps.x, ps.y, &mut a);
                            sample_bilinear(&self.end, pe.x, pe.y, &mut b);
                        }
                        None => {
                            sample_bilinear(&self.start, p.x, p.y, &mut a);
                            sample_bilinear(&self.end, p.x, p.y, &mut b);
                        }
                    }
                    let base = x * c;
                    for k in 0..c {
                        let v = if self.cross_dissolve {
                            lerp(a[k], b[k], t)
                        } else if t < 0.5 {
                            a[k]
                        } else {
                            b[k]
                        };
                        row[base + k] = to_u8(v);
                    }
                }
            });

        pool.release(key, owner);
        let st = pool.stats();
        tracing::trace!(
            t,
            retained_buffers = st.retained_buffers,
            retained_elems = st.retained_elems,
            alloc_buffers = st.alloc_buffers,
            dropped_on_release = st.dropped_on_release,
            "owner map pool"
        );
        Image::new(w, h, self.start.channels(), out)
    }

    fn triangle_maps(&self, t: f64) -> Vec<Option<TriangleMap>> {
        let pts = interpolate_points(&self.start_points, &self.end_points, t);
        let pick = |set: &[Point], [a, b, c]: [usize; 3]| [set[a], set[b], set[c]];

        let maps: Vec<Option<TriangleMap>> = self
            .triangulation
            .triangles()
            .iter()
            .map(|&tri| {
                let dst = pick(&pts, tri);
                let bary = Barycentric::new(dst)?;
                let to_start = triangle_to_triangle(dst, pick(&self.start_points, tri))?;
                let to_end = triangle_to_triangle(dst, pick(&self.end_points, tri))?;
                let (min, max) = dst.iter().fold(
                    (Point::new(f64::MAX, f64::MAX), Point::new(f64::MIN, f64::MIN)),
                    |(lo, hi), p| {
                        (
                            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
                        )
                    },
                );
                Some(TriangleMap {
                    bary,
                    to_start,
                    to_end,
                    min,
                    max,
                })
            })
            .collect();

        let skipped = maps.iter().filter(|m| m.is_none()).count();
        if skipped > 0 {
            tracing::debug!(t, skipped, "skipping degenerate interpolated triangles");
        }
        maps
    }
}

/// First triangle in order claims each pixel centre it contains.
fn fill_owner_map(owner: &mut [u32], maps: &[Option<TriangleMap>], w: u32, h: u32) {
    let (wmax, hmax) = (f64::from(w - 1), f64::from(h - 1));
    for (i, m) in maps.iter().enumerate() {
        let Some(m) = m else {
            continue;
        };
        let x0 = (m.min.x - INSIDE_EPS).ceil().max(0.0);
        let x1 = (m.max.x + INSIDE_EPS).floor().min(wmax);
        let y0 = (m.min.y - INSIDE_EPS).ceil().max(0.0);
        let y1 = (m.max.y + INSIDE_EPS).floor().min(hmax);
        if x0 > x1 || y0 > y1 {
            continue;
        }
        for y in y0 as u32..=y1 as u32 {
            let row = y as usize * w as usize;
            for x in x0 as u32..=x1 as u32 {
                let slot = &mut owner[row + x as usize];
                if *slot == NO_OWNER
                    && m.bary
                        .contains(Point::new(f64::from(x), f64::from(y)), INSIDE_EPS)
                {
                    *slot = i as u32;
                }
            }
        }
    }
}

fn validate_inputs(
    start: &Image,
    start_points: &[Point],
    end: &Image,
    end_points: &[Point],
) -> WarpmorphResult<()> {
    if start.dimensions() != end.dimensions() {
        let (sw, sh) = start.dimensions();
        let (ew, eh) = end.dimensions();
        return Err(WarpmorphError::validation(format!(
            "image dimensions differ: start is {sw}x{sh}, end is {ew}x{eh}"
        )));
    }
    let (w, h) = start.dimensions();
    validate_point_pair(start_points, end_points, w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/morph/blend.rs"]
mod tests;
