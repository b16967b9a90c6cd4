use crate::foundation::core::{Affine, Point};
use crate::foundation::math::orient2d;

/// Triangles with twice-area below this are treated as degenerate.
pub(crate) const DEGENERATE_AREA: f64 = 1e-9;

/// Affine map taking the unit triangle `(0,0) (1,0) (0,1)` onto `tri`.
pub(crate) fn triangle_frame(tri: [Point; 3]) -> Affine {
    let [o, a, b] = tri;
    Affine::new([a.x - o.x, a.y - o.y, b.x - o.x, b.y - o.y, o.x, o.y])
}

/// The affine transform carrying triangle `from` onto triangle `to`, vertex for vertex.
///
/// `None` when `from` is degenerate; `to` may be degenerate (the map then collapses).
pub fn triangle_to_triangle(from: [Point; 3], to: [Point; 3]) -> Option<Affine> {
    let f = triangle_frame(from);
    if f.determinant().abs() < DEGENERATE_AREA {
        return None;
    }
    Some(triangle_frame(to) * f.inverse())
}

/// Barycentric membership test for one triangle, precomputed for repeated queries.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Barycentric {
    tri: [Point; 3],
    inv_area2: f64,
}

impl Barycentric {
    pub(crate) fn new(tri: [Point; 3]) -> Option<Self> {
        let [a, b, c] = tri;
        let area2 = orient2d(a.x, a.y, b.x, b.y, c.x, c.y);
        if area2.abs() < DEGENERATE_AREA {
            return None;
        }
        Some(Self {
            tri,
            inv_area2: 1.0 / area2,
        })
    }

    /// Weights of `p` relative to the three vertices; they sum to 1.
    pub(crate) fn weights(&self, p: Point) -> [f64; 3] {
        let [a, b, c] = self.tri;
        let wa = orient2d(b.x, b.y, c.x, c.y, p.x, p.y) * self.inv_area2;
        let wb = orient2d(c.x, c.y, a.x, a.y, p.x, p.y) * self.inv_area2;
        [wa, wb, 1.0 - wa - wb]
    }

    /// Closed-triangle membership with tolerance `eps` on every weight.
    pub(crate) fn contains(&self, p: Point, eps: f64) -> bool {
        self.weights(p).iter().all(|&w| w >= -eps && w <= 1.0 + eps)
    }
}
