//! Incremental Delaunay triangulation (Bowyer-Watson) over a symbolic vertex at infinity.
//!
//! Hull edges are closed off by "ghost" triangles that share the vertex at infinity, so points
//! outside the current hull are inserted by the same cavity search as interior ones and no hull
//! triangle is ever lost to a finite bounding triangle.

use smallvec::SmallVec;

use crate::foundation::core::Point;
use crate::foundation::error::{WarpmorphError, WarpmorphResult};
use crate::foundation::math::{in_circle, orient2d};
use crate::morph::points::lex_cmp;

const GHOST: usize = usize::MAX;
const NONE: usize = usize::MAX;

/// A set of counter-clockwise triangles indexing into the point list they were built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triangulation {
    triangles: Vec<[usize; 3]>,
    point_count: usize,
}

impl Triangulation {
    /// Build from explicit index triples, e.g. a topology computed elsewhere.
    pub fn from_triangles(
        triangles: Vec<[usize; 3]>,
        point_count: usize,
    ) -> WarpmorphResult<Self> {
        if let Some(t) = triangles.iter().find(|t| t.iter().any(|&i| i >= point_count)) {
            return Err(WarpmorphError::validation(format!(
                "triangle {t:?} references a point outside 0..{point_count}"
            )));
        }
        Ok(Self {
            triangles,
            point_count,
        })
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

#[derive(Clone, Debug)]
struct Tri {
    /// Vertex ids, counter-clockwise; at most one is `GHOST`.
    v: [usize; 3],
    /// `n[i]` is the triangle across the edge opposite `v[i]`.
    n: [usize; 3],
}

impl Tri {
    fn is_ghost(&self) -> bool {
        self.v.contains(&GHOST)
    }

    /// Directed edge opposite `v[i]`.
    fn edge(&self, i: usize) -> (usize, usize) {
        (self.v[(i + 1) % 3], self.v[(i + 2) % 3])
    }

    /// The finite edge of a ghost triangle, directed with the outside on its left.
    fn ghost_edge(&self) -> (usize, usize) {
        let g = self.v.iter().position(|&v| v == GHOST).unwrap_or(0);
        self.edge(g)
    }
}

struct Boundary {
    a: usize,
    b: usize,
    outside: usize,
    /// Slot in `outside.n` that pointed back into the cavity.
    back: Option<usize>,
}

struct Mesh<'a> {
    pts: &'a [Point],
    tris: Vec<Tri>,
    alive: Vec<bool>,
    visit: Vec<u32>,
    in_cavity: Vec<u32>,
    epoch: u32,
    last: usize,
}

/// Delaunay-triangulate `points`.
///
/// Fails with a validation error for fewer than three points, non-finite or duplicate
/// coordinates, or an input where every point is collinear. Output triangles are
/// counter-clockwise, rotated to start at their smallest index, and sorted.
#[tracing::instrument(level = "debug", skip(points), fields(points = points.len()))]
pub fn triangulate(points: &[Point]) -> WarpmorphResult<Triangulation> {
    if points.len() < 3 {
        return Err(WarpmorphError::validation(format!(
            "triangulation needs at least 3 points, got {}",
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(WarpmorphError::validation(format!(
            "point {i} has a non-finite coordinate"
        )));
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| lex_cmp(points[a], points[b]).then(a.cmp(&b)));
    if let Some(w) = order.windows(2).find(|w| points[w[0]] == points[w[1]]) {
        return Err(WarpmorphError::validation(format!(
            "points {} and {} coincide at ({}, {})",
            w[0].min(w[1]),
            w[0].max(w[1]),
            points[w[0]].x,
            points[w[0]].y
        )));
    }

    let (i0, i1) = (order[0], order[1]);
    let Some(k) = order[2..]
        .iter()
        .position(|&i| orient(points, i0, i1, i) != 0.0)
        .map(|k| k + 2)
    else {
        return Err(WarpmorphError::validation(
            "all points are collinear; nothing to triangulate",
        ));
    };

    let mut mesh = Mesh::new(points, i0, i1, order[k]);
    for (pos, &p) in order.iter().enumerate() {
        if pos < 2 || pos == k {
            continue;
        }
        mesh.insert(p);
    }

    let out = mesh.finish();
    tracing::debug!(triangles = out.len(), "triangulated");
    Ok(out)
}

fn orient(pts: &[Point], a: usize, b: usize, c: usize) -> f64 {
    let (a, b, c) = (pts[a], pts[b], pts[c]);
    orient2d(a.x, a.y, b.x, b.y, c.x, c.y)
}

fn orient_p(pts: &[Point], a: usize, b: usize, p: Point) -> f64 {
    let (a, b) = (pts[a], pts[b]);
    orient2d(a.x, a.y, b.x, b.y, p.x, p.y)
}

/// `p` lies strictly inside segment `ab`, assuming it is collinear with it.
fn strictly_between(pts: &[Point], a: usize, b: usize, p: Point) -> bool {
    let (a, b) = (pts[a], pts[b]);
    (p - a).dot(b - a) > 0.0 && (p - b).dot(a - b) > 0.0
}

impl<'a> Mesh<'a> {
    fn new(pts: &'a [Point], a: usize, b: usize, c: usize) -> Self {
        let (b, c) = if orient(pts, a, b, c) > 0.0 {
            (b, c)
        } else {
            (c, b)
        };

        let mut mesh = Self {
            pts,
            tris: Vec::with_capacity(pts.len() * 2 + 4),
            alive: Vec::with_capacity(pts.len() * 2 + 4),
            visit: Vec::new(),
            in_cavity: Vec::new(),
            epoch: 0,
            last: 0,
        };

        let core = mesh.push(Tri {
            v: [a, b, c],
            n: [NONE; 3],
        });
        let mut fan: SmallVec<[usize; 8]> = SmallVec::new();
        fan.push(core);
        for i in 0..3 {
            let (u, w) = mesh.tris[core].edge(i);
            let g = mesh.push(Tri {
                v: [GHOST, w, u],
                n: [NONE; 3],
            });
            fan.push(g);
        }
        mesh.link(&fan);
        mesh.last = core;
        mesh
    }

    fn push(&mut self, tri: Tri) -> usize {
        self.tris.push(tri);
        self.alive.push(true);
        self.visit.push(0);
        self.in_cavity.push(0);
        self.tris.len() - 1
    }

    /// Wire up adjacency among `fan` by matching opposite directed edges. Edges without a
    /// partner inside `fan` keep their current neighbour.
    fn link(&mut self, fan: &[usize]) {
        for &t in fan {
            for i in 0..3 {
                let (a, b) = self.tris[t].edge(i);
                let partner = fan.iter().copied().find(|&o| {
                    o != t && (0..3).any(|j| self.tris[o].edge(j) == (b, a))
                });
                if let Some(o) = partner {
                    self.tris[t].n[i] = o;
                }
            }
        }
    }

    fn conflicts(&self, t: usize, p: Point) -> bool {
        let tri = &self.tris[t];
        if tri.is_ghost() {
            let (a, b) = tri.ghost_edge();
            let o = orient_p(self.pts, a, b, p);
            return o > 0.0 || (o == 0.0 && strictly_between(self.pts, a, b, p));
        }
        let [a, b, c] = tri.v.map(|i| (self.pts[i].x, self.pts[i].y));
        in_circle(a, b, c, (p.x, p.y)) > 0.0
    }

    /// Visibility walk from the last inserted region. Returns a real triangle containing `p`
    /// (closed) or a ghost triangle whose hull edge sees `p`.
    fn locate(&self, p: Point) -> usize {
        let mut t = self.last;
        let max_steps = self.tris.len() + 8;
        'walk: for step in 0..max_steps {
            let tri = &self.tris[t];
            if tri.is_ghost() {
                return t;
            }
            for k in 0..3 {
                let i = (k + step) % 3;
                let (a, b) = tri.edge(i);
                if orient_p(self.pts, a, b, p) < 0.0 {
                    t = tri.n[i];
                    continue 'walk;
                }
            }
            return t;
        }

        tracing::debug!("point location walk did not settle; scanning");
        self.scan(p)
    }

    fn scan(&self, p: Point) -> usize {
        let alive = |t: &usize| self.alive[*t];
        (0..self.tris.len())
            .filter(alive)
            .find(|&t| {
                let tri = &self.tris[t];
                !tri.is_ghost()
                    && (0..3).all(|i| {
                        let (a, b) = tri.edge(i);
                        orient_p(self.pts, a, b, p) >= 0.0
                    })
            })
            .or_else(|| {
                (0..self.tris.len())
                    .filter(alive)
                    .find(|&t| self.tris[t].is_ghost() && self.conflicts(t, p))
            })
            .unwrap_or(self.last)
    }

    fn insert(&mut self, pi: usize) {
        let p = self.pts[pi];
        let seed = self.locate(p);

        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.visit.fill(0);
            self.in_cavity.fill(0);
            self.epoch = 1;
        }
        let epoch = self.epoch;

        let mut stack: Vec<usize> = vec![seed];
        self.visit[seed] = epoch;
        // A point on an edge of its containing triangle must also evict the triangle across it.
        if !self.tris[seed].is_ghost() {
            for i in 0..3 {
                let (a, b) = self.tris[seed].edge(i);
                let nb = self.tris[seed].n[i];
                if orient_p(self.pts, a, b, p) == 0.0 && self.visit[nb] != epoch {
                    self.visit[nb] = epoch;
                    stack.push(nb);
                }
            }
        }

        let mut cavity: Vec<usize> = Vec::new();
        while let Some(t) = stack.pop() {
            self.in_cavity[t] = epoch;
            cavity.push(t);
            for i in 0..3 {
                let nb = self.tris[t].n[i];
                if self.visit[nb] == epoch {
                    continue;
                }
                self.visit[nb] = epoch;
                if self.conflicts(nb, p) {
                    stack.push(nb);
                }
            }
        }

        let mut boundary: Vec<Boundary> = Vec::with_capacity(cavity.len() + 2);
        for &t in &cavity {
            for i in 0..3 {
                let nb = self.tris[t].n[i];
                if self.in_cavity[nb] == epoch {
                    continue;
                }
                let (a, b) = self.tris[t].edge(i);
                boundary.push(Boundary {
                    a,
                    b,
                    outside: nb,
                    back: self.tris[nb].n.iter().position(|&x| x == t),
                });
            }
        }

        for &t in &cavity {
            self.alive[t] = false;
        }

        let mut fan: Vec<usize> = Vec::with_capacity(boundary.len());
        for (k, e) in boundary.iter().enumerate() {
            let tri = Tri {
                v: [pi, e.a, e.b],
                n: [e.outside, NONE, NONE],
            };
            let slot = if let Some(&reuse) = cavity.get(k) {
                self.tris[reuse] = tri;
                self.alive[reuse] = true;
                reuse
            } else {
                self.push(tri)
            };
            if let Some(j) = e.back {
                self.tris[e.outside].n[j] = slot;
            }
            fan.push(slot);
        }

        // New triangles share only edges through `p`: (b, p) pairs with the fan member
        // starting at b, (p, a) with the one ending at a.
        for (k, e) in boundary.iter().enumerate() {
            let next = boundary.iter().position(|o| o.a == e.b).map(|m| fan[m]);
            let prev = boundary.iter().position(|o| o.b == e.a).map(|m| fan[m]);
            let t = fan[k];
            if let Some(nx) = next {
                self.tris[t].n[1] = nx;
            }
            if let Some(pv) = prev {
                self.tris[t].n[2] = pv;
            }
        }

        if let Some(&real) = fan.iter().find(|&&t| !self.tris[t].is_ghost()) {
            self.last = real;
        }
    }

    fn finish(self) -> Triangulation {
        let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(self.tris.len() / 2);
        for (t, tri) in self.tris.iter().enumerate() {
            if !self.alive[t] || tri.is_ghost() {
                continue;
            }
            let [a, b, c] = tri.v;
            if orient(self.pts, a, b, c) <= 0.0 {
                tracing::warn!(triangle = ?tri.v, "dropping degenerate triangle");
                continue;
            }
            let r = (0..3).min_by_key(|&i| tri.v[i]).unwrap_or(0);
            triangles.push([tri.v[r], tri.v[(r + 1) % 3], tri.v[(r + 2) % 3]]);
        }
        triangles.sort_unstable();
        Triangulation {
            triangles,
            point_count: self.pts.len(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/morph/triangulate.rs"]
mod tests;
