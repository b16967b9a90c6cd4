use crate::foundation::core::Point;
use crate::foundation::error::{WarpmorphError, WarpmorphResult};

/// The four image-corner control points, in the order `(0,0) (w-1,0) (0,h-1) (w-1,h-1)`.
pub fn image_corners(width: u32, height: u32) -> [Point; 4] {
    let (r, b) = (
        f64::from(width.saturating_sub(1)),
        f64::from(height.saturating_sub(1)),
    );
    [
        Point::new(0.0, 0.0),
        Point::new(r, 0.0),
        Point::new(0.0, b),
        Point::new(r, b),
    ]
}

/// Append the image corners and edge midpoints to both point sets of a morph.
///
/// Every injected point is appended to both sets at the same index, so the correspondence stays
/// aligned and the image border stays pinned. A boundary point that already sits at the same index
/// in both sets is not added again. A corner held by only one set, or at different indices, is a
/// validation error; an edge midpoint used by either set for another correspondence is left out.
pub fn with_boundary_point_pair(
    start: &[Point],
    end: &[Point],
    width: u32,
    height: u32,
) -> WarpmorphResult<(Vec<Point>, Vec<Point>)> {
    if start.len() != end.len() {
        return Err(length_mismatch(start.len(), end.len()));
    }
    let (r, b) = (
        f64::from(width.saturating_sub(1)),
        f64::from(height.saturating_sub(1)),
    );
    let (mx, my) = (f64::from(width / 2), f64::from(height / 2));
    let midpoints = [
        Point::new(mx, 0.0),
        Point::new(mx, b),
        Point::new(0.0, my),
        Point::new(r, my),
    ];

    let mut sp = start.to_vec();
    let mut ep = end.to_vec();
    for c in image_corners(width, height) {
        match (position(&sp, c), position(&ep, c)) {
            (None, None) => {
                sp.push(c);
                ep.push(c);
            }
            (Some(i), Some(j)) if i == j => {}
            (i, j) => return Err(misplaced_corner(c, i, j)),
        }
    }
    for m in midpoints {
        if position(&sp, m).is_none() && position(&ep, m).is_none() {
            sp.push(m);
            ep.push(m);
        }
    }
    Ok((sp, ep))
}

/// Check one morph point set against a `width`x`height` image.
///
/// Requires at least four finite points, no exact duplicates, and all four image corners.
pub fn validate_point_set(
    points: &[Point],
    width: u32,
    height: u32,
    label: &str,
) -> WarpmorphResult<()> {
    if points.len() < 4 {
        return Err(WarpmorphError::validation(format!(
            "{label} point set needs at least 4 points (image corners), got {}",
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(WarpmorphError::validation(format!(
            "{label} point {i} has a non-finite coordinate"
        )));
    }
    if let Some((i, j)) = first_duplicate(points) {
        return Err(WarpmorphError::validation(format!(
            "{label} points {i} and {j} coincide at ({}, {})",
            points[i].x, points[i].y
        )));
    }
    for c in image_corners(width, height) {
        if !points.contains(&c) {
            return Err(WarpmorphError::validation(format!(
                "{label} point set is missing image corner ({}, {})",
                c.x, c.y
            )));
        }
    }
    Ok(())
}

/// Check that two point sets can be morphed into each other.
///
/// On top of [`validate_point_set`] for each set, every image corner must sit at the same index in
/// both sets so the border maps onto itself.
pub fn validate_point_pair(
    start: &[Point],
    end: &[Point],
    width: u32,
    height: u32,
) -> WarpmorphResult<()> {
    if start.len() != end.len() {
        return Err(length_mismatch(start.len(), end.len()));
    }
    validate_point_set(start, width, height, "start")?;
    validate_point_set(end, width, height, "end")?;
    for c in image_corners(width, height) {
        let (i, j) = (position(start, c), position(end, c));
        if i != j {
            return Err(misplaced_corner(c, i, j));
        }
    }
    Ok(())
}

fn position(points: &[Point], p: Point) -> Option<usize> {
    points.iter().position(|q| *q == p)
}

fn length_mismatch(start: usize, end: usize) -> WarpmorphError {
    WarpmorphError::validation(format!(
        "point set length mismatch: start has {start}, end has {end}"
    ))
}

fn misplaced_corner(c: Point, start: Option<usize>, end: Option<usize>) -> WarpmorphError {
    let at = |i: Option<usize>| i.map_or_else(|| "absent".to_owned(), |i| format!("point {i}"));
    WarpmorphError::validation(format!(
        "image corner ({}, {}) must pair with itself: start {}, end {}",
        c.x,
        c.y,
        at(start),
        at(end)
    ))
}

/// Indices `(i, j)`, `i < j`, of the first pair of identical points in lexicographic order.
pub(crate) fn first_duplicate(points: &[Point]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| lex_cmp(points[a], points[b]).then(a.cmp(&b)));
    order.windows(2).find_map(|w| {
        (points[w[0]] == points[w[1]]).then(|| (w[0].min(w[1]), w[0].max(w[1])))
    })
}

pub(crate) fn lex_cmp(a: Point, b: Point) -> std::cmp::Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// `(1 - t) * start[n] + t * end[n]` for every index.
pub fn interpolate_points(start: &[Point], end: &[Point], t: f64) -> Vec<Point> {
    start.iter().zip(end).map(|(a, b)| a.lerp(*b, t)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/morph/points.rs"]
mod tests;
