use crate::raster::image::Image;

/// Bilinear sample at fractional pixel coordinates, writing one value per channel into `out`.
///
/// Coordinates outside the image are clamped to the nearest edge pixel (no wrap, no transparent
/// fill). Integer coordinates return the stored pixel exactly.
#[inline]
pub(crate) fn sample_bilinear(image: &Image, x: f64, y: f64, out: &mut [f64]) {
    let (w, h) = image.dimensions();
    let c = image.channels().count();
    debug_assert!(out.len() >= c);

    let max_x = f64::from(w - 1);
    let max_y = f64::from(h - 1);
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, max_x) };
    let y = if y.is_nan() { 0.0 } else { y.clamp(0.0, max_y) };

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let ix0 = x0 as usize;
    let iy0 = y0 as usize;
    let ix1 = (ix0 + 1).min(w as usize - 1);
    let iy1 = (iy0 + 1).min(h as usize - 1);

    let stride = w as usize * c;
    let data = image.as_bytes();
    let base00 = iy0 * stride + ix0 * c;
    let base01 = iy0 * stride + ix1 * c;
    let base10 = iy1 * stride + ix0 * c;
    let base11 = iy1 * stride + ix1 * c;

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w01 = fx * (1.0 - fy);
    let w10 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    for k in 0..c {
        out[k] = f64::from(data[base00 + k]) * w00
            + f64::from(data[base01 + k]) * w01
            + f64::from(data[base10 + k]) * w10
            + f64::from(data[base11 + k]) * w11;
    }
}
