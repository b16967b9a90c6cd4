use rayon::prelude::*;

use crate::distort::params::{DistortionParams, NoiseParams, WaveComponent, WaveParams};
use crate::foundation::error::WarpmorphResult;
use crate::foundation::math::to_u8;
use crate::noise::field::NoiseField;
use crate::raster::image::Image;
use crate::raster::sample::sample_bilinear;

/// Apply one distortion frame.
///
/// `time` is the per-frame value from [`DistortionParams::time_at`]: the frame position for waves
/// (each axis advances its own phase from it), or the noise time (loop phase when looped). The
/// output has the source's dimensions and channels. Parameters are validated before any pixel work.
pub fn distort(image: &Image, params: &DistortionParams, time: f64) -> WarpmorphResult<Image> {
    let (w, h) = image.dimensions();
    params.validate(w, h)?;

    if params.amplitude() == 0.0 {
        return Ok(image.clone());
    }

    let data = match params {
        DistortionParams::Wave(p) => wave_pixels(image, p, time),
        DistortionParams::Noise(p) => noise_pixels(image, p, time),
    };
    Image::new(w, h, image.channels(), data)
}

fn wave_pixels(image: &Image, p: &WaveParams, frame: f64) -> Vec<u8> {
    let (w, h) = image.dimensions();

    // dx depends only on the row and dy only on the column.
    let dx_by_row = axis_displacements(p.horizontal_component(), h, frame);
    let dy_by_col = axis_displacements(p.vertical_component(), w, frame);

    remap(image, |x, y| (dx_by_row[y as usize], dy_by_col[x as usize]))
}

fn axis_displacements(wave: Option<WaveComponent>, extent: u32, frame: f64) -> Vec<f64> {
    let len = f64::from(extent);
    (0..extent)
        .map(|i| wave.map_or(0.0, |c| c.displacement(f64::from(i), len, frame)))
        .collect()
}

fn noise_pixels(image: &Image, p: &NoiseParams, time: f64) -> Vec<u8> {
    let field = NoiseField::new(p.seed);
    let s = p.scale;
    let o = p.axis_offset;
    let amp = p.amplitude;

    if p.looped {
        let r = p.loop_radius;
        remap(image, |x, y| {
            let (nx, ny) = (f64::from(x) * s, f64::from(y) * s);
            (
                amp * field.sample_looped(nx, ny, time, r),
                amp * field.sample_looped(nx + o, ny + o, time, r),
            )
        })
    } else {
        remap(image, |x, y| {
            let (nx, ny) = (f64::from(x) * s, f64::from(y) * s);
            (
                amp * field.sample(nx, ny, time),
                amp * field.sample(nx + o, ny + o, time),
            )
        })
    }
}

/// Resample `image` so output pixel `(x, y)` reads the source at `(x, y) + displacement(x, y)`.
fn remap<F>(image: &Image, displacement: F) -> Vec<u8>
where
    F: Fn(u32, u32) -> (f64, f64) + Sync,
{
    let (w, h) = image.dimensions();
    let c = image.channels().count();
    let row_len = w as usize * c;
    let mut out = vec![0u8; row_len * h as usize];

    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            let mut px = [0.0f64; 4];
            for x in 0..w {
                let (dx, dy) = displacement(x, y);
                sample_bilinear(
                    image,
                    f64::from(x) + dx,
                    f64::from(y) + dy,
                    &mut px,
                );
                let base = x as usize * c;
                for k in 0..c {
                    row[base + k] = to_u8(px[k]);
                }
            }
        });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/distort/sampler.rs"]
mod tests;
