use std::f64::consts::TAU;

use crate::foundation::math::mix64;

const NORM_3D: f64 = 1.0;
const NORM_4D: f64 = 0.87;

/// Coherent gradient noise over `(x, y, t)`.
///
/// A pure function of its inputs and the seed: the lattice gradients come from hashing integer
/// coordinates together with the seed, so there is no permutation table, no tiling and no global
/// state. Interpolation uses the quintic fade, which keeps the field C² continuous.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoiseField {
    seed: u64,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed: mix64(u64::from(seed) ^ 0x5EED_0F_C0FFEE),
        }
    }

    /// Noise value in `[-1, 1]` at `(x, y)` and time `t`.
    pub fn sample(&self, x: f64, y: f64, t: f64) -> f64 {
        (self.noise3(x, y, t) * NORM_3D).clamp(-1.0, 1.0)
    }

    /// Noise value in `[-1, 1]` evolving around a closed loop.
    ///
    /// `phase` is the loop position (period 1): time is mapped onto a circle of `radius` lattice
    /// units in two extra dimensions, so `phase` and `phase + 1` return the same value.
    pub fn sample_looped(&self, x: f64, y: f64, phase: f64, radius: f64) -> f64 {
        let angle = TAU * phase;
        let z = radius * angle.cos();
        let w = radius * angle.sin();
        (self.noise4(x, y, z, w) * NORM_4D).clamp(-1.0, 1.0)
    }

    fn hash3(&self, x: i64, y: i64, z: i64) -> u64 {
        let mut h = self.seed;
        h = mix64(h ^ x as u64);
        h = mix64(h ^ (y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        mix64(h ^ (z as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F))
    }

    fn hash4(&self, x: i64, y: i64, z: i64, w: i64) -> u64 {
        mix64(self.hash3(x, y, z) ^ (w as u64).wrapping_mul(0x1656_67B1_9E37_79F9))
    }

    fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
        let (fx, fy, fz) = (x - x0, y - y0, z - z0);
        let (ix, iy, iz) = (x0 as i64, y0 as i64, z0 as i64);
        let (u, v, w) = (fade(fx), fade(fy), fade(fz));

        let corner = |dx: i64, dy: i64, dz: i64| -> f64 {
            let h = self.hash3(ix + dx, iy + dy, iz + dz);
            grad3(h, fx - dx as f64, fy - dy as f64, fz - dz as f64)
        };

        let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
        let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
        let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
        let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);
        lerp(lerp(x00, x10, v), lerp(x01, x11, v), w)
    }

    fn noise4(&self, x: f64, y: f64, z: f64, w: f64) -> f64 {
        let p0 = [x.floor(), y.floor(), z.floor(), w.floor()];
        let f = [x - p0[0], y - p0[1], z - p0[2], w - p0[3]];
        let i = [p0[0] as i64, p0[1] as i64, p0[2] as i64, p0[3] as i64];
        let s = [fade(f[0]), fade(f[1]), fade(f[2]), fade(f[3])];

        // Corner bits: bit k set means +1 along axis k.
        let mut vals = [0.0f64; 16];
        for (bits, val) in vals.iter_mut().enumerate() {
            let d = [bits & 1, (bits >> 1) & 1, (bits >> 2) & 1, (bits >> 3) & 1];
            let h = self.hash4(
                i[0] + d[0] as i64,
                i[1] + d[1] as i64,
                i[2] + d[2] as i64,
                i[3] + d[3] as i64,
            );
            *val = grad4(
                h,
                f[0] - d[0] as f64,
                f[1] - d[1] as f64,
                f[2] - d[2] as f64,
                f[3] - d[3] as f64,
            );
        }

        // Collapse one axis at a time.
        let mut len = 16;
        for sk in s {
            len /= 2;
            for j in 0..len {
                vals[j] = lerp(vals[2 * j], vals[2 * j + 1], sk);
            }
        }
        vals[0]
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Dot product with one of the 12 cube-edge gradients.
#[inline]
fn grad3(h: u64, x: f64, y: f64, z: f64) -> f64 {
    match h % 12 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x + z,
        5 => -x + z,
        6 => x - z,
        7 => -x - z,
        8 => y + z,
        9 => -y + z,
        10 => y - z,
        _ => -y - z,
    }
}

/// Dot product with one of the 32 gradients that have a single zero component.
#[inline]
fn grad4(h: u64, x: f64, y: f64, z: f64, w: f64) -> f64 {
    let h = h % 32;
    let (a, b, c) = match h >> 3 {
        0 => (y, z, w),
        1 => (x, z, w),
        2 => (x, y, w),
        _ => (x, y, z),
    };
    let a = if h & 1 == 0 { a } else { -a };
    let b = if h & 2 == 0 { b } else { -b };
    let c = if h & 4 == 0 { c } else { -c };
    a + b + c
}

#[cfg(test)]
#[path = "../../tests/unit/noise/field.rs"]
mod tests;
