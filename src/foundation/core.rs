use crate::foundation::error::{WarpmorphError, WarpmorphResult};

pub use kurbo::{Affine, Point, Vec2};

/// 0-based index of a frame within one generation run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Fallback rate when a per-frame duration of zero is requested.
    pub const DEFAULT: Fps = Fps { num: 25, den: 1 };

    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> WarpmorphResult<Self> {
        if den == 0 {
            return Err(WarpmorphError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(WarpmorphError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frame rate for a fixed per-frame display duration in milliseconds.
    ///
    /// A duration of zero maps to [`Fps::DEFAULT`].
    pub fn from_frame_duration_ms(ms: u32) -> Self {
        if ms == 0 {
            return Self::DEFAULT;
        }
        let g = gcd(1000, ms);
        Self {
            num: 1000 / g,
            den: ms / g,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
