use std::f64::consts::{FRAC_2_PI, TAU};

use crate::foundation::error::{WarpmorphError, WarpmorphResult};

/// Periodic waveform used by [`WaveParams`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveShape {
    /// `sin θ`.
    Sine,
    /// Triangle wave with the period, amplitude and zero crossings of `sin θ`.
    Triangle,
}

impl WaveShape {
    /// Evaluate the waveform at angle `theta` (radians); result in `[-1, 1]`.
    pub fn eval(self, theta: f64) -> f64 {
        match self {
            Self::Sine => theta.sin(),
            Self::Triangle => FRAC_2_PI * theta.sin().clamp(-1.0, 1.0).asin(),
        }
    }
}

/// Which displacement components a wave drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveAxes {
    /// Both `dx` (driven by `y`) and `dy` (driven by `x`).
    Both,
    /// Only `dx`: rows slide sideways.
    Horizontal,
    /// Only `dy`: columns slide up and down.
    Vertical,
}

/// One axis of a wave warp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WaveComponent {
    pub shape: WaveShape,
    /// Peak displacement in pixels.
    pub amplitude: f64,
    /// Cycles across the image extent driving this axis.
    pub frequency: f64,
    /// Phase of the first frame, radians.
    pub phase: f64,
    /// Phase advance per frame, radians.
    pub phase_step: f64,
}

impl Default for WaveComponent {
    fn default() -> Self {
        WaveParams::default().shared()
    }
}

impl WaveComponent {
    /// Phase in radians at frame position `frame`.
    pub fn phase_at(&self, frame: f64) -> f64 {
        self.phase + frame * self.phase_step
    }

    /// Displacement at `coord` along an axis `extent` pixels long.
    pub fn displacement(&self, coord: f64, extent: f64, frame: f64) -> f64 {
        self.amplitude * self.shape.eval(TAU * self.frequency * coord / extent + self.phase_at(frame))
    }

    fn validate(&self, label: &str, max_amp: f64) -> WarpmorphResult<()> {
        check_amplitude(self.amplitude, max_amp)?;
        check_positive(&format!("{label} frequency"), self.frequency)?;
        check_finite(&format!("{label} phase"), self.phase)?;
        check_finite(&format!("{label} phase_step"), self.phase_step)
    }
}

/// Periodic-wave warp.
///
/// The flat fields describe one wave shared by both axes, masked by `axes`. `horizontal` and
/// `vertical` replace it for their axis with an independent wave; an override always drives its
/// axis regardless of `axes`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub shape: WaveShape,
    /// Peak displacement in pixels.
    pub amplitude: f64,
    /// Cycles across the image extent (height for `dx`, width for `dy`).
    pub frequency: f64,
    /// Phase of the first frame, radians.
    pub phase: f64,
    /// Phase advance per frame, radians.
    pub phase_step: f64,
    pub axes: WaveAxes,
    /// Wave driving `dx` (rows slide sideways).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<WaveComponent>,
    /// Wave driving `dy` (columns slide up and down).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<WaveComponent>,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            shape: WaveShape::Sine,
            amplitude: 20.0,
            frequency: 3.0,
            phase: 0.0,
            phase_step: 0.0,
            axes: WaveAxes::Both,
            horizontal: None,
            vertical: None,
        }
    }
}

impl WaveParams {
    /// Independent waves for `dx` and `dy`.
    pub fn per_axis(horizontal: WaveComponent, vertical: WaveComponent) -> Self {
        Self {
            horizontal: Some(horizontal),
            vertical: Some(vertical),
            ..Self::default()
        }
    }

    /// The shared flat fields as one component.
    pub fn shared(&self) -> WaveComponent {
        WaveComponent {
            shape: self.shape,
            amplitude: self.amplitude,
            frequency: self.frequency,
            phase: self.phase,
            phase_step: self.phase_step,
        }
    }

    /// Wave driving `dx`, or `None` when that axis is off.
    pub fn horizontal_component(&self) -> Option<WaveComponent> {
        self.horizontal.or_else(|| {
            matches!(self.axes, WaveAxes::Both | WaveAxes::Horizontal).then(|| self.shared())
        })
    }

    /// Wave driving `dy`, or `None` when that axis is off.
    pub fn vertical_component(&self) -> Option<WaveComponent> {
        self.vertical.or_else(|| {
            matches!(self.axes, WaveAxes::Both | WaveAxes::Vertical).then(|| self.shared())
        })
    }

    fn uses_shared(&self) -> bool {
        (self.horizontal.is_none() && matches!(self.axes, WaveAxes::Both | WaveAxes::Horizontal))
            || (self.vertical.is_none() && matches!(self.axes, WaveAxes::Both | WaveAxes::Vertical))
    }

    /// Largest displacement either active axis can produce.
    pub fn peak_amplitude(&self) -> f64 {
        let h = self.horizontal_component().map_or(0.0, |c| c.amplitude);
        let v = self.vertical_component().map_or(0.0, |c| c.amplitude);
        h.max(v)
    }
}

/// Coherent-noise ("liquid") warp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Peak displacement in pixels.
    pub amplitude: f64,
    /// Noise lattice cells per pixel.
    pub scale: f64,
    pub seed: u32,
    /// Noise time of the first frame.
    pub time: f64,
    /// Noise time advance per frame.
    pub time_step: f64,
    /// Lattice offset between the `dx` and `dy` fields.
    pub axis_offset: f64,
    /// Sample time around a closed loop so the sequence wraps seamlessly.
    pub looped: bool,
    /// Radius (lattice units) of the time loop; larger evolves faster.
    pub loop_radius: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            amplitude: 30.0,
            scale: 1.0 / 150.0,
            seed: 0,
            time: 0.0,
            time_step: 0.02,
            axis_offset: 100.0,
            looped: false,
            loop_radius: 1.0,
        }
    }
}

/// Distortion effect and its parameters, fixed for one generation run.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistortionParams {
    Wave(WaveParams),
    Noise(NoiseParams),
}

impl DistortionParams {
    /// Peak displacement in pixels.
    pub fn amplitude(&self) -> f64 {
        match self {
            Self::Wave(w) => w.peak_amplitude(),
            Self::Noise(n) => n.amplitude,
        }
    }

    /// Reject parameters that cannot produce a meaningful frame for a `width`x`height` source.
    pub fn validate(&self, width: u32, height: u32) -> WarpmorphResult<()> {
        let max_amp = f64::from(width.max(height));
        match self {
            Self::Wave(w) => {
                if w.uses_shared() {
                    w.shared().validate("wave", max_amp)?;
                }
                if let Some(c) = &w.horizontal {
                    c.validate("horizontal wave", max_amp)?;
                }
                if let Some(c) = &w.vertical {
                    c.validate("vertical wave", max_amp)?;
                }
            }
            Self::Noise(n) => {
                check_amplitude(n.amplitude, max_amp)?;
                check_positive("noise scale", n.scale)?;
                check_finite("noise time", n.time)?;
                check_finite("noise time_step", n.time_step)?;
                check_finite("noise axis_offset", n.axis_offset)?;
                if n.looped {
                    check_positive("noise loop_radius", n.loop_radius)?;
                }
            }
        }
        Ok(())
    }

    /// Time value for frame `index` of a `frame_count`-frame run.
    ///
    /// Wave: the frame position, from which each axis derives its own phase. Noise: field time,
    /// or loop phase in `[0, 1)` when looped.
    pub fn time_at(&self, index: u64, frame_count: u64) -> f64 {
        let f = index as f64;
        match self {
            Self::Wave(_) => f,
            Self::Noise(n) if n.looped => {
                let total = frame_count.max(1) as f64;
                (n.time + f / total).rem_euclid(1.0)
            }
            Self::Noise(n) => n.time + f * n.time_step,
        }
    }
}

/// Phase step that makes a wave complete `cycles` full periods over `frame_count` frames, so the
/// frame after the last one equals the first.
pub fn phase_step_for_loop(frame_count: u64, cycles: f64) -> f64 {
    if frame_count == 0 {
        return 0.0;
    }
    TAU * cycles / frame_count as f64
}

fn check_amplitude(amplitude: f64, max: f64) -> WarpmorphResult<()> {
    if !amplitude.is_finite() || amplitude < 0.0 {
        return Err(WarpmorphError::validation(format!(
            "amplitude must be finite and >= 0, got {amplitude}"
        )));
    }
    if amplitude > max {
        return Err(WarpmorphError::validation(format!(
            "amplitude {amplitude} exceeds the image extent {max}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, v: f64) -> WarpmorphResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(WarpmorphError::validation(format!(
            "{name} must be finite and > 0, got {v}"
        )));
    }
    Ok(())
}

fn check_finite(name: &str, v: f64) -> WarpmorphResult<()> {
    if !v.is_finite() {
        return Err(WarpmorphError::validation(format!("{name} must be finite")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/distort/params.rs"]
mod tests;
