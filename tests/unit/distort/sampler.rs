use super::*;
use crate::distort::params::{WaveAxes, WaveComponent, WaveShape};
use crate::foundation::error::WarpmorphError;

fn gradient(w: u32, h: u32) -> Image {
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8]);
        }
    }
    Image::new(w, h, crate::raster::image::Channels::Rgb, data).unwrap()
}

#[test]
fn zero_amplitude_wave_is_identity() {
    let img = gradient(40, 30);
    let p = DistortionParams::Wave(WaveParams {
        amplitude: 0.0,
        frequency: 5.0,
        ..WaveParams::default()
    });
    assert_eq!(distort(&img, &p, 1.3).unwrap(), img);
}

#[test]
fn zero_amplitude_noise_is_identity() {
    let img = gradient(16, 16);
    let p = DistortionParams::Noise(NoiseParams {
        amplitude: 0.0,
        ..NoiseParams::default()
    });
    assert_eq!(distort(&img, &p, 0.7).unwrap(), img);
}

#[test]
fn integer_period_wave_with_zero_phase_keeps_first_row_and_column() {
    // sin(0) = 0, so row 0 has dx = 0 and column 0 has dy = 0.
    let img = gradient(32, 32);
    let p = DistortionParams::Wave(WaveParams {
        amplitude: 4.0,
        frequency: 2.0,
        ..WaveParams::default()
    });
    let out = distort(&img, &p, 0.0).unwrap();
    assert_eq!(out.pixel(0, 0), img.pixel(0, 0));
    assert_eq!(out.dimensions(), img.dimensions());
    assert_ne!(out, img);
}

#[test]
fn horizontal_axis_only_shifts_within_rows() {
    // Rows are constant in y-channel, so a pure dx warp must not touch channel 1.
    let img = gradient(24, 24);
    let p = DistortionParams::Wave(WaveParams {
        amplitude: 3.0,
        frequency: 1.0,
        axes: WaveAxes::Horizontal,
        shape: WaveShape::Triangle,
        ..WaveParams::default()
    });
    let out = distort(&img, &p, 0.4).unwrap();
    for y in 0..24 {
        for x in 0..24 {
            assert_eq!(out.pixel(x, y)[1], img.pixel(x, y)[1]);
        }
    }
}

#[test]
fn solid_image_stays_solid_under_any_warp() {
    let img = Image::filled(20, 12, &[10, 200, 30, 255]).unwrap();
    let p = DistortionParams::Noise(NoiseParams {
        amplitude: 8.0,
        scale: 0.1,
        looped: true,
        ..NoiseParams::default()
    });
    let out = distort(&img, &p, 0.25).unwrap();
    assert_eq!(out, img);
}

#[test]
fn noise_distortion_is_deterministic() {
    let img = gradient(20, 20);
    let p = DistortionParams::Noise(NoiseParams {
        amplitude: 5.0,
        scale: 0.08,
        seed: 42,
        ..NoiseParams::default()
    });
    let a = distort(&img, &p, 0.5).unwrap();
    let b = distort(&img, &p, 0.5).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_params_fail_before_work() {
    let img = gradient(8, 8);
    let p = DistortionParams::Wave(WaveParams {
        frequency: -2.0,
        ..WaveParams::default()
    });
    assert!(matches!(
        distort(&img, &p, 0.0),
        Err(WarpmorphError::Validation(_))
    ));
}

fn component(shape: WaveShape, amplitude: f64, frequency: f64, phase_step: f64) -> WaveComponent {
    WaveComponent {
        shape,
        amplitude,
        frequency,
        phase: 0.3,
        phase_step,
    }
}

#[test]
fn vertical_wave_does_not_affect_horizontal_displacement() {
    // Channel 0 varies only with x, so it reflects dx alone; channel 1 only with y (dy alone).
    let img = gradient(24, 24);
    let h = component(WaveShape::Sine, 3.0, 1.0, 0.0);
    let v1 = component(WaveShape::Sine, 3.0, 1.0, 0.0);
    let v2 = component(WaveShape::Triangle, 2.0, 3.0, 0.0);

    let a = distort(&img, &DistortionParams::Wave(WaveParams::per_axis(h, v1)), 0.0).unwrap();
    let b = distort(&img, &DistortionParams::Wave(WaveParams::per_axis(h, v2)), 0.0).unwrap();
    let mut dy_differs = false;
    for y in 0..24 {
        for x in 0..24 {
            assert_eq!(a.pixel(x, y)[0], b.pixel(x, y)[0]);
            dy_differs |= a.pixel(x, y)[1] != b.pixel(x, y)[1];
        }
    }
    assert!(dy_differs);
}

#[test]
fn each_axis_advances_at_its_own_speed() {
    let img = gradient(24, 24);
    let p = DistortionParams::Wave(WaveParams::per_axis(
        component(WaveShape::Sine, 3.0, 1.0, 0.0),
        component(WaveShape::Triangle, 3.0, 2.0, 0.9),
    ));
    let f0 = distort(&img, &p, p.time_at(0, 10)).unwrap();
    let f3 = distort(&img, &p, p.time_at(3, 10)).unwrap();
    let mut dy_moved = false;
    for y in 0..24 {
        for x in 0..24 {
            assert_eq!(f0.pixel(x, y)[0], f3.pixel(x, y)[0]);
            dy_moved |= f0.pixel(x, y)[1] != f3.pixel(x, y)[1];
        }
    }
    assert!(dy_moved);
}
