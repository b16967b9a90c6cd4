use std::f64::consts::{FRAC_PI_2, PI};

use super::*;

#[test]
fn triangle_matches_sine_at_peaks_and_zeros() {
    for theta in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2, TAU] {
        let s = WaveShape::Sine.eval(theta);
        let t = WaveShape::Triangle.eval(theta);
        assert!((s - t).abs() < 1e-9, "theta={theta}: {s} vs {t}");
    }
}

#[test]
fn triangle_is_linear_between_peaks() {
    let a = WaveShape::Triangle.eval(PI / 8.0);
    let b = WaveShape::Triangle.eval(PI / 4.0);
    assert!((b - 2.0 * a).abs() < 1e-9);
    assert!((a - 0.25).abs() < 1e-9);
}

#[test]
fn validate_rejects_non_positive_frequency_and_scale() {
    let wave = DistortionParams::Wave(WaveParams {
        frequency: 0.0,
        ..WaveParams::default()
    });
    assert!(matches!(
        wave.validate(64, 64),
        Err(WarpmorphError::Validation(_))
    ));

    let noise = DistortionParams::Noise(NoiseParams {
        scale: -1.0,
        ..NoiseParams::default()
    });
    assert!(noise.validate(64, 64).is_err());
}

#[test]
fn validate_rejects_negative_or_oversized_amplitude() {
    let neg = DistortionParams::Wave(WaveParams {
        amplitude: -1.0,
        ..WaveParams::default()
    });
    assert!(neg.validate(64, 64).is_err());

    let huge = DistortionParams::Wave(WaveParams {
        amplitude: 65.0,
        ..WaveParams::default()
    });
    assert!(huge.validate(64, 32).is_err());

    let ok = DistortionParams::Wave(WaveParams {
        amplitude: 0.0,
        ..WaveParams::default()
    });
    assert!(ok.validate(64, 32).is_ok());
}

#[test]
fn looped_noise_requires_positive_radius() {
    let p = DistortionParams::Noise(NoiseParams {
        looped: true,
        loop_radius: 0.0,
        ..NoiseParams::default()
    });
    assert!(p.validate(16, 16).is_err());
}

#[test]
fn time_at_advances_per_frame() {
    let p = WaveParams {
        phase: 1.0,
        phase_step: 0.5,
        ..WaveParams::default()
    };
    let wave = DistortionParams::Wave(p);
    assert_eq!(wave.time_at(4, 10), 4.0);
    assert_eq!(p.shared().phase_at(wave.time_at(0, 10)), 1.0);
    assert_eq!(p.shared().phase_at(wave.time_at(4, 10)), 3.0);

    let noise = DistortionParams::Noise(NoiseParams {
        time: 2.0,
        time_step: 0.25,
        ..NoiseParams::default()
    });
    assert_eq!(noise.time_at(2, 10), 2.5);
}

#[test]
fn looped_noise_time_wraps_over_the_run() {
    let noise = DistortionParams::Noise(NoiseParams {
        looped: true,
        ..NoiseParams::default()
    });
    assert_eq!(noise.time_at(0, 4), 0.0);
    assert_eq!(noise.time_at(2, 4), 0.5);
    assert_eq!(noise.time_at(4, 4), 0.0);
}

#[test]
fn phase_step_for_loop_covers_whole_cycles() {
    let step = phase_step_for_loop(8, 2.0);
    assert!((step * 8.0 - 2.0 * TAU).abs() < 1e-12);
    assert_eq!(phase_step_for_loop(0, 1.0), 0.0);
}

#[test]
fn params_serde_uses_kind_tag() {
    let p = DistortionParams::Wave(WaveParams::default());
    let json = serde_json::to_value(p).unwrap();
    assert_eq!(json["kind"], "wave");
    assert_eq!(json["shape"], "sine");

    let back: DistortionParams =
        serde_json::from_str(r#"{ "kind": "noise", "amplitude": 4.0 }"#).unwrap();
    match back {
        DistortionParams::Noise(n) => {
            assert_eq!(n.amplitude, 4.0);
            assert_eq!(n.axis_offset, 100.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn shared_wave_drives_the_axes_it_enables() {
    let p = WaveParams {
        axes: WaveAxes::Vertical,
        amplitude: 7.0,
        ..WaveParams::default()
    };
    assert_eq!(p.horizontal_component(), None);
    assert_eq!(p.vertical_component(), Some(p.shared()));

    let both = WaveParams::default();
    assert_eq!(both.horizontal_component(), both.vertical_component());
}

#[test]
fn axis_overrides_are_independent() {
    let h = WaveComponent {
        shape: WaveShape::Sine,
        amplitude: 4.0,
        frequency: 2.0,
        phase: 0.0,
        phase_step: 0.0,
    };
    let v = WaveComponent {
        shape: WaveShape::Triangle,
        amplitude: 9.0,
        frequency: 5.0,
        phase: 0.5,
        phase_step: 0.25,
    };
    let p = WaveParams::per_axis(h, v);
    assert_eq!(p.horizontal_component(), Some(h));
    assert_eq!(p.vertical_component(), Some(v));
    assert_eq!(DistortionParams::Wave(p).amplitude(), 9.0);
    assert_eq!(v.phase_at(2.0), 1.0);
    assert_eq!(h.phase_at(2.0), 0.0);

    // An override applies even when the shared mask turns its axis off.
    let masked = WaveParams {
        axes: WaveAxes::Horizontal,
        vertical: Some(v),
        ..WaveParams::default()
    };
    assert_eq!(masked.vertical_component(), Some(v));
}

#[test]
fn each_axis_override_is_validated() {
    let bad = WaveComponent {
        frequency: 0.0,
        ..WaveComponent::default()
    };
    let p = DistortionParams::Wave(WaveParams {
        vertical: Some(bad),
        ..WaveParams::default()
    });
    let err = p.validate(64, 64).unwrap_err();
    assert!(err.to_string().contains("vertical wave frequency"));

    let huge = DistortionParams::Wave(WaveParams::per_axis(
        WaveComponent::default(),
        WaveComponent {
            amplitude: 100.0,
            ..WaveComponent::default()
        },
    ));
    assert!(huge.validate(64, 64).is_err());
}

#[test]
fn per_axis_waves_deserialize() {
    let json = r#"{
        "kind": "wave",
        "horizontal": { "shape": "sine", "amplitude": 3.0, "frequency": 1.0 },
        "vertical": { "shape": "triangle", "amplitude": 6.0, "frequency": 4.0, "phase_step": 0.2 }
    }"#;
    let p: DistortionParams = serde_json::from_str(json).unwrap();
    match p {
        DistortionParams::Wave(w) => {
            let v = w.vertical_component().unwrap();
            assert_eq!(v.shape, WaveShape::Triangle);
            assert_eq!(v.phase_step, 0.2);
            assert_eq!(w.horizontal_component().unwrap().amplitude, 3.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}
