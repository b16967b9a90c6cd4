use super::*;

fn lcg_points(n: usize) -> Vec<(f64, f64, f64)> {
    let mut state = 0x1234_5678_u64;
    let mut next = move || {
        state = mix64(state);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..n)
        .map(|_| (next() * 40.0 - 20.0, next() * 40.0 - 20.0, next() * 10.0))
        .collect()
}

#[test]
fn sample_is_deterministic_per_seed() {
    let a = NoiseField::new(7);
    let b = NoiseField::new(7);
    for (x, y, t) in lcg_points(64) {
        assert_eq!(a.sample(x, y, t), b.sample(x, y, t));
    }
}

#[test]
fn different_seeds_give_different_fields() {
    let a = NoiseField::new(1);
    let b = NoiseField::new(2);
    let differs = lcg_points(64)
        .into_iter()
        .any(|(x, y, t)| a.sample(x, y, t) != b.sample(x, y, t));
    assert!(differs);
}

#[test]
fn sample_stays_in_unit_range() {
    let n = NoiseField::new(3);
    for (x, y, t) in lcg_points(2000) {
        let v = n.sample(x, y, t);
        assert!((-1.0..=1.0).contains(&v), "{v} out of range");
        let l = n.sample_looped(x, y, t, 1.5);
        assert!((-1.0..=1.0).contains(&l), "{l} out of range");
    }
}

#[test]
fn small_time_steps_change_value_slightly() {
    let n = NoiseField::new(11);
    let dt = 1e-4;
    for (x, y, t) in lcg_points(256) {
        let a = n.sample(x, y, t);
        let b = n.sample(x, y, t + dt);
        assert!((a - b).abs() < 1e-2, "jump {} at ({x},{y},{t})", (a - b).abs());
    }
}

#[test]
fn lattice_points_are_zero() {
    let n = NoiseField::new(5);
    assert_eq!(n.sample(3.0, -2.0, 4.0), 0.0);
}

#[test]
fn field_is_not_constant() {
    let n = NoiseField::new(9);
    let vals: Vec<f64> = (0..32).map(|i| n.sample(i as f64 * 0.37, 0.5, 0.25)).collect();
    let min = vals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = vals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(max - min > 0.1);
}

#[test]
fn looped_sample_wraps_at_phase_one() {
    let n = NoiseField::new(4);
    for (x, y, _) in lcg_points(64) {
        let a = n.sample_looped(x, y, 0.0, 1.0);
        let b = n.sample_looped(x, y, 1.0, 1.0);
        assert!((a - b).abs() < 1e-9);
    }
}
