use super::*;

fn corners_plus(extra: &[(f64, f64)]) -> Vec<Point> {
    let mut v = image_corners(100, 80).to_vec();
    v.extend(extra.iter().map(|&(x, y)| Point::new(x, y)));
    v
}

#[test]
fn corners_use_last_pixel_coordinates() {
    let c = image_corners(100, 80);
    assert_eq!(c[3], Point::new(99.0, 79.0));
}

#[test]
fn boundary_injection_skips_points_pinned_in_both_sets() {
    let sp = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
    let ep = vec![Point::new(0.0, 0.0), Point::new(14.0, 12.0)];
    let (a, b) = with_boundary_point_pair(&sp, &ep, 100, 80).unwrap();
    assert_eq!(a.len(), 2 + 7);
    assert_eq!(b.len(), a.len());
    assert_eq!(a[2..], b[2..]);
    assert!(a.contains(&Point::new(50.0, 0.0)));
    assert!(a.contains(&Point::new(99.0, 40.0)));
    validate_point_pair(&a, &b, 100, 80).unwrap();
}

#[test]
fn boundary_injection_appends_the_same_points_to_asymmetric_sets() {
    // The start set uses an edge midpoint the end set does not hold.
    let sp = vec![Point::new(50.0, 79.0), Point::new(20.0, 20.0)];
    let ep = vec![Point::new(45.0, 70.0), Point::new(22.0, 18.0)];
    let (a, b) = with_boundary_point_pair(&sp, &ep, 100, 80).unwrap();
    assert_eq!(a.len(), b.len());
    assert_eq!(a[..2], sp[..]);
    assert_eq!(b[..2], ep[..]);
    assert_eq!(a[2..], b[2..]);
    assert!(!a[2..].contains(&Point::new(50.0, 79.0)));
    validate_point_pair(&a, &b, 100, 80).unwrap();
}

#[test]
fn boundary_injection_rejects_a_corner_held_by_one_set() {
    let sp = vec![Point::new(0.0, 0.0), Point::new(30.0, 30.0)];
    let ep = vec![Point::new(10.0, 10.0), Point::new(40.0, 40.0)];
    let err = with_boundary_point_pair(&sp, &ep, 100, 100).unwrap_err();
    assert!(matches!(err, WarpmorphError::Validation(_)));
    assert!(err.to_string().contains("corner"));
}

#[test]
fn boundary_injection_rejects_length_mismatch() {
    let sp = vec![Point::new(30.0, 30.0)];
    assert!(with_boundary_point_pair(&sp, &[], 100, 100).is_err());
}

#[test]
fn corners_at_different_indices_are_rejected() {
    let a = corners_plus(&[(20.0, 20.0)]);
    let mut b = corners_plus(&[(30.0, 25.0)]);
    b.swap(1, 2);
    let err = validate_point_pair(&a, &b, 100, 80).unwrap_err();
    assert!(matches!(err, WarpmorphError::Validation(_)));
    assert!(err.to_string().contains("corner"));
}

#[test]
fn valid_pair_passes() {
    let a = corners_plus(&[(20.0, 20.0)]);
    let b = corners_plus(&[(30.0, 25.0)]);
    validate_point_pair(&a, &b, 100, 80).unwrap();
}

#[test]
fn length_mismatch_is_validation_error() {
    let a = corners_plus(&[(20.0, 20.0)]);
    let b = corners_plus(&[(30.0, 25.0), (40.0, 40.0)]);
    let err = validate_point_pair(&a, &b, 100, 80).unwrap_err();
    assert!(matches!(err, WarpmorphError::Validation(_)));
    assert!(err.to_string().contains("mismatch"));
}

#[test]
fn too_few_points_are_rejected() {
    let pts = vec![Point::new(0.0, 0.0), Point::new(99.0, 0.0), Point::new(0.0, 79.0)];
    assert!(validate_point_set(&pts, 100, 80, "start").is_err());
}

#[test]
fn duplicates_are_rejected() {
    let pts = corners_plus(&[(20.0, 20.0), (20.0, 20.0)]);
    let err = validate_point_set(&pts, 100, 80, "start").unwrap_err();
    assert!(err.to_string().contains("coincide"));
    assert_eq!(first_duplicate(&pts), Some((4, 5)));
}

#[test]
fn duplicate_of_a_corner_is_rejected() {
    let pts = corners_plus(&[(0.0, 0.0)]);
    assert!(validate_point_set(&pts, 100, 80, "end").is_err());
}

#[test]
fn missing_corner_is_rejected() {
    let pts = vec![
        Point::new(0.0, 0.0),
        Point::new(99.0, 0.0),
        Point::new(0.0, 79.0),
        Point::new(50.0, 50.0),
    ];
    let err = validate_point_set(&pts, 100, 80, "start").unwrap_err();
    assert!(err.to_string().contains("corner"));
}

#[test]
fn non_finite_points_are_rejected() {
    let pts = corners_plus(&[(f64::NAN, 1.0)]);
    assert!(validate_point_set(&pts, 100, 80, "start").is_err());
}

#[test]
fn interpolation_hits_endpoints() {
    let a = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
    let b = vec![Point::new(10.0, 10.0), Point::new(20.0, 4.0)];
    assert_eq!(interpolate_points(&a, &b, 0.0), a);
    assert_eq!(interpolate_points(&a, &b, 1.0), b);
    assert_eq!(interpolate_points(&a, &b, 0.5)[1], Point::new(15.0, 2.0));
}
