use fleet_tracker::domains::geodesy::{bearing, lerp, GeoPoint};
use fleet_tracker::domains::route_simulation::densify;

#[test]
fn test_bearing_of_identical_points_is_zero() {
    let p = GeoPoint::new(12.9716, 77.5946);
    assert_eq!(bearing(&p, &p), 0.0);
}

#[test]
fn test_bearing_always_in_range() {
    let origin = GeoPoint::new(12.0, 77.0);
    for dlat in -10..=10 {
        for dlng in -10..=10 {
            let to = GeoPoint::new(12.0 + dlat as f64 * 0.37, 77.0 + dlng as f64 * 0.41);
            let b = bearing(&origin, &to);
            assert!((0.0..360.0).contains(&b), "bearing {} out of range for {}", b, to);
        }
    }

    // Just west of due north must not round up to 360.
    let b = bearing(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, -1e-13));
    assert!((0.0..360.0).contains(&b));
}

#[test]
fn test_bearing_heads_north_east() {
    let b = bearing(&GeoPoint::new(12.0, 77.0), &GeoPoint::new(12.001, 77.001));
    assert!(b > 40.0 && b < 50.0, "unexpected bearing {}", b);
}

#[test]
fn test_lerp_endpoints_are_exact() {
    let p1 = GeoPoint::new(12.345678901, 77.123456789);
    let p2 = GeoPoint::new(13.020965012517026, 77.64319256724274);
    assert_eq!(lerp(&p1, &p2, 0.0), p1);
    assert_eq!(lerp(&p1, &p2, 1.0), p2);
}

#[test]
fn test_densify_unit_diagonal() {
    let start = GeoPoint::new(0.0, 0.0);
    let end = GeoPoint::new(1.0, 1.0);
    let points = densify(&[start, end], 20);

    assert_eq!(points.len(), 21);
    assert_eq!(points[0], start);
    assert_eq!(points[20], end);
    assert!((points[10].lat - 0.5).abs() < 1e-12);
    assert!((points[19].lng - 0.95).abs() < 1e-12);
}
