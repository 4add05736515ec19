use super::*;
use std::collections::BTreeMap;

#[test]
fn time_keys_order_numerically() {
    let mut m = BTreeMap::new();
    for s in ["10", "2", "0.5", "1.25"] {
        m.insert(TimeKey::parse(s).unwrap(), s);
    }
    let order: Vec<_> = m.values().copied().collect();
    assert_eq!(order, vec!["0.5", "1.25", "2", "10"]);
}

#[test]
fn time_key_rejects_nan_and_folds_negative_zero() {
    assert!(TimeKey::new(f64::NAN).is_err());
    assert!(TimeKey::new(f64::INFINITY).is_err());
    assert!(TimeKey::parse("abc").is_err());
    assert_eq!(TimeKey::new(-0.0).unwrap(), TimeKey::ZERO);
}

#[test]
fn time_key_display_roundtrips() {
    for v in [0.0, 1.0, 2.5, 0.1 + 0.2, 1234.5678] {
        let k = TimeKey::new(v).unwrap();
        assert_eq!(TimeKey::parse(&k.to_string()).unwrap().secs(), v);
    }
    assert_eq!(TimeKey::new(3.0).unwrap().to_string(), "3");
}

#[test]
fn lerp_point_hits_endpoints_exactly() {
    let o = Point::new(0.3, -7.1);
    let d = Point::new(100.7, 0.9);
    assert_eq!(lerp_point(o, d, 0.0), o);
    assert_eq!(lerp_point(o, d, 1.0), d);
    let mid = lerp_point(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 0.5);
    assert_eq!(mid, Point::new(50.0, 0.0));
}

#[test]
fn loft_radius_is_a_parabola_between_ground_and_air() {
    assert!((loft_radius(10.0, 14.0, 0.0) - 10.0).abs() < 1e-12);
    assert!((loft_radius(10.0, 14.0, 1.0) - 10.0).abs() < 1e-12);
    assert!((loft_radius(10.0, 14.0, 0.5) - 14.0).abs() < 1e-12);
    let q = loft_radius(10.0, 14.0, 0.25);
    assert!(q > 10.0 && q < 14.0);
    assert!((q - loft_radius(10.0, 14.0, 0.75)).abs() < 1e-12);
}
