//! Unit tests for geodesy helpers.

use wanderer::geo::{self, BoundingBox, CompassDirection, Coordinate};

fn sample_points() -> Vec<Coordinate> {
    vec![
        Coordinate::new(10.762622, 106.660172),
        Coordinate::new(10.771701, 106.698059),
        Coordinate::new(21.028511, 105.804817),
        Coordinate::new(-33.8688, 151.2093),
        Coordinate::new(51.5074, -0.1278),
        Coordinate::new(0.0, 0.0),
    ]
}

#[test]
fn test_distance_to_self_is_zero() {
    for p in sample_points() {
        assert_eq!(geo::distance(p, p), 0.0);
    }
}

#[test]
fn test_distance_is_symmetric() {
    let points = sample_points();
    for a in &points {
        for b in &points {
            let ab = geo::distance(*a, *b);
            let ba = geo::distance(*b, *a);
            assert!((ab - ba).abs() < 1e-6, "{} vs {}", ab, ba);
        }
    }
}

#[test]
fn test_triangle_inequality_on_nearly_collinear_points() {
    let a = Coordinate::new(10.7600, 106.6600);
    let b = Coordinate::new(10.7650, 106.6801);
    let c = Coordinate::new(10.7700, 106.7000);

    let direct = geo::distance(a, c);
    let via = geo::distance(a, b) + geo::distance(b, c);
    assert!(via >= direct - 1e-6);
    assert!(via - direct < 5.0);
}

#[test]
fn test_known_distance() {
    // One degree of latitude is ~111.2 km on a 6371 km sphere
    let d = geo::distance(Coordinate::new(10.0, 106.0), Coordinate::new(11.0, 106.0));
    assert!((d - 111_195.0).abs() < 50.0);
}

#[test]
fn test_bearing_range() {
    let points = sample_points();
    for a in &points {
        for b in &points {
            let bearing = geo::bearing(*a, *b);
            assert!((0.0..360.0).contains(&bearing), "bearing {} out of range", bearing);
        }
    }
}

#[test]
fn test_cardinal_bearings() {
    let origin = Coordinate::new(10.0, 106.0);
    let north = geo::bearing(origin, Coordinate::new(10.01, 106.0));
    let east = geo::bearing(origin, Coordinate::new(10.0, 106.01));
    assert!(north.abs() < 0.01 || (north - 360.0).abs() < 0.01);
    assert!((east - 90.0).abs() < 0.1);

    assert_eq!(CompassDirection::from_bearing(north), CompassDirection::North);
    assert_eq!(CompassDirection::from_bearing(east), CompassDirection::East);
    assert_eq!(CompassDirection::from_bearing(225.0), CompassDirection::SouthWest);
}

#[test]
fn test_interpolate_endpoints() {
    let a = Coordinate::new(10.0, 106.0);
    let b = Coordinate::new(11.0, 107.0);
    assert_eq!(geo::interpolate(a, b, 0.0), a);
    assert_eq!(geo::interpolate(a, b, 1.0), b);
    assert_eq!(geo::interpolate(a, b, 0.5), Coordinate::new(10.5, 106.5));
}

#[test]
fn test_bounding_box() {
    let points = sample_points();
    let bbox = BoundingBox::from_coordinates(&points).unwrap();
    for p in &points {
        assert!(bbox.contains(p));
    }
    assert!(BoundingBox::from_coordinates(&[]).is_none());
}

#[test]
fn test_coordinate_parsing() {
    let c: Coordinate = "10.762622, 106.660172".parse().unwrap();
    assert_eq!(c, Coordinate::new(10.762622, 106.660172));
    assert_eq!(c.to_string(), "10.762622,106.660172");

    assert!("10.7".parse::<Coordinate>().is_err());
    assert!("95.0,10.0".parse::<Coordinate>().is_err());
}
