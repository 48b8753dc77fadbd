//! Unit tests for route progress.

use wanderer::geo::Coordinate;
use wanderer::routing::{FallbackRouter, Route, RouteRequest, RouteSource};
use wanderer::tracking::{self, Checkpoint};

fn fallback_route() -> Route {
    FallbackRouter::default().route(
        &RouteRequest::new(
            Coordinate::new(10.7626, 106.6602),
            Coordinate::new(10.7717, 106.6981),
        )
        .with_waypoints(vec![Coordinate::new(10.7680, 106.6800)]),
    )
}

#[test]
fn test_percent_at_ends() {
    let route = fallback_route();
    assert!(tracking::progress(&route, route.coordinates()[0]).percent.abs() < 1e-9);

    let last = *route.coordinates().last().unwrap();
    assert!((tracking::progress(&route, last).percent - 100.0).abs() < 1e-9);
}

#[test]
fn test_percent_is_monotonic_along_route() {
    let route = fallback_route();
    let mut previous = -1.0;

    for point in route.coordinates() {
        let p = tracking::progress(&route, *point);
        assert!(p.percent >= previous, "{} < {}", p.percent, previous);
        assert!(p.remaining_distance >= 0.0);
        previous = p.percent;
    }
}

#[test]
fn test_reported_distance_does_not_skew_percent() {
    let coords = vec![
        Coordinate::new(10.77, 106.69),
        Coordinate::new(10.77, 106.691),
        Coordinate::new(10.77, 106.692),
    ];
    // Provider reports much more than the polyline covers
    let route = Route::new(coords, 5000.0, 3600.0, vec![], RouteSource::Primary).unwrap();

    let end = tracking::progress(&route, Coordinate::new(10.77, 106.692));
    assert!((end.percent - 100.0).abs() < 1e-9);
}

#[test]
fn test_checkpoint_placement() {
    let route = fallback_route();
    let near_waypoint = Checkpoint::new(Coordinate::new(10.7680, 106.6800), "Điểm 1");
    let near_end = Checkpoint::new(Coordinate::new(10.7717, 106.6981), "Điểm 2");
    let checkpoints = vec![near_waypoint, near_end];

    let (nearest, placement) =
        tracking::nearest_checkpoint(Coordinate::new(10.7679, 106.6799), &route, &checkpoints)
            .unwrap();
    assert_eq!(nearest.title, "Điểm 1");
    assert!(placement.distance_from_start > 0.0);

    let end = tracking::locate_on_route(&route, checkpoints[1].coordinate);
    assert_eq!(end.route_index, route.coordinates().len() - 1);
    assert!(end.eta_minutes >= placement.eta_minutes);
}
