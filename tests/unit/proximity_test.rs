//! Unit tests for the checkpoint proximity monitor.

use wanderer::geo::{self, Coordinate};
use wanderer::tracking::{Checkpoint, ProximityMonitor};

const CENTER: Coordinate = Coordinate::new(10.7769, 106.7009);

/// A point `meters` north of `origin`.
fn north_of(origin: Coordinate, meters: f64) -> Coordinate {
    let degrees = meters / 111_194.93;
    Coordinate::new(origin.latitude + degrees, origin.longitude)
}

#[test]
fn test_reached_exactly_once() {
    let checkpoint = Checkpoint::new(CENTER, "Nhà thờ Đức Bà").with_radius(50.0);
    let id = checkpoint.id;
    let mut monitor = ProximityMonitor::new(vec![checkpoint]);

    let events = monitor.update(CENTER);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].checkpoint_id, id);
    assert_eq!(events[0].distance, 0.0);

    for _ in 0..5 {
        assert!(monitor.update(CENTER).is_empty());
    }
    assert_eq!(monitor.reached_ids(), &[id]);
    assert!(monitor.checkpoints()[0].reached_at.is_some());
}

#[test]
fn test_just_outside_radius_never_triggers() {
    let mut monitor = ProximityMonitor::new(vec![Checkpoint::new(CENTER, "A").with_radius(50.0)]);

    let outside = north_of(CENTER, 50.5);
    assert!(geo::distance(outside, CENTER) > 50.0);
    for _ in 0..3 {
        assert!(monitor.update(outside).is_empty());
    }
    assert_eq!(monitor.reached_count(), 0);

    let inside = north_of(CENTER, 49.0);
    assert_eq!(monitor.update(inside).len(), 1);
}

#[test]
fn test_overlapping_checkpoints_emit_in_list_order() {
    let first = Checkpoint::new(north_of(CENTER, 20.0), "A").with_radius(50.0);
    let second = Checkpoint::new(CENTER, "B").with_radius(50.0);
    let mut monitor = ProximityMonitor::new(vec![first, second]);

    let events = monitor.update(CENTER);
    let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert_eq!(events[1].index, 1);
    assert!(monitor.all_reached());
    assert_eq!(monitor.completion_percent(), 100.0);
}

#[test]
fn test_pending_queries_and_reset() {
    let far = Checkpoint::new(north_of(CENTER, 400.0), "Xa");
    let near = Checkpoint::new(north_of(CENTER, 100.0), "Gần");
    let mut monitor = ProximityMonitor::new(vec![far, near]);

    assert_eq!(monitor.nearest_pending(CENTER).unwrap().title, "Gần");
    let next = monitor.distance_to_next(CENTER).unwrap();
    assert!((next - 400.0).abs() < 1.0);

    monitor.update(north_of(CENTER, 100.0));
    assert_eq!(monitor.nearest_pending(CENTER).unwrap().title, "Xa");

    monitor.reset();
    assert_eq!(monitor.reached_count(), 0);
    assert!(monitor.checkpoints().iter().all(|c| !c.reached));
}
