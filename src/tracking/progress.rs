//! Progress along a route.

use super::Checkpoint;
use crate::geo::{self, Coordinate};
use crate::routing::{Route, WALKING_SPEED_MPS};
use serde::{Deserialize, Serialize};

/// Where a position sits on the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteProgress {
    /// Meters walked along the polyline up to the nearest point
    pub completed_distance: f64,
    /// Meters left, never negative
    pub remaining_distance: f64,
    /// 0-100
    pub percent: f64,
    pub nearest_index: usize,
}

/// Placement of a coordinate (usually a checkpoint) on the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePlacement {
    pub route_index: usize,
    pub distance_from_start: f64,
    /// Walking time from the start, rounded to whole minutes
    pub eta_minutes: u32,
}

/// Index of the polyline point closest to `position`. Ties keep the first.
pub fn nearest_point_index(route: &Route, position: Coordinate) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;

    for (i, point) in route.coordinates().iter().enumerate() {
        let d = geo::distance(position, *point);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }

    best
}

fn distance_to_index(route: &Route, index: usize) -> f64 {
    geo::path_length(&route.coordinates()[..=index])
}

/// Completed and remaining distance for a position.
///
/// Percent is measured against the polyline length so it reaches 100 at the
/// final point whatever distance the provider reported.
pub fn progress(route: &Route, position: Coordinate) -> RouteProgress {
    let nearest_index = nearest_point_index(route, position);
    let completed_distance = distance_to_index(route, nearest_index);
    let total = route.polyline_length();

    let percent = if total > 0.0 {
        (completed_distance / total * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    RouteProgress {
        completed_distance,
        remaining_distance: (total - completed_distance).max(0.0),
        percent,
        nearest_index,
    }
}

/// Snap a coordinate onto the route and estimate walking time to it.
pub fn locate_on_route(route: &Route, coordinate: Coordinate) -> RoutePlacement {
    let route_index = nearest_point_index(route, coordinate);
    let distance_from_start = distance_to_index(route, route_index);

    RoutePlacement {
        route_index,
        distance_from_start,
        eta_minutes: (distance_from_start / WALKING_SPEED_MPS / 60.0).round() as u32,
    }
}

/// The checkpoint closest to `position`, with its placement on the route.
pub fn nearest_checkpoint<'a>(
    position: Coordinate,
    route: &Route,
    checkpoints: &'a [Checkpoint],
) -> Option<(&'a Checkpoint, RoutePlacement)> {
    let mut nearest: Option<(&Checkpoint, f64)> = None;

    for checkpoint in checkpoints {
        let d = checkpoint.distance_from(position);
        if nearest.map_or(true, |(_, best)| d < best) {
            nearest = Some((checkpoint, d));
        }
    }

    nearest.map(|(checkpoint, _)| (checkpoint, locate_on_route(route, checkpoint.coordinate)))
}
