//! Local route approximation used when no provider answers.
//!
//! Each leg of origin -> waypoints -> destination becomes a gently curved
//! path with a point roughly every `point_spacing_m` meters, so the map still
//! shows a plausible walking line and the tracker has points to snap to.

use super::{InstructionTemplates, Route, RouteRequest, RouteSource, RouteStep, WALKING_SPEED_MPS};
use crate::geo::{self, CompassDirection, Coordinate};

/// Default spacing between synthesized points (meters).
pub const DEFAULT_POINT_SPACING_M: f64 = 30.0;

/// Deterministic geometric router. Never fails.
#[derive(Debug, Clone)]
pub struct FallbackRouter {
    point_spacing_m: f64,
    walking_speed_mps: f64,
    templates: InstructionTemplates,
}

impl Default for FallbackRouter {
    fn default() -> Self {
        Self {
            point_spacing_m: DEFAULT_POINT_SPACING_M,
            walking_speed_mps: WALKING_SPEED_MPS,
            templates: InstructionTemplates::default(),
        }
    }
}

impl FallbackRouter {
    pub fn new(templates: InstructionTemplates) -> Self {
        Self {
            templates,
            ..Default::default()
        }
    }

    pub fn with_point_spacing(mut self, meters: f64) -> Self {
        if meters.is_finite() && meters > 0.0 {
            self.point_spacing_m = meters;
        }
        self
    }

    pub fn with_walking_speed(mut self, mps: f64) -> Self {
        if mps.is_finite() && mps > 0.0 {
            self.walking_speed_mps = mps;
        }
        self
    }

    /// Synthesize a route through every anchor of the request.
    pub fn route(&self, request: &RouteRequest) -> Route {
        let anchors = request.anchors();
        let mut coordinates: Vec<Coordinate> = Vec::new();
        let mut steps = Vec::with_capacity(anchors.len() - 1);
        let mut total_distance = 0.0;
        let mut total_duration = 0.0;

        for (i, pair) in anchors.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let leg = self.curved_path(from, to);
            let leg_len = leg.len();
            coordinates.extend(leg);

            let distance = geo::distance(from, to);
            let duration = distance / self.walking_speed_mps;
            total_distance += distance;
            total_duration += duration;

            let direction = CompassDirection::from_bearing(geo::bearing(from, to));
            let instruction = if i == 0 {
                self.templates.go(direction, distance)
            } else {
                self.templates.continue_on(direction, distance)
            };

            steps.push(RouteStep {
                instruction,
                distance,
                duration,
                start_index: coordinates.len() - leg_len,
                end_index: coordinates.len() - 1,
            });
        }

        tracing::debug!(
            "Fallback route: {} points, {:.0} m over {} leg(s)",
            coordinates.len(),
            total_distance,
            steps.len()
        );

        // Every leg contributes at least its two endpoints
        Route::new(
            coordinates,
            total_distance,
            total_duration,
            steps,
            RouteSource::Fallback,
        )
        .unwrap_or_else(|_| self.straight_line(request))
    }

    fn curved_path(&self, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
        let distance = geo::distance(from, to);
        let intervals = ((distance / self.point_spacing_m).floor() as usize).max(2);

        let mut points = Vec::with_capacity(intervals + 1);
        points.push(from);
        for i in 1..intervals {
            points.push(geo::curved_point(from, to, i as f64 / intervals as f64));
        }
        points.push(to);
        points
    }

    fn straight_line(&self, request: &RouteRequest) -> Route {
        let distance = geo::distance(request.origin, request.destination);
        Route {
            coordinates: vec![request.origin, request.destination],
            distance,
            duration: distance / self.walking_speed_mps,
            steps: Vec::new(),
            bbox: geo::BoundingBox {
                min_lon: request.origin.longitude.min(request.destination.longitude),
                min_lat: request.origin.latitude.min(request.destination.latitude),
                max_lon: request.origin.longitude.max(request.destination.longitude),
                max_lat: request.origin.latitude.max(request.destination.latitude),
            },
            source: RouteSource::Fallback,
        }
    }
}
