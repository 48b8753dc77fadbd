//! Device position input.
//!
//! The walk session asks a [`PositionSource`] for the current position once,
//! then subscribes to a stream of updates. [`ReplayPositionSource`] replays a
//! recorded or synthesized track, which is what the CLI simulator and the
//! tests use.

use crate::geo::{self, Coordinate};
use crate::routing::Route;
use crossbeam::channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Location errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// How often the source should report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingOptions {
    pub interval: Duration,
    /// Updates closer than this to the previous one are dropped (meters)
    pub min_distance_m: f64,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            min_distance_m: 5.0,
        }
    }
}

/// Trait for position providers
pub trait PositionSource: Send {
    /// One-shot current position
    fn current_position(&mut self) -> Result<Coordinate, LocationError>;

    /// Start streaming position updates
    fn subscribe(&mut self, options: TrackingOptions) -> Result<Receiver<Coordinate>, LocationError>;

    /// Stop streaming. The receiver disconnects.
    fn unsubscribe(&mut self);

    /// Whether a subscription is active
    fn is_tracking(&self) -> bool;
}

/// Replays a fixed track.
///
/// Without pacing every point is queued at subscribe time. With pacing a
/// background thread emits one point per interval.
pub struct ReplayPositionSource {
    track: Vec<Coordinate>,
    permission_granted: bool,
    paced: bool,
    stop_flag: Option<Arc<AtomicBool>>,
    tracking: bool,
}

impl ReplayPositionSource {
    pub fn new(track: Vec<Coordinate>) -> Self {
        Self {
            track,
            permission_granted: true,
            paced: false,
            stop_flag: None,
            tracking: false,
        }
    }

    /// A source whose permission request was refused
    pub fn denied() -> Self {
        Self {
            permission_granted: false,
            ..Self::new(Vec::new())
        }
    }

    /// Emit points at the subscription interval instead of all at once
    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }

    fn filtered(&self, min_distance_m: f64) -> Vec<Coordinate> {
        let mut out: Vec<Coordinate> = Vec::with_capacity(self.track.len());
        for point in &self.track {
            match out.last() {
                Some(last) if geo::distance(*last, *point) < min_distance_m => {}
                _ => out.push(*point),
            }
        }
        out
    }
}

impl PositionSource for ReplayPositionSource {
    fn current_position(&mut self) -> Result<Coordinate, LocationError> {
        if !self.permission_granted {
            return Err(LocationError::PermissionDenied);
        }
        self.track
            .first()
            .copied()
            .ok_or_else(|| LocationError::Unavailable("empty track".to_string()))
    }

    fn subscribe(&mut self, options: TrackingOptions) -> Result<Receiver<Coordinate>, LocationError> {
        if !self.permission_granted {
            return Err(LocationError::PermissionDenied);
        }
        self.unsubscribe();

        let points = self.filtered(options.min_distance_m);
        let (tx, rx) = crossbeam::channel::unbounded();
        tracing::debug!("Replaying {} position(s)", points.len());

        if self.paced {
            let stop = Arc::new(AtomicBool::new(false));
            let thread_stop = stop.clone();
            std::thread::spawn(move || {
                for point in points {
                    if thread_stop.load(Ordering::Relaxed) || tx.send(point).is_err() {
                        break;
                    }
                    std::thread::sleep(options.interval);
                }
            });
            self.stop_flag = Some(stop);
        } else {
            for point in points {
                // Receiver is held locally, so this cannot fail
                let _ = tx.send(point);
            }
            // Dropping the sender closes the feed once the queue drains
        }

        self.tracking = true;
        Ok(rx)
    }

    fn unsubscribe(&mut self) {
        if let Some(stop) = self.stop_flag.take() {
            stop.store(true, Ordering::Relaxed);
        }
        self.tracking = false;
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }
}

/// Positions every `spacing_m` meters along a route, for simulated walks.
pub fn walk_along(route: &Route, spacing_m: f64) -> Vec<Coordinate> {
    let spacing = if spacing_m.is_finite() && spacing_m > 0.0 {
        spacing_m
    } else {
        5.0
    };

    let mut points = vec![route.start()];
    for pair in route.coordinates().windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let leg = geo::distance(a, b);
        let steps = (leg / spacing).ceil().max(1.0) as usize;
        for i in 1..=steps {
            points.push(geo::interpolate(a, b, i as f64 / steps as f64));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteSource;

    fn track() -> Vec<Coordinate> {
        vec![
            Coordinate::new(10.77, 106.69),
            Coordinate::new(10.77001, 106.69), // ~1 m, dropped
            Coordinate::new(10.7701, 106.69),  // ~11 m
            Coordinate::new(10.7702, 106.69),
        ]
    }

    #[test]
    fn test_denied_source() {
        let mut source = ReplayPositionSource::denied();
        assert_eq!(source.current_position(), Err(LocationError::PermissionDenied));
        assert!(source.subscribe(TrackingOptions::default()).is_err());
    }

    #[test]
    fn test_replay_filters_by_min_distance() {
        let mut source = ReplayPositionSource::new(track());
        assert_eq!(source.current_position().unwrap(), track()[0]);

        let rx = source.subscribe(TrackingOptions::default()).unwrap();
        let received: Vec<_> = rx.iter().collect();
        assert_eq!(received.len(), 3);
        assert_eq!(received[1], track()[2]);
    }

    #[test]
    fn test_paced_replay_stops_on_unsubscribe() {
        let mut source = ReplayPositionSource::new(track()).paced();
        let rx = source
            .subscribe(TrackingOptions {
                interval: Duration::from_millis(50),
                min_distance_m: 0.0,
            })
            .unwrap();
        assert!(source.is_tracking());

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first, track()[0]);

        source.unsubscribe();
        assert!(!source.is_tracking());
        // Feed ends once the thread sees the flag
        let rest: Vec<_> = rx.iter().collect();
        assert!(rest.len() < 3);
    }

    #[test]
    fn test_walk_along_covers_route() {
        let route = Route::new(
            vec![Coordinate::new(10.77, 106.69), Coordinate::new(10.771, 106.69)],
            111.0,
            80.0,
            vec![],
            RouteSource::Fallback,
        )
        .unwrap();

        let points = walk_along(&route, 10.0);
        assert_eq!(points.first(), Some(&route.start()));
        assert!(geo::distance(*points.last().unwrap(), route.end()) < 1e-6);
        assert!(points.len() >= 12);
    }
}
