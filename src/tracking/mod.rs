//! Position tracking against a planned walk.
//!
//! [`progress`] measures how far along the route a position is, and
//! [`proximity`] turns the position stream into one-shot checkpoint events.

pub mod progress;
pub mod proximity;

use crate::geo::{self, Coordinate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use progress::{
    locate_on_route, nearest_checkpoint, nearest_point_index, progress, RoutePlacement,
    RouteProgress,
};
pub use proximity::{CheckpointReached, ProximityMonitor};

/// Default distance at which a checkpoint counts as reached (meters).
pub const DEFAULT_TRIGGER_RADIUS_M: f64 = 50.0;

/// A planned stop on a walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique identifier
    pub id: Uuid,
    pub coordinate: Coordinate,
    /// Display title
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Reached once strictly closer than this (meters)
    pub trigger_radius_m: f64,
    #[serde(default)]
    pub reached: bool,
    #[serde(default)]
    pub reached_at: Option<DateTime<Utc>>,
}

impl Checkpoint {
    /// Create a pending checkpoint with the default trigger radius
    pub fn new(coordinate: Coordinate, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            coordinate,
            title: title.into(),
            description: String::new(),
            trigger_radius_m: DEFAULT_TRIGGER_RADIUS_M,
            reached: false,
            reached_at: None,
        }
    }

    /// Add description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the trigger radius
    pub fn with_radius(mut self, meters: f64) -> Self {
        self.trigger_radius_m = meters;
        self
    }

    /// Distance from a position to this checkpoint in meters
    pub fn distance_from(&self, position: Coordinate) -> f64 {
        geo::distance(position, self.coordinate)
    }
}
