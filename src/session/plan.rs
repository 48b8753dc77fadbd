//! Walk planning: placing checkpoints before the walk starts.

use super::SessionError;
use crate::geo::Coordinate;
use crate::routing::{Route, RouteRequest};
use crate::story::{Genre, StoryRequest};
use crate::tracking::{Checkpoint, DEFAULT_TRIGGER_RADIUS_M};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minutes budgeted per checkpoint when no route is known.
const MINUTES_PER_CHECKPOINT: u32 = 8;
/// Extra minutes for walking back to the start.
const LOOP_RETURN_MINUTES: u32 = 10;

/// A walk being planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkPlan {
    pub checkpoints: Vec<Checkpoint>,
    pub genre: Genre,
    /// Return to the start after the last checkpoint
    pub is_loop: bool,
    pub speech_rate: f32,
    /// Radius given to newly placed checkpoints (meters)
    pub trigger_radius_m: f64,
}

impl Default for WalkPlan {
    fn default() -> Self {
        Self::new(Genre::Adventure)
    }
}

impl WalkPlan {
    pub fn new(genre: Genre) -> Self {
        Self {
            checkpoints: Vec::new(),
            genre,
            is_loop: false,
            speech_rate: 1.0,
            trigger_radius_m: DEFAULT_TRIGGER_RADIUS_M,
        }
    }

    pub fn looped(mut self, is_loop: bool) -> Self {
        self.is_loop = is_loop;
        self
    }

    pub fn with_trigger_radius(mut self, meters: f64) -> Self {
        self.trigger_radius_m = meters;
        self
    }

    pub fn with_speech_rate(mut self, rate: f32) -> Self {
        self.speech_rate = rate.clamp(0.5, 2.0);
        self
    }

    /// Place a checkpoint titled "Điểm N". Returns its id.
    pub fn add_checkpoint(&mut self, coordinate: Coordinate) -> Uuid {
        let title = format!("Điểm {}", self.checkpoints.len() + 1);
        let checkpoint = Checkpoint::new(coordinate, title).with_radius(self.trigger_radius_m);
        let id = checkpoint.id;
        self.checkpoints.push(checkpoint);
        id
    }

    /// Rename or describe a checkpoint. Returns false if it is not in the plan.
    pub fn edit_checkpoint(
        &mut self,
        id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        match self.checkpoints.iter_mut().find(|c| c.id == id) {
            Some(checkpoint) => {
                checkpoint.title = title.into();
                checkpoint.description = description.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_checkpoint(&mut self, id: Uuid) -> Option<Checkpoint> {
        let index = self.checkpoints.iter().position(|c| c.id == id)?;
        Some(self.checkpoints.remove(index))
    }

    pub fn clear(&mut self) {
        self.checkpoints.clear();
    }

    /// Directions request from `start` through every checkpoint.
    ///
    /// A loop returns to `start`; a one-way walk ends at the last checkpoint.
    pub fn route_request(&self, start: Coordinate) -> Result<RouteRequest, SessionError> {
        let coords: Vec<Coordinate> = self.checkpoints.iter().map(|c| c.coordinate).collect();
        let Some((last, rest)) = coords.split_last() else {
            return Err(SessionError::NoCheckpoints);
        };

        let request = if self.is_loop {
            RouteRequest::new(start, start).with_waypoints(coords.clone())
        } else {
            RouteRequest::new(start, *last).with_waypoints(rest.to_vec())
        };
        Ok(request)
    }

    /// Walking time in minutes, from the route when there is one.
    pub fn estimated_minutes(&self, route: Option<&Route>) -> u32 {
        match route {
            Some(route) => (route.duration() / 60.0).round() as u32,
            None => {
                let base = self.checkpoints.len() as u32 * MINUTES_PER_CHECKPOINT;
                if self.is_loop {
                    base + LOOP_RETURN_MINUTES
                } else {
                    base
                }
            }
        }
    }

    /// Story request for this plan
    pub fn story_request(&self, route: Option<&Route>) -> StoryRequest {
        StoryRequest::new(
            self.genre,
            self.checkpoints.clone(),
            self.estimated_minutes(route),
        )
        .with_distance(route.map_or(0.0, Route::distance))
    }
}
