//! Checkpoint proximity monitor.
//!
//! Each checkpoint moves from pending to reached exactly once. Positions are
//! evaluated against every pending checkpoint and reached events come out in
//! checkpoint list order.

use super::Checkpoint;
use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted the first time a checkpoint's trigger radius is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointReached {
    pub checkpoint_id: Uuid,
    /// Position in the checkpoint list
    pub index: usize,
    pub title: String,
    /// Distance from the position that triggered it (meters)
    pub distance: f64,
}

/// Tracks which checkpoints have been reached.
#[derive(Debug, Clone, Default)]
pub struct ProximityMonitor {
    checkpoints: Vec<Checkpoint>,
    /// Reached checkpoints in the order they were reached
    reached: Vec<Uuid>,
}

impl ProximityMonitor {
    pub fn new(checkpoints: Vec<Checkpoint>) -> Self {
        let reached = checkpoints
            .iter()
            .filter(|c| c.reached)
            .map(|c| c.id)
            .collect();

        Self {
            checkpoints,
            reached,
        }
    }

    /// Evaluate a position using the current time.
    pub fn update(&mut self, position: Coordinate) -> Vec<CheckpointReached> {
        self.update_at(position, Utc::now())
    }

    /// Evaluate a position, stamping newly reached checkpoints with `now`.
    pub fn update_at(&mut self, position: Coordinate, now: DateTime<Utc>) -> Vec<CheckpointReached> {
        let mut events = Vec::new();

        for (index, checkpoint) in self.checkpoints.iter_mut().enumerate() {
            if checkpoint.reached {
                continue;
            }

            let distance = checkpoint.distance_from(position);
            if distance < checkpoint.trigger_radius_m {
                checkpoint.reached = true;
                checkpoint.reached_at = Some(now);
                self.reached.push(checkpoint.id);

                tracing::info!(
                    "Reached checkpoint {} '{}' ({:.1} m)",
                    index + 1,
                    checkpoint.title,
                    distance
                );

                events.push(CheckpointReached {
                    checkpoint_id: checkpoint.id,
                    index,
                    title: checkpoint.title.clone(),
                    distance,
                });
            }
        }

        events
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Reached checkpoint ids in the order they were reached
    pub fn reached_ids(&self) -> &[Uuid] {
        &self.reached
    }

    pub fn reached_count(&self) -> usize {
        self.reached.len()
    }

    pub fn is_reached(&self, id: Uuid) -> bool {
        self.reached.contains(&id)
    }

    pub fn all_reached(&self) -> bool {
        self.reached.len() == self.checkpoints.len()
    }

    /// Closest checkpoint that has not been reached yet
    pub fn nearest_pending(&self, position: Coordinate) -> Option<&Checkpoint> {
        self.checkpoints
            .iter()
            .filter(|c| !c.reached)
            .map(|c| (c, c.distance_from(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    /// Distance to the first pending checkpoint in list order
    pub fn distance_to_next(&self, position: Coordinate) -> Option<f64> {
        self.checkpoints
            .iter()
            .find(|c| !c.reached)
            .map(|c| c.distance_from(position))
    }

    /// Reached share of all checkpoints, 0-100
    pub fn completion_percent(&self) -> f64 {
        if self.checkpoints.is_empty() {
            return 0.0;
        }
        self.reached.len() as f64 / self.checkpoints.len() as f64 * 100.0
    }

    /// Mark everything pending again
    pub fn reset(&mut self) {
        for checkpoint in &mut self.checkpoints {
            checkpoint.reached = false;
            checkpoint.reached_at = None;
        }
        self.reached.clear();
    }
}
