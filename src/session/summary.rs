//! End-of-walk summary.

use crate::story::{ChoiceRecord, Genre};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened on a finished or stopped walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkingSummary {
    /// Wall-clock seconds from start to finish
    pub total_time_s: u64,
    /// Route distance in meters
    pub distance_m: f64,
    pub checkpoints_completed: usize,
    pub checkpoints_total: usize,
    /// Choices in the order they were made
    pub story_choices_made: Vec<ChoiceRecord>,
    pub genre: Genre,
    /// False when the walk was stopped before the story ended
    pub completed: bool,
    /// Minutes per kilometer, when both time and distance are positive
    pub average_pace_min_per_km: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl WalkingSummary {
    pub(crate) fn build(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        distance_m: f64,
        genre: Genre,
        completed: bool,
    ) -> Self {
        let total_time_s = (finished_at - started_at).num_seconds().max(0) as u64;
        Self {
            total_time_s,
            distance_m,
            checkpoints_completed: 0,
            checkpoints_total: 0,
            story_choices_made: Vec::new(),
            genre,
            completed,
            average_pace_min_per_km: average_pace(total_time_s, distance_m),
            started_at,
            finished_at,
        }
    }

    pub(crate) fn with_checkpoints(mut self, completed: usize, total: usize) -> Self {
        self.checkpoints_completed = completed;
        self.checkpoints_total = total;
        self
    }

    pub(crate) fn with_choices(mut self, choices: Vec<ChoiceRecord>) -> Self {
        self.story_choices_made = choices;
        self
    }

    /// "12 phút 30 giây"
    pub fn formatted_time(&self) -> String {
        let minutes = self.total_time_s / 60;
        let seconds = self.total_time_s % 60;
        if minutes == 0 {
            format!("{} giây", seconds)
        } else {
            format!("{} phút {} giây", minutes, seconds)
        }
    }

    /// "1.25 km" or "850 m"
    pub fn formatted_distance(&self) -> String {
        if self.distance_m >= 1000.0 {
            format!("{:.2} km", self.distance_m / 1000.0)
        } else {
            format!("{:.0} m", self.distance_m)
        }
    }
}

fn average_pace(total_time_s: u64, distance_m: f64) -> Option<f64> {
    if total_time_s == 0 || distance_m.is_nan() || distance_m <= 0.0 {
        return None;
    }
    Some((total_time_s as f64 / 60.0) / (distance_m / 1000.0))
}
