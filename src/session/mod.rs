//! Walk session orchestration.
//!
//! A [`WalkSession`] owns everything live during a walk: the route, the
//! proximity monitor, the story machine, the position feed and the narration
//! sink. Every input is a [`SessionEvent`] applied in arrival order, and
//! every effect comes back as a [`SessionUpdate`].

pub mod plan;
pub mod summary;

use crate::geo::Coordinate;
use crate::location::{LocationError, PositionSource, TrackingOptions};
use crate::narration::{NarrationSink, SpeechOptions};
use crate::routing::Route;
use crate::story::{Genre, NarrationCue, Story, StoryMachineError, StoryState, StoryStateMachine};
use crate::tracking::{self, CheckpointReached, ProximityMonitor, RouteProgress};
use chrono::{DateTime, Utc};
use crossbeam::channel::Receiver;
use std::sync::Arc;
use thiserror::Error;

pub use plan::WalkPlan;
pub use summary::WalkingSummary;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Story error: {0}")]
    Story(#[from] StoryMachineError),

    #[error("Walk has no checkpoints")]
    NoCheckpoints,
}

/// Inputs to a running walk.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Position(Coordinate),
    /// The generated (or fallback) story is available
    StoryReady(Story),
    ChoiceSelected(String),
    /// The narration sink finished speaking the current segment
    NarrationDone,
    Stop,
}

/// Outputs of a running walk.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Progress(RouteProgress),
    CheckpointReached(CheckpointReached),
    Cue(NarrationCue),
    Completed(WalkingSummary),
}

enum Next {
    Event(SessionEvent),
    ControlClosed,
    FeedClosed,
}

/// A walk in progress.
pub struct WalkSession {
    route: Route,
    genre: Genre,
    speech: SpeechOptions,
    origin: Coordinate,
    monitor: ProximityMonitor,
    machine: StoryStateMachine,
    source: Box<dyn PositionSource>,
    positions: Option<Receiver<Coordinate>>,
    narrator: Arc<dyn NarrationSink>,
    started_at: DateTime<Utc>,
    last_progress: Option<RouteProgress>,
    summary: Option<WalkingSummary>,
}

impl WalkSession {
    /// Start a walk with default tracking options.
    pub fn start(
        plan: &WalkPlan,
        route: Route,
        source: Box<dyn PositionSource>,
        narrator: Arc<dyn NarrationSink>,
    ) -> Result<Self, SessionError> {
        Self::start_with(plan, route, source, narrator, TrackingOptions::default())
    }

    /// Start a walk.
    ///
    /// Reads the current position and subscribes to updates; location
    /// failures are returned to the caller. The story machine is left in
    /// `Generating`, waiting for [`SessionEvent::StoryReady`].
    pub fn start_with(
        plan: &WalkPlan,
        route: Route,
        mut source: Box<dyn PositionSource>,
        narrator: Arc<dyn NarrationSink>,
        tracking: TrackingOptions,
    ) -> Result<Self, SessionError> {
        if plan.checkpoints.is_empty() {
            return Err(SessionError::NoCheckpoints);
        }

        let origin = source.current_position()?;
        let positions = source.subscribe(tracking)?;

        let mut machine = StoryStateMachine::new();
        machine.begin_generation()?;

        tracing::info!(
            "Walk started at {} with {} checkpoint(s), {:.0} m",
            origin,
            plan.checkpoints.len(),
            route.distance()
        );

        Ok(Self {
            route,
            genre: plan.genre,
            speech: SpeechOptions::default().with_rate(plan.speech_rate),
            origin,
            monitor: ProximityMonitor::new(plan.checkpoints.clone()),
            machine,
            source,
            positions: Some(positions),
            narrator,
            started_at: Utc::now(),
            last_progress: None,
            summary: None,
        })
    }

    /// Override speech language and rate
    pub fn with_speech(mut self, speech: SpeechOptions) -> Self {
        self.speech = speech;
        self
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Position reported when the walk started
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn monitor(&self) -> &ProximityMonitor {
        &self.monitor
    }

    pub fn story_state(&self) -> StoryState {
        self.machine.state()
    }

    pub fn story(&self) -> Option<&Story> {
        self.machine.story()
    }

    pub fn last_progress(&self) -> Option<RouteProgress> {
        self.last_progress
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    /// Summary once the walk completed or was stopped
    pub fn summary(&self) -> Option<&WalkingSummary> {
        self.summary.as_ref()
    }

    /// Apply one event.
    ///
    /// Events after the walk ended are ignored, including a late story.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionUpdate>, SessionError> {
        if self.is_finished() {
            if matches!(event, SessionEvent::StoryReady(_)) {
                tracing::debug!("Discarding story that arrived after the walk ended");
            }
            return Ok(Vec::new());
        }

        let mut updates = Vec::new();
        match event {
            SessionEvent::Position(position) => {
                let progress = tracking::progress(&self.route, position);
                self.last_progress = Some(progress);
                updates.push(SessionUpdate::Progress(progress));

                for reached in self.monitor.update(position) {
                    let cues = self.machine.checkpoint_reached(reached.checkpoint_id);
                    updates.push(SessionUpdate::CheckpointReached(reached));
                    self.dispatch(cues, &mut updates);
                }
            }
            SessionEvent::StoryReady(story) => {
                let cues = self.machine.story_ready(story)?;
                self.dispatch(cues, &mut updates);
            }
            SessionEvent::ChoiceSelected(choice_id) => {
                let cues = self.machine.select_choice(&choice_id)?;
                self.dispatch(cues, &mut updates);
            }
            SessionEvent::NarrationDone => {
                let cues = self.machine.narration_finished();
                self.dispatch(cues, &mut updates);
            }
            SessionEvent::Stop => return Ok(self.stop()),
        }

        if self.machine.state() == StoryState::Completed {
            updates.push(SessionUpdate::Completed(self.finalize(true)));
        }
        Ok(updates)
    }

    /// End the walk early. Halts narration and location tracking.
    pub fn stop(&mut self) -> Vec<SessionUpdate> {
        if self.is_finished() {
            return Vec::new();
        }

        let mut updates = Vec::new();
        let cues = self.machine.stop();
        self.dispatch(cues, &mut updates);
        self.narrator.stop();
        updates.push(SessionUpdate::Completed(self.finalize(false)));
        updates
    }

    /// Drive the walk from a control channel and the position feed until it
    /// ends.
    ///
    /// Queued control events are applied before the next position. When the
    /// position feed closes the walk is stopped.
    pub fn run<F>(&mut self, control: Receiver<SessionEvent>, mut on_update: F) -> WalkingSummary
    where
        F: FnMut(&SessionUpdate),
    {
        let mut control_open = true;

        while !self.is_finished() {
            if control_open {
                match control.try_recv() {
                    Ok(event) => {
                        self.apply(event, &mut on_update);
                        continue;
                    }
                    Err(crossbeam::channel::TryRecvError::Disconnected) => control_open = false,
                    Err(crossbeam::channel::TryRecvError::Empty) => {}
                }
            }

            let Some(positions) = self.positions.clone() else {
                tracing::info!("Position feed closed, ending walk");
                break;
            };

            let next = if control_open {
                crossbeam::channel::select! {
                    recv(control) -> msg => msg.map_or(Next::ControlClosed, Next::Event),
                    recv(positions) -> msg => msg.map_or(Next::FeedClosed, |p| Next::Event(SessionEvent::Position(p))),
                }
            } else {
                positions
                    .recv()
                    .map_or(Next::FeedClosed, |p| Next::Event(SessionEvent::Position(p)))
            };

            match next {
                Next::Event(event) => self.apply(event, &mut on_update),
                Next::ControlClosed => control_open = false,
                Next::FeedClosed => self.positions = None,
            }
        }

        if !self.is_finished() {
            for update in self.stop() {
                on_update(&update);
            }
        }

        self.summary
            .clone()
            .unwrap_or_else(|| self.build_summary(false))
    }

    fn apply<F: FnMut(&SessionUpdate)>(&mut self, event: SessionEvent, on_update: &mut F) {
        match self.handle(event) {
            Ok(updates) => updates.iter().for_each(|u| on_update(u)),
            Err(e) => tracing::warn!("Ignoring event: {}", e),
        }
    }

    /// Forward cues to the narration sink and record them as updates.
    fn dispatch(&self, cues: Vec<NarrationCue>, updates: &mut Vec<SessionUpdate>) {
        for cue in cues {
            match &cue {
                NarrationCue::Speak { text, .. } => {
                    if let Err(e) = self.narrator.speak(text, &self.speech) {
                        tracing::warn!("Narration failed: {}", e);
                    }
                }
                NarrationCue::Stop => self.narrator.stop(),
                NarrationCue::PresentChoices { .. } | NarrationCue::Finished => {}
            }
            updates.push(SessionUpdate::Cue(cue));
        }
    }

    fn finalize(&mut self, completed: bool) -> WalkingSummary {
        self.source.unsubscribe();
        self.positions = None;

        let summary = self.build_summary(completed);
        tracing::info!(
            "Walk {} after {} s: {}/{} checkpoint(s), {} choice(s)",
            if completed { "completed" } else { "stopped" },
            summary.total_time_s,
            summary.checkpoints_completed,
            summary.checkpoints_total,
            summary.story_choices_made.len()
        );
        self.summary = Some(summary.clone());
        summary
    }

    fn build_summary(&self, completed: bool) -> WalkingSummary {
        WalkingSummary::build(
            self.started_at,
            Utc::now(),
            self.route.distance(),
            self.genre,
            completed,
        )
        .with_checkpoints(self.monitor.reached_count(), self.monitor.checkpoints().len())
        .with_choices(self.machine.choices_made().to_vec())
    }
}
