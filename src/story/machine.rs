//! Story progression state machine.
//!
//! ```text
//! Idle -> Generating -> Narrating(0) -> AwaitingChoice(0) -> Narrating(1) -> ... -> Completed
//!                                    \-> Stopped (from any live state)
//! ```
//!
//! Every transition returns the narration cues the caller should act on.

use super::{Story, StoryChoice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Story machine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryMachineError {
    #[error("Cannot {action} while {state:?}")]
    InvalidTransition {
        state: StoryState,
        action: &'static str,
    },

    #[error("Not waiting for a choice")]
    NotAwaitingChoice,

    #[error("Choice '{0}' does not belong to the current segment")]
    UnknownChoice(String),
}

/// Progression state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryState {
    Idle,
    Generating,
    Narrating(usize),
    AwaitingChoice(usize),
    Completed,
    Stopped,
}

impl StoryState {
    /// Completed or stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, StoryState::Completed | StoryState::Stopped)
    }
}

/// Instructions for the narration collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationCue {
    /// Start narrating a segment
    Speak { segment_index: usize, text: String },
    /// Interrupt current narration
    Stop,
    /// Offer the segment's choices to the walker
    PresentChoices {
        segment_index: usize,
        choices: Vec<StoryChoice>,
    },
    /// The story is over
    Finished,
}

/// A choice the walker made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub segment_index: usize,
    pub choice_id: String,
    pub text: String,
    pub chosen_at: DateTime<Utc>,
}

/// Drives a story through its segments.
#[derive(Debug, Clone)]
pub struct StoryStateMachine {
    state: StoryState,
    story: Option<Story>,
    /// Every checkpoint reported reached so far
    reached: HashSet<Uuid>,
    choices: Vec<ChoiceRecord>,
}

impl Default for StoryStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryStateMachine {
    pub fn new() -> Self {
        Self {
            state: StoryState::Idle,
            story: None,
            reached: HashSet::new(),
            choices: Vec::new(),
        }
    }

    pub fn state(&self) -> StoryState {
        self.state
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Choices made so far, in order
    pub fn choices_made(&self) -> &[ChoiceRecord] {
        &self.choices
    }

    /// Index of the segment being narrated or awaiting a choice
    pub fn current_segment(&self) -> Option<usize> {
        match self.state {
            StoryState::Narrating(i) | StoryState::AwaitingChoice(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Idle -> Generating
    pub fn begin_generation(&mut self) -> Result<(), StoryMachineError> {
        match self.state {
            StoryState::Idle => {
                self.state = StoryState::Generating;
                tracing::debug!("Story generation started");
                Ok(())
            }
            state => Err(StoryMachineError::InvalidTransition {
                state,
                action: "begin generation",
            }),
        }
    }

    /// Install the story and start narrating segment 0.
    ///
    /// Accepted from `Idle` as well as `Generating`. An empty story completes
    /// immediately.
    pub fn story_ready(&mut self, story: Story) -> Result<Vec<NarrationCue>, StoryMachineError> {
        if !matches!(self.state, StoryState::Idle | StoryState::Generating) {
            return Err(StoryMachineError::InvalidTransition {
                state: self.state,
                action: "accept a story",
            });
        }

        tracing::info!(
            "Story '{}' ready with {} segment(s)",
            story.title,
            story.len()
        );
        let empty = story.is_empty();
        self.story = Some(story);

        if empty {
            self.state = StoryState::Completed;
            return Ok(vec![NarrationCue::Finished]);
        }

        Ok(vec![self.enter_segment(0)])
    }

    /// React to a reached checkpoint.
    ///
    /// Interrupts narration when the current segment is bound to it. Reached
    /// events for checkpoints bound to later segments are remembered and
    /// honored once narration of that segment finishes.
    pub fn checkpoint_reached(&mut self, checkpoint_id: Uuid) -> Vec<NarrationCue> {
        self.reached.insert(checkpoint_id);

        let StoryState::Narrating(i) = self.state else {
            return Vec::new();
        };

        if self.bound_checkpoint(i) != Some(checkpoint_id) {
            return Vec::new();
        }

        let mut cues = vec![NarrationCue::Stop];
        cues.extend(self.arrive(i));
        cues
    }

    /// Narration of the current segment ended.
    ///
    /// Advances when the segment has no bound checkpoint or its checkpoint was
    /// already reached; otherwise the walker still has to get there.
    pub fn narration_finished(&mut self) -> Vec<NarrationCue> {
        let StoryState::Narrating(i) = self.state else {
            return Vec::new();
        };

        match self.bound_checkpoint(i) {
            Some(id) if !self.reached.contains(&id) => Vec::new(),
            _ => self.arrive(i),
        }
    }

    /// Record the walker's choice for the current segment and advance.
    pub fn select_choice(&mut self, choice_id: &str) -> Result<Vec<NarrationCue>, StoryMachineError> {
        let StoryState::AwaitingChoice(i) = self.state else {
            return Err(StoryMachineError::NotAwaitingChoice);
        };

        let choice = self
            .story
            .as_ref()
            .and_then(|s| s.segment(i))
            .and_then(|seg| seg.choice(choice_id))
            .ok_or_else(|| StoryMachineError::UnknownChoice(choice_id.to_string()))?;

        tracing::info!("Choice '{}' made at segment {}", choice.text, i + 1);
        self.choices.push(ChoiceRecord {
            segment_index: i,
            choice_id: choice.id.clone(),
            text: choice.text.clone(),
            chosen_at: Utc::now(),
        });

        Ok(self.advance(i))
    }

    /// Halt the story. No effect once finished.
    pub fn stop(&mut self) -> Vec<NarrationCue> {
        if self.state.is_terminal() {
            return Vec::new();
        }
        tracing::info!("Story stopped in state {:?}", self.state);
        self.state = StoryState::Stopped;
        vec![NarrationCue::Stop]
    }

    fn bound_checkpoint(&self, index: usize) -> Option<Uuid> {
        self.story
            .as_ref()
            .and_then(|s| s.segment(index))
            .and_then(|seg| seg.checkpoint_id)
    }

    /// Segment `i` is done: wait for a choice or move on.
    fn arrive(&mut self, i: usize) -> Vec<NarrationCue> {
        self.state = StoryState::AwaitingChoice(i);

        let choices = self
            .story
            .as_ref()
            .and_then(|s| s.segment(i))
            .map(|seg| seg.choices.clone())
            .unwrap_or_default();

        if choices.is_empty() {
            self.advance(i)
        } else {
            vec![NarrationCue::PresentChoices {
                segment_index: i,
                choices,
            }]
        }
    }

    fn advance(&mut self, i: usize) -> Vec<NarrationCue> {
        let len = self.story.as_ref().map_or(0, Story::len);

        if i + 1 < len {
            vec![self.enter_segment(i + 1)]
        } else {
            tracing::info!("Story completed after {} segment(s)", len);
            self.state = StoryState::Completed;
            vec![NarrationCue::Finished]
        }
    }

    fn enter_segment(&mut self, i: usize) -> NarrationCue {
        self.state = StoryState::Narrating(i);
        let text = self
            .story
            .as_ref()
            .and_then(|s| s.segment(i))
            .map(|seg| seg.content.clone())
            .unwrap_or_default();
        tracing::debug!("Narrating segment {}", i + 1);

        NarrationCue::Speak {
            segment_index: i,
            text,
        }
    }
}
