//! Checkpoint-bound narrative stories.
//!
//! A [`Story`] is generated once per walk, by the LLM through
//! [`StoryGenerator`] or deterministically by the [`fallback`] generators,
//! and then driven segment by segment by the [`StoryStateMachine`].

pub mod client;
pub mod fallback;
pub mod generator;
pub mod machine;
pub mod parser;

use crate::http::ProviderError;
use crate::tracking::Checkpoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use client::{CompletionProvider, GroqClient};
pub use fallback::FallbackStyle;
pub use generator::{StoryGenerator, StorySettings};
pub use machine::{ChoiceRecord, NarrationCue, StoryMachineError, StoryState, StoryStateMachine};

/// Story errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    #[error("Could not parse story response: {0}")]
    ParseFailure(String),

    #[error("Story provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Story genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Genre {
    #[default]
    Adventure,
    Mystery,
    Fantasy,
    Historical,
    Comedy,
    Romance,
    SciFi,
    Horror,
}

impl Genre {
    pub const ALL: [Genre; 8] = [
        Genre::Adventure,
        Genre::Mystery,
        Genre::Fantasy,
        Genre::Historical,
        Genre::Comedy,
        Genre::Romance,
        Genre::SciFi,
        Genre::Horror,
    ];

    /// Wire name ("sci-fi" etc.)
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Adventure => "adventure",
            Genre::Mystery => "mystery",
            Genre::Fantasy => "fantasy",
            Genre::Historical => "historical",
            Genre::Comedy => "comedy",
            Genre::Romance => "romance",
            Genre::SciFi => "sci-fi",
            Genre::Horror => "horror",
        }
    }

    /// Parse a genre name. Unknown names fall back to adventure.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == name || (name == "scifi" && *g == Genre::SciFi))
            .unwrap_or_default()
    }

    /// Prompt phrase describing the genre
    pub fn prompt_description(&self) -> &'static str {
        match self {
            Genre::Adventure => "một cuộc phiêu lưu đầy thử thách và khám phá",
            Genre::Mystery => "một câu chuyện bí ẩn, ly kỳ với những manh mối",
            Genre::Fantasy => "một câu chuyện thần thoại với phép thuật và sinh vật kỳ bí",
            Genre::Historical => "một hành trình lịch sử xuyên thời gian",
            Genre::Comedy => "một câu chuyện hài hước, vui nhộn",
            Genre::Romance => "một câu chuyện tình yêu lãng mạn, ngọt ngào",
            Genre::SciFi => "một câu chuyện khoa học viễn tưởng với công nghệ tương lai",
            Genre::Horror => "một câu chuyện kinh dị, bí ẩn và đáng sợ",
        }
    }
}

impl From<String> for Genre {
    fn from(name: String) -> Self {
        Genre::from_name(&name)
    }
}

impl From<Genre> for &'static str {
    fn from(genre: Genre) -> Self {
        genre.as_str()
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A branch offered at the end of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryChoice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub consequence: String,
}

/// One chapter of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySegment {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Narration text
    pub content: String,
    /// Seconds
    pub duration_s: u32,
    /// Checkpoint that ends this segment, if any
    #[serde(default)]
    pub checkpoint_id: Option<Uuid>,
    #[serde(default)]
    pub choices: Vec<StoryChoice>,
}

impl StorySegment {
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn choice(&self, choice_id: &str) -> Option<&StoryChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// A complete story for one walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub genre: Genre,
    pub segments: Vec<StorySegment>,
    /// Seconds
    pub total_duration_s: u32,
}

impl Story {
    /// Assemble a story. The terminal segment never carries choices.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        genre: Genre,
        mut segments: Vec<StorySegment>,
    ) -> Self {
        if let Some(last) = segments.last_mut() {
            last.choices.clear();
        }
        let total_duration_s = segments
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.duration_s));

        Self {
            id: format!("story_{}", Uuid::new_v4().simple()),
            title: title.into(),
            description: description.into(),
            genre,
            segments,
            total_duration_s,
        }
    }

    /// Bind segment i to checkpoint i. Surplus segments stay unbound.
    pub fn bind_checkpoints(mut self, checkpoint_ids: &[Uuid]) -> Self {
        for (i, segment) in self.segments.iter_mut().enumerate() {
            segment.checkpoint_id = checkpoint_ids.get(i).copied();
        }
        self
    }

    pub fn segment(&self, index: usize) -> Option<&StorySegment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment bound to a checkpoint
    pub fn segment_for_checkpoint(&self, checkpoint_id: Uuid) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| s.checkpoint_id == Some(checkpoint_id))
    }
}

/// What the generator needs to know about the walk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRequest {
    pub genre: Genre,
    pub checkpoints: Vec<Checkpoint>,
    pub estimated_minutes: u32,
    /// Meters
    pub distance_m: f64,
}

impl StoryRequest {
    pub fn new(genre: Genre, checkpoints: Vec<Checkpoint>, estimated_minutes: u32) -> Self {
        Self {
            genre,
            checkpoints,
            estimated_minutes,
            distance_m: 0.0,
        }
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance_m = meters;
        self
    }

    pub fn checkpoint_ids(&self) -> Vec<Uuid> {
        self.checkpoints.iter().map(|c| c.id).collect()
    }
}
