//! Turn-by-turn phrasing for locally generated routes.

use crate::geo::CompassDirection;
use serde::{Deserialize, Serialize};

/// Language of generated instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionLocale {
    #[default]
    #[serde(alias = "vi-VN")]
    Vi,
    #[serde(alias = "en-US")]
    En,
}

/// Builds "go"/"continue" instructions from a compass direction and distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionTemplates {
    locale: InstructionLocale,
}

impl InstructionTemplates {
    pub fn new(locale: InstructionLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> InstructionLocale {
        self.locale
    }

    /// Phrase for a heading, e.g. "về phía Đông Bắc" or "northeast".
    pub fn direction(&self, direction: CompassDirection) -> &'static str {
        use CompassDirection::*;

        match self.locale {
            InstructionLocale::Vi => match direction {
                North => "về phía Bắc",
                NorthEast => "về phía Đông Bắc",
                East => "về phía Đông",
                SouthEast => "về phía Đông Nam",
                South => "về phía Nam",
                SouthWest => "về phía Tây Nam",
                West => "về phía Tây",
                NorthWest => "về phía Tây Bắc",
            },
            InstructionLocale::En => match direction {
                North => "north",
                NorthEast => "northeast",
                East => "east",
                SouthEast => "southeast",
                South => "south",
                SouthWest => "southwest",
                West => "west",
                NorthWest => "northwest",
            },
        }
    }

    /// Instruction for the first step of a walk.
    pub fn go(&self, direction: CompassDirection, meters: f64) -> String {
        let m = meters.round() as u64;
        match self.locale {
            InstructionLocale::Vi => format!("Đi {} {}m", self.direction(direction), m),
            InstructionLocale::En => format!("Head {} for {} m", self.direction(direction), m),
        }
    }

    /// Instruction for every later step.
    pub fn continue_on(&self, direction: CompassDirection, meters: f64) -> String {
        let m = meters.round() as u64;
        match self.locale {
            InstructionLocale::Vi => format!("Tiếp tục {} {}m", self.direction(direction), m),
            InstructionLocale::En => {
                format!("Continue {} for {} m", self.direction(direction), m)
            }
        }
    }
}
