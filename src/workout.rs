use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SetpaceError;

/// A hold or exercise performed for a fixed amount of time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedSet {
    pub id: String,
    pub name: String,
    /// Duration before the commitment multiplier is applied
    #[serde(rename = "duration_seconds")]
    pub base_duration_seconds: u32,
    #[serde(default)]
    pub description: String,
}

/// An exercise performed for a number of repetitions, with no clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepSet {
    pub id: String,
    pub name: String,
    #[serde(rename = "reps")]
    pub base_reps: u32,
    #[serde(default)]
    pub description: String,
}

/// A break between working sets. Never volume adjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rest {
    pub id: String,
    #[serde(rename = "duration_seconds")]
    pub base_duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Set {
    Timed(TimedSet),
    Reps(RepSet),
    Rest(Rest),
}

impl Set {
    pub fn id(&self) -> &str {
        match self {
            Set::Timed(s) => &s.id,
            Set::Reps(s) => &s.id,
            Set::Rest(s) => &s.id,
        }
    }

    /// Rests have no name
    pub fn name(&self) -> Option<&str> {
        match self {
            Set::Timed(s) => Some(&s.name),
            Set::Reps(s) => Some(&s.name),
            Set::Rest(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Set::Timed(s) => Some(&s.description),
            Set::Reps(s) => Some(&s.description),
            Set::Rest(_) => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Set::Rest(_))
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, Set::Timed(_))
    }

    pub fn is_reps(&self) -> bool {
        matches!(self, Set::Reps(_))
    }

    /// Timed sets and rests run a clock; rep sets do not
    pub fn is_time_bound(&self) -> bool {
        !self.is_reps()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sets: Vec<Set>,
}

impl Workout {
    pub fn working_set_count(&self) -> usize {
        self.sets.iter().filter(|s| !s.is_rest()).count()
    }
}

/// How much of a workout's base volume the user commits to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommitmentLevel {
    TryIt,
    EasyWin,
    Comfortable,
    #[default]
    Standard,
    PushIt,
}

impl CommitmentLevel {
    /// Ladder order, lowest commitment first
    pub const ALL: [CommitmentLevel; 5] = [
        CommitmentLevel::TryIt,
        CommitmentLevel::EasyWin,
        CommitmentLevel::Comfortable,
        CommitmentLevel::Standard,
        CommitmentLevel::PushIt,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            CommitmentLevel::TryIt => 0.25,
            CommitmentLevel::EasyWin => 0.5,
            CommitmentLevel::Comfortable => 0.75,
            CommitmentLevel::Standard => 1.0,
            CommitmentLevel::PushIt => 1.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommitmentLevel::TryIt => "Try it",
            CommitmentLevel::EasyWin => "Easy win",
            CommitmentLevel::Comfortable => "Comfortable",
            CommitmentLevel::Standard => "Standard",
            CommitmentLevel::PushIt => "Push it",
        }
    }

    /// The persisted tag, e.g. `"easy-win"`
    pub fn tag(self) -> String {
        self.to_string()
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.tag() == tag)
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(3)
    }

    /// One rung up the ladder, saturating at the top
    pub fn step_up(self) -> Self {
        Self::ALL[(self.position() + 1).min(Self::ALL.len() - 1)]
    }

    /// One rung down the ladder, saturating at the bottom
    pub fn step_down(self) -> Self {
        Self::ALL[self.position().saturating_sub(1)]
    }
}

impl FromStr for CommitmentLevel {
    type Err = SetpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| SetpaceError::Parse(format!("unknown commitment level '{s}'")))
    }
}
