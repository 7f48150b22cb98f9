use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, SetpaceError};
use crate::workout::{RepSet, Rest, Set, TimedSet, Workout};

static WORKOUT_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/workouts");

/// Rep count used when a legacy rep set does not state one
const DEFAULT_LEGACY_REPS: u32 = 10;

/// Flat set shape from before sets were a tagged union
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct LegacySet {
    id: String,
    name: String,
    duration_seconds: u32,
    #[serde(default)]
    description: String,
    is_rest: bool,
    is_timed: bool,
}

impl From<LegacySet> for Set {
    fn from(old: LegacySet) -> Self {
        if old.is_rest {
            return Set::Rest(Rest {
                id: old.id,
                base_duration_seconds: old.duration_seconds,
            });
        }
        if old.is_timed {
            return Set::Timed(TimedSet {
                id: old.id,
                name: old.name,
                base_duration_seconds: old.duration_seconds,
                description: old.description,
            });
        }
        let base_reps = extract_reps(&old.description).unwrap_or(DEFAULT_LEGACY_REPS);
        Set::Reps(RepSet {
            id: old.id,
            name: old.name,
            base_reps,
            description: old.description,
        })
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum AnySet {
    Current(Set),
    Legacy(LegacySet),
}

#[derive(Deserialize, Debug)]
struct RawWorkout {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    sets: Vec<AnySet>,
}

/// First `<n> rep` / `<n> reps` in a description, case insensitive
pub fn extract_reps(description: &str) -> Option<u32> {
    let lower = description.to_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if lower[i..].trim_start().starts_with("rep") {
            if let Ok(n) = lower[start..i].parse() {
                return Some(n);
            }
        }
    }
    None
}

/// Parse a workout in either the tagged or the legacy set format
pub fn parse_workout(json: &str) -> Result<Workout> {
    let raw: RawWorkout = serde_json::from_str(json)?;
    let workout = Workout {
        id: raw.id,
        name: raw.name,
        description: raw.description,
        sets: raw
            .sets
            .into_iter()
            .map(|s| match s {
                AnySet::Current(set) => set,
                AnySet::Legacy(old) => old.into(),
            })
            .collect(),
    };
    validate(&workout)?;
    Ok(workout)
}

pub fn load_workout_file<P: AsRef<Path>>(path: P) -> Result<Workout> {
    let json = fs::read_to_string(path.as_ref())?;
    let workout = parse_workout(&json)?;
    tracing::info!(path = %path.as_ref().display(), workout = %workout.id, "loaded workout file");
    Ok(workout)
}

fn validate(workout: &Workout) -> Result<()> {
    if workout.sets.is_empty() {
        return Err(SetpaceError::EmptyWorkout {
            id: workout.id.clone(),
        });
    }
    for set in &workout.sets {
        let magnitude = match set {
            Set::Timed(t) => t.base_duration_seconds,
            Set::Reps(r) => r.base_reps,
            Set::Rest(r) => r.base_duration_seconds,
        };
        if magnitude == 0 {
            return Err(SetpaceError::Parse(format!(
                "set '{}' in workout '{}' must have a positive duration or rep count",
                set.id(),
                workout.id
            )));
        }
    }
    let duplicates: Vec<&str> = workout.sets.iter().map(Set::id).duplicates().collect();
    if !duplicates.is_empty() {
        tracing::warn!(workout = %workout.id, ids = ?duplicates, "duplicate set ids");
    }
    Ok(())
}

/// The workouts the user can pick from
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    workouts: Vec<Workout>,
}

impl Catalog {
    /// Workouts bundled into the binary, in file name order
    pub fn builtin() -> Result<Self> {
        let workouts = WORKOUT_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
            .sorted_by(|a, b| a.path().cmp(b.path()))
            .map(|f| {
                let json = f.contents_utf8().ok_or_else(|| {
                    SetpaceError::Parse(format!("{} is not UTF-8", f.path().display()))
                })?;
                parse_workout(json)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { workouts })
    }

    pub fn new(workouts: Vec<Workout>) -> Self {
        Self { workouts }
    }

    /// Add a workout, replacing any with the same id
    pub fn insert(&mut self, workout: Workout) {
        match self.workouts.iter_mut().find(|w| w.id == workout.id) {
            Some(existing) => *existing = workout,
            None => self.workouts.push(workout),
        }
    }

    pub fn get(&self, id: &str) -> Result<&Workout> {
        self.workouts
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| SetpaceError::UnknownWorkout { id: id.to_string() })
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}
