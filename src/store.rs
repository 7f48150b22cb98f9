use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app_dirs::AppDirs;
use crate::workout::CommitmentLevel;

/// Last-used commitment level per workout id, stored as the level's tag
pub trait CommitmentStore {
    fn load(&self, workout_id: &str) -> Option<String>;
    fn save(&self, workout_id: &str, tag: &str) -> std::io::Result<()>;
}

/// Read the persisted level for a workout.
///
/// Missing entries yield `standard`. Entries that do not parse are replaced
/// with `standard` on disk as well.
pub fn load_commitment_level(store: &dyn CommitmentStore, workout_id: &str) -> CommitmentLevel {
    match store.load(workout_id) {
        Some(tag) => match CommitmentLevel::from_tag(&tag) {
            Some(level) => level,
            None => {
                let fallback = CommitmentLevel::default();
                tracing::warn!(workout_id, tag = %tag, "invalid commitment level persisted, resetting");
                if let Err(e) = store.save(workout_id, &fallback.tag()) {
                    tracing::warn!(workout_id, error = %e, "failed to rewrite commitment level");
                }
                fallback
            }
        },
        None => CommitmentLevel::default(),
    }
}

/// JSON object of `{ "<workout id>": "<level tag>" }`
#[derive(Debug, Clone)]
pub struct FileCommitmentStore {
    path: PathBuf,
}

impl FileCommitmentStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_file("commitment.json")
            .unwrap_or_else(|| PathBuf::from("setpace_commitment.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

impl Default for FileCommitmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitmentStore for FileCommitmentStore {
    fn load(&self, workout_id: &str) -> Option<String> {
        self.read_all().remove(workout_id)
    }

    fn save(&self, workout_id: &str, tag: &str) -> std::io::Result<()> {
        let mut all = self.read_all();
        all.insert(workout_id.to_string(), tag.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&all).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// In-process store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryCommitmentStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryCommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, workout_id: &str, tag: &str) {
        self.entries
            .borrow_mut()
            .insert(workout_id.to_string(), tag.to_string());
    }
}

impl CommitmentStore for MemoryCommitmentStore {
    fn load(&self, workout_id: &str) -> Option<String> {
        self.entries.borrow().get(workout_id).cloned()
    }

    fn save(&self, workout_id: &str, tag: &str) -> std::io::Result<()> {
        self.insert(workout_id, tag);
        Ok(())
    }
}
