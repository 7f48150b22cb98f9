use thiserror::Error;

/// Failures outside the timer core: loading workouts, config, and preferences.
/// The state machine itself never produces one of these.
#[derive(Error, Debug)]
pub enum SetpaceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Workout '{id}' not found")]
    UnknownWorkout { id: String },

    #[error("Workout '{id}' has no sets")]
    EmptyWorkout { id: String },
}

pub type Result<T> = std::result::Result<T, SetpaceError>;
