// Timer core and its collaborators. The TUI binary and the headless
// integration tests both build on this; nothing here touches the terminal
// except the bell cue and the crossterm event source.
pub mod app_dirs;
pub mod catalog;
pub mod celebration;
pub mod config;
pub mod cues;
pub mod error;
pub mod logging;
pub mod momentary;
pub mod runtime;
pub mod sequence;
pub mod store;
pub mod timer;
pub mod volume;
pub mod workout;

pub use error::{Result, SetpaceError};
pub use timer::{Advance, Phase, TimerMachine, TimerSnapshot};
pub use workout::{CommitmentLevel, Set, Workout};
