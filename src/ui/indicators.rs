use setpace::volume::{effective_duration_ms, effective_reps_for};
use setpace::{CommitmentLevel, Set};

/// `M:SS`, rounding partial seconds up so a running clock never shows 0:00 early
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms.div_ceil(1000);
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Whole seconds shown in "Get Ready N"
pub fn countdown_seconds(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

pub fn step_indicator(current_index: usize, total: usize) -> String {
    if total == 0 {
        return String::new();
    }
    format!("{} of {}", current_index + 1, total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Completed,
    Current,
    Upcoming,
    CompletedAll,
}

/// One segment per set in the workout-wide progress strip
pub fn set_progress_lines(total: usize, current_index: usize, workout_completed: bool) -> Vec<LineState> {
    (0..total)
        .map(|i| {
            if workout_completed {
                LineState::CompletedAll
            } else if i < current_index {
                LineState::Completed
            } else if i == current_index {
                LineState::Current
            } else {
                LineState::Upcoming
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Active,
    Completed,
    Upcoming,
}

/// One dot per member of the current superset
pub fn sequence_dots(indices: &[usize], current_index: usize) -> Vec<DotState> {
    indices
        .iter()
        .map(|&i| match i.cmp(&current_index) {
            std::cmp::Ordering::Equal => DotState::Active,
            std::cmp::Ordering::Less => DotState::Completed,
            std::cmp::Ordering::Greater => DotState::Upcoming,
        })
        .collect()
}

/// Title for a set in lists and headlines
pub fn set_title(set: &Set) -> &str {
    set.name().unwrap_or("Rest")
}

/// Effective volume of a set at `level`, e.g. `8 reps` or `0:45`
pub fn set_volume(set: &Set, level: CommitmentLevel) -> String {
    match effective_reps_for(set, level) {
        Some(reps) if reps == 1 => "1 rep".to_string(),
        Some(reps) => format!("{reps} reps"),
        None => format_time(effective_duration_ms(set, level)),
    }
}
