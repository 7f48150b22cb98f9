use crate::workout::{CommitmentLevel, Rest, Set};

pub const MINIMUM_REPS: u32 = 1;
pub const MINIMUM_DURATION_SECONDS: u32 = 3;

pub fn effective_reps(base_reps: u32, multiplier: f64) -> u32 {
    let scaled = (base_reps as f64 * multiplier).round().max(0.0) as u32;
    scaled.max(MINIMUM_REPS)
}

pub fn effective_duration_seconds(base_duration_seconds: u32, multiplier: f64) -> u32 {
    let scaled = (base_duration_seconds as f64 * multiplier).round().max(0.0) as u32;
    scaled.max(MINIMUM_DURATION_SECONDS)
}

/// Rests keep their base duration at every commitment level
pub fn rest_duration_seconds(rest: &Rest) -> u32 {
    rest.base_duration_seconds
}

/// Clock length of a set at the given level. Rep sets are not time bound and yield 0.
pub fn effective_duration_ms(set: &Set, level: CommitmentLevel) -> u64 {
    match set {
        Set::Timed(t) => {
            effective_duration_seconds(t.base_duration_seconds, level.multiplier()) as u64 * 1000
        }
        Set::Rest(r) => rest_duration_seconds(r) as u64 * 1000,
        Set::Reps(_) => 0,
    }
}

/// Reps to perform for a rep set at the given level, None for anything else
pub fn effective_reps_for(set: &Set, level: CommitmentLevel) -> Option<u32> {
    match set {
        Set::Reps(r) => Some(effective_reps(r.base_reps, level.multiplier())),
        _ => None,
    }
}
