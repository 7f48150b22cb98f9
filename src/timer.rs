use std::fmt;

use tracing::{debug, info, trace, warn};

use crate::cues::{CuePlayer, SilentCues};
use crate::sequence::{find_sequence, SetSequence};
use crate::store::{load_commitment_level, CommitmentStore};
use crate::volume::{effective_duration_ms, effective_reps_for};
use crate::workout::{CommitmentLevel, Set, Workout};

/// "Get ready" period before a timed set starts
pub const COUNTDOWN_DURATION_MS: u64 = 3000;

/// Cadence the driver is expected to tick at
pub const TICK_RATE_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Countdown,
    Running,
    Paused,
    Completed,
}

/// Everything a renderer needs to draw the current workout position
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub sets: Vec<Set>,
    /// Always 0 while `sets` is empty
    pub current_set_index: usize,
    pub countdown_remaining_ms: u64,
    pub timer_remaining_ms: u64,
    pub commitment_level: CommitmentLevel,
    /// Key for commitment persistence, None for ad-hoc set lists
    pub workout_id: Option<String>,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            sets: Vec::new(),
            current_set_index: 0,
            countdown_remaining_ms: COUNTDOWN_DURATION_MS,
            timer_remaining_ms: 0,
            commitment_level: CommitmentLevel::default(),
            workout_id: None,
        }
    }
}

impl TimerSnapshot {
    pub fn current_set(&self) -> Option<&Set> {
        self.sets.get(self.current_set_index)
    }

    pub fn next_set(&self) -> Option<&Set> {
        self.sets.get(self.current_set_index + 1)
    }

    pub fn is_last_set(&self) -> bool {
        !self.sets.is_empty() && self.current_set_index == self.sets.len() - 1
    }

    /// 0 for rep sets and when there is no current set
    pub fn current_effective_duration_ms(&self) -> u64 {
        self.current_set()
            .map(|set| effective_duration_ms(set, self.commitment_level))
            .unwrap_or(0)
    }

    pub fn current_effective_reps(&self) -> Option<u32> {
        self.current_set()
            .and_then(|set| effective_reps_for(set, self.commitment_level))
    }

    pub fn current_sequence(&self) -> Option<SetSequence> {
        find_sequence(&self.sets, self.current_set_index)
    }

    pub fn is_workout_complete(&self) -> bool {
        self.phase == Phase::Completed && self.is_last_set()
    }

    /// Share of the active clock already elapsed, 0.0..=100.0
    pub fn progress_percent(&self) -> f64 {
        match self.phase {
            Phase::Countdown => {
                let elapsed = COUNTDOWN_DURATION_MS.saturating_sub(self.countdown_remaining_ms);
                elapsed as f64 / COUNTDOWN_DURATION_MS as f64 * 100.0
            }
            Phase::Running | Phase::Paused => {
                let total = self.current_effective_duration_ms();
                if total == 0 {
                    return 0.0;
                }
                let elapsed = total.saturating_sub(self.timer_remaining_ms);
                elapsed as f64 / total as f64 * 100.0
            }
            Phase::Idle | Phase::Completed => 0.0,
        }
    }

    fn current_is_time_bound(&self) -> bool {
        self.current_set().is_some_and(Set::is_time_bound)
    }
}

/// Result of a user-driven `next`/`done`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the following set
    Advanced,
    /// The last set is done; the driver ends the session
    Finished,
    /// Not applicable in the current phase, nothing changed
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&TimerSnapshot)>;

/// Owns the workout progression and applies every transition to it.
///
/// The machine never reads a clock. A driver calls [`TimerMachine::tick`]
/// at a fixed cadence and forwards user actions; every operation that
/// changes the snapshot notifies subscribers once, after the change is
/// complete. Operations whose preconditions do not hold are silent no-ops.
pub struct TimerMachine {
    snapshot: TimerSnapshot,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    cues: Box<dyn CuePlayer>,
    store: Option<Box<dyn CommitmentStore>>,
}

impl fmt::Debug for TimerMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerMachine")
            .field("snapshot", &self.snapshot)
            .field("subscribers", &self.subscribers.len())
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

impl Default for TimerMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerMachine {
    pub fn new() -> Self {
        Self {
            snapshot: TimerSnapshot::default(),
            subscribers: Vec::new(),
            next_subscription: 0,
            cues: Box::new(SilentCues),
            store: None,
        }
    }

    pub fn with_cues(mut self, cues: Box<dyn CuePlayer>) -> Self {
        self.cues = cues;
        self
    }

    pub fn with_store(mut self, store: Box<dyn CommitmentStore>) -> Self {
        self.store = Some(store);
        self
    }

    // --- subscriptions ---

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TimerSnapshot) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // --- queries ---

    pub fn snapshot(&self) -> &TimerSnapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> Phase {
        self.snapshot.phase
    }

    pub fn current_set(&self) -> Option<&Set> {
        self.snapshot.current_set()
    }

    pub fn next_set(&self) -> Option<&Set> {
        self.snapshot.next_set()
    }

    pub fn is_last_set(&self) -> bool {
        self.snapshot.is_last_set()
    }

    pub fn current_effective_duration_ms(&self) -> u64 {
        self.snapshot.current_effective_duration_ms()
    }

    pub fn current_effective_reps(&self) -> Option<u32> {
        self.snapshot.current_effective_reps()
    }

    pub fn current_sequence(&self) -> Option<SetSequence> {
        self.snapshot.current_sequence()
    }

    pub fn is_workout_complete(&self) -> bool {
        self.snapshot.is_workout_complete()
    }

    pub fn progress_percent(&self) -> f64 {
        self.snapshot.progress_percent()
    }

    // --- initialization ---

    /// Replace the set list and level, back to idle on the first set
    pub fn select_sets(&mut self, sets: Vec<Set>, commitment_level: CommitmentLevel) {
        self.mutate("select_sets", |m| {
            m.reinitialize(sets, commitment_level, None)
        });
    }

    /// Select a workout, restoring its last-used commitment level from the store
    pub fn select_workout(&mut self, workout: &Workout) {
        let level = self
            .store
            .as_deref()
            .map(|store| load_commitment_level(store, &workout.id))
            .unwrap_or_default();
        info!(workout = %workout.id, sets = workout.sets.len(), level = %level, "workout selected");
        let sets = workout.sets.clone();
        let id = workout.id.clone();
        self.mutate("select_workout", |m| m.reinitialize(sets, level, Some(id)));
    }

    pub fn reset(&mut self) {
        self.mutate("reset", |m| m.load_position(0, Phase::Idle));
    }

    /// Store and persist the level; an idle timer picks up the new duration
    pub fn set_commitment_level(&mut self, level: CommitmentLevel) {
        if let (Some(store), Some(id)) = (self.store.as_deref(), self.snapshot.workout_id.as_deref()) {
            if let Err(e) = store.save(id, &level.tag()) {
                warn!(workout = id, error = %e, "failed to persist commitment level");
            }
        }
        self.mutate("set_commitment_level", |m| {
            m.snapshot.commitment_level = level;
            if m.snapshot.phase == Phase::Idle {
                m.snapshot.timer_remaining_ms = m.snapshot.current_effective_duration_ms();
            }
        });
    }

    // --- user transitions ---

    pub fn start_countdown(&mut self) {
        self.mutate("start_countdown", |m| {
            if m.snapshot.phase != Phase::Idle || !m.snapshot.current_is_time_bound() {
                return;
            }
            m.snapshot.phase = Phase::Countdown;
            m.snapshot.countdown_remaining_ms = COUNTDOWN_DURATION_MS;
            m.snapshot.timer_remaining_ms = m.snapshot.current_effective_duration_ms();
        });
    }

    /// Start the current set's clock, skipping any remaining countdown
    pub fn start_timer(&mut self) {
        self.mutate("start_timer", |m| {
            if matches!(m.snapshot.phase, Phase::Idle | Phase::Countdown) {
                m.begin_running();
            }
        });
    }

    pub fn pause(&mut self) {
        self.mutate("pause", |m| {
            if m.snapshot.phase == Phase::Running {
                m.snapshot.phase = Phase::Paused;
            }
        });
    }

    pub fn resume(&mut self) {
        self.mutate("resume", |m| {
            if m.snapshot.phase == Phase::Paused {
                m.snapshot.phase = Phase::Running;
            }
        });
    }

    /// Move past a finished (or not time-bound) set.
    ///
    /// A following rest starts immediately; a following working set waits at
    /// idle. On the last set nothing changes and `Finished` is returned.
    pub fn next(&mut self) -> Advance {
        self.mutate("next", |m| {
            if !matches!(m.snapshot.phase, Phase::Idle | Phase::Completed)
                || m.snapshot.current_set().is_none()
            {
                return Advance::Ignored;
            }
            if m.snapshot.is_last_set() {
                info!(workout = ?m.snapshot.workout_id, "workout finished");
                return Advance::Finished;
            }
            let next_index = m.snapshot.current_set_index + 1;
            if m.snapshot.next_set().is_some_and(Set::is_rest) {
                m.load_position(next_index, Phase::Running);
                m.cues.play_start_cue();
            } else {
                m.load_position(next_index, Phase::Idle);
            }
            Advance::Advanced
        })
    }

    pub fn done(&mut self) -> Advance {
        self.next()
    }

    /// Advance into the following set and run it, if it is a rest
    pub fn start_rest_automatically(&mut self) {
        self.mutate("start_rest_automatically", |m| {
            if m.snapshot.next_set().is_some_and(Set::is_rest) {
                let next_index = m.snapshot.current_set_index + 1;
                m.load_position(next_index, Phase::Running);
                m.cues.play_start_cue();
            }
        });
    }

    // --- clock ---

    /// Advance whichever clock the current phase owns by `step_ms`
    pub fn tick(&mut self, step_ms: u64) {
        match self.snapshot.phase {
            Phase::Countdown => self.tick_countdown(step_ms),
            Phase::Running => self.tick_timer(step_ms),
            Phase::Idle | Phase::Paused | Phase::Completed => {}
        }
    }

    pub fn tick_countdown(&mut self, step_ms: u64) {
        self.mutate("tick_countdown", |m| {
            if m.snapshot.phase != Phase::Countdown || !m.snapshot.current_is_time_bound() {
                return;
            }
            m.snapshot.countdown_remaining_ms =
                m.snapshot.countdown_remaining_ms.saturating_sub(step_ms);
            if m.snapshot.countdown_remaining_ms == 0 {
                m.begin_running();
            }
        });
    }

    pub fn tick_timer(&mut self, step_ms: u64) {
        self.mutate("tick_timer", |m| {
            if m.snapshot.phase != Phase::Running || !m.snapshot.current_is_time_bound() {
                return;
            }
            if m.snapshot.timer_remaining_ms > step_ms {
                m.snapshot.timer_remaining_ms -= step_ms;
                return;
            }
            m.snapshot.timer_remaining_ms = 0;
            m.cues.play_end_cue();
            m.advance_after_expiry();
        });
    }

    // --- internals ---

    fn reinitialize(&mut self, sets: Vec<Set>, level: CommitmentLevel, workout_id: Option<String>) {
        self.snapshot = TimerSnapshot {
            sets,
            commitment_level: level,
            workout_id,
            ..TimerSnapshot::default()
        };
        self.load_position(0, Phase::Idle);
    }

    /// Point at `index` in `phase` with both clocks reloaded for that set
    fn load_position(&mut self, index: usize, phase: Phase) {
        self.snapshot.current_set_index = index;
        self.snapshot.phase = phase;
        self.snapshot.countdown_remaining_ms = COUNTDOWN_DURATION_MS;
        self.snapshot.timer_remaining_ms = self.snapshot.current_effective_duration_ms();
    }

    fn begin_running(&mut self) {
        if !self.snapshot.current_is_time_bound() {
            return;
        }
        self.snapshot.phase = Phase::Running;
        self.snapshot.timer_remaining_ms = self.snapshot.current_effective_duration_ms();
        self.cues.play_start_cue();
    }

    /// Rest-adjacency rules take precedence over superset continuation
    fn advance_after_expiry(&mut self) {
        let index = self.snapshot.current_set_index;
        let (Some(current), Some(next)) = (self.snapshot.current_set(), self.snapshot.next_set())
        else {
            self.snapshot.phase = Phase::Completed;
            return;
        };

        if current.is_rest() && !next.is_rest() {
            self.load_position(index + 1, Phase::Idle);
        } else if !current.is_rest() && next.is_rest() {
            self.load_position(index + 1, Phase::Running);
            self.cues.play_start_cue();
        } else if next.is_timed()
            && find_sequence(&self.snapshot.sets, index).is_some_and(|seq| seq.contains(index + 1))
        {
            self.load_position(index + 1, Phase::Running);
            self.cues.play_start_cue();
        } else {
            self.snapshot.phase = Phase::Completed;
        }
    }

    /// Run `f`, then log and notify subscribers if the snapshot changed
    fn mutate<R>(&mut self, op: &'static str, f: impl FnOnce(&mut Self) -> R) -> R {
        let before_phase = self.snapshot.phase;
        let before_index = self.snapshot.current_set_index;
        let before = self.snapshot.clone();

        let out = f(self);

        if self.snapshot == before {
            return out;
        }
        if self.snapshot.phase != before_phase || self.snapshot.current_set_index != before_index {
            debug!(
                op,
                from = %before_phase,
                to = %self.snapshot.phase,
                index = self.snapshot.current_set_index,
                "transition"
            );
        } else {
            trace!(op, timer_ms = self.snapshot.timer_remaining_ms, "update");
        }
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.snapshot);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cues::{Cue, RecordingCues};
    use crate::store::MemoryCommitmentStore;
    use crate::workout::{RepSet, Rest, TimedSet};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn timed(id: &str, name: &str, secs: u32) -> Set {
        Set::Timed(TimedSet {
            id: id.into(),
            name: name.into(),
            base_duration_seconds: secs,
            description: String::new(),
        })
    }

    fn reps(id: &str, name: &str, count: u32) -> Set {
        Set::Reps(RepSet {
            id: id.into(),
            name: name.into(),
            base_reps: count,
            description: String::new(),
        })
    }

    fn rest(id: &str, secs: u32) -> Set {
        Set::Rest(Rest {
            id: id.into(),
            base_duration_seconds: secs,
        })
    }

    fn machine(sets: Vec<Set>) -> TimerMachine {
        let mut m = TimerMachine::new();
        m.select_sets(sets, CommitmentLevel::Standard);
        m
    }

    /// Tick until the phase changes or `max` ticks elapse
    fn tick_until_phase_changes(m: &mut TimerMachine, max: usize) {
        let start = (m.phase(), m.snapshot().current_set_index);
        for _ in 0..max {
            m.tick(TICK_RATE_MS);
            if (m.phase(), m.snapshot().current_set_index) != start {
                return;
            }
        }
    }

    #[test]
    fn test_default_snapshot() {
        let m = TimerMachine::new();
        let s = m.snapshot();
        assert_eq!(s.phase, Phase::Idle);
        assert!(s.sets.is_empty());
        assert_eq!(s.countdown_remaining_ms, COUNTDOWN_DURATION_MS);
        assert_eq!(s.timer_remaining_ms, 0);
        assert_eq!(s.commitment_level, CommitmentLevel::Standard);
    }

    #[test]
    fn test_select_sets_loads_first_set() {
        let mut m = TimerMachine::new();
        m.select_sets(vec![timed("1", "A", 40)], CommitmentLevel::TryIt);
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.snapshot().current_set_index, 0);
        assert_eq!(m.snapshot().timer_remaining_ms, 10_000);
        assert_eq!(m.current_effective_duration_ms(), 10_000);
    }

    #[test]
    fn test_reset_after_select_matches_fresh_select() {
        let sets = vec![timed("1", "A", 10), rest("2", 5), reps("3", "B", 8)];
        for level in CommitmentLevel::ALL {
            let mut fresh = TimerMachine::new();
            fresh.select_sets(sets.clone(), level);

            let mut reset = TimerMachine::new();
            reset.select_sets(sets.clone(), level);
            reset.reset();

            assert_eq!(fresh.snapshot(), reset.snapshot());
        }
    }

    #[test]
    fn test_reset_returns_to_first_set() {
        let mut m = machine(vec![timed("1", "A", 10), rest("2", 5), timed("3", "B", 20)]);
        m.start_rest_automatically();
        assert_eq!(m.snapshot().current_set_index, 1);
        m.reset();
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.snapshot().current_set_index, 0);
        assert_eq!(m.snapshot().timer_remaining_ms, 10_000);
    }

    #[test]
    fn test_countdown_then_running() {
        let mut m = machine(vec![timed("1", "A", 10)]);
        m.start_countdown();
        assert_eq!(m.phase(), Phase::Countdown);
        assert_eq!(m.snapshot().countdown_remaining_ms, 3000);

        for _ in 0..29 {
            m.tick(100);
        }
        assert_eq!(m.phase(), Phase::Countdown);
        assert_eq!(m.snapshot().countdown_remaining_ms, 100);

        m.tick(100);
        assert_eq!(m.phase(), Phase::Running);
        assert_eq!(m.snapshot().timer_remaining_ms, 10_000);
    }

    #[test]
    fn test_single_set_completes() {
        let mut m = machine(vec![timed("1", "A", 3)]);
        m.start_countdown();
        tick_until_phase_changes(&mut m, 100);
        assert_eq!(m.phase(), Phase::Running);
        tick_until_phase_changes(&mut m, 100);
        assert_eq!(m.phase(), Phase::Completed);
        assert_eq!(m.snapshot().current_set_index, 0);
        assert_eq!(m.snapshot().timer_remaining_ms, 0);
        assert!(m.is_workout_complete());
    }

    #[test]
    fn test_expiry_at_exact_step() {
        let mut m = machine(vec![timed("1", "A", 10)]);
        m.start_timer();
        assert_eq!(m.phase(), Phase::Running);
        m.tick(9_800);
        assert_eq!(m.snapshot().timer_remaining_ms, 200);
        m.tick(100);
        assert_eq!(m.snapshot().timer_remaining_ms, 100);
        assert_eq!(m.phase(), Phase::Running);
        m.tick(100);
        assert_eq!(m.phase(), Phase::Completed);
    }

    #[test]
    fn test_working_set_into_rest_auto_starts() {
        let mut m = machine(vec![timed("1", "A", 10), rest("2", 30), timed("3", "B", 10)]);
        m.start_timer();
        m.tick(10_000);
        assert_eq!(m.phase(), Phase::Running);
        assert_eq!(m.snapshot().current_set_index, 1);
        assert_eq!(m.snapshot().timer_remaining_ms, 30_000);
    }

    #[test]
    fn test_rest_into_working_set_waits_at_idle() {
        let mut m = machine(vec![timed("1", "A", 10), rest("2", 30), timed("3", "B", 10)]);
        m.start_timer();
        m.tick(10_000);
        m.tick(30_000);
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.snapshot().current_set_index, 2);
        assert_eq!(m.snapshot().timer_remaining_ms, 10_000);
        assert_eq!(m.snapshot().countdown_remaining_ms, COUNTDOWN_DURATION_MS);
    }

    #[test]
    fn test_superset_members_run_back_to_back() {
        let mut m = machine(vec![timed("1", "Hold", 30), timed("2", "Hold", 30), timed("3", "Hold", 30)]);
        m.start_timer();
        m.tick(30_000);
        assert_eq!(m.phase(), Phase::Running);
        assert_eq!(m.snapshot().current_set_index, 1);
        m.tick(30_000);
        assert_eq!(m.snapshot().current_set_index, 2);
        m.tick(30_000);
        assert_eq!(m.phase(), Phase::Completed);
    }

    #[test]
    fn test_different_names_complete_instead_of_advancing() {
        let mut m = machine(vec![timed("1", "A", 10), timed("2", "B", 10)]);
        m.start_timer();
        m.tick(10_000);
        assert_eq!(m.phase(), Phase::Completed);
        assert_eq!(m.snapshot().current_set_index, 0);
        assert!(!m.is_workout_complete());
    }

    #[test]
    fn test_superset_into_rep_set_completes() {
        let mut m = machine(vec![timed("1", "Pushups", 10), reps("2", "Pushups", 10)]);
        m.start_timer();
        m.tick(10_000);
        assert_eq!(m.phase(), Phase::Completed);
        assert_eq!(m.next(), Advance::Advanced);
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.snapshot().current_set_index, 1);
    }

    #[test]
    fn test_rest_followed_by_rest_completes() {
        let mut m = machine(vec![rest("1", 5), rest("2", 5)]);
        m.start_timer();
        m.tick(5_000);
        assert_eq!(m.phase(), Phase::Completed);
        assert_eq!(m.snapshot().current_set_index, 0);
    }

    #[test]
    fn test_same_name_across_rest_follows_rest_rules() {
        let sets = vec![timed("1", "A", 10), rest("2", 5), timed("3", "A", 10)];
        let seq = find_sequence(&sets, 0).unwrap();
        assert_eq!(seq.indices, vec![0, 2]);
        assert_eq!(seq.name, "A");

        let mut m = machine(sets);
        m.start_countdown();
        tick_until_phase_changes(&mut m, 100);
        assert_eq!(m.phase(), Phase::Running);

        tick_until_phase_changes(&mut m, 1_000);
        assert_eq!(m.phase(), Phase::Running);
        assert_eq!(m.snapshot().current_set_index, 1);

        tick_until_phase_changes(&mut m, 1_000);
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.snapshot().current_set_index, 2);
    }

    #[test]
    fn test_rep_set_ignores_ticks() {
        let mut m = TimerMachine::new();
        m.select_sets(vec![reps("1", "Pushups", 10)], CommitmentLevel::EasyWin);
        assert_eq!(m.current_effective_reps(), Some(5));
        assert_eq!(m.current_effective_duration_ms(), 0);

        let before = m.snapshot().clone();
        for _ in 0..500 {
            m.tick(TICK_RATE_MS);
            m.tick_timer(TICK_RATE_MS);
            m.tick_countdown(TICK_RATE_MS);
        }
        m.start_countdown();
        m.start_timer();
        assert_eq!(m.snapshot(), &before);

        assert_eq!(m.done(), Advance::Finished);
    }

    #[test]
    fn test_rep_set_done_moves_on() {
        let mut m = machine(vec![reps("1", "Pushups", 10), reps("2", "Squats", 10)]);
        assert_eq!(m.done(), Advance::Advanced);
        assert_eq!(m.snapshot().current_set_index, 1);
        assert_eq!(m.phase(), Phase::Idle);
    }

    #[test]
    fn test_next_into_rest_auto_starts() {
        let mut m = machine(vec![reps("1", "Pushups", 10), rest("2", 20), reps("3", "Pushups", 10)]);
        assert_eq!(m.next(), Advance::Advanced);
        assert_eq!(m.phase(), Phase::Running);
        assert_eq!(m.snapshot().current_set_index, 1);
        assert_eq!(m.snapshot().timer_remaining_ms, 20_000);
    }

    #[test]
    fn test_next_ignored_while_running() {
        let mut m = machine(vec![timed("1", "A", 10), timed("2", "B", 10)]);
        m.start_timer();
        assert_eq!(m.next(), Advance::Ignored);
        assert_eq!(m.snapshot().current_set_index, 0);
        m.pause();
        assert_eq!(m.next(), Advance::Ignored);
    }

    #[test]
    fn test_last_set_next_reports_finished_without_change() {
        let mut m = machine(vec![timed("1", "A", 10)]);
        m.start_timer();
        m.tick(10_000);
        let before = m.snapshot().clone();
        assert_eq!(m.next(), Advance::Finished);
        assert_eq!(m.snapshot(), &before);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut m = machine(vec![timed("1", "A", 10)]);
        m.pause();
        assert_eq!(m.phase(), Phase::Idle);

        m.start_timer();
        m.tick(1_000);
        m.pause();
        assert_eq!(m.phase(), Phase::Paused);
        m.tick(5_000);
        assert_eq!(m.snapshot().timer_remaining_ms, 9_000);

        m.resume();
        assert_eq!(m.phase(), Phase::Running);
        m.resume();
        assert_eq!(m.phase(), Phase::Running);
        m.tick(1_000);
        assert_eq!(m.snapshot().timer_remaining_ms, 8_000);
    }

    #[test]
    fn test_start_rest_automatically_requires_next_rest() {
        let mut m = machine(vec![timed("1", "A", 10), timed("2", "B", 10)]);
        let before = m.snapshot().clone();
        m.start_rest_automatically();
        assert_eq!(m.snapshot(), &before);
    }

    #[test]
    fn test_empty_workout_is_inert() {
        let mut m = machine(vec![]);
        let before = m.snapshot().clone();
        m.start_countdown();
        m.start_timer();
        m.tick(100);
        m.pause();
        m.start_rest_automatically();
        assert_eq!(m.next(), Advance::Ignored);
        m.reset();
        assert_eq!(m.snapshot(), &before);
        assert!(m.current_set().is_none());
        assert!(m.next_set().is_none());
        assert!(!m.is_last_set());
        assert_eq!(m.current_effective_duration_ms(), 0);
    }

    #[test]
    fn test_rest_duration_ignores_level() {
        let mut m = TimerMachine::new();
        m.select_sets(vec![rest("1", 60)], CommitmentLevel::TryIt);
        assert_eq!(m.current_effective_duration_ms(), 60_000);
        m.set_commitment_level(CommitmentLevel::PushIt);
        assert_eq!(m.current_effective_duration_ms(), 60_000);
    }

    #[test]
    fn test_set_commitment_level_recomputes_idle_timer() {
        let mut m = machine(vec![timed("1", "A", 40)]);
        m.set_commitment_level(CommitmentLevel::EasyWin);
        assert_eq!(m.snapshot().timer_remaining_ms, 20_000);

        m.start_timer();
        m.tick(1_000);
        m.set_commitment_level(CommitmentLevel::PushIt);
        assert_eq!(m.snapshot().commitment_level, CommitmentLevel::PushIt);
        assert_eq!(m.snapshot().timer_remaining_ms, 19_000);
    }

    #[test]
    fn test_select_workout_restores_and_persists_level() {
        let store = MemoryCommitmentStore::new();
        store.insert("w", "comfortable");
        let workout = Workout {
            id: "w".into(),
            name: "W".into(),
            description: String::new(),
            sets: vec![timed("1", "A", 40)],
        };

        let mut m = TimerMachine::new().with_store(Box::new(store.clone()));
        m.select_workout(&workout);
        assert_eq!(m.snapshot().commitment_level, CommitmentLevel::Comfortable);
        assert_eq!(m.snapshot().timer_remaining_ms, 30_000);
        assert_eq!(m.snapshot().workout_id.as_deref(), Some("w"));

        m.set_commitment_level(CommitmentLevel::PushIt);
        assert_eq!(store.load("w").as_deref(), Some("push-it"));
    }

    #[test]
    fn test_select_workout_heals_invalid_level() {
        let store = MemoryCommitmentStore::new();
        store.insert("w", "maximum");
        let workout = Workout {
            id: "w".into(),
            name: "W".into(),
            description: String::new(),
            sets: vec![timed("1", "A", 40)],
        };
        let mut m = TimerMachine::new().with_store(Box::new(store.clone()));
        m.select_workout(&workout);
        assert_eq!(m.snapshot().commitment_level, CommitmentLevel::Standard);
        assert_eq!(store.load("w").as_deref(), Some("standard"));
    }

    #[test]
    fn test_subscribers_see_every_change_once() {
        let seen: Rc<RefCell<Vec<Phase>>> = Rc::default();
        let mut m = TimerMachine::new();
        let sink = seen.clone();
        let id = m.subscribe(move |s| sink.borrow_mut().push(s.phase));

        m.select_sets(vec![timed("1", "A", 3)], CommitmentLevel::Standard);
        m.start_countdown();
        m.pause();
        m.tick(3_000);
        m.tick(3_000);
        assert_eq!(
            *seen.borrow(),
            vec![Phase::Idle, Phase::Countdown, Phase::Running, Phase::Completed]
        );

        assert!(m.unsubscribe(id));
        assert!(!m.unsubscribe(id));
        m.reset();
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn test_subscriber_observes_final_state() {
        let observed: Rc<RefCell<Option<(Phase, usize, u64)>>> = Rc::default();
        let mut m = machine(vec![timed("1", "A", 10), rest("2", 20)]);
        let sink = observed.clone();
        m.subscribe(move |s| {
            *sink.borrow_mut() = Some((s.phase, s.current_set_index, s.timer_remaining_ms));
        });
        m.start_timer();
        m.tick(10_000);
        assert_eq!(*observed.borrow(), Some((Phase::Running, 1, 20_000)));
    }

    #[test]
    fn test_cues_follow_transitions() {
        let cues = RecordingCues::new();
        let mut m = TimerMachine::new().with_cues(Box::new(cues.clone()));
        m.select_sets(vec![timed("1", "A", 3), rest("2", 3)], CommitmentLevel::Standard);
        m.start_countdown();
        m.tick(3_000);
        assert_eq!(cues.played(), vec![Cue::Start]);
        m.tick(3_000);
        assert_eq!(cues.played(), vec![Cue::Start, Cue::End, Cue::Start]);
        m.tick(3_000);
        assert_eq!(cues.played(), vec![Cue::Start, Cue::End, Cue::Start, Cue::End]);
        assert_eq!(m.phase(), Phase::Completed);
    }

    #[test]
    fn test_progress_percent() {
        let mut m = machine(vec![timed("1", "A", 10)]);
        assert_eq!(m.progress_percent(), 0.0);
        m.start_countdown();
        m.tick(1_500);
        assert_eq!(m.progress_percent(), 50.0);
        m.tick(1_500);
        assert_eq!(m.progress_percent(), 0.0);
        m.tick(2_500);
        assert_eq!(m.progress_percent(), 25.0);
        m.pause();
        assert_eq!(m.progress_percent(), 25.0);
    }

    #[test]
    fn test_is_last_set() {
        let mut m = machine(vec![reps("1", "A", 5), reps("2", "B", 5)]);
        assert!(!m.is_last_set());
        m.next();
        assert!(m.is_last_set());
        assert!(m.next_set().is_none());
    }
}
