use std::io::{self, Write};

/// Audio feedback for phase changes
pub trait CuePlayer {
    /// A working set or rest begins
    fn play_start_cue(&mut self);
    /// A timer ran out
    fn play_end_cue(&mut self);
}

/// Rings the terminal bell. Most terminals map BEL to a short beep or a flash.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl TerminalBell {
    fn ring(times: usize) {
        let mut out = io::stdout();
        let bells = "\x07".repeat(times);
        if out.write_all(bells.as_bytes()).and_then(|_| out.flush()).is_err() {
            tracing::debug!("terminal bell unavailable");
        }
    }
}

impl CuePlayer for TerminalBell {
    fn play_start_cue(&mut self) {
        Self::ring(1);
    }

    fn play_end_cue(&mut self) {
        Self::ring(2);
    }
}

#[derive(Debug, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play_start_cue(&mut self) {}
    fn play_end_cue(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Start,
    End,
}

/// Records cues instead of playing them, shared via `Rc` so a test can keep a
/// handle after moving the player into a machine
#[derive(Debug, Default, Clone)]
pub struct RecordingCues {
    played: std::rc::Rc<std::cell::RefCell<Vec<Cue>>>,
}

impl RecordingCues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played.borrow().clone()
    }
}

impl CuePlayer for RecordingCues {
    fn play_start_cue(&mut self) {
        self.played.borrow_mut().push(Cue::Start);
    }

    fn play_end_cue(&mut self) {
        self.played.borrow_mut().push(Cue::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_cues_share_history_between_clones() {
        let cues = RecordingCues::new();
        let mut handle = cues.clone();
        handle.play_start_cue();
        handle.play_end_cue();
        assert_eq!(cues.played(), vec![Cue::Start, Cue::End]);
    }
}
