/// Lockout applied to the "Done" action when a rep set appears, so a double
/// press cannot skip it.
pub const NON_TIMED_SET_BUTTON_DISABLE_DURATION_MS: u64 = 3000;

/// Tick-driven temporary disable with progress reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentaryDisable {
    duration_ms: u64,
    elapsed_ms: u64,
}

impl MomentaryDisable {
    /// A duration of 0 never disables
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            elapsed_ms: 0,
        }
    }

    pub fn inactive() -> Self {
        Self::new(0)
    }

    /// Start the lockout over
    pub fn restart(&mut self) {
        self.elapsed_ms = 0;
    }

    pub fn tick(&mut self, step_ms: u64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(step_ms).min(self.duration_ms);
    }

    pub fn is_disabled(&self) -> bool {
        self.duration_ms > 0 && self.elapsed_ms < self.duration_ms
    }

    /// 0.0..=100.0; stays at 0 when the lockout is inactive
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.elapsed_ms as f64 / self.duration_ms as f64 * 100.0).min(100.0)
    }
}

impl Default for MomentaryDisable {
    fn default() -> Self {
        Self::new(NON_TIMED_SET_BUTTON_DISABLE_DURATION_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_never_disabled() {
        let d = MomentaryDisable::inactive();
        assert!(!d.is_disabled());
        assert_eq!(d.progress(), 0.0);
    }

    #[test]
    fn disables_until_duration_elapses() {
        let mut d = MomentaryDisable::default();
        assert!(d.is_disabled());
        for _ in 0..29 {
            d.tick(100);
        }
        assert!(d.is_disabled());
        assert!((d.progress() - 96.666).abs() < 0.01);
        d.tick(100);
        assert!(!d.is_disabled());
        assert_eq!(d.progress(), 100.0);
        d.tick(10_000);
        assert_eq!(d.progress(), 100.0);
    }

    #[test]
    fn restart_disables_again() {
        let mut d = MomentaryDisable::new(500);
        d.tick(500);
        assert!(!d.is_disabled());
        d.restart();
        assert!(d.is_disabled());
        assert_eq!(d.progress(), 0.0);
    }
}
