//! Auto-hide deadline for the on-screen presentation controls.

use tokio::time::{Duration, Instant};

/// Inactivity before the controls disappear.
pub const DELAY_BEFORE_HIDING_CONTROLS: Duration = Duration::from_millis(3000);

/// Tracks whether the controls are shown and when they should hide.
///
/// The timer does not sleep by itself; the owner calls [`ControlsTimer::expire`]
/// once [`ControlsTimer::deadline`] has passed.
#[derive(Debug, Clone)]
pub struct ControlsTimer {
    delay: Duration,
    hide_at: Option<Instant>,
}

impl Default for ControlsTimer {
    fn default() -> Self {
        Self::new(DELAY_BEFORE_HIDING_CONTROLS)
    }
}

impl ControlsTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            hide_at: None,
        }
    }

    /// Shows the controls, or extends the deadline if already shown.
    ///
    /// Returns true if the controls were hidden before.
    pub fn show(&mut self, now: Instant) -> bool {
        let was_hidden = self.hide_at.is_none();
        self.hide_at = Some(now + self.delay);
        was_hidden
    }

    /// Hides immediately. Returns true if the controls were visible.
    pub fn hide(&mut self) -> bool {
        self.hide_at.take().is_some()
    }

    /// Hides if the deadline has passed. Returns true if it just did.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.hide_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    pub fn visible(&self) -> bool {
        self.hide_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_then_expire() {
        let start = Instant::now();
        let mut timer = ControlsTimer::default();

        assert!(timer.show(start));
        assert!(timer.visible());
        assert!(!timer.expire(start + Duration::from_millis(2999)));
        assert!(timer.expire(start + Duration::from_millis(3000)));
        assert!(!timer.visible());
    }

    #[test]
    fn test_activity_extends_deadline() {
        let start = Instant::now();
        let mut timer = ControlsTimer::default();
        timer.show(start);

        let later = start + Duration::from_millis(2000);
        assert!(!timer.show(later), "Already visible controls are only extended");
        assert!(!timer.expire(start + Duration::from_millis(3500)));
        assert_eq!(timer.deadline(), Some(later + DELAY_BEFORE_HIDING_CONTROLS));
    }

    #[test]
    fn test_hide_when_hidden_is_noop() {
        let mut timer = ControlsTimer::new(Duration::from_millis(10));
        assert!(!timer.hide());
        timer.show(Instant::now());
        assert!(timer.hide());
        assert_eq!(timer.deadline(), None);
    }
}
