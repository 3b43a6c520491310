//! Transient notification timeline.
//!
//! A toast is shown, hidden again after the display duration, and removed
//! once the hide transition has had time to run. Timers are fire-and-forget.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Show,
    Hide,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTimeline {
    pub display: Duration,
    pub transition: Duration,
}

impl ToastTimeline {
    pub fn new(display: Duration, transition: Duration) -> Self {
        Self {
            display,
            transition,
        }
    }

    /// Offsets from the moment the toast is created.
    pub fn phases(&self) -> [(Duration, ToastPhase); 3] {
        [
            (Duration::ZERO, ToastPhase::Show),
            (self.display, ToastPhase::Hide),
            (self.display + self.transition, ToastPhase::Remove),
        ]
    }

    /// Time until the toast node is gone.
    pub fn lifetime(&self) -> Duration {
        self.display + self.transition
    }
}

impl Default for ToastTimeline {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000), Duration::from_millis(260))
    }
}
