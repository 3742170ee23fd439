//! Hold-time gate — a gesture only becomes actionable after it has been
//! recognized continuously for a minimum duration.

use tracing::debug;

use super::classifier::Gesture;

/// Tracks the most recent non-None gesture and when it started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldTimeGate {
    last_gesture: Gesture,
    gesture_start_s: f64,
}

impl HoldTimeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `gesture` at `now_s` and report whether it is actionable.
    ///
    /// A new non-None gesture restarts the hold timer.  `None` frames neither
    /// restart the timer nor act.
    pub fn observe(&mut self, gesture: Gesture, now_s: f64, hold_s: f64) -> bool {
        if gesture == Gesture::None {
            return false;
        }

        if gesture != self.last_gesture {
            debug!("Gesture started: {:?} at {:.3}s", gesture, now_s);
            self.last_gesture = gesture;
            self.gesture_start_s = now_s;
        }

        now_s - self.gesture_start_s > hold_s
    }

    pub fn last_gesture(&self) -> Gesture {
        self.last_gesture
    }

    /// How long the current gesture has been held, in seconds.
    pub fn held_for(&self, now_s: f64) -> f64 {
        if self.last_gesture == Gesture::None {
            0.0
        } else {
            (now_s - self.gesture_start_s).max(0.0)
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Tests ──────────────────────────────────────────────────
