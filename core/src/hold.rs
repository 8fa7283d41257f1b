//! Hold-to-repeat for pressed buttons.
//!
//! The timer is passive: the host reports times through `press` and `poll`
//! and the timer answers which button, if any, should fire again. Nothing
//! runs in the background, so cancelling is immediate.

use crate::text_edit::{button_type, ButtonType};
use std::time::{Duration, Instant};

/// Delay between pressing a button and its first repeat.
pub const HOLD_DELAY: Duration = Duration::from_millis(500);
/// Interval between repeats once repeating started.
pub const HOLD_INTERVAL: Duration = Duration::from_millis(100);

/// Whether holding `token` repeats it.
pub fn is_repeatable(token: &str) -> bool {
    match button_type(token) {
        ButtonType::Standard => true,
        ButtonType::Placeholder => false,
        ButtonType::Function => matches!(
            token,
            "{bksp}" | "{backspace}" | "{delete}" | "{space}" | "{tab}"
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Armed {
    token: String,
    next_fire: Instant,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldTimer {
    armed: Option<Armed>,
}

impl HoldTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a press. A previous hold is always cancelled; the new
    /// one is armed only for repeatable buttons. Returns whether it armed.
    pub fn press(&mut self, token: &str, now: Instant) -> bool {
        self.cancel();
        if !is_repeatable(token) {
            return false;
        }
        self.armed = Some(Armed {
            token: token.to_string(),
            next_fire: now + HOLD_DELAY,
        });
        true
    }

    /// The held button if a repeat is due at `now`. Fires at most once per
    /// call and schedules the next repeat one interval later.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let armed = self.armed.as_mut()?;
        if now < armed.next_fire {
            return None;
        }
        armed.next_fire = now + HOLD_INTERVAL;
        Some(armed.token.clone())
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.armed.as_ref().map(|a| a.token.as_str())
    }
}
