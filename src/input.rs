//! Button edge debouncing.
//!
//! Edge interrupts arrive in callback context. The handler asks
//! [`DebounceState::register`] whether the edge counts and, if it does,
//! hands the press to the task layer; nothing here sleeps.

use crate::config::{ENCODER_BUTTON_DEBOUNCE_MS, VOTE_BUTTON_DEBOUNCE_MS};
use crate::vote::Vote;
use embassy_time::{Duration, Instant};

/// Whether an edge at `now` is a new press given the last accepted one.
///
/// An edge that appears to precede `last` (timer wrap) is rejected.
pub fn should_fire(last: Option<Instant>, now: Instant, window: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now
            .checked_duration_since(last)
            .is_some_and(|elapsed| elapsed >= window),
    }
}

/// Last accepted edge of one button, owned by its handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceState {
    pub last: Option<Instant>,
}

impl DebounceState {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Accept the edge at `now` if it is outside `window`; only accepted
    /// edges move the window.
    pub fn register(&mut self, now: Instant, window: Duration) -> bool {
        let fire = should_fire(self.last, now, window);
        if fire {
            self.last = Some(now);
        }
        fire
    }
}

/// The two vote buttons on a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoteButton {
    /// Red, votes no.
    No,
    /// Green, votes yes.
    Yes,
}

impl VoteButton {
    pub const fn vote(self) -> Vote {
        match self {
            VoteButton::No => Vote::No,
            VoteButton::Yes => Vote::Yes,
        }
    }

    pub const fn debounce() -> Duration {
        Duration::from_millis(VOTE_BUTTON_DEBOUNCE_MS)
    }
}

/// Debounce window of the manager's encoder push-button.
pub const fn encoder_debounce() -> Duration {
    Duration::from_millis(ENCODER_BUTTON_DEBOUNCE_MS)
}
