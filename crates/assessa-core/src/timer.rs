//! Countdown state for timed quizzes.
//!
//! The countdown does not own a clock. Something calls
//! [`QuizSession::tick`](crate::session::QuizSession::tick) once per second
//! (a tokio interval, an event loop, or a test advancing a paused clock) and
//! the session forwards it here.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Tick period.
pub const TICK: Duration = Duration::from_secs(1);

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Countdown is stopped; nothing happened.
    Idle,
    /// Time is still left.
    Remaining(u64),
    /// This tick reached zero. Reported exactly once.
    Expired,
}

/// Remaining-time counter for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    limit_secs: u64,
    remaining_secs: u64,
    running: bool,
}

impl Countdown {
    /// A running countdown starting at `limit_secs`.
    pub fn new(limit_secs: u64) -> Self {
        Self {
            limit_secs,
            remaining_secs: limit_secs,
            running: limit_secs > 0,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.limit_secs - self.remaining_secs
    }

    /// Freeze the countdown. Later ticks are [`Tick::Idle`].
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            Tick::Expired
        } else {
            Tick::Remaining(self.remaining_secs)
        }
    }
}

/// Format seconds as `m:ss`; minutes are not wrapped into hours.
pub fn format_remaining(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// A 1-second interval whose first tick fires one period from now.
///
/// Missed ticks are delayed rather than burst so a stalled host does not
/// drain several seconds at once.
pub fn tick_interval() -> Interval {
    let mut interval = interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
