//! Cooperative disconnect grace timer.
//!
//! Nothing here reads a clock. The host advances the timer from its frame
//! loop with [`GraceTimer::tick`], which keeps sessions deterministic under
//! test.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running(Duration),
    Expired,
}

/// Countdown started when a peer drops out of the room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraceTimer {
    period: Duration,
    state: TimerState,
}

impl GraceTimer {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: TimerState::Idle,
        }
    }

    /// (Re)start the countdown from the full period.
    pub fn start(&mut self) {
        self.state = if self.period.is_zero() {
            TimerState::Expired
        } else {
            TimerState::Running(self.period)
        };
    }

    /// Stop the countdown; the timer can be started again later.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Advance by `dt`. Returns `true` on the tick that expires the timer.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let TimerState::Running(remaining) = self.state else {
            return false;
        };
        match remaining.checked_sub(dt) {
            Some(left) if !left.is_zero() => {
                self.state = TimerState::Running(left);
                false
            }
            _ => {
                self.state = TimerState::Expired;
                true
            }
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running(_))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    /// Time left, `None` unless running.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        match self.state {
            TimerState::Running(left) => Some(left),
            TimerState::Idle | TimerState::Expired => None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_500: Duration = Duration::from_millis(500);

    #[test]
    fn test_countdown() {
        let mut timer = GraceTimer::new(Duration::from_secs(1));
        assert!(!timer.tick(MS_500));

        timer.start();
        assert!(!timer.tick(MS_500));
        assert_eq!(timer.remaining(), Some(MS_500));
        assert!(timer.tick(MS_500));
        assert!(timer.is_expired());
        assert!(!timer.tick(MS_500));
    }

    #[test]
    fn test_cancel_and_restart() {
        let mut timer = GraceTimer::new(Duration::from_secs(3));
        timer.start();
        timer.tick(Duration::from_secs(2));
        timer.cancel();
        assert!(!timer.is_running());
        assert!(!timer.is_expired());

        timer.start();
        assert_eq!(timer.remaining(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_zero_period_expires_immediately() {
        let mut timer = GraceTimer::new(Duration::ZERO);
        timer.start();
        assert!(timer.is_expired());
    }
}
