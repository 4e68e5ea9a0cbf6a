//! Countdown clock for a single phase.
//!
//! A [`Clock`] delivers ticks tagged with the [`TickToken`] it handed out
//! when scheduled. [`PhaseClock`] keeps at most one token armed and only
//! counts ticks carrying that token, so a late tick from a cancelled source
//! can never decrement the countdown.

use std::time::Duration;

/// One tick per second
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Identity of a scheduled tick source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickToken(pub u64);

/// Capability to start and stop periodic tick delivery
pub trait Clock {
    /// Begin delivering ticks every `period`; the host passes the returned
    /// token back with each tick.
    fn schedule(&mut self, period: Duration) -> TickToken;

    /// Stop delivering ticks for `token`
    fn cancel(&mut self, token: TickToken);
}

/// Outcome of feeding one tick to a [`PhaseClock`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSignal {
    /// Tick from a source that is not armed
    Stale,
    /// Counted down, still time left
    Ticked(u32),
    /// Counted down to zero on this tick
    Expired,
    /// Already at zero; waiting for a reset
    Held,
}

/// Countdown driven by a [`Clock`]
#[derive(Debug)]
pub struct PhaseClock<C: Clock> {
    clock: C,
    remaining: u32,
    armed: Option<TickToken>,
}

impl<C: Clock> PhaseClock<C> {
    pub fn new(clock: C, remaining: u32) -> Self {
        Self {
            clock,
            remaining,
            armed: None,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_token(&self) -> Option<TickToken> {
        self.armed
    }

    /// Arm a fresh tick source, cancelling any previous one first
    pub fn start(&mut self) -> TickToken {
        self.stop();
        let token = self.clock.schedule(TICK_INTERVAL);
        tracing::debug!("Armed tick source {:?}", token);
        self.armed = Some(token);
        token
    }

    /// Cancel the armed tick source, keeping `remaining`
    pub fn stop(&mut self) {
        if let Some(token) = self.armed.take() {
            self.clock.cancel(token);
            tracing::debug!("Cancelled tick source {:?}", token);
        }
    }

    /// Set the countdown for the next phase
    pub fn reset(&mut self, remaining: u32) {
        self.remaining = remaining;
    }

    /// Count one tick
    pub fn tick(&mut self, token: TickToken) -> ClockSignal {
        if self.armed != Some(token) {
            tracing::debug!("Ignoring stale tick from {:?}", token);
            return ClockSignal::Stale;
        }

        match self.remaining {
            0 => ClockSignal::Held,
            1 => {
                self.remaining = 0;
                ClockSignal::Expired
            }
            n => {
                self.remaining = n - 1;
                ClockSignal::Ticked(self.remaining)
            }
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Clock whose ticks are fired explicitly by the caller
///
/// Used by tests and by hosts that run a session without waiting on
/// wall-clock time.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    active: Vec<TickToken>,
    scheduled_total: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently scheduled token that is still active
    pub fn current(&self) -> Option<TickToken> {
        self.active.last().copied()
    }

    /// Number of tick sources currently active
    pub fn active_sources(&self) -> usize {
        self.active.len()
    }

    pub fn scheduled_total(&self) -> usize {
        self.scheduled_total
    }
}

impl Clock for ManualClock {
    fn schedule(&mut self, _period: Duration) -> TickToken {
        self.next_id += 1;
        self.scheduled_total += 1;
        let token = TickToken(self.next_id);
        self.active.push(token);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        self.active.retain(|t| *t != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_and_expires() {
        let mut clock = PhaseClock::new(ManualClock::new(), 3);
        let token = clock.start();

        assert_eq!(clock.tick(token), ClockSignal::Ticked(2));
        assert_eq!(clock.tick(token), ClockSignal::Ticked(1));
        assert_eq!(clock.tick(token), ClockSignal::Expired);
        assert_eq!(clock.remaining(), 0);

        // Holds at zero until reset
        assert_eq!(clock.tick(token), ClockSignal::Held);
        assert_eq!(clock.remaining(), 0);

        clock.reset(2);
        assert_eq!(clock.tick(token), ClockSignal::Ticked(1));
    }

    #[test]
    fn test_restart_cancels_previous_source() {
        let mut clock = PhaseClock::new(ManualClock::new(), 10);
        let first = clock.start();
        let second = clock.start();

        assert_ne!(first, second);
        assert_eq!(clock.clock().active_sources(), 1);
        assert_eq!(clock.clock().current(), Some(second));

        assert_eq!(clock.tick(first), ClockSignal::Stale);
        assert_eq!(clock.remaining(), 10);
        assert_eq!(clock.tick(second), ClockSignal::Ticked(9));
    }

    #[test]
    fn test_stop_keeps_remaining() {
        let mut clock = PhaseClock::new(ManualClock::new(), 5);
        let token = clock.start();
        clock.tick(token);
        clock.stop();

        assert!(!clock.is_armed());
        assert_eq!(clock.clock().active_sources(), 0);
        assert_eq!(clock.tick(token), ClockSignal::Stale);
        assert_eq!(clock.remaining(), 4);
    }
}
