use super::scheduler::{RoundToken, Scheduler, Task, TimerId};

/// What a single clock tick produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSignal {
    Tick(u32),
    /// Remaining time reached zero. Emitted once; the clock stops itself.
    Expired,
}

/// One-tick-per-period countdown from the round duration to zero.
#[derive(Debug, Default)]
pub struct RoundClock {
    remaining: u32,
    timer: Option<TimerId>,
}

impl RoundClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        duration_seconds: u32,
        scheduler: &mut Scheduler,
        now: f64,
        period_ms: f64,
        token: RoundToken,
    ) {
        self.stop(scheduler);
        self.remaining = duration_seconds;
        self.timer = Some(scheduler.schedule_every(now, period_ms, Task::ClockTick, token));
    }

    /// Safe to call when not running.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns `None` when the clock is not running (stale timer).
    pub fn tick(&mut self, scheduler: &mut Scheduler) -> Option<ClockSignal> {
        if !self.is_running() {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.stop(scheduler);
            Some(ClockSignal::Expired)
        } else {
            Some(ClockSignal::Tick(self.remaining))
        }
    }
}
