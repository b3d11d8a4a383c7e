//! Cooperative timer queue. Every periodic callback of a round lives here,
//! tagged with the round that armed it, so ending or resetting a round can
//! drop all of them in one call.

use super::ObjectId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Cancellation tag shared by every timer armed for one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct RoundToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    ClockTick,
    Spawn,
    Fall(ObjectId),
    /// Grace delay after the target score was reached.
    FinishRound,
}

/// A timer popped from the queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fired {
    pub id: TimerId,
    pub task: Task,
    pub token: RoundToken,
    /// Scheduled time, which may lag the `now` passed to `pop_due`.
    pub due_ms: f64,
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    due_ms: f64,
    period_ms: Option<f64>,
    task: Task,
    token: RoundToken,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
    round: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token; timers from older tokens are unaffected until cancelled.
    pub fn next_round(&mut self) -> RoundToken {
        self.round += 1;
        RoundToken(self.round)
    }

    pub fn schedule_once(&mut self, now: f64, delay_ms: f64, task: Task, token: RoundToken) -> TimerId {
        self.push(now + delay_ms, None, task, token)
    }

    pub fn schedule_every(&mut self, now: f64, period_ms: f64, task: Task, token: RoundToken) -> TimerId {
        // Zero periods would spin forever inside pop_due.
        let period = period_ms.max(1.0);
        self.push(now + period, Some(period), task, token)
    }

    fn push(&mut self, due_ms: f64, period_ms: Option<f64>, task: Task, token: RoundToken) -> TimerId {
        // Ids grow monotonically, so they double as insertion order for ties.
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
            task,
            token,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    pub fn cancel_round(&mut self, token: RoundToken) {
        self.timers.retain(|t| t.token != token);
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Pops the earliest timer due at or before `now`. Periodic timers are
    /// re-armed one period after their previous due time.
    pub fn pop_due(&mut self, now: f64) -> Option<Fired> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.0.cmp(&b.id.0)))
            .map(|(i, _)| i)?;
        let timer = &mut self.timers[idx];
        let fired = Fired {
            id: timer.id,
            task: timer.task,
            token: timer.token,
            due_ms: timer.due_ms,
        };
        let period = timer.period_ms;
        match period {
            Some(period) => timer.due_ms += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order_then_insertion_order() {
        let mut s = Scheduler::new();
        let r = s.next_round();
        s.schedule_once(0.0, 50.0, Task::Spawn, r);
        s.schedule_once(0.0, 20.0, Task::Fall(ObjectId(1)), r);
        s.schedule_once(0.0, 20.0, Task::Fall(ObjectId(2)), r);
        assert_eq!(s.pop_due(10.0), None);
        assert_eq!(s.pop_due(100.0).map(|f| f.task), Some(Task::Fall(ObjectId(1))));
        assert_eq!(s.pop_due(100.0).map(|f| f.task), Some(Task::Fall(ObjectId(2))));
        assert_eq!(s.pop_due(100.0).map(|f| f.task), Some(Task::Spawn));
        assert!(s.is_empty());
    }

    #[test]
    fn periodic_timer_rearms() {
        let mut s = Scheduler::new();
        let r = s.next_round();
        let id = s.schedule_every(0.0, 1_000.0, Task::ClockTick, r);
        let mut due = Vec::new();
        while let Some(f) = s.pop_due(3_500.0) {
            due.push(f.due_ms);
        }
        assert_eq!(due, vec![1_000.0, 2_000.0, 3_000.0]);
        assert!(s.contains(id));
    }

    #[test]
    fn cancel_round_only_drops_that_round() {
        let mut s = Scheduler::new();
        let old = s.next_round();
        let new = s.next_round();
        s.schedule_every(0.0, 20.0, Task::Fall(ObjectId(7)), old);
        s.schedule_once(0.0, 300.0, Task::FinishRound, old);
        let keep = s.schedule_every(0.0, 1_000.0, Task::ClockTick, new);
        s.cancel_round(old);
        assert_eq!(s.len(), 1);
        assert!(s.contains(keep));
        s.cancel(keep);
        s.cancel(keep);
        assert!(s.is_empty());
    }
}
