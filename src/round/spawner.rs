use rand::Rng;

use super::fall::FallingObject;
use super::scheduler::{RoundToken, Scheduler, Task, TimerId};
use super::{ObjectId, ObjectKind};

/// Clean iff the uniform draw in `[0, 1)` exceeds `1 - probability_clean`.
pub fn classify(draw: f64, probability_clean: f64) -> ObjectKind {
    if draw > 1.0 - probability_clean {
        ObjectKind::Clean
    } else {
        ObjectKind::Polluted
    }
}

/// Emits one falling-object descriptor per spawn interval.
#[derive(Debug)]
pub struct Spawner {
    probability_clean: f64,
    spawn_top: f64,
    spawn_x_range: f64,
    next_id: u32,
    timer: Option<TimerId>,
}

impl Spawner {
    pub fn new(spawn_top: f64, spawn_x_range: f64) -> Self {
        Self {
            probability_clean: 0.7,
            spawn_top,
            spawn_x_range,
            next_id: 0,
            timer: None,
        }
    }

    pub fn start(
        &mut self,
        interval_ms: u32,
        probability_clean: f64,
        scheduler: &mut Scheduler,
        now: f64,
        token: RoundToken,
    ) {
        self.stop(scheduler);
        self.probability_clean = probability_clean.clamp(0.0, 1.0);
        self.timer = Some(scheduler.schedule_every(now, interval_ms as f64, Task::Spawn, token));
    }

    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// A stopped spawner emits nothing. Ids keep increasing across rounds so a
    /// stale id from an earlier round can never match a live object.
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<FallingObject> {
        if !self.is_running() {
            return None;
        }
        let kind = classify(rng.r#gen::<f64>(), self.probability_clean);
        let spawn_x = rng.r#gen::<f64>() * self.spawn_x_range;
        let id = ObjectId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Some(FallingObject::new(id, kind, spawn_x, self.spawn_top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn classify_threshold() {
        assert_eq!(classify(0.31, 0.7), ObjectKind::Clean);
        assert_eq!(classify(0.3, 0.7), ObjectKind::Polluted);
        assert_eq!(classify(0.0, 0.7), ObjectKind::Polluted);
        assert_eq!(classify(0.999, 0.0), ObjectKind::Polluted);
        assert_eq!(classify(0.001, 1.0), ObjectKind::Clean);
    }

    #[test]
    fn stopped_spawner_emits_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sched = Scheduler::new();
        let token = sched.next_round();
        let mut spawner = Spawner::new(-60.0, 90.0);
        assert!(spawner.spawn(&mut rng).is_none());
        spawner.start(900, 0.7, &mut sched, 0.0, token);
        let first = spawner.spawn(&mut rng).unwrap();
        let second = spawner.spawn(&mut rng).unwrap();
        assert_ne!(first.id, second.id);
        assert!((0.0..90.0).contains(&first.spawn_x));
        assert_eq!(first.vertical_position, -60.0);
        spawner.stop(&mut sched);
        spawner.stop(&mut sched);
        assert!(spawner.spawn(&mut rng).is_none());
        assert!(sched.is_empty());
    }

    #[test]
    fn clean_share_is_roughly_seventy_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sched = Scheduler::new();
        let token = sched.next_round();
        let mut spawner = Spawner::new(-60.0, 90.0);
        spawner.start(900, 0.7, &mut sched, 0.0, token);
        let clean = (0..10_000)
            .filter_map(|_| spawner.spawn(&mut rng))
            .filter(|o| o.kind == ObjectKind::Clean)
            .count();
        assert!((6_600..7_400).contains(&clean), "clean = {clean}");
    }
}
