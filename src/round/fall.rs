use crate::error::GameError;

use super::scheduler::{RoundToken, Scheduler, Task, TimerId};
use super::{ObjectId, ObjectKind};

#[derive(Clone, Debug, PartialEq)]
pub struct FallingObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Percent of the play-area width.
    pub spawn_x: f64,
    pub vertical_position: f64,
    resolved: bool,
}

impl FallingObject {
    pub fn new(id: ObjectId, kind: ObjectKind, spawn_x: f64, top: f64) -> Self {
        Self {
            id,
            kind,
            spawn_x,
            vertical_position: top,
            resolved: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Returns false if the object was already resolved.
    fn resolve(&mut self) -> bool {
        !std::mem::replace(&mut self.resolved, true)
    }
}

/// Result of one fall tick for one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FallStep {
    Moved(f64),
    /// Passed the bottom edge; the object is gone and its timer cancelled.
    Expired(f64),
    /// Already resolved or never known (stale timer).
    Gone,
}

#[derive(Debug)]
struct Live {
    object: FallingObject,
    timer: TimerId,
}

/// Owns every falling object until it is claimed or expires.
#[derive(Debug)]
pub struct FallSimulator {
    live: Vec<Live>,
    speed: f64,
    play_height: f64,
}

impl FallSimulator {
    pub fn new(play_height: f64) -> Self {
        Self {
            live: Vec::new(),
            speed: 0.0,
            play_height,
        }
    }

    pub fn set_speed(&mut self, speed_per_tick: f64) {
        self.speed = speed_per_tick;
    }

    /// Live value; applies to the next tick of every object.
    pub fn set_play_height(&mut self, height: f64) {
        if height.is_finite() && height > 0.0 {
            self.play_height = height;
        }
    }

    pub fn play_height(&self) -> f64 {
        self.play_height
    }

    pub fn insert(
        &mut self,
        object: FallingObject,
        scheduler: &mut Scheduler,
        now: f64,
        tick_ms: f64,
        token: RoundToken,
    ) {
        let timer = scheduler.schedule_every(now, tick_ms, Task::Fall(object.id), token);
        self.live.push(Live { object, timer });
    }

    pub fn get(&self, id: ObjectId) -> Option<&FallingObject> {
        self.live.iter().map(|l| &l.object).find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn position(&self, id: ObjectId) -> Option<usize> {
        self.live.iter().position(|l| l.object.id == id)
    }

    pub fn step(&mut self, id: ObjectId, scheduler: &mut Scheduler) -> FallStep {
        let Some(idx) = self.position(id) else {
            return FallStep::Gone;
        };
        let live = &mut self.live[idx];
        live.object.vertical_position += self.speed;
        let pos = live.object.vertical_position;
        if pos > self.play_height {
            let mut gone = self.live.swap_remove(idx);
            gone.object.resolve();
            scheduler.cancel(gone.timer);
            FallStep::Expired(pos)
        } else {
            FallStep::Moved(pos)
        }
    }

    /// Claims the object and stops its fall timer so it can never expire.
    pub fn claim(&mut self, id: ObjectId, scheduler: &mut Scheduler) -> Result<FallingObject, GameError> {
        let idx = self.position(id).ok_or(GameError::DoubleResolution(id))?;
        let mut live = self.live.swap_remove(idx);
        scheduler.cancel(live.timer);
        if !live.object.resolve() {
            return Err(GameError::DoubleResolution(id));
        }
        Ok(live.object)
    }

    pub fn clear(&mut self, scheduler: &mut Scheduler) {
        for live in self.live.drain(..) {
            scheduler.cancel(live.timer);
        }
    }
}
