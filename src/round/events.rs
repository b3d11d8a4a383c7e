use crate::difficulty::DifficultySettings;

use super::scoring::RoundResult;
use super::{ObjectId, ObjectKind, Resolution};

/// Everything the session reports to the outside world.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    RoundStarted {
        difficulty: String,
        settings: DifficultySettings,
    },
    Tick(u32),
    ScoreChanged {
        score: i64,
        delta: i64,
    },
    Message {
        key: &'static str,
        text: String,
    },
    ObjectSpawned {
        id: ObjectId,
        kind: ObjectKind,
        spawn_x: f64,
    },
    ObjectFell {
        id: ObjectId,
        position: f64,
    },
    ObjectResolved {
        id: ObjectId,
        resolution: Resolution,
    },
    RoundEnded(RoundResult),
    Reset,
}

/// Subscriber interface for presentation code (DOM, audio, confetti).
///
/// All methods default to no-ops; observers only receive events and never
/// get mutable access to the session.
pub trait RoundObserver {
    fn on_round_started(&mut self, _difficulty: &str, _settings: &DifficultySettings) {}
    fn on_tick(&mut self, _remaining_seconds: u32) {}
    fn on_score_changed(&mut self, _score: i64, _delta: i64) {}
    fn on_message(&mut self, _key: &'static str, _text: &str) {}
    fn on_object_spawned(&mut self, _id: ObjectId, _kind: ObjectKind, _spawn_x: f64) {}
    fn on_object_fell(&mut self, _id: ObjectId, _position: f64) {}
    fn on_object_resolved(&mut self, _id: ObjectId, _resolution: Resolution) {}
    fn on_round_ended(&mut self, _result: &RoundResult) {}
    fn on_reset(&mut self) {}
}

impl GameEvent {
    pub fn notify(&self, observer: &mut dyn RoundObserver) {
        match self {
            GameEvent::RoundStarted {
                difficulty,
                settings,
            } => observer.on_round_started(difficulty, settings),
            GameEvent::Tick(remaining) => observer.on_tick(*remaining),
            GameEvent::ScoreChanged { score, delta } => observer.on_score_changed(*score, *delta),
            GameEvent::Message { key, text } => observer.on_message(*key, text),
            GameEvent::ObjectSpawned { id, kind, spawn_x } => {
                observer.on_object_spawned(*id, *kind, *spawn_x)
            }
            GameEvent::ObjectFell { id, position } => observer.on_object_fell(*id, *position),
            GameEvent::ObjectResolved { id, resolution } => {
                observer.on_object_resolved(*id, *resolution)
            }
            GameEvent::RoundEnded(result) => observer.on_round_ended(result),
            GameEvent::Reset => observer.on_reset(),
        }
    }
}
