//! One game session: owns every round component and drives them from a single
//! cooperative timeline. The browser calls [`GameSession::advance`] from its
//! animation-frame loop; tests call it with synthetic timestamps.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::difficulty::{DifficultyCatalog, DifficultySettings};
use crate::error::GameError;

use super::clock::{ClockSignal, RoundClock};
use super::events::{GameEvent, RoundObserver};
use super::fall::{FallSimulator, FallStep, FallingObject};
use super::scheduler::{RoundToken, Scheduler, Task, TimerId};
use super::scoring::{ClaimOutcome, RoundResult, ScoringEngine};
use super::spawner::Spawner;
use super::{ObjectId, Resolution, RoundStatus};

pub struct GameSession<R: Rng = SmallRng> {
    config: GameConfig,
    catalog: DifficultyCatalog,
    engine: ScoringEngine,
    clock: RoundClock,
    spawner: Spawner,
    fall: FallSimulator,
    scheduler: Scheduler,
    rng: R,
    observers: Vec<Box<dyn RoundObserver>>,
    token: RoundToken,
    difficulty: Option<String>,
    /// Armed once the target score is reached; the round ends when it fires.
    pending_finish: Option<TimerId>,
}

impl GameSession<SmallRng> {
    pub fn new(config: GameConfig, catalog: DifficultyCatalog) -> Self {
        Self::with_rng(config, catalog, SmallRng::from_entropy())
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng(config: GameConfig, catalog: DifficultyCatalog, rng: R) -> Self {
        Self {
            spawner: Spawner::new(config.spawn_top, config.spawn_x_range),
            fall: FallSimulator::new(config.default_play_height),
            config,
            catalog,
            engine: ScoringEngine::new(),
            clock: RoundClock::new(),
            scheduler: Scheduler::new(),
            rng,
            observers: Vec::new(),
            token: RoundToken::default(),
            difficulty: None,
            pending_finish: None,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn RoundObserver>) {
        self.observers.push(observer);
    }

    fn emit(&mut self, event: GameEvent) {
        for observer in self.observers.iter_mut() {
            event.notify(observer.as_mut());
        }
    }

    // --- Accessors -----------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &DifficultyCatalog {
        &self.catalog
    }

    pub fn status(&self) -> RoundStatus {
        self.engine.status()
    }

    pub fn score(&self) -> i64 {
        self.engine.score()
    }

    pub fn streak(&self) -> u32 {
        self.engine.streak()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.engine.state().map_or(0, |r| r.remaining_seconds)
    }

    pub fn settings(&self) -> Option<&DifficultySettings> {
        self.engine.settings()
    }

    /// Catalog key actually used for the current round (after fallback).
    pub fn difficulty(&self) -> Option<&str> {
        self.difficulty.as_deref()
    }

    pub fn result(&self) -> Option<&RoundResult> {
        self.engine.result()
    }

    pub fn object(&self, id: ObjectId) -> Option<&FallingObject> {
        self.fall.get(id)
    }

    pub fn live_objects(&self) -> usize {
        self.fall.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// True during the grace delay after an early win.
    pub fn is_finishing(&self) -> bool {
        self.pending_finish.is_some()
    }

    pub fn set_play_area_height(&mut self, height: f64) {
        self.fall.set_play_height(height);
    }

    // --- Lifecycle -----------------------------------------------------------

    /// Starts a round with the given difficulty key; unknown keys fall back to
    /// the catalog default.
    pub fn start_round(&mut self, difficulty: &str, now: f64) -> Result<(), GameError> {
        let status = self.engine.status();
        if status == RoundStatus::Running {
            return Err(GameError::invalid_state("start_round", status));
        }
        self.teardown();
        let entry = self.catalog.resolve(difficulty).clone();
        let settings = entry.settings;
        self.engine.start_round(settings)?;

        self.token = self.scheduler.next_round();
        self.fall.set_speed(settings.fall_speed_per_tick);
        self.clock.start(
            settings.round_duration_seconds,
            &mut self.scheduler,
            now,
            self.config.clock_period_ms,
            self.token,
        );
        self.spawner.start(
            settings.spawn_interval_millis,
            self.config.clean_probability,
            &mut self.scheduler,
            now,
            self.token,
        );
        self.difficulty = Some(entry.key.clone());
        log::info!(
            "round started: difficulty `{}`, {}s, target {:?}",
            entry.key,
            settings.round_duration_seconds,
            settings.target_score
        );
        self.emit(GameEvent::RoundStarted {
            difficulty: entry.key,
            settings,
        });
        Ok(())
    }

    /// Resolves a falling object claimed by the player.
    ///
    /// Timers due at or before `now` run first: a click that lands after the
    /// clock expired, or after the object left the play area, is rejected
    /// even if no animation frame has run since.
    pub fn claim(&mut self, id: ObjectId, now: f64) -> Result<ClaimOutcome, GameError> {
        self.advance(now);
        let status = self.engine.status();
        if status != RoundStatus::Running {
            return Err(GameError::invalid_state("claim", status));
        }
        let object = self.fall.claim(id, &mut self.scheduler)?;
        let outcome = self.engine.resolve_claim(object.kind)?;

        self.emit(GameEvent::ObjectResolved {
            id,
            resolution: Resolution::claimed(object.kind),
        });
        self.emit(GameEvent::ScoreChanged {
            score: outcome.score,
            delta: outcome.delta,
        });
        self.emit(GameEvent::Message {
            key: outcome.message.key(),
            text: outcome.text.clone(),
        });
        if outcome.target_reached {
            self.begin_early_finish(now);
        }
        Ok(outcome)
    }

    /// Claims keep scoring during the grace delay; only the first arms it.
    fn begin_early_finish(&mut self, now: f64) {
        if self.pending_finish.is_some() {
            return;
        }
        log::info!("target reached with {} points; ending after grace delay", self.engine.score());
        self.spawner.stop(&mut self.scheduler);
        self.pending_finish = Some(self.scheduler.schedule_once(
            now,
            self.config.early_win_grace_ms,
            Task::FinishRound,
            self.token,
        ));
    }

    /// Processes every timer due at or before `now`, one at a time.
    pub fn advance(&mut self, now: f64) {
        while let Some(fired) = self.scheduler.pop_due(now) {
            if fired.token != self.token {
                // Cancellation removes stale timers; this only guards the invariant.
                log::debug!("dropping timer from stale round: {:?}", fired.task);
                self.scheduler.cancel(fired.id);
                continue;
            }
            self.run(fired.task, fired.due_ms);
        }
    }

    fn run(&mut self, task: Task, at: f64) {
        match task {
            Task::ClockTick => self.on_clock_tick(),
            Task::Spawn => {
                if let Some(object) = self.spawner.spawn(&mut self.rng) {
                    let (id, kind, spawn_x) = (object.id, object.kind, object.spawn_x);
                    self.fall.insert(object, &mut self.scheduler, at, self.config.fall_tick_ms, self.token);
                    self.emit(GameEvent::ObjectSpawned { id, kind, spawn_x });
                }
            }
            Task::Fall(id) => match self.fall.step(id, &mut self.scheduler) {
                FallStep::Moved(position) => self.emit(GameEvent::ObjectFell { id, position }),
                FallStep::Expired(position) => {
                    self.emit(GameEvent::ObjectFell { id, position });
                    self.emit(GameEvent::ObjectResolved {
                        id,
                        resolution: Resolution::Expired,
                    });
                }
                FallStep::Gone => {}
            },
            Task::FinishRound => {
                self.pending_finish = None;
                self.finish_round();
            }
        }
    }

    fn on_clock_tick(&mut self) {
        match self.clock.tick(&mut self.scheduler) {
            Some(ClockSignal::Tick(remaining)) => {
                if let Err(err) = self.engine.on_tick(remaining) {
                    log::debug!("ignoring clock tick: {err}");
                    return;
                }
                self.emit(GameEvent::Tick(remaining));
            }
            Some(ClockSignal::Expired) => {
                if let Err(err) = self.engine.on_tick(0) {
                    log::debug!("ignoring clock expiry tick: {err}");
                }
                self.engine.on_time_expired();
                self.emit(GameEvent::Tick(0));
                self.finish_round();
            }
            None => {}
        }
    }

    /// Single end path for both time expiry and the early-win grace timer.
    fn finish_round(&mut self) {
        if self.engine.result().is_some() {
            return;
        }
        self.teardown();
        match self.engine.end_round() {
            Ok(result) => {
                log::info!(
                    "round ended: score {}, outcome {:?}, {} communities helped",
                    result.final_score,
                    result.outcome,
                    result.communities_helped
                );
                self.emit(GameEvent::RoundEnded(result));
            }
            Err(err) => log::warn!("could not end round: {err}"),
        }
    }

    /// Cancels every timer of the current round and discards falling objects.
    fn teardown(&mut self) {
        self.scheduler.cancel_round(self.token);
        self.clock.stop(&mut self.scheduler);
        self.spawner.stop(&mut self.scheduler);
        self.fall.clear(&mut self.scheduler);
        self.pending_finish = None;
    }

    /// Abandons the current round (including a pending grace delay) and
    /// returns to `NotStarted`.
    pub fn reset(&mut self) {
        self.teardown();
        self.engine.reset();
        self.difficulty = None;
        log::info!("game reset");
        self.emit(GameEvent::Reset);
    }
}
