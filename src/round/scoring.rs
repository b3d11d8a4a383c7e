//! Scoring engine: the only owner of round state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultySettings;
use crate::error::GameError;

use super::messages::MessageKey;
use super::{ObjectKind, RoundStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outcome {
    TargetReached,
    TimeExpiredBelowTarget,
    OpenEndedComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoundResult {
    pub final_score: i64,
    pub outcome: Outcome,
    pub communities_helped: u32,
}

impl RoundResult {
    pub fn new(final_score: i64, target_score: Option<i64>) -> Self {
        let outcome = match target_score {
            Some(target) if final_score >= target => Outcome::TargetReached,
            Some(_) => Outcome::TimeExpiredBelowTarget,
            None => Outcome::OpenEndedComplete,
        };
        let communities_helped = final_score.div_euclid(10).clamp(0, u32::MAX as i64) as u32;
        Self {
            final_score,
            outcome,
            communities_helped,
        }
    }

    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Live state of the current round.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    pub score: i64,
    pub remaining_seconds: u32,
    pub streak: u32,
    pub settings: DifficultySettings,
    pub status: RoundStatus,
}

/// Effect of one claim, as reported to the session.
#[derive(Clone, Debug, PartialEq)]
pub struct ClaimOutcome {
    pub kind: ObjectKind,
    /// Points applied by this claim, bonus included.
    pub delta: i64,
    pub score: i64,
    pub streak: u32,
    pub message: MessageKey,
    pub text: String,
    /// The target score is set and has been reached.
    pub target_reached: bool,
}

#[derive(Debug, Default)]
pub struct ScoringEngine {
    round: Option<RoundState>,
    result: Option<RoundResult>,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RoundStatus {
        self.round.as_ref().map(|r| r.status).unwrap_or_default()
    }

    pub fn state(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn score(&self) -> i64 {
        self.round.as_ref().map_or(0, |r| r.score)
    }

    pub fn streak(&self) -> u32 {
        self.round.as_ref().map_or(0, |r| r.streak)
    }

    pub fn settings(&self) -> Option<&DifficultySettings> {
        self.round.as_ref().map(|r| &r.settings)
    }

    /// Cached result once the round has been finalized.
    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    pub fn start_round(&mut self, settings: DifficultySettings) -> Result<(), GameError> {
        let status = self.status();
        if status == RoundStatus::Running {
            return Err(GameError::invalid_state("start_round", status));
        }
        self.result = None;
        self.round = Some(RoundState {
            score: 0,
            remaining_seconds: settings.round_duration_seconds,
            streak: 0,
            settings,
            status: RoundStatus::Running,
        });
        Ok(())
    }

    fn running_mut(&mut self, operation: &'static str) -> Result<&mut RoundState, GameError> {
        let status = self.status();
        match self.round.as_mut() {
            Some(round) if round.status == RoundStatus::Running => Ok(round),
            _ => Err(GameError::invalid_state(operation, status)),
        }
    }

    pub fn resolve_claim(&mut self, kind: ObjectKind) -> Result<ClaimOutcome, GameError> {
        let round = self.running_mut("resolve_claim")?;
        let s = round.settings;
        let before = round.score;
        let message = match kind {
            ObjectKind::Clean => {
                round.score += s.clean_points;
                round.streak += 1;
                if round.streak >= s.streak_threshold {
                    round.score += s.streak_bonus;
                    round.streak = 0;
                    MessageKey::StreakBonus
                } else {
                    MessageKey::encouragement(round.score)
                }
            }
            ObjectKind::Polluted => {
                round.streak = 0;
                round.score += s.polluted_penalty;
                MessageKey::Penalty
            }
        };
        Ok(ClaimOutcome {
            kind,
            delta: round.score - before,
            score: round.score,
            streak: round.streak,
            message,
            text: message.text(&s),
            target_reached: s.target_score.is_some_and(|t| round.score >= t),
        })
    }

    /// Mirrors a clock tick; remaining time must strictly decrease.
    pub fn on_tick(&mut self, remaining_seconds: u32) -> Result<(), GameError> {
        let round = self.running_mut("on_tick")?;
        if remaining_seconds >= round.remaining_seconds {
            return Err(GameError::InvalidState {
                operation: "on_tick",
                status: RoundStatus::Running,
            });
        }
        round.remaining_seconds = remaining_seconds;
        if remaining_seconds == 0 {
            round.status = RoundStatus::Ended;
        }
        Ok(())
    }

    pub fn on_time_expired(&mut self) {
        if let Some(round) = self.round.as_mut() {
            if round.status != RoundStatus::Ended {
                round.remaining_seconds = 0;
                round.status = RoundStatus::Ended;
            }
        }
    }

    /// Idempotent: the first call finalizes, later calls return the same result.
    pub fn end_round(&mut self) -> Result<RoundResult, GameError> {
        if let Some(result) = self.result {
            return Ok(result);
        }
        let round = self
            .round
            .as_mut()
            .ok_or(GameError::invalid_state("end_round", RoundStatus::NotStarted))?;
        round.status = RoundStatus::Ended;
        let result = RoundResult::new(round.score, round.settings.target_score);
        self.result = Some(result);
        Ok(result)
    }

    /// Discards the round; status goes back to `NotStarted`.
    pub fn reset(&mut self) {
        self.round = None;
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::{EASY, NORMAL};

    fn running(settings: DifficultySettings) -> ScoringEngine {
        let mut engine = ScoringEngine::new();
        engine.start_round(settings).unwrap();
        engine
    }

    #[test]
    fn easy_scenario_bonus_on_third_clean() {
        let mut engine = running(EASY);
        engine.resolve_claim(ObjectKind::Clean).unwrap();
        engine.resolve_claim(ObjectKind::Clean).unwrap();
        let third = engine.resolve_claim(ObjectKind::Clean).unwrap();
        assert_eq!(third.delta, 30);
        assert_eq!(third.message, MessageKey::StreakBonus);
        assert_eq!((engine.score(), engine.streak()), (50, 0));
        engine.resolve_claim(ObjectKind::Clean).unwrap();
        let fifth = engine.resolve_claim(ObjectKind::Clean).unwrap();
        assert_eq!(fifth.message, MessageKey::ChangingLives);
        assert_eq!((engine.score(), engine.streak()), (70, 2));
    }

    #[test]
    fn uninterrupted_clean_run_formula() {
        for threshold in 2..6u32 {
            let mut s = EASY;
            s.streak_threshold = threshold;
            let mut engine = running(s);
            for n in 1..=20i64 {
                engine.resolve_claim(ObjectKind::Clean).unwrap();
                let bonuses = n / threshold as i64;
                assert_eq!(engine.score(), n * s.clean_points + bonuses * s.streak_bonus);
                assert_eq!(engine.streak() as i64, n % threshold as i64);
            }
        }
    }

    #[test]
    fn polluted_resets_streak_and_applies_penalty() {
        let mut engine = running(EASY);
        engine.resolve_claim(ObjectKind::Clean).unwrap();
        engine.resolve_claim(ObjectKind::Clean).unwrap();
        let hit = engine.resolve_claim(ObjectKind::Polluted).unwrap();
        assert_eq!(hit.delta, -5);
        assert_eq!(hit.message, MessageKey::Penalty);
        assert_eq!((engine.score(), engine.streak()), (15, 0));
    }

    #[test]
    fn score_may_go_negative() {
        let mut engine = running(EASY);
        engine.resolve_claim(ObjectKind::Polluted).unwrap();
        engine.resolve_claim(ObjectKind::Polluted).unwrap();
        assert_eq!(engine.score(), -10);
        let result = engine.end_round().unwrap();
        assert_eq!(result.communities_helped, 0);
        assert_eq!(result.outcome, Outcome::OpenEndedComplete);
    }

    #[test]
    fn target_scenario_reaches_exactly_120() {
        let mut s = NORMAL;
        s.target_score = Some(120);
        let mut engine = running(s);
        // 50, 100, 95, 105, 115, 110, 120
        let seq = [
            ObjectKind::Clean, ObjectKind::Clean, ObjectKind::Clean,
            ObjectKind::Clean, ObjectKind::Clean, ObjectKind::Clean,
            ObjectKind::Polluted, ObjectKind::Clean, ObjectKind::Clean,
            ObjectKind::Polluted, ObjectKind::Clean,
        ];
        let mut last = None;
        for kind in seq {
            last = Some(engine.resolve_claim(kind).unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.score, 120);
        assert!(last.target_reached);
        let result = engine.end_round().unwrap();
        assert_eq!(result.outcome, Outcome::TargetReached);
        assert_eq!(result.communities_helped, 12);
    }

    #[test]
    fn time_expiry_below_target() {
        let mut engine = running(NORMAL);
        for _ in 0..6 {
            engine.resolve_claim(ObjectKind::Clean).unwrap();
        }
        assert_eq!(engine.score(), 100);
        engine.resolve_claim(ObjectKind::Polluted).unwrap();
        engine.resolve_claim(ObjectKind::Polluted).unwrap();
        assert_eq!(engine.score(), 90);
        engine.on_time_expired();
        assert_eq!(engine.status(), RoundStatus::Ended);
        let result = engine.end_round().unwrap();
        assert_eq!(result.outcome, Outcome::TimeExpiredBelowTarget);
        assert_eq!(result.communities_helped, 9);
    }

    #[test]
    fn lifecycle_transitions() {
        let mut engine = ScoringEngine::new();
        assert_eq!(engine.status(), RoundStatus::NotStarted);
        assert!(engine.resolve_claim(ObjectKind::Clean).is_err());
        assert!(engine.end_round().is_err());
        engine.start_round(EASY).unwrap();
        assert!(matches!(
            engine.start_round(EASY),
            Err(GameError::InvalidState { status: RoundStatus::Running, .. })
        ));
        engine.resolve_claim(ObjectKind::Clean).unwrap();
        let first = engine.end_round().unwrap();
        assert_eq!(engine.status(), RoundStatus::Ended);
        assert!(engine.resolve_claim(ObjectKind::Clean).is_err());
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.end_round().unwrap(), first);
        engine.start_round(EASY).unwrap();
        assert_eq!((engine.score(), engine.status()), (0, RoundStatus::Running));
        assert!(engine.result().is_none());
    }

    #[test]
    fn ticks_strictly_decrease() {
        let mut engine = running(EASY);
        engine.on_tick(29).unwrap();
        assert!(engine.on_tick(29).is_err());
        engine.on_tick(1).unwrap();
        engine.on_tick(0).unwrap();
        assert_eq!(engine.status(), RoundStatus::Ended);
        assert!(engine.on_tick(0).is_err());
    }

    #[test]
    fn communities_never_negative() {
        for (score, helped) in [(-101, 0), (-1, 0), (0, 0), (9, 0), (10, 1), (19, 1), (125, 12)] {
            assert_eq!(RoundResult::new(score, None).communities_helped, helped);
        }
    }
}
