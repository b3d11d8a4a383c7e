use crate::difficulty::DifficultySettings;

use super::scoring::{Outcome, RoundResult};

/// Feedback message selected by a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
    StreakBonus,
    Penalty,
    IncredibleImpact,
    ChangingLives,
    KeepFlowing,
    GreatJob,
    NiceRipple,
}

impl MessageKey {
    /// Tiered encouragement for a non-bonus clean claim, keyed on the new score.
    pub fn encouragement(score: i64) -> Self {
        match score {
            s if s >= 100 => MessageKey::IncredibleImpact,
            s if s >= 70 => MessageKey::ChangingLives,
            s if s >= 40 => MessageKey::KeepFlowing,
            s if s >= 20 => MessageKey::GreatJob,
            _ => MessageKey::NiceRipple,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            MessageKey::StreakBonus => "streak-bonus",
            MessageKey::Penalty => "penalty",
            MessageKey::IncredibleImpact => "incredible-impact",
            MessageKey::ChangingLives => "changing-lives",
            MessageKey::KeepFlowing => "keep-flowing",
            MessageKey::GreatJob => "great-job",
            MessageKey::NiceRipple => "nice-ripple",
        }
    }

    pub fn text(self, settings: &DifficultySettings) -> String {
        match self {
            MessageKey::StreakBonus => format!("💦 Clean Streak! +{} Bonus!", settings.streak_bonus),
            MessageKey::Penalty => format!("⚠️ Polluted drop! {}", settings.polluted_penalty),
            MessageKey::IncredibleImpact => "🌍 Incredible impact!".to_string(),
            MessageKey::ChangingLives => "🚰 You're changing lives!".to_string(),
            MessageKey::KeepFlowing => "💧 Keep the flow going!".to_string(),
            MessageKey::GreatJob => "✨ Great job!".to_string(),
            MessageKey::NiceRipple => "Nice ripple!".to_string(),
        }
    }
}

/// End-screen copy for a finished round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndSummary {
    pub headline: &'static str,
    pub text: String,
    /// Whether the presentation should celebrate (confetti, fanfare).
    pub celebrate: bool,
}

const COMPLETE: &str = "Quest Complete!";
const RETRY: &str = "Keep Trying!";

impl EndSummary {
    pub fn for_result(result: &RoundResult, target_score: Option<i64>) -> Self {
        let n = result.communities_helped;
        match result.outcome {
            Outcome::TargetReached => Self {
                headline: COMPLETE,
                text: format!("You reached the goal and helped bring clean water to {n} communities!"),
                celebrate: true,
            },
            Outcome::OpenEndedComplete if result.final_score > 0 => Self {
                headline: COMPLETE,
                text: format!("You helped bring clean water to {n} communities!"),
                celebrate: true,
            },
            Outcome::OpenEndedComplete => Self {
                headline: RETRY,
                text: "No communities reached yet. Try again!".to_string(),
                celebrate: false,
            },
            Outcome::TimeExpiredBelowTarget => Self {
                headline: RETRY,
                text: format!(
                    "You helped {n} communities. Reach {} points to complete the quest!",
                    target_score.unwrap_or_default()
                ),
                celebrate: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::{EASY, HARD};

    #[test]
    fn encouragement_tiers() {
        assert_eq!(MessageKey::encouragement(-5), MessageKey::NiceRipple);
        assert_eq!(MessageKey::encouragement(19), MessageKey::NiceRipple);
        assert_eq!(MessageKey::encouragement(20), MessageKey::GreatJob);
        assert_eq!(MessageKey::encouragement(40), MessageKey::KeepFlowing);
        assert_eq!(MessageKey::encouragement(69), MessageKey::KeepFlowing);
        assert_eq!(MessageKey::encouragement(70), MessageKey::ChangingLives);
        assert_eq!(MessageKey::encouragement(100), MessageKey::IncredibleImpact);
        assert_eq!(MessageKey::IncredibleImpact.key(), "incredible-impact");
    }

    #[test]
    fn texts_use_difficulty_values() {
        assert_eq!(MessageKey::StreakBonus.text(&EASY), "💦 Clean Streak! +20 Bonus!");
        assert_eq!(MessageKey::Penalty.text(&EASY), "⚠️ Polluted drop! -5");
        assert_eq!(MessageKey::Penalty.text(&HARD), "⚠️ Polluted drop! -10");
    }

    #[test]
    fn summary_celebrates_only_wins() {
        let lost = RoundResult::new(90, Some(120));
        let s = EndSummary::for_result(&lost, Some(120));
        assert_eq!(s.headline, "Keep Trying!");
        assert!(s.text.contains("Reach 120 points"));
        assert!(!s.celebrate);

        let open = RoundResult::new(70, None);
        let s = EndSummary::for_result(&open, None);
        assert_eq!(s.text, "You helped bring clean water to 7 communities!");
        assert!(s.celebrate);

        let zero = RoundResult::new(-15, None);
        assert!(!EndSummary::for_result(&zero, None).celebrate);
    }
}
