//! Engine tunables that are not part of a difficulty preset.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing and layout constants shared by every round.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub clock_period_ms: f64,
    pub fall_tick_ms: f64,
    /// Delay between reaching the target score and the round actually ending.
    pub early_win_grace_ms: f64,
    pub clean_probability: f64,
    /// Initial vertical position of a new object (negative = above the play area).
    pub spawn_top: f64,
    /// Spawn x is drawn from `[0, spawn_x_range)` percent of the play area width.
    pub spawn_x_range: f64,
    /// Used until the presentation reports the real play-area height.
    pub default_play_height: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            clock_period_ms: 1_000.0,
            fall_tick_ms: 20.0,
            early_win_grace_ms: 300.0,
            clean_probability: 0.7,
            spawn_top: -60.0,
            spawn_x_range: 90.0,
            default_play_height: 500.0,
        }
    }
}
