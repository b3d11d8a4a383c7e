//! Difficulty presets and the catalog that maps a difficulty key to its settings.
//!
//! The built-in presets are plain constants in the same spirit as the level
//! descriptors of a board game: immutable data, no behavior. A catalog can
//! also be loaded from JSON (feature `serde_json`) and is validated on load.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Immutable per-difficulty rules for a round.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DifficultySettings {
    pub round_duration_seconds: u32,
    pub spawn_interval_millis: u32,
    pub fall_speed_per_tick: f64,
    pub clean_points: i64,
    /// Always negative: added to the score on a polluted claim.
    pub polluted_penalty: i64,
    pub streak_bonus: i64,
    pub streak_threshold: u32,
    /// `None` = open-ended scoring mode.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_score: Option<i64>,
}

impl DifficultySettings {
    /// Checks the field constraints; `key` only labels the error.
    pub fn validate(&self, key: &str) -> Result<(), GameError> {
        let invalid = |field| GameError::InvalidSettings {
            key: key.to_string(),
            field,
        };
        if self.round_duration_seconds == 0 {
            return Err(invalid("round_duration_seconds"));
        }
        if self.spawn_interval_millis == 0 {
            return Err(invalid("spawn_interval_millis"));
        }
        if !(self.fall_speed_per_tick.is_finite() && self.fall_speed_per_tick > 0.0) {
            return Err(invalid("fall_speed_per_tick"));
        }
        if self.clean_points <= 0 {
            return Err(invalid("clean_points"));
        }
        if self.polluted_penalty >= 0 {
            return Err(invalid("polluted_penalty"));
        }
        if self.streak_bonus <= 0 {
            return Err(invalid("streak_bonus"));
        }
        if self.streak_threshold <= 1 {
            return Err(invalid("streak_threshold"));
        }
        if matches!(self.target_score, Some(t) if t <= 0) {
            return Err(invalid("target_score"));
        }
        Ok(())
    }
}

// --- Built-in presets ---------------------------------------------------------

/// Open-ended 30 second round with a gentle spawn rate.
pub const EASY: DifficultySettings = DifficultySettings {
    round_duration_seconds: 30,
    spawn_interval_millis: 1_000,
    fall_speed_per_tick: 2.0,
    clean_points: 10,
    polluted_penalty: -5,
    streak_bonus: 20,
    streak_threshold: 3,
    target_score: None,
};

pub const NORMAL: DifficultySettings = DifficultySettings {
    round_duration_seconds: 30,
    spawn_interval_millis: 900,
    fall_speed_per_tick: 2.5,
    clean_points: 10,
    polluted_penalty: -5,
    streak_bonus: 20,
    streak_threshold: 3,
    target_score: Some(120),
};

pub const HARD: DifficultySettings = DifficultySettings {
    round_duration_seconds: 25,
    spawn_interval_millis: 700,
    fall_speed_per_tick: 3.5,
    clean_points: 10,
    polluted_penalty: -10,
    streak_bonus: 25,
    streak_threshold: 4,
    target_score: Some(150),
};

pub const DEFAULT_DIFFICULTY: &str = "normal";

/// Last resort so [`DifficultyCatalog::default_entry`] never panics.
static BUILTIN_DEFAULT: DifficultyEntry = DifficultyEntry {
    key: String::new(),
    label: String::new(),
    settings: NORMAL,
};

// --- Catalog -----------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DifficultyEntry {
    pub key: String,
    pub label: String,
    pub settings: DifficultySettings,
}

/// Always non-empty with a default key that names one of its entries; every
/// constructor (including deserialization) validates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCatalog"))]
pub struct DifficultyCatalog {
    #[cfg_attr(feature = "serde", serde(rename = "default"))]
    default_key: String,
    difficulties: Vec<DifficultyEntry>,
}

/// Unvalidated wire shape of a catalog.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawCatalog {
    #[serde(rename = "default")]
    default_key: String,
    difficulties: Vec<DifficultyEntry>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCatalog> for DifficultyCatalog {
    type Error = GameError;

    fn try_from(raw: RawCatalog) -> Result<Self, GameError> {
        Self::new(&raw.default_key, raw.difficulties)
    }
}

impl DifficultyCatalog {
    pub fn builtin() -> Self {
        let entry = |key: &str, label: &str, settings: &DifficultySettings| DifficultyEntry {
            key: key.to_string(),
            label: label.to_string(),
            settings: *settings,
        };
        Self {
            default_key: DEFAULT_DIFFICULTY.to_string(),
            difficulties: vec![
                entry("easy", "Easy", &EASY),
                entry("normal", "Normal", &NORMAL),
                entry("hard", "Hard", &HARD),
            ],
        }
    }

    /// Builds a catalog, validating every entry and the default key.
    pub fn new(default_key: &str, difficulties: Vec<DifficultyEntry>) -> Result<Self, GameError> {
        let catalog = Self {
            default_key: default_key.to_string(),
            difficulties,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let catalog: Self = serde_json::from_str(json)?;
        log::info!(
            "loaded difficulty catalog with {} entries (default `{}`)",
            catalog.difficulties.len(),
            catalog.default_key
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), GameError> {
        for e in &self.difficulties {
            e.settings.validate(&e.key)?;
        }
        if self.get(&self.default_key).is_none() {
            return Err(GameError::UnknownDifficulty(self.default_key.clone()));
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&DifficultyEntry> {
        self.difficulties.iter().find(|e| e.key == key)
    }

    /// Strict lookup; see [`DifficultyCatalog::resolve`] for the tolerant one.
    pub fn lookup(&self, key: &str) -> Result<&DifficultyEntry, GameError> {
        self.get(key)
            .ok_or_else(|| GameError::UnknownDifficulty(key.to_string()))
    }

    /// Looks up `key`, falling back to the default entry when it is unknown.
    pub fn resolve(&self, key: &str) -> &DifficultyEntry {
        match self.lookup(key) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("{err}; falling back to `{}`", self.default_key);
                self.default_entry()
            }
        }
    }

    pub fn default_entry(&self) -> &DifficultyEntry {
        // Construction guarantees the default key is present.
        self.get(&self.default_key)
            .or_else(|| self.difficulties.first())
            .unwrap_or(&BUILTIN_DEFAULT)
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.difficulties.iter().map(|e| e.key.as_str())
    }

    pub fn entries(&self) -> &[DifficultyEntry] {
        &self.difficulties
    }
}

impl Default for DifficultyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
