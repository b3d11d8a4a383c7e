//! Water Quest core crate.
//!
//! A timed catching game: clean drops score, polluted drops cost points,
//! streaks pay a bonus and some difficulties end early once a target score is
//! reached. The round core (`round`) is plain Rust driven by timestamps so it
//! runs and tests natively; the `web` module wires it to the DOM, Web Audio
//! and the animation-frame loop when built for the browser.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod difficulty;
pub mod error;
pub mod round;
mod web;

pub use config::GameConfig;
pub use difficulty::{DifficultyCatalog, DifficultyEntry, DifficultySettings};
pub use error::GameError;
pub use round::{
    GameEvent, GameSession, ObjectId, ObjectKind, Outcome, Resolution, RoundObserver, RoundResult,
    RoundStatus,
};
pub use web::{difficulty_keys, mount, reset_game, start_game};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // A logger is already installed (e.g. by the host page); keep it.
        return;
    }
    log::info!("water quest {} loaded", env!("CARGO_PKG_VERSION"));
}

/// Browser monotonic clock in milliseconds; 0 outside a window context.
pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
