//! Confetti on a winning round, via the page's `confetti()` global
//! (canvas-confetti). Missing library = no confetti, never an error.

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::difficulty::DifficultySettings;
use crate::round::{EndSummary, RoundObserver, RoundResult};

use super::dom::after;

const DURATION_MS: i32 = 3_000;
const BURST_EVERY_MS: i32 = 250;
const MAX_PARTICLES: f64 = 50.0;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = confetti, catch)]
    fn confetti_js(options: &JsValue) -> Result<JsValue, JsValue>;
}

fn set(obj: &Object, key: &str, value: f64) -> Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), &JsValue::from_f64(value))?;
    Ok(())
}

fn burst(particles: f64) -> Result<(), JsValue> {
    let origin = Object::new();
    set(&origin, "x", rand::random::<f64>())?;
    set(&origin, "y", rand::random::<f64>() - 0.2)?;
    let options = Object::new();
    set(&options, "particleCount", particles)?;
    set(&options, "startVelocity", 25.0)?;
    set(&options, "spread", 360.0)?;
    set(&options, "ticks", 60.0)?;
    set(&options, "zIndex", 1_000.0)?;
    Reflect::set(&options, &JsValue::from_str("origin"), &origin)?;
    confetti_js(&options)?;
    Ok(())
}

/// Bursts shrink linearly over the celebration window.
fn launch() {
    for step in 0..DURATION_MS / BURST_EVERY_MS {
        let elapsed = step * BURST_EVERY_MS;
        let particles = MAX_PARTICLES * f64::from(DURATION_MS - elapsed) / f64::from(DURATION_MS);
        after(elapsed, move || {
            if let Err(err) = burst(particles) {
                log::debug!("confetti unavailable: {err:?}");
            }
        });
    }
}

pub struct Celebration {
    target_score: Option<i64>,
}

impl Celebration {
    pub fn new() -> Self {
        Self { target_score: None }
    }
}

impl RoundObserver for Celebration {
    fn on_round_started(&mut self, _difficulty: &str, settings: &DifficultySettings) {
        self.target_score = settings.target_score;
    }

    fn on_round_ended(&mut self, result: &RoundResult) {
        if EndSummary::for_result(result, self.target_score).celebrate {
            launch();
        }
    }
}
