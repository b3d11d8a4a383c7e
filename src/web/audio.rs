//! Procedurally generated sound cues (Web Audio oscillators, no assets).

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

use crate::difficulty::DifficultySettings;
use crate::round::{EndSummary, ObjectId, Resolution, RoundObserver, RoundResult};

/// Seconds left at which the countdown starts beeping.
const COUNTDOWN_BEEPS_FROM: u32 = 5;

pub struct AudioCues {
    // Created lazily: browsers only allow audio after a user gesture, and the
    // first round always starts from a click.
    ctx: Option<AudioContext>,
    target_score: Option<i64>,
}

impl AudioCues {
    pub fn new() -> Self {
        Self {
            ctx: None,
            target_score: None,
        }
    }

    fn ensure_context(&mut self) {
        if self.ctx.is_none() {
            match AudioContext::new() {
                Ok(ctx) => self.ctx = Some(ctx),
                Err(err) => log::warn!("audio disabled: {err:?}"),
            }
        }
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    fn tone(&self, freq: f32, delay: f64, duration: f64, wave: OscillatorType, volume: f32) -> Result<(), JsValue> {
        let Some(ctx) = &self.ctx else {
            return Ok(());
        };
        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        osc.set_type(wave);
        osc.frequency().set_value(freq);
        let t0 = ctx.current_time() + delay;
        gain.gain().set_value_at_time(volume, t0)?;
        // Exponential ramps cannot reach zero.
        gain.gain().exponential_ramp_to_value_at_time(0.0001, t0 + duration)?;
        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        osc.start_with_when(t0)?;
        osc.stop_with_when(t0 + duration)?;
        Ok(())
    }

    fn sequence(&self, notes: &[f32], step: f64, wave: OscillatorType, volume: f32) -> Result<(), JsValue> {
        for (i, &freq) in notes.iter().enumerate() {
            self.tone(freq, i as f64 * step, step * 1.6, wave, volume)?;
        }
        Ok(())
    }

    fn play(&self, result: Result<(), JsValue>) {
        if let Err(err) = result {
            log::debug!("sound cue failed: {err:?}");
        }
    }
}

impl RoundObserver for AudioCues {
    fn on_round_started(&mut self, _difficulty: &str, settings: &DifficultySettings) {
        self.ensure_context();
        self.target_score = settings.target_score;
        self.play(self.sequence(&[392.0, 523.25], 0.08, OscillatorType::Triangle, 0.15));
    }

    fn on_tick(&mut self, remaining_seconds: u32) {
        if remaining_seconds > 0 && remaining_seconds <= COUNTDOWN_BEEPS_FROM {
            self.play(self.tone(880.0, 0.0, 0.08, OscillatorType::Square, 0.05));
        }
    }

    fn on_message(&mut self, key: &'static str, _text: &str) {
        // Bonus gets its own arpeggio on top of the clean splash.
        if key == "streak-bonus" {
            self.play(self.sequence(&[523.25, 659.25, 783.99, 1046.5], 0.06, OscillatorType::Triangle, 0.18));
        }
    }

    fn on_object_resolved(&mut self, _id: ObjectId, resolution: Resolution) {
        let cue = match resolution {
            Resolution::ClaimedClean => self.sequence(&[660.0, 880.0], 0.05, OscillatorType::Sine, 0.2),
            Resolution::ClaimedPolluted => self.tone(140.0, 0.0, 0.25, OscillatorType::Sawtooth, 0.12),
            Resolution::Expired => Ok(()),
        };
        self.play(cue);
    }

    fn on_round_ended(&mut self, result: &RoundResult) {
        let cue = if EndSummary::for_result(result, self.target_score).celebrate {
            self.sequence(&[523.25, 659.25, 783.99, 1046.5, 1318.5], 0.12, OscillatorType::Triangle, 0.2)
        } else {
            self.sequence(&[392.0, 329.63, 261.63], 0.18, OscillatorType::Sine, 0.15)
        };
        self.play(cue);
    }
}
