//! Browser glue: owns the thread-local session, installs button handlers and
//! runs the animation-frame loop that drives [`GameSession::advance`].
//!
//! Everything visual or audible lives in observers (`dom`, `audio`,
//! `confetti`); this module only forwards user input into the session.

mod audio;
mod confetti;
mod dom;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlSelectElement, window};

use crate::config::GameConfig;
use crate::difficulty::DifficultyCatalog;
use crate::error::GameError;
use crate::round::{GameSession, ObjectId};

use audio::AudioCues;
use confetti::Celebration;
use dom::DomPresenter;

thread_local! {
    static SESSION: RefCell<Option<GameSession>> = const { RefCell::new(None) };
}

fn to_js(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Runs `f` against the mounted session, if any.
fn with_session<T>(f: impl FnOnce(&mut GameSession) -> T) -> Option<T> {
    SESSION.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Builds the session, subscribes the presentation observers and starts the
/// frame loop. Calling it again is a no-op.
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    if SESSION.with(|cell| cell.borrow().is_some()) {
        return Ok(());
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let dom = DomPresenter::new(&doc)?;
    let mut session = GameSession::new(GameConfig::default(), DifficultyCatalog::builtin());
    session.set_play_area_height(dom.play_area_height());
    session.subscribe(Box::new(dom));
    session.subscribe(Box::new(AudioCues::new()));
    session.subscribe(Box::new(Celebration::new()));
    SESSION.with(|cell| cell.replace(Some(session)));

    install_controls(&doc)?;
    start_frame_loop(doc);
    log::info!("water quest mounted");
    Ok(())
}

#[wasm_bindgen]
pub fn start_game(difficulty: &str) -> Result<(), JsValue> {
    let now = crate::performance_now();
    with_session(|s| s.start_round(difficulty, now))
        .ok_or_else(|| JsValue::from_str("game not mounted"))?
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn reset_game() {
    with_session(|s| s.reset());
}

#[wasm_bindgen]
pub fn difficulty_keys() -> js_sys::Array {
    let keys = js_sys::Array::new();
    with_session(|s| {
        for key in s.catalog().keys() {
            keys.push(&JsValue::from_str(key));
        }
    });
    keys
}

/// Click on a falling object. Stale or duplicate clicks are expected (timer
/// races) and are only logged.
pub(crate) fn claim_object(id: ObjectId) {
    let now = crate::performance_now();
    if let Some(Err(err)) = with_session(|s| s.claim(id, now)) {
        log::debug!("ignored claim: {err}");
    }
}

fn selected_difficulty(doc: &Document) -> String {
    doc.get_element_by_id("difficulty")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        .map(|select| select.value())
        .unwrap_or_default()
}

fn install_controls(doc: &Document) -> Result<(), JsValue> {
    for id in ["start-btn", "play-again-btn"] {
        let Some(button) = doc.get_element_by_id(id) else {
            log::warn!("missing #{id}; start control not installed");
            continue;
        };
        let doc_start = doc.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            let difficulty = selected_difficulty(&doc_start);
            let now = crate::performance_now();
            if let Some(Err(err)) = with_session(|s| s.start_round(&difficulty, now)) {
                log::warn!("could not start round: {err}");
            }
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    if let Some(button) = doc.get_element_by_id("reset-btn") {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            reset_game();
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &FrameCallback) {
    if let (Some(w), Some(cb)) = (window(), callback.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn start_frame_loop(doc: Document) {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        // Play-area height is live: the layout may change between frames.
        let height = doc
            .get_element_by_id(dom::GAME_AREA_ID)
            .map(|el| el.client_height() as f64);
        with_session(|s| {
            if let Some(h) = height {
                s.set_play_area_height(h);
            }
            s.advance(ts);
        });
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}
