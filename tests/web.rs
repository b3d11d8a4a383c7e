// Browser tests for the exported entry points (`wasm-pack test --headless
// --firefox`). They mount on a fixture page and drive the game through the
// same functions the host page calls.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use water_quest::{difficulty_keys, mount, reset_game, start_game};
use web_sys::Document;

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r#"
    <section id="start-screen" class="screen active">
      <select id="difficulty"><option value="hard" selected>Hard</option></select>
      <button id="start-btn">Start</button>
    </section>
    <section id="game-screen" class="screen">
      <strong id="score">0</strong><span id="goal"></span><strong id="time"></strong>
      <button id="reset-btn">Reset</button>
      <div id="message"></div>
      <div id="game-area" style="height: 300px"></div>
    </section>
    <section id="end-screen" class="screen">
      <h2 id="end-title"></h2><strong id="final-score"></strong><p id="end-text"></p>
      <button id="play-again-btn">Play again</button>
    </section>"#;

/// The session is mounted once per page; later calls reuse it.
fn mounted() -> Document {
    let doc = web_sys::window().unwrap().document().unwrap();
    if doc.get_element_by_id("start-screen").is_none() {
        doc.body().unwrap().set_inner_html(FIXTURE);
    }
    mount().unwrap();
    doc
}

fn is_active(doc: &Document, id: &str) -> bool {
    doc.get_element_by_id(id).unwrap().class_list().contains("active")
}

fn text(doc: &Document, id: &str) -> String {
    doc.get_element_by_id(id).unwrap().text_content().unwrap_or_default()
}

#[wasm_bindgen_test]
fn difficulty_keys_lists_builtin_presets() {
    mounted();
    let keys: Vec<String> = difficulty_keys().iter().filter_map(|k| k.as_string()).collect();
    assert_eq!(keys, ["easy", "normal", "hard"]);
}

#[wasm_bindgen_test]
fn start_and_reset_switch_screens() {
    let doc = mounted();
    start_game("hard").unwrap();
    assert!(is_active(&doc, "game-screen"));
    assert_eq!(text(&doc, "goal"), "Goal: 150");
    assert_eq!(text(&doc, "time"), "25");
    assert!(start_game("easy").is_err());

    reset_game();
    assert!(is_active(&doc, "start-screen"));
    assert!(!is_active(&doc, "game-screen"));
    assert_eq!(text(&doc, "score"), "0");
}

#[wasm_bindgen_test]
fn start_button_uses_selected_difficulty() {
    let doc = mounted();
    let button: web_sys::HtmlElement = wasm_bindgen::JsCast::dyn_into(
        doc.get_element_by_id("start-btn").unwrap(),
    )
    .unwrap();
    button.click();
    assert!(is_active(&doc, "game-screen"));
    assert_eq!(text(&doc, "time"), "25");
    reset_game();
    assert!(is_active(&doc, "start-screen"));
}
