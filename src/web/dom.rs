//! DOM presentation: screens, HUD text, falling drops, ripples and score popups.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

use crate::difficulty::DifficultySettings;
use crate::round::{EndSummary, ObjectId, ObjectKind, Resolution, RoundObserver, RoundResult};

pub(super) const GAME_AREA_ID: &str = "game-area";
const RIPPLE_MS: i32 = 800;
const POPUP_MS: i32 = 800;

fn element(doc: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an HTML element")))
}

/// Runs `f` once after `ms` milliseconds.
pub(super) fn after(ms: i32, f: impl FnOnce() + 'static) {
    let cb = Closure::once_into_js(f);
    if let Some(w) = web_sys::window() {
        let _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms);
    }
}

struct DropView {
    el: HtmlElement,
    // Dropped together with the element so a late click cannot reach a freed closure.
    _on_click: Closure<dyn FnMut(MouseEvent)>,
}

pub struct DomPresenter {
    doc: Document,
    start_screen: HtmlElement,
    game_screen: HtmlElement,
    end_screen: HtmlElement,
    game_area: HtmlElement,
    score: HtmlElement,
    time: HtmlElement,
    message: HtmlElement,
    final_score: HtmlElement,
    end_title: HtmlElement,
    end_text: HtmlElement,
    goal: Option<HtmlElement>,
    drops: HashMap<ObjectId, DropView>,
    /// Where the last claimed drop was, so the score popup can appear there.
    last_claim: Option<(String, i32)>,
    target_score: Option<i64>,
}

impl DomPresenter {
    pub fn new(doc: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            doc: doc.clone(),
            start_screen: element(doc, "start-screen")?,
            game_screen: element(doc, "game-screen")?,
            end_screen: element(doc, "end-screen")?,
            game_area: element(doc, GAME_AREA_ID)?,
            score: element(doc, "score")?,
            time: element(doc, "time")?,
            message: element(doc, "message")?,
            final_score: element(doc, "final-score")?,
            end_title: element(doc, "end-title")?,
            end_text: element(doc, "end-text")?,
            goal: element(doc, "goal").ok(),
            drops: HashMap::new(),
            last_claim: None,
            target_score: None,
        })
    }

    pub fn play_area_height(&self) -> f64 {
        self.game_area.client_height() as f64
    }

    fn show_screen(&self, screen: &HtmlElement) {
        for s in [&self.start_screen, &self.game_screen, &self.end_screen] {
            let _ = s.class_list().remove_1("active");
        }
        let _ = screen.class_list().add_1("active");
    }

    fn clear_area(&mut self) {
        self.drops.clear();
        self.game_area.set_inner_html("");
        self.last_claim = None;
    }

    fn create_div(&self, class: &str) -> Result<HtmlElement, JsValue> {
        let el: HtmlElement = self.doc.create_element("div")?.dyn_into()?;
        el.set_class_name(class);
        Ok(el)
    }

    fn spawn_drop(&mut self, id: ObjectId, kind: ObjectKind, spawn_x: f64) -> Result<(), JsValue> {
        let el = self.create_div(&format!("drop {}", kind.as_str()))?;
        let style = el.style();
        style.set_property("left", &format!("{spawn_x}%"))?;
        style.set_property("top", "-60px")?;
        let on_click = Closure::wrap(Box::new(move |evt: MouseEvent| {
            evt.stop_propagation();
            super::claim_object(id);
        }) as Box<dyn FnMut(MouseEvent)>);
        el.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        self.game_area.append_child(&el)?;
        self.drops.insert(id, DropView { el, _on_click: on_click });
        Ok(())
    }

    /// Expanding ring at the drop position; removed after the CSS animation.
    fn ripple(&self, left: &str, top: i32) -> Result<(), JsValue> {
        let ripple = self.create_div("ripple")?;
        let style = ripple.style();
        style.set_property("left", left)?;
        style.set_property("top", &format!("{top}px"))?;
        self.game_area.append_child(&ripple)?;
        let el: Element = ripple.into();
        after(RIPPLE_MS, move || el.remove());
        Ok(())
    }

    fn popup(&self, delta: i64) -> Result<(), JsValue> {
        let Some((left, top)) = &self.last_claim else {
            return Ok(());
        };
        let class = if delta >= 0 { "popup positive" } else { "popup negative" };
        let popup = self.create_div(class)?;
        popup.set_text_content(Some(&format!("{delta:+}")));
        let style = popup.style();
        style.set_property("left", left)?;
        style.set_property("top", &format!("{top}px"))?;
        self.game_area.append_child(&popup)?;
        let el: Element = popup.into();
        after(POPUP_MS, move || el.remove());
        Ok(())
    }

    fn resolve_drop(&mut self, id: ObjectId, resolution: Resolution) -> Result<(), JsValue> {
        let Some(view) = self.drops.remove(&id) else {
            return Ok(());
        };
        let left = view.el.style().get_property_value("left")?;
        let top = view.el.offset_top();
        view.el.remove();
        match resolution {
            Resolution::ClaimedClean => {
                self.ripple(&left, top)?;
                self.last_claim = Some((left, top));
            }
            Resolution::ClaimedPolluted => self.last_claim = Some((left, top)),
            Resolution::Expired => {}
        }
        Ok(())
    }

    fn report(result: Result<(), JsValue>) {
        if let Err(err) = result {
            log::warn!("dom update failed: {err:?}");
        }
    }
}

impl RoundObserver for DomPresenter {
    fn on_round_started(&mut self, _difficulty: &str, settings: &DifficultySettings) {
        self.clear_area();
        self.target_score = settings.target_score;
        self.score.set_text_content(Some("0"));
        self.time
            .set_text_content(Some(&settings.round_duration_seconds.to_string()));
        self.message.set_text_content(Some(""));
        if let Some(goal) = &self.goal {
            let text = settings
                .target_score
                .map(|t| format!("Goal: {t}"))
                .unwrap_or_default();
            goal.set_text_content(Some(&text));
        }
        self.show_screen(&self.game_screen);
    }

    fn on_tick(&mut self, remaining_seconds: u32) {
        self.time.set_text_content(Some(&remaining_seconds.to_string()));
    }

    fn on_score_changed(&mut self, score: i64, delta: i64) {
        self.score.set_text_content(Some(&score.to_string()));
        Self::report(self.popup(delta));
    }

    fn on_message(&mut self, _key: &'static str, text: &str) {
        self.message.set_text_content(Some(text));
    }

    fn on_object_spawned(&mut self, id: ObjectId, kind: ObjectKind, spawn_x: f64) {
        Self::report(self.spawn_drop(id, kind, spawn_x));
    }

    fn on_object_fell(&mut self, id: ObjectId, position: f64) {
        if let Some(view) = self.drops.get(&id) {
            Self::report(view.el.style().set_property("top", &format!("{position}px")));
        }
    }

    fn on_object_resolved(&mut self, id: ObjectId, resolution: Resolution) {
        Self::report(self.resolve_drop(id, resolution));
    }

    fn on_round_ended(&mut self, result: &RoundResult) {
        self.clear_area();
        let summary = EndSummary::for_result(result, self.target_score);
        self.final_score
            .set_text_content(Some(&result.final_score.to_string()));
        self.end_title.set_text_content(Some(summary.headline));
        self.end_text.set_text_content(Some(&summary.text));
        self.show_screen(&self.end_screen);
    }

    fn on_reset(&mut self) {
        self.clear_area();
        self.score.set_text_content(Some("0"));
        self.time.set_text_content(Some(""));
        self.message.set_text_content(Some(""));
        self.show_screen(&self.start_screen);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::difficulty::{EASY, NORMAL};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FIXTURE: &str = r#"
        <section id="start-screen" class="screen active"></section>
        <section id="game-screen" class="screen">
          <strong id="score"></strong><span id="goal"></span><strong id="time"></strong>
          <div id="message"></div>
          <div id="game-area" style="height: 400px"></div>
        </section>
        <section id="end-screen" class="screen">
          <h2 id="end-title"></h2><strong id="final-score"></strong><p id="end-text"></p>
        </section>"#;

    fn presenter() -> (Document, DomPresenter) {
        let doc = web_sys::window().unwrap().document().unwrap();
        doc.body().unwrap().set_inner_html(FIXTURE);
        let dom = DomPresenter::new(&doc).unwrap();
        (doc, dom)
    }

    fn text(doc: &Document, id: &str) -> String {
        doc.get_element_by_id(id).unwrap().text_content().unwrap_or_default()
    }

    fn is_active(doc: &Document, id: &str) -> bool {
        doc.get_element_by_id(id).unwrap().class_list().contains("active")
    }

    fn area(doc: &Document) -> Element {
        doc.get_element_by_id(GAME_AREA_ID).unwrap()
    }

    #[wasm_bindgen_test]
    fn round_start_shows_game_screen_and_goal() {
        let (doc, mut dom) = presenter();
        assert_eq!(dom.play_area_height(), 400.0);
        dom.on_round_started("normal", &NORMAL);
        assert!(is_active(&doc, "game-screen"));
        assert!(!is_active(&doc, "start-screen"));
        assert_eq!(text(&doc, "goal"), "Goal: 120");
        assert_eq!(text(&doc, "time"), "30");
        dom.on_tick(29);
        assert_eq!(text(&doc, "time"), "29");
    }

    #[wasm_bindgen_test]
    fn spawned_drop_follows_fall_and_leaves_on_expiry() {
        let (doc, mut dom) = presenter();
        dom.on_round_started("easy", &EASY);
        dom.on_object_spawned(ObjectId(3), ObjectKind::Polluted, 42.0);
        let drop = area(&doc).first_element_child().unwrap();
        assert_eq!(drop.class_name(), "drop polluted");
        let style = drop.dyn_ref::<HtmlElement>().unwrap().style();
        assert_eq!(style.get_property_value("left").unwrap(), "42%");

        dom.on_object_fell(ObjectId(3), -20.0);
        assert_eq!(style.get_property_value("top").unwrap(), "-20px");

        dom.on_object_resolved(ObjectId(3), Resolution::Expired);
        assert_eq!(area(&doc).child_element_count(), 0);
        assert!(dom.drops.is_empty());
    }

    #[wasm_bindgen_test]
    fn clean_claim_replaces_drop_with_ripple_and_popup() {
        let (doc, mut dom) = presenter();
        dom.on_round_started("easy", &EASY);
        dom.on_object_spawned(ObjectId(1), ObjectKind::Clean, 10.0);
        dom.on_object_resolved(ObjectId(1), Resolution::ClaimedClean);
        dom.on_score_changed(10, 10);
        dom.on_message("nice-ripple", "Nice ripple!");

        let area = area(&doc);
        assert_eq!(area.child_element_count(), 2);
        assert_eq!(area.first_element_child().unwrap().class_name(), "ripple");
        let popup = area.last_element_child().unwrap();
        assert_eq!(popup.class_name(), "popup positive");
        assert_eq!(popup.text_content().unwrap_or_default(), "+10");
        assert_eq!(text(&doc, "score"), "10");
        assert_eq!(text(&doc, "message"), "Nice ripple!");
    }

    #[wasm_bindgen_test]
    fn round_end_writes_summary() {
        let (doc, mut dom) = presenter();
        dom.on_round_started("normal", &NORMAL);
        dom.on_object_spawned(ObjectId(9), ObjectKind::Clean, 5.0);
        let result = RoundResult::new(90, NORMAL.target_score);
        dom.on_round_ended(&result);

        let summary = EndSummary::for_result(&result, NORMAL.target_score);
        assert!(is_active(&doc, "end-screen"));
        assert_eq!(text(&doc, "end-title"), summary.headline);
        assert_eq!(text(&doc, "end-text"), summary.text);
        assert_eq!(text(&doc, "final-score"), "90");
        assert_eq!(area(&doc).child_element_count(), 0);

        dom.on_reset();
        assert!(is_active(&doc, "start-screen"));
        assert!(!is_active(&doc, "end-screen"));
    }
}
