//! Browser binding: DOM-backed `View`/`Audio`, input listeners and the frame
//! loop that feeds `performance.now()` into the game's scheduler.
//!
//! Expects the Whack-a-Mole HTML template in the page: a
//! `.whack-a-mole-container` holding the stat bar, `.mole` holes (with
//! `.hole.difficulty .text` labels on the difficulty holes), a `.hammer`, and
//! `<audio>` elements `game`, `choose_difficulty`, `buzzer` and `whacked`.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, window};

use crate::difficulty::GameConfig;
use crate::error::GameError;
use crate::game::Game;
use crate::view::{Audio, Cue, Stat, View};

const CONTAINER: &str = ".whack-a-mole-container";

type DomGame = Game<DomView, DomAudio>;

thread_local! {
    static GAME: RefCell<Option<DomGame>> = const { RefCell::new(None) };
}

fn query(doc: &Document, selector: &str) -> Result<HtmlElement, GameError> {
    let full = format!("{CONTAINER} {selector}");
    doc.query_selector(&full)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or(GameError::MissingElement { selector: full })
}

fn query_all(doc: &Document, selector: &str) -> Result<Vec<HtmlElement>, GameError> {
    let list = doc.query_selector_all(&format!("{CONTAINER} {selector}"))?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

/// Default `display` of an element type, what it shows as with no styling.
fn natural_display(tag_name: &str) -> &'static str {
    match tag_name.to_ascii_lowercase().as_str() {
        "span" | "a" | "img" | "b" | "i" | "em" | "strong" | "small" | "label" | "abbr"
        | "code" | "sub" | "sup" => "inline",
        "li" => "list-item",
        "table" => "table",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        _ => "block",
    }
}

fn set_shown(el: &HtmlElement, shown: bool) {
    let display = if shown {
        natural_display(&el.tag_name())
    } else {
        "none"
    };
    if let Err(e) = el.style().set_property("display", display) {
        debug!("display update failed: {e:?}");
    }
}

pub struct DomView {
    highscore: HtmlElement,
    difficulty: HtmlElement,
    moles_whacked: HtmlElement,
    time_left: HtmlElement,
    difficulty_labels: Vec<HtmlElement>,
    moles: Vec<HtmlElement>,
    hammer: HtmlElement,
}

impl DomView {
    fn find(doc: &Document) -> Result<Self, GameError> {
        let moles = query_all(doc, ".mole")?;
        if moles.is_empty() {
            return Err(GameError::MissingElement {
                selector: format!("{CONTAINER} .mole"),
            });
        }
        Ok(Self {
            highscore: query(doc, ".global-stat-bar .high-score .stat")?,
            difficulty: query(doc, ".global-stat-bar .difficulty .stat")?,
            moles_whacked: query(doc, ".whack-stat .stat")?,
            time_left: query(doc, ".time-stat .stat")?,
            difficulty_labels: query_all(doc, ".hole.difficulty .text")?,
            moles,
            hammer: query(doc, ".hammer")?,
        })
    }
}

impl View for DomView {
    fn slot_count(&self) -> usize {
        self.moles.len()
    }

    fn set_slot_visible(&mut self, index: usize, visible: bool) {
        if let Some(mole) = self.moles.get(index) {
            set_shown(mole, visible);
        }
    }

    fn set_difficulty_labels_visible(&mut self, visible: bool) {
        for label in &self.difficulty_labels {
            set_shown(label, visible);
        }
    }

    fn set_stat(&mut self, stat: Stat, text: &str) {
        let el = match stat {
            Stat::Highscore => &self.highscore,
            Stat::Difficulty => &self.difficulty,
            Stat::MolesWhacked => &self.moles_whacked,
            Stat::TimeLeft => &self.time_left,
        };
        el.set_text_content(Some(text));
    }

    fn place_hammer(&mut self, left: i32, top: i32) {
        let style = self.hammer.style();
        let placed = style
            .set_property("left", &format!("{left}px"))
            .and_then(|_| style.set_property("top", &format!("{top}px")));
        if let Err(e) = placed {
            debug!("hammer move failed: {e:?}");
        }
        set_shown(&self.hammer, true);
    }

    fn set_hammer_rotated(&mut self, rotated: bool) {
        let classes = self.hammer.class_list();
        let toggled = if rotated {
            classes.add_1("rotated")
        } else {
            classes.remove_1("rotated")
        };
        if let Err(e) = toggled {
            debug!("hammer rotate failed: {e:?}");
        }
    }
}

pub struct DomAudio {
    background: HtmlAudioElement,
    choose_difficulty: HtmlAudioElement,
    buzzer: HtmlAudioElement,
    whacked: HtmlAudioElement,
}

impl DomAudio {
    fn find(doc: &Document) -> Result<Self, GameError> {
        let by_id = |id: &str| {
            doc.get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok())
                .ok_or_else(|| GameError::MissingElement {
                    selector: format!("audio#{id}"),
                })
        };
        Ok(Self {
            background: by_id("game")?,
            choose_difficulty: by_id("choose_difficulty")?,
            buzzer: by_id("buzzer")?,
            whacked: by_id("whacked")?,
        })
    }
}

impl Audio for DomAudio {
    fn play(&mut self, cue: Cue) {
        let el = match cue {
            Cue::Background => &self.background,
            Cue::ChooseDifficulty => &self.choose_difficulty,
            Cue::Buzzer => &self.buzzer,
            Cue::Whacked => &self.whacked,
        };
        // Autoplay policies may reject the promise; nothing depends on it.
        if let Err(e) = el.play() {
            debug!("{cue:?} did not play: {e:?}");
        }
    }

    fn stop_background(&mut self) {
        if let Err(e) = self.background.pause() {
            debug!("pause failed: {e:?}");
        }
        self.background.load();
    }
}

fn now_ms() -> u64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0) as u64
}

fn with_game(f: impl FnOnce(&mut DomGame, u64)) {
    let now = now_ms();
    GAME.with(|cell| {
        if let Some(game) = cell.borrow_mut().as_mut() {
            f(game, now);
        }
    });
}

/// Find the page elements, build the game and wire up input.
pub fn start(config: GameConfig) -> Result<(), GameError> {
    if GAME.with(|cell| cell.borrow().is_some()) {
        warn!("game already running");
        return Ok(());
    }
    let win = window().ok_or(GameError::NoBrowser("window"))?;
    let doc = win.document().ok_or(GameError::NoBrowser("document"))?;

    let container: Element = doc
        .query_selector(CONTAINER)?
        .ok_or_else(|| GameError::MissingElement {
            selector: CONTAINER.to_string(),
        })?;
    let view = DomView::find(&doc)?;
    let audio = DomAudio::find(&doc)?;
    let moles = view.moles.clone();

    let game = Game::from_entropy(view, audio, config, now_ms())?;
    info!("whack-a-mole ready with {} holes", moles.len());
    GAME.with(|cell| cell.replace(Some(game)));

    // Hammer follows the pointer anywhere inside the container.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            with_game(|game, now| game.pointer_move(now, evt.page_x(), evt.page_y()));
        }) as Box<dyn FnMut(_)>);
        container
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|game, now| game.pointer_down(now));
        }) as Box<dyn FnMut(_)>);
        container
            .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    for (index, mole) in moles.iter().enumerate() {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|game, now| game.slot_clicked(now, index));
        }) as Box<dyn FnMut(_)>);
        mole.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_frame_loop();
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

// Timers run off animation frames, so they are at most one frame late.
fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        with_game(|game, now| game.advance_to(now));
        if let Some(w) = window() {
            if let Some(cb) = f.borrow().as_ref() {
                let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        if let Some(cb) = g.borrow().as_ref() {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}
