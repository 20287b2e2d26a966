//! Whack-a-Mole core crate.
//!
//! The game logic (`game`, `wrangler`, `hammer`) is plain Rust driven by a
//! virtual-time `schedule::Scheduler` and talks to the page only through the
//! `view::View` / `view::Audio` traits, so it runs natively under `cargo test`.
//! `start_game()` wires it to the DOM for the browser build.

use wasm_bindgen::prelude::*;

pub mod difficulty;
pub mod error;
pub mod game;
pub mod hammer;
pub mod schedule;
pub mod view;
mod web;
pub mod wrangler;

pub use difficulty::{DIFFICULTIES, DifficultyLevel, GameConfig};
pub use error::GameError;
pub use game::{Game, GameSession, Phase, format_stat};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Start the game with the built-in difficulty presets and timings.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::start(GameConfig::default())?;
    Ok(())
}

/// Start the game with a JSON `GameConfig` override (missing fields default).
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json)?;
    web::start(config)?;
    Ok(())
}
