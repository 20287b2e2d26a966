//! Fatal startup errors. Nothing at runtime is recoverable-by-design; once the
//! page is wired up every handler is infallible.

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// `window` or `document` unavailable (not running in a browser page).
    #[error("no {0} available")]
    NoBrowser(&'static str),

    /// A required element could not be found in the game container.
    #[error("missing element: {selector}")]
    MissingElement { selector: String },

    /// The page has fewer mole holes than the configuration needs.
    #[error("too few mole slots: need {needed}, found {found}")]
    TooFewSlots { needed: usize, found: usize },

    /// A configuration value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A JSON config override did not parse.
    #[error("malformed config: {reason}")]
    MalformedConfig { reason: String },

    /// A DOM call failed while wiring the page.
    #[error("dom error: {message}")]
    Dom { message: String },
}

impl GameError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        GameError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        GameError::Dom {
            message: value.as_string().unwrap_or_else(|| format!("{value:?}")),
        }
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
