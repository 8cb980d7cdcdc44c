use std::sync::Arc;

use tracing::debug;

use crate::app::Mode;
use crate::error::AppResult;
use crate::input::{KeyClassifier, KeyInput, NamedKey};

use super::KeyHandler;
use super::context::HandlerContext;

/// The help overlay is modal: it swallows every key while visible.
pub struct HelpHandler {
    keys: Arc<dyn KeyClassifier>,
}

impl HelpHandler {
    pub fn new(keys: Arc<dyn KeyClassifier>) -> Self {
        Self { keys }
    }
}

impl KeyHandler for HelpHandler {
    fn name(&self) -> &'static str {
        "help"
    }

    fn handle(&self, input: &str, key: &KeyInput, cx: &mut HandlerContext<'_>) -> AppResult<bool> {
        if !matches!(cx.state.mode, Mode::Help) {
            return Ok(false);
        }

        if self.keys.is_help(input, key) || key.is_named(NamedKey::Escape) {
            cx.state.mode = Mode::Navigation;
            cx.effects.restore_terminal();
            return Ok(true);
        }

        debug!(input, "ignored key while help is visible");
        Ok(true)
    }
}
