use std::sync::Arc;

use tracing::debug;

use crate::error::AppResult;
use crate::input::{KeyClassifier, KeyInput};

use super::KeyHandler;
use super::context::HandlerContext;

/// Commands available in every mode.
pub struct GlobalHandler {
    keys: Arc<dyn KeyClassifier>,
}

impl GlobalHandler {
    pub fn new(keys: Arc<dyn KeyClassifier>) -> Self {
        Self { keys }
    }
}

impl KeyHandler for GlobalHandler {
    fn name(&self) -> &'static str {
        "global"
    }

    fn handle(&self, input: &str, key: &KeyInput, cx: &mut HandlerContext<'_>) -> AppResult<bool> {
        if self.keys.is_interrupt(input, key) {
            debug!(mode = cx.state.mode.kind().label(), "interrupt requested exit");
            cx.effects.request_exit();
            return Ok(true);
        }

        if self.keys.is_quit(input, key) {
            if cx.state.mode.is_navigation() && !cx.state.has_search_term() {
                cx.effects.request_exit();
                return Ok(true);
            }
            return Ok(false);
        }

        if self.keys.is_export(input, key) {
            cx.state.status.message = "exporting schema".to_string();
            cx.effects.export_schema();
            return Ok(true);
        }

        if self.keys.is_export_data(input, key) {
            cx.state.status.message = "exporting data".to_string();
            cx.effects.export_data();
            return Ok(true);
        }

        Ok(false)
    }
}
