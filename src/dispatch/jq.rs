use std::sync::Arc;

use tracing::debug;

use crate::app::{JqFocus, Mode};
use crate::error::AppResult;
use crate::input::{KeyClassifier, KeyInput, NamedKey};

use super::KeyHandler;
use super::context::{HandlerContext, JqRequest};
use super::scrolling::{apply_scroll, classify_scroll};

/// Jq query prompt and result pane.
pub struct JqHandler {
    keys: Arc<dyn KeyClassifier>,
}

impl JqHandler {
    pub fn new(keys: Arc<dyn KeyClassifier>) -> Self {
        Self { keys }
    }
}

impl KeyHandler for JqHandler {
    fn name(&self) -> &'static str {
        "jq"
    }

    fn handle(&self, input: &str, key: &KeyInput, cx: &mut HandlerContext<'_>) -> AppResult<bool> {
        if !matches!(cx.state.mode, Mode::Jq(_)) {
            return Ok(false);
        }

        if key.is_named(NamedKey::Return) && !key.has_modifier() {
            let generation = cx.state.take_generation();
            let Some(session) = cx.state.mode.jq_mut() else {
                return Ok(false);
            };
            let query = session.query().trim().to_string();
            session.generation = generation;
            session.pending = true;
            session.last_error = None;
            session.error_scroll = 0;
            cx.state.status.message = format!("running {query:?}");
            cx.effects.submit_jq(JqRequest { query, generation });
            return Ok(true);
        }

        let result_height = cx.state.jq_result_height();
        let half_page = cx.state.heights().half;
        let Mode::Jq(session) = &mut cx.state.mode else {
            return Ok(false);
        };

        if key.is_named(NamedKey::Escape) {
            cx.state.mode = Mode::Navigation;
            cx.state.sync_viewports();
            cx.state.status.message = "jq closed".to_string();
            return Ok(true);
        }

        if key.is_named(NamedKey::Tab) {
            session.focus = match session.focus {
                JqFocus::Input => JqFocus::Output,
                JqFocus::Output => JqFocus::Input,
            };
            return Ok(true);
        }

        if key.shift && (key.is_named(NamedKey::Up) || key.is_named(NamedKey::Down)) {
            let error_lines = session
                .last_error
                .as_deref()
                .map(|err| err.lines().count())
                .unwrap_or(0);
            session.error_scroll = if key.is_named(NamedKey::Up) {
                session.error_scroll.saturating_sub(1)
            } else {
                (session.error_scroll + 1).min(error_lines.saturating_sub(1))
            };
            return Ok(true);
        }

        match session.focus {
            JqFocus::Input => {
                if session.editor.apply(key) {
                    return Ok(true);
                }
            }
            JqFocus::Output => {
                if key.single_char() == Some('i') && !key.has_modifier() {
                    session.focus = JqFocus::Input;
                    return Ok(true);
                }
                if key.single_char() == Some('o') && !key.has_modifier() {
                    session.show_original = !session.show_original;
                    return Ok(true);
                }
                if let Some(command) = classify_scroll(self.keys.as_ref(), input, key, cx.goto) {
                    let total = session.result_scroll.total_items();
                    session.result_scroll.resize(total, result_height);
                    apply_scroll(&mut session.result_scroll, command, half_page);
                    return Ok(true);
                }
            }
        }

        debug!(input, "ignored key in jq mode");
        Ok(true)
    }
}
