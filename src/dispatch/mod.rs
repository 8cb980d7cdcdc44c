//! Keystroke dispatch.
//!
//! Every keystroke walks a fixed chain of handlers: global, help, search,
//! jq, navigation. The first handler that reports the key as handled stops
//! the walk. Handlers for inactive modes decline immediately, so at most one
//! modal handler ever acts on a key.

mod context;
mod global;
mod goto;
mod help;
mod jq;
mod navigation;
mod scrolling;
mod search;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::debug;

use crate::app::ViewerState;
use crate::error::AppResult;
use crate::input::{KeyClassifier, KeyInput, NamedKey};

pub use context::{
    CollapsibleDelegate, CollapsibleNavigationAction, HandlerContext, JqRequest, SearchRequest,
    TreeDelegate, ViewerEffects,
};
pub use global::GlobalHandler;
pub use goto::GotoSequence;
pub use help::HelpHandler;
pub use jq::JqHandler;
pub use navigation::NavigationHandler;
pub use search::SearchHandler;

pub trait KeyHandler {
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` when the key was consumed.
    fn handle(&self, input: &str, key: &KeyInput, cx: &mut HandlerContext<'_>) -> AppResult<bool>;
}

pub struct Dispatcher {
    handlers: [Box<dyn KeyHandler + Send + Sync>; 5],
    goto: GotoSequence,
}

impl Dispatcher {
    pub fn new(keys: Arc<dyn KeyClassifier>) -> Self {
        Self {
            handlers: [
                Box::new(GlobalHandler::new(Arc::clone(&keys))),
                Box::new(HelpHandler::new(Arc::clone(&keys))),
                Box::new(SearchHandler::new(Arc::clone(&keys))),
                Box::new(JqHandler::new(Arc::clone(&keys))),
                Box::new(NavigationHandler::new(keys)),
            ],
            goto: GotoSequence::default(),
        }
    }

    pub fn goto(&self) -> &GotoSequence {
        &self.goto
    }

    /// Routes one keystroke. Returns whether any handler consumed it.
    ///
    /// Delegate failures propagate; the goto sequence is still settled
    /// before returning.
    pub fn handle_key_event(
        &mut self,
        input: &str,
        key: &KeyInput,
        state: &mut ViewerState,
        effects: &mut dyn ViewerEffects,
        tree: &mut dyn TreeDelegate,
        collapsible: &mut dyn CollapsibleDelegate,
    ) -> AppResult<bool> {
        state.status.last_key = Some(describe_key(input, key));
        let mode_before = state.mode.kind();

        self.goto.begin_dispatch();
        let outcome = {
            let mut cx = HandlerContext {
                state: &mut *state,
                goto: &mut self.goto,
                effects,
                tree,
                collapsible,
            };
            run_chain(&self.handlers, input, key, &mut cx)
        };
        self.goto.end_dispatch();

        let mode_after = state.mode.kind();
        if mode_before != mode_after {
            debug!(
                from = mode_before.label(),
                to = mode_after.label(),
                "mode changed"
            );
        }
        outcome
    }
}

fn run_chain(
    handlers: &[Box<dyn KeyHandler + Send + Sync>],
    input: &str,
    key: &KeyInput,
    cx: &mut HandlerContext<'_>,
) -> AppResult<bool> {
    for handler in handlers {
        if handler.handle(input, key, cx)? {
            debug!(handler = handler.name(), input, "key handled");
            return Ok(true);
        }
    }
    debug!(input, named = ?key.named, "key not handled");
    Ok(false)
}

fn describe_key(input: &str, key: &KeyInput) -> String {
    let mut label = String::new();
    if key.ctrl {
        label.push_str("Ctrl+");
    }
    if key.meta {
        label.push_str("Alt+");
    }
    if key.named != NamedKey::None {
        label.push_str(&format!("{:?}", key.named));
    } else if !input.is_empty() {
        label.push_str(input);
    } else {
        label.push_str(&key.text);
    }
    label
}
