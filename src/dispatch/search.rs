use std::sync::Arc;

use tracing::debug;

use crate::app::{CommittedSearch, Mode, SearchScope, SearchSession, ViewerState};
use crate::error::AppResult;
use crate::input::{KeyClassifier, KeyInput, NamedKey};

use super::KeyHandler;
use super::context::{HandlerContext, SearchRequest};

/// Search prompt. Exclusive: no key typed here reaches navigation.
pub struct SearchHandler {
    keys: Arc<dyn KeyClassifier>,
}

impl SearchHandler {
    pub fn new(keys: Arc<dyn KeyClassifier>) -> Self {
        Self { keys }
    }
}

impl KeyHandler for SearchHandler {
    fn name(&self) -> &'static str {
        "search"
    }

    fn handle(&self, input: &str, key: &KeyInput, cx: &mut HandlerContext<'_>) -> AppResult<bool> {
        let Mode::Search(session) = &mut cx.state.mode else {
            return Ok(false);
        };

        if key.is_named(NamedKey::Return) {
            let term = session.term().trim().to_string();
            let (scope, regex) = (session.scope, session.regex);
            commit_search(cx, term, scope, regex);
            return Ok(true);
        }

        if self.keys.is_search_exit(input, key) {
            cancel_search(cx.state);
            return Ok(true);
        }

        if key.is_named(NamedKey::Tab) && !key.has_modifier() {
            session.scope = session.scope.next();
            cx.state.status.message = format!("search scope: {}", session.scope.label());
            return Ok(true);
        }

        if key.ctrl && key.single_char().is_some_and(|ch| ch.eq_ignore_ascii_case(&'r')) {
            session.regex = !session.regex;
            cx.state.status.message = if session.regex {
                "regex search on".to_string()
            } else {
                "regex search off".to_string()
            };
            return Ok(true);
        }

        if key.is_named(NamedKey::Up) || key.is_named(NamedKey::Down) {
            recall_history(cx.state, key.is_named(NamedKey::Up));
            return Ok(true);
        }

        if session.editor.apply(key) {
            session.history_cursor = None;
            return Ok(true);
        }

        debug!(input, "ignored key in search mode");
        Ok(true)
    }
}

fn commit_search(
    cx: &mut HandlerContext<'_>,
    term: String,
    scope: SearchScope,
    regex: bool,
) {
    if term.is_empty() {
        cancel_search(cx.state);
        return;
    }

    let state = &mut *cx.state;
    state.search_history.push(&term);
    let generation = state.take_generation();
    state.mode = Mode::Navigation;
    state.search = Some(CommittedSearch::pending(
        term.clone(),
        scope,
        regex,
        generation,
    ));
    state.sync_viewports();
    state.scroll.scroll_to_top();
    state.status.message = format!("searching for {term:?}");

    cx.effects.start_search(SearchRequest {
        term,
        scope,
        regex,
        generation,
    });
}

fn cancel_search(state: &mut ViewerState) {
    state.mode = Mode::Navigation;
    state.search = None;
    state.sync_viewports();
    state.scroll.scroll_to_top();
    state.status.message = "search canceled".to_string();
}

fn recall_history(state: &mut ViewerState, older: bool) {
    let len = state.search_history.len();
    let Mode::Search(session) = &mut state.mode else {
        return;
    };
    if len == 0 {
        return;
    }

    let next = match (session.history_cursor, older) {
        (None, true) => Some(len - 1),
        (None, false) => None,
        (Some(0), true) => Some(0),
        (Some(idx), true) => Some(idx - 1),
        (Some(idx), false) if idx + 1 < len => Some(idx + 1),
        (Some(_), false) => None,
    };

    let recalled = next
        .and_then(|idx| state.search_history.get(idx))
        .unwrap_or_default()
        .to_string();
    *session = SearchSession {
        history_cursor: next,
        ..SearchSession::seeded(&recalled, session.scope, session.regex)
    };
}
