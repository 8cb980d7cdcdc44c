use std::sync::Arc;

use tracing::debug;

use crate::app::{JqSession, Mode, SearchSession, ViewFlags, ViewerState};
use crate::error::AppResult;
use crate::input::{KeyClassifier, KeyInput};
use crate::viewport::ScrollState;

use super::KeyHandler;
use super::context::{CollapsibleNavigationAction, HandlerContext};
use super::scrolling::{ScrollCommand, apply_scroll, classify_scroll};

/// Default mode. Offers each key to the tree view, then the collapsible
/// view, then applies the standard scroll and toggle commands.
pub struct NavigationHandler {
    keys: Arc<dyn KeyClassifier>,
}

impl NavigationHandler {
    pub fn new(keys: Arc<dyn KeyClassifier>) -> Self {
        Self { keys }
    }

    fn collapsible_action(
        &self,
        input: &str,
        key: &KeyInput,
        scroll: Option<ScrollCommand>,
        state: &ViewerState,
    ) -> Option<CollapsibleNavigationAction> {
        let keys = self.keys.as_ref();
        if keys.is_toggle_node(input, key) {
            return Some(CollapsibleNavigationAction::ToggleNode);
        }
        if keys.is_expand_all(input, key) {
            return Some(CollapsibleNavigationAction::ExpandAll);
        }
        if keys.is_expand_node(input, key) {
            return Some(CollapsibleNavigationAction::ExpandNode);
        }
        if keys.is_collapse_node(input, key) {
            return Some(CollapsibleNavigationAction::CollapseNode);
        }

        let page = state.content_height();
        let half = state.heights().half;
        match scroll? {
            ScrollCommand::LineUp => Some(CollapsibleNavigationAction::MoveUp),
            ScrollCommand::LineDown => Some(CollapsibleNavigationAction::MoveDown),
            ScrollCommand::PageUp => Some(CollapsibleNavigationAction::PageUp { count: page }),
            ScrollCommand::PageDown => Some(CollapsibleNavigationAction::PageDown { count: page }),
            ScrollCommand::HalfPageUp => Some(CollapsibleNavigationAction::PageUp { count: half }),
            ScrollCommand::HalfPageDown => {
                Some(CollapsibleNavigationAction::PageDown { count: half })
            }
            ScrollCommand::ArmTop => None,
            ScrollCommand::Top => Some(CollapsibleNavigationAction::GotoTop),
            ScrollCommand::Bottom => Some(CollapsibleNavigationAction::GotoBottom),
        }
    }

    fn handle_standard(
        &self,
        input: &str,
        key: &KeyInput,
        scroll: Option<ScrollCommand>,
        cx: &mut HandlerContext<'_>,
    ) -> AppResult<bool> {
        let keys = self.keys.as_ref();
        let state = &mut *cx.state;

        if keys.is_search(input, key) {
            let session = state
                .search
                .as_ref()
                .map(|search| SearchSession::seeded(&search.term, search.scope, search.regex))
                .unwrap_or_default();
            state.mode = Mode::Search(session);
            state.sync_viewports();
            return Ok(true);
        }

        if keys.is_jq(input, key) {
            state.mode = Mode::Jq(JqSession {
                result_scroll: ScrollState::new(0, state.jq_result_height()),
                ..JqSession::default()
            });
            return Ok(true);
        }

        if let Some(command) = scroll {
            let half = state.heights().half;
            state.sync_viewports();
            apply_scroll(&mut state.scroll, command, half);
            return Ok(true);
        }

        if let Some(search) = state.search.as_mut() {
            let forward = keys.is_search_next(input, key);
            if forward || keys.is_search_previous(input, key) {
                match search.step(forward) {
                    Some(line) => {
                        let position = search.current.map(|idx| idx + 1).unwrap_or(0);
                        state.status.message =
                            format!("match {position}/{}", search.matches.len());
                        state.sync_viewports();
                        state.scroll.center_on(line);
                        // Outline line numbers do not map onto tree nodes.
                        if !state.view.schema {
                            if state.view.tree {
                                cx.tree.reveal_line(line)?;
                            } else if state.view.collapsible {
                                cx.collapsible
                                    .apply(CollapsibleNavigationAction::RevealLine { line })?;
                            }
                        }
                    }
                    None => {
                        state.status.message = format!("no matches for {:?}", search.term);
                    }
                }
                return Ok(true);
            }
            if keys.is_search_exit(input, key) {
                state.search = None;
                state.sync_viewports();
                state.status.message = "search cleared".to_string();
                return Ok(true);
            }
        }

        if let Some(message) = toggle_view(keys, input, key, &mut state.view) {
            state.status.message = message;
            state.scroll.scroll_to_top();
            return Ok(true);
        }

        if keys.is_help(input, key) {
            state.mode = Mode::Help;
            return Ok(true);
        }

        Ok(false)
    }
}

impl KeyHandler for NavigationHandler {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn handle(&self, input: &str, key: &KeyInput, cx: &mut HandlerContext<'_>) -> AppResult<bool> {
        if !cx.state.mode.is_navigation() {
            return Ok(false);
        }

        if cx.state.view.tree && cx.tree.handle_key(input, key)? {
            debug!(input, "tree view consumed key");
            return Ok(true);
        }

        let scroll = classify_scroll(self.keys.as_ref(), input, key, cx.goto);

        if cx.state.view.tree {
            match scroll {
                Some(ScrollCommand::ArmTop) => return Ok(true),
                Some(ScrollCommand::Top) if cx.tree.goto_top()? => {
                    debug!("tree view moved to top");
                    return Ok(true);
                }
                _ => {}
            }
        }

        if cx.state.view.collapsible {
            if scroll == Some(ScrollCommand::ArmTop) {
                return Ok(true);
            }
            if let Some(action) = self.collapsible_action(input, key, scroll, cx.state)
                && cx.collapsible.apply(action)?
            {
                debug!(?action, "collapsible view consumed key");
                return Ok(true);
            }
        }

        self.handle_standard(input, key, scroll, cx)
    }
}

fn toggle_view(
    keys: &dyn KeyClassifier,
    input: &str,
    key: &KeyInput,
    view: &mut ViewFlags,
) -> Option<String> {
    if keys.is_tree(input, key) {
        view.tree = !view.tree;
        if view.tree {
            view.collapsible = false;
        }
        return Some(on_off("tree view", view.tree));
    }
    if keys.is_collapsible(input, key) {
        view.collapsible = !view.collapsible;
        if view.collapsible {
            view.tree = false;
        }
        return Some(on_off("collapsible view", view.collapsible));
    }
    if keys.is_schema(input, key) {
        view.schema = !view.schema;
        return Some(on_off("schema view", view.schema));
    }
    if keys.is_line_numbers(input, key) {
        view.line_numbers = !view.line_numbers;
        return Some(on_off("line numbers", view.line_numbers));
    }
    if keys.is_debug(input, key) {
        view.debug = !view.debug;
        return Some(on_off("debug panel", view.debug));
    }
    if keys.is_settings(input, key) {
        view.settings = !view.settings;
        return Some(on_off("settings", view.settings));
    }
    None
}

fn on_off(what: &str, on: bool) -> String {
    format!("{what} {}", if on { "on" } else { "off" })
}
