use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::document::{CollapsibleView, JsonDocument, QueryOutput, TreeView};
use crate::input::KeyClassifier;

use super::effects::EffectQueue;
use super::state::{SearchHistory, ViewerState};

const INITIAL_TERMINAL_HEIGHT: i32 = 24;

pub struct App {
    pub state: ViewerState,
    pub config: Config,
    pub(crate) document: JsonDocument,
    pub(crate) keys: Arc<dyn KeyClassifier>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) tree: TreeView,
    pub(crate) collapsible: CollapsibleView,
    pub(crate) effects: EffectQueue,
    /// Latest jq output shown in the result pane, kept for export.
    pub(crate) jq_output: Option<Arc<QueryOutput>>,
}

impl App {
    pub fn new(document: JsonDocument, config: Config) -> Self {
        let keys = config.keymap_preset().classifier();
        let mut state = ViewerState::new(INITIAL_TERMINAL_HEIGHT, document.lines().len());
        state.view.line_numbers = config.viewer.line_numbers;
        state.search_history = SearchHistory::with_limit(config.viewer.search_history_limit);

        let mut app = Self {
            tree: TreeView::new(document.value(), Arc::clone(&keys)),
            collapsible: CollapsibleView::new(document.value()),
            dispatcher: Dispatcher::new(Arc::clone(&keys)),
            effects: EffectQueue::default(),
            jq_output: None,
            keys,
            state,
            config,
            document,
        };
        app.sync_views();
        app
    }

    pub fn document(&self) -> &JsonDocument {
        &self.document
    }

    /// Lines backing the plain content pane: the outline while the schema
    /// view is on, otherwise the pretty-printed document.
    pub(crate) fn displayed_lines(&self) -> &Arc<Vec<String>> {
        if self.state.view.schema {
            self.document.outline()
        } else {
            self.document.lines()
        }
    }

    /// The jq output the result pane is currently showing, if any.
    pub(crate) fn shown_jq_output(&self) -> Option<&Arc<QueryOutput>> {
        let session = self.state.mode.jq()?;
        if session.show_original || session.result.is_none() {
            return None;
        }
        self.jq_output.as_ref()
    }

    /// Moves the tree or collapsible cursor onto a match found in the
    /// pretty document.
    pub(crate) fn reveal_in_views(&mut self, line: usize) {
        if self.state.view.schema {
            return;
        }
        if self.state.view.tree {
            self.tree.focus_line(line);
        } else if self.state.view.collapsible {
            self.collapsible.focus_line(line);
        }
    }

    /// Re-derives every pane size from the current terminal height and
    /// content.
    pub(crate) fn sync_views(&mut self) {
        let len = self.displayed_lines().len();
        self.state.set_content_len(len);
        self.state.sync_viewports();

        let height = self.state.content_height();
        self.tree.set_viewport_height(height);
        self.collapsible.set_viewport_height(height);

        if self.state.mode.jq().is_none() {
            self.jq_output = None;
        }
    }
}
