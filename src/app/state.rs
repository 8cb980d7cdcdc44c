use std::collections::VecDeque;

use crate::input::TextEditor;
use crate::viewport::{ComponentHeights, ScrollState, component_heights};

const DEFAULT_SEARCH_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    All,
    Keys,
    Values,
}

impl SearchScope {
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Keys,
            Self::Keys => Self::Values,
            Self::Values => Self::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Keys => "keys",
            Self::Values => "values",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JqFocus {
    #[default]
    Input,
    Output,
}

#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    pub editor: TextEditor,
    pub scope: SearchScope,
    pub regex: bool,
    /// Index into the search history while recalling entries with Up/Down.
    pub history_cursor: Option<usize>,
}

impl SearchSession {
    pub fn seeded(term: &str, scope: SearchScope, regex: bool) -> Self {
        Self {
            editor: TextEditor::with_value(term),
            scope,
            regex,
            history_cursor: None,
        }
    }

    pub fn term(&self) -> &str {
        self.editor.value()
    }
}

#[derive(Debug, Clone, Default)]
pub struct JqSession {
    pub editor: TextEditor,
    pub focus: JqFocus,
    pub last_error: Option<String>,
    pub show_original: bool,
    pub error_scroll: usize,
    pub result: Option<Vec<String>>,
    pub result_scroll: ScrollState,
    pub generation: u64,
    pub pending: bool,
}

impl JqSession {
    pub fn with_query(query: &str) -> Self {
        Self {
            editor: TextEditor::with_value(query),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        self.editor.value()
    }
}

/// The single active interaction context.
#[derive(Debug, Clone, Default)]
pub enum Mode {
    #[default]
    Navigation,
    Help,
    Search(SearchSession),
    Jq(JqSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Navigation,
    Help,
    Search,
    Jq,
}

impl ModeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "NAV",
            Self::Help => "HELP",
            Self::Search => "SEARCH",
            Self::Jq => "JQ",
        }
    }
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Navigation => ModeKind::Navigation,
            Self::Help => ModeKind::Help,
            Self::Search(_) => ModeKind::Search,
            Self::Jq(_) => ModeKind::Jq,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation)
    }

    pub fn search(&self) -> Option<&SearchSession> {
        match self {
            Self::Search(session) => Some(session),
            _ => None,
        }
    }

    pub fn jq(&self) -> Option<&JqSession> {
        match self {
            Self::Jq(session) => Some(session),
            _ => None,
        }
    }

    pub fn jq_mut(&mut self) -> Option<&mut JqSession> {
        match self {
            Self::Jq(session) => Some(session),
            _ => None,
        }
    }
}

/// A submitted search whose matches are shown over the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedSearch {
    pub term: String,
    pub scope: SearchScope,
    pub regex: bool,
    pub generation: u64,
    pub pending: bool,
    /// Matching line indices, ascending.
    pub matches: Vec<usize>,
    pub current: Option<usize>,
}

impl CommittedSearch {
    pub fn pending(term: String, scope: SearchScope, regex: bool, generation: u64) -> Self {
        Self {
            term,
            scope,
            regex,
            generation,
            pending: true,
            matches: Vec::new(),
            current: None,
        }
    }

    pub fn current_line(&self) -> Option<usize> {
        self.current.and_then(|idx| self.matches.get(idx).copied())
    }

    pub fn step(&mut self, forward: bool) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        let next = match (self.current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(idx), true) => (idx + 1) % len,
            (Some(idx), false) => (idx + len - 1) % len,
        };
        self.current = Some(next);
        self.current_line()
    }
}

#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_SEARCH_HISTORY_LIMIT)
    }
}

impl SearchHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() || self.entries.back().is_some_and(|last| last == term) {
            return;
        }
        self.entries.push_back(term.to_string());
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry `index` counted from the oldest.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewFlags {
    pub tree: bool,
    pub schema: bool,
    pub collapsible: bool,
    pub line_numbers: bool,
    pub debug: bool,
    pub settings: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: String,
    pub last_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    pub mode: Mode,
    pub view: ViewFlags,
    pub search: Option<CommittedSearch>,
    pub search_history: SearchHistory,
    pub scroll: ScrollState,
    pub status: StatusState,
    terminal_height: i32,
    next_generation: u64,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            mode: Mode::Navigation,
            view: ViewFlags::default(),
            search: None,
            search_history: SearchHistory::default(),
            scroll: ScrollState::default(),
            status: StatusState::default(),
            terminal_height: 24,
            next_generation: 1,
        }
    }
}

impl ViewerState {
    pub fn new(terminal_height: i32, content_len: usize) -> Self {
        let mut state = Self {
            terminal_height,
            ..Self::default()
        };
        state.set_content_len(content_len);
        state
    }

    pub fn heights(&self) -> ComponentHeights {
        component_heights(self.terminal_height)
    }

    pub fn terminal_height(&self) -> i32 {
        self.terminal_height
    }

    /// The search bar takes one extra row while searching or while a
    /// committed search is shown.
    pub fn search_overlay_active(&self) -> bool {
        self.search.is_some() || matches!(self.mode, Mode::Search(_))
    }

    pub fn content_height(&self) -> usize {
        let heights = self.heights();
        if self.search_overlay_active() {
            heights.conservative
        } else {
            heights.safe
        }
    }

    /// Jq result pane: header plus query line above it.
    pub fn jq_result_height(&self) -> usize {
        self.heights().conservative
    }

    pub fn set_terminal_height(&mut self, terminal_height: i32) {
        self.terminal_height = terminal_height;
        self.sync_viewports();
    }

    pub fn set_content_len(&mut self, content_len: usize) {
        let height = self.content_height();
        self.scroll.resize(content_len, height);
    }

    /// Re-derives every pane height from the raw terminal size.
    pub fn sync_viewports(&mut self) {
        let content_height = self.content_height();
        let total = self.scroll.total_items();
        self.scroll.resize(total, content_height);

        let jq_height = self.jq_result_height();
        if let Mode::Jq(session) = &mut self.mode {
            let total = session.result_scroll.total_items();
            session.result_scroll.resize(total, jq_height);
        }
    }

    pub fn take_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.saturating_add(1);
        generation
    }

    /// Quit is only honored with no search term typed or committed.
    pub fn has_search_term(&self) -> bool {
        let typing = self
            .mode
            .search()
            .is_some_and(|session| !session.term().is_empty());
        typing || self.search.as_ref().is_some_and(|search| !search.term.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{CommittedSearch, Mode, SearchHistory, SearchScope, SearchSession, ViewerState};

    #[test]
    fn search_scope_cycles_all_keys_values() {
        assert_eq!(SearchScope::All.next(), SearchScope::Keys);
        assert_eq!(SearchScope::Keys.next(), SearchScope::Values);
        assert_eq!(SearchScope::Values.next(), SearchScope::All);
    }

    #[test]
    fn committed_search_steps_wrap_in_both_directions() {
        let mut search = CommittedSearch::pending("a".to_string(), SearchScope::All, false, 1);
        assert_eq!(search.step(true), None);

        search.matches = vec![3, 8, 20];
        assert_eq!(search.step(true), Some(3));
        assert_eq!(search.step(false), Some(20));
        assert_eq!(search.step(true), Some(3));
        assert_eq!(search.step(true), Some(8));
    }

    #[test]
    fn search_history_skips_blank_and_repeated_terms() {
        let mut history = SearchHistory::with_limit(2);
        history.push("  ");
        history.push("id");
        history.push("id");
        history.push("name");
        history.push("tags");
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("name"));
        assert_eq!(history.get(1), Some("tags"));
    }

    #[test]
    fn search_overlay_uses_conservative_height() {
        let mut state = ViewerState::new(20, 100);
        assert_eq!(state.content_height(), 19);

        state.mode = Mode::Search(SearchSession::default());
        assert_eq!(state.content_height(), 18);
    }

    #[test]
    fn resize_rebounds_document_scroll() {
        let mut state = ViewerState::new(12, 30);
        state.scroll.scroll_to_bottom();
        assert_eq!(state.scroll.offset(), 19);

        state.set_terminal_height(40);
        assert_eq!(state.scroll.offset(), 0);
        assert_eq!(state.scroll.viewport_height(), 39);
    }

    #[test]
    fn partial_search_term_counts_as_active() {
        let mut state = ViewerState::default();
        assert!(!state.has_search_term());
        state.mode = Mode::Search(SearchSession::seeded("x", SearchScope::All, false));
        assert!(state.has_search_term());
    }
}
