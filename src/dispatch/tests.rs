use crate::app::{JqFocus, Mode, SearchScope, ViewerState};
use crate::error::{AppError, AppResult};
use crate::input::{KeyInput, KeymapPreset, NamedKey};

use super::{
    CollapsibleDelegate, CollapsibleNavigationAction, Dispatcher, JqRequest, SearchRequest,
    TreeDelegate, ViewerEffects,
};

#[derive(Default)]
struct RecordingEffects {
    exits: usize,
    schema_exports: usize,
    data_exports: usize,
    restores: usize,
    searches: Vec<SearchRequest>,
    queries: Vec<JqRequest>,
}

impl ViewerEffects for RecordingEffects {
    fn request_exit(&mut self) {
        self.exits += 1;
    }

    fn export_schema(&mut self) {
        self.schema_exports += 1;
    }

    fn export_data(&mut self) {
        self.data_exports += 1;
    }

    fn start_search(&mut self, request: SearchRequest) {
        self.searches.push(request);
    }

    fn submit_jq(&mut self, request: JqRequest) {
        self.queries.push(request);
    }

    fn restore_terminal(&mut self) {
        self.restores += 1;
    }
}

#[derive(Default)]
struct FakeTree {
    consume: bool,
    fail: bool,
    seen: Vec<String>,
    tops: usize,
    revealed: Vec<usize>,
}

impl TreeDelegate for FakeTree {
    fn handle_key(&mut self, input: &str, _key: &KeyInput) -> AppResult<bool> {
        self.seen.push(input.to_string());
        if self.fail {
            return Err(AppError::delegate("tree", "node table out of sync"));
        }
        Ok(self.consume)
    }

    fn goto_top(&mut self) -> AppResult<bool> {
        self.tops += 1;
        Ok(true)
    }

    fn reveal_line(&mut self, line: usize) -> AppResult<bool> {
        self.revealed.push(line);
        Ok(true)
    }
}

#[derive(Default)]
struct FakeCollapsible {
    actions: Vec<CollapsibleNavigationAction>,
    reject: bool,
}

impl CollapsibleDelegate for FakeCollapsible {
    fn apply(&mut self, action: CollapsibleNavigationAction) -> AppResult<bool> {
        if self.reject {
            return Ok(false);
        }
        self.actions.push(action);
        Ok(true)
    }
}

struct Harness {
    dispatcher: Dispatcher,
    state: ViewerState,
    effects: RecordingEffects,
    tree: FakeTree,
    collapsible: FakeCollapsible,
}

impl Harness {
    fn new(preset: KeymapPreset) -> Self {
        Self {
            dispatcher: Dispatcher::new(preset.classifier()),
            state: ViewerState::new(20, 200),
            effects: RecordingEffects::default(),
            tree: FakeTree::default(),
            collapsible: FakeCollapsible::default(),
        }
    }

    fn press(&mut self, key: KeyInput) -> bool {
        self.try_press(key).expect("dispatch should succeed")
    }

    fn try_press(&mut self, key: KeyInput) -> AppResult<bool> {
        let input = key.text.clone();
        self.dispatcher.handle_key_event(
            &input,
            &key,
            &mut self.state,
            &mut self.effects,
            &mut self.tree,
            &mut self.collapsible,
        )
    }

    fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            assert!(self.press(KeyInput::char(ch)));
        }
    }
}

#[test]
fn help_swallows_navigation_keys_and_closes_on_escape() {
    let mut h = Harness::new(KeymapPreset::Default);
    assert!(h.press(KeyInput::char('?')));
    assert!(matches!(h.state.mode, Mode::Help));

    assert!(h.press(KeyInput::char('j')));
    assert!(h.press(KeyInput::char('q')));
    assert_eq!(h.state.scroll.offset(), 0);
    assert_eq!(h.effects.exits, 0);

    assert!(h.press(KeyInput::named(NamedKey::Escape)));
    assert!(h.state.mode.is_navigation());
    assert_eq!(h.effects.restores, 1);
}

#[test]
fn interrupt_exits_from_any_mode() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.type_text("abc");
    assert!(h.press(KeyInput::ctrl('c')));
    assert_eq!(h.effects.exits, 1);
}

#[test]
fn quit_is_typed_into_search_instead_of_exiting() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.type_text("aq");
    assert_eq!(h.effects.exits, 0);
    assert_eq!(h.state.mode.search().map(|s| s.term()), Some("aq"));
}

#[test]
fn quit_exits_only_without_a_committed_search() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.type_text("id");
    h.press(KeyInput::named(NamedKey::Return));
    assert!(h.state.mode.is_navigation());

    assert!(!h.press(KeyInput::char('q')));
    assert_eq!(h.effects.exits, 0);

    h.press(KeyInput::named(NamedKey::Escape));
    assert!(h.state.search.is_none());
    assert!(h.press(KeyInput::char('q')));
    assert_eq!(h.effects.exits, 1);
}

#[test]
fn committing_search_emits_request_and_resets_scroll() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('G'));
    assert!(h.state.scroll.offset() > 0);

    h.press(KeyInput::char('/'));
    h.type_text("name");
    h.press(KeyInput::named(NamedKey::Tab));
    h.press(KeyInput::named(NamedKey::Return));

    assert_eq!(h.state.scroll.offset(), 0);
    assert_eq!(h.effects.searches.len(), 1);
    let request = &h.effects.searches[0];
    assert_eq!(request.term, "name");
    assert_eq!(request.scope, SearchScope::Keys);
    let committed = h.state.search.as_ref().expect("committed search");
    assert!(committed.pending);
    assert_eq!(committed.generation, request.generation);
}

#[test]
fn empty_search_commit_cancels() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.press(KeyInput::named(NamedKey::Return));
    assert!(h.state.mode.is_navigation());
    assert!(h.state.search.is_none());
    assert!(h.effects.searches.is_empty());
}

#[test]
fn ctrl_r_toggles_regex_for_the_next_commit() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.type_text("a.");

    assert!(h.press(KeyInput::ctrl('r')));
    assert_eq!(h.state.mode.search().map(|s| s.regex), Some(true));
    assert_eq!(h.state.status.message, "regex search on");
    assert_eq!(h.state.mode.search().map(|s| s.term()), Some("a."));

    h.press(KeyInput::ctrl('r'));
    assert_eq!(h.state.mode.search().map(|s| s.regex), Some(false));
    assert_eq!(h.state.status.message, "regex search off");

    h.press(KeyInput::ctrl('r'));
    h.press(KeyInput::named(NamedKey::Return));
    assert_eq!(h.effects.searches.len(), 1);
    assert!(h.effects.searches[0].regex);
}

#[test]
fn search_exit_cancels_and_resets_scroll() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('G'));
    assert!(h.state.scroll.offset() > 0);

    h.press(KeyInput::char('/'));
    h.type_text("ab");
    assert!(h.press(KeyInput::named(NamedKey::Escape)));

    assert!(h.state.mode.is_navigation());
    assert!(h.state.search.is_none());
    assert_eq!(h.state.scroll.offset(), 0);
    assert_eq!(h.state.status.message, "search canceled");
    assert!(h.effects.searches.is_empty());
}

#[test]
fn unrecognized_keys_stay_inside_search() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.type_text("x");

    assert!(h.press(KeyInput::default()));
    assert!(h.press(KeyInput::named(NamedKey::PageDown)));
    assert!(h.press(KeyInput::ctrl('d')));

    assert_eq!(h.state.mode.search().map(|s| s.term()), Some("x"));
    assert_eq!(h.state.scroll.offset(), 0);
    assert!(h.effects.searches.is_empty());
}

#[test]
fn search_steps_through_matches_and_centers() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.type_text("x");
    h.press(KeyInput::named(NamedKey::Return));
    if let Some(search) = h.state.search.as_mut() {
        search.pending = false;
        search.matches = vec![5, 120];
    }

    h.press(KeyInput::char('n'));
    assert_eq!(h.state.scroll.offset(), 0);
    h.press(KeyInput::char('n'));
    assert_eq!(h.state.scroll.offset(), 120 - 18 / 2);
    h.press(KeyInput::char('n'));
    assert_eq!(h.state.scroll.offset(), 0);
    h.press(KeyInput::char('N'));
    assert_eq!(h.state.scroll.offset(), 111);
}

#[test]
fn goto_top_needs_two_consecutive_presses() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('G'));
    let bottom = h.state.scroll.offset();

    assert!(h.press(KeyInput::char('g')));
    assert!(h.dispatcher.goto().is_armed());
    assert_eq!(h.state.scroll.offset(), bottom);

    h.press(KeyInput::char('k'));
    assert!(!h.dispatcher.goto().is_armed());
    h.press(KeyInput::char('g'));
    assert_eq!(h.state.scroll.offset(), bottom - 1);

    h.press(KeyInput::char('g'));
    assert_eq!(h.state.scroll.offset(), 0);
    assert!(!h.dispatcher.goto().is_armed());
}

#[test]
fn unhandled_key_still_disarms_goto() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('g'));
    assert!(!h.press(KeyInput::char('z')));
    assert!(!h.dispatcher.goto().is_armed());
}

#[test]
fn emacs_top_fires_on_single_press() {
    let mut h = Harness::new(KeymapPreset::Emacs);
    h.press(KeyInput::meta('>'));
    assert!(h.state.scroll.offset() > 0);
    h.press(KeyInput::meta('<'));
    assert_eq!(h.state.scroll.offset(), 0);
}

#[test]
fn jq_mode_is_exclusive_with_search() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('J'));
    assert!(matches!(h.state.mode, Mode::Jq(_)));

    h.type_text("./n");
    assert!(h.state.mode.search().is_none());
    assert_eq!(h.state.mode.jq().map(|s| s.query()), Some("./n"));

    h.press(KeyInput::named(NamedKey::Return));
    assert_eq!(h.effects.queries.len(), 1);
    assert_eq!(h.effects.queries[0].query, "./n");
    assert!(h.effects.searches.is_empty());
}

#[test]
fn jq_output_focus_scrolls_results() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('J'));
    if let Some(session) = h.state.mode.jq_mut() {
        session.result = Some(vec![String::new(); 50]);
        session.result_scroll.resize(50, 18);
    }

    h.press(KeyInput::named(NamedKey::Tab));
    h.press(KeyInput::char('j'));
    h.press(KeyInput::char('o'));
    let session = h.state.mode.jq().expect("jq session");
    assert_eq!(session.focus, JqFocus::Output);
    assert_eq!(session.result_scroll.offset(), 1);
    assert!(session.show_original);
    assert!(session.query().is_empty());

    h.press(KeyInput::char('i'));
    h.press(KeyInput::char('o'));
    assert_eq!(h.state.mode.jq().map(|s| s.query()), Some("o"));
}

#[test]
fn jq_escape_returns_to_navigation() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('J'));
    h.type_text(".a");

    assert!(h.press(KeyInput::named(NamedKey::Escape)));
    assert!(h.state.mode.is_navigation());
    assert_eq!(h.state.status.message, "jq closed");
    assert!(h.effects.queries.is_empty());

    h.press(KeyInput::char('j'));
    assert_eq!(h.state.scroll.offset(), 1);
}

#[test]
fn jq_error_panel_scrolls_within_its_lines() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('J'));
    if let Some(session) = h.state.mode.jq_mut() {
        session.last_error = Some("line one\nline two\nline three".to_string());
    }
    let error_scroll = |h: &Harness| h.state.mode.jq().map(|s| s.error_scroll);

    for _ in 0..4 {
        assert!(h.press(KeyInput::named(NamedKey::Down).with_shift()));
    }
    assert_eq!(error_scroll(&h), Some(2));

    h.press(KeyInput::named(NamedKey::Up).with_shift());
    assert_eq!(error_scroll(&h), Some(1));

    h.press(KeyInput::named(NamedKey::Tab));
    h.press(KeyInput::named(NamedKey::Down).with_shift());
    assert_eq!(error_scroll(&h), Some(2));
    for _ in 0..3 {
        h.press(KeyInput::named(NamedKey::Up).with_shift());
    }
    assert_eq!(error_scroll(&h), Some(0));
    assert!(h.state.mode.jq().is_some_and(|s| s.query().is_empty()));
}

#[test]
fn jq_return_submits_from_output_focus() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('J'));
    h.type_text(".items");
    h.press(KeyInput::named(NamedKey::Tab));

    assert!(h.press(KeyInput::named(NamedKey::Return)));
    assert_eq!(h.effects.queries.len(), 1);
    assert_eq!(h.effects.queries[0].query, ".items");
    let session = h.state.mode.jq().expect("jq session");
    assert_eq!(session.focus, JqFocus::Output);
    assert!(session.pending);
    assert_eq!(session.generation, h.effects.queries[0].generation);
}

#[test]
fn tree_view_gets_first_refusal() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('T'));
    assert!(h.state.view.tree);

    h.tree.consume = true;
    h.press(KeyInput::char('j'));
    assert_eq!(h.tree.seen, vec!["j".to_string()]);
    assert_eq!(h.state.scroll.offset(), 0);

    h.tree.consume = false;
    h.press(KeyInput::char('j'));
    assert_eq!(h.state.scroll.offset(), 1);
}

#[test]
fn goto_top_sequence_moves_the_tree() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('T'));
    h.press(KeyInput::char('G'));
    let bottom = h.state.scroll.offset();

    assert!(h.press(KeyInput::char('g')));
    assert!(h.dispatcher.goto().is_armed());
    assert_eq!(h.tree.tops, 0);

    assert!(h.press(KeyInput::char('g')));
    assert_eq!(h.tree.tops, 1);
    assert!(!h.dispatcher.goto().is_armed());
    assert_eq!(h.state.scroll.offset(), bottom);
}

#[test]
fn search_steps_reveal_matches_in_tree_views() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('T'));
    h.press(KeyInput::char('/'));
    h.type_text("x");
    h.press(KeyInput::named(NamedKey::Return));
    if let Some(search) = h.state.search.as_mut() {
        search.pending = false;
        search.matches = vec![5, 120];
    }

    h.press(KeyInput::char('n'));
    h.press(KeyInput::char('n'));
    assert_eq!(h.tree.revealed, [5, 120]);

    h.press(KeyInput::char('C'));
    h.press(KeyInput::char('N'));
    assert_eq!(
        h.collapsible.actions,
        [CollapsibleNavigationAction::RevealLine { line: 5 }]
    );

    h.press(KeyInput::char('S'));
    h.press(KeyInput::char('n'));
    assert_eq!(h.collapsible.actions.len(), 1);
    assert_eq!(h.tree.revealed.len(), 2);
}

#[test]
fn tree_delegate_errors_propagate() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('T'));
    h.tree.fail = true;
    let err = h.try_press(KeyInput::char('j')).expect_err("delegate error");
    assert!(matches!(err, AppError::Delegate { delegate: "tree", .. }));
}

#[test]
fn collapsible_view_translates_navigation() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('C'));
    assert!(h.state.view.collapsible);

    h.press(KeyInput::char('j'));
    h.press(KeyInput::named(NamedKey::Return));
    h.press(KeyInput::ctrl('f'));
    h.press(KeyInput::char('g'));
    h.press(KeyInput::char('g'));
    h.press(KeyInput::char('*'));

    assert_eq!(
        h.collapsible.actions,
        vec![
            CollapsibleNavigationAction::MoveDown,
            CollapsibleNavigationAction::ToggleNode,
            CollapsibleNavigationAction::PageDown { count: 19 },
            CollapsibleNavigationAction::GotoTop,
            CollapsibleNavigationAction::ExpandAll,
        ]
    );
    assert_eq!(h.state.scroll.offset(), 0);
}

#[test]
fn rejected_collapsible_action_falls_back_to_scrolling() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('C'));
    h.collapsible.reject = true;
    h.press(KeyInput::char('j'));
    assert_eq!(h.state.scroll.offset(), 1);
}

#[test]
fn tree_and_collapsible_are_mutually_exclusive() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('T'));
    h.press(KeyInput::char('C'));
    assert!(h.state.view.collapsible);
    assert!(!h.state.view.tree);
    h.press(KeyInput::char('T'));
    assert!(h.state.view.tree);
    assert!(!h.state.view.collapsible);
}

#[test]
fn exports_work_outside_navigation() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::char('/'));
    h.press(KeyInput::ctrl('e'));
    h.press(KeyInput::meta('e'));
    assert_eq!(h.effects.schema_exports, 1);
    assert_eq!(h.effects.data_exports, 1);
    assert!(h.state.mode.search().is_some());
}

#[test]
fn last_key_is_recorded_for_debug_panel() {
    let mut h = Harness::new(KeymapPreset::Default);
    h.press(KeyInput::ctrl('d'));
    assert_eq!(h.state.status.last_key.as_deref(), Some("Ctrl+d"));
    assert_eq!(h.state.scroll.offset(), 9);
}
