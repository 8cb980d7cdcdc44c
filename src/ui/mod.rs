mod chrome;
mod content;
mod jq;
mod layout;
mod overlay;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{Mode, ViewerState};
use crate::config::Config;
use crate::document::JsonTree;
use crate::input::HelpEntry;

pub use chrome::{Position, draw_header};
pub use content::{draw_lines, draw_tree};
pub use jq::draw_jq_panes;
pub use layout::{JqLayout, UiLayout, split_jq_layout, split_layout};
pub use overlay::{
    draw_debug_panel, draw_error_panel, draw_help_overlay, draw_search_bar, draw_settings_panel,
};

/// Everything one frame needs, borrowed from the app.
pub struct Screen<'a> {
    pub state: &'a ViewerState,
    pub file_name: &'a str,
    /// Lines of the plain content pane.
    pub lines: &'a [String],
    /// Set while the tree or collapsible view replaces the plain pane.
    pub tree: Option<&'a JsonTree>,
    pub help: &'a [HelpEntry],
    pub goto_armed: bool,
    pub config: &'a Config,
}

pub fn draw(frame: &mut Frame<'_>, screen: &Screen<'_>) {
    let area = frame.area();
    let state = screen.state;

    if let Mode::Jq(session) = &state.mode {
        let layout = split_jq_layout(area);
        let position = if session.pending {
            Position::Pending
        } else if session.show_original {
            Position::Lines(&state.scroll)
        } else {
            Position::Results(&session.result_scroll)
        };
        draw_header(frame, layout.header, state, screen.file_name, position);
        draw_jq_panes(
            frame,
            layout,
            session,
            screen.lines,
            &state.scroll,
            state.view.line_numbers,
        );
    } else {
        let layout = split_layout(area, state.search_overlay_active());
        let position = match screen.tree {
            Some(tree) => Position::Rows {
                cursor: tree.cursor(),
                total: tree.len(),
            },
            None => Position::Lines(&state.scroll),
        };
        draw_header(frame, layout.header, state, screen.file_name, position);
        match screen.tree {
            Some(tree) => draw_tree(frame, layout.content, tree),
            None => draw_lines(
                frame,
                layout.content,
                screen.lines,
                &state.scroll,
                state.view.line_numbers,
                state.search.as_ref(),
            ),
        }
        if let Some(bar) = layout.search_bar {
            draw_search_bar(frame, bar, state);
        }
    }

    // Panels never cover the header row.
    let body = Rect {
        y: area.y.saturating_add(1),
        height: area.height.saturating_sub(1),
        ..area
    };
    if matches!(state.mode, Mode::Help) {
        draw_help_overlay(frame, body, screen.help);
    }
    if state.view.settings {
        draw_settings_panel(frame, body, screen.config, state);
    }
    if state.view.debug {
        draw_debug_panel(frame, body, state, screen.goto_armed);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    use crate::app::{CommittedSearch, JqSession, Mode, SearchScope, SearchSession, ViewerState};
    use crate::config::Config;
    use crate::document::{JsonTree, TreeView};
    use crate::input::{KeymapPreset, TextEditor};
    use crate::viewport::ScrollState;

    use super::{Screen, draw};

    fn render(state: &ViewerState, lines: &[String], tree: Option<&JsonTree>) -> String {
        let config = Config::default();
        let keys = KeymapPreset::Default.classifier();
        let screen = Screen {
            state,
            file_name: "demo.json",
            lines,
            tree,
            help: keys.help_entries(),
            goto_armed: false,
            config: &config,
        };
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).expect("test terminal");
        terminal
            .draw(|frame| draw(frame, &screen))
            .expect("draw should pass");
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn lines(count: usize) -> Vec<String> {
        (0..count).map(|n| format!("row-{n}")).collect()
    }

    #[test]
    fn navigation_frame_shows_header_and_last_line_at_bottom() {
        let lines = lines(40);
        let mut state = ViewerState::new(12, lines.len());
        state.scroll.scroll_to_bottom();
        let text = render(&state, &lines, None);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].contains("demo.json | NAV | lines 30-40/40"));
        assert!(rows[11].starts_with("row-39"));
    }

    #[test]
    fn committed_search_keeps_last_line_above_search_bar() {
        let lines = lines(40);
        let mut state = ViewerState::new(12, lines.len());
        let mut search = CommittedSearch::pending("row".into(), SearchScope::All, false, 1);
        search.pending = false;
        search.matches = vec![39];
        search.current = Some(0);
        state.search = Some(search);
        state.sync_viewports();
        state.scroll.scroll_to_bottom();

        let text = render(&state, &lines, None);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[10].starts_with("row-39"));
        assert!(rows[11].starts_with("/row  1/1 [all]"));
    }

    #[test]
    fn search_prompt_and_help_overlay_render() {
        let lines = lines(3);
        let mut state = ViewerState::new(12, lines.len());
        state.mode = Mode::Search(SearchSession::seeded("ro", SearchScope::Keys, true));
        let text = render(&state, &lines, None);
        assert!(text.lines().nth(11).is_some_and(|row| row.starts_with("/ro")));
        assert!(text.contains("[keys regex]"));

        state.mode = Mode::Help;
        let text = render(&state, &lines, None);
        assert!(text.contains("scroll down"));
    }

    #[test]
    fn jq_frame_shows_query_result_and_error() {
        let lines = lines(3);
        let mut state = ViewerState::new(12, lines.len());
        state.mode = Mode::Jq(JqSession {
            editor: TextEditor::with_value(".name"),
            result: Some(vec!["\"demo\"".to_string()]),
            result_scroll: ScrollState::new(1, 10),
            last_error: Some("query failed: boom".to_string()),
            ..JqSession::default()
        });
        state.sync_viewports();
        let text = render(&state, &lines, None);
        assert!(text.contains("JQ:in"));
        assert!(text.contains("jq> .name"));
        assert!(text.contains("\"demo\""));
        assert!(text.contains("query failed: boom"));
    }

    #[test]
    fn tree_frame_and_panels_render() {
        let view = TreeView::new(
            &json!({"a": [1, 2], "b": {"c": true}}),
            KeymapPreset::Default.classifier(),
        );
        let mut state = ViewerState::new(12, 0);
        state.view.tree = true;
        state.view.debug = true;
        state.view.settings = true;
        let text = render(&state, &[], Some(view.tree()));
        assert!(text.contains("row 1/"));
        assert!(text.contains("Debug"));
        assert!(text.contains("Settings"));
    }
}
