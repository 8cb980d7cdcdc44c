use ratatui::Frame;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::app::{JqFocus, JqSession};
use crate::viewport::ScrollState;

use super::content::draw_lines;
use super::layout::JqLayout;
use super::overlay::{build_prompt_line, draw_error_panel};

const PROMPT: &str = "jq> ";

pub fn draw_jq_panes(
    frame: &mut Frame<'_>,
    layout: JqLayout,
    session: &JqSession,
    original: &[String],
    original_scroll: &ScrollState,
    line_numbers: bool,
) {
    let query_line = match session.focus {
        JqFocus::Input => build_prompt_line(
            PROMPT,
            session.query(),
            session.editor.cursor(),
            usize::from(layout.query.width),
        ),
        JqFocus::Output => Line::styled(
            format!("{PROMPT}{}", session.query()),
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(query_line), layout.query);

    if session.show_original {
        draw_lines(frame, layout.result, original, original_scroll, line_numbers, None);
    } else if let Some(result) = &session.result {
        draw_lines(
            frame,
            layout.result,
            result,
            &session.result_scroll,
            line_numbers,
            None,
        );
    } else {
        let hint = if session.pending {
            "running..."
        } else {
            "Enter runs the query, Tab switches to the results, Esc leaves jq"
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            layout.result,
        );
    }

    if let Some(error) = &session.last_error {
        draw_error_panel(frame, layout.result, error, session.error_scroll);
    }
}
