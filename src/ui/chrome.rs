use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{JqFocus, Mode, ViewerState};
use crate::viewport::ScrollState;

use super::content::fit_width;

/// What the position field of the header reports.
#[derive(Debug, Clone, Copy)]
pub enum Position<'a> {
    Lines(&'a ScrollState),
    Rows { cursor: usize, total: usize },
    Results(&'a ScrollState),
    Pending,
}

fn position_label(position: Position<'_>) -> String {
    match position {
        Position::Lines(scroll) | Position::Results(scroll) => {
            let range = scroll.visible();
            let noun = if matches!(position, Position::Lines(_)) {
                "lines"
            } else {
                "results"
            };
            if range.count == 0 {
                format!("{noun} 0/0")
            } else {
                format!(
                    "{noun} {}-{}/{}",
                    range.start + 1,
                    range.end,
                    scroll.total_items()
                )
            }
        }
        Position::Rows { cursor, total } => {
            format!("row {}/{}", if total == 0 { 0 } else { cursor + 1 }, total)
        }
        Position::Pending => "running...".to_string(),
    }
}

fn mode_label(state: &ViewerState) -> String {
    let mut label = state.mode.kind().label().to_string();
    if let Mode::Jq(session) = &state.mode {
        label.push_str(match session.focus {
            JqFocus::Input => ":in",
            JqFocus::Output => ":out",
        });
        if session.show_original {
            label.push_str(" orig");
        }
    }
    if state.view.tree {
        label.push_str(" +tree");
    }
    if state.view.collapsible {
        label.push_str(" +fold");
    }
    if state.view.schema {
        label.push_str(" +schema");
    }
    label
}

pub fn draw_header(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &ViewerState,
    file_name: &str,
    position: Position<'_>,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let left = format!(" {file_name} | {} | {} ", mode_label(state), position_label(position));
    let mut spans = vec![Span::styled(
        left.clone(),
        Style::default().add_modifier(Modifier::REVERSED),
    )];
    if !state.status.message.is_empty() {
        let room = usize::from(area.width).saturating_sub(left.chars().count() + 1);
        spans.push(Span::styled(
            format!(" {}", fit_width(&state.status.message, room)),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
