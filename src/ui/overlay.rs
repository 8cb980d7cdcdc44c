use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{Mode, ViewerState};
use crate::config::Config;
use crate::input::HelpEntry;

use super::layout::{bottom_rect, centered_rect, top_right_rect};

/// Single-row text prompt with a software caret.
///
/// The window slides so the caret cell stays visible; the caret sits on a
/// trailing blank when the cursor is at the end of the text.
pub(crate) fn build_prompt_line(
    prefix: &str,
    input: &str,
    cursor: usize,
    width: usize,
) -> Line<'static> {
    let prefix_width = prefix.chars().count();
    let room = width.saturating_sub(prefix_width).max(1);

    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());
    let start = (cursor + 1).saturating_sub(room);

    let mut spans = vec![Span::styled(
        prefix.to_string(),
        Style::default().fg(Color::Cyan),
    )];
    for offset in 0..room {
        let idx = start + offset;
        let ch = chars.get(idx).copied().unwrap_or(' ');
        if idx == cursor {
            spans.push(Span::styled(
                ch.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        } else if idx < chars.len() {
            spans.push(Span::raw(ch.to_string()));
        } else {
            break;
        }
    }
    Line::from(spans)
}

/// Bottom search row: the live prompt while typing, the committed term and
/// match position afterwards.
pub fn draw_search_bar(frame: &mut Frame<'_>, area: Rect, state: &ViewerState) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let width = usize::from(area.width);
    let line = match &state.mode {
        Mode::Search(session) => {
            let mut line = build_prompt_line(
                "/",
                session.term(),
                session.editor.cursor(),
                width.saturating_sub(16),
            );
            let regex = if session.regex { " regex" } else { "" };
            line.spans.push(Span::styled(
                format!("  [{}{regex}]", session.scope.label()),
                Style::default().fg(Color::DarkGray),
            ));
            line
        }
        _ => match &state.search {
            Some(search) => {
                let position = if search.pending {
                    "searching...".to_string()
                } else if search.matches.is_empty() {
                    "no matches".to_string()
                } else {
                    let current = search.current.map_or(0, |idx| idx + 1);
                    format!("{current}/{}", search.matches.len())
                };
                Line::from(vec![
                    Span::styled("/", Style::default().fg(Color::Cyan)),
                    Span::raw(search.term.clone()),
                    Span::styled(
                        format!("  {position} [{}]", search.scope.label()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            }
            None => Line::default(),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn draw_help_overlay(frame: &mut Frame<'_>, area: Rect, entries: &[HelpEntry]) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let key_width = entries
        .iter()
        .map(|entry| entry.keys.chars().count())
        .max()
        .unwrap_or(0);
    let lines: Vec<Line<'_>> = entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<key_width$}  ", entry.keys),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(entry.description),
            ])
        })
        .collect();

    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let popup = centered_rect(area, 60, height);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Keys (? or Esc to close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn draw_settings_panel(frame: &mut Frame<'_>, area: Rect, config: &Config, state: &ViewerState) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    let rows = [
        ("keymap", config.keymap.preset.clone()),
        ("line numbers", on_off(state.view.line_numbers).to_string()),
        ("tree view", on_off(state.view.tree).to_string()),
        ("collapsible", on_off(state.view.collapsible).to_string()),
        ("schema view", on_off(state.view.schema).to_string()),
        (
            "search history",
            format!(
                "{} / {}",
                state.search_history.len(),
                config.viewer.search_history_limit
            ),
        ),
        ("jq cache", config.viewer.jq_cache_entries.to_string()),
        ("workers", config.viewer.worker_threads.to_string()),
        ("log filter", config.log.filter.clone()),
    ];
    let lines: Vec<Line<'_>> = rows
        .into_iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!(" {name:<15}"), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        })
        .collect();

    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let popup = centered_rect(area, 44, height);
    frame.render_widget(Clear, popup);
    let block = Block::default().title(" Settings ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn draw_debug_panel(frame: &mut Frame<'_>, area: Rect, state: &ViewerState, goto_armed: bool) {
    if area.width < 4 || area.height < 3 {
        return;
    }
    let bounds = state.scroll.bounds();
    let heights = state.heights();
    let search = state.search.as_ref().map_or_else(
        || "-".to_string(),
        |search| {
            format!(
                "gen {} {}",
                search.generation,
                if search.pending { "pending" } else { "done" }
            )
        },
    );
    let lines = vec![
        Line::from(format!("mode    {}", state.mode.kind().label())),
        Line::from(format!(
            "scroll  {}/{} of {}",
            bounds.bounded_offset,
            bounds.max_scroll,
            state.scroll.total_items()
        )),
        Line::from(format!(
            "heights {} safe {} cons {}",
            heights.total, heights.safe, heights.conservative
        )),
        Line::from(format!("content {}", state.content_height())),
        Line::from(format!(
            "key     {}",
            state.status.last_key.as_deref().unwrap_or("-")
        )),
        Line::from(format!("goto    {}", if goto_armed { "armed" } else { "-" })),
        Line::from(format!("search  {search}")),
    ];

    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let popup = top_right_rect(area, 34, height);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Debug ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Jq error text, scrolled by whole lines.
pub fn draw_error_panel(frame: &mut Frame<'_>, area: Rect, message: &str, scroll: usize) {
    if area.width == 0 || area.height < 3 {
        return;
    }
    let popup = bottom_rect(area, area.height.min(6));
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Error (Shift+Up/Down to scroll) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
        .block(block);
    frame.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;
    use ratatui::style::Modifier;

    use crate::input::KeymapPreset;

    use super::{build_prompt_line, draw_help_overlay};

    #[test]
    fn prompt_caret_sits_on_the_cursor_character() {
        let line = build_prompt_line("/", "abc", 1, 12);
        assert_eq!(line.spans[2].content.as_ref(), "b");
        assert!(line.spans[2].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn prompt_caret_at_end_uses_trailing_blank() {
        let line = build_prompt_line("/", "abc", 3, 12);
        assert_eq!(line.spans.len(), 5);
        assert_eq!(line.spans[4].content.as_ref(), " ");
        assert!(line.spans[4].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn prompt_window_slides_to_keep_caret_visible() {
        let line = build_prompt_line("> ", "abcdefghij", 10, 6);
        let text: String = line.spans[1..].iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "hij ");
    }

    #[test]
    fn help_overlay_draws_in_a_tiny_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(12, 4)).expect("test terminal");
        terminal
            .draw(|frame| {
                draw_help_overlay(
                    frame,
                    Rect::new(0, 0, 12, 4),
                    KeymapPreset::Default.classifier().help_entries(),
                );
            })
            .expect("draw should pass");
    }
}
