use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::CommittedSearch;
use crate::document::{JsonTree, TreeRow};
use crate::viewport::ScrollState;

const INDENT: &str = "  ";

/// Cuts `text` to at most `width` terminal columns without splitting a
/// grapheme.
pub(crate) fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut used = 0;
    let mut out = String::new();
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > width {
            break;
        }
        used += w;
        out.push_str(grapheme);
    }
    out
}

fn gutter_width(total: usize) -> usize {
    total.max(1).to_string().len()
}

fn match_style(search: Option<&CommittedSearch>, index: usize) -> Style {
    let Some(search) = search else {
        return Style::default();
    };
    if search.current_line() == Some(index) {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else if search.matches.binary_search(&index).is_ok() {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

/// Plain document lines inside the scroll window.
pub fn draw_lines(
    frame: &mut Frame<'_>,
    area: Rect,
    lines: &[String],
    scroll: &ScrollState,
    line_numbers: bool,
    search: Option<&CommittedSearch>,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let width = usize::from(area.width);
    let gutter = if line_numbers {
        gutter_width(lines.len())
    } else {
        0
    };
    let text_width = if line_numbers {
        width.saturating_sub(gutter + 1)
    } else {
        width
    };

    let range = scroll.visible();
    let rendered: Vec<Line<'_>> = (range.start..range.end)
        .filter_map(|index| lines.get(index).map(|text| (index, text)))
        .map(|(index, text)| {
            let mut spans = Vec::with_capacity(2);
            if line_numbers {
                spans.push(Span::styled(
                    format!("{:>gutter$} ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            spans.push(Span::raw(fit_width(text, text_width)));
            Line::from(spans).style(match_style(search, index))
        })
        .collect();
    frame.render_widget(Paragraph::new(rendered), area);
}

fn tree_line(row: &TreeRow, width: usize) -> Line<'static> {
    let text = format!("{}{}", INDENT.repeat(row.depth), row.text);
    let style = if row.selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Line::from(Span::styled(fit_width(&text, width), style))
}

pub fn draw_tree(frame: &mut Frame<'_>, area: Rect, tree: &JsonTree) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let width = usize::from(area.width);
    let rows: Vec<Line<'static>> = tree
        .visible_rows()
        .iter()
        .map(|row| tree_line(row, width))
        .collect();
    frame.render_widget(Paragraph::new(rows), area);
}
