use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions. Row counts match the heights the scroll engine uses:
/// one header row, plus one search bar row while the overlay is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub header: Rect,
    pub content: Rect,
    pub search_bar: Option<Rect>,
}

pub fn split_layout(area: Rect, search_bar: bool) -> UiLayout {
    let bar_height = u16::from(search_bar);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(bar_height),
        ])
        .split(area);

    UiLayout {
        header: chunks[0],
        content: chunks[1],
        search_bar: search_bar.then_some(chunks[2]),
    }
}

/// Jq screen: header, query line, result pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JqLayout {
    pub header: Rect,
    pub query: Rect,
    pub result: Rect,
}

pub fn split_jq_layout(area: Rect) -> JqLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    JqLayout {
        header: chunks[0],
        query: chunks[1],
        result: chunks[2],
    }
}

pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.max(1).min(area.width);
    let height = height.max(1).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// A box pinned to the bottom edge of `area`, full width.
pub(crate) fn bottom_rect(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect::new(area.x, area.y + area.height - height, area.width, height)
}

/// A box pinned to the top-right corner of `area`.
pub(crate) fn top_right_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(area.x + area.width - width, area.y, width, height)
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use crate::viewport::component_heights;

    use super::{bottom_rect, centered_rect, split_jq_layout, split_layout};

    #[test]
    fn plain_layout_content_matches_safe_height() {
        let area = Rect::new(0, 0, 80, 20);
        let layout = split_layout(area, false);
        assert_eq!(layout.header.height, 1);
        assert_eq!(usize::from(layout.content.height), component_heights(20).safe);
        assert!(layout.search_bar.is_none());
    }

    #[test]
    fn search_layout_content_matches_conservative_height() {
        let area = Rect::new(0, 0, 80, 20);
        let layout = split_layout(area, true);
        assert_eq!(
            usize::from(layout.content.height),
            component_heights(20).conservative
        );
        let bar = layout.search_bar.expect("search bar row");
        assert_eq!(bar.y, 19);
        assert_eq!(bar.height, 1);
    }

    #[test]
    fn jq_result_pane_matches_conservative_height() {
        let layout = split_jq_layout(Rect::new(0, 0, 80, 30));
        assert_eq!(usize::from(layout.result.height), component_heights(30).conservative);
        assert_eq!(layout.query.y, 1);
    }

    #[test]
    fn centered_rect_stays_within_area() {
        let area = Rect::new(10, 5, 20, 8);
        let centered = centered_rect(area, 99, 99);
        assert_eq!(centered, area);
    }

    #[test]
    fn bottom_rect_hugs_the_bottom_edge() {
        let area = Rect::new(0, 2, 40, 10);
        assert_eq!(bottom_rect(area, 4), Rect::new(0, 8, 40, 4));
        assert_eq!(bottom_rect(area, 99), area);
    }
}
