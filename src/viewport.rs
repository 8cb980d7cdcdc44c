//! Scroll and viewport arithmetic shared by every scrollable pane.
//!
//! All functions are pure. The plain content pane reserves one header line
//! (`safe`); panes that also show the search bar reserve two
//! (`conservative`). Both heights must come from [`component_heights`] so the
//! last line stays reachable in either layout.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentHeights {
    pub total: i32,
    pub base: usize,
    pub safe: usize,
    pub conservative: usize,
    pub half: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBounds {
    pub max_scroll: usize,
    pub bounded_offset: usize,
    pub is_near_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
    pub count: usize,
}

pub fn component_heights(total_height: i32) -> ComponentHeights {
    let base = usize::try_from(total_height.saturating_sub(1)).unwrap_or(0);
    let safe = if total_height <= 0 { 1 } else { base.max(1) };
    let conservative = usize::try_from(total_height.saturating_sub(2))
        .unwrap_or(0)
        .max(1);
    let half = (conservative / 2).max(1);

    ComponentHeights {
        total: total_height,
        base,
        safe,
        conservative,
        half,
    }
}

pub fn scroll_bounds(offset: usize, total_items: usize, content_height: usize) -> ScrollBounds {
    let max_scroll = total_items.saturating_sub(content_height);
    let bounded_offset = offset.min(max_scroll);
    ScrollBounds {
        max_scroll,
        bounded_offset,
        is_near_end: bounded_offset + 1 >= max_scroll,
    }
}

pub fn visible_range(
    start: usize,
    content_height: usize,
    total_items: usize,
    is_near_end: bool,
) -> VisibleRange {
    let (start, end) = if is_near_end {
        (total_items.saturating_sub(content_height), total_items)
    } else {
        (start, start.saturating_add(content_height).min(total_items))
    };
    VisibleRange {
        start,
        end,
        count: end.saturating_sub(start),
    }
}

pub fn centered_scroll(target_index: usize, content_height: usize, max_scroll: usize) -> usize {
    target_index
        .saturating_sub(content_height / 2)
        .min(max_scroll)
}

pub fn scroll_to_visible(
    target_index: usize,
    current_offset: usize,
    content_height: usize,
    max_scroll: usize,
) -> usize {
    let content_height = content_height.max(1);
    let last_visible = current_offset + content_height - 1;
    if (current_offset..=last_visible).contains(&target_index) {
        return current_offset;
    }
    if target_index < current_offset {
        return target_index;
    }
    max_scroll.min(target_index + 1 - content_height)
}

/// Offset of one scrollable pane. Every mutation re-bounds through
/// [`scroll_bounds`], so the offset never exceeds the maximum scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
    total_items: usize,
    viewport_height: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            total_items: 0,
            viewport_height: 1,
        }
    }
}

impl ScrollState {
    pub fn new(total_items: usize, viewport_height: usize) -> Self {
        Self {
            offset: 0,
            total_items,
            viewport_height: viewport_height.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn bounds(&self) -> ScrollBounds {
        scroll_bounds(self.offset, self.total_items, self.viewport_height)
    }

    pub fn max_scroll(&self) -> usize {
        self.bounds().max_scroll
    }

    pub fn visible(&self) -> VisibleRange {
        let bounds = self.bounds();
        visible_range(
            bounds.bounded_offset,
            self.viewport_height,
            self.total_items,
            // Anchoring to the end is only needed once the window is full.
            bounds.is_near_end && bounds.max_scroll > 0,
        )
    }

    /// Re-derives bounds after the content or the terminal changed size.
    pub fn resize(&mut self, total_items: usize, viewport_height: usize) {
        self.total_items = total_items;
        self.viewport_height = viewport_height.max(1);
        self.set_offset(self.offset);
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = self.bounds_for(offset).bounded_offset;
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.set_offset(target);
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_scroll();
    }

    pub fn center_on(&mut self, index: usize) {
        self.offset = centered_scroll(index, self.viewport_height, self.max_scroll());
    }

    pub fn reveal(&mut self, index: usize) {
        self.offset = scroll_to_visible(
            index,
            self.offset,
            self.viewport_height,
            self.max_scroll(),
        );
    }

    fn bounds_for(&self, offset: usize) -> ScrollBounds {
        scroll_bounds(offset, self.total_items, self.viewport_height)
    }
}
