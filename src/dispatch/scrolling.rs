use crate::input::{KeyClassifier, KeyInput};
use crate::viewport::ScrollState;

use super::goto::GotoSequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScrollCommand {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    /// First press of a two-key top sequence; nothing moves yet.
    ArmTop,
    Top,
    Bottom,
}

pub(crate) fn classify_scroll(
    keys: &dyn KeyClassifier,
    input: &str,
    key: &KeyInput,
    goto: &mut GotoSequence,
) -> Option<ScrollCommand> {
    if keys.is_up(input, key) {
        return Some(ScrollCommand::LineUp);
    }
    if keys.is_down(input, key) {
        return Some(ScrollCommand::LineDown);
    }
    if keys.is_page_up(input, key) {
        return Some(ScrollCommand::PageUp);
    }
    if keys.is_page_down(input, key) {
        return Some(ScrollCommand::PageDown);
    }
    if keys.is_half_page_up(input, key) {
        return Some(ScrollCommand::HalfPageUp);
    }
    if keys.is_half_page_down(input, key) {
        return Some(ScrollCommand::HalfPageDown);
    }
    if keys.is_top(input, key) {
        if !keys.top_needs_sequence() || goto.press() {
            return Some(ScrollCommand::Top);
        }
        return Some(ScrollCommand::ArmTop);
    }
    if keys.is_bottom(input, key) {
        return Some(ScrollCommand::Bottom);
    }
    None
}

pub(crate) fn apply_scroll(scroll: &mut ScrollState, command: ScrollCommand, half_page: usize) {
    let page = as_delta(scroll.viewport_height());
    let half = as_delta(half_page);
    match command {
        ScrollCommand::LineUp => scroll.scroll_by(-1),
        ScrollCommand::LineDown => scroll.scroll_by(1),
        ScrollCommand::PageUp => scroll.scroll_by(-page),
        ScrollCommand::PageDown => scroll.scroll_by(page),
        ScrollCommand::HalfPageUp => scroll.scroll_by(-half),
        ScrollCommand::HalfPageDown => scroll.scroll_by(half),
        ScrollCommand::ArmTop => {}
        ScrollCommand::Top => scroll.scroll_to_top(),
        ScrollCommand::Bottom => scroll.scroll_to_bottom(),
    }
}

fn as_delta(lines: usize) -> isize {
    isize::try_from(lines).unwrap_or(isize::MAX)
}
