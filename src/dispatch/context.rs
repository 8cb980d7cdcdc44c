use crate::app::{SearchScope, ViewerState};
use crate::error::AppResult;
use crate::input::KeyInput;

use super::goto::GotoSequence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    pub scope: SearchScope,
    pub regex: bool,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JqRequest {
    pub query: String,
    pub generation: u64,
}

/// Navigation intent sent to the collapsible tree collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapsibleNavigationAction {
    MoveUp,
    MoveDown,
    ToggleNode,
    ExpandNode,
    CollapseNode,
    ExpandAll,
    PageUp { count: usize },
    PageDown { count: usize },
    GotoTop,
    GotoBottom,
    /// Focus the node printed on this line of the pretty document.
    RevealLine { line: usize },
}

/// Side effects the handlers request from the outside world.
///
/// Implementations record or perform the request; none of these may block
/// the dispatcher.
pub trait ViewerEffects {
    fn request_exit(&mut self);
    fn export_schema(&mut self);
    fn export_data(&mut self);
    fn start_search(&mut self, request: SearchRequest);
    fn submit_jq(&mut self, request: JqRequest);
    fn restore_terminal(&mut self);
}

pub trait TreeDelegate {
    fn handle_key(&mut self, input: &str, key: &KeyInput) -> AppResult<bool>;

    /// Completes a two-key goto-top sequence the view refused to start.
    fn goto_top(&mut self) -> AppResult<bool>;

    /// Focuses the node printed on `line` of the pretty document.
    fn reveal_line(&mut self, line: usize) -> AppResult<bool>;
}

pub trait CollapsibleDelegate {
    fn apply(&mut self, action: CollapsibleNavigationAction) -> AppResult<bool>;
}

pub struct HandlerContext<'a> {
    pub state: &'a mut ViewerState,
    pub goto: &'a mut GotoSequence,
    pub effects: &'a mut dyn ViewerEffects,
    pub tree: &'a mut dyn TreeDelegate,
    pub collapsible: &'a mut dyn CollapsibleDelegate,
}
