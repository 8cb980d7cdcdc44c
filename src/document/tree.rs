use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::{CollapsibleDelegate, CollapsibleNavigationAction, TreeDelegate};
use crate::error::AppResult;
use crate::input::{KeyClassifier, KeyInput};
use crate::viewport::ScrollState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeStyle {
    /// One row per node with fold markers.
    Outline,
    /// JSON text with foldable containers and closing brackets.
    Json,
}

#[derive(Debug, Clone)]
enum NodeBody {
    Leaf(String),
    Object(Vec<usize>),
    Array(Vec<usize>),
}

#[derive(Debug, Clone)]
struct Node {
    key: Option<String>,
    index: Option<usize>,
    depth: usize,
    parent: Option<usize>,
    last: bool,
    body: NodeBody,
}

impl Node {
    fn children(&self) -> &[usize] {
        match &self.body {
            NodeBody::Object(children) | NodeBody::Array(children) => children,
            NodeBody::Leaf(_) => &[],
        }
    }

    fn is_foldable(&self) -> bool {
        !self.children().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowRef {
    node: usize,
    closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub text: String,
    pub selected: bool,
}

/// Flattened JSON nodes with fold state, a cursor and its own viewport.
#[derive(Debug, Clone)]
pub struct JsonTree {
    style: TreeStyle,
    nodes: Vec<Node>,
    expanded: Vec<bool>,
    visible: Vec<RowRef>,
    cursor: usize,
    scroll: ScrollState,
}

impl JsonTree {
    fn new(value: &Value, style: TreeStyle) -> Self {
        let mut nodes = Vec::new();
        push_node(&mut nodes, value, None, None, 0, None, true);
        let expanded = match style {
            TreeStyle::Outline => (0..nodes.len()).map(|id| id == 0).collect(),
            TreeStyle::Json => vec![true; nodes.len()],
        };
        let mut tree = Self {
            style,
            nodes,
            expanded,
            visible: Vec::new(),
            cursor: 0,
            scroll: ScrollState::default(),
        };
        tree.rebuild(0);
        tree
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.scroll.resize(self.visible.len(), height);
        self.scroll.reveal(self.cursor);
    }

    /// Rows inside the current viewport.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let range = self.scroll.visible();
        (range.start..range.end)
            .filter_map(|idx| {
                let row = *self.visible.get(idx)?;
                Some(TreeRow {
                    depth: self.nodes[row.node].depth,
                    text: self.label(row),
                    selected: idx == self.cursor,
                })
            })
            .collect()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta.unsigned_abs())
        };
        self.set_cursor(target);
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.visible.len().saturating_sub(1));
        self.scroll.reveal(self.cursor);
    }

    pub fn toggle(&mut self) {
        let node = self.current_node();
        if self.nodes[node].is_foldable() {
            self.expanded[node] = !self.expanded[node];
            self.rebuild(node);
        }
    }

    pub fn expand(&mut self) {
        let node = self.current_node();
        if self.nodes[node].is_foldable() && !self.expanded[node] {
            self.expanded[node] = true;
            self.rebuild(node);
        }
    }

    /// Folds the current container, or jumps to the parent when there is
    /// nothing to fold.
    pub fn collapse(&mut self) {
        let node = self.current_node();
        if self.nodes[node].is_foldable() && self.expanded[node] {
            self.expanded[node] = false;
            self.rebuild(node);
            return;
        }
        if let Some(parent) = self.nodes[node].parent {
            self.focus_node(parent);
        }
    }

    pub fn expand_all(&mut self) {
        let node = self.current_node();
        self.expanded.iter_mut().for_each(|open| *open = true);
        self.rebuild(node);
    }

    /// Moves the cursor to the node printed on `line` of the pretty
    /// document, unfolding its ancestors. Closing brackets map to their
    /// container.
    pub fn reveal_line(&mut self, line: usize) -> bool {
        let open = vec![true; self.nodes.len()];
        let mut printed = Vec::new();
        collect_rows(&self.nodes, &open, TreeStyle::Json, 0, &mut printed);
        let Some(&row) = printed.get(line) else {
            return false;
        };

        let mut ancestor = self.nodes[row.node].parent;
        while let Some(id) = ancestor {
            self.expanded[id] = true;
            ancestor = self.nodes[id].parent;
        }
        self.rebuild(row.node);
        self.scroll.center_on(self.cursor);
        true
    }

    fn current_node(&self) -> usize {
        self.visible.get(self.cursor).map(|row| row.node).unwrap_or(0)
    }

    fn focus_node(&mut self, node: usize) {
        if let Some(idx) = self
            .visible
            .iter()
            .position(|row| row.node == node && !row.closing)
        {
            self.set_cursor(idx);
        }
    }

    fn rebuild(&mut self, focus: usize) {
        self.visible.clear();
        collect_rows(&self.nodes, &self.expanded, self.style, 0, &mut self.visible);
        let height = self.scroll.viewport_height();
        self.scroll.resize(self.visible.len(), height);
        self.focus_node(focus);
    }

    fn label(&self, row: RowRef) -> String {
        let node = &self.nodes[row.node];
        let expanded = self.expanded[row.node];
        match self.style {
            TreeStyle::Outline => {
                let name = match (&node.key, node.index) {
                    (Some(key), _) => key.clone(),
                    (None, Some(index)) => format!("[{index}]"),
                    (None, None) => "(root)".to_string(),
                };
                let marker = if expanded { "▾" } else { "▸" };
                match &node.body {
                    NodeBody::Leaf(text) => format!("  {name}: {text}"),
                    NodeBody::Object(children) if children.is_empty() => format!("  {name}: {{}}"),
                    NodeBody::Array(children) if children.is_empty() => format!("  {name}: []"),
                    NodeBody::Object(children) => format!("{marker} {name} {{{}}}", children.len()),
                    NodeBody::Array(children) => format!("{marker} {name} [{}]", children.len()),
                }
            }
            TreeStyle::Json => {
                let comma = if node.last { "" } else { "," };
                let (open, close) = match node.body {
                    NodeBody::Array(_) => ('[', ']'),
                    _ => ('{', '}'),
                };
                if row.closing {
                    return format!("{close}{comma}");
                }
                let prefix = node
                    .key
                    .as_ref()
                    .map(|key| format!("{}: ", Value::String(key.clone())))
                    .unwrap_or_default();
                match &node.body {
                    NodeBody::Leaf(text) => format!("{prefix}{text}{comma}"),
                    NodeBody::Object(children) | NodeBody::Array(children) => {
                        if children.is_empty() {
                            format!("{prefix}{open}{close}{comma}")
                        } else if expanded {
                            format!("{prefix}{open}")
                        } else {
                            format!("{prefix}{open}…{close}{comma}  ({} items)", children.len())
                        }
                    }
                }
            }
        }
    }
}

fn push_node(
    nodes: &mut Vec<Node>,
    value: &Value,
    key: Option<String>,
    index: Option<usize>,
    depth: usize,
    parent: Option<usize>,
    last: bool,
) -> usize {
    let id = nodes.len();
    nodes.push(Node {
        key,
        index,
        depth,
        parent,
        last,
        body: NodeBody::Leaf(String::new()),
    });
    let body = match value {
        Value::Object(map) => {
            let len = map.len();
            let children = map
                .iter()
                .enumerate()
                .map(|(idx, (key, child))| {
                    push_node(nodes, child, Some(key.clone()), None, depth + 1, Some(id), idx + 1 == len)
                })
                .collect();
            NodeBody::Object(children)
        }
        Value::Array(items) => {
            let len = items.len();
            let children = items
                .iter()
                .enumerate()
                .map(|(idx, child)| {
                    push_node(nodes, child, None, Some(idx), depth + 1, Some(id), idx + 1 == len)
                })
                .collect();
            NodeBody::Array(children)
        }
        leaf => NodeBody::Leaf(leaf.to_string()),
    };
    nodes[id].body = body;
    id
}

fn collect_rows(
    nodes: &[Node],
    expanded: &[bool],
    style: TreeStyle,
    id: usize,
    out: &mut Vec<RowRef>,
) {
    out.push(RowRef {
        node: id,
        closing: false,
    });
    let node = &nodes[id];
    if !node.is_foldable() || !expanded[id] {
        return;
    }
    for &child in node.children() {
        collect_rows(nodes, expanded, style, child, out);
    }
    if style == TreeStyle::Json {
        out.push(RowRef {
            node: id,
            closing: true,
        });
    }
}

fn as_delta(lines: usize) -> isize {
    isize::try_from(lines).unwrap_or(isize::MAX)
}

/// Outline tree driven directly by keystrokes.
pub struct TreeView {
    tree: JsonTree,
    keys: Arc<dyn KeyClassifier>,
}

impl TreeView {
    pub fn new(value: &Value, keys: Arc<dyn KeyClassifier>) -> Self {
        Self {
            tree: JsonTree::new(value, TreeStyle::Outline),
            keys,
        }
    }

    pub fn tree(&self) -> &JsonTree {
        &self.tree
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.tree.set_viewport_height(height);
    }

    pub fn focus_line(&mut self, line: usize) -> bool {
        self.tree.reveal_line(line)
    }
}

impl TreeDelegate for TreeView {
    fn handle_key(&mut self, input: &str, key: &KeyInput) -> AppResult<bool> {
        let keys = self.keys.as_ref();
        let page = as_delta(self.tree.scroll.viewport_height());
        let half = (page / 2).max(1);
        let tree = &mut self.tree;

        if keys.is_up(input, key) {
            tree.move_cursor(-1);
        } else if keys.is_down(input, key) {
            tree.move_cursor(1);
        } else if keys.is_page_up(input, key) {
            tree.move_cursor(-page);
        } else if keys.is_page_down(input, key) {
            tree.move_cursor(page);
        } else if keys.is_half_page_up(input, key) {
            tree.move_cursor(-half);
        } else if keys.is_half_page_down(input, key) {
            tree.move_cursor(half);
        } else if keys.is_bottom(input, key) {
            tree.set_cursor(usize::MAX);
        } else if keys.is_top(input, key) && !keys.top_needs_sequence() {
            tree.set_cursor(0);
        } else if keys.is_toggle_node(input, key) {
            tree.toggle();
        } else if keys.is_expand_node(input, key) {
            tree.expand();
        } else if keys.is_collapse_node(input, key) {
            tree.collapse();
        } else if keys.is_expand_all(input, key) {
            tree.expand_all();
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    fn goto_top(&mut self) -> AppResult<bool> {
        self.tree.set_cursor(0);
        Ok(true)
    }

    fn reveal_line(&mut self, line: usize) -> AppResult<bool> {
        Ok(self.focus_line(line))
    }
}

/// The document as foldable JSON text.
pub struct CollapsibleView {
    tree: JsonTree,
}

impl CollapsibleView {
    pub fn new(value: &Value) -> Self {
        Self {
            tree: JsonTree::new(value, TreeStyle::Json),
        }
    }

    pub fn tree(&self) -> &JsonTree {
        &self.tree
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.tree.set_viewport_height(height);
    }

    pub fn focus_line(&mut self, line: usize) -> bool {
        self.tree.reveal_line(line)
    }
}

impl CollapsibleDelegate for CollapsibleView {
    fn apply(&mut self, action: CollapsibleNavigationAction) -> AppResult<bool> {
        let tree = &mut self.tree;
        match action {
            CollapsibleNavigationAction::MoveUp => tree.move_cursor(-1),
            CollapsibleNavigationAction::MoveDown => tree.move_cursor(1),
            CollapsibleNavigationAction::ToggleNode => tree.toggle(),
            CollapsibleNavigationAction::ExpandNode => tree.expand(),
            CollapsibleNavigationAction::CollapseNode => tree.collapse(),
            CollapsibleNavigationAction::ExpandAll => tree.expand_all(),
            CollapsibleNavigationAction::PageUp { count } => tree.move_cursor(-as_delta(count)),
            CollapsibleNavigationAction::PageDown { count } => tree.move_cursor(as_delta(count)),
            CollapsibleNavigationAction::GotoTop => tree.set_cursor(0),
            CollapsibleNavigationAction::GotoBottom => tree.set_cursor(usize::MAX),
            CollapsibleNavigationAction::RevealLine { line } => return Ok(tree.reveal_line(line)),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::dispatch::{CollapsibleDelegate, CollapsibleNavigationAction, TreeDelegate};
    use crate::input::{KeyInput, KeymapPreset, NamedKey};

    use super::{CollapsibleView, TreeView};

    fn texts(rows: Vec<super::TreeRow>) -> Vec<String> {
        rows.into_iter().map(|row| row.text).collect()
    }

    #[test]
    fn outline_starts_with_root_open_and_toggles_children() {
        let value = json!({"a": {"b": 1}, "list": [1, 2]});
        let mut view = TreeView::new(&value, KeymapPreset::Default.classifier());
        view.set_viewport_height(10);
        assert_eq!(
            texts(view.tree().visible_rows()),
            ["▾ (root) {2}", "▸ a {1}", "▸ list [2]"]
        );

        let down = KeyInput::char('j');
        assert!(view.handle_key("j", &down).expect("tree key"));
        assert!(view.handle_key("", &KeyInput::named(NamedKey::Return)).expect("toggle"));
        assert_eq!(
            texts(view.tree().visible_rows()),
            ["▾ (root) {2}", "▾ a {1}", "  b: 1", "▸ list [2]"]
        );
        assert_eq!(view.tree().cursor(), 1);

        assert!(!view.handle_key("/", &KeyInput::char('/')).expect("not a tree key"));
    }

    #[test]
    fn collapse_on_leaf_jumps_to_parent() {
        let value = json!({"a": {"b": 1}});
        let mut view = TreeView::new(&value, KeymapPreset::Default.classifier());
        view.set_viewport_height(10);
        view.handle_key("*", &KeyInput::char('*')).expect("expand all");
        view.handle_key("G", &KeyInput::char('G')).expect("bottom");
        assert_eq!(view.tree().cursor(), 2);

        view.handle_key("h", &KeyInput::char('h')).expect("collapse");
        assert_eq!(view.tree().cursor(), 1);
        view.handle_key("h", &KeyInput::char('h')).expect("collapse");
        assert_eq!(view.tree().len(), 2);
    }

    #[test]
    fn reveal_line_unfolds_ancestors_of_the_printed_node() {
        // Printed as: `{`, `"a": {`, `"b": 1`, `},`, `"c": 2`, `}`.
        let value = json!({"a": {"b": 1}, "c": 2});
        let mut view = TreeView::new(&value, KeymapPreset::Default.classifier());
        view.set_viewport_height(10);
        assert_eq!(view.tree().len(), 3);

        assert!(view.reveal_line(2).expect("reveal"));
        assert_eq!(
            texts(view.tree().visible_rows()),
            ["▾ (root) {2}", "▾ a {1}", "  b: 1", "  c: 2"]
        );
        assert_eq!(view.tree().cursor(), 2);

        assert!(view.reveal_line(3).expect("closing bracket"));
        assert_eq!(view.tree().cursor(), 1);
        assert!(view.reveal_line(4).expect("sibling"));
        assert_eq!(view.tree().cursor(), 3);
        assert!(!view.reveal_line(6).expect("past the end"));
        assert_eq!(view.tree().cursor(), 3);

        view.goto_top().expect("top");
        assert_eq!(view.tree().cursor(), 0);
    }

    #[test]
    fn collapsible_reveal_line_matches_document_lines() {
        let value = json!({"a": [1, 2], "b": true});
        let mut view = CollapsibleView::new(&value);
        view.set_viewport_height(10);
        view.apply(CollapsibleNavigationAction::MoveDown).expect("move");
        view.apply(CollapsibleNavigationAction::ToggleNode).expect("fold");

        assert!(
            view.apply(CollapsibleNavigationAction::RevealLine { line: 3 })
                .expect("reveal")
        );
        assert_eq!(view.tree().cursor(), 3);
        assert_eq!(texts(view.tree().visible_rows())[3], "2");
    }

    #[test]
    fn collapsible_view_folds_json_text() {
        let value = json!({"a": [1, 2], "b": {}});
        let mut view = CollapsibleView::new(&value);
        view.set_viewport_height(10);
        assert_eq!(
            texts(view.tree().visible_rows()),
            ["{", "\"a\": [", "1,", "2", "],", "\"b\": {}", "}"]
        );

        view.apply(CollapsibleNavigationAction::MoveDown).expect("move");
        view.apply(CollapsibleNavigationAction::ToggleNode).expect("fold");
        assert_eq!(
            texts(view.tree().visible_rows()),
            ["{", "\"a\": […],  (2 items)", "\"b\": {}", "}"]
        );

        view.apply(CollapsibleNavigationAction::GotoBottom).expect("bottom");
        assert_eq!(view.tree().cursor(), 3);
        view.apply(CollapsibleNavigationAction::PageUp { count: 10 }).expect("page");
        assert_eq!(view.tree().cursor(), 0);
    }

    #[test]
    fn cursor_stays_inside_small_viewport() {
        let value = json!((0..50).collect::<Vec<_>>());
        let mut view = CollapsibleView::new(&value);
        view.set_viewport_height(5);
        view.apply(CollapsibleNavigationAction::PageDown { count: 20 }).expect("page");
        let scroll = view.tree().scroll();
        assert!(scroll.offset() <= 20 && 20 < scroll.offset() + 5);
        assert_eq!(view.tree().visible_rows().len(), 5);
    }
}
