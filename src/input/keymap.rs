use std::sync::Arc;

use super::events::{KeyInput, NamedKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapPreset {
    Default,
    Emacs,
}

impl KeymapPreset {
    pub fn parse(value: &str) -> Self {
        match value {
            "default" => Self::Default,
            "emacs" => Self::Emacs,
            _ => Self::Default,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Emacs => "emacs",
        }
    }

    pub fn classifier(self) -> Arc<dyn KeyClassifier> {
        match self {
            Self::Default => Arc::new(DefaultKeymap),
            Self::Emacs => Arc::new(EmacsKeymap),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Names every semantic command a keystroke can mean.
///
/// Predicates are pure and may overlap; the dispatcher's handler order
/// decides which meaning wins. Every preset must implement every predicate.
pub trait KeyClassifier: Send + Sync {
    fn is_up(&self, input: &str, key: &KeyInput) -> bool;
    fn is_down(&self, input: &str, key: &KeyInput) -> bool;
    fn is_quit(&self, input: &str, key: &KeyInput) -> bool;
    fn is_interrupt(&self, input: &str, key: &KeyInput) -> bool;
    fn is_search(&self, input: &str, key: &KeyInput) -> bool;
    fn is_jq(&self, input: &str, key: &KeyInput) -> bool;
    fn is_top(&self, input: &str, key: &KeyInput) -> bool;
    fn is_bottom(&self, input: &str, key: &KeyInput) -> bool;
    fn is_page_up(&self, input: &str, key: &KeyInput) -> bool;
    fn is_page_down(&self, input: &str, key: &KeyInput) -> bool;
    fn is_half_page_up(&self, input: &str, key: &KeyInput) -> bool;
    fn is_half_page_down(&self, input: &str, key: &KeyInput) -> bool;
    fn is_search_next(&self, input: &str, key: &KeyInput) -> bool;
    fn is_search_previous(&self, input: &str, key: &KeyInput) -> bool;
    fn is_search_exit(&self, input: &str, key: &KeyInput) -> bool;
    fn is_export(&self, input: &str, key: &KeyInput) -> bool;
    fn is_export_data(&self, input: &str, key: &KeyInput) -> bool;
    fn is_help(&self, input: &str, key: &KeyInput) -> bool;
    fn is_tree(&self, input: &str, key: &KeyInput) -> bool;
    fn is_collapsible(&self, input: &str, key: &KeyInput) -> bool;
    fn is_schema(&self, input: &str, key: &KeyInput) -> bool;
    fn is_line_numbers(&self, input: &str, key: &KeyInput) -> bool;
    fn is_debug(&self, input: &str, key: &KeyInput) -> bool;
    fn is_settings(&self, input: &str, key: &KeyInput) -> bool;
    fn is_toggle_node(&self, input: &str, key: &KeyInput) -> bool;
    fn is_expand_node(&self, input: &str, key: &KeyInput) -> bool;
    fn is_collapse_node(&self, input: &str, key: &KeyInput) -> bool;
    fn is_expand_all(&self, input: &str, key: &KeyInput) -> bool;
    /// Whether `is_top` arms a two-key sequence instead of jumping at once.
    fn top_needs_sequence(&self) -> bool;
    fn help_entries(&self) -> &'static [HelpEntry];
}

/// Plain character command: no ctrl/meta, exactly one character.
fn plain(input: &str, key: &KeyInput, ch: char) -> bool {
    !key.has_modifier() && key.named == NamedKey::None && single_char(input, key) == Some(ch)
}

fn ctrl(input: &str, key: &KeyInput, ch: char) -> bool {
    key.ctrl
        && !key.meta
        && single_char(input, key).is_some_and(|typed| typed.eq_ignore_ascii_case(&ch))
}

fn meta(input: &str, key: &KeyInput, ch: char) -> bool {
    key.meta && !key.ctrl && single_char(input, key) == Some(ch)
}

fn single_char(input: &str, key: &KeyInput) -> Option<char> {
    if input.is_empty() {
        return key.single_char();
    }
    let mut chars = input.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(first)
}

fn named(key: &KeyInput, named: NamedKey) -> bool {
    key.named == named && !key.ctrl && !key.meta
}

const DEFAULT_HELP: &[HelpEntry] = &[
    HelpEntry { keys: "j / Down", description: "scroll down" },
    HelpEntry { keys: "k / Up", description: "scroll up" },
    HelpEntry { keys: "Ctrl+f / PgDn", description: "page down" },
    HelpEntry { keys: "Ctrl+b / PgUp", description: "page up" },
    HelpEntry { keys: "Ctrl+d / Ctrl+u", description: "half page down / up" },
    HelpEntry { keys: "g g", description: "go to top" },
    HelpEntry { keys: "G", description: "go to bottom" },
    HelpEntry { keys: "/", description: "search" },
    HelpEntry { keys: "n / N", description: "next / previous match" },
    HelpEntry { keys: "Tab", description: "cycle search scope (in search)" },
    HelpEntry { keys: "Ctrl+r", description: "toggle regex (in search)" },
    HelpEntry { keys: "Ctrl+a / End", description: "prompt line start / end" },
    HelpEntry { keys: "Esc", description: "leave search / jq / help" },
    HelpEntry { keys: "J", description: "jq query" },
    HelpEntry { keys: "T", description: "tree view" },
    HelpEntry { keys: "C", description: "collapsible view" },
    HelpEntry { keys: "Enter / Space", description: "toggle node" },
    HelpEntry { keys: "l / h", description: "expand / collapse node" },
    HelpEntry { keys: "*", description: "expand all" },
    HelpEntry { keys: "S", description: "schema view" },
    HelpEntry { keys: "L", description: "line numbers" },
    HelpEntry { keys: "D", description: "debug panel" },
    HelpEntry { keys: ",", description: "settings" },
    HelpEntry { keys: "Ctrl+e", description: "export schema" },
    HelpEntry { keys: "Alt+e", description: "export data" },
    HelpEntry { keys: "?", description: "toggle help" },
    HelpEntry { keys: "q / Ctrl+c", description: "quit" },
];

const EMACS_HELP: &[HelpEntry] = &[
    HelpEntry { keys: "Ctrl+n / Down", description: "scroll down" },
    HelpEntry { keys: "Ctrl+p / Up", description: "scroll up" },
    HelpEntry { keys: "Ctrl+v / PgDn", description: "page down" },
    HelpEntry { keys: "Alt+v / PgUp", description: "page up" },
    HelpEntry { keys: "Ctrl+d / Ctrl+u", description: "half page down / up" },
    HelpEntry { keys: "Alt+<", description: "go to top" },
    HelpEntry { keys: "Alt+>", description: "go to bottom" },
    HelpEntry { keys: "Ctrl+s / /", description: "search" },
    HelpEntry { keys: "n / N", description: "next / previous match" },
    HelpEntry { keys: "Tab", description: "cycle search scope (in search)" },
    HelpEntry { keys: "Ctrl+r", description: "toggle regex (in search)" },
    HelpEntry { keys: "Ctrl+a / End", description: "prompt line start / end" },
    HelpEntry { keys: "Esc / Ctrl+g", description: "leave search" },
    HelpEntry { keys: "J", description: "jq query" },
    HelpEntry { keys: "T / C / S", description: "tree / collapsible / schema view" },
    HelpEntry { keys: "L / D / ,", description: "line numbers / debug / settings" },
    HelpEntry { keys: "Ctrl+e / Alt+e", description: "export schema / data" },
    HelpEntry { keys: "?", description: "toggle help" },
    HelpEntry { keys: "q / Ctrl+c", description: "quit" },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeymap;

impl KeyClassifier for DefaultKeymap {
    fn is_up(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Up) || plain(input, key, 'k')
    }

    fn is_down(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Down) || plain(input, key, 'j')
    }

    fn is_quit(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'q')
    }

    fn is_interrupt(&self, input: &str, key: &KeyInput) -> bool {
        ctrl(input, key, 'c')
    }

    fn is_search(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, '/')
    }

    fn is_jq(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'J')
    }

    fn is_top(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'g')
    }

    fn is_bottom(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'G')
    }

    fn is_page_up(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::PageUp) || ctrl(input, key, 'b')
    }

    fn is_page_down(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::PageDown) || ctrl(input, key, 'f')
    }

    fn is_half_page_up(&self, input: &str, key: &KeyInput) -> bool {
        ctrl(input, key, 'u')
    }

    fn is_half_page_down(&self, input: &str, key: &KeyInput) -> bool {
        ctrl(input, key, 'd')
    }

    fn is_search_next(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'n')
    }

    fn is_search_previous(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'N')
    }

    fn is_search_exit(&self, _input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Escape)
    }

    fn is_export(&self, input: &str, key: &KeyInput) -> bool {
        ctrl(input, key, 'e')
    }

    fn is_export_data(&self, input: &str, key: &KeyInput) -> bool {
        meta(input, key, 'e')
    }

    fn is_help(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, '?')
    }

    fn is_tree(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'T')
    }

    fn is_collapsible(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'C')
    }

    fn is_schema(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'S')
    }

    fn is_line_numbers(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'L')
    }

    fn is_debug(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, 'D')
    }

    fn is_settings(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, ',')
    }

    fn is_toggle_node(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Return) || plain(input, key, ' ')
    }

    fn is_expand_node(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Right) || plain(input, key, 'l')
    }

    fn is_collapse_node(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Left) || plain(input, key, 'h')
    }

    fn is_expand_all(&self, input: &str, key: &KeyInput) -> bool {
        plain(input, key, '*')
    }

    fn top_needs_sequence(&self) -> bool {
        true
    }

    fn help_entries(&self) -> &'static [HelpEntry] {
        DEFAULT_HELP
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmacsKeymap;

impl KeyClassifier for EmacsKeymap {
    fn is_up(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Up) || ctrl(input, key, 'p')
    }

    fn is_down(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Down) || ctrl(input, key, 'n')
    }

    fn is_quit(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_quit(input, key)
    }

    fn is_interrupt(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_interrupt(input, key)
    }

    fn is_search(&self, input: &str, key: &KeyInput) -> bool {
        ctrl(input, key, 's') || DefaultKeymap.is_search(input, key)
    }

    fn is_jq(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_jq(input, key)
    }

    fn is_top(&self, input: &str, key: &KeyInput) -> bool {
        meta(input, key, '<')
    }

    fn is_bottom(&self, input: &str, key: &KeyInput) -> bool {
        meta(input, key, '>')
    }

    fn is_page_up(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::PageUp) || meta(input, key, 'v')
    }

    fn is_page_down(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::PageDown) || ctrl(input, key, 'v')
    }

    fn is_half_page_up(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_half_page_up(input, key)
    }

    fn is_half_page_down(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_half_page_down(input, key)
    }

    fn is_search_next(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_search_next(input, key)
    }

    fn is_search_previous(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_search_previous(input, key)
    }

    fn is_search_exit(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Escape) || ctrl(input, key, 'g')
    }

    fn is_export(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_export(input, key)
    }

    fn is_export_data(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_export_data(input, key)
    }

    fn is_help(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_help(input, key)
    }

    fn is_tree(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_tree(input, key)
    }

    fn is_collapsible(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_collapsible(input, key)
    }

    fn is_schema(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_schema(input, key)
    }

    fn is_line_numbers(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_line_numbers(input, key)
    }

    fn is_debug(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_debug(input, key)
    }

    fn is_settings(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_settings(input, key)
    }

    fn is_toggle_node(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_toggle_node(input, key)
    }

    fn is_expand_node(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Right) || ctrl(input, key, 'f')
    }

    fn is_collapse_node(&self, input: &str, key: &KeyInput) -> bool {
        named(key, NamedKey::Left) || ctrl(input, key, 'b')
    }

    fn is_expand_all(&self, input: &str, key: &KeyInput) -> bool {
        DefaultKeymap.is_expand_all(input, key)
    }

    fn top_needs_sequence(&self) -> bool {
        false
    }

    fn help_entries(&self) -> &'static [HelpEntry] {
        EMACS_HELP
    }
}
