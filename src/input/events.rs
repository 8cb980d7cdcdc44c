use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamedKey {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Return,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    #[default]
    None,
}

/// One keystroke as seen by the dispatcher.
///
/// `text` holds the typed character (empty for named keys). Modifier flags
/// that were never set are `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    pub text: String,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
    pub named: NamedKey,
}

impl KeyInput {
    pub fn char(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            shift: ch.is_uppercase(),
            ..Self::default()
        }
    }

    pub fn ctrl(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn meta(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            meta: true,
            ..Self::default()
        }
    }

    pub fn named(named: NamedKey) -> Self {
        Self {
            named,
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn has_modifier(&self) -> bool {
        self.ctrl || self.meta
    }

    /// The single character of `text`, if it holds exactly one.
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.text.chars();
        let first = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Some(first)
    }

    pub fn is_named(&self, named: NamedKey) -> bool {
        self.named == named
    }
}

impl From<KeyEvent> for KeyInput {
    fn from(key: KeyEvent) -> Self {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let meta = key.modifiers.contains(KeyModifiers::ALT)
            || key.modifiers.contains(KeyModifiers::META);
        let mut shift = key.modifiers.contains(KeyModifiers::SHIFT);

        let (text, named) = match key.code {
            KeyCode::Char(ch) => {
                shift |= ch.is_uppercase();
                (ch.to_string(), NamedKey::None)
            }
            KeyCode::Up => (String::new(), NamedKey::Up),
            KeyCode::Down => (String::new(), NamedKey::Down),
            KeyCode::Left => (String::new(), NamedKey::Left),
            KeyCode::Right => (String::new(), NamedKey::Right),
            KeyCode::PageUp => (String::new(), NamedKey::PageUp),
            KeyCode::PageDown => (String::new(), NamedKey::PageDown),
            KeyCode::Home => (String::new(), NamedKey::Home),
            KeyCode::End => (String::new(), NamedKey::End),
            KeyCode::Enter => (String::new(), NamedKey::Return),
            KeyCode::Esc => (String::new(), NamedKey::Escape),
            KeyCode::Tab => (String::new(), NamedKey::Tab),
            KeyCode::BackTab => {
                shift = true;
                (String::new(), NamedKey::BackTab)
            }
            KeyCode::Backspace => (String::new(), NamedKey::Backspace),
            KeyCode::Delete => (String::new(), NamedKey::Delete),
            _ => (String::new(), NamedKey::None),
        };

        Self {
            text,
            ctrl,
            shift,
            meta,
            named,
        }
    }
}
