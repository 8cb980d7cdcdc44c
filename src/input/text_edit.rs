use tui_input::{Input, InputRequest};

use super::events::{KeyInput, NamedKey};

/// Cursor-aware single-line editor shared by the search and jq prompts.
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    input: Input,
}

impl TextEditor {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            input: Input::new(value.into()),
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    pub fn visual_cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.input = Input::new(value.into());
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    /// Applies an editing keystroke. Returns `false` when the key is not an
    /// editing key, leaving the buffer untouched.
    pub fn apply(&mut self, key: &KeyInput) -> bool {
        let Some(request) = edit_request(key) else {
            return false;
        };
        let _ = self.input.handle(request);
        true
    }
}

fn edit_request(key: &KeyInput) -> Option<InputRequest> {
    match key.named {
        NamedKey::Backspace if key.ctrl || key.meta => return Some(InputRequest::DeletePrevWord),
        NamedKey::Backspace => return Some(InputRequest::DeletePrevChar),
        NamedKey::Delete => return Some(InputRequest::DeleteNextChar),
        NamedKey::Left if key.ctrl || key.meta => return Some(InputRequest::GoToPrevWord),
        NamedKey::Left => return Some(InputRequest::GoToPrevChar),
        NamedKey::Right if key.ctrl || key.meta => return Some(InputRequest::GoToNextWord),
        NamedKey::Right => return Some(InputRequest::GoToNextChar),
        NamedKey::Home => return Some(InputRequest::GoToStart),
        NamedKey::End => return Some(InputRequest::GoToEnd),
        NamedKey::None => {}
        _ => return None,
    }

    let ch = key.single_char()?;
    if key.ctrl {
        return match ch.to_ascii_lowercase() {
            'a' => Some(InputRequest::GoToStart),
            'w' => Some(InputRequest::DeletePrevWord),
            'u' => Some(InputRequest::DeleteLine),
            'k' => Some(InputRequest::DeleteTillEnd),
            'h' => Some(InputRequest::DeletePrevChar),
            _ => None,
        };
    }
    if key.meta {
        return match ch {
            'b' => Some(InputRequest::GoToPrevWord),
            'f' => Some(InputRequest::GoToNextWord),
            'd' => Some(InputRequest::DeleteNextWord),
            _ => None,
        };
    }
    if ch.is_control() {
        return None;
    }
    Some(InputRequest::InsertChar(ch))
}

#[cfg(test)]
mod tests {
    use crate::input::events::{KeyInput, NamedKey};

    use super::TextEditor;

    fn type_str(editor: &mut TextEditor, text: &str) {
        for ch in text.chars() {
            assert!(editor.apply(&KeyInput::char(ch)));
        }
    }

    #[test]
    fn inserts_at_cursor_and_deletes_before_it() {
        let mut editor = TextEditor::default();
        type_str(&mut editor, "nme");
        assert!(editor.apply(&KeyInput::named(NamedKey::Left)));
        assert!(editor.apply(&KeyInput::named(NamedKey::Left)));
        type_str(&mut editor, "a");
        assert_eq!(editor.value(), "name");
        assert_eq!(editor.cursor(), 2);

        assert!(editor.apply(&KeyInput::named(NamedKey::Backspace)));
        assert_eq!(editor.value(), "nme");
        assert_eq!(editor.cursor(), 1);
    }

    #[test]
    fn multibyte_text_keeps_character_cursor() {
        let mut editor = TextEditor::default();
        type_str(&mut editor, "名前");
        assert_eq!(editor.cursor(), 2);
        assert!(editor.apply(&KeyInput::named(NamedKey::Backspace)));
        assert_eq!(editor.value(), "名");
    }

    #[test]
    fn ctrl_u_clears_and_unknown_keys_are_not_consumed() {
        let mut editor = TextEditor::with_value("abc");
        assert!(editor.apply(&KeyInput::ctrl('u')));
        assert!(editor.is_empty());

        assert!(!editor.apply(&KeyInput::named(NamedKey::Tab)));
        assert!(!editor.apply(&KeyInput::named(NamedKey::Up)));
        assert!(!editor.apply(&KeyInput::ctrl('r')));
        assert!(!editor.apply(&KeyInput::default()));
    }

    #[test]
    fn end_jumps_to_line_end_and_ctrl_e_is_left_unconsumed() {
        let mut editor = TextEditor::with_value("abc");
        assert!(editor.apply(&KeyInput::ctrl('a')));
        assert_eq!(editor.cursor(), 0);

        assert!(!editor.apply(&KeyInput::ctrl('e')));
        assert_eq!(editor.cursor(), 0);
        assert!(editor.apply(&KeyInput::named(NamedKey::End)));
        assert_eq!(editor.cursor(), 3);
    }
}
