pub mod events;
pub mod keymap;
pub mod text_edit;

pub use events::{KeyInput, NamedKey};
pub use keymap::{DefaultKeymap, EmacsKeymap, HelpEntry, KeyClassifier, KeymapPreset};
pub use text_edit::TextEditor;
