//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Printable characters are never bound: they always edit the query.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Only code and modifiers are compared; event kind and lock state are
    /// ignored.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }

    /// Bind `code` + `modifiers` to `action`, replacing any earlier binding.
    pub fn bind(&mut self, code: KeyCode, modifiers: KeyModifiers, action: KeyAction) {
        self.bindings.insert(KeyEvent::new(code, modifiers), action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };

        // List navigation
        bindings.bind(KeyCode::Down, KeyModifiers::NONE, KeyAction::HighlightNext);
        bindings.bind(KeyCode::Char('n'), KeyModifiers::CONTROL, KeyAction::HighlightNext);
        bindings.bind(KeyCode::Up, KeyModifiers::NONE, KeyAction::HighlightPrev);
        bindings.bind(KeyCode::Char('p'), KeyModifiers::CONTROL, KeyAction::HighlightPrev);
        bindings.bind(KeyCode::Enter, KeyModifiers::NONE, KeyAction::Select);
        bindings.bind(KeyCode::Esc, KeyModifiers::NONE, KeyAction::Dismiss);

        // Input
        bindings.bind(KeyCode::Char('u'), KeyModifiers::CONTROL, KeyAction::ClearInput);

        // Application controls
        bindings.bind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit);

        bindings
    }
}
