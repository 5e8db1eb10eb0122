//! Domain-level keyboard actions independent of key bindings.

/// Actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Move the highlight down, wrapping to the first row. Default: ↓ / Ctrl+n
    HighlightNext,
    /// Move the highlight up, wrapping to the last row. Default: ↑ / Ctrl+p
    HighlightPrev,
    /// Pick the highlighted prediction. Default: Enter
    Select,
    /// Close the suggestion list. Default: Esc
    Dismiss,
    /// Clear the query text. Default: Ctrl+u
    ClearInput,
    /// Exit the picker. Default: Ctrl+c
    Quit,
}

impl KeyAction {
    /// Whether the place controller handles this action.
    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            KeyAction::HighlightNext | KeyAction::HighlightPrev | KeyAction::Select | KeyAction::Dismiss
        )
    }
}
