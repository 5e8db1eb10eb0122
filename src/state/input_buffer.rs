//! Single-line text editing for the query field (pure).
//!
//! The cursor is a char index, not a byte offset, so multi-byte input
//! ("Saint-Étienne", "Zürich") edits correctly.

/// Query text plus cursor position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
}

impl InputBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding `text` with the cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Insert a character at the cursor and advance.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    ///
    /// Returns whether the text changed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_index(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
        true
    }

    /// Delete the character under the cursor.
    ///
    /// Returns whether the text changed.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Move left one char. Saturates at 0.
    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move right one char. Saturates at the end.
    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    /// Move to the start.
    pub fn home(&mut self) {
        self.cursor = 0;
    }

    /// Move to the end.
    pub fn end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Replace the whole text, cursor at the end.
    ///
    /// Used when the controller echoes text back (selection, clear).
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_len();
    }

    /// Remove all text.
    ///
    /// Returns whether the text changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.text.is_empty();
        self.text.clear();
        self.cursor = 0;
        changed
    }
}
