//! Screen layout for the picker.
//!
//! Shared by rendering and mouse hit-testing so both agree on where rows are.

use ratatui::layout::{Position, Rect};

/// Height of the bordered input box.
pub const INPUT_HEIGHT: u16 = 3;

/// Areas of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerLayout {
    /// Query input box.
    pub input: Rect,
    /// Suggestion list box, absent when the list has no rows.
    pub dropdown: Option<Rect>,
    /// Bottom status line.
    pub status: Rect,
}

impl PickerLayout {
    /// Lay out a frame of `area` for a dropdown of `dropdown_height` rows
    /// (borders included, 0 for none).
    ///
    /// The dropdown hangs under the input and is clipped above the status line.
    pub fn compute(area: Rect, dropdown_height: u16) -> Self {
        let status_y = area.bottom().saturating_sub(1).max(area.y);
        let status = Rect::new(area.x, status_y, area.width, area.height.min(1));

        let input_height = INPUT_HEIGHT.min(area.height.saturating_sub(1));
        let input = Rect::new(area.x, area.y, area.width, input_height);

        let top = input.bottom();
        let available = status.y.saturating_sub(top);
        let height = dropdown_height.min(available);
        let dropdown = (height > 0).then(|| Rect::new(area.x, top, area.width, height));

        Self {
            input,
            dropdown,
            status,
        }
    }

    /// Dropdown row under a terminal cell, counting from the first row inside
    /// the border.
    pub fn dropdown_row_at(&self, column: u16, row: u16) -> Option<usize> {
        let dropdown = self.dropdown?;
        let inner = Rect::new(
            dropdown.x.saturating_add(1),
            dropdown.y.saturating_add(1),
            dropdown.width.saturating_sub(2),
            dropdown.height.saturating_sub(2),
        );
        inner
            .contains(Position::new(column, row))
            .then(|| usize::from(row - inner.y))
    }

    /// Whether a cell belongs to the component (input or dropdown).
    pub fn contains(&self, column: u16, row: u16) -> bool {
        let pos = Position::new(column, row);
        self.input.contains(pos) || self.dropdown.is_some_and(|d| d.contains(pos))
    }

    /// Whether a cell is inside the dropdown box, border included.
    pub fn in_dropdown(&self, column: u16, row: u16) -> bool {
        self.dropdown
            .is_some_and(|d| d.contains(Position::new(column, row)))
    }
}
