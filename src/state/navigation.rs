//! Highlight movement over the suggestion list (pure).
//!
//! `None` is "no highlight". Both directions wrap modulo the list length.

/// Move the highlight down one row.
///
/// From no highlight or the last row, lands on row 0. Empty lists stay
/// unhighlighted.
pub fn next_highlight(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        Some(i) if i + 1 < len => Some(i + 1),
        _ => Some(0),
    }
}

/// Move the highlight up one row.
///
/// From no highlight or row 0, lands on the last row. Empty lists stay
/// unhighlighted.
pub fn prev_highlight(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        Some(i) if i > 0 && i < len => Some(i - 1),
        _ => Some(len - 1),
    }
}

/// The highlight if it points at a row of a list of `len`.
pub fn valid_highlight(current: Option<usize>, len: usize) -> Option<usize> {
    current.filter(|&i| i < len)
}
