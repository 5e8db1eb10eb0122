//! Suggestion list widget.

use crate::model::Prediction;
use crate::state::ListState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Text of the row shown while a query is in flight.
pub const LOADING_TEXT: &str = "Loading…";

/// Text of the row shown for an empty result set.
pub const NO_RESULTS_TEXT: &str = "No results";

/// One visual row of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownRow<'a> {
    /// Query in flight.
    Loading,
    /// Provider failure message.
    Error(&'a str),
    /// Query answered with nothing.
    NoResults,
    /// Prediction at this index.
    Place(usize),
}

/// Dropdown under the input listing predictions.
pub struct SuggestionDropdown<'a> {
    list: &'a ListState,
    predictions: &'a [Prediction],
    highlight: Option<usize>,
    query: &'a str,
    min_query_chars: usize,
}

impl<'a> SuggestionDropdown<'a> {
    /// Create the widget from controller state and the current query.
    pub fn new(
        list: &'a ListState,
        predictions: &'a [Prediction],
        highlight: Option<usize>,
        query: &'a str,
        min_query_chars: usize,
    ) -> Self {
        Self {
            list,
            predictions,
            highlight,
            query,
            min_query_chars,
        }
    }

    /// Rows in display order. Empty when the list is closed.
    ///
    /// A loading row sits above any retained predictions. "No results" only
    /// appears for a query long enough to have been searched.
    pub fn rows(&self) -> Vec<DropdownRow<'a>> {
        let places = (0..self.predictions.len()).map(DropdownRow::Place);
        match self.list {
            ListState::Closed => Vec::new(),
            ListState::Loading => std::iter::once(DropdownRow::Loading).chain(places).collect(),
            ListState::Error(message) => vec![DropdownRow::Error(message.as_str())],
            ListState::Open if self.predictions.is_empty() => {
                if self.query.trim().chars().count() >= self.min_query_chars {
                    vec![DropdownRow::NoResults]
                } else {
                    Vec::new()
                }
            }
            ListState::Open => places.collect(),
        }
    }

    /// Height including borders, or 0 when there is nothing to show.
    pub fn height(&self) -> u16 {
        match self.rows().len() {
            0 => 0,
            n => u16::try_from(n).unwrap_or(u16::MAX).saturating_add(2),
        }
    }

    fn render_row(&self, row: DropdownRow<'_>, width: usize) -> Line<'static> {
        match row {
            DropdownRow::Loading => Line::from(Span::styled(
                LOADING_TEXT,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )),
            DropdownRow::Error(message) => Line::from(Span::styled(
                truncate_to_width(message, width),
                Style::default().fg(Color::Red),
            )),
            DropdownRow::NoResults => Line::from(Span::styled(
                NO_RESULTS_TEXT,
                Style::default().fg(Color::DarkGray),
            )),
            DropdownRow::Place(index) => {
                let Some(prediction) = self.predictions.get(index) else {
                    return Line::default();
                };
                let highlighted = self.highlight == Some(index);
                let base = if highlighted {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else {
                    Style::default()
                };

                let main = truncate_to_width(prediction.row_label(), width);
                let remaining = width.saturating_sub(main.width() + 2);
                let mut spans = vec![Span::styled(main, base.add_modifier(Modifier::BOLD))];
                if !prediction.secondary_text.is_empty() && remaining > 0 {
                    spans.push(Span::styled("  ", base));
                    spans.push(Span::styled(
                        truncate_to_width(&prediction.secondary_text, remaining),
                        if highlighted { base } else { base.fg(Color::DarkGray) },
                    ));
                }
                let mut line = Line::from(spans);
                if highlighted {
                    line = line.style(base);
                }
                line
            }
        }
    }
}

impl Widget for SuggestionDropdown<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.rows();
        if rows.is_empty() {
            return;
        }
        let width = usize::from(area.width.saturating_sub(2));
        let lines: Vec<Line> = rows
            .iter()
            .map(|row| self.render_row(*row, width))
            .collect();

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .render(area, buf);
    }
}

/// Cut `text` to at most `max_width` terminal columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if out.width() > budget {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}
