//! Query input widget.

use crate::state::InputBuffer;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Bordered single-line input showing the query and its cursor.
///
/// An empty query shows the placeholder in a dim style.
pub struct PlaceInput<'a> {
    buffer: &'a InputBuffer,
    placeholder: &'a str,
    busy: bool,
}

impl<'a> PlaceInput<'a> {
    /// Create the widget.
    pub fn new(buffer: &'a InputBuffer, placeholder: &'a str) -> Self {
        Self {
            buffer,
            placeholder,
            busy: false,
        }
    }

    /// Mark the input as waiting on a selection to resolve.
    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    fn line(&self) -> Line<'a> {
        let cursor_style = Style::default()
            .bg(Color::White)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD);

        let text = self.buffer.text();
        if text.is_empty() {
            let mut chars = self.placeholder.chars();
            let first = chars.next().map(String::from).unwrap_or_else(|| " ".into());
            return Line::from(vec![
                Span::styled(first, cursor_style),
                Span::styled(
                    chars.collect::<String>(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
        }

        let cursor = self.buffer.cursor();
        let before: String = text.chars().take(cursor).collect();
        let mut after = text.chars().skip(cursor);
        let under = after.next().map(String::from).unwrap_or_else(|| " ".into());

        Line::from(vec![
            Span::raw(before),
            Span::styled(under, cursor_style),
            Span::raw(after.collect::<String>()),
        ])
    }
}

impl Widget for PlaceInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.busy { "Place (resolving…)" } else { "Place" };
        let paragraph = Paragraph::new(self.line()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        paragraph.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(buffer: &InputBuffer, busy: bool) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(30, 3)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_widget(
                    PlaceInput::new(buffer, "Search city...").busy(busy),
                    frame.area(),
                );
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn empty_input_shows_placeholder() {
        let buf = render(&InputBuffer::new(), false);
        assert!(row(&buf, 1).contains("Search city..."));
        assert_eq!(buf[(1, 1)].fg, Color::Black, "cursor sits on the first char");
    }

    #[test]
    fn query_replaces_placeholder() {
        let buf = render(&InputBuffer::with_text("Rome"), false);
        let line = row(&buf, 1);
        assert!(line.contains("Rome"));
        assert!(!line.contains("Search"));
    }

    #[test]
    fn cursor_cell_is_highlighted() {
        let mut input = InputBuffer::with_text("Rome");
        input.home();
        let buf = render(&input, false);
        assert_eq!(buf[(1, 1)].symbol(), "R");
        assert_eq!(buf[(1, 1)].bg, Color::White);
        assert_ne!(buf[(2, 1)].bg, Color::White);
    }

    #[test]
    fn busy_input_says_resolving() {
        let buf = render(&InputBuffer::with_text("Rome, Italy"), true);
        assert!(row(&buf, 0).contains("resolving"));
    }
}
