//! Terminal front end (impure shell).
//!
//! Owns the terminal, the query buffer and a [`PlaceController`]. Every
//! controller call is followed by draining its callback log, so the input
//! always shows what the controller last asked for.

mod dropdown;
mod input;
mod layout;

pub use dropdown::{truncate_to_width, DropdownRow, SuggestionDropdown, LOADING_TEXT, NO_RESULTS_TEXT};
pub use input::PlaceInput;
pub use layout::PickerLayout;

use crate::config::keybindings::KeyBindings;
use crate::model::{KeyAction, ResolvedPlace};
use crate::provider::{ProviderEvent, RequestSink, ThreadDispatcher};
use crate::state::{CallbackEvent, CallbackLog, InputBuffer, PlaceController, SelectionPhase};
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// How often finished provider calls are collected while nothing else happens.
const PROVIDER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Controller type driven by the terminal front end.
pub type TerminalController<S> = PlaceController<S, CallbackLog>;

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend, and over the
/// request sink so tests can run provider jobs by hand.
pub struct TuiApp<B, S>
where
    B: Backend,
    S: RequestSink,
{
    terminal: Terminal<B>,
    controller: TerminalController<S>,
    input: InputBuffer,
    key_bindings: KeyBindings,
    placeholder: String,
    selected: Option<ResolvedPlace>,
    pointer_in_dropdown: bool,
}

impl TuiApp<CrosstermBackend<Stdout>, ThreadDispatcher> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen, mouse capture and
    /// focus reporting.
    pub fn new(
        controller: TerminalController<ThreadDispatcher>,
        placeholder: String,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        stdout.execute(EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self::with_terminal(
            terminal,
            controller,
            KeyBindings::default(),
            placeholder,
        ))
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits. Sleeps until a terminal event, the next
    /// controller deadline, or the provider poll interval, whichever is first.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let now = Instant::now();
            let timeout = self
                .controller
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(now))
                .map_or(PROVIDER_POLL_INTERVAL, |d| d.min(PROVIDER_POLL_INTERVAL));

            let mut dirty = false;
            if event::poll(timeout)? {
                let now = Instant::now();
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        if self.handle_key(key, now) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Mouse(mouse) => {
                        dirty = self.handle_mouse(mouse);
                    }
                    Event::FocusGained => {
                        self.focus();
                        dirty = true;
                    }
                    Event::Resize(..) => dirty = true,
                    _ => {}
                }
            }

            let now = Instant::now();
            let events = self.controller.sink_mut().poll();
            if !events.is_empty() {
                self.apply_provider_events(events, now);
                dirty = true;
            }
            if self.controller.next_deadline().is_some_and(|d| d <= now) {
                self.tick(now);
                dirty = true;
            }

            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B, S> TuiApp<B, S>
where
    B: Backend,
    S: RequestSink,
{
    /// Wrap an already initialized terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        controller: TerminalController<S>,
        key_bindings: KeyBindings,
        placeholder: String,
    ) -> Self {
        Self {
            terminal,
            controller,
            input: InputBuffer::new(),
            key_bindings,
            placeholder,
            selected: None,
            pointer_in_dropdown: false,
        }
    }

    /// Start with `text` in the input, as if typed.
    pub fn set_initial_query(&mut self, text: &str, now: Instant) {
        self.input.set_text(text);
        self.controller.text_changed(text, now);
        self.sync_callbacks();
    }

    /// The controller.
    pub fn controller(&self) -> &TerminalController<S> {
        &self.controller
    }

    /// The controller, mutably (for draining a test sink).
    pub fn controller_mut(&mut self) -> &mut TerminalController<S> {
        &mut self.controller
    }

    /// Current query text.
    pub fn query(&self) -> &str {
        self.input.text()
    }

    /// Most recently selected place.
    pub fn selected(&self) -> Option<&ResolvedPlace> {
        self.selected.as_ref()
    }

    /// Stop the controller and hand back the last selection.
    pub fn finish(mut self) -> Option<ResolvedPlace> {
        self.controller.teardown();
        self.sync_callbacks();
        self.selected
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if let Some(action) = self.key_bindings.get(key) {
            return self.handle_action(action, now);
        }

        let edited = match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input.insert(ch);
                true
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => {
                self.input.cursor_left();
                false
            }
            KeyCode::Right => {
                self.input.cursor_right();
                false
            }
            KeyCode::Home => {
                self.input.home();
                false
            }
            KeyCode::End => {
                self.input.end();
                false
            }
            _ => false,
        };

        if edited {
            let text = self.input.text().to_string();
            self.controller.text_changed(&text, now);
            self.sync_callbacks();
        }
        false
    }

    fn handle_action(&mut self, action: KeyAction, now: Instant) -> bool {
        match action {
            KeyAction::Quit => true,
            KeyAction::ClearInput => {
                if self.input.clear() {
                    self.controller.text_changed("", now);
                    self.sync_callbacks();
                }
                false
            }
            KeyAction::HighlightNext
            | KeyAction::HighlightPrev
            | KeyAction::Select
            | KeyAction::Dismiss => {
                let response = self.controller.handle_key(action);
                self.sync_callbacks();
                debug!(?action, ?response, "List key");
                if action != KeyAction::Dismiss || response.is_consumed() {
                    return false;
                }
                // A "No results" or error row is still on screen.
                !self.controller.close()
            }
        }
    }

    /// Handle a single mouse event
    ///
    /// Returns whether anything visible may have changed.
    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let layout = self.current_layout();
        let (column, row) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Moved => {
                if !layout.in_dropdown(column, row) {
                    if !std::mem::take(&mut self.pointer_in_dropdown) {
                        return false;
                    }
                    self.controller.hover(None);
                    return true;
                }
                self.pointer_in_dropdown = true;
                let place_row = self.place_index_at(&layout, column, row);
                self.controller.hover(place_row);
                true
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.place_index_at(&layout, column, row) {
                    self.controller.select_index(index);
                } else if layout.input.contains((column, row).into()) {
                    self.controller.focus();
                } else {
                    self.controller.pointer_down(layout.contains(column, row));
                }
                self.sync_callbacks();
                true
            }
            _ => false,
        }
    }

    /// Terminal regained focus.
    fn focus(&mut self) {
        self.controller.focus();
        self.sync_callbacks();
    }

    /// Advance controller timers.
    fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
        self.sync_callbacks();
    }

    /// Feed finished provider calls to the controller.
    fn apply_provider_events(&mut self, events: Vec<ProviderEvent>, now: Instant) {
        for event in events {
            self.controller.handle_provider_event(event, now);
        }
        self.sync_callbacks();
    }

    /// Apply whatever the controller reported through its callbacks.
    fn sync_callbacks(&mut self) {
        for event in self.controller.callbacks_mut().drain() {
            match event {
                CallbackEvent::TextChanged(text) => {
                    if text != self.input.text() {
                        self.input.set_text(&text);
                    }
                }
                CallbackEvent::PlaceSelected(place) => {
                    info!(place_id = ?place.place_id, "Selection delivered");
                    self.selected = Some(place);
                }
            }
        }
    }

    fn dropdown(&self) -> SuggestionDropdown<'_> {
        SuggestionDropdown::new(
            self.controller.list_state(),
            self.controller.predictions(),
            self.controller.highlight(),
            self.input.text(),
            self.controller.settings().min_query_chars,
        )
    }

    fn frame_area(&self) -> Rect {
        match self.terminal.size() {
            Ok(size) => Rect::new(0, 0, size.width, size.height),
            Err(_) => Rect::new(0, 0, 80, 24),
        }
    }

    fn current_layout(&self) -> PickerLayout {
        PickerLayout::compute(self.frame_area(), self.dropdown().height())
    }

    /// Prediction index under a cell, if the cell is a place row.
    fn place_index_at(&self, layout: &PickerLayout, column: u16, row: u16) -> Option<usize> {
        let visual = layout.dropdown_row_at(column, row)?;
        match self.dropdown().rows().get(visual) {
            Some(DropdownRow::Place(index)) => Some(*index),
            _ => None,
        }
    }

    fn status_line(&self) -> Line<'static> {
        if self.controller.is_inert() {
            return Line::from(Span::styled(
                "Places provider unavailable (see log). Ctrl+C quits.",
                Style::default().fg(Color::Red),
            ));
        }
        match &self.selected {
            Some(place) => {
                let mut text = format!("Selected: {}", place.formatted_address);
                if let (Some(lat), Some(lng)) = (place.lat, place.lng) {
                    text.push_str(&format!(" ({lat:.4}, {lng:.4})"));
                }
                Line::from(Span::styled(text, Style::default().fg(Color::Green)))
            }
            None => Line::from(Span::styled(
                "↑/↓ move · Enter select · Esc close · Ctrl+C quit",
                Style::default().fg(Color::DarkGray),
            )),
        }
    }

    /// Render the current frame
    fn draw(&mut self) -> Result<(), TuiError> {
        let layout = self.current_layout();
        let status = self.status_line();
        let resolving = matches!(
            self.controller.selection_phase(),
            SelectionPhase::Resolving { .. }
        );
        let input = PlaceInput::new(&self.input, &self.placeholder).busy(resolving);
        let dropdown = SuggestionDropdown::new(
            self.controller.list_state(),
            self.controller.predictions(),
            self.controller.highlight(),
            self.input.text(),
            self.controller.settings().min_query_chars,
        );

        self.terminal.draw(|frame| {
            frame.render_widget(input, layout.input);
            if let Some(area) = layout.dropdown {
                frame.render_widget(dropdown, area);
            }
            frame.render_widget(Paragraph::new(status), layout.status);
        })?;

        Ok(())
    }
}

// ===== Test Helpers =====
//
// The following methods are ONLY for testing within the crate.

#[cfg(test)]
#[allow(dead_code)]
impl<B, S> TuiApp<B, S>
where
    B: Backend,
    S: RequestSink,
{
    /// Handle a single keyboard event at `now` (test-only accessor)
    ///
    /// Returns true if app should quit.
    pub(crate) fn handle_key_test(&mut self, key: KeyEvent, now: Instant) -> bool {
        self.handle_key(key, now)
    }

    /// Handle a single mouse event (test-only accessor)
    pub(crate) fn handle_mouse_test(&mut self, mouse: MouseEvent) -> bool {
        self.handle_mouse(mouse)
    }

    /// Terminal focus gained (test-only accessor)
    pub(crate) fn focus_test(&mut self) {
        self.focus()
    }

    /// Advance timers (test-only accessor)
    pub(crate) fn tick_test(&mut self, now: Instant) {
        self.tick(now)
    }

    /// Deliver provider results (test-only accessor)
    pub(crate) fn provider_events_test(&mut self, events: Vec<ProviderEvent>, now: Instant) {
        self.apply_provider_events(events, now)
    }

    /// Render a single frame (test-only accessor)
    pub(crate) fn render_test(&mut self) -> Result<(), TuiError> {
        self.draw()
    }

    /// Get reference to terminal (test-only accessor)
    pub(crate) fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Layout for the current state (test-only accessor)
    pub(crate) fn layout_test(&self) -> PickerLayout {
        self.current_layout()
    }
}

/// Initialize and run the TUI, returning the last selected place.
///
/// This is the main entry point for the TUI. It handles terminal
/// setup, runs the event loop, and ensures cleanup on exit.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_picker(
    controller: TerminalController<ThreadDispatcher>,
    placeholder: String,
    initial_query: Option<&str>,
) -> Result<Option<ResolvedPlace>, TuiError> {
    let mut app = TuiApp::new(controller, placeholder)?;
    if let Some(text) = initial_query {
        app.set_initial_query(text, Instant::now());
    }

    // Run the app and ensure cleanup happens even on error
    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    result.map(|()| app.finish())
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture and focus reporting, and leaves the
/// alternate screen.
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableFocusChange)?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
