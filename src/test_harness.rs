//! Acceptance Test Harness for TUI testing
//!
//! Wraps `TuiApp<TestBackend, QueuedSink>` with a simulated clock and a
//! scripted provider, so user stories run without a terminal, a network or
//! real time passing.

use crate::config::keybindings::KeyBindings;
use crate::model::{PlaceDetails, Prediction, ResolvedPlace};
use crate::provider::{ProviderLoader, QueuedSink, ScriptedProvider};
use crate::state::{CallbackLog, ControllerSettings, PlaceController};
use crate::view::{PickerLayout, TuiApp};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Convert a ratatui buffer to a string representation for snapshot testing.
///
/// Captures the visual output character by character, preserving layout.
/// Empty trailing lines are removed to keep snapshots clean.
fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area();
    let mut lines = Vec::new();

    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            let cell = &buffer[(x, y)];
            line.push_str(cell.symbol());
        }
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

/// Test harness for acceptance testing
pub struct AcceptanceTestHarness {
    app: TuiApp<TestBackend, QueuedSink>,
    provider: Arc<ScriptedProvider>,
    t0: Instant,
    elapsed: Duration,
    running: bool,
}

impl AcceptanceTestHarness {
    /// Harness with the standard places and a 60x20 terminal.
    pub fn new() -> Self {
        Self::with_size(60, 20)
    }

    /// Harness with the standard places and a custom terminal size.
    pub fn with_size(width: u16, height: u16) -> Self {
        let provider = Arc::new(ScriptedProvider::new());
        provider.add_place("p1", "Rome, Italy", 41.9028, 12.4964);
        provider.add_place("p2", "Romano di Lombardia, Italy", 45.52, 9.75);
        provider.add_place("p3", "Roma Nord, Italy", 42.0, 12.5);
        Self::from_provider(provider, Some("test-key"), width, height)
    }

    /// Harness driving `provider`; `credential` of `None` makes it inert.
    pub fn from_provider(
        provider: Arc<ScriptedProvider>,
        credential: Option<&str>,
        width: u16,
        height: u16,
    ) -> Self {
        let settings = ControllerSettings {
            credential: credential.map(str::to_string),
            country: Some("it".to_string()),
            ..ControllerSettings::default()
        };
        let loader = ProviderLoader::with_provider(provider.clone());
        let controller =
            PlaceController::new(settings, &loader, QueuedSink::new(), CallbackLog::new());

        let terminal = Terminal::new(TestBackend::new(width, height))
            .unwrap_or_else(|e| panic!("TestBackend terminal: {e}"));
        let app = TuiApp::with_terminal(
            terminal,
            controller,
            KeyBindings::default(),
            "Search city or town...".to_string(),
        );

        Self {
            app,
            provider,
            t0: Instant::now(),
            elapsed: Duration::ZERO,
            running: true,
        }
    }

    /// Register another place with the scripted provider.
    pub fn add_prediction(&self, prediction: Prediction, details: PlaceDetails) {
        self.provider.add_prediction(prediction, details);
    }

    /// The scripted provider (for failure injection and call inspection).
    pub fn provider(&self) -> &ScriptedProvider {
        &self.provider
    }

    fn now(&self) -> Instant {
        self.t0 + self.elapsed
    }

    // ===== Time and provider =====

    /// Move the simulated clock forward and fire due timers.
    pub fn advance(&mut self, ms: u64) {
        self.elapsed += Duration::from_millis(ms);
        let now = self.now();
        self.app.tick_test(now);
    }

    /// Run queued provider jobs and deliver their results.
    ///
    /// Returns the number of jobs run.
    pub fn complete_requests(&mut self) -> usize {
        let events = self.app.controller_mut().sink_mut().run_all();
        let count = events.len();
        let now = self.now();
        self.app.provider_events_test(events, now);
        count
    }

    /// Number of provider jobs waiting to run.
    pub fn pending_requests(&self) -> usize {
        self.app.controller().sink().pending()
    }

    /// Type, wait out the debounce, and answer the query.
    pub fn search(&mut self, text: &str) {
        self.type_text(text);
        self.advance(350);
        self.complete_requests();
    }

    // ===== Keyboard =====

    /// Send a single key event
    ///
    /// Returns `true` if the app quit as a result of this key.
    pub fn send_key(&mut self, key: KeyCode) -> bool {
        self.send_key_with_mods(key, KeyModifiers::NONE)
    }

    /// Send key with modifiers (e.g., Ctrl+C)
    pub fn send_key_with_mods(&mut self, key: KeyCode, mods: KeyModifiers) -> bool {
        if !self.running {
            return true;
        }

        let now = self.now();
        let quit = self.app.handle_key_test(KeyEvent::new(key, mods), now);
        if quit {
            self.running = false;
        }
        quit
    }

    /// Type a string character by character
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.send_key(KeyCode::Char(ch));
        }
    }

    /// Whether the app is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ===== Mouse and focus =====

    /// Left click at a terminal cell.
    pub fn click_at(&mut self, column: u16, row: u16) {
        self.mouse(MouseEventKind::Down(MouseButton::Left), column, row);
    }

    /// Move the pointer to a terminal cell.
    pub fn move_to(&mut self, column: u16, row: u16) {
        self.mouse(MouseEventKind::Moved, column, row);
    }

    fn mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        self.app.handle_mouse_test(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    /// Terminal regained focus.
    pub fn focus_gained(&mut self) {
        self.app.focus_test();
    }

    /// Current layout (for locating rows to click).
    pub fn layout(&self) -> PickerLayout {
        self.app.layout_test()
    }

    /// Terminal row of the prediction row at `index`, with no loading row above.
    pub fn prediction_row(&self, index: u16) -> u16 {
        let dropdown = self
            .layout()
            .dropdown
            .unwrap_or_else(|| panic!("dropdown not visible"));
        dropdown.y + 1 + index
    }

    // ===== Inspection =====

    /// The app under test.
    pub fn app(&self) -> &TuiApp<TestBackend, QueuedSink> {
        &self.app
    }

    /// Current query text.
    pub fn query(&self) -> &str {
        self.app.query()
    }

    /// Last selected place.
    pub fn selected(&self) -> Option<&ResolvedPlace> {
        self.app.selected()
    }

    /// Render current state to string for assertions
    pub fn render_to_string(&mut self) -> String {
        if let Err(e) = self.app.render_test() {
            panic!("render failed: {e}");
        }
        buffer_to_string(self.app.terminal().backend().buffer())
    }
}
