//! Place suggestion controller.
//!
//! Turns free-text input into a selected, resolved place. The controller is
//! sans-IO: provider calls leave through a [`RequestSink`], their results come
//! back through [`PlaceController::handle_provider_event`], and time only
//! advances when the owner calls [`PlaceController::tick`].
//!
//! # Staleness
//!
//! - Every predictions request captures the query generation. A response is
//!   applied only if no newer query, clear, selection or teardown happened
//!   since.
//! - Every detail request captures a selection ticket. A response is applied
//!   only while that selection is still resolving.
//!
//! # Selection phases
//!
//! `Idle → Resolving → Settling → Idle`. While not idle, text changes are
//! echoed but never searched, and focus does not reopen the list. `Settling`
//! lasts for the guard window after the detail fetch completes.

use crate::model::{KeyAction, Prediction, ResolvedPlace};
use crate::provider::{
    DetailsRequest, PredictionRequest, ProviderEvent, ProviderJob, ProviderLoader, RequestSink,
    SharedProvider, DEFAULT_PLACE_TYPES,
};
use crate::state::callbacks::PlaceCallbacks;
use crate::state::navigation::{next_highlight, prev_highlight, valid_highlight};
use crate::state::timer::{CancellableTimer, Debouncer};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default quiet window before a query is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

/// Default guard window after a selection settles.
pub const DEFAULT_SELECTION_GUARD: Duration = Duration::from_millis(200);

/// Default minimum trimmed query length.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Provider credential; `None` leaves the controller inert.
    pub credential: Option<String>,
    /// ISO country restriction.
    pub country: Option<String>,
    /// Place-type filter. Empty means no filter.
    pub place_types: String,
    /// Debounce window for queries.
    pub debounce: Duration,
    /// Guard window after a selection completes.
    pub selection_guard: Duration,
    /// Minimum trimmed query length, in chars.
    pub min_query_chars: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            credential: None,
            country: None,
            place_types: DEFAULT_PLACE_TYPES.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            selection_guard: DEFAULT_SELECTION_GUARD,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

/// Visible state of the suggestion list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    /// Hidden.
    #[default]
    Closed,
    /// Open, waiting for a predictions response.
    Loading,
    /// Open showing the current predictions (possibly none).
    Open,
    /// Open showing a provider error row.
    Error(String),
}

impl ListState {
    /// Whether the list is visible.
    pub fn is_open(&self) -> bool {
        !matches!(self, ListState::Closed)
    }
}

/// Where the controller is in the select → resolve → settle cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionPhase {
    /// No selection in progress.
    #[default]
    Idle,
    /// Details requested for `prediction`, identified by `ticket`.
    Resolving {
        /// Ticket carried by the detail request.
        ticket: u64,
        /// The prediction being resolved.
        prediction: Prediction,
    },
    /// Details handled; waiting out the guard window.
    Settling,
}

/// How a key press was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// The controller did nothing; the owner may act on the key.
    Ignored,
    /// Consumed.
    Handled,
    /// Consumed, and the default host behavior (scroll, submit) must be suppressed.
    PreventDefault,
}

impl KeyResponse {
    /// Whether the controller used the key.
    pub fn is_consumed(self) -> bool {
        !matches!(self, KeyResponse::Ignored)
    }
}

/// Place autocomplete state machine.
pub struct PlaceController<S: RequestSink, C: PlaceCallbacks> {
    settings: ControllerSettings,
    provider: Option<SharedProvider>,
    sink: S,
    callbacks: C,

    predictions: Vec<Prediction>,
    list: ListState,
    highlight: Option<usize>,

    debouncer: Debouncer<String>,
    generation: u64,

    selection: SelectionPhase,
    next_ticket: u64,
    guard: CancellableTimer,

    outside_listener: bool,
    listener_attaches: usize,
    torn_down: bool,
}

impl<S: RequestSink, C: PlaceCallbacks> PlaceController<S, C> {
    /// Create a controller, loading its provider through `loader`.
    ///
    /// A load failure is logged and leaves this controller inert: text is
    /// still echoed, but no query or selection ever reaches a provider.
    pub fn new(settings: ControllerSettings, loader: &ProviderLoader, sink: S, callbacks: C) -> Self {
        let provider = match loader.load(settings.credential.as_deref()) {
            Ok(provider) => Some(provider),
            Err(e) => {
                debug!(error = %e, "Place controller is inert: provider unavailable");
                None
            }
        };

        Self {
            debouncer: Debouncer::new(settings.debounce),
            settings,
            provider,
            sink,
            callbacks,
            predictions: Vec::new(),
            list: ListState::Closed,
            highlight: None,
            generation: 0,
            selection: SelectionPhase::Idle,
            next_ticket: 0,
            guard: CancellableTimer::new(),
            outside_listener: false,
            listener_attaches: 0,
            torn_down: false,
        }
    }

    // ===== Operations =====

    /// User edited the text.
    ///
    /// The text is always echoed through `on_change_text`. It is queued for
    /// search only when no selection is in progress.
    pub fn text_changed(&mut self, text: &str, now: Instant) {
        if self.torn_down {
            return;
        }
        self.callbacks.on_change_text(text);

        if self.is_selecting() {
            debug!("Text change during selection, not searching");
            return;
        }
        if self.provider.is_none() {
            return;
        }
        self.debouncer.schedule(now, text.to_string());
    }

    /// Advance timers to `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        if let Some(query) = self.debouncer.fire_if_due(now) {
            self.run_query(&query);
        }
        if self.guard.fire_if_due(now) && self.selection == SelectionPhase::Settling {
            debug!("Selection guard elapsed");
            self.selection = SelectionPhase::Idle;
        }
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.torn_down {
            return None;
        }
        match (self.debouncer.deadline(), self.guard.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Apply a finished provider call.
    pub fn handle_provider_event(&mut self, event: ProviderEvent, now: Instant) {
        if self.torn_down {
            return;
        }
        match event {
            ProviderEvent::Predictions { generation, result } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        current = self.generation,
                        "Dropping stale predictions response"
                    );
                    return;
                }
                self.highlight = None;
                match result {
                    Ok(predictions) => {
                        debug!(count = predictions.len(), "Predictions received");
                        self.predictions = predictions;
                        self.set_list(ListState::Open);
                    }
                    Err(e) => {
                        warn!(error = %e, "Predictions request failed");
                        self.predictions.clear();
                        self.set_list(ListState::Error(e.user_message()));
                    }
                }
            }
            ProviderEvent::Details { ticket, result } => {
                let prediction = match &self.selection {
                    SelectionPhase::Resolving {
                        ticket: current,
                        prediction,
                    } if *current == ticket => prediction.clone(),
                    _ => {
                        debug!(ticket, "Dropping details response for superseded selection");
                        return;
                    }
                };

                let place = match result {
                    Ok(details) => {
                        let place = ResolvedPlace::from_details(
                            prediction.place_id.clone(),
                            &details,
                            prediction.display_text(),
                        );
                        self.callbacks.on_change_text(&place.formatted_address);
                        place
                    }
                    Err(e) => {
                        error!(
                            place_id = %prediction.place_id,
                            error = %e,
                            "Place details failed, using prediction text"
                        );
                        ResolvedPlace::degraded(&prediction)
                    }
                };
                info!(place_id = %prediction.place_id, "Place selected");
                self.callbacks.on_select_place(place);

                self.selection = SelectionPhase::Settling;
                self.guard.schedule(now, self.settings.selection_guard);
            }
        }
    }

    /// Keyboard input while the input has focus.
    ///
    /// Only active while the list is open and non-empty.
    pub fn handle_key(&mut self, action: KeyAction) -> KeyResponse {
        if self.torn_down || !self.list.is_open() || self.predictions.is_empty() {
            return KeyResponse::Ignored;
        }
        let len = self.predictions.len();
        match action {
            KeyAction::HighlightNext => {
                self.highlight = next_highlight(self.highlight, len);
                KeyResponse::PreventDefault
            }
            KeyAction::HighlightPrev => {
                self.highlight = prev_highlight(self.highlight, len);
                KeyResponse::PreventDefault
            }
            KeyAction::Select => match valid_highlight(self.highlight, len) {
                Some(index) => {
                    self.select_index(index);
                    KeyResponse::PreventDefault
                }
                None => KeyResponse::Ignored,
            },
            KeyAction::Dismiss => {
                self.set_list(ListState::Closed);
                KeyResponse::Handled
            }
            KeyAction::ClearInput | KeyAction::Quit => KeyResponse::Ignored,
        }
    }

    /// The input gained focus. Reopens retained predictions.
    pub fn focus(&mut self) {
        if self.torn_down
            || self.is_selecting()
            || self.list.is_open()
            || self.predictions.is_empty()
        {
            return;
        }
        self.set_list(ListState::Open);
    }

    /// Pointer entered row `Some(i)` or left the rows (`None`).
    pub fn hover(&mut self, row: Option<usize>) {
        if self.torn_down || !self.list.is_open() {
            return;
        }
        self.highlight = valid_highlight(row, self.predictions.len());
    }

    /// Select the prediction at `index` (click or Enter).
    pub fn select_index(&mut self, index: usize) {
        if self.torn_down || !self.list.is_open() {
            return;
        }
        if let Some(prediction) = self.predictions.get(index).cloned() {
            self.select_prediction(prediction);
        }
    }

    /// Pointer pressed somewhere; `inside` is whether it hit the component.
    ///
    /// Returns whether this closed the list.
    pub fn pointer_down(&mut self, inside: bool) -> bool {
        if self.torn_down || !self.outside_listener || inside {
            return false;
        }
        debug!("Pointer down outside, closing list");
        self.set_list(ListState::Closed);
        true
    }

    /// Hide the list, keeping predictions for the next focus.
    ///
    /// Returns whether the list was open.
    pub fn close(&mut self) -> bool {
        if self.torn_down || !self.list.is_open() {
            return false;
        }
        self.set_list(ListState::Closed);
        true
    }

    /// Stop the controller. Every later call is a no-op.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.debouncer.cancel();
        self.guard.cancel();
        self.generation += 1;
        self.selection = SelectionPhase::Idle;
        self.set_list(ListState::Closed);
        self.torn_down = true;
        debug!("Place controller torn down");
    }

    // ===== Internals =====

    fn run_query(&mut self, input: &str) {
        if self.is_selecting() {
            debug!("Debounced query fired during selection, dropped");
            return;
        }
        let Some(provider) = self.provider.clone() else {
            return;
        };

        let query = input.trim();
        if query.chars().count() < self.settings.min_query_chars {
            self.generation += 1;
            self.predictions.clear();
            self.highlight = None;
            self.set_list(ListState::Closed);
            return;
        }

        self.generation += 1;
        self.set_list(ListState::Loading);

        let request = PredictionRequest {
            input: query.to_string(),
            types: self.place_types(),
            country: self.settings.country.clone(),
        };
        debug!(generation = self.generation, input = query, "Dispatching predictions request");
        self.sink.submit(ProviderJob::Predictions {
            generation: self.generation,
            provider,
            request,
        });
    }

    fn select_prediction(&mut self, prediction: Prediction) {
        let Some(provider) = self.provider.clone() else {
            return;
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.generation += 1;
        self.debouncer.cancel();
        self.guard.cancel();

        let display = prediction.display_text().to_string();
        self.selection = SelectionPhase::Resolving {
            ticket,
            prediction: prediction.clone(),
        };

        self.callbacks.on_change_text(&display);
        self.predictions.clear();
        self.highlight = None;
        self.set_list(ListState::Closed);

        debug!(ticket, place_id = %prediction.place_id, "Dispatching details request");
        self.sink.submit(ProviderJob::Details {
            ticket,
            provider,
            request: DetailsRequest::standard(prediction.place_id),
        });
    }

    fn place_types(&self) -> Vec<String> {
        let types = self.settings.place_types.trim();
        if types.is_empty() {
            Vec::new()
        } else {
            vec![types.to_string()]
        }
    }

    /// Change list state and keep the outside-click listener in step.
    fn set_list(&mut self, list: ListState) {
        self.list = list;
        let open = self.list.is_open();
        if open && !self.outside_listener {
            self.outside_listener = true;
            self.listener_attaches += 1;
        } else if !open && self.outside_listener {
            self.outside_listener = false;
        }
    }

    // ===== Accessors =====

    /// Current list state.
    pub fn list_state(&self) -> &ListState {
        &self.list
    }

    /// Whether the list is visible.
    pub fn is_open(&self) -> bool {
        self.list.is_open()
    }

    /// Stored predictions (retained while the list is hidden by Escape).
    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Highlighted row.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Error row text, if the last query failed.
    pub fn error_message(&self) -> Option<&str> {
        match &self.list {
            ListState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Whether a predictions request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.list == ListState::Loading
    }

    /// Whether a selection is in progress (resolving or settling).
    pub fn is_selecting(&self) -> bool {
        self.selection != SelectionPhase::Idle
    }

    /// Current selection phase.
    pub fn selection_phase(&self) -> &SelectionPhase {
        &self.selection
    }

    /// Whether provider loading failed.
    pub fn is_inert(&self) -> bool {
        self.provider.is_none()
    }

    /// Whether `teardown` has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Whether the outside-click listener is attached.
    pub fn listener_attached(&self) -> bool {
        self.outside_listener
    }

    /// How many times the outside-click listener has been attached.
    pub fn listener_attach_count(&self) -> usize {
        self.listener_attaches
    }

    /// Current query generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Settings in use.
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Request sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Request sink, mutably (to poll or run jobs).
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Callback target.
    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    /// Callback target, mutably (to drain recorded events).
    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }
}

impl<S, C> std::fmt::Debug for PlaceController<S, C>
where
    S: RequestSink + std::fmt::Debug,
    C: PlaceCallbacks + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceController")
            .field("settings", &self.settings)
            .field("inert", &self.provider.is_none())
            .field("list", &self.list)
            .field("predictions", &self.predictions.len())
            .field("highlight", &self.highlight)
            .field("generation", &self.generation)
            .field("selection", &self.selection)
            .field("sink", &self.sink)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
