//! Caller-side hooks invoked by the place controller.

use crate::model::ResolvedPlace;
use std::collections::VecDeque;

/// The two outbound notifications of a place controller.
///
/// The controller never returns errors; these calls are its only effect on
/// the caller.
pub trait PlaceCallbacks {
    /// The displayed text should become `text`.
    fn on_change_text(&mut self, text: &str);

    /// A selection finished, successfully or degraded.
    fn on_select_place(&mut self, place: ResolvedPlace);
}

/// One recorded callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    /// `on_change_text`
    TextChanged(String),
    /// `on_select_place`
    PlaceSelected(ResolvedPlace),
}

/// Queue-backed callbacks the owner drains after each controller call.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CallbackLog {
    events: VecDeque<CallbackEvent>,
}

impl CallbackLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every recorded event in call order.
    pub fn drain(&mut self) -> Vec<CallbackEvent> {
        self.events.drain(..).collect()
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &CallbackEvent> {
        self.events.iter()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Recorded text changes, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CallbackEvent::TextChanged(text) => Some(text.as_str()),
                CallbackEvent::PlaceSelected(_) => None,
            })
            .collect()
    }

    /// Recorded selections, in order.
    pub fn places(&self) -> Vec<&ResolvedPlace> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CallbackEvent::PlaceSelected(place) => Some(place),
                CallbackEvent::TextChanged(_) => None,
            })
            .collect()
    }
}

impl PlaceCallbacks for CallbackLog {
    fn on_change_text(&mut self, text: &str) {
        self.events.push_back(CallbackEvent::TextChanged(text.to_string()));
    }

    fn on_select_place(&mut self, place: ResolvedPlace) {
        self.events.push_back(CallbackEvent::PlaceSelected(place));
    }
}
