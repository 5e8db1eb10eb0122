//! Place picker state (pure).
//!
//! All state transitions are deterministic and testable without a terminal
//! or network: time is passed in, provider calls leave through a sink.

pub mod callbacks;
pub mod controller;
pub mod input_buffer;
pub mod navigation;
pub mod timer;

// Re-export for convenience
pub use callbacks::{CallbackEvent, CallbackLog, PlaceCallbacks};
pub use controller::{
    ControllerSettings, KeyResponse, ListState, PlaceController, SelectionPhase,
    DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_CHARS, DEFAULT_SELECTION_GUARD,
};
pub use input_buffer::InputBuffer;
pub use timer::{CancellableTimer, Debouncer};
