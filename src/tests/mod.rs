//! Internal test modules - whitebox tests with crate access
//!
//! Harness-based acceptance tests drive the full picker (input, controller,
//! scripted provider, rendering) with simulated time.
