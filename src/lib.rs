//! placepick
//!
//! Place autocomplete: a sans-IO controller that turns typed text into a
//! selected, resolved place, a set of places providers behind one trait, and a
//! terminal picker built on top. Follows a Pure Core / Impure Shell layout:
//! `model` and `state` are pure; `provider`, `view`, `config` and `logging`
//! touch the outside world.

pub mod config;
pub mod logging;
pub mod model;
pub mod provider;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_harness;

#[cfg(test)]
mod tests;
