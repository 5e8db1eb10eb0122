//! Configuration module.
//!
//! Settings resolve through defaults → config file → environment → CLI.

pub mod keybindings;
pub mod loader;

pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    CliOverrides, ConfigError, ConfigFile, ResolvedConfig,
};
