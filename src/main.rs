//! placepick - Entry Point

use clap::Parser;
use placepick::config::{self, CliOverrides, ResolvedConfig};
use placepick::model::{AppError, InitError};
use placepick::provider::{
    GazetteerProvider, GooglePlacesProvider, ProviderLoader, SharedProvider, ThreadDispatcher,
};
use placepick::state::{CallbackLog, PlaceController};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Pick a place from provider suggestions as you type
#[derive(Parser, Debug)]
#[command(name = "placepick")]
#[command(version)]
#[command(about = "Terminal place picker with debounced autocomplete")]
pub struct Args {
    /// Places provider API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Restrict results to an ISO country code ("" for worldwide)
    #[arg(long)]
    pub country: Option<String>,

    /// Place-type filter, e.g. "(cities)", "(regions)", "geocode"
    #[arg(long = "types")]
    pub place_types: Option<String>,

    /// Response language
    #[arg(long)]
    pub language: Option<String>,

    /// Search an offline JSON gazetteer instead of the network provider
    #[arg(long, value_name = "FILE")]
    pub gazetteer: Option<PathBuf>,

    /// Start with this text in the input
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            api_key: self.api_key.clone(),
            country: self.country.clone(),
            place_types: self.place_types.clone(),
            language: self.language.clone(),
            gazetteer: self.gazetteer.clone(),
        }
    }
}

/// Loader that builds the configured backend on first use.
///
/// A gazetteer file wins over the network provider.
fn provider_loader(config: &ResolvedConfig) -> ProviderLoader {
    match config.gazetteer.clone() {
        Some(path) => ProviderLoader::new(move |_| {
            let provider = GazetteerProvider::from_path(&path)?;
            Ok(Arc::new(provider) as SharedProvider)
        }),
        None => {
            let language = config.language.clone();
            ProviderLoader::new(move |credential| {
                let provider = GooglePlacesProvider::new(credential.clone(), language.clone())?;
                Ok::<SharedProvider, InitError>(Arc::new(provider))
            })
        }
    }
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(with_env, args.overrides())
    };

    placepick::logging::init(&config.log_file_path)?;

    info!(
        country = ?config.country,
        place_types = %config.place_types,
        language = %config.language,
        gazetteer = ?config.gazetteer,
        has_api_key = config.api_key.is_some(),
        "Configuration loaded and resolved"
    );

    let loader = provider_loader(&config);
    let controller = PlaceController::new(
        config.controller_settings(),
        &loader,
        ThreadDispatcher::new(),
        CallbackLog::new(),
    );

    let selected =
        placepick::view::run_picker(controller, config.placeholder, args.query.as_deref())?;

    match selected {
        Some(place) => {
            info!(place_id = ?place.place_id, "Exiting with selection");
            println!("{}", serde_json::to_string_pretty(&place)?);
        }
        None => info!("Exiting without selection"),
    }

    Ok(())
}
