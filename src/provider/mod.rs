//! Places providers (impure shell).
//!
//! This module provides the backends that answer prediction and detail
//! requests, plus the plumbing that runs them off the UI thread:
//! - `PlacesProvider` trait and request shapes
//! - `ProviderLoader` for init-once-per-credential sharing
//! - Google Places HTTP backend, offline gazetteer, scripted test backend
//! - `RequestSink` dispatch seam used by the controller

use crate::model::{PlaceDetails, PlaceId, Prediction, ProviderError};
use std::sync::Arc;

pub mod dispatch;
pub mod gazetteer;
pub mod google;
pub mod loader;
pub mod scripted;

pub use dispatch::{ProviderEvent, ProviderJob, QueuedSink, RequestSink, ThreadDispatcher};
pub use gazetteer::GazetteerProvider;
pub use google::GooglePlacesProvider;
pub use loader::ProviderLoader;
pub use scripted::ScriptedProvider;

/// Default place-type filter: cities only.
pub const DEFAULT_PLACE_TYPES: &str = "(cities)";

/// Fields requested for place details.
pub const DETAIL_FIELDS: [&str; 4] = ["formatted_address", "address_components", "geometry", "name"];

/// Predictive search backend.
///
/// Calls are blocking; `ThreadDispatcher` runs them on worker threads.
/// A query with no matches is `Ok(vec![])`, never an error.
pub trait PlacesProvider: Send + Sync {
    /// Request predictions for a query.
    fn predictions(&self, request: &PredictionRequest) -> Result<Vec<Prediction>, ProviderError>;

    /// Request full details for one place.
    fn details(&self, request: &DetailsRequest) -> Result<PlaceDetails, ProviderError>;
}

/// Provider handle shared read-only across controllers.
pub type SharedProvider = Arc<dyn PlacesProvider>;

/// Predictions request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Trimmed query text.
    pub input: String,
    /// Place-type filters, e.g. `["(cities)"]`.
    pub types: Vec<String>,
    /// ISO country restriction, when set.
    pub country: Option<String>,
}

/// Place-details request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsRequest {
    /// Place to resolve.
    pub place_id: PlaceId,
    /// Fields to return.
    pub fields: Vec<String>,
}

impl DetailsRequest {
    /// Request the standard detail fields for a place.
    pub fn standard(place_id: PlaceId) -> Self {
        Self {
            place_id,
            fields: DETAIL_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}
