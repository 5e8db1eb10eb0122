//! In-memory provider with canned answers and call recording.
//!
//! Used by tests and the acceptance harness in place of a network backend.

use crate::model::{LatLng, PlaceDetails, PlaceId, Prediction, ProviderError, ProviderStatus};
use crate::provider::{DetailsRequest, PlacesProvider, PredictionRequest};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Script {
    places: Vec<Prediction>,
    details: HashMap<PlaceId, PlaceDetails>,
    predictions_error: Option<ProviderError>,
    details_error: Option<ProviderError>,
    prediction_calls: Vec<PredictionRequest>,
    details_calls: Vec<DetailsRequest>,
}

/// Scripted places backend.
///
/// Predictions are the registered places whose description contains the
/// query, case-insensitively. Errors can be injected per request kind.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<Script>,
}

impl ScriptedProvider {
    /// Create a provider with no places.
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A panic while holding the lock only happens inside a failing test.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a place with coordinates.
    ///
    /// Its details answer with the description as formatted address.
    pub fn add_place(&self, id: &str, description: &str, lat: f64, lng: f64) {
        let Ok(place_id) = PlaceId::new(id) else {
            return;
        };
        let details = PlaceDetails {
            formatted_address: Some(description.to_string()),
            name: description.split(',').next().map(|s| s.trim().to_string()),
            location: Some(LatLng { lat, lng }),
            address_components: Vec::new(),
        };
        self.add_prediction(Prediction::from_description(place_id, description), details);
    }

    /// Register a prediction together with the details it resolves to.
    pub fn add_prediction(&self, prediction: Prediction, details: PlaceDetails) {
        let mut script = self.script();
        script.details.insert(prediction.place_id.clone(), details);
        script.places.push(prediction);
    }

    /// Make every predictions request fail with `error` (or succeed again with `None`).
    pub fn fail_predictions(&self, error: Option<ProviderError>) {
        self.script().predictions_error = error;
    }

    /// Make every details request fail with `error` (or succeed again with `None`).
    pub fn fail_details(&self, error: Option<ProviderError>) {
        self.script().details_error = error;
    }

    /// Predictions requests received so far.
    pub fn prediction_calls(&self) -> Vec<PredictionRequest> {
        self.script().prediction_calls.clone()
    }

    /// Details requests received so far.
    pub fn details_calls(&self) -> Vec<DetailsRequest> {
        self.script().details_calls.clone()
    }
}

impl PlacesProvider for ScriptedProvider {
    fn predictions(&self, request: &PredictionRequest) -> Result<Vec<Prediction>, ProviderError> {
        let mut script = self.script();
        script.prediction_calls.push(request.clone());

        if let Some(error) = &script.predictions_error {
            return Err(error.clone());
        }

        let needle = request.input.to_lowercase();
        Ok(script
            .places
            .iter()
            .filter(|p| p.description.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn details(&self, request: &DetailsRequest) -> Result<PlaceDetails, ProviderError> {
        let mut script = self.script();
        script.details_calls.push(request.clone());

        if let Some(error) = &script.details_error {
            return Err(error.clone());
        }

        script
            .details
            .get(&request.place_id)
            .cloned()
            .ok_or(ProviderError::Status(ProviderStatus::NotFound))
    }
}
