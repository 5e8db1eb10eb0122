//! Google Places web service backend.
//!
//! Talks to the Place Autocomplete and Place Details JSON endpoints with a
//! blocking `reqwest` client. Runs on dispatcher worker threads, never on the
//! UI thread.

use crate::model::{
    AddressComponent, Credential, InitError, LatLng, PlaceDetails, PlaceId, Prediction,
    ProviderError, ProviderStatus,
};
use crate::provider::{DetailsRequest, PlacesProvider, PredictionRequest};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "it";

// ===== Wire format =====

#[derive(Debug, Deserialize)]
struct AutocompleteBody {
    status: String,
    #[serde(default)]
    predictions: Vec<WirePrediction>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePrediction {
    place_id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
struct StructuredFormatting {
    #[serde(default)]
    main_text: String,
    #[serde(default)]
    secondary_text: String,
}

#[derive(Debug, Deserialize)]
struct DetailsBody {
    status: String,
    #[serde(default)]
    result: Option<WireDetails>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDetails {
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    geometry: Option<WireGeometry>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    location: LatLng,
}

// ===== Body parsing =====

/// Decode an autocomplete response body.
///
/// `ZERO_RESULTS` decodes to an empty list. Predictions without a usable
/// place id are skipped.
///
/// # Errors
///
/// `ProviderError::Decode` for malformed JSON, `ProviderError::Status` for any
/// other non-OK status.
pub fn parse_autocomplete_body(body: &str) -> Result<Vec<Prediction>, ProviderError> {
    let body: AutocompleteBody =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    match ProviderStatus::from_name(&body.status) {
        ProviderStatus::Ok => {}
        ProviderStatus::ZeroResults => return Ok(Vec::new()),
        status => {
            if let Some(message) = body.error_message {
                warn!(%status, error_message = %message, "Autocomplete request rejected");
            }
            return Err(ProviderError::Status(status));
        }
    }

    Ok(body
        .predictions
        .into_iter()
        .filter_map(|wire| {
            let place_id = PlaceId::new(wire.place_id).ok()?;
            let (main_text, secondary_text) = wire
                .structured_formatting
                .map(|sf| (sf.main_text, sf.secondary_text))
                .unwrap_or_default();
            Some(Prediction {
                place_id,
                main_text,
                secondary_text,
                description: wire.description,
            })
        })
        .collect())
}

/// Decode a place details response body.
///
/// # Errors
///
/// `ProviderError::Decode` for malformed JSON, `ProviderError::Status` for any
/// non-OK status (including an OK status without a result).
pub fn parse_details_body(body: &str) -> Result<PlaceDetails, ProviderError> {
    let body: DetailsBody =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    let status = ProviderStatus::from_name(&body.status);
    if status != ProviderStatus::Ok {
        if let Some(message) = body.error_message {
            warn!(%status, error_message = %message, "Details request rejected");
        }
        return Err(ProviderError::Status(status));
    }

    let result = body
        .result
        .ok_or(ProviderError::Status(ProviderStatus::NotFound))?;
    Ok(PlaceDetails {
        formatted_address: result.formatted_address,
        name: result.name,
        location: result.geometry.map(|g| g.location),
        address_components: result.address_components,
    })
}

/// Web service field name for a details field.
fn wire_field(field: &str) -> &str {
    match field {
        "address_components" => "address_component",
        other => other,
    }
}

// ===== Provider =====

/// Places backend calling the Google web service.
#[derive(Debug)]
pub struct GooglePlacesProvider {
    client: Client,
    credential: Credential,
    language: String,
    base_url: String,
}

impl GooglePlacesProvider {
    /// Build a provider for `credential`.
    ///
    /// # Errors
    ///
    /// `InitError::Load` if the HTTP client cannot be constructed.
    pub fn new(credential: Credential, language: impl Into<String>) -> Result<Self, InitError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("placepick/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InitError::Load(e.to_string()))?;

        Ok(Self {
            client,
            credential,
            language: language.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at another endpoint root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Query parameters for an autocomplete request.
    fn autocomplete_params(&self, request: &PredictionRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("input", request.input.clone()),
            ("key", self.credential.expose().to_string()),
            ("language", self.language.clone()),
        ];
        if !request.types.is_empty() {
            params.push(("types", request.types.join("|")));
        }
        if let Some(country) = &request.country {
            params.push(("components", format!("country:{country}")));
        }
        params
    }

    /// Query parameters for a details request.
    fn details_params(&self, request: &DetailsRequest) -> Vec<(&'static str, String)> {
        let fields: Vec<&str> = request.fields.iter().map(|f| wire_field(f)).collect();
        vec![
            ("place_id", request.place_id.to_string()),
            ("fields", fields.join(",")),
            ("key", self.credential.expose().to_string()),
            ("language", self.language.clone()),
        ]
    }

    fn get(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<String, ProviderError> {
        let url = format!("{}/{endpoint}/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("HTTP {status}")));
        }
        response
            .text()
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }
}

impl PlacesProvider for GooglePlacesProvider {
    fn predictions(&self, request: &PredictionRequest) -> Result<Vec<Prediction>, ProviderError> {
        debug!(input = %request.input, "Requesting autocomplete predictions");
        let body = self.get("autocomplete", &self.autocomplete_params(request))?;
        parse_autocomplete_body(&body)
    }

    fn details(&self, request: &DetailsRequest) -> Result<PlaceDetails, ProviderError> {
        debug!(place_id = %request.place_id, "Requesting place details");
        let body = self.get("details", &self.details_params(request))?;
        parse_details_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTOCOMPLETE_OK: &str = r#"{
        "status": "OK",
        "predictions": [
            {
                "place_id": "ChIJu46S-ZZhLxMROG5lkwZ3D7k",
                "description": "Rome, Metropolitan City of Rome Capital, Italy",
                "structured_formatting": {
                    "main_text": "Rome",
                    "secondary_text": "Metropolitan City of Rome Capital, Italy"
                }
            },
            {
                "place_id": "",
                "description": "broken row"
            }
        ]
    }"#;

    const DETAILS_OK: &str = r#"{
        "status": "OK",
        "result": {
            "formatted_address": "Rome, Metropolitan City of Rome Capital, Italy",
            "name": "Rome",
            "geometry": { "location": { "lat": 41.9027835, "lng": 12.4963655 } },
            "address_components": [
                { "long_name": "Rome", "short_name": "Rome", "types": ["locality", "political"] },
                { "long_name": "Italy", "short_name": "IT", "types": ["country", "political"] }
            ]
        }
    }"#;

    fn provider() -> GooglePlacesProvider {
        GooglePlacesProvider::new(Credential::new("test-key").unwrap(), "it").unwrap()
    }

    #[test]
    fn parses_predictions_and_skips_rows_without_id() {
        let predictions = parse_autocomplete_body(AUTOCOMPLETE_OK).unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].main_text, "Rome");
        assert_eq!(
            predictions[0].secondary_text,
            "Metropolitan City of Rome Capital, Italy"
        );
        assert_eq!(predictions[0].place_id.as_str(), "ChIJu46S-ZZhLxMROG5lkwZ3D7k");
    }

    #[test]
    fn zero_results_is_empty_list() {
        let body = r#"{"status":"ZERO_RESULTS","predictions":[]}"#;
        assert_eq!(parse_autocomplete_body(body), Ok(vec![]));
    }

    #[test]
    fn non_ok_status_is_error() {
        let body = r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#;
        assert_eq!(
            parse_autocomplete_body(body),
            Err(ProviderError::Status(ProviderStatus::RequestDenied))
        );
    }

    #[test]
    fn malformed_body_is_decode_error() {
        assert!(matches!(
            parse_autocomplete_body("<html>"),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn parses_details_with_geometry() {
        let details = parse_details_body(DETAILS_OK).unwrap();
        assert_eq!(details.name.as_deref(), Some("Rome"));
        let location = details.location.unwrap();
        assert!((location.lat - 41.9027835).abs() < 1e-9);
        assert_eq!(details.address_components.len(), 2);
    }

    #[test]
    fn details_without_result_is_not_found() {
        let body = r#"{"status":"OK"}"#;
        assert_eq!(
            parse_details_body(body),
            Err(ProviderError::Status(ProviderStatus::NotFound))
        );
    }

    #[test]
    fn details_zero_results_is_an_error() {
        let body = r#"{"status":"ZERO_RESULTS"}"#;
        assert_eq!(
            parse_details_body(body),
            Err(ProviderError::Status(ProviderStatus::ZeroResults))
        );
    }

    #[test]
    fn autocomplete_params_carry_constraints() {
        let request = PredictionRequest {
            input: "Rom".into(),
            types: vec!["(cities)".into()],
            country: Some("it".into()),
        };
        let params = provider().autocomplete_params(&request);

        assert!(params.contains(&("input", "Rom".to_string())));
        assert!(params.contains(&("types", "(cities)".to_string())));
        assert!(params.contains(&("components", "country:it".to_string())));
        assert!(params.contains(&("language", "it".to_string())));
    }

    #[test]
    fn autocomplete_params_omit_country_when_unrestricted() {
        let request = PredictionRequest {
            input: "Rom".into(),
            types: vec!["(cities)".into()],
            country: None,
        };
        let params = provider().autocomplete_params(&request);
        assert!(params.iter().all(|(k, _)| *k != "components"));
    }

    #[test]
    fn details_params_use_web_service_field_names() {
        let request = DetailsRequest::standard(PlaceId::new("p1").unwrap());
        let params = provider().details_params(&request);
        assert!(params.contains(&(
            "fields",
            "formatted_address,address_component,geometry,name".to_string()
        )));
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let provider = provider().with_base_url("http://localhost:9999/place/");
        assert_eq!(provider.base_url, "http://localhost:9999/place");
    }
}
