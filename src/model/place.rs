//! Place details and the resolved selection handed back to callers.

use crate::model::{PlaceId, Prediction};
use serde::{Deserialize, Serialize};

// Address component type labels (Google Places vocabulary).
const TYPE_LOCALITY: &str = "locality";
const TYPE_POSTAL_TOWN: &str = "postal_town";
const TYPE_ADMIN3: &str = "administrative_area_level_3";
const TYPE_SUBLOCALITY1: &str = "sublocality_level_1";
const TYPE_ADMIN2: &str = "administrative_area_level_2";
const TYPE_ADMIN1: &str = "administrative_area_level_1";
const TYPE_COUNTRY: &str = "country";

/// Geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// One tagged part of a structured address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    /// Long-form name ("Italy").
    pub long_name: String,
    /// Short name ("IT").
    #[serde(default)]
    pub short_name: String,
    /// Type labels, e.g. `["country", "political"]`.
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    /// Build a component from borrowed parts.
    pub fn new(long_name: &str, short_name: &str, types: &[&str]) -> Self {
        Self {
            long_name: long_name.to_string(),
            short_name: short_name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }
}

/// Detail payload for a single place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceDetails {
    /// Provider formatted address, if any.
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// Place name, if any.
    #[serde(default)]
    pub name: Option<String>,
    /// Geometry location, if any.
    #[serde(default)]
    pub location: Option<LatLng>,
    /// Structured address components.
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

/// Structured address parts derived from address components.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressParts {
    /// City / town.
    pub locality: String,
    /// Second-level administrative division (province).
    pub admin2: String,
    /// First-level administrative division (region).
    pub admin1: String,
    /// Country long name.
    pub country: String,
    /// Country short code.
    pub country_code: String,
    /// Comma-joined display string.
    pub display: String,
}

/// Final structured result of a selection.
///
/// Produced once per selection and never retained by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlace {
    /// Best available address text.
    pub formatted_address: String,
    /// Provider identifier, when known.
    pub place_id: Option<PlaceId>,
    /// Latitude, when the provider returned geometry.
    pub lat: Option<f64>,
    /// Longitude, when the provider returned geometry.
    pub lng: Option<f64>,
    /// Derived address parts.
    pub addr_parts: AddressParts,
}

impl ResolvedPlace {
    /// Build the result for a successful detail fetch.
    ///
    /// Formatted address priority: provider address, provider name, then
    /// `fallback_text` (the prediction's display text).
    pub fn from_details(place_id: PlaceId, details: &PlaceDetails, fallback_text: &str) -> Self {
        let formatted_address = non_empty(details.formatted_address.as_deref())
            .or_else(|| non_empty(details.name.as_deref()))
            .unwrap_or(fallback_text)
            .to_string();

        Self {
            formatted_address,
            place_id: Some(place_id),
            lat: details.location.map(|l| l.lat),
            lng: details.location.map(|l| l.lng),
            addr_parts: parse_address_components(&details.address_components),
        }
    }

    /// Best-effort result when the detail fetch failed.
    ///
    /// Uses the prediction's own text; coordinates are unknown.
    pub fn degraded(prediction: &Prediction) -> Self {
        let text = prediction.display_text().to_string();
        Self {
            formatted_address: text.clone(),
            place_id: Some(prediction.place_id.clone()),
            lat: None,
            lng: None,
            addr_parts: AddressParts {
                display: text,
                ..AddressParts::default()
            },
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Derive [`AddressParts`] from provider address components.
///
/// Pure function. Locality is the first present of locality, postal town,
/// third-level admin division, first-level sublocality. The display string is
/// the most specific non-empty combination, comma-joined.
pub fn parse_address_components(components: &[AddressComponent]) -> AddressParts {
    let find = |ty: &str| components.iter().find(|c| c.has_type(ty));
    let long = |ty: &str| find(ty).map(|c| c.long_name.clone()).unwrap_or_default();

    let locality = [TYPE_LOCALITY, TYPE_POSTAL_TOWN, TYPE_ADMIN3, TYPE_SUBLOCALITY1]
        .iter()
        .map(|ty| long(ty))
        .find(|name| !name.is_empty())
        .unwrap_or_default();
    let admin2 = long(TYPE_ADMIN2);
    let admin1 = long(TYPE_ADMIN1);
    let country = long(TYPE_COUNTRY);
    let country_code = find(TYPE_COUNTRY)
        .map(|c| c.short_name.clone())
        .unwrap_or_default();

    let display = compose_display(&locality, &admin2, &admin1, &country);

    AddressParts {
        locality,
        admin2,
        admin1,
        country,
        country_code,
        display,
    }
}

fn compose_display(locality: &str, admin2: &str, admin1: &str, country: &str) -> String {
    let first_present = [locality, admin2, admin1, country]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    if first_present.is_empty() || country.is_empty() {
        // Without a country there is nothing to qualify the name with.
        return first_present.to_string();
    }

    let parts: Vec<&str> = if !locality.is_empty() && !admin2.is_empty() {
        vec![locality, admin2, country]
    } else if !locality.is_empty() && !admin1.is_empty() {
        vec![locality, admin1, country]
    } else if !locality.is_empty() {
        vec![locality, country]
    } else if !admin2.is_empty() {
        vec![admin2, country]
    } else if !admin1.is_empty() {
        vec![admin1, country]
    } else {
        vec![country]
    };
    parts.join(", ")
}

// ===== Tests =====

#[cfg(test)]
#[path = "place_tests.rs"]
mod tests;
