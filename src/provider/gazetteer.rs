//! Offline places backend loaded from a JSON gazetteer file.
//!
//! The file is an array of entries:
//!
//! ```json
//! [
//!   {
//!     "place_id": "p1",
//!     "name": "Rome",
//!     "secondary_text": "Lazio, Italy",
//!     "formatted_address": "Rome, Metropolitan City of Rome Capital, Italy",
//!     "location": { "lat": 41.9, "lng": 12.5 },
//!     "address_components": [
//!       { "long_name": "Italy", "short_name": "IT", "types": ["country"] }
//!     ]
//!   }
//! ]
//! ```

use crate::model::{
    AddressComponent, InitError, LatLng, PlaceDetails, PlaceId, Prediction, ProviderError,
    ProviderStatus,
};
use crate::provider::{DetailsRequest, PlacesProvider, PredictionRequest};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Maximum predictions returned per query.
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
struct GazetteerEntry {
    place_id: PlaceId,
    name: String,
    #[serde(default)]
    secondary_text: String,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    location: Option<LatLng>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

impl GazetteerEntry {
    fn description(&self) -> String {
        match &self.formatted_address {
            Some(address) if !address.is_empty() => address.clone(),
            _ if self.secondary_text.is_empty() => self.name.clone(),
            _ => format!("{}, {}", self.name, self.secondary_text),
        }
    }

    fn country_code(&self) -> Option<&str> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == "country"))
            .map(|c| c.short_name.as_str())
    }

    fn in_country(&self, country: Option<&str>) -> bool {
        match country {
            None => true,
            Some(wanted) => self
                .country_code()
                .is_some_and(|code| code.eq_ignore_ascii_case(wanted)),
        }
    }

    fn to_prediction(&self) -> Prediction {
        Prediction {
            place_id: self.place_id.clone(),
            main_text: self.name.clone(),
            secondary_text: self.secondary_text.clone(),
            description: self.description(),
        }
    }

    fn to_details(&self) -> PlaceDetails {
        PlaceDetails {
            formatted_address: self.formatted_address.clone(),
            name: Some(self.name.clone()),
            location: self.location,
            address_components: self.address_components.clone(),
        }
    }
}

/// How well an entry matches a lowercase query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    NamePrefix,
    Substring,
}

fn rank(entry: &GazetteerEntry, needle: &str) -> Option<MatchRank> {
    let name = entry.name.to_lowercase();
    if name.starts_with(needle) {
        Some(MatchRank::NamePrefix)
    } else if name.contains(needle) || entry.description().to_lowercase().contains(needle) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

/// Places backend answering from a local list.
#[derive(Debug, Clone)]
pub struct GazetteerProvider {
    entries: Vec<GazetteerEntry>,
}

impl GazetteerProvider {
    /// Parse a gazetteer from JSON text.
    ///
    /// # Errors
    ///
    /// `InitError::Load` if the text is not a valid gazetteer.
    pub fn from_json(json: &str) -> Result<Self, InitError> {
        let entries: Vec<GazetteerEntry> =
            serde_json::from_str(json).map_err(|e| InitError::Load(e.to_string()))?;
        Ok(Self { entries })
    }

    /// Load a gazetteer file.
    ///
    /// # Errors
    ///
    /// `InitError::Load` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, InitError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| InitError::Load(format!("{}: {e}", path.display())))?;
        let entries: Vec<GazetteerEntry> = serde_json::from_str(&json)
            .map_err(|e| InitError::Load(format!("{}: {e}", path.display())))?;
        let provider = Self { entries };
        info!(path = %path.display(), places = provider.len(), "Loaded gazetteer");
        Ok(provider)
    }

    /// Number of places.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the gazetteer has no places.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PlacesProvider for GazetteerProvider {
    fn predictions(&self, request: &PredictionRequest) -> Result<Vec<Prediction>, ProviderError> {
        let needle = request.input.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ProviderError::Status(ProviderStatus::InvalidRequest));
        }

        let mut ranked: Vec<(MatchRank, &GazetteerEntry)> = self
            .entries
            .iter()
            .filter(|e| e.in_country(request.country.as_deref()))
            .filter_map(|e| rank(e, &needle).map(|r| (r, e)))
            .collect();
        // Stable: file order breaks ties.
        ranked.sort_by_key(|(r, _)| *r);

        Ok(ranked
            .into_iter()
            .take(MAX_RESULTS)
            .map(|(_, e)| e.to_prediction())
            .collect())
    }

    fn details(&self, request: &DetailsRequest) -> Result<PlaceDetails, ProviderError> {
        self.entries
            .iter()
            .find(|e| e.place_id == request.place_id)
            .map(GazetteerEntry::to_details)
            .ok_or(ProviderError::Status(ProviderStatus::NotFound))
    }
}
