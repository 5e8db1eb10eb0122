//! Autocomplete predictions returned by a places provider.

use crate::model::PlaceId;
use serde::{Deserialize, Serialize};

/// One suggestion row for a query.
///
/// Ephemeral: the controller replaces its whole prediction set on every
/// successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Provider identifier used to fetch place details.
    pub place_id: PlaceId,
    /// Primary label (e.g. "Rome").
    #[serde(default)]
    pub main_text: String,
    /// Secondary label (e.g. "Metropolitan City of Rome, Italy").
    #[serde(default)]
    pub secondary_text: String,
    /// Full description string (e.g. "Rome, Metropolitan City of Rome, Italy").
    #[serde(default)]
    pub description: String,
}

impl Prediction {
    /// Create a prediction with only an id and description.
    ///
    /// The main label is taken from the text before the first comma.
    pub fn from_description(place_id: PlaceId, description: impl Into<String>) -> Self {
        let description = description.into();
        let (main, secondary) = match description.split_once(',') {
            Some((main, rest)) => (main.trim().to_string(), rest.trim().to_string()),
            None => (description.trim().to_string(), String::new()),
        };
        Self {
            place_id,
            main_text: main,
            secondary_text: secondary,
            description,
        }
    }

    /// Text shown in the input after this prediction is picked.
    ///
    /// Prefers the full description, falls back to the primary label.
    pub fn display_text(&self) -> &str {
        if self.description.is_empty() {
            &self.main_text
        } else {
            &self.description
        }
    }

    /// Label for the first line of a dropdown row.
    pub fn row_label(&self) -> &str {
        if self.main_text.is_empty() {
            &self.description
        } else {
            &self.main_text
        }
    }
}
