//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod key_action;
pub mod place;
pub mod prediction;

// Re-export for convenience
pub use error::{AppError, InitError, ProviderError, ProviderStatus};
pub use identifiers::{Credential, InvalidCredential, InvalidPlaceId, PlaceId};
pub use key_action::KeyAction;
pub use place::{
    parse_address_components, AddressComponent, AddressParts, LatLng, PlaceDetails, ResolvedPlace,
};
pub use prediction::Prediction;
