//! Tests for address parsing and resolved place construction.

use super::*;

fn id(raw: &str) -> PlaceId {
    PlaceId::new(raw).expect("valid place id")
}

fn rome_components() -> Vec<AddressComponent> {
    vec![
        AddressComponent::new("Rome", "Rome", &["locality", "political"]),
        AddressComponent::new("RM", "RM", &["administrative_area_level_2", "political"]),
        AddressComponent::new("Lazio", "Lazio", &["administrative_area_level_1", "political"]),
        AddressComponent::new("Italy", "IT", &["country", "political"]),
    ]
}

// ===== parse_address_components =====

#[test]
fn locality_admin2_country_display() {
    let components = vec![
        AddressComponent::new("Rome", "Rome", &["locality"]),
        AddressComponent::new("RM", "RM", &["administrative_area_level_2"]),
        AddressComponent::new("Italy", "IT", &["country"]),
    ];
    let parts = parse_address_components(&components);
    assert_eq!(parts.display, "Rome, RM, Italy");
    assert_eq!(parts.locality, "Rome");
    assert_eq!(parts.admin2, "RM");
    assert_eq!(parts.country, "Italy");
    assert_eq!(parts.country_code, "IT");
    assert_eq!(parts.admin1, "");
}

#[test]
fn admin2_preferred_over_admin1_when_both_present() {
    let parts = parse_address_components(&rome_components());
    assert_eq!(parts.display, "Rome, RM, Italy");
    assert_eq!(parts.admin1, "Lazio");
}

#[test]
fn locality_admin1_country_when_admin2_missing() {
    let components = vec![
        AddressComponent::new("Paris", "Paris", &["locality"]),
        AddressComponent::new("Île-de-France", "IDF", &["administrative_area_level_1"]),
        AddressComponent::new("France", "FR", &["country"]),
    ];
    let parts = parse_address_components(&components);
    assert_eq!(parts.display, "Paris, Île-de-France, France");
}

#[test]
fn locality_country_when_no_admin_levels() {
    let components = vec![
        AddressComponent::new("Monaco", "Monaco", &["locality"]),
        AddressComponent::new("Monaco", "MC", &["country"]),
    ];
    let parts = parse_address_components(&components);
    assert_eq!(parts.display, "Monaco, Monaco");
}

#[test]
fn admin2_country_without_locality() {
    let components = vec![
        AddressComponent::new("Bari", "BA", &["administrative_area_level_2"]),
        AddressComponent::new("Italy", "IT", &["country"]),
    ];
    let parts = parse_address_components(&components);
    assert_eq!(parts.display, "Bari, Italy");
}

#[test]
fn admin1_country_without_locality_or_admin2() {
    let components = vec![
        AddressComponent::new("Apulia", "Apulia", &["administrative_area_level_1"]),
        AddressComponent::new("Italy", "IT", &["country"]),
    ];
    let parts = parse_address_components(&components);
    assert_eq!(parts.display, "Apulia, Italy");
}

#[test]
fn country_alone_displays_country_once() {
    let components = vec![AddressComponent::new("France", "FR", &["country", "political"])];
    let parts = parse_address_components(&components);
    assert_eq!(parts.display, "France");
    assert_eq!(parts.country_code, "FR");
}

#[test]
fn no_components_gives_empty_display() {
    let parts = parse_address_components(&[]);
    assert_eq!(parts, AddressParts::default());
    assert_eq!(parts.display, "");
}

#[test]
fn locality_without_country_displays_locality() {
    let components = vec![AddressComponent::new("Atlantis", "Atlantis", &["locality"])];
    let parts = parse_address_components(&components);
    assert_eq!(parts.display, "Atlantis");
}

#[test]
fn locality_falls_back_through_postal_town_admin3_sublocality() {
    let postal = vec![AddressComponent::new("Bath", "Bath", &["postal_town"])];
    assert_eq!(parse_address_components(&postal).locality, "Bath");

    let admin3 = vec![AddressComponent::new(
        "Alberobello",
        "Alberobello",
        &["administrative_area_level_3"],
    )];
    assert_eq!(parse_address_components(&admin3).locality, "Alberobello");

    let sub = vec![AddressComponent::new("Brooklyn", "Brooklyn", &["sublocality_level_1"])];
    assert_eq!(parse_address_components(&sub).locality, "Brooklyn");
}

#[test]
fn locality_label_wins_over_postal_town() {
    let components = vec![
        AddressComponent::new("Town", "Town", &["postal_town"]),
        AddressComponent::new("City", "City", &["locality"]),
    ];
    assert_eq!(parse_address_components(&components).locality, "City");
}

// ===== ResolvedPlace =====

#[test]
fn from_details_uses_geometry_and_formatted_address() {
    let details = PlaceDetails {
        formatted_address: Some("Rome, Metropolitan City of Rome, Italy".into()),
        name: Some("Rome".into()),
        location: Some(LatLng { lat: 41.9, lng: 12.5 }),
        address_components: rome_components(),
    };
    let place = ResolvedPlace::from_details(id("p1"), &details, "Rome, Italy");

    assert_eq!(place.formatted_address, "Rome, Metropolitan City of Rome, Italy");
    assert_eq!(place.place_id, Some(id("p1")));
    assert_eq!(place.lat, Some(41.9));
    assert_eq!(place.lng, Some(12.5));
    assert_eq!(place.addr_parts.display, "Rome, RM, Italy");
}

#[test]
fn from_details_falls_back_to_name_then_display_text() {
    let named = PlaceDetails {
        formatted_address: None,
        name: Some("Rome".into()),
        ..PlaceDetails::default()
    };
    assert_eq!(
        ResolvedPlace::from_details(id("p1"), &named, "Rome, Italy").formatted_address,
        "Rome"
    );

    let bare = PlaceDetails {
        formatted_address: Some(String::new()),
        ..PlaceDetails::default()
    };
    let place = ResolvedPlace::from_details(id("p1"), &bare, "Rome, Italy");
    assert_eq!(place.formatted_address, "Rome, Italy");
    assert_eq!(place.lat, None, "No geometry means no latitude");
    assert_eq!(place.lng, None, "No geometry means no longitude");
}

#[test]
fn degraded_place_carries_prediction_text_only() {
    let prediction = Prediction::from_description(id("p9"), "Lecce, Italy");
    let place = ResolvedPlace::degraded(&prediction);

    assert_eq!(place.formatted_address, "Lecce, Italy");
    assert_eq!(place.place_id, Some(id("p9")));
    assert_eq!(place.lat, None);
    assert_eq!(place.lng, None);
    assert_eq!(
        place.addr_parts,
        AddressParts {
            display: "Lecce, Italy".into(),
            ..AddressParts::default()
        }
    );
}

#[test]
fn resolved_place_serializes_with_caller_field_names() {
    let place = ResolvedPlace::from_details(
        id("p1"),
        &PlaceDetails {
            formatted_address: Some("Rome, Italy".into()),
            name: None,
            location: Some(LatLng { lat: 41.9, lng: 12.5 }),
            address_components: rome_components(),
        },
        "Rome, Italy",
    );

    insta::assert_json_snapshot!(place, @r###"
    {
      "formattedAddress": "Rome, Italy",
      "placeId": "p1",
      "lat": 41.9,
      "lng": 12.5,
      "addrParts": {
        "locality": "Rome",
        "admin2": "RM",
        "admin1": "Lazio",
        "country": "Italy",
        "countryCode": "IT",
        "display": "Rome, RM, Italy"
      }
    }
    "###);
}

#[test]
fn degraded_place_serializes_null_coordinates() {
    let prediction = Prediction::from_description(id("p2"), "Nowhere");
    let json = serde_json::to_value(ResolvedPlace::degraded(&prediction)).unwrap();
    assert!(json["lat"].is_null());
    assert!(json["lng"].is_null());
    assert_eq!(json["formattedAddress"], "Nowhere");
}
