use std::collections::BTreeMap;
use std::hash::Hasher;

use serde_json::{Map, Value};
use trekday_engine::{
    DayNumber, Itinerary, ItineraryConfig, LinkDeclaration, SelectionState, ToggleRequest,
    handle_toggle,
};
use twox_hash::XxHash64;

const ALPINE: &str = include_str!("../../assets/itineraries/alpine-traverse.json");

/// Responses for every day against a handful of starting selections.
fn response_snapshot(itinerary: &Itinerary) -> String {
    let starts = [
        SelectionState::empty(),
        SelectionState::from_days([6, 7, 8]),
        SelectionState::from_days([1, 2, 3, 4, 9, 10, 11]),
        SelectionState::from_days([1, 2, 3, 4, 5, 6, 7, 8, 12]),
    ];
    let mut snapshot = BTreeMap::new();
    for (index, start) in starts.iter().enumerate() {
        for day in 1..=14 {
            let request = ToggleRequest::toggle(start, DayNumber(day));
            let response = handle_toggle(itinerary, &request);
            let value = canonicalize_value(serde_json::to_value(response).unwrap());
            snapshot.insert(format!("{index}:{day:02}"), value);
        }
    }
    serde_json::to_string_pretty(&snapshot).unwrap()
}

/// Same itinerary with days, categories and links declared in reverse.
fn reordered_config() -> ItineraryConfig {
    let mut config = ItineraryConfig::from_json(ALPINE).unwrap();
    config.days.reverse();
    config.categories.reverse();
    config.links = config
        .links
        .iter()
        .rev()
        .map(|link| LinkDeclaration {
            day_a: link.day_b,
            day_b: link.day_a,
        })
        .collect();
    config
}

#[test]
fn wire_snapshot_ignores_declaration_order() {
    let original = Itinerary::from_json(ALPINE).unwrap();
    let reordered = Itinerary::from_config(reordered_config()).unwrap();

    let canonical = response_snapshot(&original);
    let digest = snapshot_hash(canonical.as_bytes());
    assert_eq!(
        digest,
        snapshot_hash(response_snapshot(&reordered).as_bytes()),
        "wire responses depend on declaration order\n{canonical}"
    );
}

#[test]
fn wire_snapshot_is_reproducible() {
    let first = response_snapshot(&Itinerary::from_json(ALPINE).unwrap());
    let second = response_snapshot(&Itinerary::from_json(ALPINE).unwrap());
    assert_eq!(
        snapshot_hash(first.as_bytes()),
        snapshot_hash(second.as_bytes())
    );
}

#[test]
fn overall_cap_rejection_has_no_category() {
    let itinerary = Itinerary::from_json(ALPINE).unwrap();
    let start = SelectionState::from_days([1, 2, 3, 4, 5, 6, 7, 8, 12]);
    let response = handle_toggle(&itinerary, &ToggleRequest::toggle(&start, DayNumber(13)));
    assert_eq!(
        canonicalize_value(serde_json::to_value(response).unwrap()),
        serde_json::json!({
            "limit": 9,
            "outcome": "rejected",
            "reason": "quota_exceeded",
            "selection": [1, 2, 3, 4, 5, 6, 7, 8, 12]
        })
    );
}

#[test]
fn badges_ignore_declaration_order() {
    let original = Itinerary::from_json(ALPINE).unwrap();
    let reordered = Itinerary::from_config(reordered_config()).unwrap();
    let badges = original.linkage().badges();
    assert_eq!(badges, reordered.linkage().badges());
    assert_eq!(badges.get(&DayNumber(6)), badges.get(&DayNumber(8)));
    assert_ne!(badges.get(&DayNumber(3)), badges.get(&DayNumber(6)));
    assert!(!badges.contains_key(&DayNumber(1)));
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(canonicalize_value)
                .collect::<Vec<_>>(),
        ),
        Value::Object(map) => {
            let mut result = Map::with_capacity(map.len());
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in entries {
                result.insert(key, canonicalize_value(value));
            }
            Value::Object(result)
        }
        other => other,
    }
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}
