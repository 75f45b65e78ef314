// Unit tests for the place join.
//
// Deserializes realistic search payloads and checks which posts qualify.

use geotox::places::{PlaceIndex, Qualification};
use geotox::twitter::types::SearchResponse;

fn response(json: &str) -> SearchResponse {
    serde_json::from_str(json).unwrap()
}

const TWO_PLACES: &str = r#"{
    "data": [
        {"id": "1", "text": "Vamos votar #eleicoes", "geo": {"place_id": "p1"}},
        {"id": "2", "text": "Debate hoje #politica", "geo": {"place_id": "p3"}},
        {"id": "3", "text": "Sem local #eleicoes"}
    ],
    "includes": {
        "places": [
            {"id": "p1", "full_name": "São Paulo, Brasil", "country_code": "BR"},
            {"id": "p2", "full_name": "Recife, Brasil", "country_code": "BR"}
        ]
    },
    "meta": {"result_count": 3}
}"#;

#[test]
fn known_place_qualifies() {
    let resp = response(TWO_PLACES);
    let index = PlaceIndex::build(resp.places());
    let tweets = resp.tweets();

    match index.classify(&tweets[0]) {
        Qualification::Qualifying(place) => {
            assert_eq!(place.id, "p1");
            assert_eq!(place.label(), "São Paulo, Brasil");
        }
        other => panic!("expected qualifying, got {other:?}"),
    }
}

#[test]
fn unknown_place_is_skipped_without_error() {
    let resp = response(TWO_PLACES);
    let index = PlaceIndex::build(resp.places());

    let outcome = index.classify(&resp.tweets()[1]);
    assert_eq!(outcome, Qualification::UnknownPlace("p3".to_string()));
    assert!(!matches!(outcome, Qualification::Qualifying(_)));
}

#[test]
fn post_without_geo_is_skipped() {
    let resp = response(TWO_PLACES);
    let index = PlaceIndex::build(resp.places());
    assert_eq!(index.classify(&resp.tweets()[2]), Qualification::NoGeoTag);
}

#[test]
fn index_has_one_entry_per_place() {
    let resp = response(TWO_PLACES);
    let index = PlaceIndex::build(resp.places());
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("p1").map(|p| p.label()), Some("São Paulo, Brasil"));
    assert!(index.get("p2").is_some());
    assert!(index.get("p3").is_none());
}

#[test]
fn missing_includes_gives_empty_index() {
    let resp = response(r#"{"data": [{"id": "9", "text": "oi", "geo": {"place_id": "p1"}}]}"#);
    let index = PlaceIndex::build(resp.places());
    assert!(index.is_empty());
    assert_eq!(
        index.classify(&resp.tweets()[0]),
        Qualification::UnknownPlace("p1".to_string())
    );
}

#[test]
fn created_at_is_parsed() {
    let resp = response(
        r#"{"data": [{"id": "1", "text": "oi", "created_at": "2022-10-02T12:30:00.000Z"}]}"#,
    );
    let created = resp.tweets()[0].created_at.unwrap();
    assert_eq!(created.to_rfc3339(), "2022-10-02T12:30:00+00:00");
}
