use serde_json::json;

use super::*;

fn rooms() -> Extractor {
    Extractor::new(PayloadSchema::RoomSearch)
}

fn booking() -> Extractor {
    Extractor::new(PayloadSchema::Booking)
}

fn as_value(record: Option<Record>) -> Option<Value> {
    record.map(Value::Object)
}

// -----------------------------------------------------------------------
// structuredContent
// -----------------------------------------------------------------------

#[test]
fn structured_content_in_json_string_is_returned_unchanged() {
    let inner = json!({"rooms": [{"id": "r1", "name": "Queen"}], "extra": {"x": 1}});
    let candidate = Value::String(json!({"structuredContent": inner.clone()}).to_string());
    assert_eq!(as_value(rooms().extract(&candidate)), Some(inner));
}

#[test]
fn room_search_trusts_structured_content_without_known_keys() {
    let candidate = json!({"structuredContent": {"anything": true}, "result": {"rooms": []}});
    assert_eq!(
        as_value(rooms().extract(&candidate)),
        Some(json!({"anything": true}))
    );
}

#[test]
fn booking_ignores_unrecognized_structured_content() {
    let candidate = json!({
        "structuredContent": {"anything": true},
        "result": {"booking_id": "BK-9"}
    });
    assert_eq!(
        as_value(booking().extract(&candidate)),
        Some(json!({"booking_id": "BK-9"}))
    );
}

#[test]
fn booking_accepts_recognized_structured_content() {
    let candidate = json!({"structuredContent": {"booking_id": "BK-1", "status": "confirmed"}});
    assert_eq!(
        as_value(booking().extract(&candidate)),
        Some(json!({"booking_id": "BK-1", "status": "confirmed"}))
    );
}

#[test]
fn structured_content_as_json_text_is_coerced() {
    let candidate = json!({"structuredContent": "{\"hotels\": []}"});
    assert_eq!(as_value(rooms().extract(&candidate)), Some(json!({"hotels": []})));
}

#[test]
fn uncoercible_structured_content_falls_through() {
    let candidate = json!({"structuredContent": [1, 2], "data": {"count": 0}});
    assert_eq!(as_value(rooms().extract(&candidate)), Some(json!({"count": 0})));
}

// -----------------------------------------------------------------------
// wrapper keys
// -----------------------------------------------------------------------

#[test]
fn nested_wrappers_terminate_at_first_matching_layer() {
    let candidate = json!({"result": {"output": {"rooms": []}}});
    assert_eq!(as_value(rooms().extract(&candidate)), Some(json!({"rooms": []})));
}

#[test]
fn wrapper_keys_are_tried_in_priority_order() {
    let candidate = json!({
        "value": {"rooms": ["from-value"]},
        "toolOutput": {"rooms": ["from-toolOutput"]},
        "data": {"rooms": ["from-data"]}
    });
    assert_eq!(
        as_value(rooms().extract(&candidate)),
        Some(json!({"rooms": ["from-data"]}))
    );
}

#[test]
fn wrapper_match_wins_over_record_level_match() {
    let candidate = json!({"count": 99, "result": {"count": 1}});
    assert_eq!(as_value(rooms().extract(&candidate)), Some(json!({"count": 1})));
}

#[test]
fn wrapper_holding_json_text_is_parsed() {
    let candidate = json!({"tool_result": "{\"property_name\": \"Harbor Inn\"}"});
    assert_eq!(
        as_value(rooms().extract(&candidate)),
        Some(json!({"property_name": "Harbor Inn"}))
    );
}

#[test]
fn every_wrapper_key_is_searched() {
    for key in WRAPPER_KEYS {
        let mut outer = Record::new();
        outer.insert(key.to_string(), json!({"rooms": [key]}));
        let candidate = Value::Object(outer);
        assert_eq!(
            as_value(rooms().extract(&candidate)),
            Some(json!({"rooms": [key]})),
            "wrapper key {key}"
        );
    }
}

// -----------------------------------------------------------------------
// content blocks
// -----------------------------------------------------------------------

#[test]
fn content_text_block_is_parsed() {
    let candidate = json!({
        "content": [{"type": "text", "text": "{\"count\":2,\"rooms\":[{\"id\":\"a\"},{\"id\":\"b\"}]}"}]
    });
    assert_eq!(
        as_value(rooms().extract(&candidate)),
        Some(json!({"count": 2, "rooms": [{"id": "a"}, {"id": "b"}]}))
    );
}

#[test]
fn content_skips_non_json_and_non_text_blocks() {
    let candidate = json!({
        "content": [
            {"type": "image", "data": "..."},
            {"type": "text", "text": "Here are your rooms:"},
            "bare string",
            {"type": "text", "text": "{\"hotels\": [{\"name\": \"Harbor Inn\"}]}"}
        ]
    });
    assert_eq!(
        as_value(rooms().extract(&candidate)),
        Some(json!({"hotels": [{"name": "Harbor Inn"}]}))
    );
}

#[test]
fn content_text_is_searched_recursively() {
    let text = json!({"result": {"booking_id": "BK-3"}}).to_string();
    let candidate = json!({"content": [{"text": text}]});
    assert_eq!(
        as_value(booking().extract(&candidate)),
        Some(json!({"booking_id": "BK-3"}))
    );
}

#[test]
fn content_match_wins_over_record_level_match() {
    let candidate = json!({
        "error": "top-level",
        "content": [{"text": "{\"rooms\": []}"}]
    });
    assert_eq!(as_value(rooms().extract(&candidate)), Some(json!({"rooms": []})));
}

// -----------------------------------------------------------------------
// record level and child fallbacks
// -----------------------------------------------------------------------

#[test]
fn record_itself_is_returned_when_recognized() {
    let candidate = json!({"status": "confirmed", "total": 420, "check_in": "2026-05-01"});
    assert_eq!(as_value(booking().extract(&candidate)), Some(candidate.clone()));
}

#[test]
fn first_recognized_direct_child_is_returned() {
    let candidate = json!({
        "meta": {"request_id": "x"},
        "search": {"hotels": []},
        "later": {"rooms": []}
    });
    assert_eq!(as_value(rooms().extract(&candidate)), Some(json!({"hotels": []})));
}

#[test]
fn direct_child_json_text_is_coerced() {
    let candidate = json!({"payload": "{\"booking_id\": \"BK-7\"}"});
    assert_eq!(
        as_value(booking().extract(&candidate)),
        Some(json!({"booking_id": "BK-7"}))
    );
}

#[test]
fn child_fallback_is_one_level_only() {
    let candidate = json!({"outer": {"inner": {"rooms": []}}});
    assert!(rooms().extract(&candidate).is_none());
}

// -----------------------------------------------------------------------
// negative cases
// -----------------------------------------------------------------------

#[test]
fn no_recognized_keys_yields_nothing() {
    let candidate = json!({
        "result": {"output": {"items": [1, 2]}},
        "content": [{"text": "{\"foo\": 1}"}],
        "meta": {"bar": 2}
    });
    assert!(rooms().extract(&candidate).is_none());
    assert!(booking().extract(&candidate).is_none());
}

#[test]
fn primitives_yield_nothing() {
    for candidate in [
        json!(null),
        json!(0),
        json!(false),
        json!("not json"),
        json!([{"rooms": []}]),
    ] {
        assert!(rooms().extract(&candidate).is_none(), "matched {candidate}");
    }
}

#[test]
fn booking_partial_co_keys_yield_nothing() {
    let candidate = json!({"status": "pending", "check_in": "2026-05-01"});
    assert!(booking().extract(&candidate).is_none());
}

// -----------------------------------------------------------------------
// purity and depth cap
// -----------------------------------------------------------------------

#[test]
fn extraction_is_idempotent_and_does_not_mutate_input() {
    let candidate = json!({
        "content": [{"text": "{\"result\": {\"rooms\": [{\"id\": \"a\"}]}}"}],
        "meta": {"rooms_hint": true}
    });
    let before = candidate.clone();
    let first = rooms().extract(&candidate);
    let second = rooms().extract(&candidate);
    assert_eq!(first, second);
    assert!(first.is_some());
    assert_eq!(candidate, before);
}

fn nest(depth: usize, leaf: Value) -> Value {
    (0..depth).fold(leaf, |inner, _| json!({"result": inner}))
}

#[test]
fn payload_within_depth_cap_is_found() {
    let candidate = nest(5, json!({"rooms": []}));
    let found = rooms().with_max_depth(5).extract(&candidate);
    assert_eq!(as_value(found), Some(json!({"rooms": []})));
}

// The child fallback at the deepest level still sees one layer further, so
// the payload must sit two layers past the cap to be out of reach.
#[test]
fn payload_beyond_depth_cap_is_not_found() {
    let candidate = nest(7, json!({"rooms": []}));
    assert!(rooms().with_max_depth(5).extract(&candidate).is_none());
}

#[test]
fn deep_nesting_beyond_default_cap_terminates() {
    let candidate = nest(DEFAULT_MAX_DEPTH + 10, json!({"rooms": []}));
    assert!(rooms().extract(&candidate).is_none());
}

#[test]
fn depth_cap_only_prunes_the_deep_branch() {
    let candidate = json!({
        "result": nest(10, json!({"rooms": ["deep"]})),
        "content": [{"text": "{\"rooms\": [\"shallow\"]}"}]
    });
    assert_eq!(
        as_value(rooms().with_max_depth(3).extract(&candidate)),
        Some(json!({"rooms": ["shallow"]}))
    );
}
