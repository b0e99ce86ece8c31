//! Turning arbitrary candidate values into key/value records.

use std::borrow::Cow;

use serde_json::{Map, Value};

/// A string-keyed JSON object produced by [`coerce_record`].
pub type Record = Map<String, Value>;

/// Interpret `value` as a JSON object.
///
/// Objects are borrowed as-is. Strings are parsed as JSON and accepted only
/// when they decode to an object. Everything else, including parse failures,
/// yields `None`.
#[must_use]
pub fn coerce_record(value: &Value) -> Option<Cow<'_, Record>> {
    match value {
        Value::Object(map) => Some(Cow::Borrowed(map)),
        Value::String(text) => parse_record(text).map(Cow::Owned),
        _ => None,
    }
}

/// Parse `text` as JSON and keep it only if it is an object.
#[must_use]
pub fn parse_record(text: &str) -> Option<Record> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn object_is_borrowed_unchanged() {
        let value = json!({"rooms": [1, 2]});
        let record = coerce_record(&value).unwrap();
        assert!(matches!(record, Cow::Borrowed(_)));
        assert_eq!(Value::Object(record.into_owned()), value);
    }

    #[test]
    fn json_object_string_is_parsed() {
        let value = Value::String(r#"{"count": 2}"#.to_string());
        let record = coerce_record(&value).unwrap();
        assert_eq!(record.get("count"), Some(&json!(2)));
    }

    #[test]
    fn json_array_string_is_not_coercible() {
        let value = Value::String("[1, 2, 3]".to_string());
        assert!(coerce_record(&value).is_none());
    }

    #[test]
    fn malformed_json_string_is_not_coercible() {
        let value = Value::String("{not json".to_string());
        assert!(coerce_record(&value).is_none());
    }

    #[test]
    fn json_scalar_string_is_not_coercible() {
        assert!(coerce_record(&Value::String("42".to_string())).is_none());
        assert!(coerce_record(&Value::String("\"text\"".to_string())).is_none());
    }

    #[test]
    fn primitives_and_arrays_are_not_coercible() {
        for value in [json!(null), json!(true), json!(3.5), json!([{"rooms": []}])] {
            assert!(coerce_record(&value).is_none(), "coerced {value}");
        }
    }
}
