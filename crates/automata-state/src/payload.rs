//! Tagged payload values and the text codec used for the `eval_result` column.
//!
//! Every value carries its own variant tag when encoded, so decoding never
//! has to guess whether a string was once a nested map:
//!
//! ```text
//! {"type":"map","value":{"success":{"type":"bool","value":true}}}
//! ```
//!
//! Map keys are plain strings. A map can never be used as a key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Ordered string-keyed map of payload values.
pub type PayloadMap = BTreeMap<String, Payload>;

/// A self-describing nested value: scalar, ordered list, or string-keyed map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Payload>),
    Map(PayloadMap),
}

impl Payload {
    /// Variant name as it appears in the encoded `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Null => "null",
            Payload::Bool(_) => "bool",
            Payload::Int(_) => "int",
            Payload::Float(_) => "float",
            Payload::Text(_) => "text",
            Payload::List(_) => "list",
            Payload::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Payload]> {
        match self {
            Payload::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PayloadMap> {
        match self {
            Payload::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert into a plain JSON value, dropping the variant tags.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Payload::Null => Value::Null,
            Payload::Bool(b) => Value::Bool(*b),
            Payload::Int(i) => Value::from(*i),
            Payload::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Payload::Text(s) => Value::String(s.clone()),
            Payload::List(items) => Value::Array(items.iter().map(Payload::to_json).collect()),
            Payload::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Payload::Int(i),
                None => n.as_f64().map_or(Payload::Null, Payload::Float),
            },
            Value::String(s) => Payload::Text(s),
            Value::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => {
                Payload::Map(map.into_iter().map(|(k, v)| (k, Payload::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<i64> for Payload {
    fn from(i: i64) -> Self {
        Payload::Int(i)
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(items: Vec<Payload>) -> Self {
        Payload::List(items)
    }
}

impl From<PayloadMap> for Payload {
    fn from(map: PayloadMap) -> Self {
        Payload::Map(map)
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Borrowing mirror of `Payload::Map` so encoding does not clone the input.
#[derive(Serialize)]
struct MapEnvelope<'a> {
    #[serde(rename = "type")]
    tag: &'static str,
    value: &'a PayloadMap,
}

/// Encode a payload map into a single text blob.
///
/// The input is only borrowed. Fails if any float is NaN or infinite.
pub fn encode(map: &PayloadMap) -> Result<String, CodecError> {
    for (key, value) in map {
        check_finite(value, key)?;
    }
    let envelope = MapEnvelope { tag: "map", value: map };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode text produced by [`encode`] back into a payload map.
pub fn decode(text: &str) -> Result<PayloadMap, CodecError> {
    match serde_json::from_str::<Payload>(text)? {
        Payload::Map(map) => Ok(map),
        other => Err(CodecError::NotAMap {
            found: other.type_name(),
        }),
    }
}

fn check_finite(value: &Payload, path: &str) -> Result<(), CodecError> {
    match value {
        Payload::Float(f) if !f.is_finite() => Err(CodecError::NonFiniteFloat {
            path: path.to_string(),
        }),
        Payload::List(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_finite(item, &format!("{path}[{i}]"))),
        Payload::Map(map) => map
            .iter()
            .try_for_each(|(k, v)| check_finite(v, &format!("{path}.{k}"))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PayloadMap {
        let mut inner = PayloadMap::new();
        inner.insert("name".to_string(), Payload::from("search"));
        inner.insert(
            "arguments".to_string(),
            Payload::from(json!({"query": "rust", "limit": 5, "ratio": 0.25})),
        );

        let mut map = PayloadMap::new();
        map.insert("success".to_string(), Payload::Bool(false));
        map.insert("kind".to_string(), Payload::from("function_call"));
        map.insert(
            "matched".to_string(),
            Payload::List(vec![Payload::Map(inner.clone()), Payload::from("plain")]),
        );
        map.insert("nested".to_string(), Payload::Map(inner));
        map.insert("nothing".to_string(), Payload::Null);
        map
    }

    #[test]
    fn test_decode_inverts_encode_for_nested_maps() {
        let map = sample();
        let text = encode(&map).expect("encode");
        let decoded = decode(&text).expect("decode");
        assert_eq!(decoded, map);
    }

    #[test]
    fn test_encode_does_not_touch_input() {
        let map = sample();
        let before = map.clone();
        encode(&map).expect("encode");
        assert_eq!(map, before);
    }

    #[test]
    fn test_json_looking_text_stays_text() {
        let mut map = PayloadMap::new();
        map.insert(
            "output".to_string(),
            Payload::from(r#"{"looks": "like a map"}"#),
        );
        let decoded = decode(&encode(&map).expect("encode")).expect("decode");
        assert_eq!(
            decoded["output"],
            Payload::Text(r#"{"looks": "like a map"}"#.to_string())
        );
    }

    #[test]
    fn test_decode_rejects_non_map_top_level() {
        let err = decode(r#"{"type":"list","value":[]}"#).unwrap_err();
        assert!(matches!(err, CodecError::NotAMap { found: "list" }));
    }

    #[test]
    fn test_decode_rejects_untagged_json() {
        let err = decode(r#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn test_encode_rejects_nan() {
        let mut map = PayloadMap::new();
        map.insert(
            "scores".to_string(),
            Payload::List(vec![Payload::Float(1.0), Payload::Float(f64::NAN)]),
        );
        let err = encode(&map).unwrap_err();
        match err {
            CodecError::NonFiniteFloat { path } => assert_eq!(path, "scores[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_int_and_float_keep_their_variant() {
        let mut map = PayloadMap::new();
        map.insert("count".to_string(), Payload::Int(3));
        map.insert("rate".to_string(), Payload::Float(3.0));
        let decoded = decode(&encode(&map).expect("encode")).expect("decode");
        assert_eq!(decoded["count"], Payload::Int(3));
        assert_eq!(decoded["rate"], Payload::Float(3.0));
    }

    #[test]
    fn test_json_conversion_round_trip() {
        let value = json!({"a": [1, "two", {"three": null}], "b": true});
        let payload = Payload::from(value.clone());
        assert_eq!(payload.to_json(), value);
    }
}
