//! Conversion between plain JSON and Firestore's typed REST values.
//!
//! Integers travel as `integerValue` strings, every other number as
//! `doubleValue`. Strings are never reinterpreted on the way in; timestamps
//! coming back are normalized to RFC 3339 in UTC.

use crate::error::{CatalogError, Result};
use crate::store::Fields;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Number, Value};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

pub fn decode_value(value: &Value) -> Result<Value> {
    let typed = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .map(|(kind, raw)| (kind.as_str(), raw))
        .ok_or_else(|| unexpected(value))?;

    match typed {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", raw) => decode_integer(raw),
        ("doubleValue", raw) => Ok(decode_double(raw)),
        ("stringValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("timestampValue", Value::String(s)) => Ok(Value::String(normalize_timestamp(s))),
        ("referenceValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("bytesValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("geoPointValue", Value::Object(point)) => Ok(json!({
            "latitude": point.get("latitude").cloned().unwrap_or(json!(0.0)),
            "longitude": point.get("longitude").cloned().unwrap_or(json!(0.0)),
        })),
        ("arrayValue", Value::Object(array)) => {
            let values = match array.get("values") {
                Some(Value::Array(values)) => values,
                Some(other) => return Err(unexpected(other)),
                None => return Ok(Value::Array(Vec::new())),
            };
            values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        ("mapValue", Value::Object(map)) => match map.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            Some(other) => Err(unexpected(other)),
            None => Ok(Value::Object(Map::new())),
        },
        _ => Err(unexpected(value)),
    }
}

fn decode_integer(raw: &Value) -> Result<Value> {
    let parsed = match raw {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed
        .map(|i| Value::Number(i.into()))
        .ok_or_else(|| unexpected(raw))
}

// Non-finite doubles arrive as "NaN" / "Infinity" and have no JSON number form.
fn decode_double(raw: &Value) -> Value {
    match raw {
        Value::Number(_) => raw.clone(),
        Value::String(s) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(s.clone())),
        _ => Value::Null,
    }
}

fn normalize_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Err(_) => raw.to_string(),
    }
}

fn unexpected(value: &Value) -> CatalogError {
    CatalogError::UnexpectedResponse(format!("unsupported field value {}", value))
}
