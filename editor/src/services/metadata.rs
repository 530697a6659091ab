//! Metadata comparison
//!
//! Metadata travels as JSON text on both sides. Equality is structural, so
//! key order and whitespace never count as a change, and numbers compare by
//! value (`2` equals `2.0`).
//!
//! Unparsable text on either side is treated as equal to the other side.
//! This hides genuinely malformed metadata as "no change"; it is kept on
//! purpose and every occurrence is logged at warn.

use serde_json::{Map, Value};
use tracing::warn;

/// Metadata to send back to the registry for a device
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedMetadata {
    /// Structured value, serialized on the way out
    Structured(Value),
    /// Remote text that could not be parsed, passed through untouched
    Verbatim(String),
}

impl ResolvedMetadata {
    /// Value for the payload `metadata` field, `None` when there is nothing to store
    pub fn to_payload(&self) -> Option<String> {
        match self {
            ResolvedMetadata::Structured(value) if is_empty(value) => None,
            ResolvedMetadata::Structured(value) => Some(value.to_string()),
            ResolvedMetadata::Verbatim(raw) => Some(raw.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataComparison {
    pub changed: bool,
    pub resolved: ResolvedMetadata,
}

/// Compare remote metadata text with the CSV cell for device `id`
///
/// - remote null/empty reads as `{}`
/// - an empty CSV cell keeps the remote metadata
/// - unparsable text on either side means no change
pub fn compare_metadata(id: i64, remote: Option<&str>, local: Option<&str>) -> MetadataComparison {
    let remote_value = match remote.filter(|r| !r.trim().is_empty()) {
        None => Ok(empty_object()),
        Some(raw) => serde_json::from_str::<Value>(raw).map_err(|e| (raw, e)),
    };

    let remote_value = match remote_value {
        Ok(value) => value,
        Err((raw, e)) => {
            warn!("Device {}: remote metadata is not valid JSON ({}), assuming no metadata change", id, e);
            return unchanged(ResolvedMetadata::Verbatim(raw.to_string()));
        }
    };

    let Some(local_raw) = local.filter(|l| !l.trim().is_empty()) else {
        return unchanged(ResolvedMetadata::Structured(remote_value));
    };

    match serde_json::from_str::<Value>(local_raw) {
        Ok(local_value) => MetadataComparison {
            changed: !same_value(&local_value, &remote_value),
            resolved: ResolvedMetadata::Structured(local_value),
        },
        Err(e) => {
            warn!("Device {}: CSV metadata is not valid JSON ({}), assuming no metadata change", id, e);
            unchanged(ResolvedMetadata::Structured(remote_value))
        }
    }
}

/// Structural equality with numbers compared by value
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len() && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

fn unchanged(resolved: ResolvedMetadata) -> MetadataComparison {
    MetadataComparison { changed: false, resolved }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// null, `{}`, `[]` and `""` carry no metadata
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
