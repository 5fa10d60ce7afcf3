use crate::error::PayloadError;
use serde::Deserialize;
use serde_json::Value;
use smol_str::SmolStr;

/// One quote update as published on the feed topic.
///
/// ### Raw Payload Example
/// ```json
/// [
///     {"key": "IDX-I-1", "ltp": 22419.95, "p_ch": 0.79},
///     {"key": "IDX-I-2", "ltp": 47580.3, "p_ch": -0.12, "vol": 0}
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedRecord {
    /// Feed identifier, eg/ "IDX-I-7"
    pub key: SmolStr,
    /// Last traded price
    pub ltp: f64,
    /// Percent change
    pub p_ch: f64,
}

/// Records of one accepted message, in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub records: Vec<FeedRecord>,
    /// Elements skipped for missing or non-numeric `key` / `ltp` / `p_ch`
    pub incomplete: usize,
}

/// Decode a raw feed message.
///
/// Only a top-level JSON array is accepted. Individual elements that do not carry all three
/// fields are counted and skipped without rejecting the rest of the batch; extra fields are
/// ignored.
pub fn parse_batch(payload: &[u8]) -> Result<ParsedBatch, PayloadError> {
    let text =
        std::str::from_utf8(payload).map_err(|error| PayloadError::Utf8(error.to_string()))?;

    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            return Err(PayloadError::NotArray {
                found: value_kind(&other),
            });
        }
        Err(error) => return Err(PayloadError::Json(error.to_string())),
    };

    let mut batch = ParsedBatch {
        records: Vec::with_capacity(items.len()),
        incomplete: 0,
    };

    for item in items {
        match serde_json::from_value::<FeedRecord>(item) {
            Ok(record) => batch.records.push(record),
            Err(_) => batch.incomplete += 1,
        }
    }

    Ok(batch)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
