//! JSON conversion for shale documents.
//!
//! # Mapping
//!
//! | shale    | JSON                                     |
//! |----------|------------------------------------------|
//! | `null`   | null                                     |
//! | `bool`   | true/false                               |
//! | `int`    | integer                                  |
//! | `float`  | other number                             |
//! | `binary` | string with `b64:` prefix (valid base64) |
//! | `string` | other string                             |
//! | `array`  | array                                    |
//! | `dict`   | object                                   |
//!
//! ```
//! use shale::json::{from_json, to_json};
//!
//! let doc = from_json(r#"{"name": "alice", "age": 30}"#).unwrap();
//! let json = to_json(&doc).unwrap();
//! assert_eq!(json, r#"{"age":30,"name":"alice"}"#);
//! ```

use base64::Engine;
use serde_json::Value as JsonValue;

use crate::document::Document;
use crate::encode;
use crate::error::{Error, Result};
use crate::item::Item;
use crate::mutable::{MutableArray, MutableDict};
use crate::value::{TypedValue, Value};

/// Parse a JSON string and encode it as a shale document.
///
/// # Errors
///
/// Returns `Error::JsonParse` if the JSON is invalid.
pub fn from_json(json: &str) -> Result<Document<'static>> {
    let parsed: JsonValue =
        serde_json::from_str(json).map_err(|e| Error::JsonParse(e.to_string()))?;
    let item = json_to_item(&parsed);
    Document::new(encode::encode(&item)?)
}

fn json_to_item(value: &JsonValue) -> Item<'static> {
    match value {
        JsonValue::Null => Item::Null,

        JsonValue::Bool(b) => Item::Bool(*b),

        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Item::Int(i)
            } else if let Some(f) = n.as_f64() {
                Item::Float(f)
            } else {
                Item::Float(0.0)
            }
        }

        JsonValue::String(s) => {
            if let Some(b64_payload) = s.strip_prefix("b64:")
                && let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(b64_payload)
            {
                return Item::Bytes(bytes);
            }
            Item::Str(s.clone())
        }

        JsonValue::Array(items) => {
            Item::Array(items.iter().map(json_to_item).collect::<MutableArray>())
        }

        JsonValue::Object(obj) => {
            let mut dict = MutableDict::new();
            for (key, value) in obj {
                dict.set(key.clone(), json_to_item(value));
            }
            Item::Dict(dict)
        }
    }
}

/// Convert a shale document to a JSON string.
///
/// # Errors
///
/// Returns `Error::NonFiniteFloat` if a float value is NaN or Infinity and
/// `Error::JsonSerialize` if JSON serialization fails.
pub fn to_json(doc: &Document) -> Result<String> {
    let json_value = value_to_json(doc.root())?;
    serde_json::to_string(&json_value).map_err(|e| Error::JsonSerialize(e.to_string()))
}

fn value_to_json(value: Value) -> Result<JsonValue> {
    match value.typed()? {
        TypedValue::Null => Ok(JsonValue::Null),

        TypedValue::Bool(b) => Ok(JsonValue::Bool(b)),

        TypedValue::Int(n) => Ok(JsonValue::Number(n.into())),

        TypedValue::Float(f) => {
            let num = serde_json::Number::from_f64(f).ok_or(Error::NonFiniteFloat(f))?;
            Ok(JsonValue::Number(num))
        }

        TypedValue::Str(s) => Ok(JsonValue::String(s.to_string())),

        TypedValue::Bytes(bytes) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            Ok(JsonValue::String(format!("b64:{encoded}")))
        }

        TypedValue::Array(array) => {
            let mut items = Vec::with_capacity(array.len());
            for child in array.iter() {
                items.push(value_to_json(child?)?);
            }
            Ok(JsonValue::Array(items))
        }

        TypedValue::Dict(dict) => {
            let mut obj = serde_json::Map::new();
            for entry in dict.iter() {
                let (key, child) = entry?;
                obj.insert(key.to_string(), value_to_json(child)?);
            }
            Ok(JsonValue::Object(obj))
        }
    }
}
