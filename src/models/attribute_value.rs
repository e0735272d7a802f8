//! Tagged scalar encoding used by change-log images (`{"S": "..."}`, `{"N": "..."}`, ...).

use super::RecordError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One attribute in the change-log's tagged encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(BTreeMap<String, AttributeValue>),
    L(Vec<AttributeValue>),
    SS(Vec<String>),
    NS(Vec<String>),
}

/// A change-log image in tagged encoding
pub type TaggedImage = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    /// Convert to a native JSON value
    pub fn to_json(&self) -> Result<Value, RecordError> {
        Ok(match self {
            Self::S(s) => Value::String(s.clone()),
            Self::N(n) => Value::Number(parse_number(n)?),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null(_) => Value::Null,
            Self::M(map) => Value::Object(unmarshal_image(map)?),
            Self::L(items) => Value::Array(
                items
                    .iter()
                    .map(AttributeValue::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Self::SS(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::NS(items) => Value::Array(
                items
                    .iter()
                    .map(|n| parse_number(n).map(Value::Number))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        })
    }

    /// Encode a native JSON value; numbers become `N`, objects `M`, arrays `L`
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null(true),
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::N(n.to_string()),
            Value::String(s) => Self::S(s.clone()),
            Value::Array(items) => Self::L(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn parse_number(raw: &str) -> Result<serde_json::Number, RecordError> {
    serde_json::from_str::<serde_json::Number>(raw.trim())
        .map_err(|_| RecordError::invalid_attribute(format!("'{raw}' is not a number")))
}

/// Decode a tagged image into a native JSON object
pub fn unmarshal_image(image: &TaggedImage) -> Result<Map<String, Value>, RecordError> {
    image
        .iter()
        .map(|(key, value)| Ok((key.clone(), value.to_json()?)))
        .collect()
}

/// Encode a native JSON object into a tagged image
pub fn marshal_image(object: &Map<String, Value>) -> TaggedImage {
    object
        .iter()
        .map(|(key, value)| (key.clone(), AttributeValue::from_json(value)))
        .collect()
}
