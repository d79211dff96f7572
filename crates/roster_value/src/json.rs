//! Conversion between [`Value`] and `serde_json::Value`.
//!
//! Raw inputs usually arrive as JSON. Numbers must be integers that fit in
//! an `i64`; floats are rejected rather than silently truncated.

use crate::attributes::Attributes;
use crate::error::{ValueError, ValueResult};
use crate::value::Value;
use serde_json::{Map, Number};

impl TryFrom<serde_json::Value> for Value {
    type Error = ValueError;

    fn try_from(json: serde_json::Value) -> ValueResult<Self> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number_to_value(&n)?,
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<ValueResult<_>>()?,
            ),
            serde_json::Value::Object(map) => Value::Map(Attributes::try_from(map)?),
        })
    }
}

impl TryFrom<Map<String, serde_json::Value>> for Attributes {
    type Error = ValueError;

    fn try_from(map: Map<String, serde_json::Value>) -> ValueResult<Self> {
        let mut attributes = Attributes::new();
        for (key, value) in map {
            attributes.insert(key, Value::try_from(value)?);
        }
        Ok(attributes)
    }
}

fn number_to_value(n: &Number) -> ValueResult<Value> {
    if let Some(i) = n.as_i64() {
        Ok(Value::Integer(i))
    } else if n.is_u64() {
        Err(ValueError::integer_overflow(n.to_string()))
    } else {
        Err(ValueError::FloatForbidden)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::Number((*n).into()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => serde_json::Value::Array(
                bytes
                    .iter()
                    .map(|b| serde_json::Value::Number((*b).into()))
                    .collect(),
            ),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(m) => serde_json::Value::from(m),
        }
    }
}

impl From<&Attributes> for serde_json::Value {
    fn from(attributes: &Attributes) -> Self {
        serde_json::Value::Object(
            attributes
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                .collect(),
        )
    }
}
