//! `serde_json::Value` into the value model.

use super::{Record, Sequence, Value};

/// Type name given to records built from JSON objects
pub const JSON_OBJECT_TYPE: &str = "JsonObject";

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Integer(i128::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(Sequence::list(items.into_iter().map(Value::from)))
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter()
                    .fold(Record::new(JSON_OBJECT_TYPE), |record, (name, value)| {
                        record.with(name, Value::from(value))
                    }),
            ),
        }
    }
}
