//! The general type of a concrete JSON value.
//!
//! Used by the reducer to widen composite literals and by adapters to guess
//! a type from a documented example.
use serde_json::{Map, Value};

use crate::ir::{ObjectOfField, Type};

/// Structural type of `value`: primitives become their keyword type, arrays
/// the union of their element shapes, objects an `ObjectOf` whose fields are
/// optional where the sample holds `null`. `None` is `undefined`.
pub fn shape(value: Option<&Value>) -> Type {
    match value {
        None => Type::undefined(),
        Some(Value::Null) => Type::null(),
        Some(Value::Bool(_)) => Type::boolean(),
        Some(Value::Number(_)) => Type::number(),
        Some(Value::String(_)) => Type::string(),
        Some(Value::Array(elements)) => shape_array(elements),
        Some(Value::Object(entries)) => shape_object(entries),
    }
}

/// Type guessed from a single sample, e.g. a response example.
pub fn infer(value: &Value) -> Type {
    shape(Some(value)).reduce(false)
}

fn shape_array(elements: &[Value]) -> Type {
    Type::array(Type::union(elements.iter().map(|element| shape(Some(element)))))
}

fn shape_object(entries: &Map<String, Value>) -> Type {
    Type::object(
        entries
            .iter()
            .map(|(key, value)| ObjectOfField::new(key.clone(), shape(Some(value))).optional(value.is_null()))
            .collect(),
    )
}
