//! Bulk `$ref` resolution, run to completion before any translation.
//!
//! References into `#/definitions/` are kept in place (they become named
//! types) but must point at something. Every other local reference is
//! inlined. Remote references are not fetched.
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

pub fn dereference(document: &Value) -> Result<Value> {
    let mut stack = Vec::new();
    inline(document, document, &mut stack)
}

/// Looks up a local `#/...` pointer.
pub fn resolve<'a>(document: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        return Some(document)
    }
    document.pointer(pointer)
}

fn inline(document: &Value, value: &Value, stack: &mut Vec<String>) -> Result<Value> {
    match value {
        Value::Object(entries) => match entries.get("$ref").and_then(Value::as_str) {
            Some(reference) => inline_reference(document, value, reference, stack),
            None => {
                let mut out = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    out.insert(key.clone(), inline(document, child, stack)?);
                }
                Ok(Value::Object(out))
            }
        },
        Value::Array(items) => items.iter().map(|item| inline(document, item, stack)).collect::<Result<_>>().map(Value::Array),
        scalar => Ok(scalar.clone()),
    }
}

fn inline_reference(document: &Value, node: &Value, reference: &str, stack: &mut Vec<String>) -> Result<Value> {
    let target = resolve(document, reference).ok_or_else(|| Error::UnresolvableReference(reference.to_owned()))?;
    if reference.starts_with(DEFINITIONS_PREFIX) {
        return Ok(node.clone())
    }
    if stack.iter().any(|seen| seen == reference) {
        return Err(Error::CircularReference(reference.to_owned()))
    }
    stack.push(reference.to_owned());
    let inlined = inline(document, target, stack);
    stack.pop();
    inlined
}
