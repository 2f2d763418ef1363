use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Deserialize a typed view of part of a document, with the JSON path of
/// the first mismatch in the error. `at` is the pointer of `value` inside
/// the whole document.
pub fn from_value_with_path<T: DeserializeOwned>(value: &Value, at: &str) -> Result<T> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = pointer_path(at, &err.path().to_string());
            Err(Error::InvalidDocument { path, message: err.into_inner().to_string() })
        }
    }
}

/// `responses.200.description` under `at`, as a JSON pointer.
fn pointer_path(at: &str, dotted: &str) -> String {
    let mut path = at.to_owned();
    for segment in dotted.split('.').filter(|segment| !segment.is_empty()) {
        path.push('/');
        path.push_str(segment);
    }
    path
}
