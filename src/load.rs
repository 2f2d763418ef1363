//! Reading schema and template locations, and parsing schema text.
use std::io::Read;
use std::time::Duration;

use serde_json::Value;

use crate::error::{Error, Result};

/// Location meaning standard input.
pub const STDIN: &str = "-";

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Reads a file path, an `http(s)` URL or `-` (stdin) to text.
pub fn read_location(location: &str) -> Result<String> {
    if is_url(location) {
        return fetch(location)
    }
    let io_error = |source| Error::Io { location: location.to_owned(), source };
    if location == STDIN {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(io_error)?;
        return Ok(text)
    }
    std::fs::read_to_string(location).map_err(io_error)
}

fn fetch(url: &str) -> Result<String> {
    log::info!("fetching {url}");
    let fetch_error = |message: String| Error::Fetch { location: url.to_owned(), message };
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|err| fetch_error(err.to_string()))?;
    let response = client.get(url).send().map_err(|err| fetch_error(err.to_string()))?;
    if !response.status().is_success() {
        return Err(fetch_error(format!("server answered {}", response.status())))
    }
    response.text().map_err(|err| fetch_error(err.to_string()))
}

/// JSON first, then YAML. Both parser messages are kept when neither works.
pub fn parse_json_or_yaml(text: &str) -> Result<Value> {
    let json = match serde_json::from_str::<Value>(text) {
        Ok(document) => return Ok(document),
        Err(err) => err.to_string(),
    };
    match serde_yaml::from_str::<Value>(text) {
        Ok(document) => Ok(document),
        Err(err) => Err(Error::Unparsable { json, yaml: err.to_string() }),
    }
}
