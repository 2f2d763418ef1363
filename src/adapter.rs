//! Schema dialect adapters.
//!
//! An adapter sniffs a parsed document and, when it matches, translates it
//! into a [`RestApi`]. The [`Registry`] tries adapters in registration order.
pub mod deref;
pub mod json_schema;
pub mod openapi2;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::rest::RestApi;

pub use openapi2::OpenApi2;

pub trait SpecificationAdapter: Send + Sync {
    fn name(&self) -> &'static str;
    /// Cheap structural sniff; never fails.
    fn is_match(&self, document: &Value) -> bool;
    /// Pure translation of a matching document.
    fn transform(&self, document: &Value) -> Result<RestApi>;
}

pub struct Registry {
    adapters: Vec<Box<dyn SpecificationAdapter>>,
}

impl Registry {
    pub fn empty() -> Self {
        Registry { adapters: Vec::new() }
    }

    pub fn register(&mut self, adapter: impl SpecificationAdapter + 'static) -> &mut Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// First registered adapter whose sniff accepts `document`.
    pub fn select(&self, document: &Value) -> Result<&dyn SpecificationAdapter> {
        self.adapters
            .iter()
            .map(|adapter| adapter.as_ref())
            .find(|adapter| adapter.is_match(document))
            .ok_or(Error::UnknownDialect)
    }

    pub fn transform(&self, document: &Value) -> Result<RestApi> {
        let adapter = self.select(document)?;
        log::info!("reading the document as {}", adapter.name());
        adapter.transform(document)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry.register(OpenApi2);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(&'static str);

    impl SpecificationAdapter for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        fn is_match(&self, document: &Value) -> bool {
            document.get("kind").and_then(Value::as_str) == Some("fixed")
        }
        fn transform(&self, _: &Value) -> Result<RestApi> {
            Ok(RestApi { base_url: self.0.to_owned(), ..RestApi::default() })
        }
    }

    #[test]
    fn first_matching_adapter_wins() {
        let mut registry = Registry::empty();
        registry.register(Fixed("first")).register(Fixed("second"));
        let api = registry.transform(&json!({"kind": "fixed"})).unwrap();
        assert_eq!(api.base_url, "first");
    }

    #[test]
    fn no_match_is_an_error() {
        let registry = Registry::default();
        assert!(matches!(registry.transform(&json!({"openapi": "3.0.0"})), Err(Error::UnknownDialect)));
        assert!(matches!(Registry::empty().select(&json!({})), Err(Error::UnknownDialect)));
    }

    #[test]
    fn default_registry_knows_swagger() {
        let registry = Registry::default();
        assert_eq!(registry.select(&json!({"swagger": "2.0"})).unwrap().name(), "OpenAPI 2.0");
    }
}
