//! Generates a typed TypeScript client module from an OpenAPI 2.0 (Swagger)
//! document.
//!
//! The pipeline is `load` (text) → `adapter` ([`rest::RestApi`] over the
//! [`ir::Type`] IR) → `reduce` → `emit` ([`syntax`] trees, printed) →
//! `template` variable injection. [`api`] wires the stages together.
pub mod adapter;
pub mod api;
pub mod emit;
pub mod error;
pub mod ir;
pub mod load;
pub mod path_de;
pub mod reduce;
pub mod rest;
pub mod shape;
pub mod syntax;
pub mod template;

pub use error::{Error, Result};
