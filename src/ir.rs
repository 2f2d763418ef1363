//! Strongly-typed IR of API value shapes, independent of any schema dialect.
//!
//! Adapters build it, the reducer simplifies it and the emitter lowers it to
//! TypeScript syntax. Named shapes live in a [`TypeArena`]; a
//! [`TypeReference`] only carries the name, so self-referential schemas are
//! plain data.
pub mod arena;
mod declare;

use std::collections::HashSet;

use serde_json::Value;

pub use arena::TypeArena;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Any,
    Void,
    Literal(Literal),
    ArrayOf(Box<Type>),
    ObjectOf(ObjectOf),
    Or(Vec<Type>),
    And(Vec<Type>),
    TupleOf(Vec<Type>),
    EnumOf(EnumOf),
    TypeReference(TypeReference),
}

/// A JSON value standing for its own type (`constant`) or for its general
/// type (`"" -> string`).
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// `None` is `undefined`.
    pub value: Option<Value>,
    pub constant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectOf {
    /// Insertion order, keys unique.
    pub fields: Vec<ObjectOfField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Named(String),
    /// Index signature, `[key: string]`.
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectOfField {
    pub key: FieldKey,
    pub value: Type,
    pub optional: bool,
    pub doc: Option<String>,
    pub default_value: Option<Value>,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumOf {
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    /// A JSON string or number.
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    pub name: String,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTORS
// ————————————————————————————————————————————————————————————————————————————

impl Type {
    pub fn string() -> Self {
        Type::Literal(Literal::general(Value::String(String::new())))
    }
    pub fn number() -> Self {
        Type::Literal(Literal::general(Value::from(1)))
    }
    pub fn boolean() -> Self {
        Type::Literal(Literal::general(Value::Bool(true)))
    }
    pub fn null() -> Self {
        Type::Literal(Literal::general(Value::Null))
    }
    pub fn undefined() -> Self {
        Type::Literal(Literal { value: None, constant: false })
    }
    /// The exact value as a type, e.g. `"available"` or `200`.
    pub fn constant(value: impl Into<Value>) -> Self {
        Type::Literal(Literal { value: Some(value.into()), constant: true })
    }
    pub fn array(element: Type) -> Self {
        Type::ArrayOf(Box::new(element))
    }
    pub fn object(fields: Vec<ObjectOfField>) -> Self {
        let mut object = ObjectOf::default();
        for field in fields {
            object.insert(field);
        }
        Type::ObjectOf(object)
    }
    pub fn reference(name: impl Into<String>) -> Self {
        Type::TypeReference(TypeReference { name: name.into() })
    }
    /// `Or` with duplicate base types and falsy keywords already dropped.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        Type::Or(crate::reduce::remove_duplicate_base_type(members.into_iter().collect()))
    }
    /// `And` with duplicate base types and falsy keywords already dropped.
    pub fn intersection(members: impl IntoIterator<Item = Type>) -> Self {
        Type::And(crate::reduce::remove_duplicate_base_type(members.into_iter().collect()))
    }
}

impl Literal {
    pub fn general(value: Value) -> Self {
        Literal { value: Some(value), constant: false }
    }

    pub fn kind(&self) -> LiteralKind {
        match &self.value {
            None => LiteralKind::Undefined,
            Some(Value::Null) => LiteralKind::Null,
            Some(Value::Bool(_)) => LiteralKind::Boolean,
            Some(Value::Number(_)) => LiteralKind::Number,
            Some(Value::String(_)) => LiteralKind::String,
            Some(Value::Array(_)) => LiteralKind::Array,
            Some(Value::Object(_)) => LiteralKind::Object,
        }
    }

    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self.kind(), LiteralKind::Null | LiteralKind::Undefined)
    }
}

impl ObjectOf {
    /// Adds a field, replacing an existing one with the same key in place.
    pub fn insert(&mut self, field: ObjectOfField) {
        match self.fields.iter_mut().find(|existing| existing.key == field.key) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ObjectOfField> {
        self.fields.iter().find(|field| matches!(&field.key, FieldKey::Named(name) if name == key))
    }
}

impl ObjectOfField {
    pub fn new(key: impl Into<String>, value: Type) -> Self {
        ObjectOfField {
            key: FieldKey::Named(key.into()),
            value,
            optional: false,
            doc: None,
            default_value: None,
            readonly: false,
        }
    }
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FALSINESS
// ————————————————————————————————————————————————————————————————————————————

impl Type {
    /// True when the type carries no useful information and can be omitted:
    /// `any`, `void`, `null`, `undefined`, `{}` and references to those.
    pub fn is_falsy(&self, arena: &TypeArena) -> bool {
        self.is_falsy_in(arena, &mut HashSet::new())
    }

    fn is_falsy_in<'a>(&'a self, arena: &'a TypeArena, visiting: &mut HashSet<&'a str>) -> bool {
        match self {
            Type::Any | Type::Void => true,
            Type::Literal(literal) => literal.is_null_or_undefined(),
            Type::ObjectOf(object) => object.fields.is_empty(),
            Type::TypeReference(reference) => {
                // an alias cycle names nothing
                if !visiting.insert(reference.name.as_str()) {
                    return true
                }
                match arena.get(&reference.name) {
                    Some(target) => target.is_falsy_in(arena, visiting),
                    None => true,
                }
            }
            Type::ArrayOf(_) | Type::Or(_) | Type::And(_) | Type::TupleOf(_) | Type::EnumOf(_) => false,
        }
    }
}
