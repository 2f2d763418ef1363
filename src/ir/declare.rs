//! Lowering of IR nodes to TypeScript type syntax and declarations.
use std::collections::HashSet;

use serde_json::Value;

use super::{EnumOf, FieldKey, Literal, ObjectOf, ObjectOfField, Type, TypeArena, TypeReference};
use crate::error::{Error, Result};
use crate::syntax::{Declaration, EnumMemberDecl, Keyword, PropertyName, PropertySignature, TypeNode};

impl Type {
    /// The TypeScript type node for this shape. Side-effect free; the only
    /// failure is an object property without a name.
    pub fn to_syntax(&self, arena: &TypeArena) -> Result<TypeNode> {
        let node = match self {
            Type::Any => TypeNode::any(),
            Type::Void => TypeNode::void(),
            Type::Literal(literal) => literal.to_syntax(arena)?,
            Type::ArrayOf(element) => TypeNode::Array(Box::new(element.to_syntax(arena)?)),
            Type::ObjectOf(object) => TypeNode::TypeLiteral(object.members(arena)?),
            Type::Or(members) => match members.as_slice() {
                [] => TypeNode::any(),
                [only] => only.to_syntax(arena)?,
                _ => TypeNode::Union(syntax_of_all(members, arena)?),
            },
            Type::And(members) => match members.as_slice() {
                [] => TypeNode::any(),
                [only] => only.to_syntax(arena)?,
                _ => TypeNode::Intersection(syntax_of_all(members, arena)?),
            },
            Type::TupleOf(members) => TypeNode::Tuple(syntax_of_all(members, arena)?),
            Type::EnumOf(enumeration) => TypeNode::reference(&enumeration.name),
            Type::TypeReference(reference) => reference_syntax(self, reference, arena)?,
        };
        Ok(node)
    }

    /// Declarations needed before this type can be referenced, dependencies
    /// first. May contain duplicates across calls; the emitter keeps the
    /// first of each name.
    pub fn declarations(&self, arena: &TypeArena) -> Result<Vec<Declaration>> {
        let mut walk = DeclarationWalk { arena, visited: HashSet::new(), out: Vec::new() };
        walk.visit(self)?;
        Ok(walk.out)
    }
}

impl Literal {
    fn to_syntax(&self, arena: &TypeArena) -> Result<TypeNode> {
        let node = match (&self.value, self.constant) {
            (None, _) => TypeNode::Keyword(Keyword::Undefined),
            (Some(Value::Null), _) => TypeNode::Keyword(Keyword::Null),
            (Some(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_))), true) => {
                TypeNode::Literal(value.clone())
            }
            (Some(Value::Bool(_)), false) => TypeNode::Keyword(Keyword::Boolean),
            (Some(Value::Number(_)), false) => TypeNode::Keyword(Keyword::Number),
            (Some(Value::String(_)), false) => TypeNode::Keyword(Keyword::String),
            (Some(composite), _) => crate::shape::shape(Some(composite)).to_syntax(arena)?,
        };
        Ok(node)
    }
}

impl ObjectOf {
    pub(crate) fn members(&self, arena: &TypeArena) -> Result<Vec<PropertySignature>> {
        self.fields.iter().map(|field| field.signature(arena)).collect()
    }
}

impl ObjectOfField {
    fn signature(&self, arena: &TypeArena) -> Result<PropertySignature> {
        let name = match &self.key {
            FieldKey::Named(name) if name.is_empty() => return Err(Error::EmptyPropertyKey),
            FieldKey::Named(name) => PropertyName::Named(name.clone()),
            FieldKey::Wildcard => PropertyName::Index,
        };
        Ok(PropertySignature {
            name,
            optional: self.optional,
            readonly: self.readonly,
            ty: self.value.to_syntax(arena)?,
            doc: self.doc_comment(),
        })
    }

    fn doc_comment(&self) -> Option<String> {
        let default = self.default_value.as_ref().map(|value| format!("@default {value}"));
        match (self.doc.as_deref().map(str::trim).filter(|doc| !doc.is_empty()), default) {
            (Some(doc), Some(default)) => Some(format!("{doc}\n{default}")),
            (Some(doc), None) => Some(doc.to_owned()),
            (None, default) => default,
        }
    }
}

impl EnumOf {
    pub fn declaration(&self) -> Declaration {
        Declaration::Enum {
            name: self.name.clone(),
            members: self
                .members
                .iter()
                .map(|member| EnumMemberDecl { name: member.name.clone(), value: member.value.clone() })
                .collect(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn syntax_of_all(members: &[Type], arena: &TypeArena) -> Result<Vec<TypeNode>> {
    members.iter().map(|member| member.to_syntax(arena)).collect()
}

/// A reference to nothing renders as what its target degrades to.
fn reference_syntax(ty: &Type, reference: &TypeReference, arena: &TypeArena) -> Result<TypeNode> {
    if !ty.is_falsy(arena) {
        return Ok(TypeNode::reference(&reference.name))
    }
    let node = match arena.resolve(&reference.name) {
        Some(Type::ObjectOf(_) | Type::Void) => TypeNode::void(),
        Some(Type::Literal(literal)) => literal.to_syntax(arena)?,
        _ => TypeNode::any(),
    };
    Ok(node)
}

struct DeclarationWalk<'a> {
    arena: &'a TypeArena,
    /// Names being emitted or already emitted by this walk.
    visited: HashSet<String>,
    out: Vec<Declaration>,
}

impl<'a> DeclarationWalk<'a> {
    fn visit(&mut self, ty: &Type) -> Result<()> {
        match ty {
            Type::Any | Type::Void | Type::Literal(_) => Ok(()),
            Type::ArrayOf(element) => self.visit(element),
            Type::ObjectOf(object) => {
                for field in &object.fields {
                    self.visit(&field.value)?;
                }
                Ok(())
            }
            Type::Or(members) | Type::And(members) | Type::TupleOf(members) => {
                for member in members {
                    self.visit(member)?;
                }
                Ok(())
            }
            Type::EnumOf(enumeration) => {
                self.out.push(enumeration.declaration());
                Ok(())
            }
            Type::TypeReference(reference) => self.reference(ty, reference),
        }
    }

    fn reference(&mut self, ty: &Type, reference: &TypeReference) -> Result<()> {
        let arena = self.arena;
        if ty.is_falsy(arena) || !self.visited.insert(reference.name.clone()) {
            return Ok(())
        }
        let Some(target) = arena.get(&reference.name) else {
            return Ok(())
        };
        let name = reference.name.clone();
        match target {
            Type::EnumOf(enumeration) if enumeration.name == name => self.visit(target),
            Type::ObjectOf(object) => {
                self.visit(target)?;
                let members = object.members(arena)?;
                self.out.push(Declaration::Interface { name, members });
                Ok(())
            }
            other => {
                self.visit(other)?;
                let ty = other.to_syntax(arena)?;
                self.out.push(Declaration::TypeAlias { name, ty });
                Ok(())
            }
        }
    }
}
