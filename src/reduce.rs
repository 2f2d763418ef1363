//! Structural simplification of the IR.
//!
//! `reduce` trades precision for readable output: constant literals widen
//! to their general type, and `Or`/`And` members are reduced, deduplicated,
//! merged (objects) and flattened, in that order.
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::ir::{FieldKey, Literal, LiteralKind, ObjectOf, ObjectOfField, Type};

// ————————————————————————————————————————————————————————————————————————————
// POLICY
// ————————————————————————————————————————————————————————————————————————————

/// Objects merged from more keys than this are read as dictionaries.
pub const DEFAULT_DICTIONARY_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Keep constant literals (`"sold"`, `200`) instead of widening them.
    pub preserve_literal_precision: bool,
    pub dictionary_threshold: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        ReduceConfig {
            preserve_literal_precision: false,
            dictionary_threshold: DEFAULT_DICTIONARY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constructed {
    Or,
    And,
}

/// Kinds that are equal by kind, not by value, when deduplicating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaseKind {
    Any,
    Void,
    Null,
    Undefined,
    Boolean,
    Number,
    String,
}

// ————————————————————————————————————————————————————————————————————————————
// REDUCE
// ————————————————————————————————————————————————————————————————————————————

impl Type {
    pub fn reduce(&self, preserve_literal_precision: bool) -> Type {
        self.reduce_with(&ReduceConfig { preserve_literal_precision, ..ReduceConfig::default() })
    }

    pub fn reduce_with(&self, config: &ReduceConfig) -> Type {
        match self {
            Type::Any | Type::Void | Type::EnumOf(_) | Type::TypeReference(_) => self.clone(),
            Type::Literal(literal) => reduce_literal(literal, config),
            Type::ArrayOf(element) => Type::ArrayOf(Box::new(element.reduce_with(config))),
            Type::ObjectOf(object) => Type::ObjectOf(ObjectOf {
                fields: object
                    .fields
                    .iter()
                    .map(|field| ObjectOfField { value: field.value.reduce_with(config), ..field.clone() })
                    .collect(),
            }),
            Type::TupleOf(members) => Type::TupleOf(members.iter().map(|member| member.reduce_with(config)).collect()),
            Type::Or(members) => reduce_for_constructed(Constructed::Or, members, config),
            Type::And(members) => reduce_for_constructed(Constructed::And, members, config),
        }
    }
}

fn reduce_literal(literal: &Literal, config: &ReduceConfig) -> Type {
    let composite = matches!(literal.kind(), LiteralKind::Array | LiteralKind::Object);
    if (literal.constant && !config.preserve_literal_precision) || composite {
        crate::shape::shape(literal.value.as_ref()).reduce_with(config)
    } else {
        Type::Literal(literal.clone())
    }
}

fn reduce_for_constructed(kind: Constructed, members: &[Type], config: &ReduceConfig) -> Type {
    // 1) reduce children; `1 | 3` becomes `number | number` here
    let reduced = members.iter().map(|member| member.reduce_with(config)).collect::<Vec<_>>();
    // 2) then drop duplicates and falsy keywords
    let deduped = remove_duplicate_base_type(reduced);
    // 3) merge objects
    let combined = combine_object_type(kind, deduped, config);
    // 4) splice nested members of the same kind
    let (mut flat, spliced) = flattened_members(kind, combined);
    if spliced {
        // spliced members were never compared with their new siblings
        flat = combine_object_type(kind, remove_duplicate_base_type(flat), config);
    }
    match flat.len() {
        0 => Type::Any,
        1 => flat.remove(0),
        _ => match kind {
            Constructed::Or => Type::Or(flat),
            Constructed::And => Type::And(flat),
        },
    }
}

// ————————————————————————————————————————————————————————————————————————————
// MEMBERS
// ————————————————————————————————————————————————————————————————————————————

fn base_kind(ty: &Type) -> Option<BaseKind> {
    match ty {
        Type::Any => Some(BaseKind::Any),
        Type::Void => Some(BaseKind::Void),
        Type::Literal(literal) => match literal.kind() {
            LiteralKind::Null => Some(BaseKind::Null),
            LiteralKind::Undefined => Some(BaseKind::Undefined),
            _ if literal.constant => None,
            LiteralKind::Boolean => Some(BaseKind::Boolean),
            LiteralKind::Number => Some(BaseKind::Number),
            LiteralKind::String => Some(BaseKind::String),
            LiteralKind::Array | LiteralKind::Object => None,
        },
        _ => None,
    }
}

fn is_falsy_keyword(kind: Option<BaseKind>) -> bool {
    matches!(kind, Some(BaseKind::Any | BaseKind::Void | BaseKind::Null | BaseKind::Undefined))
}

/// Drops repeated general primitives (`string | string`), exact repeats of
/// constants, and every `any`/`void`/`null`/`undefined`. Distinct constants
/// (`1 | 2`) are kept.
pub fn remove_duplicate_base_type(members: Vec<Type>) -> Vec<Type> {
    let mut out: Vec<Type> = Vec::with_capacity(members.len());
    for member in members {
        let kind = base_kind(&member);
        if is_falsy_keyword(kind) {
            continue
        }
        let duplicate = match kind {
            Some(kind) => out.iter().any(|seen| base_kind(seen) == Some(kind)),
            None => matches!(member, Type::Literal(_)) && out.contains(&member),
        };
        if !duplicate {
            out.push(member);
        }
    }
    out
}

/// Merges every `ObjectOf` member into one object appended after the other
/// members.
///
/// Shared keys get `Or` of their values, concatenated docs and OR-ed
/// optionality; in a union a key missing from some member is optional.
/// `null`/`undefined` values become optional `any`. More keys than the
/// dictionary threshold collapse to one index signature.
fn combine_object_type(kind: Constructed, members: Vec<Type>, config: &ReduceConfig) -> Vec<Type> {
    let (objects, mut others): (Vec<Type>, Vec<Type>) =
        members.into_iter().partition(|member| matches!(member, Type::ObjectOf(_)));
    if objects.is_empty() {
        return others
    }
    let sources = objects.len();

    let mut merged = IndexMap::<FieldKey, (ObjectOfField, usize)>::new();
    for object in objects {
        let Type::ObjectOf(object) = object else { continue };
        for field in object.fields {
            match merged.entry(field.key.clone()) {
                Entry::Occupied(mut entry) => {
                    let (existing, seen_in) = entry.get_mut();
                    merge_field(existing, field, config);
                    *seen_in += 1;
                }
                Entry::Vacant(entry) => {
                    entry.insert((field, 1));
                }
            }
        }
    }

    let mut fields = merged
        .into_values()
        .map(|(mut field, seen_in)| {
            if kind == Constructed::Or && seen_in < sources {
                field.optional = true;
            }
            falsy_value_to_any(field)
        })
        .collect::<Vec<_>>();

    if fields.len() > config.dictionary_threshold {
        fields = vec![as_dictionary(fields, config)];
    }
    if !fields.is_empty() {
        others.push(Type::ObjectOf(ObjectOf { fields }));
    }
    others
}

fn merge_field(existing: &mut ObjectOfField, incoming: ObjectOfField, config: &ReduceConfig) {
    let value = std::mem::replace(&mut existing.value, Type::Any);
    existing.value = Type::Or(vec![value, incoming.value]).reduce_with(config);
    existing.doc = match (existing.doc.take(), incoming.doc) {
        (Some(a), Some(b)) if a != b => Some(format!("{a}\n{b}")),
        (Some(a), _) => Some(a),
        (None, b) => b,
    };
    existing.optional = existing.optional || incoming.optional;
    existing.readonly = existing.readonly && incoming.readonly;
    if existing.default_value.is_none() {
        existing.default_value = incoming.default_value;
    }
}

fn falsy_value_to_any(field: ObjectOfField) -> ObjectOfField {
    let falsy = matches!(&field.value, Type::Literal(literal) if literal.is_null_or_undefined());
    match falsy {
        true => ObjectOfField { value: Type::Any, optional: true, ..field },
        false => field,
    }
}

fn as_dictionary(fields: Vec<ObjectOfField>, config: &ReduceConfig) -> ObjectOfField {
    let value = Type::Or(fields.into_iter().map(|field| field.value).collect()).reduce_with(config);
    ObjectOfField {
        key: FieldKey::Wildcard,
        value,
        optional: false,
        doc: None,
        default_value: None,
        readonly: false,
    }
}

/// Splices members of the same constructed kind into the list, keeping the
/// other members first. Reports whether anything was spliced.
fn flattened_members(kind: Constructed, members: Vec<Type>) -> (Vec<Type>, bool) {
    let same_kind = |member: &Type| match (kind, member) {
        (Constructed::Or, Type::Or(_)) | (Constructed::And, Type::And(_)) => true,
        _ => false,
    };
    if !members.iter().any(same_kind) {
        return (members, false)
    }
    let (nested, mut out): (Vec<Type>, Vec<Type>) = members.into_iter().partition(same_kind);
    for member in nested {
        let (Type::Or(inner) | Type::And(inner)) = member else { continue };
        out.extend(flattened_members(kind, inner).0);
    }
    (out, true)
}
