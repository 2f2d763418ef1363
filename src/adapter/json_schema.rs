//! JSON Schema (Swagger 2.0 flavour) to [`Type`].
//!
//! Keywords are tried in a fixed priority: `$ref`, `allOf`, `anyOf`,
//! `oneOf`, `additionalProperties`, `enum`, then `type`. Anything the
//! translator cannot express degrades with a log line instead of failing.
use std::collections::HashSet;

use serde_json::{Map, Value};

use super::deref::{self, DEFINITIONS_PREFIX};
use crate::emit::naming;
use crate::ir::{EnumMember, EnumOf, FieldKey, ObjectOfField, Type, TypeArena, TypeReference};

// ————————————————————————————————————————————————————————————————————————————
// TRANSLATOR
// ————————————————————————————————————————————————————————————————————————————

pub struct SchemaTranslator<'a> {
    document: &'a Value,
    definitions: Option<&'a Map<String, Value>>,
    arena: TypeArena,
    /// Named types whose translation has started; a `$ref` back to one of
    /// them is a cycle and only needs the name.
    in_progress: HashSet<String>,
    enums: Vec<EnumOf>,
    /// Approximations made so far, in encounter order.
    degradations: Vec<String>,
}

impl<'a> SchemaTranslator<'a> {
    pub fn new(document: &'a Value) -> Self {
        SchemaTranslator {
            document,
            definitions: document.get("definitions").and_then(Value::as_object),
            arena: TypeArena::new(),
            in_progress: HashSet::new(),
            enums: Vec::new(),
            degradations: Vec::new(),
        }
    }

    /// Translates every top-level definition, in document order.
    pub fn define_all(&mut self) -> Vec<TypeReference> {
        let Some(definitions) = self.definitions else {
            return Vec::new()
        };
        definitions
            .iter()
            .filter_map(|(key, target)| match self.named(naming::identifier(key), target) {
                Type::TypeReference(reference) => Some(reference),
                _ => None,
            })
            .collect()
    }

    /// Every schema node that was read approximately; each one is also
    /// logged at `warn`.
    pub fn degradations(&self) -> &[String] {
        &self.degradations
    }

    fn degrade(&mut self, message: String) {
        log::warn!("{message}");
        self.degradations.push(message);
    }

    pub fn finish(self) -> (TypeArena, Vec<EnumOf>) {
        (self.arena, self.enums)
    }

    pub fn translate(&mut self, schema: &Value) -> Type {
        let Value::Object(node) = schema else {
            return Type::Any
        };
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            return self.reference(reference)
        }
        if let Some(parts) = node.get("allOf").and_then(Value::as_array) {
            let mut members = self.translate_all(parts);
            // sibling properties next to `allOf` are one more part
            if node.contains_key("properties") {
                members.push(self.translate(&without(node, "allOf")));
            }
            return Type::intersection(members)
        }
        if let Some(branches) = node.get("anyOf").and_then(Value::as_array) {
            self.degrade("`anyOf` is read as `oneOf`; overlapping branches lose precision".to_owned());
            return Type::union(self.translate_all(branches))
        }
        if let Some(branches) = node.get("oneOf").and_then(Value::as_array) {
            return Type::union(self.translate_all(branches))
        }
        match node.get("additionalProperties") {
            None | Some(Value::Bool(false)) => {}
            Some(extra) => return self.with_additional_properties(node, extra),
        }
        if let Some(values) = node.get("enum").and_then(Value::as_array) {
            if let Some(ty) = self.enumeration(values) {
                return ty
            }
        }
        self.typed(node)
    }

    fn translate_all(&mut self, schemas: &[Value]) -> Vec<Type> {
        schemas.iter().map(|schema| self.translate(schema)).collect()
    }

    fn reference(&mut self, reference: &str) -> Type {
        match deref::resolve(self.document, reference) {
            Some(target) => self.named(reference_name(reference), target),
            None => {
                self.degrade(format!("`{reference}` does not resolve, using `any`"));
                Type::Any
            }
        }
    }

    /// Defines `name` from `target` once and returns a reference to it.
    fn named(&mut self, name: String, target: &Value) -> Type {
        if !self.arena.contains(&name) && self.in_progress.insert(name.clone()) {
            let ty = self.translate(target);
            self.arena.define(name.clone(), ty);
            self.in_progress.remove(&name);
        }
        Type::reference(name)
    }

    fn with_additional_properties(&mut self, node: &Map<String, Value>, extra: &Value) -> Type {
        let value = match extra {
            Value::Bool(_) => Type::Any,
            schema => self.translate(schema),
        };
        let dictionary = Type::object(vec![ObjectOfField {
            key: FieldKey::Wildcard,
            ..ObjectOfField::new(String::new(), value)
        }]);
        let base = self.translate(&without(node, "additionalProperties"));
        if base.is_falsy(&self.arena) {
            return dictionary
        }
        Type::And(vec![base, dictionary])
    }

    // ————————————————————————————————————————————————————————————————————————
    // ENUMS
    // ————————————————————————————————————————————————————————————————————————

    fn enumeration(&mut self, values: &[Value]) -> Option<Type> {
        if let Some(key) = self.correlated_definition(values) {
            let name = naming::identifier(key);
            if let Some(existing) = self.enums.iter().find(|known| known.name == name) {
                return Some(Type::EnumOf(existing.clone()))
            }
            let Some(enumeration) = enum_of(name, values) else {
                self.degrade(format!("enum `{key}` holds values other than strings and numbers, using its base type"));
                return None
            };
            self.enums.push(enumeration.clone());
            return Some(Type::EnumOf(enumeration))
        }
        let scalar = values.iter().all(|value| !value.is_array() && !value.is_object());
        if !scalar {
            self.degrade("enum with composite values, using its base type".to_owned());
            return None
        }
        Some(Type::union(values.iter().cloned().map(Type::constant)))
    }

    /// The definition whose own `enum` lists exactly these values.
    fn correlated_definition(&self, values: &[Value]) -> Option<&'a str> {
        let definitions = self.definitions?;
        definitions
            .iter()
            .find(|(_, definition)| {
                definition.get("enum").and_then(Value::as_array).map(Vec::as_slice) == Some(values)
            })
            .map(|(key, _)| key.as_str())
    }

    // ————————————————————————————————————————————————————————————————————————
    // PRIMITIVES, ARRAYS, OBJECTS
    // ————————————————————————————————————————————————————————————————————————

    fn typed(&mut self, node: &Map<String, Value>) -> Type {
        match node.get("type") {
            Some(Value::String(name)) => self.named_type(name, node),
            Some(Value::Array(names)) => {
                let members = names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|name| self.named_type(name, node))
                    .collect::<Vec<_>>();
                let nullable = names.iter().any(|name| name == "null");
                match Type::union(members) {
                    Type::Or(members) if nullable && !members.is_empty() => {
                        Type::Or(members.into_iter().chain([Type::null()]).collect())
                    }
                    ty => ty,
                }
            }
            _ => self.untyped(node),
        }
    }

    fn named_type(&mut self, name: &str, node: &Map<String, Value>) -> Type {
        match name {
            "string" => Type::string(),
            "boolean" => Type::boolean(),
            "integer" | "number" => Type::number(),
            "null" => Type::null(),
            "file" => Type::Any,
            "array" => self.array(node),
            "object" => self.object(node),
            unknown => {
                log::debug!("unknown schema type `{unknown}`, reading it as an object");
                self.untyped(node)
            }
        }
    }

    fn untyped(&mut self, node: &Map<String, Value>) -> Type {
        if node.contains_key("properties") {
            log::debug!("schema without `type` read as an object");
            return self.object(node)
        }
        Type::Any
    }

    fn array(&mut self, node: &Map<String, Value>) -> Type {
        match node.get("items") {
            None => Type::array(Type::Any),
            Some(Value::Array(positions)) => Type::TupleOf(self.translate_all(positions)),
            Some(items) => Type::array(self.translate(items)),
        }
    }

    fn object(&mut self, node: &Map<String, Value>) -> Type {
        let properties = match node.get("properties") {
            None => return Type::object(Vec::new()),
            Some(Value::Object(properties)) => properties,
            Some(_) => {
                self.degrade("`properties` is not an object, using `any`".to_owned());
                return Type::Any
            }
        };
        let required = node
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect::<HashSet<_>>())
            .unwrap_or_default();
        let fields = properties
            .iter()
            .map(|(key, property)| ObjectOfField {
                optional: !required.contains(key.as_str()),
                doc: description(property),
                default_value: property.get("default").cloned(),
                readonly: property.get("readOnly").and_then(Value::as_bool).unwrap_or(false),
                ..ObjectOfField::new(key.clone(), self.translate(property))
            })
            .collect();
        Type::object(fields)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `#/definitions/Pet` is `Pet`; other pointers keep their path.
pub fn reference_name(reference: &str) -> String {
    let path = reference
        .strip_prefix(DEFINITIONS_PREFIX)
        .unwrap_or_else(|| reference.trim_start_matches(['#', '/']));
    naming::identifier(&path.replace("~1", "/").replace("~0", "~"))
}

pub fn description(schema: &Value) -> Option<String> {
    schema.get("description").and_then(Value::as_str).map(str::to_owned)
}

fn without(node: &Map<String, Value>, keyword: &str) -> Value {
    let mut rest = node.clone();
    rest.remove(keyword);
    Value::Object(rest)
}

fn enum_of(name: String, values: &[Value]) -> Option<EnumOf> {
    let mut taken = HashSet::new();
    let mut members = Vec::with_capacity(values.len());
    for value in values {
        let label = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => return None,
        };
        let base = naming::identifier(&label);
        let mut member = base.clone();
        let mut suffix = 1;
        while !taken.insert(member.clone()) {
            member = format!("{base}_{suffix}");
            suffix += 1;
        }
        members.push(EnumMember { name: member, value: value.clone() });
    }
    Some(EnumOf { name, members })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn translate(document: &Value, schema: Value) -> (Type, TypeArena) {
        let mut translator = SchemaTranslator::new(document);
        let ty = translator.translate(&schema);
        (ty, translator.finish().0)
    }

    #[test]
    fn primitives_and_arrays() {
        let document = json!({});
        assert_eq!(translate(&document, json!({"type": "integer"})).0, Type::number());
        assert_eq!(translate(&document, json!({"type": "file"})).0, Type::Any);
        assert_eq!(
            translate(&document, json!({"type": "array", "items": {"type": "string"}})).0,
            Type::array(Type::string())
        );
        assert_eq!(
            translate(&document, json!({"type": "array", "items": [{"type": "string"}, {"type": "number"}]})).0,
            Type::TupleOf(vec![Type::string(), Type::number()])
        );
        assert_eq!(
            translate(&document, json!({"type": ["string", "null"]})).0,
            Type::Or(vec![Type::string(), Type::null()])
        );
    }

    #[test]
    fn objects_carry_required_docs_and_defaults() {
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": {"type": "integer", "readOnly": true},
                "status": {"type": "string", "description": "pet status", "default": "available"}
            }
        });
        let (ty, _) = translate(&json!({}), schema);
        let Type::ObjectOf(object) = ty else { panic!("expected an object") };
        let id = object.get("id").unwrap();
        assert!(!id.optional && id.readonly);
        let status = object.get("status").unwrap();
        assert!(status.optional);
        assert_eq!(status.doc.as_deref(), Some("pet status"));
        assert_eq!(status.default_value, Some(json!("available")));
    }

    #[test]
    fn self_reference_is_a_named_back_edge() {
        let document = json!({
            "definitions": {
                "Node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/Node"}}}
            }
        });
        let mut translator = SchemaTranslator::new(&document);
        let defined = translator.define_all();
        let (arena, _) = translator.finish();
        assert_eq!(defined, [TypeReference { name: "Node".into() }]);
        let Some(Type::ObjectOf(node)) = arena.get("Node") else { panic!("Node not defined") };
        assert_eq!(node.get("next").unwrap().value, Type::reference("Node"));
    }

    #[test_log::test]
    fn composition_keywords() {
        let document = json!({"definitions": {"Pet": {"type": "object"}}});
        let (all, _) = translate(&document, json!({"allOf": [{"$ref": "#/definitions/Pet"}, {"type": "string"}]}));
        assert_eq!(all, Type::And(vec![Type::reference("Pet"), Type::string()]));

        let mut translator = SchemaTranslator::new(&document);
        let any = translator.translate(&json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}));
        assert_eq!(any, Type::Or(vec![Type::string(), Type::number()]));
        assert_eq!(translator.degradations().len(), 1);
        assert!(translator.degradations()[0].contains("`anyOf` is read as `oneOf`"));
        // translation goes on after the downgrade
        let next = translator.translate(&json!({"type": "string"}));
        assert_eq!(next, Type::string());
        assert_eq!(translator.degradations().len(), 1);

        let (one, _) = translate(&document, json!({"oneOf": [{"type": "string"}, {"type": "string"}]}));
        assert_eq!(one, Type::Or(vec![Type::string()]));
    }

    #[test]
    fn additional_properties_add_an_index_signature() {
        let (ty, _) = translate(&json!({}), json!({"type": "object", "additionalProperties": {"type": "integer"}}));
        let Type::ObjectOf(object) = ty else { panic!("expected a dictionary") };
        assert_eq!(object.fields.len(), 1);
        assert_eq!(object.fields[0].key, FieldKey::Wildcard);
        assert_eq!(object.fields[0].value, Type::number());

        let schema = json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": true
        });
        let (Type::And(parts), _) = translate(&json!({}), schema) else { panic!("expected an intersection") };
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn enums_correlate_with_definitions() {
        let document = json!({
            "definitions": {"Status": {"type": "string", "enum": ["available", "sold", "1st"]}}
        });
        let mut translator = SchemaTranslator::new(&document);
        let inline = translator.translate(&json!({"type": "string", "enum": ["available", "sold", "1st"]}));
        let (_, enums) = translator.finish();
        let Type::EnumOf(status) = inline else { panic!("expected a correlated enum") };
        assert_eq!(status.name, "Status");
        let names = status.members.iter().map(|member| member.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["available", "sold", "_1st"]);
        assert_eq!(enums, [status]);
    }

    #[test]
    fn uncorrelated_enums_are_literal_unions() {
        let (ty, _) = translate(&json!({}), json!({"type": "integer", "enum": [1, 2]}));
        assert_eq!(ty, Type::Or(vec![Type::constant(1), Type::constant(2)]));
        let (ty, _) = translate(&json!({}), json!({"type": "object", "enum": [{"a": 1}]}));
        assert_eq!(ty, Type::object(Vec::new()));
    }

    #[test_log::test]
    fn malformed_nodes_degrade() {
        let document = json!({});
        assert_eq!(translate(&document, json!({"properties": 3})).0, Type::Any);
        assert_eq!(translate(&document, json!({"description": "anything"})).0, Type::Any);
        assert_eq!(translate(&document, json!({"$ref": "#/definitions/Missing"})).0, Type::Any);
        let (ty, _) = translate(&document, json!({"properties": {"id": {"type": "integer"}}}));
        assert!(matches!(ty, Type::ObjectOf(object) if object.fields.len() == 1));
    }

    #[test]
    fn reference_names() {
        assert_eq!(reference_name("#/definitions/Pet"), "Pet");
        assert_eq!(reference_name("#/definitions/pet-list"), "pet_list");
        assert_eq!(reference_name("#/parameters/a~1b"), "parameters_a_b");
    }
}
