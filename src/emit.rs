//! Code emitter: a [`RestApi`] to one TypeScript module.
//!
//! Every endpoint becomes `{name}_url`/`{name}_method` constants, named
//! parameter-group types and an async function delegating to the template's
//! `_.request` helper. All output is collected by a per-run
//! [`ModuleBuilder`]; nothing is shared between runs.
pub mod naming;

use serde_json::Value;

use crate::error::Result;
use crate::ir::{Type, TypeArena};
use crate::reduce::{DEFAULT_DICTIONARY_THRESHOLD, ReduceConfig};
use crate::rest::{Endpoint, EndpointResponse, RestApi, StatusCode};
use crate::syntax::{
    self, Declaration, Expression, FunctionDeclaration, Parameter, Statement, TypeNode, print,
};

// ————————————————————————————————————————————————————————————————————————————
// OPTIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Ambient declarations only (`.d.ts`), no implementations.
    pub declarations_only: bool,
    /// Prepended to the output, followed by a newline.
    pub leading_comment: Option<String>,
    /// Normalise every type (literal precision kept) before rendering.
    pub reduce_types: bool,
    pub dictionary_threshold: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            declarations_only: false,
            leading_comment: None,
            reduce_types: true,
            dictionary_threshold: DEFAULT_DICTIONARY_THRESHOLD,
        }
    }
}

/// Name of the response wrapper the template must define.
const RESPONSE_WRAPPER: &str = "_Response";
const REQUEST_HELPER: &str = "_.request";

pub fn generate(api: RestApi, template: &str, options: &GeneratorOptions) -> Result<String> {
    let RestApi { endpoints, enums, interfaces, types, .. } = api;
    let mut builder = ModuleBuilder::new(types, options);
    for endpoint in &endpoints {
        builder.endpoint(endpoint)?;
    }
    for enumeration in &enums {
        builder.declarations.push(enumeration.declaration());
    }
    for interface in interfaces {
        let declarations = Type::TypeReference(interface).declarations(&builder.arena)?;
        builder.declarations.extend(declarations);
    }
    Ok(builder.render(template, options))
}

// ————————————————————————————————————————————————————————————————————————————
// BUILDER
// ————————————————————————————————————————————————————————————————————————————

pub struct ModuleBuilder {
    arena: TypeArena,
    reduce: Option<ReduceConfig>,
    statements: Vec<Statement>,
    declarations: Vec<Declaration>,
}

/// A materialised parameter group, in declaration order.
struct ParameterGroup {
    key: &'static str,
    ty: Type,
}

impl ModuleBuilder {
    pub fn new(mut arena: TypeArena, options: &GeneratorOptions) -> Self {
        let reduce = options.reduce_types.then_some(ReduceConfig {
            preserve_literal_precision: true,
            dictionary_threshold: options.dictionary_threshold,
        });
        if let Some(config) = &reduce {
            arena.map_in_place(|ty| ty.reduce_with(config));
        }
        ModuleBuilder { arena, reduce, statements: Vec::new(), declarations: Vec::new() }
    }

    fn prepare(&self, ty: &Type) -> Type {
        match &self.reduce {
            Some(config) => ty.reduce_with(config),
            None => ty.clone(),
        }
    }

    /// A named reference to `ty`; existing references are kept as is and a
    /// missing group stands for `any`.
    fn materialize(&mut self, ty: Option<&Type>, name: String) -> Type {
        match ty {
            Some(reference @ Type::TypeReference(_)) => reference.clone(),
            Some(ty) => {
                let ty = self.prepare(ty);
                Type::TypeReference(self.arena.define(name, ty))
            }
            None => Type::TypeReference(self.arena.define(name, Type::Any)),
        }
    }

    pub fn endpoint(&mut self, endpoint: &Endpoint) -> Result<()> {
        let name = endpoint.name.clone().unwrap_or_else(|| naming::endpoint_name(&endpoint.url, endpoint.method));

        let mut groups = Vec::with_capacity(4);
        for (key, ty, suffix) in [
            ("path", &endpoint.path_params, "path"),
            ("body", &endpoint.body_params, "body"),
            ("query", &endpoint.query_params, "query"),
            ("headers", &endpoint.header_params, "header"),
        ] {
            let reference = self.materialize(ty.as_ref(), format!("{name}_parameter_{suffix}"));
            self.declarations.extend(reference.declarations(&self.arena)?);
            if !reference.is_falsy(&self.arena) {
                groups.push(ParameterGroup { key, ty: reference });
            }
        }

        let url = format!("{name}_url");
        let method = format!("{name}_method");
        self.statements.push(Statement::Const { name: url.clone(), value: Value::from(endpoint.url.as_str()) });
        self.statements.push(Statement::Const { name: method.clone(), value: Value::from(endpoint.method.as_str()) });

        let mut wrappers = Vec::new();
        for response in &endpoint.responses {
            if let Some(wrapper) = self.response(&name, response)? {
                wrappers.push(wrapper);
            }
        }
        let returned = match wrappers.len() {
            0 => TypeNode::any(),
            1 => wrappers.remove(0),
            _ => TypeNode::Union(wrappers),
        };

        let mut parameters = Vec::new();
        for key in ["path", "query", "headers", "body"] {
            if let Some(group) = groups.iter().find(|group| group.key == key) {
                parameters.push(Parameter {
                    name: key.to_owned(),
                    optional: key == "body" && endpoint.body_optional,
                    ty: group.ty.to_syntax(&self.arena)?,
                });
            }
        }
        let mut request = ["query", "body", "path", "headers"]
            .into_iter()
            .filter(|key| groups.iter().any(|group| group.key == *key))
            .map(|key| (key.to_owned(), Expression::Identifier(key.to_owned())))
            .collect::<Vec<_>>();
        request.push(("bodyType".to_owned(), Expression::Literal(Value::from(endpoint.body_encoding.as_str()))));

        self.declarations.push(Declaration::Function(FunctionDeclaration {
            name,
            parameters,
            return_type: TypeNode::generic("Promise", vec![returned]),
            returns: Expression::Call {
                callee: REQUEST_HELPER.to_owned(),
                arguments: vec![Expression::Identifier(url), Expression::Identifier(method), Expression::Object(request)],
            },
            doc: endpoint.doc.render(),
        }));
        Ok(())
    }

    /// `_Response<status, payload, header>` for one response, or nothing
    /// when the payload is falsy. Trailing `any` arguments are dropped.
    fn response(&mut self, name: &str, response: &EndpointResponse) -> Result<Option<TypeNode>> {
        let ty = self.prepare(&response.ty);
        if ty.is_falsy(&self.arena) {
            return Ok(None)
        }
        self.declarations.extend(ty.declarations(&self.arena)?);
        let data = ty.to_syntax(&self.arena)?;

        let header = match &response.header {
            Some(header) => {
                let reference = self.materialize(Some(header), format!("{name}_response_header_{}", response.status));
                self.declarations.extend(reference.declarations(&self.arena)?);
                match reference.is_falsy(&self.arena) {
                    true => TypeNode::any(),
                    false => reference.to_syntax(&self.arena)?,
                }
            }
            None => TypeNode::any(),
        };

        let status = match response.status {
            StatusCode::Code(code) => Value::from(code),
            StatusCode::Default => Value::from("default"),
        };
        let mut arguments = vec![TypeNode::Literal(status), data, header];
        if arguments[2].is_any() {
            arguments.pop();
            if arguments[1].is_any() {
                arguments.pop();
            }
        }
        Ok(Some(TypeNode::generic(RESPONSE_WRAPPER, arguments)))
    }

    /// `leading comment`, template, constants, then declarations.
    fn render(self, template: &str, options: &GeneratorOptions) -> String {
        let ambient = options.declarations_only;
        let mut seen = std::collections::HashSet::new();
        let statements = self
            .statements
            .iter()
            .filter(|statement| match statement {
                Statement::Const { name, .. } => seen.insert(name.clone()),
            })
            .map(|statement| print::statement(statement, ambient))
            .collect::<Vec<_>>()
            .join("\n");
        let declarations = syntax::dedup_declarations(self.declarations)
            .iter()
            .map(|declaration| print::declaration(declaration, ambient))
            .collect::<Vec<_>>()
            .join("\n");

        let mut out = String::new();
        if let Some(comment) = &options.leading_comment {
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str(template);
        out.push('\n');
        out.push_str(&statements);
        out.push('\n');
        out.push_str(&declarations);
        out.push('\n');
        out
    }
}
