//! Renders the syntax tree as TypeScript source text.
//!
//! Two modes: implementation (`export async function ..`) and ambient
//! declarations (`export declare function ..;`) for `.d.ts` output.
use super::{Declaration, Expression, FunctionDeclaration, Keyword, PropertyName, PropertySignature, Statement, TypeNode};
use serde_json::Value;

const INDENT: &str = "    ";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

pub fn type_node(ty: &TypeNode) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, 0);
    out
}

fn write_type(out: &mut String, ty: &TypeNode, depth: usize) {
    match ty {
        TypeNode::Keyword(keyword) => out.push_str(keyword_text(*keyword)),
        TypeNode::Literal(value) => out.push_str(&value.to_string()),
        TypeNode::Array(element) => {
            let wrap = matches!(**element, TypeNode::Union(_) | TypeNode::Intersection(_));
            if wrap {
                out.push('(');
            }
            write_type(out, element, depth);
            if wrap {
                out.push(')');
            }
            out.push_str("[]");
        }
        TypeNode::TypeLiteral(members) => {
            if members.is_empty() {
                out.push_str("{}");
                return
            }
            out.push_str("{\n");
            for member in members {
                write_member(out, member, depth + 1);
            }
            indent(out, depth);
            out.push('}');
        }
        TypeNode::Union(members) => {
            if members.is_empty() {
                out.push_str("never");
                return
            }
            write_joined(out, members, " | ", depth, |_| false);
        }
        TypeNode::Intersection(members) => {
            if members.is_empty() {
                out.push_str(keyword_text(Keyword::Any));
                return
            }
            write_joined(out, members, " & ", depth, |member| matches!(member, TypeNode::Union(_)));
        }
        TypeNode::Tuple(members) => {
            out.push('[');
            write_joined(out, members, ", ", depth, |_| false);
            out.push(']');
        }
        TypeNode::Reference { name, args } => {
            out.push_str(name);
            if !args.is_empty() {
                out.push('<');
                write_joined(out, args, ", ", depth, |_| false);
                out.push('>');
            }
        }
    }
}

fn write_joined(
    out: &mut String,
    members: &[TypeNode],
    separator: &str,
    depth: usize,
    wrap: impl Fn(&TypeNode) -> bool,
) {
    for (index, member) in members.iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        let parens = wrap(member);
        if parens {
            out.push('(');
        }
        write_type(out, member, depth);
        if parens {
            out.push(')');
        }
    }
}

fn write_member(out: &mut String, member: &PropertySignature, depth: usize) {
    if let Some(doc) = &member.doc {
        write_doc(out, doc, depth);
    }
    indent(out, depth);
    if member.readonly {
        out.push_str("readonly ");
    }
    match &member.name {
        PropertyName::Named(name) => {
            out.push_str(&Value::String(name.clone()).to_string());
            if member.optional {
                out.push('?');
            }
        }
        // index signatures cannot be optional
        PropertyName::Index => out.push_str("[key: string]"),
    }
    out.push_str(": ");
    write_type(out, &member.ty, depth);
    out.push_str(";\n");
}

fn keyword_text(keyword: Keyword) -> &'static str {
    match keyword {
        Keyword::Any => "any",
        Keyword::Void => "void",
        Keyword::Null => "null",
        Keyword::Undefined => "undefined",
        Keyword::Boolean => "boolean",
        Keyword::Number => "number",
        Keyword::String => "string",
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS & STATEMENTS
// ————————————————————————————————————————————————————————————————————————————

pub fn declaration(declaration: &Declaration, ambient: bool) -> String {
    let mut out = String::new();
    match declaration {
        Declaration::Interface { name, members } => {
            out.push_str(&format!("export interface {name} "));
            write_type(&mut out, &TypeNode::TypeLiteral(members.clone()), 0);
        }
        Declaration::TypeAlias { name, ty } => {
            out.push_str(&format!("export type {name} = "));
            write_type(&mut out, ty, 0);
            out.push(';');
        }
        Declaration::Enum { name, members } => {
            let declare = if ambient { "declare " } else { "" };
            out.push_str(&format!("export {declare}enum {name} {{"));
            let body = members
                .iter()
                .map(|member| format!("{INDENT}{} = {}", member.name, member.value))
                .collect::<Vec<_>>()
                .join(",\n");
            if !body.is_empty() {
                out.push('\n');
                out.push_str(&body);
                out.push('\n');
            }
            out.push('}');
        }
        Declaration::Function(function) => write_function(&mut out, function, ambient),
    }
    out
}

fn write_function(out: &mut String, function: &FunctionDeclaration, ambient: bool) {
    if let Some(doc) = &function.doc {
        write_doc(out, doc, 0);
    }
    let parameters = function
        .parameters
        .iter()
        .map(|parameter| {
            let optional = if parameter.optional { "?" } else { "" };
            format!("{}{optional}: {}", parameter.name, type_node(&parameter.ty))
        })
        .collect::<Vec<_>>()
        .join(", ");
    let return_type = type_node(&function.return_type);
    if ambient {
        out.push_str(&format!("export declare function {}({parameters}): {return_type};", function.name));
    } else {
        out.push_str(&format!("export async function {}({parameters}): {return_type} {{\n", function.name));
        out.push_str(&format!("{INDENT}return {};\n}}", expression(&function.returns)));
    }
}

pub fn statement(statement: &Statement, ambient: bool) -> String {
    match statement {
        Statement::Const { name, value } if ambient => format!("export declare const {name}: {value};"),
        Statement::Const { name, value } => format!("export const {name} = {value};"),
    }
}

pub fn expression(expression: &Expression) -> String {
    match expression {
        Expression::Identifier(name) => name.clone(),
        Expression::Literal(value) => value.to_string(),
        Expression::Call { callee, arguments } => {
            let arguments = arguments.iter().map(self::expression).collect::<Vec<_>>().join(", ");
            format!("{callee}({arguments})")
        }
        Expression::Object(entries) => {
            if entries.is_empty() {
                return "{}".to_owned()
            }
            let entries = entries
                .iter()
                .map(|(key, value)| match value {
                    Expression::Identifier(name) if name == key => key.clone(),
                    other => format!("{key}: {}", self::expression(other)),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {entries} }}")
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_doc(out: &mut String, doc: &str, depth: usize) {
    let doc = doc.trim().replace("*/", "*\\/");
    if doc.is_empty() {
        return
    }
    let lines = doc.lines().map(str::trim_end).collect::<Vec<_>>();
    indent(out, depth);
    if let [line] = lines.as_slice() {
        out.push_str(&format!("/** {line} */\n"));
        return
    }
    out.push_str("/**\n");
    for line in lines {
        indent(out, depth);
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(&format!(" * {line}\n"));
        }
    }
    indent(out, depth);
    out.push_str(" */\n");
}
