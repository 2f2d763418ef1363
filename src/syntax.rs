//! TypeScript syntax tree produced by the emitter.
//!
//! Only the subset of TypeScript the generated client needs: type nodes,
//! top-level declarations and the handful of expressions used in function
//! bodies. Printing lives in [`print`].
pub mod print;

use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Any,
    Void,
    Null,
    Undefined,
    Boolean,
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Keyword(Keyword),
    /// `"text"`, `42`, `true`
    Literal(Value),
    Array(Box<TypeNode>),
    TypeLiteral(Vec<PropertySignature>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Tuple(Vec<TypeNode>),
    Reference { name: String, args: Vec<TypeNode> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyName {
    Named(String),
    /// `[key: string]`
    Index,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: PropertyName,
    pub optional: bool,
    pub readonly: bool,
    pub ty: TypeNode,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberDecl {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// `name?: ty`
    pub optional: bool,
    pub ty: TypeNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Literal(Value),
    Call { callee: String, arguments: Vec<Expression> },
    Object(Vec<(String, Expression)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Already wrapped in `Promise<..>`.
    pub return_type: TypeNode,
    /// The single returned expression of the body.
    pub returns: Expression,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Interface { name: String, members: Vec<PropertySignature> },
    TypeAlias { name: String, ty: TypeNode },
    Enum { name: String, members: Vec<EnumMemberDecl> },
    Function(FunctionDeclaration),
}

/// Module-level bindings emitted ahead of the declaration block.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Const { name: String, value: Value },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeNode {
    pub fn any() -> Self {
        TypeNode::Keyword(Keyword::Any)
    }
    pub fn void() -> Self {
        TypeNode::Keyword(Keyword::Void)
    }
    pub fn reference(name: impl Into<String>) -> Self {
        TypeNode::Reference { name: name.into(), args: Vec::new() }
    }
    pub fn generic(name: impl Into<String>, args: Vec<TypeNode>) -> Self {
        TypeNode::Reference { name: name.into(), args }
    }
    pub fn is_any(&self) -> bool {
        matches!(self, TypeNode::Keyword(Keyword::Any))
    }
}

impl Declaration {
    /// Identifier the declaration binds; used to deduplicate the output.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Interface { name, .. }
            | Declaration::TypeAlias { name, .. }
            | Declaration::Enum { name, .. } => name,
            Declaration::Function(function) => &function.name,
        }
    }
}

/// Keeps the first declaration of every name, in encounter order.
pub fn dedup_declarations(declarations: Vec<Declaration>) -> Vec<Declaration> {
    let mut seen = std::collections::HashSet::<String>::new();
    declarations
        .into_iter()
        .filter(|declaration| seen.insert(declaration.name().to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_declaration_of_a_name_wins() {
        let declarations = vec![
            Declaration::TypeAlias { name: "Pet".into(), ty: TypeNode::Keyword(Keyword::String) },
            Declaration::Interface { name: "Error".into(), members: Vec::new() },
            Declaration::TypeAlias { name: "Pet".into(), ty: TypeNode::Keyword(Keyword::Number) },
        ];
        let kept = dedup_declarations(declarations);
        assert_eq!(kept.len(), 2);
        assert_eq!(
            kept[0],
            Declaration::TypeAlias { name: "Pet".into(), ty: TypeNode::Keyword(Keyword::String) }
        );
        assert_eq!(kept[1].name(), "Error");
    }
}
