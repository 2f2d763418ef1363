//! Identifier derivation for generated TypeScript.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::rest::HttpMethod;

static INVALID_IDENTIFIER_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_$]").expect("static identifier pattern")
});

/// Words that cannot name a binding in TypeScript modules.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "implements", "import",
    "in", "instanceof", "interface", "let", "new", "null", "package", "private", "protected", "public",
    "return", "static", "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while",
    "with", "yield",
];

/// `name` with every character outside `[A-Za-z0-9_$]` replaced by `_`,
/// prefixed with `_` when it starts with a digit and suffixed with `_` when
/// it is a reserved word.
pub fn identifier(name: &str) -> String {
    let mut out = INVALID_IDENTIFIER_CHARS.replace_all(name, "_").into_owned();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if RESERVED_WORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Function name for an endpoint without an operation id:
/// `/pets/{id}` + `get` is `pets__id__get`.
pub fn endpoint_name(url: &str, method: HttpMethod) -> String {
    let raw = format!("{url}_{method}");
    let sanitized = INVALID_IDENTIFIER_CHARS.replace_all(&raw, "_");
    identifier(sanitized.trim_start_matches('_'))
}
