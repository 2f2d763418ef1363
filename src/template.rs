//! Runtime templates prepended to generated code, and the textual
//! `%variable%` pass over the final output.
use chrono::{SecondsFormat, Utc};

/// Defines the `_` request helper and the `_Response` wrapper.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.template.ts");
/// Ambient counterpart of [`DEFAULT_TEMPLATE`] for `.d.ts` output.
pub const DEFAULT_DECLARATION_TEMPLATE: &str = include_str!("../templates/default.template.d.ts");

/// `%when%` is left out so re-runs stay byte-identical; custom comments may
/// use it.
pub const DEFAULT_LEADING_COMMENT: &str = "/**\n * This file was generated by schema2ts %version%.\n * Requires TypeScript %typescript-version%. Do not edit by hand.\n */";

pub const TYPESCRIPT_VERSION: &str = "^2.6.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariables {
    pub version: String,
    pub when: String,
    pub typescript_version: String,
}

impl TemplateVariables {
    pub fn now() -> Self {
        TemplateVariables {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            when: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            typescript_version: TYPESCRIPT_VERSION.to_owned(),
        }
    }
}

pub fn inject_template_variables(text: &str, variables: &TemplateVariables) -> String {
    text.replace("%version%", &variables.version)
        .replace("%when%", &variables.when)
        .replace("%typescript-version%", &variables.typescript_version)
}

pub fn default_template(declarations_only: bool) -> &'static str {
    match declarations_only {
        true => DEFAULT_DECLARATION_TEMPLATE,
        false => DEFAULT_TEMPLATE,
    }
}
