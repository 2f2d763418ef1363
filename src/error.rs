//! Crate-wide error type.

/// Terminal failures of a schema-to-code run.
///
/// Degradations (an `anyOf` read as `oneOf`, an enum falling back to its
/// base type, ...) are logged instead and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no input file, use --schema [url/file path] to provide one")]
    NoSchema,

    #[error("schema is neither valid JSON ({json}) nor valid YAML ({yaml})")]
    Unparsable { json: String, yaml: String },

    #[error("unknown schema dialect: no registered adapter accepts this document")]
    UnknownDialect,

    #[error("reference `{0}` cannot be resolved inside the document")]
    UnresolvableReference(String),

    #[error("reference `{0}` points back to itself and cannot be inlined")]
    CircularReference(String),

    #[error("invalid document at JSON path {path} → {message}")]
    InvalidDocument { path: String, message: String },

    #[error("an object property has an empty name")]
    EmptyPropertyKey,

    #[error("failed to read `{location}`: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch `{location}`: {message}")]
    Fetch { location: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
