//! Dialect-independent model of a REST API: what adapters produce and the
//! emitter consumes.
use std::fmt::{self, Display};

use crate::ir::{EnumOf, Type, TypeArena, TypeReference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    /// Document order of operations inside a path item.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Patch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Patch => "patch",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    #[default]
    Json,
    Form,
}

impl BodyEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyEncoding::Json => "json",
            BodyEncoding::Form => "form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Code(u16),
    /// The catch-all `default` response.
    Default,
}

impl StatusCode {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "default" => Some(StatusCode::Default),
            code => code.parse().ok().map(StatusCode::Code),
        }
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Code(code) => write!(f, "{code}"),
            StatusCode::Default => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResponse {
    pub status: StatusCode,
    pub ty: Type,
    /// Response headers as an `ObjectOf`, when documented.
    pub header: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointDoc {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub see: Option<String>,
}

impl EndpointDoc {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.description.is_none() && !self.deprecated && self.see.is_none()
    }

    /// JSDoc body: description, summary, then tags.
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None
        }
        let mut lines = Vec::new();
        lines.extend(self.description.iter().map(|text| text.trim().to_owned()));
        lines.extend(self.summary.iter().map(|text| text.trim().to_owned()));
        if self.deprecated {
            lines.push("@deprecated".to_owned());
        }
        lines.extend(self.see.iter().map(|url| format!("@see {url}")));
        lines.retain(|line| !line.is_empty());
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

/// One callable operation. Parameter groups are `None` when the dialect has
/// nothing to say about them; an empty `ObjectOf` means "no parameters".
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: String,
    pub method: HttpMethod,
    pub path_params: Option<Type>,
    pub query_params: Option<Type>,
    pub header_params: Option<Type>,
    pub body_params: Option<Type>,
    /// The caller may leave the body out.
    pub body_optional: bool,
    pub body_encoding: BodyEncoding,
    /// Document order.
    pub responses: Vec<EndpointResponse>,
    /// Explicit function name (an operation id); derived from url and
    /// method when absent.
    pub name: Option<String>,
    pub doc: EndpointDoc,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Endpoint {
            url: url.into(),
            method,
            path_params: None,
            query_params: None,
            header_params: None,
            body_params: None,
            body_optional: false,
            body_encoding: BodyEncoding::Json,
            responses: Vec::new(),
            name: None,
            doc: EndpointDoc::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestApi {
    pub base_url: String,
    pub endpoints: Vec<Endpoint>,
    pub enums: Vec<EnumOf>,
    /// Named types emitted even when no endpoint reaches them.
    pub interfaces: Vec<TypeReference>,
    /// Targets of every `TypeReference` in this API.
    pub types: TypeArena,
}
