//! OpenAPI 2.0 (Swagger) adapter.
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::SpecificationAdapter;
use super::deref;
use super::json_schema::{SchemaTranslator, description};
use crate::emit::naming;
use crate::error::Result;
use crate::ir::{ObjectOfField, Type};
use crate::path_de::from_value_with_path;
use crate::rest::{BodyEncoding, Endpoint, EndpointDoc, EndpointResponse, HttpMethod, RestApi, StatusCode};
use crate::shape;

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApi2;

impl SpecificationAdapter for OpenApi2 {
    fn name(&self) -> &'static str {
        "OpenAPI 2.0"
    }

    fn is_match(&self, document: &Value) -> bool {
        match document.get("swagger") {
            Some(Value::String(version)) => version == "2.0",
            Some(Value::Number(version)) => version.as_f64() == Some(2.0),
            _ => false,
        }
    }

    fn transform(&self, document: &Value) -> Result<RestApi> {
        let document = deref::dereference(document)?;
        let view: DocumentView = from_value_with_path(&document, "")?;
        let mut translator = SchemaTranslator::new(&document);

        let mut endpoints = Vec::new();
        for (url, item) in &view.paths {
            // `x-` extensions share the map with the paths
            if !url.starts_with('/') {
                continue
            }
            let at = format!("/paths/{}", url.replace('~', "~0").replace('/', "~1"));
            if item.get("$ref").is_some() {
                log::warn!("`$ref` on path item `{url}` is not supported, reading its inline operations only");
            }
            let item: PathItemView = from_value_with_path(item, &at)?;
            for method in HttpMethod::ALL {
                let Some(operation) = item.operation(method) else { continue };
                let at = format!("{at}/{method}");
                endpoints.push(endpoint(&mut translator, url, method, &item.parameters, operation, &at)?);
            }
        }

        let interfaces = translator.define_all();
        if !translator.degradations().is_empty() {
            log::info!("{} schema nodes were read approximately", translator.degradations().len());
        }
        let (types, enums) = translator.finish();
        Ok(RestApi {
            base_url: view.base_path.filter(|path| !path.is_empty()).unwrap_or_else(|| "/".to_owned()),
            endpoints,
            enums,
            interfaces,
            types,
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT VIEWS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentView {
    base_path: Option<String>,
    #[serde(default)]
    paths: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PathItemView {
    get: Option<OperationView>,
    post: Option<OperationView>,
    put: Option<OperationView>,
    delete: Option<OperationView>,
    head: Option<OperationView>,
    options: Option<OperationView>,
    patch: Option<OperationView>,
    #[serde(default)]
    parameters: Vec<ParameterView>,
}

impl PathItemView {
    fn operation(&self, method: HttpMethod) -> Option<&OperationView> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationView {
    operation_id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    #[serde(default)]
    deprecated: bool,
    external_docs: Option<ExternalDocsView>,
    #[serde(default)]
    parameters: Vec<ParameterView>,
    /// Status keys sit next to `x-` extensions, so entries stay untyped
    /// until the key is known to be a status.
    #[serde(default)]
    responses: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ExternalDocsView {
    description: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ParameterView {
    name: String,
    #[serde(rename = "in")]
    location: ParameterLocation,
    #[serde(default)]
    required: bool,
    description: Option<String>,
    default: Option<Value>,
    /// Body parameters only.
    schema: Option<Value>,
    /// The inline schema of every other parameter (`type`, `items`, ..).
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ParameterLocation {
    Query,
    Header,
    Path,
    FormData,
    Body,
}

#[derive(Debug, Deserialize)]
struct ResponseView {
    schema: Option<Value>,
    #[serde(default)]
    headers: IndexMap<String, Value>,
    #[serde(default)]
    examples: IndexMap<String, Value>,
}

// ————————————————————————————————————————————————————————————————————————————
// ENDPOINTS
// ————————————————————————————————————————————————————————————————————————————

fn endpoint(
    translator: &mut SchemaTranslator<'_>,
    url: &str,
    method: HttpMethod,
    shared: &[ParameterView],
    operation: &OperationView,
    at: &str,
) -> Result<Endpoint> {
    let parameters = merged_parameters(shared, &operation.parameters);
    let body_encoding = match parameters.iter().any(|parameter| parameter.location == ParameterLocation::FormData) {
        true => BodyEncoding::Form,
        false => BodyEncoding::Json,
    };
    // form fields carry their own optionality
    let (body_params, body_optional) = match body_encoding {
        BodyEncoding::Form => (Some(parameter_group(translator, &parameters, ParameterLocation::FormData)), false),
        BodyEncoding::Json => {
            let body = parameters.iter().filter(|parameter| parameter.location == ParameterLocation::Body).last();
            let ty = body.map(|body| body.schema.as_ref().map_or(Type::Any, |schema| translator.translate(schema)));
            (ty, body.is_some_and(|body| !body.required))
        }
    };

    let mut responses = Vec::new();
    for (status, response) in &operation.responses {
        let Some(code) = StatusCode::parse(status) else { continue };
        let response: ResponseView = from_value_with_path(response, &format!("{at}/responses/{status}"))?;
        responses.push(endpoint_response(translator, code, &response));
    }

    let external = operation.external_docs.as_ref();
    Ok(Endpoint {
        path_params: Some(parameter_group(translator, &parameters, ParameterLocation::Path)),
        query_params: Some(parameter_group(translator, &parameters, ParameterLocation::Query)),
        header_params: Some(parameter_group(translator, &parameters, ParameterLocation::Header)),
        body_params,
        body_optional,
        body_encoding,
        responses,
        name: operation.operation_id.as_deref().map(naming::identifier),
        doc: EndpointDoc {
            summary: operation.summary.clone(),
            description: operation.description.clone().or_else(|| external.and_then(|docs| docs.description.clone())),
            deprecated: operation.deprecated,
            see: external.and_then(|docs| docs.url.clone()),
        },
        ..Endpoint::new(url, method)
    })
}

/// Path-level parameters followed by the operation's; an operation entry
/// replaces a path-level one with the same name and location.
fn merged_parameters(shared: &[ParameterView], own: &[ParameterView]) -> Vec<ParameterView> {
    let mut merged = shared
        .iter()
        .filter(|parameter| {
            !own.iter().any(|other| other.name == parameter.name && other.location == parameter.location)
        })
        .cloned()
        .collect::<Vec<_>>();
    merged.extend(own.iter().cloned());
    merged
}

fn parameter_group(
    translator: &mut SchemaTranslator<'_>,
    parameters: &[ParameterView],
    location: ParameterLocation,
) -> Type {
    let fields = parameters
        .iter()
        .filter(|parameter| parameter.location == location)
        .map(|parameter| ObjectOfField {
            optional: !parameter.required,
            doc: parameter.description.clone(),
            default_value: parameter.default.clone(),
            ..ObjectOfField::new(parameter.name.clone(), translator.translate(&Value::Object(parameter.rest.clone())))
        })
        .collect();
    Type::object(fields)
}

fn endpoint_response(
    translator: &mut SchemaTranslator<'_>,
    status: StatusCode,
    response: &ResponseView,
) -> EndpointResponse {
    let ty = match (&response.schema, response.examples.get("application/json")) {
        (Some(schema), _) => translator.translate(schema),
        (None, Some(example)) => shape::infer(example),
        (None, None) => Type::Any,
    };
    let header = (!response.headers.is_empty()).then(|| {
        Type::object(
            response
                .headers
                .iter()
                .map(|(name, header)| {
                    ObjectOfField::new(name.clone(), translator.translate(header)).with_doc(description(header))
                })
                .collect(),
        )
    });
    EndpointResponse { status, ty, header }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn petstore() -> Value {
        json!({
            "swagger": "2.0",
            "basePath": "/v1",
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "summary": "List all pets",
                        "parameters": [
                            {"name": "limit", "in": "query", "type": "integer", "description": "How many"}
                        ],
                        "responses": {
                            "200": {
                                "description": "A paged array of pets",
                                "headers": {"x-next": {"type": "string", "description": "next page"}},
                                "schema": {"$ref": "#/definitions/Pets"}
                            },
                            "default": {"description": "error", "schema": {"$ref": "#/definitions/Error"}},
                            "x-internal": true
                        }
                    },
                    "post": {
                        "consumes": ["application/x-www-form-urlencoded"],
                        "parameters": [
                            {"name": "name", "in": "formData", "type": "string", "required": true},
                            {"name": "photo", "in": "formData", "type": "file"}
                        ],
                        "responses": {"201": {"description": "created"}}
                    }
                },
                "/pets/{petId}": {
                    "parameters": [
                        {"name": "petId", "in": "path", "required": true, "type": "integer"},
                        {"name": "x-trace", "in": "header", "type": "string"}
                    ],
                    "get": {
                        "operationId": "show-pet",
                        "deprecated": true,
                        "externalDocs": {"description": "see the guide", "url": "https://example.com"},
                        "parameters": [{"name": "petId", "in": "path", "required": true, "type": "string"}],
                        "responses": {
                            "200": {"description": "ok", "examples": {"application/json": {"id": 1, "name": "rex"}}}
                        }
                    },
                    "put": {
                        "parameters": [{"name": "pet", "in": "body", "schema": {"$ref": "#/definitions/Pet"}}],
                        "responses": {}
                    }
                },
                "x-extension": {}
            },
            "definitions": {
                "Pet": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
                },
                "Pets": {"type": "array", "items": {"$ref": "#/definitions/Pet"}},
                "Error": {"type": "object", "properties": {"message": {"type": "string"}}}
            }
        })
    }

    #[test]
    fn sniffs_the_swagger_field() {
        assert!(OpenApi2.is_match(&json!({"swagger": "2.0"})));
        assert!(OpenApi2.is_match(&json!({"swagger": 2.0})));
        assert!(!OpenApi2.is_match(&json!({"swagger": "1.2"})));
        assert!(!OpenApi2.is_match(&json!({"openapi": "3.0.0"})));
        assert!(!OpenApi2.is_match(&json!([])));
    }

    #[test]
    fn endpoints_in_document_and_method_order() {
        let api = OpenApi2.transform(&petstore()).unwrap();
        assert_eq!(api.base_url, "/v1");
        let summary = api
            .endpoints
            .iter()
            .map(|endpoint| (endpoint.url.as_str(), endpoint.method, endpoint.name.as_deref()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                ("/pets", HttpMethod::Get, Some("listPets")),
                ("/pets", HttpMethod::Post, None),
                ("/pets/{petId}", HttpMethod::Get, Some("show_pet")),
                ("/pets/{petId}", HttpMethod::Put, None),
            ]
        );
        let names = api.interfaces.iter().map(|reference| reference.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Pet", "Pets", "Error"]);
        assert!(api.types.contains("Pets"));
    }

    #[test]
    fn parameters_and_responses() {
        let api = OpenApi2.transform(&petstore()).unwrap();
        let list = &api.endpoints[0];
        let Some(Type::ObjectOf(query)) = &list.query_params else { panic!("expected query params") };
        let limit = query.get("limit").unwrap();
        assert!(limit.optional);
        assert_eq!(limit.value, Type::number());
        assert_eq!(limit.doc.as_deref(), Some("How many"));
        assert_eq!(list.path_params, Some(Type::object(Vec::new())));
        assert_eq!(list.body_params, None);

        let statuses = list.responses.iter().map(|response| response.status).collect::<Vec<_>>();
        assert_eq!(statuses, [StatusCode::Code(200), StatusCode::Default]);
        assert_eq!(list.responses[0].ty, Type::reference("Pets"));
        let Some(Type::ObjectOf(header)) = &list.responses[0].header else { panic!("expected a header type") };
        assert_eq!(header.get("x-next").unwrap().doc.as_deref(), Some("next page"));
        assert_eq!(list.doc.summary.as_deref(), Some("List all pets"));
    }

    #[test]
    fn form_bodies() {
        let api = OpenApi2.transform(&petstore()).unwrap();
        let create = &api.endpoints[1];
        assert_eq!(create.body_encoding, BodyEncoding::Form);
        let Some(Type::ObjectOf(form)) = &create.body_params else { panic!("expected a form body") };
        assert!(!form.get("name").unwrap().optional);
        assert_eq!(form.get("photo").unwrap().value, Type::Any);
        assert_eq!(create.responses[0].ty, Type::Any);
    }

    #[test]
    fn path_level_parameters_merge_and_docs_fall_back() {
        let api = OpenApi2.transform(&petstore()).unwrap();
        let show = &api.endpoints[2];
        let Some(Type::ObjectOf(path)) = &show.path_params else { panic!("expected path params") };
        assert_eq!(path.fields.len(), 1);
        assert_eq!(path.get("petId").unwrap().value, Type::string());
        let Some(Type::ObjectOf(headers)) = &show.header_params else { panic!("expected header params") };
        assert!(headers.get("x-trace").is_some());
        assert!(show.doc.deprecated);
        assert_eq!(show.doc.description.as_deref(), Some("see the guide"));
        assert_eq!(show.doc.see.as_deref(), Some("https://example.com"));

        let Type::ObjectOf(example) = &show.responses[0].ty else { panic!("expected a type inferred from the example") };
        assert_eq!(example.get("name").unwrap().value, Type::string());

        let replace = &api.endpoints[3];
        assert_eq!(replace.body_params, Some(Type::reference("Pet")));
        assert!(replace.body_optional);
        assert!(!api.endpoints[1].body_optional);
        assert!(replace.responses.is_empty());
    }

    #[test]
    fn invalid_operations_report_their_path() {
        let document = json!({
            "swagger": "2.0",
            "paths": {"/pets": {"get": {"parameters": [{"name": "id", "in": "cookie"}], "responses": {}}}}
        });
        let Err(Error::InvalidDocument { path, .. }) = OpenApi2.transform(&document) else {
            panic!("expected an invalid document")
        };
        assert!(path.starts_with("/paths/~1pets"), "{path}");
    }

    #[test]
    fn missing_base_path_is_root() {
        let api = OpenApi2.transform(&json!({"swagger": "2.0", "paths": {}})).unwrap();
        assert_eq!(api.base_url, "/");
        assert!(api.endpoints.is_empty());
        assert!(api.types.is_empty());
    }
}
