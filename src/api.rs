//! Orchestration: schema location or text in, generated module text out.
use serde_json::Value;

use crate::adapter::Registry;
use crate::emit::{self, GeneratorOptions};
use crate::error::{Error, Result};
use crate::load;
use crate::template::{self, TemplateVariables};

/// Deterministic core of a run: adapter, then emitter, then
/// `%variable%` injection.
pub fn generate_document(
    document: &Value,
    template: &str,
    options: &GeneratorOptions,
    registry: &Registry,
    variables: &TemplateVariables,
) -> Result<String> {
    let api = registry.transform(document)?;
    log::info!("{} endpoints, {} named types", api.endpoints.len(), api.types.len());
    let code = emit::generate(api, template, options)?;
    Ok(template::inject_template_variables(&code, variables))
}

/// Parses JSON or YAML text and generates from it.
pub fn generate_from_text(
    text: &str,
    template: &str,
    options: &GeneratorOptions,
    variables: &TemplateVariables,
) -> Result<String> {
    if text.trim().is_empty() {
        return Err(Error::NoSchema)
    }
    let document = load::parse_json_or_yaml(text)?;
    generate_document(&document, template, options, &Registry::default(), variables)
}

/// Reads the schema from its location (file path, URL or `-`) and generates
/// from it. The template is text already read by the caller, so one template
/// serves many schemas.
pub fn generate_from_location(
    schema: &str,
    template: &str,
    options: &GeneratorOptions,
    variables: &TemplateVariables,
) -> Result<String> {
    let text = load::read_location(schema)?;
    generate_from_text(&text, template, options, variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PETSTORE_JSON: &str = include_str!("../fixtures/petstore.json");
    const PETSTORE_YAML: &str = include_str!("../fixtures/petstore.yaml");

    fn variables() -> TemplateVariables {
        TemplateVariables {
            version: "0.0.0-test".into(),
            when: "2020-01-01T00:00:00Z".into(),
            typescript_version: template::TYPESCRIPT_VERSION.into(),
        }
    }

    fn options() -> GeneratorOptions {
        GeneratorOptions { leading_comment: Some("// %version% at %when%".into()), ..GeneratorOptions::default() }
    }

    fn generate(text: &str) -> String {
        generate_from_text(text, "// template", &options(), &variables()).unwrap()
    }

    #[test]
    fn petstore_module() {
        let output = generate(PETSTORE_JSON);
        assert!(output.starts_with("// 0.0.0-test at 2020-01-01T00:00:00Z\n// template\n"));
        assert!(output.contains("export const listPets_url = \"/pets\";\nexport const listPets_method = \"get\";"));
        assert!(output.contains(
            "export async function listPets(query: listPets_parameter_query): Promise<_Response<200, Pets, listPets_response_header_200> | _Response<\"default\", Error>> {"
        ));
        assert!(output.contains(
            "export async function showPetById(path: showPetById_parameter_path): Promise<_Response<200, Pet> | _Response<\"default\", Error>> {"
        ));
        assert!(output.contains("export interface showPetById_parameter_path {\n    /** The id of the pet to retrieve */\n    \"petId\": string;\n}"));
        assert!(output.contains("export type Pets = Pet[];"));
        assert!(output.contains("export enum Status {\n    available = \"available\",\n    pending = \"pending\",\n    sold = \"sold\"\n}"));
        assert!(output.contains("    \"status\"?: Status;"));
        assert!(output.contains("return _.request(createPets_url, createPets_method, { body, bodyType: \"json\" });"));
    }

    #[test]
    fn yaml_and_json_fixtures_agree() {
        assert_eq!(generate(PETSTORE_YAML), generate(PETSTORE_JSON));
    }

    #[test]
    fn reruns_are_byte_identical() {
        assert_eq!(generate(PETSTORE_JSON), generate(PETSTORE_JSON));
    }

    #[test]
    fn declarations_only_output() {
        let options = GeneratorOptions { declarations_only: true, ..options() };
        let output = generate_from_text(
            PETSTORE_JSON,
            template::DEFAULT_DECLARATION_TEMPLATE,
            &options,
            &variables(),
        )
        .unwrap();
        assert!(output.contains("export declare const _: {"));
        assert!(output.contains("export declare function showPetById(path: showPetById_parameter_path)"));
        assert!(!output.contains("export async function"));
    }

    #[test]
    fn fixtures_are_read_from_their_location() {
        let location = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/petstore.json");
        let output = generate_from_location(location, "// template", &options(), &variables()).unwrap();
        assert_eq!(output, generate(PETSTORE_JSON));
        assert!(matches!(
            generate_from_location("./fixtures/missing.json", "", &options(), &variables()),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn input_errors() {
        let template = "";
        assert!(matches!(
            generate_from_text("  \n", template, &options(), &variables()),
            Err(Error::NoSchema)
        ));
        assert!(matches!(
            generate_from_text("{\"openapi\": \"3.0.0\"}", template, &options(), &variables()),
            Err(Error::UnknownDialect)
        ));
        assert!(matches!(
            generate_from_text("{ swagger: [", template, &options(), &variables()),
            Err(Error::Unparsable { .. })
        ));
    }
}
