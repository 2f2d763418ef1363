//! Command line: schema locations in, one TypeScript module per schema out.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;

use schema2ts::emit::GeneratorOptions;
use schema2ts::load;
use schema2ts::reduce::DEFAULT_DICTIONARY_THRESHOLD;
use schema2ts::template::{self, DEFAULT_LEADING_COMMENT, TemplateVariables};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate a typed TypeScript client from OpenAPI 2.0 (Swagger) documents
#[derive(Parser, Debug)]
#[command(name = "schema2ts", version)]
pub struct CommandLineInterface {
    /// One or more schemas. May be file paths, quoted glob patterns, http(s) URLs or '-' for stdin
    #[arg(long, num_args = 1..)]
    schema: Vec<String>,

    /// runtime template prepended to the output (file or URL); a bundled one is used if omitted
    #[arg(long)]
    template: Option<String>,

    /// output file, only valid with a single schema
    #[arg(long)]
    out: Option<PathBuf>,

    /// output directory; files are named after their schema
    #[arg(long = "outPath")]
    out_path: Option<PathBuf>,

    /// emit ambient declarations only (.d.ts)
    #[arg(short = 'd', long)]
    declaration: bool,

    /// use the .tsx extension
    #[arg(long)]
    tsx: bool,

    /// print the generated code instead of writing files
    #[arg(long = "noEmit")]
    no_emit: bool,

    /// comment placed before the template; supports %version%, %when% and %typescript-version%
    #[arg(long = "leadingComment")]
    leading_comment: Option<String>,

    /// objects merged from more keys than this become index signatures
    #[arg(long = "dictionaryThreshold", default_value_t = DEFAULT_DICTIONARY_THRESHOLD)]
    dictionary_threshold: usize,

    #[arg(long = "in", num_args = 1.., hide = true)]
    legacy_in: Vec<String>,

    #[arg(long = "dryrun", hide = true)]
    legacy_dryrun: bool,

    #[arg(long = "templateUrl", hide = true)]
    legacy_template_url: Option<String>,
}

/// Flags after legacy aliases are folded in.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    schemas: Vec<String>,
    template: Option<String>,
    no_emit: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let settings = self.settings();
        let schemas = resolve_schema_locations(&settings.schemas)?;
        if schemas.is_empty() {
            return Err(schema2ts::Error::NoSchema.into())
        }
        if self.out.is_some() && self.out_path.is_none() && schemas.len() > 1 {
            bail!("--out names a single file but {} schemas were given, use --outPath instead", schemas.len());
        }

        let template = match &settings.template {
            Some(location) => load::read_location(location).with_context(|| "failed to load the template")?,
            None => template::default_template(self.declaration).to_owned(),
        };
        let options = GeneratorOptions {
            declarations_only: self.declaration,
            leading_comment: Some(self.leading_comment.clone().unwrap_or_else(|| DEFAULT_LEADING_COMMENT.to_owned())),
            dictionary_threshold: self.dictionary_threshold,
            ..GeneratorOptions::default()
        };
        let variables = TemplateVariables::now();

        if settings.no_emit {
            for code in self.generate_all(&schemas, &template, &options, &variables)? {
                println!("{code}");
            }
            return Ok(())
        }
        // every target and every module is known before the first write
        let targets = self.targets(&schemas)?;
        let modules = targets
            .into_iter()
            .zip(self.generate_all(&schemas, &template, &options, &variables)?)
            .collect::<Vec<_>>();
        write_all(&modules)?;
        for (schema, (out, _)) in schemas.iter().zip(&modules) {
            eprintln!("{} {} → {}", "generated".green().bold(), schema, out.display());
        }
        Ok(())
    }

    /// Independent runs, one per schema. Fails with the first schema (in
    /// argument order) that could not be generated.
    fn generate_all(
        &self,
        schemas: &[String],
        template: &str,
        options: &GeneratorOptions,
        variables: &TemplateVariables,
    ) -> anyhow::Result<Vec<String>> {
        let generated = schemas
            .par_iter()
            .map(|schema| schema2ts::api::generate_from_location(schema, template, options, variables))
            .collect::<Vec<_>>();
        schemas
            .iter()
            .zip(generated)
            .map(|(schema, result)| result.with_context(|| format!("failed to generate code for `{schema}`")))
            .collect()
    }

    /// Output file of every schema; two schemas may not share one.
    fn targets(&self, schemas: &[String]) -> anyhow::Result<Vec<PathBuf>> {
        let mut seen = HashMap::<PathBuf, &str>::new();
        let mut targets = Vec::with_capacity(schemas.len());
        for schema in schemas {
            let out = self.output_path(schema);
            if let Some(first) = seen.insert(out.clone(), schema.as_str()) {
                bail!("`{first}` and `{schema}` would both be written to {}", out.display());
            }
            targets.push(out);
        }
        Ok(targets)
    }

    fn settings(&self) -> Settings {
        let mut settings = Settings {
            schemas: self.schema.clone(),
            template: self.template.clone(),
            no_emit: self.no_emit,
        };
        if !self.legacy_in.is_empty() {
            deprecated("--in", "--schema");
            settings.schemas.extend(self.legacy_in.iter().cloned());
        }
        if self.legacy_dryrun {
            deprecated("--dryrun", "--noEmit");
            settings.no_emit = true;
        }
        if let Some(url) = &self.legacy_template_url {
            deprecated("--templateUrl", "--template");
            settings.template.get_or_insert_with(|| url.clone());
        }
        settings
    }

    /// `--outPath` wins over `--out`; without either the file lands in the
    /// working directory.
    fn output_path(&self, schema: &str) -> PathBuf {
        let file_name = file_name_in_ts(&schema_stem(schema), self.declaration, self.tsx);
        match (&self.out_path, &self.out) {
            (Some(dir), _) => dir.join(file_name),
            (None, Some(out)) => out.clone(),
            (None, None) => PathBuf::from(".").join(file_name),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn deprecated(flag: &str, replacement: &str) {
    eprintln!(
        "{} {} is deprecated, use {} instead",
        "warning:".yellow().bold(),
        flag.yellow(),
        replacement.green()
    );
}

/// Stages every module next to its target, then renames them into place.
/// A failed stage removes what was staged so far.
fn write_all(modules: &[(PathBuf, String)]) -> anyhow::Result<()> {
    let mut staged = Vec::with_capacity(modules.len());
    for (out, code) in modules {
        match stage(out, code) {
            Ok(partial) => staged.push(partial),
            Err(error) => {
                for partial in &staged {
                    let _ = std::fs::remove_file(partial);
                }
                return Err(error)
            }
        }
    }
    for (partial, (out, _)) in staged.iter().zip(modules) {
        std::fs::rename(partial, out).with_context(|| format!("failed to write {}", out.display()))?;
    }
    Ok(())
}

fn stage(out: &Path, code: &str) -> anyhow::Result<PathBuf> {
    if let Some(parent) = out.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut partial = out.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);
    std::fs::write(&partial, code).with_context(|| format!("failed to write {}", partial.display()))?;
    Ok(partial)
}

/// `petstore` + declaration + tsx is `petstore.d.tsx`.
fn file_name_in_ts(stem: &str, declaration: bool, tsx: bool) -> String {
    let declaration = if declaration { ".d" } else { "" };
    let x = if tsx { "x" } else { "" };
    format!("{stem}{declaration}.ts{x}")
}

fn schema_stem(location: &str) -> String {
    if location == load::STDIN {
        return "schema".to_owned()
    }
    // query strings and trailing slashes do not name the file
    let path = location.split(['?', '#']).next().unwrap_or(location).trim_end_matches('/');
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "schema".to_owned())
}

/// URLs and stdin are taken literally; everything else may be a glob.
fn resolve_schema_locations(locations: &[String]) -> anyhow::Result<Vec<String>> {
    let mut out = Vec::with_capacity(locations.len());
    for location in locations {
        if load::is_url(location) || location == load::STDIN {
            out.push(location.clone());
            continue
        }
        for path in resolve_file_path_patterns([location])? {
            out.push(path.to_string_lossy().into_owned());
        }
    }
    Ok(out)
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matched nothing is an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandLineInterface {
        CommandLineInterface::try_parse_from(std::iter::once("schema2ts").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn legacy_flags_map_to_their_replacements() {
        let cli = parse(&["--in", "a.json", "--dryrun", "--templateUrl", "https://example.com/t.ts"]);
        assert_eq!(
            cli.settings(),
            Settings {
                schemas: vec!["a.json".into()],
                template: Some("https://example.com/t.ts".into()),
                no_emit: true,
            }
        );
        let cli = parse(&["--schema", "b.json", "--template", "mine.ts", "--templateUrl", "https://example.com/t.ts"]);
        assert_eq!(cli.settings().template.as_deref(), Some("mine.ts"));
    }

    #[test]
    fn output_paths() {
        assert_eq!(
            parse(&["--schema", "specs/petstore.yaml"]).output_path("specs/petstore.yaml"),
            PathBuf::from("./petstore.ts")
        );
        assert_eq!(
            parse(&["-d", "--tsx", "--outPath", "out"]).output_path("petstore.json"),
            PathBuf::from("out/petstore.d.tsx")
        );
        assert_eq!(parse(&["--out", "client.ts"]).output_path("petstore.json"), PathBuf::from("client.ts"));
        assert_eq!(
            parse(&[]).output_path("https://petstore.swagger.io/v2/swagger.json?format=raw"),
            PathBuf::from("./swagger.ts")
        );
        assert_eq!(parse(&[]).output_path("-"), PathBuf::from("./schema.ts"));
    }

    #[test]
    fn urls_and_stdin_are_not_globbed() {
        let locations = vec!["https://example.com/api?x=[1]".to_owned(), "-".to_owned(), "plain.json".to_owned()];
        assert_eq!(resolve_schema_locations(&locations).unwrap(), locations);
        assert!(resolve_schema_locations(&["no/such/dir/*.json".to_owned()]).is_err());
    }

    const PETSTORE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/petstore.json");

    #[test]
    fn modules_land_in_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out").join("nested");
        parse(&["--schema", PETSTORE, "--outPath", out.to_str().unwrap()]).run().unwrap();
        let code = std::fs::read_to_string(out.join("petstore.ts")).unwrap();
        assert!(code.contains("export async function listPets("));
        assert!(!out.join("petstore.ts.partial").exists());
    }

    #[test]
    fn nothing_is_written_when_one_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ swagger: [").unwrap();
        let out = dir.path().join("out");
        let cli = parse(&["--schema", PETSTORE, broken.to_str().unwrap(), "--outPath", out.to_str().unwrap()]);
        assert!(cli.run().is_err());
        assert!(!out.join("petstore.ts").exists());
        assert!(!out.exists());
    }

    #[test]
    fn a_failed_write_leaves_no_earlier_module_behind() {
        let dir = tempfile::tempdir().unwrap();
        // a file where a directory is needed
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let first = dir.path().join("out").join("a.ts");
        let modules = vec![(first.clone(), "a".to_owned()), (blocker.join("b.ts"), "b".to_owned())];
        assert!(write_all(&modules).is_err());
        assert!(!first.exists());
        assert!(!dir.path().join("out").join("a.ts.partial").exists());
    }

    #[test]
    fn schemas_sharing_a_target_are_rejected() {
        let cli = parse(&["--outPath", "out"]);
        let err = cli.targets(&["a/petstore.json".into(), "b/petstore.yaml".into()]).unwrap_err();
        assert!(err.to_string().contains("`a/petstore.json` and `b/petstore.yaml`"), "{err}");
        assert_eq!(cli.targets(&["a/petstore.json".into(), "b/users.json".into()]).unwrap().len(), 2);
    }

    #[test]
    fn flags_use_their_camel_case_names() {
        let cli = parse(&[
            "--schema", "a.json", "b.json", "--noEmit", "--leadingComment", "// hi", "--dictionaryThreshold", "5",
        ]);
        assert_eq!(cli.schema, ["a.json", "b.json"]);
        assert!(cli.no_emit);
        assert_eq!(cli.leading_comment.as_deref(), Some("// hi"));
        assert_eq!(cli.dictionary_threshold, 5);
    }
}
