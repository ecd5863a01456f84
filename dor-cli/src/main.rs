//! DOR CLI - JSON Pointer and schema-annotation tooling for repository objects
//!
//! This binary provides command-line interfaces for:
//! - encode / decode: build and split RFC 6901 pointers
//! - get / set: read or replace the value at a pointer
//! - form-path: schema path and form name for a pointer
//! - extract: annotated subschema per pointer
//! - preview: preview fields of an object
//! - validate: full validation report
//! - render: editor inputs bound to each pointer
//! - label-edge: relationship edges and their labels

mod config;

use clap::{Parser, Subcommand};
use config::{CliConfig, CliError};
use dor_form::{pointer_for_render_node, FormRenderer};
use dor_pointer::{pointer_to_form_path, JsonPointer};
use dor_schema::{
    label_edge, outgoing_references, prettify_preview, preview_entries, validate_document,
    ExtractorConfig, RelationshipEdge, SchemaPointerExtractor,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dor")]
#[command(about = "JSON Pointer and schema-annotation toolkit for repository objects")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Annotation keyword (overrides the configuration file)
    #[arg(long, global = true)]
    keyword: Option<String>,
    /// Log filter, e.g. `debug` or `dor_schema=trace` (defaults to RUST_LOG, then `warn`)
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an escaped pointer from raw segments
    ///
    /// Examples:
    ///   dor encode a/b '~x'     # prints /a~1b/~0x
    Encode {
        /// Raw (unescaped) segments
        segments: Vec<String>,
    },
    /// Split a pointer into raw segments (strict)
    Decode {
        /// Escaped pointer
        pointer: String,
    },
    /// Print the value at a pointer
    Get {
        /// JSON document
        document: PathBuf,
        /// Escaped pointer
        pointer: String,
    },
    /// Replace the existing value at a pointer
    Set {
        /// JSON document
        document: PathBuf,
        /// Escaped pointer
        pointer: String,
        /// New value as JSON text
        value: String,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Schema path and form name for a pointer
    FormPath {
        /// Escaped pointer
        pointer: String,
    },
    /// Map every annotated pointer to its subschema
    Extract {
        /// JSON schema
        schema: PathBuf,
        /// JSON document
        document: PathBuf,
    },
    /// Preview fields of a document
    Preview {
        /// JSON schema
        schema: PathBuf,
        /// JSON document
        document: PathBuf,
        /// Truncate display text to this many characters
        #[arg(long)]
        max_chars: Option<usize>,
    },
    /// Validate a document; exits non-zero when issues are found
    Validate {
        /// JSON schema
        schema: PathBuf,
        /// JSON document
        document: PathBuf,
    },
    /// Render the editor model and list inputs by pointer
    Render {
        /// JSON schema
        schema: PathBuf,
        /// JSON document
        document: PathBuf,
    },
    /// List or label relationship edges created by handle references
    ///
    /// Examples:
    ///   dor label-edge schema.json obj.json --from 20.5000/obj
    ///   dor label-edge schema.json obj.json --from 20.5000/obj --to 20.5000/p --pointer /owner
    LabelEdge {
        /// JSON schema
        schema: PathBuf,
        /// JSON document of the source object
        document: PathBuf,
        /// Identifier of the source object
        #[arg(long)]
        from: String,
        /// Identifier of the target object
        #[arg(long, requires = "pointer")]
        to: Option<String>,
        /// Pointer of the reference field
        #[arg(long, requires = "to")]
        pointer: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(keyword) = cli.keyword {
        config.extractor.keyword = keyword;
    }
    config.limits.validate()?;
    config.extractor.validate()?;
    debug!(?config, "configuration loaded");

    let output = match cli.command {
        Commands::Encode { segments } => json!(JsonPointer::from_segments(segments).to_string()),
        Commands::Decode { pointer } => {
            let parsed = JsonPointer::parse_strict(&pointer, &config.limits)?;
            json!(parsed.segments())
        }
        Commands::Get { document, pointer } => {
            let parsed = JsonPointer::parse_strict(&pointer, &config.limits)?;
            let document = read_json(&document)?;
            parsed
                .get(&document)
                .cloned()
                .ok_or(CliError::Missing { pointer })?
        }
        Commands::Set {
            document,
            pointer,
            value,
            output,
        } => {
            let parsed = JsonPointer::parse_strict(&pointer, &config.limits)?;
            return handle_set(&document, &parsed, &value, output.as_deref(), cli.pretty);
        }
        Commands::FormPath { pointer } => serde_json::to_value(pointer_to_form_path(&pointer))?,
        Commands::Extract { schema, document } => {
            let (schema, document) = (read_json(&schema)?, read_json(&document)?);
            let extractor = SchemaPointerExtractor::new(config.extractor)?;
            extractor.extract(&document, &schema)?.to_json()
        }
        Commands::Preview {
            schema,
            document,
            max_chars,
        } => handle_preview(&schema, &document, config.extractor, max_chars)?,
        Commands::Validate { schema, document } => {
            let (schema, document) = (read_json(&schema)?, read_json(&document)?);
            let issues = validate_document(&schema, &document)?;
            print_json(&issues, cli.pretty)?;
            if !issues.is_empty() {
                return Err(CliError::Invalid {
                    count: issues.len(),
                }
                .into());
            }
            return Ok(());
        }
        Commands::Render { schema, document } => handle_render(&schema, &document, &config)?,
        Commands::LabelEdge {
            schema,
            document,
            from,
            to,
            pointer,
        } => handle_label_edge(&schema, &document, config.extractor, from, to.zip(pointer))?,
    };

    print_json(&output, cli.pretty)
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json(path: &Path) -> Result<Value, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn to_json_text<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn Error>> {
    let text = to_json_text(value, pretty)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    Ok(())
}

fn handle_set(
    document_path: &Path,
    pointer: &JsonPointer,
    value: &str,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let mut document = read_json(document_path)?;
    let value: Value = serde_json::from_str(value)?;
    let previous = pointer
        .replace(&mut document, value)
        .ok_or_else(|| CliError::Missing {
            pointer: pointer.to_string(),
        })?;
    info!(%pointer, %previous, "value replaced");

    match output {
        Some(path) => {
            let mut text = to_json_text(&document, pretty)?;
            text.push('\n');
            fs::write(path, text)?;
            Ok(())
        }
        None => print_json(&document, pretty),
    }
}

fn handle_preview(
    schema: &Path,
    document: &Path,
    extractor: ExtractorConfig,
    max_chars: Option<usize>,
) -> Result<Value, Box<dyn Error>> {
    let (schema, document) = (read_json(schema)?, read_json(document)?);
    let keyword = extractor.keyword.clone();
    let map = SchemaPointerExtractor::new(extractor)?.extract(&document, &schema)?;

    let mut rows = Vec::new();
    for entry in preview_entries(&document, &map, &keyword) {
        let text = prettify_preview(&entry.value, max_chars);
        let mut row = serde_json::to_value(&entry)?;
        if let Value::Object(fields) = &mut row {
            fields.insert("text".to_string(), Value::String(text));
        }
        rows.push(row);
    }
    Ok(Value::Array(rows))
}

fn handle_render(schema: &Path, document: &Path, config: &CliConfig) -> Result<Value, Box<dyn Error>> {
    let (schema, document) = (read_json(schema)?, read_json(document)?);
    let form = FormRenderer::new(config.extractor.max_ref_depth).render(&schema, &document)?;

    let mut inputs = Vec::with_capacity(form.index.len());
    for (pointer, input) in form.index.sorted() {
        let container = form.tree.parent(input);
        inputs.push(json!({
            "pointer": pointer,
            "node": input,
            "name": form.tree.name(input),
            "schemaPath": container.and_then(|c| form.tree.schema_path(c)),
            "value": form.tree.value(input),
            "recovered": pointer_for_render_node(&form.tree, input)?,
        }));
    }
    Ok(json!({ "nodes": form.tree.len(), "inputs": inputs }))
}

fn handle_label_edge(
    schema: &Path,
    document: &Path,
    extractor: ExtractorConfig,
    from: String,
    target: Option<(String, String)>,
) -> Result<Value, Box<dyn Error>> {
    let (schema, document) = (read_json(schema)?, read_json(document)?);
    let keyword = extractor.keyword.clone();
    let map = SchemaPointerExtractor::new(extractor)?.extract(&document, &schema)?;

    let mut edges = match target {
        Some((to, pointer)) => {
            let pointer: JsonPointer = pointer.parse()?;
            vec![RelationshipEdge::new(from, to, pointer.to_string())]
        }
        None => outgoing_references(&from, &document, &map, &keyword),
    };
    for edge in &mut edges {
        label_edge(edge, &document, &map, &keyword);
    }
    Ok(serde_json::to_value(edges)?)
}
