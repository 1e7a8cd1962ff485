//! Generator collaborator.
//!
//! With a piped stdin it reads one `{schema, count}` request and writes the
//! generated JSON array to stdout. From a terminal it reads a schema file,
//! prints the records and optionally POSTs them to delivery targets.

use anyhow::Context;
use clap::Parser;
use dataforge::adapters::delivery::DeliveryFanout;
use dataforge::adapters::faker::RecordSynthesizer;
use dataforge::config::DeliverySettings;
use dataforge::domain::{DeliveryTarget, GenerationRequest, GenerationResult, Schema};
use serde_json::json;
use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dataforge-generator", version, about = "Generate synthetic records from a schema")]
struct GeneratorCli {
    /// Schema file, created with an example schema when missing
    #[arg(short, long, default_value = "example-schema.json")]
    schema: PathBuf,

    /// Number of records to generate
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// Comma-separated URLs to POST the generated records to
    #[arg(short, long)]
    api: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let result = if std::io::stdin().is_terminal() {
        run_cli(GeneratorCli::parse()).await
    } else {
        run_stdin()
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_stdin() -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request from stdin")?;

    let request: GenerationRequest =
        serde_json::from_str(&input).context("invalid generation request")?;
    let request = GenerationRequest::new(request.schema, request.count)?;

    let records = RecordSynthesizer::new().generate_batch(&request.schema, request.count);
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, &records)?;
    stdout.flush()?;
    Ok(())
}

async fn run_cli(cli: GeneratorCli) -> anyhow::Result<()> {
    ensure_schema_file(&cli.schema)?;

    let text = std::fs::read_to_string(&cli.schema)
        .with_context(|| format!("failed to read {}", cli.schema.display()))?;
    let schema: Schema = serde_json::from_str(&text)
        .with_context(|| format!("invalid schema in {}", cli.schema.display()))?;
    let request = GenerationRequest::new(schema, cli.count)?;

    let records = RecordSynthesizer::new().generate_batch(&request.schema, request.count);
    println!("{}", serde_json::to_string_pretty(&records)?);

    let targets = cli
        .api
        .as_deref()
        .map(DeliveryTarget::parse_list)
        .unwrap_or_default();
    if !targets.is_empty() {
        let fanout = DeliveryFanout::from_settings(&DeliverySettings::default())?;
        let outcomes = fanout
            .deliver(&GenerationResult::new(json!(records)), &targets)
            .await;
        for outcome in outcomes {
            match &outcome.result {
                Ok(status) => eprintln!("Sent to {} (HTTP {})", outcome.target, status),
                Err(e) => eprintln!("Failed to send to {}: {}", outcome.target, e),
            }
        }
    }
    Ok(())
}

fn ensure_schema_file(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        info!(path = %path.display(), "using existing schema file");
        return Ok(());
    }
    let example = serde_json::to_string_pretty(&example_schema())?;
    std::fs::write(path, example)
        .with_context(|| format!("failed to create schema file {}", path.display()))?;
    warn!(path = %path.display(), "schema file not found, wrote example schema");
    Ok(())
}

fn example_schema() -> serde_json::Value {
    json!({
        "primitive_string": { "type": "string" },
        "string_with_regex": { "type": "string", "regex": "^[A-Z]{3}[0-9]{2}$" },
        "string_with_enum": { "type": "string", "enum": ["red", "green", "blue"] },
        "integer_basic": { "type": "integer" },
        "integer_with_range": { "type": "integer", "min": 10, "max": 100 },
        "float_basic": { "type": "float" },
        "float_with_range": { "type": "float", "min": 0.5, "max": 99.9 },
        "boolean_field": { "type": "boolean" },
        "uuid_field": { "type": "uuid" },
        "name_field": { "type": "name" },
        "email_field": { "type": "email" },
        "phone_field": { "type": "phone" },
        "date_field": { "type": "date", "min": "2000-01-01", "max": "2030-12-31" },
        "image_url_field": { "type": "image_url" },
        "file_url_field": { "type": "file_url" },
        "array_of_integers": {
            "type": "array",
            "length": 5,
            "items": { "type": "integer", "min": 1, "max": 50 }
        },
        "array_of_strings": {
            "type": "array",
            "length": 3,
            "items": { "type": "string", "enum": ["apple", "banana", "cherry"] }
        },
        "nested_object": {
            "type": "object",
            "schema": {
                "street": { "type": "string" },
                "city": { "type": "string" },
                "zipcode": { "type": "integer", "min": 10000, "max": 99999 },
                "coordinates": {
                    "type": "object",
                    "schema": {
                        "lat": { "type": "float", "min": -90, "max": 90 },
                        "lng": { "type": "float", "min": -180, "max": 180 }
                    }
                }
            }
        }
    })
}
