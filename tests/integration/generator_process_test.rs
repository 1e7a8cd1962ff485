use super::common;

use common::test_server::TestServer;
use dataforge::adapters::orchestrator::GenerationOrchestrator;
use dataforge::adapters::process_transport::ProcessTransport;
use dataforge::config::{GeneratorMode, GeneratorSettings};
use dataforge::domain::{
    GenerationError, GenerationRequest, GeneratorPort, Schema, SchemaField, StringConstraint,
};
use serde_json::{json, Value};
use std::sync::Arc;

const GENERATOR_BIN: &str = env!("CARGO_BIN_EXE_dataforge-generator");

fn code_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(
        "code",
        SchemaField::Text(StringConstraint::Regex("^[a-z]{3}$".to_string())),
    );
    schema
}

#[tokio::test]
async fn test_generator_binary_round_trip() {
    let orchestrator =
        GenerationOrchestrator::new(Arc::new(ProcessTransport::new(GENERATOR_BIN)));
    let request = GenerationRequest::new(code_schema(), 3).unwrap();

    let result = orchestrator.generate(&request).await.unwrap();

    let records = result.records().unwrap();
    assert_eq!(records.len(), 3);
    for record in records {
        let code = record["code"].as_str().unwrap();
        assert_eq!(code.len(), 3);
        assert!(code.chars().all(|c| c.is_ascii_lowercase()));
    }
}

#[tokio::test]
async fn test_missing_generator_is_unavailable() {
    let orchestrator = GenerationOrchestrator::new(Arc::new(ProcessTransport::new(
        "/nonexistent/dataforge-generator",
    )));
    let request = GenerationRequest::new(code_schema(), 1).unwrap();

    let err = orchestrator.generate(&request).await.unwrap_err();
    assert!(matches!(err, GenerationError::GeneratorUnavailable(_)));
}

#[tokio::test]
async fn test_generate_endpoint_with_process_generator() {
    let server = TestServer::with_generator(GeneratorSettings {
        mode: GeneratorMode::Process,
        command: GENERATOR_BIN.to_string(),
        ..GeneratorSettings::default()
    })
    .await;

    let response = reqwest::Client::new()
        .post(server.url("/generate"))
        .json(&json!({
            "schema": {
                "id": { "type": "uuid" },
                "tags": { "type": "array", "length": 2, "items": { "type": "string", "enum": ["a", "b"] } }
            },
            "count": 5
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 5);
    for record in records {
        assert_eq!(record["tags"].as_array().unwrap().len(), 2);
    }
}
