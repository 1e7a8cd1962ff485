use super::common;

use axum::http::StatusCode;
use common::receiver::Receiver;
use common::test_server::TestServer;
use dataforge::adapters::delivery::DeliveryFanout;
use dataforge::domain::{DeliveryError, DeliveryTarget, GenerationResult};
use serde_json::{json, Value};

#[tokio::test]
async fn test_failing_target_does_not_stop_the_others() {
    let failing = Receiver::start(StatusCode::INTERNAL_SERVER_ERROR).await;
    let healthy = Receiver::start(StatusCode::OK).await;
    let batch = GenerationResult::new(json!([{ "id": 1 }, { "id": 2 }]));

    let outcomes = DeliveryFanout::default()
        .deliver(
            &batch,
            &[
                DeliveryTarget::new(failing.url.clone()),
                DeliveryTarget::new(healthy.url.clone()),
            ],
        )
        .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].target.as_str(), failing.url);
    assert_eq!(outcomes[0].result, Err(DeliveryError::Rejected { status: 500 }));
    assert_eq!(outcomes[1].result, Ok(200));

    // Both targets saw the same batch.
    assert_eq!(failing.received(), vec![batch.value().clone()]);
    assert_eq!(healthy.received(), vec![batch.value().clone()]);
}

#[tokio::test]
async fn test_unreachable_target_is_reported_not_raised() {
    let healthy = Receiver::start(StatusCode::CREATED).await;

    // Nothing listens on port 9 of the loopback interface.
    let outcomes = DeliveryFanout::default()
        .deliver(
            &GenerationResult::new(json!([])),
            &[
                DeliveryTarget::new("http://127.0.0.1:9/ingest"),
                DeliveryTarget::new(healthy.url.clone()),
            ],
        )
        .await;

    assert!(matches!(outcomes[0].result, Err(DeliveryError::Transport(_))));
    assert_eq!(outcomes[1].result, Ok(201));
}

#[tokio::test]
async fn test_submit_delivers_batch_to_every_target() {
    let server = TestServer::new().await;
    let failing = Receiver::start(StatusCode::INTERNAL_SERVER_ERROR).await;
    let healthy = Receiver::start(StatusCode::OK).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/submit"))
        .json(&json!({
            "fields": [
                { "name": "user", "type": "name" },
                { "name": "score", "type": "integer", "min": 1, "max": 10 }
            ],
            "count": 2,
            "targets": format!("{}, {}", failing.url, healthy.url)
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["deliveries"][0]["success"], false);
    assert_eq!(body["deliveries"][0]["error"], "target responded with HTTP 500");
    assert_eq!(body["deliveries"][1]["success"], true);
    assert_eq!(body["deliveries"][1]["status"], 200);

    assert_eq!(failing.received(), vec![body["data"].clone()]);
    assert_eq!(healthy.received(), vec![body["data"].clone()]);
}
