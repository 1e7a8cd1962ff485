//! Fan a generated batch out to downstream HTTP endpoints.
//!
//! Every target is attempted, concurrently and independently. A failing
//! target only affects its own outcome; the fanout itself never fails.

use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DeliverySettings;
use crate::domain::{DeliveryError, DeliveryOutcome, DeliveryTarget, GenerationResult};

#[derive(Debug, Clone, Default)]
pub struct DeliveryFanout {
    client: Client,
}

impl DeliveryFanout {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &DeliverySettings) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self::new(client))
    }

    /// POST `result` to every target. Outcomes come back in target order.
    pub async fn deliver(
        &self,
        result: &GenerationResult,
        targets: &[DeliveryTarget],
    ) -> Vec<DeliveryOutcome> {
        if targets.is_empty() {
            return Vec::new();
        }

        let outcomes = join_all(targets.iter().map(|target| self.deliver_one(result, target))).await;

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            attempted = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "delivery fanout finished"
        );
        outcomes
    }

    async fn deliver_one(&self, result: &GenerationResult, target: &DeliveryTarget) -> DeliveryOutcome {
        let response = self
            .client
            .post(target.as_str())
            .json(result.value())
            .send()
            .await;

        let result = match response {
            Ok(resp) if resp.status().is_success() => {
                info!(url = %target, status = resp.status().as_u16(), "data sent");
                Ok(resp.status().as_u16())
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                warn!(url = %target, status, "target rejected data");
                Err(DeliveryError::Rejected { status })
            }
            Err(e) => {
                warn!(url = %target, error = %e, "failed to send data");
                Err(DeliveryError::Transport(e.to_string()))
            }
        };

        DeliveryOutcome {
            target: target.clone(),
            result,
        }
    }
}
