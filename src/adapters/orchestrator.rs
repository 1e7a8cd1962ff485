//! Drives one request/response round trip with the generator collaborator.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{GeneratorMode, GeneratorSettings};
use crate::domain::{
    GenerationError, GenerationRequest, GenerationResult, GeneratorPort, GeneratorTransport,
};

use super::builtin_transport::BuiltinTransport;
use super::process_transport::ProcessTransport;

pub struct GenerationOrchestrator {
    transport: Arc<dyn GeneratorTransport>,
    timeout: Option<Duration>,
    empty_output_is_error: bool,
}

impl GenerationOrchestrator {
    pub fn new(transport: Arc<dyn GeneratorTransport>) -> Self {
        Self {
            transport,
            timeout: None,
            empty_output_is_error: false,
        }
    }

    /// Build an orchestrator with the transport selected by `settings.mode`.
    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        let transport: Arc<dyn GeneratorTransport> = match settings.mode {
            GeneratorMode::Process => Arc::new(ProcessTransport::from_settings(settings)),
            GeneratorMode::Builtin => Arc::new(BuiltinTransport::new()),
        };
        let mut orchestrator = Self::new(transport).strict_empty_output(settings.empty_output_is_error);
        if let Some(secs) = settings.timeout_seconds {
            orchestrator = orchestrator.with_timeout(Duration::from_secs(secs));
        }
        orchestrator
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn strict_empty_output(mut self, strict: bool) -> Self {
        self.empty_output_is_error = strict;
        self
    }
}

#[async_trait]
impl GeneratorPort for GenerationOrchestrator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let payload = serde_json::to_vec(request)?;
        debug!(
            fields = request.schema.len(),
            count = request.count,
            "sending generation request"
        );

        let exchange = self.transport.exchange(payload);
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| {
                    error!(timeout_ms = limit.as_millis() as u64, "generator timed out");
                    GenerationError::Timeout(limit)
                })?,
            None => exchange.await,
        }
        .map_err(|e| {
            error!(error = %e, "generator unavailable");
            GenerationError::GeneratorUnavailable(e.to_string())
        })?;

        if !output.stderr.trim().is_empty() {
            warn!(stderr = %output.stderr.trim(), "generator wrote diagnostics");
        }
        if output.exit_code != Some(0) {
            warn!(exit_code = ?output.exit_code, "generator exited abnormally");
        }

        let text = String::from_utf8_lossy(&output.stdout);
        if text.trim().is_empty() {
            if self.empty_output_is_error {
                error!("generator produced no output");
                return Err(GenerationError::EmptyGeneratorOutput);
            }
            warn!("generator produced no output, returning an empty result");
            return Ok(GenerationResult::empty());
        }

        match serde_json::from_str(&text) {
            Ok(value) => {
                let result = GenerationResult::new(value);
                info!(
                    records = result.records().map(<[_]>::len),
                    "generation complete"
                );
                Ok(result)
            }
            Err(e) => {
                error!(raw = %text, error = %e, "invalid JSON from generator");
                Err(GenerationError::MalformedGeneratorOutput {
                    raw: text.into_owned(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
