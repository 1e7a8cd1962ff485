use async_trait::async_trait;

use crate::adapters::faker::RecordSynthesizer;
use crate::domain::{GenerationRequest, GeneratorOutput, GeneratorTransport, TransportError};

/// Runs the record synthesizer in-process while speaking the same byte
/// protocol as the `dataforge-generator` binary.
#[derive(Debug, Default, Clone)]
pub struct BuiltinTransport {
    synthesizer: RecordSynthesizer,
}

impl BuiltinTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(synthesizer: RecordSynthesizer, payload: &[u8]) -> GeneratorOutput {
        let request: GenerationRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(e) => {
                return GeneratorOutput {
                    stdout: Vec::new(),
                    stderr: format!("ERROR: {}", e),
                    exit_code: Some(1),
                }
            }
        };

        let records = synthesizer.generate_batch(&request.schema, request.count);
        match serde_json::to_vec(&records) {
            Ok(stdout) => GeneratorOutput {
                stdout,
                stderr: String::new(),
                exit_code: Some(0),
            },
            Err(e) => GeneratorOutput {
                stdout: Vec::new(),
                stderr: format!("ERROR: {}", e),
                exit_code: Some(1),
            },
        }
    }
}

#[async_trait]
impl GeneratorTransport for BuiltinTransport {
    async fn exchange(&self, payload: Vec<u8>) -> Result<GeneratorOutput, TransportError> {
        let synthesizer = self.synthesizer;
        tokio::task::spawn_blocking(move || Self::run(synthesizer, &payload))
            .await
            .map_err(|e| TransportError::Task(e.to_string()))
    }
}
