use async_trait::async_trait;

pub mod builder;
pub mod error;
pub mod schema;

pub use builder::{RawFieldInput, RawNestedField, SchemaBuilder};
pub use error::{DeliveryError, GenerationError, TransportError, ValidationError};
pub use schema::{
    DeliveryOutcome, DeliveryTarget, FieldType, GenerationRequest, GenerationResult, NumericKind,
    Schema, SchemaField, StringConstraint,
};

/// Everything the generator collaborator wrote before it exited.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    /// `None` when the collaborator was killed by a signal or never exited.
    pub exit_code: Option<i32>,
}

/// Byte-level channel to the generator collaborator.
///
/// One call is one complete exchange: the payload is delivered whole, the
/// input side is closed, and the call returns once the collaborator is done.
#[async_trait]
pub trait GeneratorTransport: Send + Sync {
    async fn exchange(&self, payload: Vec<u8>) -> Result<GeneratorOutput, TransportError>;
}

/// Typed generation client used by the HTTP layer.
#[async_trait]
pub trait GeneratorPort: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError>;
}
