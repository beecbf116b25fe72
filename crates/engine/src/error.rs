use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Engine failure in {stage} stage (input {input_hash}): {message}")]
    EngineFailure {
        stage: &'static str,
        input_hash: String,
        message: String,
    },
}

impl ResolveError {
    /// Stable code for machine-readable error envelopes.
    pub const fn code(&self) -> &'static str {
        match self {
            ResolveError::EmptyInput => "empty_input",
            ResolveError::EngineFailure { .. } => "engine_failure",
        }
    }
}

/// Failure of the external text-generation collaborator. Never leaves the
/// interpretation generator.
#[derive(Error, Debug)]
pub enum ExternalServiceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),
}
