//! Shared error type for the pipeline: one `thiserror` enum with an
//! `http_status` mapping so the server crate never re-derives status
//! codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IronGateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("recognizer timed out: {0}")]
    RecognizerTimeout(String),

    #[error("chain append failed: {0}")]
    ChainAppendFailed(String),

    #[error("chain verification failed at position {0}")]
    ChainVerificationFailed(u64),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IronGateError {
    pub fn http_status(&self) -> u16 {
        match self {
            IronGateError::InvalidInput(_) => 400,
            IronGateError::RecognizerTimeout(_) => 200, // swallowed, never surfaced
            IronGateError::ChainAppendFailed(_) => 500,
            IronGateError::ChainVerificationFailed(_) => 500,
            IronGateError::SendFailed(_) => 502,
            IronGateError::SessionNotFound(_) => 404,
            IronGateError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, IronGateError>;
