//! Error handling for the application

use thiserror::Error;

/// Errors raised while turning swap/liquidity intents into transactions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DexError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid {field} address: {reason}")]
    AddressFormat { field: String, reason: String },

    #[error("adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("{dex} does not support {operation} operations")]
    UnsupportedOperation { dex: String, operation: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("simulation error: {message}")]
    Simulation { message: String, logs: Vec<String> },

    #[error("submission error: {0}")]
    Submission(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DexError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DexError::Validation(msg.into())
    }

    pub fn address(field: impl Into<String>, reason: impl ToString) -> Self {
        DexError::AddressFormat {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(dex: impl Into<String>, operation: impl Into<String>) -> Self {
        DexError::UnsupportedOperation {
            dex: dex.into(),
            operation: operation.into(),
        }
    }

    /// Logs attached to the failure, if the ledger produced any
    pub fn logs(&self) -> &[String] {
        match self {
            DexError::Simulation { logs, .. } => logs,
            _ => &[],
        }
    }
}

impl From<bincode::Error> for DexError {
    fn from(err: bincode::Error) -> Self {
        DexError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for DexError {
    fn from(err: base64::DecodeError) -> Self {
        DexError::Serialization(format!("invalid base64: {}", err))
    }
}

impl From<serde_json::Error> for DexError {
    fn from(err: serde_json::Error) -> Self {
        DexError::Serialization(format!("failed to decode response: {}", err))
    }
}

pub type DexResult<T> = Result<T, DexError>;
