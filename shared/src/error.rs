//! Protocol error types
//!
//! Errors raised at the protocol boundary, shared by the hub (which rejects
//! intents) and the viewers (which decode events).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Protocol boundary error
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// `newStatus` names neither a stage nor the reset intent
    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    /// Intent frame is not a well-formed `update_status` event
    #[error("Malformed intent: {0}")]
    MalformedIntent(String),

    /// Frame is not valid JSON or not a known event
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Code reported back to the issuing viewer
    pub fn rejection_code(&self) -> RejectionCode {
        match self {
            ProtocolError::InvalidStage(_) => RejectionCode::InvalidStage,
            ProtocolError::MalformedIntent(_) | ProtocolError::Serialization(_) => {
                RejectionCode::MalformedIntent
            }
        }
    }
}

/// Reason an intent was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    InvalidStage,
    MalformedIntent,
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStage => write!(f, "INVALID_STAGE"),
            Self::MalformedIntent => write!(f, "MALFORMED_INTENT"),
        }
    }
}
