//! Event channel message types
//!
//! Shared between the hub and viewers. Every frame on the event channel is one
//! [`ChannelEvent`], encoded as `{"event": "<name>", "data": <payload>}`.
//!
//! | Event | Direction | Payload |
//! |-------|-----------|---------|
//! | `update_status` | viewer → hub | [`UpdateStatusPayload`] |
//! | `receive_status` | hub → every viewer | [`ReceiveStatusPayload`] |
//! | `status_rejected` | hub → issuing viewer | [`RejectionPayload`] |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProtocolError, RejectionCode};
use crate::order::{ReceiveStatusPayload, UpdateStatusPayload};

/// Event name constants
pub const UPDATE_STATUS: &str = "update_status";
pub const RECEIVE_STATUS: &str = "receive_status";
pub const STATUS_REJECTED: &str = "status_rejected";

/// Tagged event channel frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ChannelEvent {
    UpdateStatus(UpdateStatusPayload),
    ReceiveStatus(ReceiveStatusPayload),
    StatusRejected(RejectionPayload),
}

impl ChannelEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChannelEvent::UpdateStatus(_) => UPDATE_STATUS,
            ChannelEvent::ReceiveStatus(_) => RECEIVE_STATUS,
            ChannelEvent::StatusRejected(_) => STATUS_REJECTED,
        }
    }

    /// Encode as a text frame
    pub fn to_text(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a text frame
    pub fn from_text(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl fmt::Display for ChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `status_rejected` payload (hub → issuing viewer only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionPayload {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub new_status: String,
    pub code: RejectionCode,
    #[serde(default)]
    pub message: String,
}

impl RejectionPayload {
    pub fn new(order_id: &str, new_status: &str, error: &ProtocolError) -> Self {
        Self {
            order_id: order_id.to_string(),
            new_status: new_status.to_string(),
            code: error.rejection_code(),
            message: error.to_string(),
        }
    }
}
