//! Status intents - what a viewer asks the hub to do
//!
//! On the wire an intent is a bare `newStatus` string. It is parsed into a
//! [`StatusIntent`] at the protocol boundary, so the state machine never sees
//! an unvalidated value.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::stage::{RESET_ORDER, Stage};
use crate::error::ProtocolError;

/// Validated status-change intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusIntent {
    /// Move the order to a stage (place-order is `Advance(Stage::Placed)`)
    Advance(Stage),
    /// Back to not-ordered, clearing every recorded time
    Reset,
}

impl StatusIntent {
    pub const fn place_order() -> Self {
        StatusIntent::Advance(Stage::Placed)
    }

    pub fn parse(new_status: &str) -> Result<Self, ProtocolError> {
        if new_status == RESET_ORDER {
            return Ok(StatusIntent::Reset);
        }
        new_status.parse().map(StatusIntent::Advance)
    }

    /// Wire value carried in `newStatus`
    pub const fn as_wire(&self) -> &'static str {
        match *self {
            StatusIntent::Advance(stage) => stage.label(),
            StatusIntent::Reset => RESET_ORDER,
        }
    }
}

impl fmt::Display for StatusIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// `update_status` payload (viewer -> hub)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub order_id: String,
    pub new_status: String,
}

impl UpdateStatusPayload {
    pub fn new(order_id: impl Into<String>, intent: StatusIntent) -> Self {
        Self {
            order_id: order_id.into(),
            new_status: intent.as_wire().to_string(),
        }
    }

    /// Validate the payload into a typed intent
    pub fn intent(&self) -> Result<StatusIntent, ProtocolError> {
        if self.order_id.trim().is_empty() {
            return Err(ProtocolError::MalformedIntent("orderId is empty".to_string()));
        }
        StatusIntent::parse(&self.new_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_wire_value() {
        for stage in Stage::ALL {
            assert_eq!(
                StatusIntent::parse(stage.label()).unwrap(),
                StatusIntent::Advance(stage)
            );
        }
        assert_eq!(StatusIntent::parse("RESET_ORDER").unwrap(), StatusIntent::Reset);
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let err = StatusIntent::parse("Burnt").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidStage(_)));
    }

    #[test]
    fn test_place_order_is_placed_stage() {
        assert_eq!(StatusIntent::place_order().as_wire(), "Order Placed");
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = UpdateStatusPayload::new("123", StatusIntent::Reset);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "orderId": "123", "newStatus": "RESET_ORDER" })
        );
    }

    #[test]
    fn test_payload_requires_order_id() {
        let payload = UpdateStatusPayload {
            order_id: "  ".to_string(),
            new_status: "Preparing".to_string(),
        };
        assert!(matches!(
            payload.intent(),
            Err(ProtocolError::MalformedIntent(_))
        ));
    }
}
