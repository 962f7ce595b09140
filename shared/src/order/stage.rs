//! Stage definition - the fixed, ordered lifecycle of an order
//!
//! The declaration order of [`Stage`] is load-bearing: it defines the
//! progress index shown by every viewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Status label a viewer shows before any order exists
pub const PRE_ORDER_STATUS: &str = Stage::Placed.label();

/// Wire value of the reset intent (not a stage)
pub const RESET_ORDER: &str = "RESET_ORDER";

/// Text shown for a stage that has no recorded time yet
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Order lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "Order Placed")]
    Placed,
    #[serde(rename = "Preparing")]
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl Stage {
    /// All stages in progress order
    pub const ALL: [Stage; 4] = [
        Stage::Placed,
        Stage::Preparing,
        Stage::OutForDelivery,
        Stage::Delivered,
    ];

    /// Display label, also the wire value of the stage
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Placed => "Order Placed",
            Stage::Preparing => "Preparing",
            Stage::OutForDelivery => "Out for Delivery",
            Stage::Delivered => "Delivered",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Stage::Placed => "📦",
            Stage::Preparing => "🍳",
            Stage::OutForDelivery => "🛵",
            Stage::Delivered => "✅",
        }
    }

    /// Position in [`Stage::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Exact (case-sensitive) label match
    pub fn from_label(label: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.label() == label)
    }

    /// Progress index of a raw status value, `-1` when it names no stage
    pub fn position_of(status: &str) -> isize {
        Stage::from_label(status)
            .map(|stage| stage.index() as isize)
            .unwrap_or(-1)
    }

    /// Next stage in progress order; `None` from the terminal stage
    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::from_label(s).ok_or_else(|| ProtocolError::InvalidStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_matches_declaration_order() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(Stage::position_of(stage.label()), i as isize);
        }
    }

    #[test]
    fn test_unrecognized_status_has_no_position() {
        assert_eq!(Stage::position_of("Cooking"), -1);
        assert_eq!(Stage::position_of(""), -1);
        assert_eq!(Stage::position_of("order placed"), -1);
        assert_eq!(Stage::position_of(RESET_ORDER), -1);
    }

    #[test]
    fn test_parse_rejects_unknown_label() {
        assert_eq!("Preparing".parse::<Stage>().unwrap(), Stage::Preparing);
        let err = "Lost".parse::<Stage>().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidStage(ref s) if s == "Lost"));
    }

    #[test]
    fn test_terminal_stage() {
        assert_eq!(Stage::Placed.next(), Some(Stage::Preparing));
        assert_eq!(Stage::OutForDelivery.next(), Some(Stage::Delivered));
        assert!(Stage::Delivered.is_terminal());
        assert!(!Stage::Placed.is_terminal());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Stage::OutForDelivery).unwrap();
        assert_eq!(json, "\"Out for Delivery\"");
        let stage: Stage = serde_json::from_str("\"Order Placed\"").unwrap();
        assert_eq!(stage, Stage::Placed);
    }
}
