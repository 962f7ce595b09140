//! Shared types for the order tracker
//!
//! Types used by both the hub and the viewers: the stage enumeration and
//! state machine, canonical snapshots, status intents, event channel frames
//! and viewer roles.

pub mod error;
pub mod message;
pub mod order;
pub mod role;

// Re-exports
pub use error::{ProtocolError, RejectionCode};
pub use message::{ChannelEvent, RejectionPayload};
pub use order::{
    OrderRecord, OrderSnapshot, ReceiveStatusPayload, Stage, StatusIntent, UpdateStatusPayload,
};
pub use role::{RoleClaims, ViewRole, ViewSelector};

/// Order id used when a viewer does not name one
pub const DEFAULT_ORDER_ID: &str = "123";
