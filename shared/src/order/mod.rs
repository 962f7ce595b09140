//! Order tracking module
//!
//! - Stage: the fixed, ordered lifecycle of an order
//! - Snapshot: canonical state exchanged between hub and viewers
//! - Intent: validated status-change requests
//! - Machine: the transition rules applied by the hub

pub mod intent;
pub mod machine;
pub mod snapshot;
pub mod stage;

// Re-exports
pub use intent::{StatusIntent, UpdateStatusPayload};
pub use machine::{OrderRecord, TrackerState};
pub use snapshot::{OrderSnapshot, ReceiveStatusPayload, StageTimes};
pub use stage::{PRE_ORDER_STATUS, RESET_ORDER, Stage, TIME_PLACEHOLDER};
