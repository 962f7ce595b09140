//! Canonical order snapshot and its wire shapes
//!
//! Two payloads carry the same canonical state:
//!
//! | Source | Shape |
//! |--------|-------|
//! | `GET /order/{id}` | `{ isOrdered, status, stageTimes }` |
//! | `receive_status` broadcast | `{ orderId?, isOrdered, newStatus, stageTimes }` |
//!
//! Decoding is lenient field by field: a missing or mistyped field falls back
//! to the zero-state value for that field only. Non-string stage times and
//! keys that name no stage are dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::stage::{PRE_ORDER_STATUS, Stage};

/// Stage label -> capture time text
pub type StageTimes = BTreeMap<String, String>;

/// Canonical order state, as returned by the snapshot fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct OrderSnapshot {
    pub is_ordered: bool,
    /// Current stage label; may be a value that names no stage
    pub status: String,
    pub stage_times: StageTimes,
}

impl OrderSnapshot {
    /// State of an order that has never been placed (or was reset)
    pub fn zero_state() -> Self {
        Self {
            is_ordered: false,
            status: PRE_ORDER_STATUS.to_string(),
            stage_times: StageTimes::new(),
        }
    }

    /// Current stage, `None` if the status names no stage
    pub fn stage(&self) -> Option<Stage> {
        Stage::from_label(&self.status)
    }

    /// Progress index, `-1` when the status names no stage
    pub fn current_index(&self) -> isize {
        Stage::position_of(&self.status)
    }

    /// Recorded capture time of a stage
    pub fn time_of(&self, stage: Stage) -> Option<&str> {
        self.stage_times.get(stage.label()).map(String::as_str)
    }

    pub fn is_zero_state(&self) -> bool {
        *self == Self::zero_state()
    }

    fn from_fields(map: &serde_json::Map<String, Value>, status_key: &str) -> Self {
        Self {
            is_ordered: map.get("isOrdered").and_then(Value::as_bool).unwrap_or(false),
            status: map
                .get(status_key)
                .and_then(Value::as_str)
                .unwrap_or(PRE_ORDER_STATUS)
                .to_string(),
            stage_times: map
                .get("stageTimes")
                .map(stage_times_from_value)
                .unwrap_or_default(),
        }
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::zero_state()
    }
}

impl From<Value> for OrderSnapshot {
    fn from(value: Value) -> Self {
        match value.as_object() {
            Some(map) => Self::from_fields(map, "status"),
            None => Self::zero_state(),
        }
    }
}

/// `receive_status` payload (server -> every viewer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct ReceiveStatusPayload {
    /// Order the snapshot describes; absent in single-order deployments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub is_ordered: bool,
    pub new_status: String,
    pub stage_times: StageTimes,
}

impl ReceiveStatusPayload {
    pub fn new(order_id: impl Into<String>, snapshot: OrderSnapshot) -> Self {
        Self::from_parts(Some(order_id.into()), snapshot)
    }

    fn from_parts(order_id: Option<String>, snapshot: OrderSnapshot) -> Self {
        Self {
            order_id,
            is_ordered: snapshot.is_ordered,
            new_status: snapshot.status,
            stage_times: snapshot.stage_times,
        }
    }

    /// Whether this broadcast concerns `order_id`
    ///
    /// A payload without an order id is addressed to every viewer.
    pub fn concerns(&self, order_id: &str) -> bool {
        self.order_id.as_deref().is_none_or(|id| id == order_id)
    }

    pub fn into_snapshot(self) -> OrderSnapshot {
        OrderSnapshot {
            is_ordered: self.is_ordered,
            status: self.new_status,
            stage_times: self.stage_times,
        }
    }
}

impl From<Value> for ReceiveStatusPayload {
    fn from(value: Value) -> Self {
        match value.as_object() {
            Some(map) => Self::from_parts(
                map.get("orderId").and_then(Value::as_str).map(str::to_string),
                OrderSnapshot::from_fields(map, "newStatus"),
            ),
            None => Self::from_parts(None, OrderSnapshot::zero_state()),
        }
    }
}

fn stage_times_from_value(value: &Value) -> StageTimes {
    let Some(map) = value.as_object() else {
        return StageTimes::new();
    };
    map.iter()
        .filter(|(label, _)| Stage::from_label(label).is_some())
        .filter_map(|(label, time)| Some((label.clone(), time.as_str()?.to_string())))
        .collect()
}
