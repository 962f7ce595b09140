//! OrderStore - 订单状态存储
//!
//! 每个订单一个 [`OrderRecord`]。未知订单读取时返回零状态，首次写入时懒创建。
//! 同一订单的写入在 DashMap entry 锁内完成，读到的快照总是某次完整 apply 的结果。

use dashmap::DashMap;
use shared::order::TrackerState;
use shared::{OrderRecord, OrderSnapshot, ProtocolError, StatusIntent, UpdateStatusPayload};
use std::sync::Arc;

use crate::utils::time::{DEFAULT_STAGE_TIME_FORMAT, format_stage_time, resolve_format};
use crate::utils::{Clock, SystemClock};

/// Authoritative order state, cheap to clone
#[derive(Debug, Clone)]
pub struct OrderStore {
    orders: Arc<DashMap<String, OrderRecord>>,
    clock: Arc<dyn Clock>,
    time_format: Arc<str>,
}

impl OrderStore {
    pub fn new(time_format: &str) -> Self {
        Self::with_clock(Arc::new(SystemClock), time_format)
    }

    /// An invalid `time_format` is replaced by the default pattern
    pub fn with_clock(clock: Arc<dyn Clock>, time_format: &str) -> Self {
        Self {
            orders: Arc::new(DashMap::new()),
            clock,
            time_format: Arc::from(resolve_format(Some(time_format))),
        }
    }

    /// Current snapshot; zero-state for an order never written
    pub fn snapshot(&self, order_id: &str) -> OrderSnapshot {
        self.orders
            .get(order_id)
            .map(|record| record.snapshot())
            .unwrap_or_default()
    }

    /// Snapshots of every known order
    pub fn snapshots(&self) -> Vec<(String, OrderSnapshot)> {
        self.orders
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect()
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.orders.contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Apply a validated intent, capturing the stage time from the clock
    pub fn apply(&self, order_id: &str, intent: StatusIntent) -> OrderSnapshot {
        let captured_at = format_stage_time(&self.clock.now(), &self.time_format);
        self.apply_at(order_id, intent, &captured_at)
    }

    /// Apply a validated intent with an explicit capture time
    pub fn apply_at(
        &self,
        order_id: &str,
        intent: StatusIntent,
        captured_at: &str,
    ) -> OrderSnapshot {
        let mut record = self.orders.entry(order_id.to_string()).or_default();
        let state = record.apply(intent, captured_at);
        match state {
            TrackerState::NotOrdered => {
                tracing::info!(order_id = %order_id, "Order reset");
            }
            TrackerState::At(stage) => {
                tracing::info!(order_id = %order_id, stage = %stage, "Order advanced");
            }
        }
        record.snapshot()
    }

    /// Validate and apply a wire intent
    ///
    /// Rejected intents leave the store untouched.
    pub fn apply_update(
        &self,
        payload: &UpdateStatusPayload,
    ) -> Result<OrderSnapshot, ProtocolError> {
        let intent = payload.intent()?;
        Ok(self.apply(&payload.order_id, intent))
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new(DEFAULT_STAGE_TIME_FORMAT)
    }
}
