//! ClientProjector - viewer-local projection of the canonical order state
//!
//! The projection is a pure function of the most recently applied snapshot.
//! Every push replaces the whole snapshot; nothing is merged.

use shared::order::TIME_PLACEHOLDER;
use shared::{
    OrderSnapshot, ReceiveStatusPayload, Stage, StatusIntent, UpdateStatusPayload, ViewRole,
};

use crate::view::{
    ADMIN_CONTROLS_HEADING, AdminControl, ConnectorFill, PLACE_ORDER_LABEL, RESET_LABEL, Screen,
    StepView, ViewModel,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProjector {
    order_id: String,
    snapshot: OrderSnapshot,
}

impl ClientProjector {
    /// Start from the zero state
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            snapshot: OrderSnapshot::zero_state(),
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn snapshot(&self) -> &OrderSnapshot {
        &self.snapshot
    }

    pub fn is_ordered(&self) -> bool {
        self.snapshot.is_ordered
    }

    /// Replace the projection with `snapshot`, unconditionally
    pub fn apply(&mut self, snapshot: OrderSnapshot) {
        self.snapshot = snapshot;
    }

    /// Apply a broadcast if it concerns this order; returns whether it did
    pub fn apply_push(&mut self, payload: ReceiveStatusPayload) -> bool {
        if !payload.concerns(&self.order_id) {
            return false;
        }
        self.apply(payload.into_snapshot());
        true
    }

    // ========== Derived state ==========

    /// Position of the current status, `-1` when it names no stage
    pub fn current_index(&self) -> isize {
        self.snapshot.current_index()
    }

    pub fn is_active(&self, index: usize) -> bool {
        (index as isize) <= self.current_index()
    }

    pub fn is_current(&self, index: usize) -> bool {
        index as isize == self.current_index()
    }

    /// Recorded time of a stage, or the placeholder
    pub fn time_text(&self, stage: Stage) -> &str {
        self.snapshot.time_of(stage).unwrap_or(TIME_PLACEHOLDER)
    }

    /// Fill of the connector after step `index`; `None` after the last step
    pub fn connector_fill(&self, index: usize) -> Option<ConnectorFill> {
        if index + 1 >= Stage::ALL.len() {
            return None;
        }
        Some(if (index as isize) < self.current_index() {
            ConnectorFill::Full
        } else {
            ConnectorFill::Empty
        })
    }

    pub fn steps(&self) -> Vec<StepView> {
        Stage::ALL
            .iter()
            .map(|&stage| {
                let index = stage.index();
                let recorded = self.snapshot.time_of(stage);
                StepView {
                    stage,
                    label: stage.label(),
                    icon: stage.icon(),
                    is_active: self.is_active(index),
                    is_current: self.is_current(index),
                    time_text: recorded.unwrap_or(TIME_PLACEHOLDER).to_string(),
                    has_time: recorded.is_some(),
                    connector: self.connector_fill(index),
                }
            })
            .collect()
    }

    /// One control per stage plus reset; the current one is highlighted
    pub fn admin_controls(&self) -> Vec<AdminControl> {
        Stage::ALL
            .iter()
            .map(|&stage| AdminControl {
                label: stage.label(),
                highlighted: self.snapshot.status == stage.label(),
                intent: StatusIntent::Advance(stage),
            })
            .collect()
    }

    /// Derive the full view for a resolved role
    pub fn view(&self, role: ViewRole, storefront: &str) -> ViewModel {
        let screen = match role {
            ViewRole::Admin => Screen::AdminPanel {
                steps: self.steps(),
                heading: ADMIN_CONTROLS_HEADING,
                controls: self.admin_controls(),
                reset_label: RESET_LABEL,
            },
            ViewRole::Customer if !self.is_ordered() => Screen::PlaceOrder {
                banner: storefront.to_string(),
                action_label: PLACE_ORDER_LABEL,
            },
            ViewRole::Customer => Screen::Tracker {
                steps: self.steps(),
            },
        };

        ViewModel {
            role,
            title: ViewModel::title_for(role),
            screen,
        }
    }

    // ========== Outbound intents ==========

    pub fn place_order_intent(&self) -> UpdateStatusPayload {
        UpdateStatusPayload::new(self.order_id.as_str(), StatusIntent::place_order())
    }

    pub fn advance_intent(&self, stage: Stage) -> UpdateStatusPayload {
        UpdateStatusPayload::new(self.order_id.as_str(), StatusIntent::Advance(stage))
    }

    pub fn reset_intent(&self) -> UpdateStatusPayload {
        UpdateStatusPayload::new(self.order_id.as_str(), StatusIntent::Reset)
    }
}
