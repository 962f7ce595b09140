//! Stage state machine
//!
//! ```text
//!              place-order / advance(s)
//! NotOrdered ───────────────────────────▶ At(s)
//!     ▲                                     │  advance(s') : any s -> any s'
//!     └──────────────── reset ──────────────┘
//! ```
//!
//! Transitions are last-write-wins: any stage may be set from any state.
//! Only the first arrival at a stage fixes its time; later arrivals keep it.

use std::collections::BTreeMap;

use super::intent::StatusIntent;
use super::snapshot::{OrderSnapshot, StageTimes};
use super::stage::Stage;

/// Observable tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    NotOrdered,
    At(Stage),
}

/// Authoritative record of a single order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    ordered: bool,
    stage: Stage,
    times: BTreeMap<Stage, String>,
}

impl OrderRecord {
    pub fn new() -> Self {
        Self {
            ordered: false,
            stage: Stage::Placed,
            times: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> TrackerState {
        if self.ordered {
            TrackerState::At(self.stage)
        } else {
            TrackerState::NotOrdered
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn time_of(&self, stage: Stage) -> Option<&str> {
        self.times.get(&stage).map(String::as_str)
    }

    /// Apply a validated intent; `captured_at` is the time text recorded for a
    /// stage reached for the first time.
    pub fn apply(&mut self, intent: StatusIntent, captured_at: &str) -> TrackerState {
        match intent {
            StatusIntent::Advance(stage) => {
                self.ordered = true;
                self.stage = stage;
                // an ordered record always carries its placement time
                self.times
                    .entry(Stage::Placed)
                    .or_insert_with(|| captured_at.to_string());
                self.times
                    .entry(stage)
                    .or_insert_with(|| captured_at.to_string());
            }
            StatusIntent::Reset => *self = Self::new(),
        }
        self.state()
    }

    /// Canonical wire snapshot of this record
    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            is_ordered: self.ordered,
            status: self.stage.label().to_string(),
            stage_times: self
                .times
                .iter()
                .map(|(stage, time)| (stage.label().to_string(), time.clone()))
                .collect::<StageTimes>(),
        }
    }
}

impl Default for OrderRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(stages: &[Stage]) -> OrderRecord {
        let mut record = OrderRecord::new();
        for (i, stage) in stages.iter().enumerate() {
            record.apply(StatusIntent::Advance(*stage), &format!("T{i}"));
        }
        record
    }

    #[test]
    fn test_new_record_is_zero_state() {
        let record = OrderRecord::new();
        assert_eq!(record.state(), TrackerState::NotOrdered);
        assert_eq!(record.snapshot(), OrderSnapshot::zero_state());
    }

    #[test]
    fn test_place_order_records_placement_time() {
        let mut record = OrderRecord::new();
        let state = record.apply(StatusIntent::place_order(), "T0");

        assert_eq!(state, TrackerState::At(Stage::Placed));
        let snapshot = record.snapshot();
        assert!(snapshot.is_ordered);
        assert_eq!(snapshot.status, "Order Placed");
        assert_eq!(snapshot.stage_times.len(), 1);
        assert_eq!(snapshot.time_of(Stage::Placed), Some("T0"));
    }

    #[test]
    fn test_advance_twice_keeps_first_time() {
        let mut once = OrderRecord::new();
        once.apply(StatusIntent::Advance(Stage::Preparing), "T0");

        let mut twice = once.clone();
        twice.apply(StatusIntent::Advance(Stage::Preparing), "T1");

        assert_eq!(once.snapshot().stage_times, twice.snapshot().stage_times);
        assert_eq!(twice.time_of(Stage::Preparing), Some("T0"));
    }

    #[test]
    fn test_any_stage_reachable_from_any_state() {
        let mut record = record_at(&[Stage::Delivered]);
        assert_eq!(record.state(), TrackerState::At(Stage::Delivered));

        // backwards is allowed, the later stage keeps its time
        record.apply(StatusIntent::Advance(Stage::Preparing), "T9");
        assert_eq!(record.state(), TrackerState::At(Stage::Preparing));
        assert_eq!(record.time_of(Stage::Delivered), Some("T0"));
        assert_eq!(record.time_of(Stage::Preparing), Some("T9"));
    }

    #[test]
    fn test_jump_to_later_stage_also_records_placement() {
        let record = record_at(&[Stage::OutForDelivery]);
        assert_eq!(record.time_of(Stage::Placed), Some("T0"));
        assert_eq!(record.time_of(Stage::OutForDelivery), Some("T0"));
        assert_eq!(record.time_of(Stage::Preparing), None);
    }

    #[test]
    fn test_reset_from_every_state_yields_zero_state() {
        let histories: [&[Stage]; 5] = [
            &[],
            &[Stage::Placed],
            &[Stage::Placed, Stage::Preparing],
            &[Stage::Placed, Stage::Preparing, Stage::OutForDelivery],
            &[Stage::Placed, Stage::Preparing, Stage::OutForDelivery, Stage::Delivered],
        ];
        for history in histories {
            let mut record = record_at(history);
            let state = record.apply(StatusIntent::Reset, "T-reset");
            assert_eq!(state, TrackerState::NotOrdered);
            assert_eq!(record.snapshot(), OrderSnapshot::zero_state());
        }
    }

    #[test]
    fn test_reorder_after_reset_gets_fresh_times() {
        let mut record = record_at(&[Stage::Placed, Stage::Delivered]);
        record.apply(StatusIntent::Reset, "T-reset");
        record.apply(StatusIntent::place_order(), "T-new");

        assert_eq!(record.time_of(Stage::Placed), Some("T-new"));
        assert_eq!(record.time_of(Stage::Delivered), None);
    }
}
