//! Loading status for asynchronous store operations.
//!
//! Every network-bound store operation registers itself with the
//! [`OperationTracker`] and receives an [`OperationId`]. Overlapping
//! operations each keep their own status, so `is_loading()` stays true until
//! the last one settles. The single aggregate [`LoadingStatus`] is kept for
//! display and reflects whichever operation started or finished most recently.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Completed operations retained for inspection.
pub const HISTORY_LIMIT: usize = 32;

/// Time-ordered identifier of one store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OperationId(Uuid);

impl OperationId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a tracked operation is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Load,
    TestConnection,
    LoadModels,
    GenerateText,
}

/// Status of a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum OperationStatus {
    Loading,
    Success,
    Error(String),
}

/// Aggregate store status: Idle → Loading → {Success, Error} → Idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum LoadingStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// One tracked operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    pub id: OperationId,
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct OperationTracker {
    in_flight: HashMap<OperationId, OperationRecord>,
    history: VecDeque<OperationRecord>,
    aggregate: LoadingStatus,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a started operation.
    pub fn begin(&mut self, kind: OperationKind) -> OperationId {
        let id = OperationId::new();
        self.in_flight.insert(
            id,
            OperationRecord {
                id,
                kind,
                status: OperationStatus::Loading,
                started_at: Utc::now(),
                finished_at: None,
            },
        );
        self.aggregate = LoadingStatus::Loading;
        id
    }

    /// Settle an operation. Unknown or already settled ids are ignored.
    pub fn finish(&mut self, id: OperationId, outcome: Result<(), String>) {
        let Some(mut record) = self.in_flight.remove(&id) else {
            return;
        };
        let (status, aggregate) = match outcome {
            Ok(()) => (OperationStatus::Success, LoadingStatus::Success),
            Err(message) => (
                OperationStatus::Error(message.clone()),
                LoadingStatus::Error(message),
            ),
        };
        record.status = status;
        record.finished_at = Some(Utc::now());

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(record);
        self.aggregate = aggregate;
    }

    /// True while any operation is in flight.
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Aggregate status; last writer wins.
    pub fn status(&self) -> &LoadingStatus {
        &self.aggregate
    }

    /// Return the aggregate to `Idle` once nothing is in flight.
    pub fn reset(&mut self) {
        if self.in_flight.is_empty() {
            self.aggregate = LoadingStatus::Idle;
        }
    }

    /// Status of a specific operation, in flight or recently completed.
    pub fn get(&self, id: OperationId) -> Option<&OperationRecord> {
        self.in_flight
            .get(&id)
            .or_else(|| self.history.iter().rev().find(|r| r.id == id))
    }

    /// Operations currently in flight, oldest first.
    pub fn in_flight(&self) -> Vec<OperationRecord> {
        let mut records: Vec<_> = self.in_flight.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Completed operations, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &OperationRecord> {
        self.history.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let tracker = OperationTracker::new();
        assert_eq!(tracker.status(), &LoadingStatus::Idle);
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_single_operation_lifecycle() {
        let mut tracker = OperationTracker::new();
        let id = tracker.begin(OperationKind::LoadModels);
        assert!(tracker.is_loading());
        assert_eq!(tracker.status(), &LoadingStatus::Loading);
        assert_eq!(tracker.get(id).unwrap().status, OperationStatus::Loading);

        tracker.finish(id, Ok(()));
        assert!(!tracker.is_loading());
        assert_eq!(tracker.status(), &LoadingStatus::Success);
        let record = tracker.get(id).unwrap();
        assert_eq!(record.status, OperationStatus::Success);
        assert!(record.finished_at.is_some());

        tracker.reset();
        assert_eq!(tracker.status(), &LoadingStatus::Idle);
    }

    #[test]
    fn test_overlapping_operations_stay_loading_until_last_settles() {
        let mut tracker = OperationTracker::new();
        let first = tracker.begin(OperationKind::TestConnection);
        let second = tracker.begin(OperationKind::LoadModels);

        tracker.finish(first, Ok(()));
        // Aggregate flips with the last writer, the in-flight count does not.
        assert_eq!(tracker.status(), &LoadingStatus::Success);
        assert!(tracker.is_loading());
        assert_eq!(tracker.in_flight().len(), 1);

        tracker.finish(second, Err("HTTP 500".into()));
        assert!(!tracker.is_loading());
        assert_eq!(tracker.status(), &LoadingStatus::Error("HTTP 500".into()));
        assert_eq!(tracker.get(first).unwrap().status, OperationStatus::Success);
    }

    #[test]
    fn test_reset_is_ignored_while_in_flight() {
        let mut tracker = OperationTracker::new();
        let _id = tracker.begin(OperationKind::Load);
        tracker.reset();
        assert_eq!(tracker.status(), &LoadingStatus::Loading);
    }

    #[test]
    fn test_finish_twice_is_ignored() {
        let mut tracker = OperationTracker::new();
        let id = tracker.begin(OperationKind::GenerateText);
        tracker.finish(id, Err("boom".into()));
        tracker.finish(id, Ok(()));
        assert_eq!(tracker.status(), &LoadingStatus::Error("boom".into()));
        assert_eq!(tracker.history().count(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut tracker = OperationTracker::new();
        let first = tracker.begin(OperationKind::Load);
        tracker.finish(first, Ok(()));
        for _ in 0..HISTORY_LIMIT {
            let id = tracker.begin(OperationKind::Load);
            tracker.finish(id, Ok(()));
        }
        assert_eq!(tracker.history().count(), HISTORY_LIMIT);
        assert!(tracker.get(first).is_none());
    }
}
