//! Bulk actions over a selection of record keys.
//!
//! Each key is handled independently: a missing key or a failed write is
//! recorded in the report and the batch moves on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::EntityStore;
use crate::models::{Entity, StatusAction, Transition};
use crate::view::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Publish,
    Unpublish,
    Retire,
    Delete,
    Activate,
    Suspend,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Publish => "publish",
            BulkAction::Unpublish => "unpublish",
            BulkAction::Retire => "retire",
            BulkAction::Delete => "delete",
            BulkAction::Activate => "activate",
            BulkAction::Suspend => "suspend",
        }
    }

    /// The status action behind this bulk action; `None` for delete.
    pub fn status_action(&self) -> Option<StatusAction> {
        match self {
            BulkAction::Publish => Some(StatusAction::Publish),
            BulkAction::Unpublish => Some(StatusAction::Unpublish),
            BulkAction::Retire => Some(StatusAction::Retire),
            BulkAction::Activate => Some(StatusAction::Activate),
            BulkAction::Suspend => Some(StatusAction::Suspend),
            BulkAction::Delete => None,
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub key: String,
    pub reason: String,
}

/// Per-key outcome of one bulk run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub action: BulkAction,
    pub succeeded: Vec<String>,
    /// Keys already in the target state; nothing was written for them.
    pub unchanged: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkReport {
    fn new(action: BulkAction) -> Self {
        Self {
            action,
            succeeded: Vec::new(),
            unchanged: Vec::new(),
            failed: Vec::new(),
        }
    }

    fn fail(&mut self, key: &str, reason: impl Into<String>) {
        self.failed.push(BulkFailure {
            key: key.to_string(),
            reason: reason.into(),
        });
    }
}

/// Apply `action` to every key in order.
pub async fn run<E: Entity>(store: &EntityStore<E>, action: BulkAction, keys: &[String]) -> BulkReport {
    let mut report = BulkReport::new(action);

    for key in keys {
        let outcome = match action.status_action() {
            Some(status) => store
                .apply_with_outcome(key, status)
                .await
                .map(|found| found.map(|(_, transition)| transition)),
            None => store
                .delete(key)
                .await
                .map(|deleted| deleted.then_some(Transition::Applied)),
        };

        match outcome {
            Ok(Some(Transition::Applied)) => report.succeeded.push(key.clone()),
            Ok(Some(Transition::Unchanged)) => report.unchanged.push(key.clone()),
            Ok(None) => report.fail(key, "not found"),
            Err(e) => {
                tracing::warn!("Bulk {} failed for {} {}: {}", action, E::KIND, key, e);
                report.fail(key, e.message());
            }
        }
    }

    tracing::info!(
        "Bulk {} on {} {} records: {} succeeded, {} unchanged, {} failed",
        action,
        keys.len(),
        E::KIND,
        report.succeeded.len(),
        report.unchanged.len(),
        report.failed.len()
    );
    report
}

/// Run over a selection, then clear it whatever the outcome.
pub async fn run_selection<E: Entity>(
    store: &EntityStore<E>,
    action: BulkAction,
    selection: &mut Selection,
) -> BulkReport {
    if selection.is_empty() {
        tracing::debug!("Bulk {} skipped: nothing selected", action);
        return BulkReport::new(action);
    }

    let report = run(store, action, selection.keys()).await;
    selection.clear();
    report
}
