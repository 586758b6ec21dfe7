//! Outcomes and the read-only projection of the budget workspace.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::records::{format_amount, BudgetRecord};

/// Whether the workspace has finished its initial fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "message")]
pub enum LoadState {
    /// Nothing loaded yet; show a progress indicator
    Loading,
    Ready,
    /// Initial fetch failed; show the error view
    Failed(String),
}

/// Why a committed edit stayed local
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// A pending row with no name is never created remotely
    BlankName,
    /// Record writes wait until the budget itself exists
    BudgetUnsaved,
}

/// Result of committing one field edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The persisted row was updated remotely
    Updated,
    /// The pending row was created and now carries this identity
    Created(i64),
    Deferred(DeferReason),
}

/// Result of confirming a budget rename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Same as the persisted name; nothing sent
    Unchanged,
    /// Budget not created yet; applied when it is
    Staged,
    Renamed,
}

/// Where the presentation layer should go after a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Newly created budget: reopen the workspace under its identity
    Budget(i64),
    /// Existing budget: back to the list once `after` has elapsed
    BudgetList { after: Duration },
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Navigation::Budget(id) => format!("/budget/{}", id),
            Navigation::BudgetList { .. } => "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub budget_id: i64,
    pub navigation: Navigation,
}

/// Immutable view handed to whatever renders the workspace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub budget_id: i64,
    pub budget_name: String,
    pub records: Vec<BudgetRecord>,
    pub aggregate_total: Decimal,
    pub is_editing_name: bool,
    pub save_error: Option<String>,
    pub save_success: bool,
    pub load_state: LoadState,
}

impl WorkspaceSnapshot {
    pub fn formatted_total(&self) -> String {
        format_amount(self.aggregate_total)
    }
}
