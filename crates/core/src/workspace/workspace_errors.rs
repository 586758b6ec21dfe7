use thiserror::Error;

use crate::records::RowViolations;

pub type WorkspaceResult<T> = std::result::Result<T, WorkspaceError>;

/// Errors surfaced by the budget workspace to its presentation layer.
///
/// Remote failures are converted into `Load` or `Save` where they happen;
/// transport errors never cross this boundary unconverted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// The budget or its records could not be fetched. The workspace accepts no edits.
    #[error("Error loading budget data: {0}")]
    Load(String),

    #[error("Budget name is required")]
    InvalidBudgetName,

    /// One or more rows break a field constraint. Nothing was sent.
    #[error("{} record(s) failed validation", .0.len())]
    Validation(Vec<RowViolations>),

    /// A remote write failed. Local state and earlier writes are kept.
    #[error("Failed to save budget: {0}")]
    Save(String),

    #[error("Row {row} does not exist ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    /// An edit was attempted before a successful load.
    #[error("Budget workspace is not ready for edits")]
    NotReady,
}
