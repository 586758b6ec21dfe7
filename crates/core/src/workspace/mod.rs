//! Workspace module - the editable record grid of one budget.

mod workspace_errors;
mod workspace_model;
mod workspace_service;


pub use workspace_errors::{WorkspaceError, WorkspaceResult};
pub use workspace_model::{
    CommitOutcome, DeferReason, LoadState, Navigation, RenameOutcome, SaveOutcome,
    WorkspaceSnapshot,
};
pub use workspace_service::BudgetWorkspace;
