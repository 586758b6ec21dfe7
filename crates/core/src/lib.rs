//! Budgetdesk Core - Domain entities, traits and the budget workspace.
//!
//! This crate holds the record grid logic for a single budget. It knows
//! nothing about HTTP; the remote service is reached through the repository
//! traits implemented by the `budgetdesk-api` crate.

pub mod budgets;
pub mod constants;
pub mod errors;
pub mod records;
pub mod users;
pub mod utils;
pub mod workspace;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
