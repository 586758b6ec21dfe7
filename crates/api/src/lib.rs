//! Budgetdesk API - HTTP client for the budget REST service.
//!
//! Implements the repository traits of `budgetdesk-core` over the service's
//! JSON endpoints, authenticating with the session cookie it hands out.

mod client;

pub use client::{ApiConfig, BudgetApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};
