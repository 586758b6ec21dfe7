//! Budgets module - domain models and the remote contract.

mod budgets_model;
mod budgets_traits;

pub use budgets_model::{is_new_budget, Budget, CreatedId, NewBudget};
pub use budgets_traits::BudgetRepositoryTrait;
