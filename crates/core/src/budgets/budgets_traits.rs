use async_trait::async_trait;

use super::budgets_model::{Budget, NewBudget};
use crate::errors::Result;

/// Trait defining the contract for budget persistence.
///
/// The workspace only uses get/create/update. Listing and deletion belong to
/// the budget list screen and share the same contract.
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    async fn get_budget(&self, budget_id: i64) -> Result<Budget>;
    async fn list_budgets(&self) -> Result<Vec<Budget>>;

    /// Creates a budget and returns the identity assigned by the service.
    async fn create_budget(&self, new_budget: NewBudget) -> Result<i64>;
    async fn update_budget(&self, budget: Budget) -> Result<()>;
    async fn delete_budget(&self, budget_id: i64) -> Result<()>;
}
