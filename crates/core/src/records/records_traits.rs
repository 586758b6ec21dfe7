use async_trait::async_trait;

use super::records_model::{BudgetRecord, NewBudgetRecord};
use crate::errors::Result;

/// Trait defining the contract for budget record persistence.
#[async_trait]
pub trait BudgetRecordRepositoryTrait: Send + Sync {
    /// Lists every record visible to the user, across budgets.
    async fn list_records(&self) -> Result<Vec<BudgetRecord>>;

    async fn get_record(&self, record_id: i64) -> Result<BudgetRecord>;

    /// Lists the records of one budget. An empty list is a valid answer.
    async fn get_records_for_budget(&self, budget_id: i64) -> Result<Vec<BudgetRecord>>;

    /// Creates a record and returns the identity assigned by the service.
    async fn create_record(&self, new_record: NewBudgetRecord) -> Result<i64>;

    /// Replaces a persisted record. The record must carry its identity.
    async fn update_record(&self, record: BudgetRecord) -> Result<()>;

    async fn delete_record(&self, record_id: i64) -> Result<()>;
}
