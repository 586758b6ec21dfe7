//! Budget domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::NEW_BUDGET_ID;
use crate::utils::time_utils::flexible_date_opt;

/// Returns true when `budget_id` is the sentinel of a budget not yet created.
pub fn is_new_budget(budget_id: i64) -> bool {
    budget_id == NEW_BUDGET_ID
}

/// Domain model representing a persisted budget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        with = "flexible_date_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        with = "flexible_date_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
}

/// Input model for creating a new budget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub name: String,
    pub creator_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        with = "flexible_date_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        with = "flexible_date_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
}

impl NewBudget {
    /// Builds the persisted form once the service has assigned an identity.
    pub fn into_budget(self, id: i64) -> Budget {
        Budget {
            id,
            name: self.name,
            creator_id: self.creator_id,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Body returned by create endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedId {
    pub id: i64,
}
