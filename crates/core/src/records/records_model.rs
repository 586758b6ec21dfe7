//! Budget record domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;
use super::records_validation::max_record_total;
use crate::errors::{Error, Result, ValidationError};
use crate::utils::time_utils::{flexible_timestamp, flexible_timestamp_opt, parse_timestamp};

/// Server identity of a record.
///
/// On the wire this is the optional `id` field: absent or `null` means the
/// record has not been created yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum RecordIdentity {
    /// Exists only in the working set
    #[default]
    Pending,
    /// Assigned by the service; later edits are sent as updates
    Persisted(i64),
}

impl RecordIdentity {
    pub fn is_pending(&self) -> bool {
        matches!(self, RecordIdentity::Pending)
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            RecordIdentity::Pending => None,
            RecordIdentity::Persisted(id) => Some(*id),
        }
    }
}

impl From<Option<i64>> for RecordIdentity {
    fn from(id: Option<i64>) -> Self {
        id.map_or(RecordIdentity::Pending, RecordIdentity::Persisted)
    }
}

impl From<RecordIdentity> for Option<i64> {
    fn from(identity: RecordIdentity) -> Self {
        identity.id()
    }
}

/// Domain model representing one line item of a budget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    #[serde(rename = "id", default, skip_serializing_if = "RecordIdentity::is_pending")]
    pub identity: RecordIdentity,
    pub name: String,
    /// Set once when the row is added; never editable
    #[serde(with = "flexible_timestamp")]
    pub creation_date: DateTime<Utc>,
    #[serde(default, with = "flexible_timestamp_opt")]
    pub spending_date: Option<DateTime<Utc>>,
    pub budget_id: i64,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl BudgetRecord {
    /// A blank row as appended by "add record".
    pub fn blank(budget_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            identity: RecordIdentity::Pending,
            name: String::new(),
            creation_date: now,
            spending_date: Some(now),
            budget_id,
            total: Decimal::ZERO,
            comment: Some(String::new()),
        }
    }

    pub fn has_blank_name(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Applies a field edit in place.
    pub fn apply(&mut self, edit: RecordEdit) {
        match edit {
            RecordEdit::Name(name) => self.name = name,
            RecordEdit::SpendingDate(date) => self.spending_date = date,
            RecordEdit::Total(total) => self.total = total,
            RecordEdit::Comment(comment) => self.comment = Some(comment),
        }
    }

    /// Request body for creating this record.
    pub fn to_new_record(&self) -> NewBudgetRecord {
        NewBudgetRecord {
            name: self.name.clone(),
            creation_date: self.creation_date,
            spending_date: self.spending_date,
            budget_id: self.budget_id,
            total: self.total,
            comment: self.comment.clone(),
        }
    }
}

/// Input model for creating a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBudgetRecord {
    pub name: String,
    #[serde(with = "flexible_timestamp")]
    pub creation_date: DateTime<Utc>,
    #[serde(default, with = "flexible_timestamp_opt")]
    pub spending_date: Option<DateTime<Utc>>,
    pub budget_id: i64,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// User-editable fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    Name,
    SpendingDate,
    Total,
    Comment,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::SpendingDate => "spendingDate",
            RecordField::Total => "total",
            RecordField::Comment => "comment",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(RecordField::Name),
            "spendingDate" | "spending_date" => Ok(RecordField::SpendingDate),
            "total" => Ok(RecordField::Total),
            "comment" => Ok(RecordField::Comment),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown record field '{}'",
                other
            )))),
        }
    }
}

/// A typed value for one editable field.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEdit {
    Name(String),
    SpendingDate(Option<DateTime<Utc>>),
    Total(Decimal),
    Comment(String),
}

impl RecordEdit {
    pub fn field(&self) -> RecordField {
        match self {
            RecordEdit::Name(_) => RecordField::Name,
            RecordEdit::SpendingDate(_) => RecordField::SpendingDate,
            RecordEdit::Total(_) => RecordField::Total,
            RecordEdit::Comment(_) => RecordField::Comment,
        }
    }

    /// Converts raw input text into a typed edit.
    ///
    /// A blank spending date becomes `None` so that save validation can report
    /// it. A total that does not parse is rejected here, as is one beyond
    /// `max_record_total()`.
    pub fn parse(field: RecordField, raw: &str) -> Result<Self> {
        match field {
            RecordField::Name => Ok(RecordEdit::Name(raw.to_string())),
            RecordField::Comment => Ok(RecordEdit::Comment(raw.to_string())),
            RecordField::SpendingDate => {
                if raw.trim().is_empty() {
                    Ok(RecordEdit::SpendingDate(None))
                } else {
                    parse_timestamp(raw).map(|dt| RecordEdit::SpendingDate(Some(dt)))
                }
            }
            RecordField::Total => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(Error::Validation(ValidationError::MissingField(
                        RecordField::Total.to_string(),
                    )));
                }
                let total = Decimal::from_str(trimmed)?;
                if total.abs() > max_record_total() {
                    return Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "Total {} is out of range",
                        trimmed
                    ))));
                }
                Ok(RecordEdit::Total(total))
            }
        }
    }
}

/// Sum of `total` over the given records.
///
/// Saturates at `Decimal::MAX`/`Decimal::MIN`; rows received from the service
/// are not bounded by input parsing.
pub fn aggregate_total(records: &[BudgetRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |sum, record| sum.saturating_add(record.total))
}

/// Renders an amount the way the grid footer shows it (`1200.00`).
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.prec$}",
        amount.round_dp(DISPLAY_DECIMAL_PRECISION),
        prec = DISPLAY_DECIMAL_PRECISION as usize
    )
}
