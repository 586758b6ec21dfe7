//! Field constraints checked before a record is sent to the service.

use rust_decimal::Decimal;
use serde::Serialize;

use super::records_model::{BudgetRecord, RecordField};
use crate::constants::MAX_RECORD_TOTAL_UNITS;

/// Upper bound on a single record total.
pub fn max_record_total() -> Decimal {
    Decimal::from(MAX_RECORD_TOTAL_UNITS)
}

/// One failed constraint on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field: RecordField,
    pub message: String,
}

/// All failed constraints of one row, addressed by its display index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowViolations {
    pub row: usize,
    pub violations: Vec<FieldViolation>,
}

impl RowViolations {
    pub fn has_field(&self, field: RecordField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Checks a single record: name non-blank, total within `0..=max_record_total()`,
/// spending date present.
pub fn validate_record(record: &BudgetRecord) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if record.has_blank_name() {
        violations.push(FieldViolation {
            field: RecordField::Name,
            message: "Required".to_string(),
        });
    }
    if record.total < Decimal::ZERO {
        violations.push(FieldViolation {
            field: RecordField::Total,
            message: "Must be positive".to_string(),
        });
    } else if record.total > max_record_total() {
        violations.push(FieldViolation {
            field: RecordField::Total,
            message: "Too large".to_string(),
        });
    }
    if record.spending_date.is_none() {
        violations.push(FieldViolation {
            field: RecordField::SpendingDate,
            message: "Required".to_string(),
        });
    }
    violations
}

/// Checks every record and returns the failing rows in display order.
pub fn validate_records(records: &[BudgetRecord]) -> Vec<RowViolations> {
    records
        .iter()
        .enumerate()
        .filter_map(|(row, record)| {
            let violations = validate_record(record);
            (!violations.is_empty()).then_some(RowViolations { row, violations })
        })
        .collect()
}
