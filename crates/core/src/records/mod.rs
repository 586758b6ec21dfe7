//! Records module - budget line items, field edits and validation.

mod records_model;
mod records_traits;
mod records_validation;


pub use records_model::{
    aggregate_total, format_amount, BudgetRecord, NewBudgetRecord, RecordEdit, RecordField,
    RecordIdentity,
};
pub use records_traits::BudgetRecordRepositoryTrait;
pub use records_validation::{
    max_record_total, validate_record, validate_records, FieldViolation, RowViolations,
};
