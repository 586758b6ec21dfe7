use std::time::Duration;

/// Budget identity of a workspace whose budget has not been created yet
pub const NEW_BUDGET_ID: i64 = 0;

/// Placeholder name shown for a budget that has not been created yet
pub const NEW_BUDGET_NAME: &str = "New Budget";

/// How long a successful save is shown before returning to the budget list
pub const SAVE_CONFIRMATION_DELAY: Duration = Duration::from_millis(1500);

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Largest accepted record total, in whole currency units
pub const MAX_RECORD_TOTAL_UNITS: i64 = 1_000_000_000_000;
