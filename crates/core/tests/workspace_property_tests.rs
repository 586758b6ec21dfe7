//! Property-based tests for the budget workspace.
//!
//! These check that the footer total equals the sum of the rows after every
//! grid action. On an unsaved budget nothing may reach the service; on a
//! loaded budget only persisted rows may cause remote writes.

use async_trait::async_trait;
use budgetdesk_core::budgets::{Budget, BudgetRepositoryTrait, NewBudget};
use budgetdesk_core::constants::NEW_BUDGET_ID;
use budgetdesk_core::records::{
    BudgetRecord, BudgetRecordRepositoryTrait, NewBudgetRecord, RecordEdit, RecordIdentity,
};
use budgetdesk_core::users::{UserInfo, UserRepositoryTrait};
use budgetdesk_core::workspace::{BudgetWorkspace, CommitOutcome, WorkspaceError};
use budgetdesk_core::Result;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

// =============================================================================
// A service that must never be reached
// =============================================================================

struct UnreachableRemote;

#[async_trait]
impl BudgetRepositoryTrait for UnreachableRemote {
    async fn get_budget(&self, _budget_id: i64) -> Result<Budget> {
        panic!("get_budget called")
    }
    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        panic!("list_budgets called")
    }
    async fn create_budget(&self, _new_budget: NewBudget) -> Result<i64> {
        panic!("create_budget called")
    }
    async fn update_budget(&self, _budget: Budget) -> Result<()> {
        panic!("update_budget called")
    }
    async fn delete_budget(&self, _budget_id: i64) -> Result<()> {
        panic!("delete_budget called")
    }
}

#[async_trait]
impl BudgetRecordRepositoryTrait for UnreachableRemote {
    async fn list_records(&self) -> Result<Vec<BudgetRecord>> {
        panic!("list_records called")
    }
    async fn get_record(&self, _record_id: i64) -> Result<BudgetRecord> {
        panic!("get_record called")
    }
    async fn get_records_for_budget(&self, _budget_id: i64) -> Result<Vec<BudgetRecord>> {
        panic!("get_records_for_budget called")
    }
    async fn create_record(&self, _new_record: NewBudgetRecord) -> Result<i64> {
        panic!("create_record called")
    }
    async fn update_record(&self, _record: BudgetRecord) -> Result<()> {
        panic!("update_record called")
    }
    async fn delete_record(&self, _record_id: i64) -> Result<()> {
        panic!("delete_record called")
    }
}

#[async_trait]
impl UserRepositoryTrait for UnreachableRemote {
    async fn get_current_user(&self) -> Result<UserInfo> {
        panic!("get_current_user called")
    }
}

// =============================================================================
// A loaded budget whose service accepts every write
// =============================================================================

const LOADED_BUDGET_ID: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
enum Write {
    Update(i64, Decimal),
    Delete(i64),
}

struct RecordingRemote {
    records: Vec<BudgetRecord>,
    writes: Mutex<Vec<Write>>,
}

impl RecordingRemote {
    fn new(totals: &[Decimal]) -> Self {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let records = totals
            .iter()
            .enumerate()
            .map(|(i, total)| BudgetRecord {
                identity: RecordIdentity::Persisted(i as i64 + 1),
                name: format!("row {}", i + 1),
                creation_date: at,
                spending_date: Some(at),
                budget_id: LOADED_BUDGET_ID,
                total: *total,
                comment: None,
            })
            .collect();
        Self {
            records,
            writes: Mutex::new(Vec::new()),
        }
    }

    fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BudgetRepositoryTrait for RecordingRemote {
    async fn get_budget(&self, budget_id: i64) -> Result<Budget> {
        Ok(Budget {
            id: budget_id,
            name: "Household".to_string(),
            creator_id: 1,
            description: None,
            start_date: None,
            end_date: None,
        })
    }
    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        panic!("list_budgets called")
    }
    async fn create_budget(&self, _new_budget: NewBudget) -> Result<i64> {
        panic!("create_budget called")
    }
    async fn update_budget(&self, _budget: Budget) -> Result<()> {
        panic!("update_budget called")
    }
    async fn delete_budget(&self, _budget_id: i64) -> Result<()> {
        panic!("delete_budget called")
    }
}

#[async_trait]
impl BudgetRecordRepositoryTrait for RecordingRemote {
    async fn list_records(&self) -> Result<Vec<BudgetRecord>> {
        panic!("list_records called")
    }
    async fn get_record(&self, _record_id: i64) -> Result<BudgetRecord> {
        panic!("get_record called")
    }
    async fn get_records_for_budget(&self, _budget_id: i64) -> Result<Vec<BudgetRecord>> {
        Ok(self.records.clone())
    }
    async fn create_record(&self, _new_record: NewBudgetRecord) -> Result<i64> {
        panic!("create_record called for a row without a name")
    }
    async fn update_record(&self, record: BudgetRecord) -> Result<()> {
        let id = record.identity.id().expect("update without identity");
        self.writes.lock().unwrap().push(Write::Update(id, record.total));
        Ok(())
    }
    async fn delete_record(&self, record_id: i64) -> Result<()> {
        self.writes.lock().unwrap().push(Write::Delete(record_id));
        Ok(())
    }
}

#[async_trait]
impl UserRepositoryTrait for RecordingRemote {
    async fn get_current_user(&self) -> Result<UserInfo> {
        panic!("get_current_user called")
    }
}

// =============================================================================
// Generators
// =============================================================================

#[derive(Debug, Clone)]
enum GridAction {
    Add,
    SetTotal(usize, Decimal),
    Commit(usize, Decimal),
    Delete(usize),
}

/// Amounts with two decimal places, negative ones included.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_action() -> impl Strategy<Value = GridAction> {
    prop_oneof![
        2 => Just(GridAction::Add),
        3 => (0usize..8, arb_amount()).prop_map(|(row, amount)| GridAction::SetTotal(row, amount)),
        1 => (0usize..8, arb_amount()).prop_map(|(row, amount)| GridAction::Commit(row, amount)),
        1 => (0usize..8).prop_map(GridAction::Delete),
    ]
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

/// One row of the expected grid: its total and its identity once loaded.
#[derive(Debug, Clone, Copy)]
struct ModelRow {
    total: Decimal,
    id: Option<i64>,
}

/// Applies `actions` to `ws` and to a plain model side by side, checking the
/// total after each step. Returns the remote writes the model predicts.
async fn drive(
    ws: &mut BudgetWorkspace,
    mut model: Vec<ModelRow>,
    actions: Vec<GridAction>,
    budget_saved: bool,
) -> Vec<Write> {
    let mut expected_writes = Vec::new();
    for (step, action) in actions.into_iter().enumerate() {
        match action {
            GridAction::Add => {
                ws.add_record().expect("add");
                model.push(ModelRow {
                    total: Decimal::ZERO,
                    id: None,
                });
            }
            GridAction::SetTotal(row, amount) => {
                let result = ws.edit_field(row, RecordEdit::Total(amount));
                if row < model.len() {
                    result.expect("edit");
                    model[row].total = amount;
                } else {
                    assert!(result.is_err());
                }
            }
            GridAction::Commit(row, amount) => {
                let result = ws.commit_field(row, RecordEdit::Total(amount)).await;
                if row >= model.len() {
                    assert!(matches!(result, Err(WorkspaceError::RowOutOfRange { .. })));
                } else {
                    model[row].total = amount;
                    match (budget_saved, model[row].id) {
                        (true, Some(id)) if amount >= Decimal::ZERO => {
                            assert_eq!(result, Ok(CommitOutcome::Updated));
                            expected_writes.push(Write::Update(id, amount));
                        }
                        (true, Some(_)) => {
                            assert!(matches!(result, Err(WorkspaceError::Validation(_))));
                        }
                        _ => assert!(matches!(result, Ok(CommitOutcome::Deferred(_)))),
                    }
                }
            }
            GridAction::Delete(row) => {
                if row < model.len() {
                    ws.delete_record(row).await.expect("delete");
                    if let Some(id) = model.remove(row).id {
                        expected_writes.push(Write::Delete(id));
                    }
                }
            }
        }

        let expected: Decimal = model.iter().map(|r| r.total).sum();
        assert_eq!(ws.snapshot().aggregate_total, expected, "after step {}", step);
        assert_eq!(ws.records().len(), model.len(), "after step {}", step);
    }
    expected_writes
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_total_matches_rows_on_unsaved_budget(
        actions in proptest::collection::vec(arb_action(), 0..40)
    ) {
        let writes = run(async move {
            let remote = Arc::new(UnreachableRemote);
            let mut ws = BudgetWorkspace::new(remote.clone(), remote.clone(), remote);
            ws.initialize(NEW_BUDGET_ID).await.expect("initialize");
            drive(&mut ws, Vec::new(), actions, false).await
        });
        prop_assert!(writes.is_empty());
    }

    #[test]
    fn prop_total_matches_rows_on_loaded_budget(
        initial in proptest::collection::vec((0i64..1_000_000).prop_map(|c| Decimal::new(c, 2)), 0..6),
        actions in proptest::collection::vec(arb_action(), 0..40)
    ) {
        let (expected_writes, writes) = run(async move {
            let remote = Arc::new(RecordingRemote::new(&initial));
            let mut ws = BudgetWorkspace::new(remote.clone(), remote.clone(), remote.clone());
            ws.initialize(LOADED_BUDGET_ID).await.expect("initialize");
            let model = initial
                .iter()
                .enumerate()
                .map(|(i, total)| ModelRow { total: *total, id: Some(i as i64 + 1) })
                .collect();
            let expected_writes = drive(&mut ws, model, actions, true).await;
            (expected_writes, remote.writes())
        });
        prop_assert_eq!(writes, expected_writes);
    }
}
