use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;

use super::workspace_errors::{WorkspaceError, WorkspaceResult};
use super::workspace_model::{
    CommitOutcome, DeferReason, LoadState, Navigation, RenameOutcome, SaveOutcome,
    WorkspaceSnapshot,
};
use crate::budgets::{is_new_budget, Budget, BudgetRepositoryTrait, NewBudget};
use crate::constants::{NEW_BUDGET_ID, NEW_BUDGET_NAME, SAVE_CONFIRMATION_DELAY};
use crate::records::{
    aggregate_total, validate_record, validate_records, BudgetRecord,
    BudgetRecordRepositoryTrait, RecordEdit, RecordIdentity, RowViolations,
};
use crate::users::UserRepositoryTrait;

/// Editable grid of the records of one budget.
///
/// Owns the working set shown to the user and reconciles it with the remote
/// service. Remote writes are optimistic: a failed write is reported through
/// `save_error` and the local edit is kept, never rolled back.
///
/// Every operation that talks to the service takes `&mut self`, so two
/// operations can never interleave. Dropping an operation's future abandons
/// its request; any local change made before the first await stays applied.
pub struct BudgetWorkspace {
    budget_repository: Arc<dyn BudgetRepositoryTrait>,
    record_repository: Arc<dyn BudgetRecordRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
    budget_id: i64,
    /// Server copy of the budget; `None` until the budget exists remotely.
    persisted_budget: Option<Budget>,
    /// Set once this workspace has created its budget remotely.
    created_budget: bool,
    budget_name: String,
    records: Vec<BudgetRecord>,
    is_editing_name: bool,
    save_error: Option<String>,
    save_success: bool,
    load_state: LoadState,
}

impl BudgetWorkspace {
    pub fn new(
        budget_repository: Arc<dyn BudgetRepositoryTrait>,
        record_repository: Arc<dyn BudgetRecordRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
    ) -> Self {
        Self {
            budget_repository,
            record_repository,
            user_repository,
            budget_id: NEW_BUDGET_ID,
            persisted_budget: None,
            created_budget: false,
            budget_name: String::new(),
            records: Vec::new(),
            is_editing_name: false,
            save_error: None,
            save_success: false,
            load_state: LoadState::Loading,
        }
    }

    /// Loads the budget and its records, or prepares an empty new budget.
    pub async fn initialize(&mut self, budget_id: i64) -> WorkspaceResult<()> {
        self.budget_id = budget_id;
        self.persisted_budget = None;
        self.created_budget = false;
        self.records.clear();
        self.is_editing_name = false;
        self.save_error = None;
        self.save_success = false;

        if is_new_budget(budget_id) {
            debug!("Opening workspace for a new budget");
            self.budget_name = NEW_BUDGET_NAME.to_string();
            self.load_state = LoadState::Ready;
            return Ok(());
        }

        self.load_state = LoadState::Loading;
        let fetched = futures::try_join!(
            self.budget_repository.get_budget(budget_id),
            self.record_repository.get_records_for_budget(budget_id),
        );

        match fetched {
            Ok((budget, records)) => {
                self.budget_name = budget.name.clone();
                self.persisted_budget = Some(budget);
                self.records = Self::owned_records(budget_id, records);
                self.load_state = LoadState::Ready;
                debug!(
                    "Loaded budget {} with {} records",
                    budget_id,
                    self.records.len()
                );
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                error!("Failed to load budget {}: {}", budget_id, message);
                self.load_state = LoadState::Failed(message.clone());
                Err(WorkspaceError::Load(message))
            }
        }
    }

    /// Appends a blank pending row. Nothing is sent until a commit or save.
    pub fn add_record(&mut self) -> WorkspaceResult<usize> {
        self.ensure_ready()?;
        self.records.push(BudgetRecord::blank(self.budget_id, Utc::now()));
        Ok(self.records.len() - 1)
    }

    /// Keystroke-level edit: updates the working set only.
    pub fn edit_field(&mut self, row: usize, edit: RecordEdit) -> WorkspaceResult<()> {
        self.ensure_ready()?;
        self.row_mut(row)?.apply(edit);
        Ok(())
    }

    /// Applies `edit` and propagates the row to the service.
    ///
    /// Persisted rows are updated. Pending rows are created once they have a
    /// name, and the returned identity is bound onto the row. Nothing is sent
    /// while the budget itself is unsaved.
    pub async fn commit_field(
        &mut self,
        row: usize,
        edit: RecordEdit,
    ) -> WorkspaceResult<CommitOutcome> {
        self.ensure_ready()?;
        let record = {
            let record = self.row_mut(row)?;
            record.apply(edit);
            record.clone()
        };

        if is_new_budget(self.budget_id) {
            return Ok(CommitOutcome::Deferred(DeferReason::BudgetUnsaved));
        }
        if record.identity.is_pending() && record.has_blank_name() {
            return Ok(CommitOutcome::Deferred(DeferReason::BlankName));
        }
        let violations = validate_record(&record);
        if !violations.is_empty() {
            return Err(WorkspaceError::Validation(vec![RowViolations {
                row,
                violations,
            }]));
        }

        match record.identity {
            RecordIdentity::Persisted(record_id) => {
                let result = self.record_repository.update_record(record).await;
                match result {
                    Ok(()) => {
                        debug!("Updated record {}", record_id);
                        Ok(CommitOutcome::Updated)
                    }
                    Err(e) => Err(self.fail_save(format!(
                        "Failed to update record {}: {}",
                        record_id, e
                    ))),
                }
            }
            RecordIdentity::Pending => {
                let result = self
                    .record_repository
                    .create_record(record.to_new_record())
                    .await;
                match result {
                    Ok(record_id) => {
                        self.records[row].identity = RecordIdentity::Persisted(record_id);
                        debug!("Created record {} at row {}", record_id, row);
                        Ok(CommitOutcome::Created(record_id))
                    }
                    Err(e) => Err(self.fail_save(format!(
                        "Failed to create record '{}': {}",
                        record.name, e
                    ))),
                }
            }
        }
    }

    /// Removes a row immediately; persisted rows are also deleted remotely.
    ///
    /// A failed remote delete is logged and otherwise ignored: the row stays
    /// removed from the working set.
    pub async fn delete_record(&mut self, row: usize) -> WorkspaceResult<BudgetRecord> {
        self.ensure_ready()?;
        self.check_row(row)?;
        let removed = self.records.remove(row);

        if let RecordIdentity::Persisted(record_id) = removed.identity {
            let result = self.record_repository.delete_record(record_id).await;
            match result {
                Ok(()) => debug!("Deleted record {}", record_id),
                Err(e) => warn!("Failed to delete record {}: {}", record_id, e),
            }
        }
        Ok(removed)
    }

    pub fn begin_name_edit(&mut self) -> WorkspaceResult<()> {
        self.ensure_ready()?;
        self.is_editing_name = true;
        Ok(())
    }

    /// Keystroke-level edit of the budget name.
    pub fn edit_budget_name(&mut self, name: &str) -> WorkspaceResult<()> {
        self.ensure_ready()?;
        self.budget_name = name.to_string();
        Ok(())
    }

    /// Confirms a new budget name.
    ///
    /// On failure the edited name stays in place and the name editor stays open.
    pub async fn rename_budget(&mut self, new_name: &str) -> WorkspaceResult<RenameOutcome> {
        self.ensure_ready()?;
        if new_name.trim().is_empty() {
            return Err(WorkspaceError::InvalidBudgetName);
        }
        self.budget_name = new_name.to_string();

        let persisted = match &self.persisted_budget {
            Some(budget) => budget.clone(),
            None => {
                self.is_editing_name = false;
                return Ok(RenameOutcome::Staged);
            }
        };
        if persisted.name == new_name {
            self.is_editing_name = false;
            return Ok(RenameOutcome::Unchanged);
        }

        let renamed = Budget {
            name: new_name.to_string(),
            ..persisted
        };
        let result = self.budget_repository.update_budget(renamed.clone()).await;
        match result {
            Ok(()) => {
                info!("Renamed budget {} to '{}'", renamed.id, renamed.name);
                self.persisted_budget = Some(renamed);
                self.is_editing_name = false;
                Ok(RenameOutcome::Renamed)
            }
            Err(e) => Err(self.fail_save(format!("Failed to rename budget: {}", e))),
        }
    }

    /// Commits the whole workspace.
    ///
    /// Validates every row first; then creates or renames the budget, then
    /// writes every record in display order, one at a time. Writes made before
    /// a failure stay committed and their identities stay bound, so a retry
    /// only updates them.
    pub async fn save_and_exit(&mut self) -> WorkspaceResult<SaveOutcome> {
        self.ensure_ready()?;
        self.save_success = false;

        if self.budget_name.trim().is_empty() {
            return Err(WorkspaceError::InvalidBudgetName);
        }
        let failing = validate_records(&self.records);
        if !failing.is_empty() {
            warn!(
                "Save of budget {} blocked: {} invalid records",
                self.budget_id,
                failing.len()
            );
            return Err(WorkspaceError::Validation(failing));
        }
        self.save_error = None;

        match self.persisted_budget.clone() {
            None => {
                self.create_budget().await?;
            }
            Some(persisted) => {
                if persisted.name != self.budget_name {
                    self.push_budget_name(persisted).await?;
                }
            }
        }

        self.save_records().await?;
        self.save_success = true;
        self.is_editing_name = false;
        info!(
            "Saved budget {} with {} records",
            self.budget_id,
            self.records.len()
        );

        // A budget created by this workspace reopens under its identity, even
        // when the create happened in an earlier, partially failed save
        let navigation = if self.created_budget {
            Navigation::Budget(self.budget_id)
        } else {
            self.refresh_records().await;
            Navigation::BudgetList {
                after: SAVE_CONFIRMATION_DELAY,
            }
        };
        Ok(SaveOutcome {
            budget_id: self.budget_id,
            navigation,
        })
    }

    pub fn dismiss_save_error(&mut self) {
        self.save_error = None;
    }

    /// Read-only projection for rendering. The total is recomputed on every call.
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            budget_id: self.budget_id,
            budget_name: self.budget_name.clone(),
            records: self.records.clone(),
            aggregate_total: self.aggregate_total(),
            is_editing_name: self.is_editing_name,
            save_error: self.save_error.clone(),
            save_success: self.save_success,
            load_state: self.load_state.clone(),
        }
    }

    pub fn aggregate_total(&self) -> Decimal {
        aggregate_total(&self.records)
    }

    pub fn records(&self) -> &[BudgetRecord] {
        &self.records
    }

    pub fn budget_id(&self) -> i64 {
        self.budget_id
    }

    pub fn budget_name(&self) -> &str {
        &self.budget_name
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save steps
    // ─────────────────────────────────────────────────────────────────────────

    async fn create_budget(&mut self) -> WorkspaceResult<i64> {
        let result = self.user_repository.get_current_user().await;
        let user = match result {
            Ok(user) => user,
            Err(e) => {
                return Err(self.fail_save(format!("Failed to load current user: {}", e)));
            }
        };

        let new_budget = NewBudget {
            name: self.budget_name.clone(),
            creator_id: user.id,
            description: None,
            start_date: None,
            end_date: None,
        };
        let result = self.budget_repository.create_budget(new_budget.clone()).await;
        let budget_id = match result {
            Ok(id) => id,
            Err(e) => return Err(self.fail_save(format!("Failed to create budget: {}", e))),
        };

        info!("Created budget {} '{}'", budget_id, new_budget.name);
        self.budget_id = budget_id;
        self.persisted_budget = Some(new_budget.into_budget(budget_id));
        self.created_budget = true;
        for record in &mut self.records {
            record.budget_id = budget_id;
        }
        Ok(budget_id)
    }

    async fn push_budget_name(&mut self, persisted: Budget) -> WorkspaceResult<()> {
        let renamed = Budget {
            name: self.budget_name.clone(),
            ..persisted
        };
        let result = self.budget_repository.update_budget(renamed.clone()).await;
        match result {
            Ok(()) => {
                self.persisted_budget = Some(renamed);
                Ok(())
            }
            Err(e) => Err(self.fail_save(format!("Failed to update budget: {}", e))),
        }
    }

    async fn save_records(&mut self) -> WorkspaceResult<()> {
        for row in 0..self.records.len() {
            let record = self.records[row].clone();
            match record.identity {
                RecordIdentity::Persisted(record_id) => {
                    let result = self.record_repository.update_record(record).await;
                    if let Err(e) = result {
                        return Err(self.fail_save(format!(
                            "Failed to update record {}: {}",
                            record_id, e
                        )));
                    }
                }
                RecordIdentity::Pending => {
                    let result = self
                        .record_repository
                        .create_record(record.to_new_record())
                        .await;
                    match result {
                        Ok(record_id) => {
                            self.records[row].identity = RecordIdentity::Persisted(record_id);
                        }
                        Err(e) => {
                            return Err(self.fail_save(format!(
                                "Failed to create record '{}': {}",
                                record.name, e
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Replaces the working set with the server's copy after a save.
    async fn refresh_records(&mut self) {
        let result = self
            .record_repository
            .get_records_for_budget(self.budget_id)
            .await;
        match result {
            Ok(records) => self.records = Self::owned_records(self.budget_id, records),
            Err(e) => warn!(
                "Failed to refresh records of budget {} after save: {}",
                self.budget_id, e
            ),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_ready(&self) -> WorkspaceResult<()> {
        match self.load_state {
            LoadState::Ready => Ok(()),
            _ => Err(WorkspaceError::NotReady),
        }
    }

    fn check_row(&self, row: usize) -> WorkspaceResult<()> {
        if row < self.records.len() {
            Ok(())
        } else {
            Err(WorkspaceError::RowOutOfRange {
                row,
                len: self.records.len(),
            })
        }
    }

    fn row_mut(&mut self, row: usize) -> WorkspaceResult<&mut BudgetRecord> {
        self.check_row(row)?;
        Ok(&mut self.records[row])
    }

    fn fail_save(&mut self, message: String) -> WorkspaceError {
        error!("{}", message);
        self.save_error = Some(message.clone());
        self.save_success = false;
        WorkspaceError::Save(message)
    }

    fn owned_records(budget_id: i64, records: Vec<BudgetRecord>) -> Vec<BudgetRecord> {
        let total = records.len();
        let owned: Vec<BudgetRecord> = records
            .into_iter()
            .filter(|record| record.budget_id == budget_id)
            .collect();
        if owned.len() != total {
            debug!(
                "Ignored {} records not belonging to budget {}",
                total - owned.len(),
                budget_id
            );
        }
        owned
    }
}
