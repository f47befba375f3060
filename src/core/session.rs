//! Explicitly owned budget state: store, persistence, clock and session-only
//! flags live together and every mutation is flushed immediately.

use std::{path::Path, sync::Arc};

use budget_core::{
    budget_warnings, sort_transactions, AccountService, BudgetStorage, CategoryService,
    CategoryShare, ChartData, Clock, GroupTotals, ImportSummary, PeriodComparison, PeriodService,
    RecurringService, SnoozeSet, SortKey, SortState, SummaryService, TransactionService,
    TransferService,
};
use budget_domain::{
    Budget, Category, CategoryGroup, RecurringTemplate, RecurringTemplatePatch, Transaction,
    TransactionPatch, YearMonth,
};
use budget_storage_json::{load_document_from_path, save_budget_to_path};
use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{BudgetError, Result};

/// Outcome of opening a session from the persisted blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// `true` when a stored document was found and applied.
    pub restored: bool,
    pub warnings: Vec<String>,
}

pub struct BudgetSession {
    budget: Budget,
    storage: Box<dyn BudgetStorage>,
    clock: Arc<dyn Clock>,
    snoozed: SnoozeSet,
    sort: SortState,
    revision: u64,
}

impl BudgetSession {
    /// Starts from the defaults for the current month and overlays whatever
    /// the storage holds. An unreadable blob is reported and ignored.
    pub fn open(
        storage: Box<dyn BudgetStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, LoadReport)> {
        let mut budget = Budget::with_defaults(YearMonth::from_date(clock.today()));
        let mut report = LoadReport::default();
        if let Some(blob) = storage.load_blob()? {
            match TransferService::parse_document(&blob) {
                Ok(document) => {
                    TransferService::apply_document(&mut budget, document);
                    report.restored = true;
                }
                Err(err) => {
                    warn!(error = %err, "stored budget could not be read, starting from defaults");
                    report
                        .warnings
                        .push(format!("Stored budget ignored: {err}"));
                }
            }
        }
        report.warnings.extend(budget_warnings(&budget));
        info!(
            period = %budget.period,
            transactions = budget.transactions.len(),
            restored = report.restored,
            "budget session opened"
        );
        let session = Self {
            budget,
            storage,
            clock,
            snoozed: SnoozeSet::new(),
            sort: SortState::default(),
            revision: 0,
        };
        Ok((session, report))
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn period(&self) -> YearMonth {
        self.budget.period
    }

    /// Increments whenever the store, the period or the snooze set changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snoozed(&self) -> &SnoozeSet {
        &self.snoozed
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn toggle_sort(&mut self, key: SortKey) -> SortState {
        self.sort.toggle(key);
        self.sort
    }

    // ----- period -----

    pub fn set_period(&mut self, period: YearMonth) -> Result<()> {
        self.commit(|budget| {
            PeriodService::set(budget, period);
            Ok(())
        })
    }

    pub fn shift_period(&mut self, delta: i32) -> Result<YearMonth> {
        self.commit(|budget| Ok(PeriodService::shift(budget, delta)))
    }

    // ----- transactions -----

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<Uuid> {
        self.commit(|budget| Ok(TransactionService::add(budget, transaction)?))
    }

    pub fn update_transaction(&mut self, id: Uuid, patch: &TransactionPatch) -> Result<()> {
        self.commit(|budget| Ok(TransactionService::update(budget, id, patch)?))
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction> {
        self.commit(|budget| Ok(TransactionService::remove(budget, id)?))
    }

    pub fn suggest_descriptions(&self, query: &str) -> Vec<String> {
        TransactionService::suggest_descriptions(&self.budget, query)
    }

    pub fn default_date(&self) -> NaiveDate {
        TransactionService::default_date(self.budget.period, self.today())
    }

    // ----- categories & accounts -----

    pub fn add_category(&mut self, name: &str, group: CategoryGroup) -> Result<()> {
        self.commit(|budget| Ok(CategoryService::add(budget, Category::new(name, group))?))
    }

    pub fn rename_category(&mut self, current: &str, new_name: &str) -> Result<usize> {
        self.commit(|budget| Ok(CategoryService::rename(budget, current, new_name)?))
    }

    pub fn set_category_group(&mut self, name: &str, group: CategoryGroup) -> Result<()> {
        self.commit(|budget| Ok(CategoryService::set_group(budget, name, group)?))
    }

    pub fn remove_category(&mut self, name: &str) -> Result<usize> {
        self.commit(|budget| Ok(CategoryService::remove(budget, name)?))
    }

    /// Saves the whole category list at once. Records pointing at a category
    /// missing from `categories` become uncategorized.
    pub fn replace_categories(&mut self, categories: Vec<Category>) -> Result<usize> {
        self.commit(|budget| Ok(CategoryService::replace(budget, categories)?))
    }

    pub fn categories_in_group(&self, group: CategoryGroup) -> Vec<&Category> {
        CategoryService::in_group(&self.budget, group)
    }

    pub fn add_account(&mut self, name: &str) -> Result<()> {
        self.commit(|budget| Ok(AccountService::add(budget, name)?))
    }

    pub fn rename_account(&mut self, current: &str, new_name: &str) -> Result<usize> {
        self.commit(|budget| Ok(AccountService::rename(budget, current, new_name)?))
    }

    pub fn remove_account(&mut self, name: &str) -> Result<()> {
        self.commit(|budget| Ok(AccountService::remove(budget, name)?))
    }

    // ----- recurring -----

    pub fn add_template(&mut self, template: RecurringTemplate) -> Result<Uuid> {
        self.commit(|budget| Ok(RecurringService::add(budget, template)?))
    }

    pub fn update_template(&mut self, id: Uuid, patch: &RecurringTemplatePatch) -> Result<()> {
        self.commit(|budget| Ok(RecurringService::update(budget, id, patch)?))
    }

    pub fn remove_template(&mut self, id: Uuid) -> Result<RecurringTemplate> {
        self.commit(|budget| Ok(RecurringService::remove(budget, id)?))
    }

    /// The template to offer for confirmation right now, if any.
    pub fn due_template(&self) -> Option<&RecurringTemplate> {
        RecurringService::next_due(&self.budget, self.today(), &self.snoozed)
    }

    pub fn confirm_recurring(
        &mut self,
        id: Uuid,
        account: &str,
        amount: Option<u64>,
    ) -> Result<Uuid> {
        let today = self.today();
        self.commit(|budget| Ok(RecurringService::confirm(budget, id, today, account, amount)?))
    }

    /// Hides a template until the session ends. Never persisted.
    pub fn defer_recurring(&mut self, id: Uuid) -> Result<()> {
        if self.budget.template(id).is_none() {
            return Err(BudgetError::RecurringError(format!("template {id} not found")));
        }
        if self.snoozed.snooze(id) {
            self.revision += 1;
        }
        Ok(())
    }

    pub fn recurring_monthly_total(&self) -> u64 {
        RecurringService::monthly_total(&self.budget)
    }

    // ----- derived views -----

    /// Transactions of the selected period in the current sort order.
    pub fn period_transactions(&self) -> Vec<&Transaction> {
        let mut rows = SummaryService::month_transactions(&self.budget, self.budget.period);
        sort_transactions(&self.budget, &mut rows, self.sort);
        rows
    }

    pub fn totals(&self) -> GroupTotals {
        SummaryService::totals(&self.budget, self.budget.period)
    }

    pub fn comparison(&self) -> PeriodComparison {
        SummaryService::compare_with_previous(&self.budget, self.budget.period)
    }

    pub fn breakdown(&self) -> Vec<CategoryShare> {
        SummaryService::category_breakdown(&self.budget, self.budget.period)
    }

    pub fn chart(&self) -> ChartData {
        SummaryService::chart_data(&self.budget, self.budget.period)
    }

    // ----- import / export -----

    pub fn export_json(&self) -> Result<String> {
        Ok(TransferService::export_json(&self.budget)?)
    }

    pub fn export_to_path(&self, path: &Path) -> Result<()> {
        save_budget_to_path(&self.budget, path)?;
        info!(path = %path.display(), "budget exported to file");
        Ok(())
    }

    pub fn import_json(&mut self, raw: &str) -> Result<ImportSummary> {
        self.commit(|budget| Ok(TransferService::import_json(budget, raw)?))
    }

    pub fn import_from_path(&mut self, path: &Path) -> Result<ImportSummary> {
        let document = load_document_from_path(path)?;
        let summary =
            self.commit(|budget| Ok(TransferService::apply_document(budget, document)))?;
        info!(path = %path.display(), %summary, "budget imported from file");
        Ok(summary)
    }

    /// Applies `change` and persists the result. The store is rolled back when
    /// either step fails, so a reported error always means nothing changed.
    fn commit<T>(&mut self, change: impl FnOnce(&mut Budget) -> Result<T>) -> Result<T> {
        let snapshot = self.budget.clone();
        let outcome = change(&mut self.budget).and_then(|value| {
            self.flush()?;
            Ok(value)
        });
        match outcome {
            Ok(value) => {
                self.revision += 1;
                Ok(value)
            }
            Err(err) => {
                self.budget = snapshot;
                Err(err)
            }
        }
    }

    fn flush(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.budget)?;
        self.storage.save_blob(&blob).map_err(|err| {
            warn!(error = %err, "budget could not be saved, change rolled back");
            BudgetError::StorageError(err.to_string())
        })
    }
}
