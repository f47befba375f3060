use std::sync::Arc;

use budget_core::{BudgetStorage, CoreError, FixedClock, MemoryStorage};
use budget_domain::{Category, CategoryGroup, RecurringTemplate, Transaction, YearMonth};
use chrono::NaiveDate;
use home_budget::{BudgetError, BudgetSession};

/// Lets several sessions share one in-memory blob, like reloading the app.
struct SharedStorage(Arc<MemoryStorage>);

impl BudgetStorage for SharedStorage {
    fn load_blob(&self) -> Result<Option<String>, CoreError> {
        self.0.load_blob()
    }

    fn save_blob(&self, blob: &str) -> Result<(), CoreError> {
        self.0.save_blob(blob)
    }
}

/// Reads fine but refuses every write, like a full disk.
struct ReadOnlyStorage(MemoryStorage);

impl BudgetStorage for ReadOnlyStorage {
    fn load_blob(&self) -> Result<Option<String>, CoreError> {
        self.0.load_blob()
    }

    fn save_blob(&self, _blob: &str) -> Result<(), CoreError> {
        Err(CoreError::Storage("quota exceeded".into()))
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn open(storage: &Arc<MemoryStorage>, today: NaiveDate) -> BudgetSession {
    let (session, _) = BudgetSession::open(
        Box::new(SharedStorage(Arc::clone(storage))),
        Arc::new(FixedClock(today)),
    )
    .expect("open session");
    session
}

#[test]
fn fresh_session_starts_from_defaults_for_the_current_month() {
    let storage = Arc::new(MemoryStorage::new());
    let session = open(&storage, date(2025, 10, 16));

    assert_eq!(session.period(), YearMonth::new(2025, 10).unwrap());
    assert!(session.budget().accounts.contains(&"Checking".to_string()));
    assert!(session.budget().category("Salary").is_some());
    assert!(storage.snapshot().is_none(), "opening alone must not write");
}

#[test]
fn every_mutation_is_flushed_to_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let mut session = open(&storage, date(2025, 10, 16));

    session
        .add_transaction(
            Transaction::new(date(2025, 10, 6), "Checking", "Salary", 34_137)
                .with_description("October salary"),
        )
        .unwrap();
    let before = session.revision();
    session.add_category("Pets", CategoryGroup::Wants).unwrap();
    assert!(session.revision() > before);

    let reopened = open(&storage, date(2025, 10, 16));
    assert_eq!(reopened.budget().transactions.len(), 1);
    assert_eq!(reopened.budget().transactions[0].description, "October salary");
    assert_eq!(
        reopened.budget().group_of("Pets"),
        Some(CategoryGroup::Wants)
    );
}

#[test]
fn rejected_mutation_leaves_storage_untouched() {
    let storage = Arc::new(MemoryStorage::new());
    let mut session = open(&storage, date(2025, 10, 16));

    let err = session
        .add_transaction(Transaction::new(date(2025, 11, 2), "Checking", "Groceries", 120))
        .unwrap_err();
    assert!(matches!(err, BudgetError::InvalidInput(_)), "unexpected error: {err:?}");
    assert!(storage.snapshot().is_none());
    assert_eq!(session.revision(), 0);
}

#[test]
fn due_template_is_offered_once_then_deferred_until_reload() {
    let storage = Arc::new(MemoryStorage::new());
    let today = date(2025, 10, 16);
    let mut session = open(&storage, today);
    let rent = session
        .add_template(RecurringTemplate::new("Rent", "Rent / mortgage", 11_500, 15))
        .unwrap();

    assert_eq!(session.due_template().map(|template| template.id), Some(rent));

    session.defer_recurring(rent).unwrap();
    assert!(session.due_template().is_none());
    assert!(session.snoozed().contains(rent));

    let mut reloaded = open(&storage, today);
    assert!(reloaded.snoozed().is_empty());
    assert_eq!(reloaded.due_template().map(|template| template.id), Some(rent));

    let txn_id = reloaded.confirm_recurring(rent, "Checking", None).unwrap();
    assert!(reloaded.due_template().is_none());
    let recorded = reloaded.budget().transaction(txn_id).unwrap();
    assert_eq!(recorded.description, "Rent (recurring)");
    assert_eq!(recorded.recurring_ref, Some(rent));
    assert_eq!(recorded.date, today);
}

#[test]
fn due_template_waits_for_its_day_and_the_current_month() {
    let storage = Arc::new(MemoryStorage::new());
    let mut session = open(&storage, date(2025, 10, 14));
    session
        .add_template(RecurringTemplate::new("Rent", "Rent / mortgage", 11_500, 15))
        .unwrap();
    assert!(session.due_template().is_none());

    let mut later = open(&storage, date(2025, 10, 15));
    assert!(later.due_template().is_some());
    later.shift_period(-1).unwrap();
    assert!(later.due_template().is_none());
}

#[test]
fn corrupt_blob_is_reported_and_defaults_are_used() {
    let storage = MemoryStorage::with_blob("{ not json");
    let (session, report) =
        BudgetSession::open(Box::new(storage), Arc::new(FixedClock(date(2025, 10, 16))))
            .unwrap();

    assert!(!report.restored);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("Stored budget ignored"));
    assert!(session.budget().transactions.is_empty());
}

#[test]
fn summary_views_follow_the_selected_period() {
    let storage = Arc::new(MemoryStorage::new());
    let mut session = open(&storage, date(2025, 10, 16));
    session
        .add_transaction(Transaction::new(date(2025, 10, 6), "Checking", "Salary", 34_137))
        .unwrap();
    session
        .add_transaction(Transaction::new(date(2025, 10, 7), "Checking", "Rent / mortgage", 11_500))
        .unwrap();
    session
        .add_transaction(Transaction::new(date(2025, 10, 9), "Cash", "Groceries", 980))
        .unwrap();

    let totals = session.totals();
    assert_eq!(totals.income, 34_137);
    assert_eq!(totals.expenses(), 12_480);
    assert_eq!(totals.balance(), 21_657);

    let shares: Vec<(String, u32)> = session
        .breakdown()
        .into_iter()
        .map(|share| (share.category, share.percent))
        .collect();
    assert_eq!(
        shares,
        vec![("Rent / mortgage".to_string(), 92), ("Groceries".to_string(), 8)]
    );
    assert!(!session.comparison().previous_has_data);

    session.shift_period(1).unwrap();
    assert_eq!(session.totals().expenses(), 0);
    assert!(session.chart().is_empty());
    assert!(session.comparison().previous_has_data);
}

#[test]
fn import_replaces_only_present_sections() {
    let storage = Arc::new(MemoryStorage::new());
    let mut session = open(&storage, date(2025, 10, 16));
    let accounts_before = session.budget().accounts.clone();

    let summary = session
        .import_json(
            r#"{"transactions":[{"id":"6f1f4a54-7f2b-4f55-9d5b-3b0d7c1d8a11","date":"2025-10-03","account":"Checking","description":"Lidl","category":"Groceries","amount":412}]}"#,
        )
        .unwrap();

    assert_eq!(summary.transactions, Some(1));
    assert_eq!(summary.accounts, None);
    assert_eq!(session.budget().accounts, accounts_before);
    assert_eq!(session.period(), YearMonth::new(2025, 10).unwrap());
    assert!(storage.snapshot().unwrap().contains("Lidl"));

    let err = session.import_json("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, BudgetError::ImportError(_)), "unexpected error: {err:?}");
    assert_eq!(session.budget().transactions.len(), 1);
}

#[test]
fn failed_save_rolls_the_change_back() {
    let (mut session, _) = BudgetSession::open(
        Box::new(ReadOnlyStorage(MemoryStorage::new())),
        Arc::new(FixedClock(date(2025, 10, 16))),
    )
    .unwrap();
    let categories_before = session.budget().categories.clone();

    let err = session
        .add_transaction(Transaction::new(date(2025, 10, 6), "Checking", "Salary", 34_137))
        .unwrap_err();
    assert!(matches!(err, BudgetError::StorageError(_)), "unexpected error: {err:?}");
    assert!(session.budget().transactions.is_empty());

    assert!(session.add_category("Pets", CategoryGroup::Wants).is_err());
    assert_eq!(session.budget().categories, categories_before);

    assert!(session.shift_period(1).is_err());
    assert_eq!(session.period(), YearMonth::new(2025, 10).unwrap());
    assert_eq!(session.revision(), 0);
}

#[test]
fn replacing_categories_uncategorizes_dropped_ones() {
    let storage = Arc::new(MemoryStorage::new());
    let mut session = open(&storage, date(2025, 10, 16));
    session
        .add_transaction(Transaction::new(date(2025, 10, 9), "Cash", "Groceries", 980))
        .unwrap();
    session
        .add_transaction(Transaction::new(date(2025, 10, 6), "Checking", "Salary", 34_137))
        .unwrap();

    let remapped = session
        .replace_categories(vec![
            Category::new("Salary", CategoryGroup::Income),
            Category::new("Food", CategoryGroup::Needs),
        ])
        .unwrap();

    assert_eq!(remapped, 1);
    let names: Vec<&str> = session.budget().categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Salary", "Food"]);
    let reopened = open(&storage, date(2025, 10, 16));
    assert!(reopened
        .budget()
        .transactions
        .iter()
        .any(|txn| txn.category == "-"));
}
