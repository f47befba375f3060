use budget_core::{sort_transactions, SortKey, SortState, SummaryService, TransactionService};
use budget_domain::{Budget, Transaction, YearMonth};
use budget_storage_json::{load_document_from_path, save_budget_to_path};
use chrono::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

const DESCRIPTIONS: [&str; 6] = ["Lidl", "Albert", "Shell", "Netflix", "Rent", "Pharmacy"];

fn build_sample_budget(txn_count: usize) -> Budget {
    let period = YearMonth::new(2025, 10).unwrap();
    let mut budget = Budget::with_defaults(period);
    let accounts = budget.accounts.clone();
    let categories: Vec<String> = budget
        .categories
        .iter()
        .map(|category| category.name.clone())
        .collect();
    let start = YearMonth::new(2025, 1).unwrap().first_day();

    for idx in 0..txn_count {
        let date = start + Duration::days((idx % 365) as i64);
        let txn = Transaction::new(
            date,
            accounts[idx % accounts.len()].clone(),
            categories[idx % categories.len()].clone(),
            100 + (idx % 5_000) as u64,
        )
        .with_description(DESCRIPTIONS[idx % DESCRIPTIONS.len()]);
        budget.transactions.push(txn);
    }
    budget
}

fn bench_derivations(c: &mut Criterion) {
    let budget = build_sample_budget(black_box(20_000));
    let period = budget.period;

    c.bench_function("totals_20k", |b| {
        b.iter(|| black_box(SummaryService::totals(&budget, period)))
    });

    c.bench_function("compare_with_previous_20k", |b| {
        b.iter(|| black_box(SummaryService::compare_with_previous(&budget, period)))
    });

    c.bench_function("chart_data_20k", |b| {
        b.iter(|| black_box(SummaryService::chart_data(&budget, period)))
    });

    c.bench_function("sort_by_category_20k", |b| {
        let mut state = SortState::default();
        state.toggle(SortKey::Category);
        b.iter(|| {
            let mut rows = SummaryService::month_transactions(&budget, period);
            sort_transactions(&budget, &mut rows, state);
            black_box(rows.len())
        })
    });

    c.bench_function("suggest_descriptions_20k", |b| {
        b.iter(|| black_box(TransactionService::suggest_descriptions(&budget, "li")))
    });
}

fn bench_persistence(c: &mut Criterion) {
    let budget = build_sample_budget(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("budget.json");

    c.bench_function("budget_save_10k", |b| {
        b.iter(|| save_budget_to_path(&budget, &path).expect("save budget"))
    });

    save_budget_to_path(&budget, &path).expect("seed");

    c.bench_function("budget_load_10k", |b| {
        b.iter(|| black_box(load_document_from_path(&path).expect("load budget")))
    });
}

criterion_group!(benches, bench_derivations, bench_persistence);
criterion_main!(benches);
