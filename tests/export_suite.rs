use chrono::NaiveDate;
use pocket_ledger::config::{Settings, Theme};
use pocket_ledger::ledger::{BudgetBook, Category, Transaction, TransactionKind};
use pocket_ledger::storage::export::{export_document, import_document};

fn populated_book() -> BudgetBook {
    let mut book = BudgetBook::new("export-me");
    let jan = "2025-01".parse().unwrap();
    book.set_income(jan, 5000.0).unwrap();
    book.set_budget(jan, "Rent", 2000.0).unwrap();
    book.add_category(Category::with_defaults("Rent")).unwrap();
    book.record_transaction(
        Transaction::new(
            2000.0,
            "Rent",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            TransactionKind::Expense,
        )
        .with_note("January rent"),
    )
    .unwrap();
    book
}

#[test]
fn round_trip_is_deep_equal() {
    let book = populated_book();
    let mut settings = Settings::default();
    settings.currency = "EUR".into();
    settings.theme = Theme::Dark;

    let json = export_document(&book, &settings).unwrap();
    let imported = import_document(&json).unwrap();
    assert_eq!(imported.budget_data, book);
    assert_eq!(imported.settings, settings);
}

#[test]
fn malformed_documents_do_not_parse() {
    assert!(import_document(r#"{"notBudgetData": {}}"#).is_err());
    assert!(import_document(r#"{"budgetData": []}"#).is_err());
    assert!(import_document("").is_err());
}

#[test]
fn import_failure_leaves_caller_state_intact() {
    // The import path parses fully before the caller swaps anything in; a
    // bad document therefore cannot partially apply.
    let book = populated_book();
    let snapshot = book.clone();
    let result = import_document(r#"{"notBudgetData": {}}"#);
    assert!(result.is_err());
    assert_eq!(book, snapshot);
}

#[test]
fn settings_default_when_absent_from_document() {
    let book = populated_book();
    let json = export_document(&book, &Settings::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let mut object = value.as_object().unwrap().clone();
    object.remove("settings");
    let trimmed = serde_json::to_string(&object).unwrap();

    let imported = import_document(&trimmed).unwrap();
    assert_eq!(imported.settings, Settings::default());
}
