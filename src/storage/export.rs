//! Full-state export and import.
//!
//! The export document is `{ "budgetData": ..., "settings": ... }`. Import is
//! all-or-nothing: the document is validated and fully parsed before the
//! caller replaces any state, so a malformed file can never partially apply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::errors::{LedgerError, Result};
use crate::ledger::BudgetBook;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub budget_data: BudgetBook,
    #[serde(default)]
    pub settings: Settings,
}

/// Serializes the full state as a pretty JSON document.
pub fn export_document(book: &BudgetBook, settings: &Settings) -> Result<String> {
    let document = ExportDocument {
        budget_data: book.clone(),
        settings: settings.clone(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses and validates an export document without touching any state.
pub fn import_document(json: &str) -> Result<ExportDocument> {
    let value: Value = serde_json::from_str(json)
        .map_err(|err| LedgerError::ImportError(format!("not valid JSON: {}", err)))?;
    let object = value
        .as_object()
        .ok_or_else(|| LedgerError::ImportError("document must be a JSON object".into()))?;
    let budget_data = object
        .get("budgetData")
        .ok_or_else(|| LedgerError::ImportError("missing `budgetData`".into()))?;
    if !budget_data.is_object() {
        return Err(LedgerError::ImportError(
            "`budgetData` must be an object".into(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|err| LedgerError::ImportError(format!("malformed budget data: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Transaction, TransactionKind};
    use chrono::NaiveDate;

    fn sample_book() -> BudgetBook {
        let mut book = BudgetBook::new("sample");
        book.set_income("2025-01".parse().unwrap(), 5000.0).unwrap();
        book.set_budget("2025-01".parse().unwrap(), "Rent", 2000.0)
            .unwrap();
        book.record_transaction(Transaction::new(
            2000.0,
            "Rent",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            TransactionKind::Expense,
        ))
        .unwrap();
        book
    }

    #[test]
    fn export_then_import_is_deep_equal() {
        let book = sample_book();
        let settings = Settings::default();
        let json = export_document(&book, &settings).unwrap();
        let imported = import_document(&json).unwrap();
        assert_eq!(imported.budget_data, book);
        assert_eq!(imported.settings, settings);
    }

    #[test]
    fn missing_budget_data_is_rejected() {
        let err = import_document(r#"{"notBudgetData": {}}"#).unwrap_err();
        assert!(matches!(err, LedgerError::ImportError(_)));
        assert!(err.to_string().contains("budgetData"));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(import_document("[1, 2, 3]").is_err());
        assert!(import_document("not json at all").is_err());
        assert!(import_document(r#"{"budgetData": 42}"#).is_err());
    }
}
