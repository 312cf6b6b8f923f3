//! Defensive rehydration of persisted books.
//!
//! Persisted JSON may come from older app versions or hand edits. This step
//! repairs what it can (bad dates fall back to today, out-of-range amounts
//! are clamped or dropped) and reports every repair as a warning, so the
//! ledger itself only ever sees valid state.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::ledger::{
    BudgetBook, Category, PeriodBucket, PeriodKey, Transaction, TransactionKind,
};

/// Outcome of loading a persisted book: the sanitized state plus warnings
/// describing every repair that was applied.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub book: BudgetBook,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn clean(book: BudgetBook) -> Self {
        Self {
            book,
            warnings: Vec::new(),
        }
    }
}

/// Loosely-typed mirror of the persisted document; every field is optional
/// so a partially damaged file still rehydrates.
#[derive(Debug, Deserialize)]
pub(crate) struct RawBook {
    name: Option<String>,
    #[serde(default)]
    buckets: BTreeMap<String, RawBucket>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    transactions: Vec<RawTransaction>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawBucket {
    #[serde(default)]
    budgets: BTreeMap<String, f64>,
    #[serde(default)]
    income: f64,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    id: Option<Uuid>,
    amount: Option<f64>,
    category: Option<String>,
    date: Option<String>,
    kind: Option<TransactionKind>,
    note: Option<String>,
}

pub(crate) fn sanitize(raw: RawBook, today: NaiveDate) -> LoadReport {
    let mut warnings = Vec::new();

    let mut buckets: BTreeMap<PeriodKey, PeriodBucket> = BTreeMap::new();
    for (key, raw_bucket) in raw.buckets {
        let period: PeriodKey = match key.parse() {
            Ok(period) => period,
            Err(_) => {
                warnings.push(format!("dropped bucket with invalid period key `{}`", key));
                continue;
            }
        };
        let mut bucket = PeriodBucket::default();
        bucket.income = if raw_bucket.income.is_finite() && raw_bucket.income >= 0.0 {
            raw_bucket.income
        } else {
            warnings.push(format!("reset invalid income for period {}", period));
            0.0
        };
        for (name, amount) in raw_bucket.budgets {
            if amount.is_finite() && amount >= 0.0 {
                bucket.budgets.insert(name, amount);
            } else {
                warnings.push(format!(
                    "reset invalid budget for `{}` in period {}",
                    name, period
                ));
                bucket.budgets.insert(name, 0.0);
            }
        }
        buckets.insert(period, bucket);
    }

    let mut transactions = Vec::new();
    for raw_txn in raw.transactions {
        let amount = raw_txn.amount.unwrap_or(f64::NAN);
        if !amount.is_finite() || amount <= 0.0 {
            warnings.push("dropped transaction with non-positive amount".to_string());
            continue;
        }
        let date = match raw_txn.date.as_deref().map(str::parse::<NaiveDate>) {
            Some(Ok(date)) => date,
            _ => {
                warnings.push("transaction date unreadable, fell back to today".to_string());
                today
            }
        };
        transactions.push(Transaction {
            id: raw_txn.id.unwrap_or_else(Uuid::new_v4),
            amount,
            category: raw_txn.category.unwrap_or_else(|| {
                warnings.push("transaction missing category name".to_string());
                "Uncategorized".to_string()
            }),
            date,
            kind: raw_txn.kind.unwrap_or(TransactionKind::Expense),
            note: raw_txn.note,
        });
    }

    let now = Utc::now();
    let book = BudgetBook::from_parts(
        raw.name.unwrap_or_else(|| "book".to_string()),
        buckets,
        raw.categories,
        transactions,
        raw.created_at.unwrap_or(now),
        raw.updated_at.unwrap_or(now),
    );

    for warning in &warnings {
        warn!("rehydration: {}", warning);
    }
    LoadReport { book, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize_json(json: &str) -> LoadReport {
        let raw: RawBook = serde_json::from_str(json).unwrap();
        sanitize(raw, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn clean_document_produces_no_warnings() {
        let report = sanitize_json(
            r#"{
                "name": "household",
                "buckets": {"2025-01": {"budgets": {"Rent": 2000.0}, "income": 5000.0}},
                "transactions": [
                    {"amount": 40.0, "category": "Groceries", "date": "2025-01-10", "kind": "expense"}
                ]
            }"#,
        );
        assert!(report.warnings.is_empty());
        assert_eq!(report.book.transactions().len(), 1);
        assert_eq!(report.book.income("2025-01".parse().unwrap()), 5000.0);
    }

    #[test]
    fn bad_dates_fall_back_to_today() {
        let report = sanitize_json(
            r#"{"transactions": [{"amount": 10.0, "category": "Misc", "date": "not-a-date", "kind": "expense"}]}"#,
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.book.transactions()[0].date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn invalid_buckets_and_amounts_are_repaired() {
        let report = sanitize_json(
            r#"{
                "buckets": {
                    "garbage": {"income": 100.0},
                    "2025-02": {"budgets": {"Rent": -5.0}, "income": -1.0}
                },
                "transactions": [{"amount": -3.0, "category": "Misc", "date": "2025-02-01", "kind": "expense"}]
            }"#,
        );
        let period: PeriodKey = "2025-02".parse().unwrap();
        assert_eq!(report.book.income(period), 0.0);
        assert_eq!(report.book.budgets_for(period)["Rent"], 0.0);
        assert!(report.book.transactions().is_empty());
        assert_eq!(report.warnings.len(), 4);
    }
}
