use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};

use super::{
    category::Category,
    period::{DateWindow, PeriodKey},
    transaction::{Transaction, TransactionKind},
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Period-local state: budgeted amount per category name, and the income
/// recorded for that month. Budgets are keyed by name on purpose; the
/// category entity set is joined by name match at query time only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PeriodBucket {
    #[serde(default)]
    pub budgets: BTreeMap<String, f64>,
    #[serde(default)]
    pub income: f64,
}

/// The single authority for period-bucketed budget state.
///
/// Buckets exist lazily: the first write to a period creates it, and reads of
/// untouched periods answer with zero defaults instead of erroring.
/// Transactions are global facts kept in insertion order and filtered by date
/// window, never physically partitioned into buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetBook {
    pub name: String,
    #[serde(default)]
    buckets: BTreeMap<PeriodKey, PeriodBucket>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "BudgetBook::schema_version_default")]
    pub schema_version: u8,
}

impl BudgetBook {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            buckets: BTreeMap::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    /// Assembles a book from already-sanitized parts. The storage layer's
    /// rehydration step uses this; ledger code can assume the result is
    /// valid.
    pub(crate) fn from_parts(
        name: String,
        buckets: BTreeMap<PeriodKey, PeriodBucket>,
        categories: Vec<Category>,
        transactions: Vec<Transaction>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            buckets,
            categories,
            transactions,
            created_at,
            updated_at,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // --- income ---

    /// Overwrites the income recorded for a period. Last write wins.
    pub fn set_income(&mut self, period: PeriodKey, amount: f64) -> Result<()> {
        validate_amount(amount, true)?;
        debug!(period = %period, amount, "set income");
        self.buckets.entry(period).or_default().income = amount;
        self.touch();
        Ok(())
    }

    /// Income recorded for one period; `0` when the period was never touched.
    pub fn income(&self, period: PeriodKey) -> f64 {
        self.buckets.get(&period).map_or(0.0, |b| b.income)
    }

    /// Sum of monthly incomes across every period key the window overlaps.
    /// Degenerates to a single lookup for a month window.
    pub fn income_in(&self, window: DateWindow) -> f64 {
        PeriodKey::keys_in(window)
            .into_iter()
            .map(|key| self.income(key))
            .sum()
    }

    // --- budgets ---

    /// Overwrites the budgeted amount for a category name within a period,
    /// creating the bucket on first write. The name is not checked against
    /// the category set.
    pub fn set_budget(&mut self, period: PeriodKey, category: &str, amount: f64) -> Result<()> {
        validate_amount(amount, true)?;
        debug!(period = %period, category, amount, "set budget");
        self.buckets
            .entry(period)
            .or_default()
            .budgets
            .insert(category.to_string(), amount);
        self.touch();
        Ok(())
    }

    /// Removes a category's budget entry from one period, if present.
    pub fn clear_budget(&mut self, period: PeriodKey, category: &str) {
        if let Some(bucket) = self.buckets.get_mut(&period) {
            bucket.budgets.remove(category);
            self.touch();
        }
    }

    /// Budget map for the period; empty for untouched periods, never errors.
    pub fn budgets_for(&self, period: PeriodKey) -> BTreeMap<String, f64> {
        self.buckets
            .get(&period)
            .map(|b| b.budgets.clone())
            .unwrap_or_default()
    }

    /// Income minus the budgeted total for a period. Negative means the user
    /// allocated more than the income, which is allowed and displayed, not
    /// rejected.
    pub fn remaining_to_allocate(&self, period: PeriodKey) -> f64 {
        let bucket = match self.buckets.get(&period) {
            Some(bucket) => bucket,
            None => return 0.0,
        };
        bucket.income - bucket.budgets.values().sum::<f64>()
    }

    pub fn periods(&self) -> impl Iterator<Item = PeriodKey> + '_ {
        self.buckets.keys().copied()
    }

    // --- categories ---

    /// Adds a category to the active set. Names may repeat; identity is the
    /// generated id.
    pub fn add_category(&mut self, category: Category) -> Result<Uuid> {
        if category.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "category name must not be empty".into(),
            ));
        }
        let id = category.id;
        debug!(%id, name = %category.name, "add category");
        self.categories.push(category);
        self.touch();
        Ok(id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn rename_category(&mut self, id: Uuid, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "category name must not be empty".into(),
            ));
        }
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LedgerError::InvalidInput(format!("category {} not found", id)))?;
        category.name = name;
        self.touch();
        Ok(())
    }

    /// Removes a category from the active set. Transactions and budget
    /// entries referencing its name are left in place as orphans.
    pub fn remove_category(&mut self, id: Uuid) -> Result<Category> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LedgerError::InvalidInput(format!("category {} not found", id)))?;
        let removed = self.categories.remove(index);
        debug!(%id, name = %removed.name, "remove category");
        self.touch();
        Ok(removed)
    }

    // --- transactions ---

    /// Appends a transaction, preserving insertion order. Amounts must be
    /// strictly positive and finite; the income/expense direction lives in
    /// `kind`.
    pub fn record_transaction(&mut self, transaction: Transaction) -> Result<Uuid> {
        validate_amount(transaction.amount, false)?;
        let id = transaction.id;
        debug!(%id, amount = transaction.amount, category = %transaction.category, "record transaction");
        self.transactions.push(transaction);
        self.touch();
        Ok(id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| LedgerError::InvalidInput(format!("transaction {} not found", id)))?;
        let removed = self.transactions.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Transactions whose date falls in the window, in insertion order.
    pub fn transactions_in(&self, window: DateWindow) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| window.contains(t.date))
    }

    /// Expense totals grouped by category name for the window. Spent is
    /// always derived here; it is never stored on the category.
    pub fn spent_in(&self, window: DateWindow) -> BTreeMap<String, f64> {
        let mut spent: BTreeMap<String, f64> = BTreeMap::new();
        for txn in self.transactions_in(window) {
            if txn.is_expense() {
                *spent.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
            }
        }
        spent
    }

    /// Per-month income and expense transaction totals across the window,
    /// one point per period key, for trend charts.
    pub fn monthly_trend(&self, window: DateWindow) -> Vec<TrendPoint> {
        PeriodKey::keys_in(window)
            .into_iter()
            .map(|period| {
                let mut point = TrendPoint {
                    period,
                    income: 0.0,
                    expenses: 0.0,
                };
                for txn in self.transactions_in(window) {
                    if PeriodKey::from_date(txn.date) != period {
                        continue;
                    }
                    match txn.kind {
                        TransactionKind::Income => point.income += txn.amount,
                        TransactionKind::Expense => point.expenses += txn.amount,
                    }
                }
                point
            })
            .collect()
    }
}

/// One month of transaction totals for the dashboard trend series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub period: PeriodKey,
    pub income: f64,
    pub expenses: f64,
}

fn validate_amount(amount: f64, zero_allowed: bool) -> Result<()> {
    if !amount.is_finite() {
        return Err(LedgerError::InvalidInput("amount must be a number".into()));
    }
    if amount < 0.0 || (!zero_allowed && amount == 0.0) {
        let bound = if zero_allowed { "negative" } else { "positive" };
        return Err(LedgerError::InvalidInput(if zero_allowed {
            format!("amount must not be {}", bound)
        } else {
            format!("amount must be {}", bound)
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::period::TimeRange;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    #[test]
    fn untouched_period_reads_as_defaults() {
        let book = BudgetBook::new("test");
        assert_eq!(book.income(period("2025-01")), 0.0);
        assert!(book.budgets_for(period("2025-01")).is_empty());
        assert_eq!(book.remaining_to_allocate(period("2025-01")), 0.0);
    }

    #[test]
    fn income_overwrites_last_write_wins() {
        let mut book = BudgetBook::new("test");
        book.set_income(period("2025-01"), 4000.0).unwrap();
        book.set_income(period("2025-01"), 5000.0).unwrap();
        assert_eq!(book.income(period("2025-01")), 5000.0);
    }

    #[test]
    fn set_budget_is_idempotent() {
        let mut book = BudgetBook::new("test");
        book.set_budget(period("2025-01"), "Rent", 500.0).unwrap();
        let once = book.budgets_for(period("2025-01"));
        book.set_budget(period("2025-01"), "Rent", 500.0).unwrap();
        assert_eq!(book.budgets_for(period("2025-01")), once);
    }

    #[test]
    fn budget_names_need_no_matching_category() {
        let mut book = BudgetBook::new("test");
        book.set_budget(period("2025-01"), "Ghost", 100.0).unwrap();
        assert!(book.category_by_name("Ghost").is_none());
        assert_eq!(book.budgets_for(period("2025-01"))["Ghost"], 100.0);
    }

    #[test]
    fn rejects_non_positive_transaction_amounts() {
        let mut book = BudgetBook::new("test");
        let zero = Transaction::new(0.0, "Rent", date(2025, 1, 5), TransactionKind::Expense);
        let negative = Transaction::new(-5.0, "Rent", date(2025, 1, 5), TransactionKind::Expense);
        let nan = Transaction::new(f64::NAN, "Rent", date(2025, 1, 5), TransactionKind::Expense);
        assert!(book.record_transaction(zero).is_err());
        assert!(book.record_transaction(negative).is_err());
        assert!(book.record_transaction(nan).is_err());
        assert!(book.transactions().is_empty());
    }

    #[test]
    fn rejects_negative_income_and_budget() {
        let mut book = BudgetBook::new("test");
        assert!(book.set_income(period("2025-01"), -1.0).is_err());
        assert!(book.set_budget(period("2025-01"), "Rent", -1.0).is_err());
    }

    #[test]
    fn window_filter_keeps_insertion_order_and_boundaries() {
        let mut book = BudgetBook::new("test");
        for (amount, day) in [(30.0, 31), (10.0, 1), (20.0, 15)] {
            book.record_transaction(Transaction::new(
                amount,
                "Groceries",
                date(2025, 1, day),
                TransactionKind::Expense,
            ))
            .unwrap();
        }
        book.record_transaction(Transaction::new(
            99.0,
            "Groceries",
            date(2025, 2, 1),
            TransactionKind::Expense,
        ))
        .unwrap();

        let window = TimeRange::Month.window(date(2025, 1, 10));
        let amounts: Vec<f64> = book.transactions_in(window).map(|t| t.amount).collect();
        assert_eq!(amounts, vec![30.0, 10.0, 20.0]);
    }

    #[test]
    fn spent_groups_expenses_only() {
        let mut book = BudgetBook::new("test");
        book.record_transaction(Transaction::new(
            450.0,
            "Groceries",
            date(2025, 1, 10),
            TransactionKind::Expense,
        ))
        .unwrap();
        book.record_transaction(Transaction::new(
            2000.0,
            "Salary",
            date(2025, 1, 1),
            TransactionKind::Income,
        ))
        .unwrap();

        let spent = book.spent_in(TimeRange::Month.window(date(2025, 1, 15)));
        assert_eq!(spent.get("Groceries"), Some(&450.0));
        assert!(!spent.contains_key("Salary"));
    }

    #[test]
    fn quarter_income_sums_three_months() {
        let mut book = BudgetBook::new("test");
        book.set_income(period("2025-04"), 1000.0).unwrap();
        book.set_income(period("2025-05"), 1200.0).unwrap();
        book.set_income(period("2025-06"), 900.0).unwrap();

        let window = TimeRange::Quarter.window(date(2025, 5, 10));
        assert_eq!(book.income_in(window), 3100.0);
    }

    #[test]
    fn removing_a_category_leaves_orphans() {
        let mut book = BudgetBook::new("test");
        let id = book
            .add_category(Category::with_defaults("Dining Out"))
            .unwrap();
        book.set_budget(period("2025-01"), "Dining Out", 150.0)
            .unwrap();
        book.record_transaction(Transaction::new(
            40.0,
            "Dining Out",
            date(2025, 1, 8),
            TransactionKind::Expense,
        ))
        .unwrap();

        book.remove_category(id).unwrap();
        assert!(book.category(id).is_none());
        assert_eq!(book.budgets_for(period("2025-01"))["Dining Out"], 150.0);
        assert_eq!(book.transactions().len(), 1);
    }

    #[test]
    fn over_allocation_is_reported_not_rejected() {
        let mut book = BudgetBook::new("test");
        book.set_income(period("2025-01"), 1000.0).unwrap();
        book.set_budget(period("2025-01"), "Rent", 900.0).unwrap();
        book.set_budget(period("2025-01"), "Groceries", 400.0).unwrap();
        assert_eq!(book.remaining_to_allocate(period("2025-01")), -300.0);
    }

    #[test]
    fn monthly_trend_buckets_by_transaction_month() {
        let mut book = BudgetBook::new("test");
        book.record_transaction(Transaction::new(
            100.0,
            "Groceries",
            date(2025, 1, 10),
            TransactionKind::Expense,
        ))
        .unwrap();
        book.record_transaction(Transaction::new(
            3000.0,
            "Salary",
            date(2025, 2, 1),
            TransactionKind::Income,
        ))
        .unwrap();

        let window = DateWindow::new(date(2025, 1, 1), date(2025, 2, 28)).unwrap();
        let trend = book.monthly_trend(window);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].expenses, 100.0);
        assert_eq!(trend[0].income, 0.0);
        assert_eq!(trend[1].income, 3000.0);
    }
}
