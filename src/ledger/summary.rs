use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryKind};

/// Severity classification for a category's spending, decided from the
/// un-clamped numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpendStatus {
    Empty,
    UnderBudget,
    OnTrack,
    OverBudget,
}

/// Pure projection of one category's budgeted/spent pair, re-derived on every
/// render rather than stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdown {
    pub remaining: f64,
    pub progress: f64,
    pub status: SpendStatus,
}

impl CategoryBreakdown {
    /// `progress` is exactly `0` when nothing is budgeted, never NaN or
    /// infinite; overspend runs past 100 un-clamped so severity decisions can
    /// see the real number.
    pub fn from_parts(budgeted: f64, spent: f64) -> Self {
        let remaining = budgeted - spent;
        let progress = if budgeted > 0.0 {
            (spent / budgeted) * 100.0
        } else {
            0.0
        };
        let status = if budgeted == 0.0 && spent == 0.0 {
            SpendStatus::Empty
        } else if spent > budgeted {
            SpendStatus::OverBudget
        } else if spent == budgeted {
            SpendStatus::OnTrack
        } else {
            SpendStatus::UnderBudget
        };
        Self {
            remaining,
            progress,
            status,
        }
    }

    /// Progress capped at 100 for bar widths; display-only.
    pub fn bar_percent(&self) -> f64 {
        self.progress.min(100.0)
    }
}

/// One table row: a category name joined against the period's budget map and
/// the window's derived spending. `kind` is `None` for orphaned names that no
/// active category claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRow {
    pub name: String,
    pub kind: Option<CategoryKind>,
    pub emoji: Option<String>,
    pub budgeted: f64,
    pub spent: f64,
    #[serde(flatten)]
    pub breakdown: CategoryBreakdown,
}

/// Reduced totals over the joined rows. Fixed/Flexible subtotals split
/// budgeted amounts by category kind; non-monthly and orphaned rows count in
/// the totals but in neither subtotal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetSummary {
    pub total_budgeted: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub fixed_expenses: f64,
    pub flexible_expenses: f64,
    pub per_category: Vec<CategoryRow>,
}

/// Joins the active category set, a period's budget map, and derived spending
/// into summary rows and totals. The join is by name match only; budget
/// entries or spending with no matching category stay visible as orphans.
pub fn summarize(
    categories: &[Category],
    budgets: &BTreeMap<String, f64>,
    spent: &BTreeMap<String, f64>,
) -> BudgetSummary {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    // Category order first so the table lists the user's own set before
    // orphans.
    let mut rows: Vec<CategoryRow> = Vec::new();
    for category in categories {
        if names.insert(&category.name) {
            rows.push(build_row(
                &category.name,
                Some(category),
                budgets,
                spent,
            ));
        }
    }
    for name in budgets.keys().map(String::as_str).chain(spent.keys().map(String::as_str)) {
        if names.insert(name) {
            rows.push(build_row(name, None, budgets, spent));
        }
    }

    let mut summary = BudgetSummary {
        total_budgeted: 0.0,
        total_spent: 0.0,
        total_remaining: 0.0,
        fixed_expenses: 0.0,
        flexible_expenses: 0.0,
        per_category: Vec::new(),
    };
    for row in &rows {
        summary.total_budgeted += row.budgeted;
        summary.total_spent += row.spent;
        match row.kind {
            Some(CategoryKind::Fixed) => summary.fixed_expenses += row.budgeted,
            Some(CategoryKind::Flexible) => summary.flexible_expenses += row.budgeted,
            Some(CategoryKind::NonMonthly) | None => {}
        }
    }
    summary.total_remaining = summary.total_budgeted - summary.total_spent;
    summary.per_category = rows;
    summary
}

fn build_row(
    name: &str,
    category: Option<&Category>,
    budgets: &BTreeMap<String, f64>,
    spent: &BTreeMap<String, f64>,
) -> CategoryRow {
    let budgeted = budgets.get(name).copied().unwrap_or(0.0);
    let spent = spent.get(name).copied().unwrap_or(0.0);
    CategoryRow {
        name: name.to_string(),
        kind: category.map(|c| c.kind),
        emoji: category.map(|c| c.emoji.clone()),
        budgeted,
        spent,
        breakdown: CategoryBreakdown::from_parts(budgeted, spent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(name, amount)| (name.to_string(), *amount))
            .collect()
    }

    #[test]
    fn zero_budget_progress_is_exactly_zero() {
        let breakdown = CategoryBreakdown::from_parts(0.0, 0.0);
        assert_eq!(breakdown.progress, 0.0);
        assert_eq!(breakdown.status, SpendStatus::Empty);

        let spent_without_budget = CategoryBreakdown::from_parts(0.0, 50.0);
        assert_eq!(spent_without_budget.progress, 0.0);
        assert!(spent_without_budget.progress.is_finite());
        assert_eq!(spent_without_budget.status, SpendStatus::OverBudget);
    }

    #[test]
    fn overspend_is_not_clamped() {
        let breakdown = CategoryBreakdown::from_parts(2000.0, 2500.0);
        assert_eq!(breakdown.progress, 125.0);
        assert_eq!(breakdown.remaining, -500.0);
        assert_eq!(breakdown.status, SpendStatus::OverBudget);
        assert_eq!(breakdown.bar_percent(), 100.0);
    }

    #[test]
    fn summary_scenario_from_two_categories() {
        let categories = vec![
            Category::new("Rent", CategoryKind::Fixed),
            Category::new("Groceries", CategoryKind::Flexible),
        ];
        let budgets = map(&[("Rent", 2000.0), ("Groceries", 600.0)]);
        let spent = map(&[("Rent", 2000.0), ("Groceries", 450.0)]);

        let summary = summarize(&categories, &budgets, &spent);
        assert_eq!(summary.total_budgeted, 2600.0);
        assert_eq!(summary.total_spent, 2450.0);
        assert_eq!(summary.total_remaining, 150.0);
        assert_eq!(summary.fixed_expenses, 2000.0);
        assert_eq!(summary.flexible_expenses, 600.0);
    }

    #[test]
    fn non_monthly_feeds_totals_but_no_subtotal() {
        let categories = vec![Category::new("Travel", CategoryKind::NonMonthly)];
        let budgets = map(&[("Travel", 300.0)]);
        let summary = summarize(&categories, &budgets, &BTreeMap::new());
        assert_eq!(summary.total_budgeted, 300.0);
        assert_eq!(summary.fixed_expenses, 0.0);
        assert_eq!(summary.flexible_expenses, 0.0);
    }

    #[test]
    fn orphaned_budget_entries_render_as_rows() {
        let budgets = map(&[("Ghost", 100.0)]);
        let spent = map(&[("Forgotten", 25.0)]);
        let summary = summarize(&[], &budgets, &spent);
        assert_eq!(summary.per_category.len(), 2);
        assert!(summary.per_category.iter().all(|row| row.kind.is_none()));
        assert_eq!(summary.total_budgeted, 100.0);
        assert_eq!(summary.total_spent, 25.0);
    }
}
