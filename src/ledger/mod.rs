//! Period-bucketed budget domain: keys, categories, transactions, the book,
//! and its derived summaries.

pub mod book;
pub mod catalog;
pub mod category;
pub mod period;
pub mod summary;
pub mod transaction;

pub use book::{BudgetBook, PeriodBucket, TrendPoint};
pub use catalog::{suggestion, SuggestedCategory, SUGGESTED_CATEGORIES};
pub use category::{Category, CategoryKind, DEFAULT_EMOJI};
pub use period::{DateWindow, PeriodKey, TimeRange};
pub use summary::{summarize, BudgetSummary, CategoryBreakdown, CategoryRow, SpendStatus};
pub use transaction::{Transaction, TransactionKind};
