pub mod export;
pub mod json_backend;
pub mod rehydrate;

use std::path::Path;

use crate::errors::Result;
use crate::ledger::BudgetBook;

pub use json_backend::JsonStorage;
pub use rehydrate::LoadReport;

/// Abstraction over persistence backends capable of storing budget books.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &BudgetBook, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<LoadReport>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, book: &BudgetBook, name: &str, note: Option<&str>) -> Result<()>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<LoadReport>;

    /// Ad-hoc file operations; default implementations forward to the plain
    /// path helpers.
    fn save_to_path(&self, book: &BudgetBook, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<LoadReport> {
        json_backend::load_book_from_path(path)
    }
}
