use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".pocket_ledger";
const BOOK_DIR: &str = "books";
const BACKUP_DIR: &str = "backups";
const STATE_FILE: &str = "state.json";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.pocket_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("POCKET_LEDGER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding managed budget book files, under an explicit base.
pub fn books_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(BOOK_DIR)
}

/// Base directory for backup snapshots, under an explicit base.
pub fn backups_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

/// Path to the shared state file (tracks the last opened book).
pub fn state_file_in(base: &std::path::Path) -> PathBuf {
    base.join(STATE_FILE)
}

/// Path to the settings file.
pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Creates a directory and its parents when missing.
pub fn ensure_dir(path: &std::path::Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
