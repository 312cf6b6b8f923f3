use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::Path;

use crate::config::{ConfigManager, Settings};
use crate::errors::{LedgerError, Result};
use crate::ledger::{
    summarize, BudgetBook, Category, CategoryKind, DateWindow, PeriodKey, TimeRange, Transaction,
    TransactionKind, SUGGESTED_CATEGORIES,
};
use crate::storage::{export, JsonStorage, StorageBackend};

use super::output;

/// Whether the command loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

const COMMAND_NAMES: &[&str] = &[
    "help", "income", "budget", "spend", "earn", "txns", "summary", "trend", "period", "range",
    "category", "suggest", "export", "import", "save", "load", "backup", "backups", "exit",
    "quit",
];

/// Owns the active book, settings, and storage; every shell command mutates
/// state only through the book's operations.
pub struct ShellContext {
    pub book: BudgetBook,
    pub book_name: String,
    pub settings: Settings,
    pub reference: NaiveDate,
    pub range: TimeRange,
    pub running: bool,
    storage: JsonStorage,
    config: ConfigManager,
}

impl ShellContext {
    pub fn new() -> Result<Self> {
        let storage = JsonStorage::new_default()?;
        let config = ConfigManager::new()?;
        let settings = config.load()?;
        let book_name = storage
            .last_book()?
            .or_else(|| settings.last_opened_book.clone())
            .unwrap_or_else(|| "book".to_string());
        let report = storage.load_or_default(&book_name);
        for warning in &report.warnings {
            output::warning(warning);
        }
        Ok(Self {
            book: report.book,
            book_name,
            settings,
            reference: Utc::now().date_naive(),
            range: TimeRange::Month,
            running: true,
            storage,
            config,
        })
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        COMMAND_NAMES.to_vec()
    }

    pub fn prompt(&self) -> String {
        format!("{} ({})> ", self.book_name, self.range.label())
    }

    fn window(&self) -> DateWindow {
        self.range.window(self.reference)
    }

    fn reference_period(&self) -> PeriodKey {
        PeriodKey::from_date(self.reference)
    }

    pub fn report_error(&self, err: LedgerError) {
        output::error(err);
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<LoopControl> {
        match command {
            "help" => {
                self.print_help();
                Ok(LoopControl::Continue)
            }
            "income" => self.cmd_income(args),
            "budget" => self.cmd_budget(args),
            "spend" => self.cmd_transaction(args, TransactionKind::Expense),
            "earn" => self.cmd_transaction(args, TransactionKind::Income),
            "txns" => self.cmd_txns(),
            "summary" => self.cmd_summary(),
            "trend" => self.cmd_trend(),
            "period" => self.cmd_period(args),
            "range" => self.cmd_range(args),
            "category" => self.cmd_category(args),
            "suggest" => self.cmd_suggest(),
            "export" => self.cmd_export(args),
            "import" => self.cmd_import(args),
            "save" => self.cmd_save(args),
            "load" => self.cmd_load(args),
            "backup" => self.cmd_backup(args),
            "backups" => self.cmd_backups(),
            "exit" | "quit" => Ok(LoopControl::Exit),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown command `{}` (try `help`)",
                other
            ))),
        }
    }

    fn print_help(&self) {
        output::info("Commands:");
        output::info("  income <amount> [YYYY-MM]          record monthly income");
        output::info("  budget <category> <amount> [YYYY-MM]  set a category budget");
        output::info("  spend <amount> <category> [date] [note]  add an expense");
        output::info("  earn <amount> <category> [date] [note]   add an income transaction");
        output::info("  txns | summary | trend             views over the selected window");
        output::info("  period <YYYY-MM-DD|today>          move the reference date");
        output::info("  range <week|month|quarter|year|ytd>");
        output::info("  category <add|list|rm> ...         manage the category set");
        output::info("  suggest                            list suggested categories");
        output::info("  export <path> | import <path>      full-state JSON round trip");
        output::info("  save [name] | load <name> | backup [note] | backups");
        output::info("  exit");
    }

    fn cmd_income(&mut self, args: &[&str]) -> Result<LoopControl> {
        let amount = parse_amount(args.first())?;
        let period = parse_period(args.get(1), self.reference)?;
        self.book.set_income(period, amount)?;
        output::success(format!(
            "income for {} set to {}",
            period,
            output::money(amount, &self.settings.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_budget(&mut self, args: &[&str]) -> Result<LoopControl> {
        let category = args
            .first()
            .copied()
            .ok_or_else(|| LedgerError::InvalidInput("usage: budget <category> <amount> [YYYY-MM]".into()))?;
        let amount = parse_amount(args.get(1))?;
        let period = parse_period(args.get(2), self.reference)?;
        self.book.set_budget(period, category, amount)?;
        output::success(format!(
            "budget for {} in {} set to {}",
            category,
            period,
            output::money(amount, &self.settings.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_transaction(&mut self, args: &[&str], kind: TransactionKind) -> Result<LoopControl> {
        let amount = parse_amount(args.first())?;
        let category = args
            .get(1)
            .copied()
            .ok_or_else(|| LedgerError::InvalidInput("usage: spend <amount> <category> [date] [note]".into()))?;
        let (date, note_start) = match args.get(2).map(|raw| raw.parse::<NaiveDate>()) {
            Some(Ok(date)) => (date, 3),
            _ => (self.reference, 2),
        };
        let mut txn = Transaction::new(amount, category, date, kind);
        if args.len() > note_start {
            txn = txn.with_note(args[note_start..].join(" "));
        }
        self.book.record_transaction(txn)?;
        output::success(format!(
            "recorded {} {} on {}",
            category,
            output::money(amount, &self.settings.currency),
            date
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_txns(&mut self) -> Result<LoopControl> {
        let window = self.window();
        let mut count = 0usize;
        for txn in self.book.transactions_in(window) {
            let direction = match txn.kind {
                TransactionKind::Income => "+",
                TransactionKind::Expense => "-",
            };
            let note = txn.note.as_deref().unwrap_or("");
            output::info(format!(
                "{} {}{} {} {}",
                txn.date,
                direction,
                output::money(txn.amount, &self.settings.currency),
                txn.category,
                note
            ));
            count += 1;
        }
        output::info(format!(
            "{} transaction(s) between {} and {}",
            count, window.start, window.end
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_summary(&mut self) -> Result<LoopControl> {
        let window = self.window();
        let period = self.reference_period();
        let budgets = self.book.budgets_for(period);
        let spent = self.book.spent_in(window);
        let summary = summarize(self.book.categories(), &budgets, &spent);
        let currency = &self.settings.currency;

        for row in &summary.per_category {
            let emoji = row.emoji.as_deref().unwrap_or("");
            output::info(format!(
                "{} {}: budgeted {}, spent {}, remaining {} ({:.0}%)",
                emoji,
                row.name,
                output::money(row.budgeted, currency),
                output::money(row.spent, currency),
                output::money(row.breakdown.remaining, currency),
                row.breakdown.progress
            ));
        }
        output::info(format!(
            "total budgeted {}, spent {}, remaining {}",
            output::money(summary.total_budgeted, currency),
            output::money(summary.total_spent, currency),
            output::money(summary.total_remaining, currency)
        ));
        output::info(format!(
            "fixed {}, flexible {}, left to allocate {}",
            output::money(summary.fixed_expenses, currency),
            output::money(summary.flexible_expenses, currency),
            output::money(self.book.remaining_to_allocate(period), currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_trend(&mut self) -> Result<LoopControl> {
        let window = self.window();
        for point in self.book.monthly_trend(window) {
            output::info(format!(
                "{}: income {}, expenses {}",
                point.period,
                output::money(point.income, &self.settings.currency),
                output::money(point.expenses, &self.settings.currency)
            ));
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_period(&mut self, args: &[&str]) -> Result<LoopControl> {
        let raw = args
            .first()
            .ok_or_else(|| LedgerError::InvalidInput("usage: period <YYYY-MM-DD|today>".into()))?;
        self.reference = if raw.eq_ignore_ascii_case("today") {
            Utc::now().date_naive()
        } else {
            raw.parse::<NaiveDate>()
                .map_err(|_| LedgerError::InvalidInput(format!("invalid date `{}`", raw)))?
        };
        output::success(format!("reference date is {}", self.reference));
        Ok(LoopControl::Continue)
    }

    fn cmd_range(&mut self, args: &[&str]) -> Result<LoopControl> {
        let raw = args
            .first()
            .ok_or_else(|| LedgerError::InvalidInput("usage: range <week|month|quarter|year|ytd>".into()))?;
        self.range = raw.parse()?;
        let window = self.window();
        output::success(format!(
            "range {} ({} to {})",
            self.range.label(),
            window.start,
            window.end
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_category(&mut self, args: &[&str]) -> Result<LoopControl> {
        match args.first().copied() {
            Some("add") => {
                let name = args
                    .get(1)
                    .copied()
                    .ok_or_else(|| LedgerError::InvalidInput("usage: category add <name> [fixed|flexible|non-monthly]".into()))?;
                let kind = match args.get(2).copied() {
                    None => CategoryKind::Flexible,
                    Some("fixed") => CategoryKind::Fixed,
                    Some("flexible") => CategoryKind::Flexible,
                    Some("non-monthly") => CategoryKind::NonMonthly,
                    Some(other) => {
                        return Err(LedgerError::InvalidInput(format!(
                            "unknown category kind `{}`",
                            other
                        )))
                    }
                };
                let mut category = Category::new(name, kind);
                if let Some(entry) = crate::ledger::suggestion(name) {
                    category = category.with_emoji(entry.emoji);
                }
                self.book.add_category(category)?;
                output::success(format!("category {} added", name));
            }
            Some("list") | None => {
                for category in self.book.categories() {
                    output::info(format!(
                        "{} {} ({:?}{})",
                        category.emoji,
                        category.name,
                        category.kind,
                        if category.rollover { ", rollover" } else { "" }
                    ));
                }
            }
            Some("rm") => {
                let name = args
                    .get(1)
                    .copied()
                    .ok_or_else(|| LedgerError::InvalidInput("usage: category rm <name>".into()))?;
                let id = self
                    .book
                    .category_by_name(name)
                    .map(|c| c.id)
                    .ok_or_else(|| LedgerError::InvalidInput(format!("category `{}` not found", name)))?;
                self.book.remove_category(id)?;
                output::success(format!("category {} removed", name));
            }
            Some(other) => {
                return Err(LedgerError::InvalidInput(format!(
                    "unknown subcommand `category {}`",
                    other
                )))
            }
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_suggest(&self) -> Result<LoopControl> {
        for entry in SUGGESTED_CATEGORIES {
            output::info(format!("{} {} ({:?})", entry.emoji, entry.name, entry.kind));
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_export(&self, args: &[&str]) -> Result<LoopControl> {
        let path = args
            .first()
            .ok_or_else(|| LedgerError::InvalidInput("usage: export <path>".into()))?;
        let json = export::export_document(&self.book, &self.settings)?;
        fs::write(Path::new(path), json)?;
        output::success(format!("exported to {}", path));
        Ok(LoopControl::Continue)
    }

    fn cmd_import(&mut self, args: &[&str]) -> Result<LoopControl> {
        let path = args
            .first()
            .ok_or_else(|| LedgerError::InvalidInput("usage: import <path>".into()))?;
        let json = fs::read_to_string(Path::new(path))?;
        // Validation happens before any state is replaced; a bad file leaves
        // the current book untouched.
        let document = export::import_document(&json)?;
        self.book = document.budget_data;
        self.settings = document.settings;
        self.config.save(&self.settings)?;
        output::success(format!("imported from {}", path));
        Ok(LoopControl::Continue)
    }

    fn cmd_save(&mut self, args: &[&str]) -> Result<LoopControl> {
        if let Some(name) = args.first() {
            self.book_name = name.to_string();
        }
        self.storage.save(&self.book, &self.book_name)?;
        self.storage.record_last_book(Some(&self.book_name))?;
        self.settings.last_opened_book = Some(self.book_name.clone());
        self.config.save(&self.settings)?;
        output::success(format!("saved book `{}`", self.book_name));
        Ok(LoopControl::Continue)
    }

    fn cmd_load(&mut self, args: &[&str]) -> Result<LoopControl> {
        let name = args
            .first()
            .copied()
            .ok_or_else(|| LedgerError::InvalidInput("usage: load <name>".into()))?;
        let report = self.storage.load(name)?;
        for warning in &report.warnings {
            output::warning(warning);
        }
        self.book = report.book;
        self.book_name = name.to_string();
        self.storage.record_last_book(Some(name))?;
        output::success(format!("loaded book `{}`", name));
        Ok(LoopControl::Continue)
    }

    fn cmd_backup(&mut self, args: &[&str]) -> Result<LoopControl> {
        let note = args.first().copied();
        self.storage.backup(&self.book, &self.book_name, note)?;
        output::success("backup created");
        Ok(LoopControl::Continue)
    }

    fn cmd_backups(&self) -> Result<LoopControl> {
        for name in self.storage.list_backups(&self.book_name)? {
            output::info(name);
        }
        Ok(LoopControl::Continue)
    }
}

fn parse_amount(raw: Option<&&str>) -> Result<f64> {
    let raw = raw.ok_or_else(|| LedgerError::InvalidInput("missing amount".into()))?;
    raw.parse::<f64>()
        .map_err(|_| LedgerError::InvalidInput(format!("invalid amount `{}`", raw)))
}

fn parse_period(raw: Option<&&str>, reference: NaiveDate) -> Result<PeriodKey> {
    match raw {
        Some(raw) => raw.parse(),
        None => Ok(PeriodKey::from_date(reference)),
    }
}
