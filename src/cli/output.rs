use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
    }
}

fn emit(kind: MessageKind, message: impl fmt::Display) {
    let text = format!("{} {}", label(kind), message);
    let styled = match kind {
        MessageKind::Info => text.normal(),
        MessageKind::Success => text.green(),
        MessageKind::Warning => text.yellow(),
        MessageKind::Error => text.red(),
    };
    match kind {
        MessageKind::Error => eprintln!("{}", styled),
        _ => println!("{}", styled),
    }
}

pub fn info(message: impl fmt::Display) {
    emit(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    emit(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    emit(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    emit(MessageKind::Error, message);
}

/// Formats an amount with the configured currency code, e.g. `USD 1234.50`.
pub fn money(amount: f64, currency: &str) -> String {
    format!("{} {:.2}", currency, amount)
}
