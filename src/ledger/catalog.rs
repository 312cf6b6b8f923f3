//! Read-only reference list of suggested category names.
//!
//! These seed the category picker; nothing constrains user-created names to
//! this taxonomy.

use super::category::CategoryKind;

pub struct SuggestedCategory {
    pub name: &'static str,
    pub kind: CategoryKind,
    pub emoji: &'static str,
}

pub const SUGGESTED_CATEGORIES: &[SuggestedCategory] = &[
    SuggestedCategory {
        name: "Housing",
        kind: CategoryKind::Fixed,
        emoji: "🏠",
    },
    SuggestedCategory {
        name: "Utilities",
        kind: CategoryKind::Fixed,
        emoji: "💡",
    },
    SuggestedCategory {
        name: "Transportation",
        kind: CategoryKind::Fixed,
        emoji: "🚗",
    },
    SuggestedCategory {
        name: "Groceries",
        kind: CategoryKind::Flexible,
        emoji: "🛒",
    },
    SuggestedCategory {
        name: "Dining Out",
        kind: CategoryKind::Flexible,
        emoji: "🍽️",
    },
    SuggestedCategory {
        name: "Entertainment",
        kind: CategoryKind::Flexible,
        emoji: "🎮",
    },
    SuggestedCategory {
        name: "Healthcare",
        kind: CategoryKind::NonMonthly,
        emoji: "💊",
    },
    SuggestedCategory {
        name: "Savings",
        kind: CategoryKind::Fixed,
        emoji: "🏦",
    },
    SuggestedCategory {
        name: "Debt",
        kind: CategoryKind::Fixed,
        emoji: "💳",
    },
    SuggestedCategory {
        name: "Shopping",
        kind: CategoryKind::Flexible,
        emoji: "🛍️",
    },
    SuggestedCategory {
        name: "Gifts",
        kind: CategoryKind::NonMonthly,
        emoji: "🎁",
    },
    SuggestedCategory {
        name: "Travel",
        kind: CategoryKind::NonMonthly,
        emoji: "✈️",
    },
];

/// Looks up a suggestion by name, case-insensitively.
pub fn suggestion(name: &str) -> Option<&'static SuggestedCategory> {
    SUGGESTED_CATEGORIES
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(suggestion("groceries").is_some());
        assert!(suggestion("GROCERIES").is_some());
        assert!(suggestion("not-a-category").is_none());
    }
}
