use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EMOJI: &str = "📦";

/// A budget category the user allocates money to.
///
/// Identity lives in `id`; the `name` is what budget buckets and transactions
/// reference, and it is neither unique nor foreign-key checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub rollover: bool,
    #[serde(default = "default_emoji")]
    pub emoji: String,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            rollover: false,
            emoji: DEFAULT_EMOJI.to_string(),
        }
    }

    /// New category with the defaults the budget form uses.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CategoryKind::Flexible)
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }
}

/// Classification deciding which summary subtotal a category feeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Fixed,
    Flexible,
    NonMonthly,
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}
