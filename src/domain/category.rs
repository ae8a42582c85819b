//! Domain types representing budget envelopes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Color assigned to user-created envelopes.
pub const DEFAULT_CUSTOM_COLOR: &str = "#94a3b8";

/// One percentage-based allocation envelope of the monthly income.
///
/// The percentages across all envelopes are expected to total 100; this is
/// only enforced when a full replacement list is committed, not while the
/// user is editing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategory {
    pub id: String,
    pub name: String,
    pub percentage: f64,
    #[serde(rename = "kind", alias = "type")]
    pub kind: CategoryKind,
    pub color: String,
}

impl BudgetCategory {
    /// Creates a user-defined envelope with a fresh identifier and a zero
    /// allocation. Seeded envelopes are built in [`super::state::AppState::seed`].
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            percentage: 0.0,
            kind: CategoryKind::Custom,
            color: DEFAULT_CUSTOM_COLOR.into(),
        }
    }

    /// Whether the envelope can be removed through the editing surface.
    /// Only user-created envelopes are; the four seeded kinds stay.
    pub fn is_deletable(&self) -> bool {
        self.kind == CategoryKind::Custom
    }
}

impl Identifiable for BudgetCategory {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for BudgetCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for BudgetCategory {
    fn display_label(&self) -> String {
        format!("{} ({}%)", self.name, self.percentage)
    }
}

/// Supported envelope kinds. All but `Custom` are seeded at first run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryKind {
    Savings,
    Charity,
    Investment,
    Spending,
    Custom,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Savings => "SAVINGS",
            CategoryKind::Charity => "CHARITY",
            CategoryKind::Investment => "INVESTMENT",
            CategoryKind::Spending => "SPENDING",
            CategoryKind::Custom => "CUSTOM",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_envelopes_start_empty_and_deletable() {
        let envelope = BudgetCategory::custom("Hạng mục mới");
        assert_eq!(envelope.percentage, 0.0);
        assert_eq!(envelope.kind, CategoryKind::Custom);
        assert!(envelope.is_deletable());
    }

    #[test]
    fn kind_accepts_legacy_type_key() {
        let json = r##"{"id":"1","name":"Tiết kiệm","percentage":20,"type":"SAVINGS","color":"#3b82f6"}"##;
        let envelope: BudgetCategory = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.kind, CategoryKind::Savings);
        assert!(!envelope.is_deletable());
    }
}
