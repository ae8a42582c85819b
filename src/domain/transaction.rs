use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// One posted income or expense event.
///
/// The amount is a magnitude; the sign of the balance effect comes from
/// `direction`. Expenses carry the envelope they draw from, incomes carry an
/// optional cash-flow-quadrant classification instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "direction", alias = "type")]
    pub direction: Direction,
    #[serde(default, alias = "categoryId", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(alias = "accountId")]
    pub account_id: String,
    #[serde(default, alias = "incomeType", skip_serializing_if = "Option::is_none")]
    pub income_class: Option<IncomeClass>,
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("txn:{} [{}]", self.id, self.direction)
    }
}

/// Whether a transaction increases or decreases an account balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Income,
    Expense,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Income => f.write_str("INCOME"),
            Direction::Expense => f.write_str("EXPENSE"),
        }
    }
}

/// Cash-flow-quadrant classification attached to income transactions.
/// Purely descriptive; no aggregate reads it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncomeClass {
    #[serde(rename = "E")]
    Employee,
    #[serde(rename = "S")]
    SelfEmployed,
    #[serde(rename = "B")]
    BusinessOwner,
    #[serde(rename = "I")]
    Investor,
    #[serde(rename = "P")]
    Passive,
}

impl IncomeClass {
    /// Display label shown in transaction history.
    pub fn label(&self) -> &'static str {
        match self {
            IncomeClass::Employee => "Làm thuê (E)",
            IncomeClass::SelfEmployed => "Tự doanh (S)",
            IncomeClass::BusinessOwner => "Làm chủ (B)",
            IncomeClass::Investor => "Đầu tư (I)",
            IncomeClass::Passive => "Thụ động (P)",
        }
    }

    pub fn all() -> [IncomeClass; 5] {
        [
            IncomeClass::Employee,
            IncomeClass::SelfEmployed,
            IncomeClass::BusinessOwner,
            IncomeClass::Investor,
            IncomeClass::Passive,
        ]
    }
}

impl FromStr for IncomeClass {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "E" => Ok(IncomeClass::Employee),
            "S" => Ok(IncomeClass::SelfEmployed),
            "B" => Ok(IncomeClass::BusinessOwner),
            "I" => Ok(IncomeClass::Investor),
            "P" => Ok(IncomeClass::Passive),
            other => Err(format!("unknown income class `{}`", other)),
        }
    }
}

impl fmt::Display for IncomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Input for posting a transaction; the engine validates and completes it.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Magnitude of the movement. Zero and negative values are accepted so
    /// refund-style corrections stay possible.
    pub amount: f64,
    pub description: String,
    pub direction: Direction,
    pub account_id: String,
    /// Required for expenses, ignored for incomes.
    pub category_id: Option<String>,
    /// Only meaningful for incomes.
    pub income_class: Option<IncomeClass>,
    /// Posting instant; `None` means "now".
    pub date: Option<DateTime<Utc>>,
}

impl TransactionDraft {
    pub fn income(
        amount: f64,
        description: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            direction: Direction::Income,
            account_id: account_id.into(),
            category_id: None,
            income_class: None,
            date: None,
        }
    }

    pub fn expense(
        amount: f64,
        description: impl Into<String>,
        account_id: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            direction: Direction::Expense,
            account_id: account_id.into(),
            category_id: Some(category_id.into()),
            income_class: None,
            date: None,
        }
    }

    pub fn with_class(mut self, class: IncomeClass) -> Self {
        self.income_class = Some(class);
        self
    }
}
