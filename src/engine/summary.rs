//! Derived aggregates over the application state.
//!
//! Everything here is a pure function of the state passed in; nothing is
//! cached between calls.

use crate::{
    domain::{AppState, BudgetCategory, Direction},
    errors::{EngineError, Result},
};

/// Commit tolerance for the envelope percentage sum.
pub const PERCENTAGE_TOLERANCE: f64 = 0.01;

/// Per-envelope budget figures derived from the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: BudgetCategory,
    /// income × percentage / 100.
    pub allocated: f64,
    /// Sum of expense amounts posted against this envelope.
    pub spent: f64,
    /// allocated − spent; negative means overspend, which is a valid
    /// displayable state rather than an error.
    pub remaining: f64,
}

/// Overall figures derived from the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub total_income: f64,
    pub total_expense: f64,
    pub total_balance: f64,
    pub total_allocation_percentage: f64,
}

/// Computes allocation, spend, and remainder for every envelope.
///
/// Expense transactions whose envelope no longer exists are not counted
/// anywhere.
pub fn budget_summary(state: &AppState) -> Vec<CategorySummary> {
    state
        .categories
        .iter()
        .map(|category| {
            let allocated = state.income * category.percentage / 100.0;
            let spent = state
                .transactions
                .iter()
                .filter(|txn| {
                    txn.direction == Direction::Expense
                        && txn.category_id.as_deref() == Some(category.id.as_str())
                })
                .map(|txn| txn.amount)
                .sum::<f64>();
            CategorySummary {
                category: category.clone(),
                allocated,
                spent,
                remaining: allocated - spent,
            }
        })
        .collect()
}

pub fn totals(state: &AppState) -> Totals {
    let (mut total_income, mut total_expense) = (0.0, 0.0);
    for txn in &state.transactions {
        match txn.direction {
            Direction::Income => total_income += txn.amount,
            Direction::Expense => total_expense += txn.amount,
        }
    }
    Totals {
        total_income,
        total_expense,
        total_balance: state.accounts.iter().map(|account| account.balance).sum(),
        total_allocation_percentage: percentage_sum(&state.categories),
    }
}

pub fn percentage_sum(categories: &[BudgetCategory]) -> f64 {
    categories.iter().map(|category| category.percentage).sum()
}

/// Checks whether a proposed envelope list could be committed.
///
/// Exposed separately from [`crate::engine::BudgetEngine::replace_categories`]
/// so callers can pre-flight a commit without performing it.
pub fn validate_percentages(categories: &[BudgetCategory]) -> Result<()> {
    let sum = percentage_sum(categories);
    if (sum - 100.0).abs() > PERCENTAGE_TOLERANCE {
        Err(EngineError::PercentageSum(sum))
    } else {
        Ok(())
    }
}
