use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{
    account::{Account, AccountKind},
    category::{BudgetCategory, CategoryKind},
    transaction::Transaction,
};

/// Stored-state schema understood by this build. Version 0 is the legacy
/// export format and is upgraded on load.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Seed monthly income used when no persisted state exists.
pub const SEED_INCOME: f64 = 10_000_000.0;

/// Root aggregate owned by the budget state engine.
///
/// `income` is the declared monthly figure and is never derived from
/// transactions. `transactions` is kept newest-first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    pub income: f64,
    #[serde(default)]
    pub categories: Vec<BudgetCategory>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub schema_version: u32,
}

impl AppState {
    /// Default state used the first time no persisted slot is found.
    pub fn seed() -> Self {
        Self {
            income: SEED_INCOME,
            categories: seed_categories(),
            accounts: seed_accounts(),
            transactions: Vec::new(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&BudgetCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Lists dangling references left behind by category replacement or a
    /// hand-edited state file. Informational; aggregation skips them.
    pub fn integrity_warnings(&self) -> Vec<String> {
        let account_ids: HashSet<_> = self.accounts.iter().map(|a| a.id.as_str()).collect();
        let category_ids: HashSet<_> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let mut warnings = Vec::new();

        for txn in &self.transactions {
            if !account_ids.contains(txn.account_id.as_str()) {
                warnings.push(format!(
                    "transaction {} references unknown account {}",
                    txn.id, txn.account_id
                ));
            }
            if let Some(category) = txn.category_id.as_deref() {
                if !category_ids.contains(category) {
                    warnings.push(format!(
                        "transaction {} references missing category {}",
                        txn.id, category
                    ));
                }
            }
        }
        warnings
    }
}

fn seed_categories() -> Vec<BudgetCategory> {
    vec![
        BudgetCategory {
            id: "1".into(),
            name: "Tiết kiệm".into(),
            percentage: 20.0,
            kind: CategoryKind::Savings,
            color: "#3b82f6".into(),
        },
        BudgetCategory {
            id: "2".into(),
            name: "Từ thiện".into(),
            percentage: 2.5,
            kind: CategoryKind::Charity,
            color: "#ec4899".into(),
        },
        BudgetCategory {
            id: "3".into(),
            name: "Đầu tư".into(),
            percentage: 10.0,
            kind: CategoryKind::Investment,
            color: "#10b981".into(),
        },
        BudgetCategory {
            id: "4".into(),
            name: "Chi tiêu".into(),
            percentage: 67.5,
            kind: CategoryKind::Spending,
            color: "#f59e0b".into(),
        },
    ]
}

fn seed_accounts() -> Vec<Account> {
    vec![
        Account {
            id: "acc1".into(),
            name: "Tiền mặt".into(),
            balance: 0.0,
            kind: AccountKind::Cash,
        },
        Account {
            id: "acc2".into(),
            name: "Ngân hàng VCB".into(),
            balance: 0.0,
            kind: AccountKind::Bank,
        },
    ]
}
