use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Represents a money-holding account tracked by the engine.
///
/// The balance is mutated only by transaction posting and deletion; it must
/// always equal the seed balance plus the net signed effect of the
/// transactions currently referencing the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub balance: f64,
    #[serde(rename = "kind", alias = "type")]
    pub kind: AccountKind,
}

impl Account {
    /// Creates a new account with a zero balance.
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            balance: 0.0,
            kind,
        }
    }
}

impl Identifiable for Account {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    #[serde(rename = "CASH")]
    Cash,
    #[serde(rename = "BANK")]
    Bank,
    #[serde(rename = "CREDIT")]
    Credit,
    #[serde(rename = "E-WALLET")]
    EWallet,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Cash => "CASH",
            AccountKind::Bank => "BANK",
            AccountKind::Credit => "CREDIT",
            AccountKind::EWallet => "E-WALLET",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ewallet_kind_round_trips_with_dash() {
        let account = Account::new("Momo", AccountKind::EWallet);
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains(r#""E-WALLET""#));
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, AccountKind::EWallet);
    }
}
