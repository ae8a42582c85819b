pub mod account;
pub mod category;
pub mod common;
pub mod state;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use category::{BudgetCategory, CategoryKind};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use state::{AppState, CURRENT_SCHEMA_VERSION};
pub use transaction::{Direction, IncomeClass, Transaction, TransactionDraft};
