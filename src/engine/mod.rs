//! The budget state engine: canonical state ownership and command
//! transitions.

pub mod summary;

pub use summary::{
    budget_summary, percentage_sum, totals, validate_percentages, CategorySummary, Totals,
    PERCENTAGE_TOLERANCE,
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{AppState, BudgetCategory, Direction, Transaction, TransactionDraft},
    errors::{EngineError, Result},
    storage::StateStore,
};

/// Owns the canonical application state and applies command transitions.
///
/// Each mutation is applied as one atomic in-memory transition (a recorded
/// transaction is never observable without its balance effect) and then
/// forwarded wholesale to the persistence store. A failed save is surfaced
/// to the caller but does not roll back the in-memory transition.
pub struct BudgetEngine<S: StateStore> {
    state: AppState,
    store: S,
}

impl<S: StateStore> BudgetEngine<S> {
    pub fn new(state: AppState, store: S) -> Self {
        Self { state, store }
    }

    /// Loads the persisted slot, seeding (and persisting the seed) when the
    /// slot has never been written.
    pub fn load_or_seed(store: S) -> Result<Self> {
        let state = match store.load()? {
            Some(state) => state,
            None => {
                let seeded = AppState::seed();
                store.save(&seeded)?;
                tracing::info!("no persisted state found; seeded defaults");
                seeded
            }
        };
        for warning in state.integrity_warnings() {
            tracing::warn!("{warning}");
        }
        Ok(Self { state, store })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Replaces the declared monthly income. Always succeeds apart from
    /// persistence; no other field changes.
    pub fn set_income(&mut self, value: f64) -> Result<()> {
        self.state.income = value;
        self.persist()
    }

    /// Validates and posts a transaction, returning its fresh identifier.
    ///
    /// The transaction is prepended (the list stays newest-first) and the
    /// referenced account's balance is adjusted in the same transition.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<String> {
        let description = draft.description.trim().to_string();
        if description.is_empty() {
            return Err(EngineError::InvalidInput(
                "transaction description must not be empty".into(),
            ));
        }
        if self.state.account(&draft.account_id).is_none() {
            return Err(EngineError::AccountNotFound(draft.account_id));
        }

        let (category_id, income_class) = match draft.direction {
            Direction::Expense => {
                let category_id = draft.category_id.ok_or_else(|| {
                    EngineError::InvalidInput("an expense must name a budget category".into())
                })?;
                if self.state.category(&category_id).is_none() {
                    return Err(EngineError::CategoryNotFound(category_id));
                }
                (Some(category_id), None)
            }
            Direction::Income => (None, draft.income_class),
        };

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            amount: draft.amount,
            description,
            date: draft.date.unwrap_or_else(Utc::now),
            direction: draft.direction,
            category_id,
            account_id: draft.account_id,
            income_class,
        };
        let id = transaction.id.clone();

        apply_balance_effect(&mut self.state, &transaction, false);
        self.state.transactions.insert(0, transaction);
        self.persist()?;
        Ok(id)
    }

    /// Removes a transaction and reverses its balance effect.
    ///
    /// An unknown id is a no-op returning `false`; the state is left
    /// untouched and nothing is persisted.
    pub fn delete_transaction(&mut self, id: &str) -> Result<bool> {
        let Some(position) = self.state.transactions.iter().position(|txn| txn.id == id) else {
            return Ok(false);
        };
        let transaction = self.state.transactions.remove(position);
        apply_balance_effect(&mut self.state, &transaction, true);
        self.persist()?;
        Ok(true)
    }

    /// Atomically replaces the envelope list.
    ///
    /// Rejected (prior list retained) unless the percentages total 100
    /// within the commit tolerance; use [`validate_percentages`] to
    /// pre-flight a commit. Accounts and transactions are untouched;
    /// historical expenses may end up referencing removed envelopes, which
    /// aggregation then ignores.
    pub fn replace_categories(&mut self, new_list: Vec<BudgetCategory>) -> Result<()> {
        validate_percentages(&new_list)?;
        self.state.categories = new_list;
        self.persist()
    }

    /// Per-envelope allocation/spend/remaining, recomputed from the current
    /// state on every call.
    pub fn budget_summary(&self) -> Vec<CategorySummary> {
        budget_summary(&self.state)
    }

    /// Overall totals, recomputed from the current state on every call.
    pub fn totals(&self) -> Totals {
        totals(&self.state)
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.state).map_err(|err| {
            tracing::warn!("failed to persist state: {err}");
            err
        })
    }
}

/// Coerces free-form numeric input: anything that does not parse as a
/// finite number becomes 0.
pub fn parse_amount(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn apply_balance_effect(state: &mut AppState, transaction: &Transaction, reverse: bool) {
    // Tolerates a missing account on reversal: deletion must still succeed
    // when the referenced account no longer exists.
    let Some(account) = state.account_mut(&transaction.account_id) else {
        return;
    };
    let signed = match transaction.direction {
        Direction::Income => transaction.amount,
        Direction::Expense => -transaction.amount,
    };
    if reverse {
        account.balance -= signed;
    } else {
        account.balance += signed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryKind, IncomeClass};
    use crate::storage::JsonStore;
    use tempfile::TempDir;

    fn seeded_engine() -> (BudgetEngine<JsonStore>, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonStore::with_root(temp.path()).expect("store");
        let engine = BudgetEngine::load_or_seed(store).expect("engine");
        (engine, temp)
    }

    #[test]
    fn load_or_seed_persists_the_seed() {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::with_root(temp.path()).unwrap();
        let engine = BudgetEngine::load_or_seed(store).unwrap();
        assert_eq!(engine.state().income, 10_000_000.0);

        let reopened = JsonStore::with_root(temp.path()).unwrap();
        let persisted = reopened.load().unwrap().expect("seed was saved");
        assert_eq!(&persisted, engine.state());
    }

    #[test]
    fn income_posting_raises_the_account_balance() {
        let (mut engine, _guard) = seeded_engine();
        engine
            .add_transaction(
                TransactionDraft::income(2_000_000.0, "Lương tháng", "acc2")
                    .with_class(IncomeClass::Employee),
            )
            .unwrap();

        assert_eq!(engine.state().account("acc2").unwrap().balance, 2_000_000.0);
        assert_eq!(engine.totals().total_income, 2_000_000.0);
        let posted = &engine.state().transactions[0];
        assert_eq!(posted.category_id, None);
        assert_eq!(posted.income_class, Some(IncomeClass::Employee));
    }

    #[test]
    fn expense_posting_blanks_the_income_class() {
        let (mut engine, _guard) = seeded_engine();
        let mut draft = TransactionDraft::expense(500_000.0, "Ăn trưa", "acc1", "4");
        draft.income_class = Some(IncomeClass::Passive);
        engine.add_transaction(draft).unwrap();

        let posted = &engine.state().transactions[0];
        assert_eq!(posted.income_class, None);
        assert_eq!(posted.category_id.as_deref(), Some("4"));
        assert_eq!(engine.state().account("acc1").unwrap().balance, -500_000.0);
    }

    #[test]
    fn transactions_stay_newest_first() {
        let (mut engine, _guard) = seeded_engine();
        engine
            .add_transaction(TransactionDraft::income(1.0, "first", "acc1"))
            .unwrap();
        engine
            .add_transaction(TransactionDraft::income(2.0, "second", "acc1"))
            .unwrap();

        let descriptions: Vec<_> = engine
            .state()
            .transactions
            .iter()
            .map(|txn| txn.description.as_str())
            .collect();
        assert_eq!(descriptions, ["second", "first"]);
    }

    #[test]
    fn add_rejects_unknown_account_and_leaves_state_unchanged() {
        let (mut engine, _guard) = seeded_engine();
        let before = engine.state().clone();

        let err = engine
            .add_transaction(TransactionDraft::income(1_000.0, "ghost", "acc9"))
            .expect_err("unknown account must be rejected");
        assert!(matches!(err, EngineError::AccountNotFound(ref id) if id == "acc9"));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn add_rejects_expense_without_category() {
        let (mut engine, _guard) = seeded_engine();
        let mut draft = TransactionDraft::expense(1_000.0, "no envelope", "acc1", "4");
        draft.category_id = None;
        let err = engine.add_transaction(draft).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = engine
            .add_transaction(TransactionDraft::expense(1_000.0, "bad envelope", "acc1", "99"))
            .unwrap_err();
        assert!(matches!(err, EngineError::CategoryNotFound(ref id) if id == "99"));
    }

    #[test]
    fn add_then_delete_round_trips_to_the_prior_state() {
        let (mut engine, _guard) = seeded_engine();
        engine
            .add_transaction(TransactionDraft::income(3_000_000.0, "Lương", "acc2"))
            .unwrap();
        let before = engine.state().clone();

        let id = engine
            .add_transaction(TransactionDraft::expense(750_000.0, "Mua sắm", "acc2", "4"))
            .unwrap();
        assert_eq!(engine.state().account("acc2").unwrap().balance, 2_250_000.0);

        assert!(engine.delete_transaction(&id).unwrap());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn delete_of_unknown_id_is_a_noop() {
        let (mut engine, _guard) = seeded_engine();
        let before = engine.state().clone();
        assert!(!engine.delete_transaction("missing").unwrap());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn replace_categories_rejects_bad_sums_and_keeps_the_prior_list() {
        let (mut engine, _guard) = seeded_engine();
        let before = engine.state().categories.clone();

        let mut proposal = before.clone();
        proposal[0].percentage += 0.02;
        let err = engine.replace_categories(proposal).unwrap_err();
        assert!(matches!(err, EngineError::PercentageSum(_)));
        assert_eq!(engine.state().categories, before);
    }

    #[test]
    fn replace_categories_swaps_the_list_and_nothing_else() {
        let (mut engine, _guard) = seeded_engine();
        engine
            .add_transaction(TransactionDraft::expense(100_000.0, "Cà phê", "acc1", "4"))
            .unwrap();
        let transactions_before = engine.state().transactions.clone();
        let accounts_before = engine.state().accounts.clone();

        let mut replacement = vec![
            BudgetCategory::custom("Quỹ tự do"),
            BudgetCategory::custom("Quỹ khẩn cấp"),
        ];
        replacement[0].percentage = 60.0;
        replacement[1].percentage = 40.0;
        engine.replace_categories(replacement).unwrap();

        assert_eq!(engine.state().categories.len(), 2);
        assert!(engine
            .state()
            .categories
            .iter()
            .all(|c| c.kind == CategoryKind::Custom));
        assert_eq!(engine.state().transactions, transactions_before);
        assert_eq!(engine.state().accounts, accounts_before);
        // The old expense now dangles; aggregation simply no longer sees it.
        assert!(engine.budget_summary().iter().all(|row| row.spent == 0.0));
    }

    #[test]
    fn set_income_touches_only_income() {
        let (mut engine, _guard) = seeded_engine();
        engine.set_income(12_345_678.0).unwrap();
        assert_eq!(engine.state().income, 12_345_678.0);
        assert_eq!(engine.state().categories.len(), 4);
    }

    #[test]
    fn zero_and_negative_amounts_are_accepted() {
        let (mut engine, _guard) = seeded_engine();
        engine
            .add_transaction(TransactionDraft::expense(-200_000.0, "Hoàn tiền", "acc1", "4"))
            .unwrap();
        assert_eq!(engine.state().account("acc1").unwrap().balance, 200_000.0);
    }

    #[test]
    fn parse_amount_coerces_garbage_to_zero() {
        assert_eq!(parse_amount("2500000"), 2_500_000.0);
        assert_eq!(parse_amount("  67.5 "), 67.5);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
    }
}
