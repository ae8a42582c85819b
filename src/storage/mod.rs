pub mod json_store;

use crate::domain::AppState;
use crate::errors::EngineError;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Abstraction over persistence backends holding the single state slot.
///
/// The whole state is written and read wholesale; there is no partial
/// update. `load` returning `Ok(None)` means the slot has never been
/// written and the caller should seed.
pub trait StateStore {
    fn save(&self, state: &AppState) -> Result<()>;
    fn load(&self) -> Result<Option<AppState>>;
}

pub use json_store::JsonStore;
