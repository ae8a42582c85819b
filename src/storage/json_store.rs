use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    domain::{AppState, Direction, CURRENT_SCHEMA_VERSION},
    errors::EngineError,
};

use super::{Result, StateStore};

const STATE_FILE: &str = "state.json";
const TMP_SUFFIX: &str = "tmp";

/// Environment variable overriding the application data directory.
pub const HOME_ENV: &str = "FINSMART_HOME";

/// Single-slot JSON persistence for the application state.
///
/// Writes stage to a temporary sibling file and rename into place, so a
/// failed serialization or interrupted write never corrupts the slot.
#[derive(Clone)]
pub struct JsonStore {
    state_file: PathBuf,
}

impl JsonStore {
    /// Store rooted at the platform data directory (or `FINSMART_HOME`).
    pub fn new() -> Result<Self> {
        Self::with_root(base_dir())
    }

    /// Store rooted at an explicit directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self {
            state_file: root.join(STATE_FILE),
        })
    }

    pub fn state_path(&self) -> &Path {
        &self.state_file
    }
}

impl StateStore for JsonStore {
    fn save(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = tmp_path(&self.state_file);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.state_file)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<AppState>> {
        if !self.state_file.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.state_file)?;
        let mut state: AppState = serde_json::from_str(&data)?;
        migrate(&mut state)?;
        Ok(Some(state))
    }
}

/// Resolves the application data directory, honouring `FINSMART_HOME`.
pub fn base_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finsmart")
}

/// Upgrades a loaded state to the current schema.
///
/// Version 0 is the legacy export format: income transactions may carry an
/// empty-string category reference and expense transactions a stray income
/// classification. Both are normalized away before the version is stamped.
pub fn migrate(state: &mut AppState) -> Result<()> {
    if state.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(EngineError::Storage(format!(
            "stored state uses schema version {} but this build understands up to {}",
            state.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    if state.schema_version == 0 {
        for txn in &mut state.transactions {
            if txn.category_id.as_deref() == Some("") {
                txn.category_id = None;
            }
            match txn.direction {
                Direction::Income => txn.category_id = None,
                Direction::Expense => txn.income_class = None,
            }
        }
        tracing::info!(
            transactions = state.transactions.len(),
            "migrated legacy state to schema version {}",
            CURRENT_SCHEMA_VERSION
        );
    }
    state.schema_version = CURRENT_SCHEMA_VERSION;
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (JsonStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonStore::with_root(temp.path()).expect("json store");
        (store, temp)
    }

    #[test]
    fn absent_slot_loads_as_none() {
        let (store, _guard) = store_with_temp_dir();
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let (store, _guard) = store_with_temp_dir();
        let state = AppState::seed();
        store.save(&state).expect("save state");
        let loaded = store.load().expect("load state").expect("slot present");
        assert_eq!(loaded, state);
    }

    #[test]
    fn legacy_export_is_migrated_on_load() {
        let (store, _guard) = store_with_temp_dir();
        let legacy = r##"{
            "income": 10000000,
            "categories": [
                {"id":"1","name":"Tiết kiệm","percentage":20,"type":"SAVINGS","color":"#3b82f6"},
                {"id":"4","name":"Chi tiêu","percentage":80,"type":"SPENDING","color":"#f59e0b"}
            ],
            "accounts": [
                {"id":"acc1","name":"Tiền mặt","balance":1500000,"type":"CASH"}
            ],
            "transactions": [
                {"id":"100","amount":2000000,"description":"Lương","date":"2024-01-01T00:00:00.000Z","categoryId":"","accountId":"acc1","type":"INCOME","incomeType":"E"},
                {"id":"101","amount":500000,"description":"Ăn trưa","date":"2024-01-02T00:00:00.000Z","categoryId":"4","accountId":"acc1","type":"EXPENSE"}
            ]
        }"##;
        fs::write(store.state_path(), legacy).unwrap();

        let state = store.load().expect("load").expect("slot present");
        assert_eq!(state.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(state.transactions[0].category_id, None);
        assert_eq!(state.transactions[1].category_id.as_deref(), Some("4"));
        assert!(state.transactions[1].income_class.is_none());
    }

    #[test]
    fn newer_schema_version_is_refused() {
        let mut state = AppState::seed();
        state.schema_version = CURRENT_SCHEMA_VERSION + 1;
        let err = migrate(&mut state).expect_err("future schema must be refused");
        assert!(matches!(err, EngineError::Storage(_)));
    }
}
