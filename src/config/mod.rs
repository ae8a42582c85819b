use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{EngineError, Result},
    storage::json_store,
};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub advice: AdviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "vi-VN".into(),
            currency: "VND".into(),
            advice: AdviceConfig::default(),
        }
    }
}

/// Deployment-time settings for the advice endpoint. The API key is
/// deliberately absent: it lives in the environment, never on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdviceConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-3-flash-preview".into(),
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(json_store::base_dir())
    }

    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self> {
        Self::from_base(base.into())
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)
                .map_err(|err| EngineError::Config(format!("invalid config file: {err}")))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency, "VND");
        assert_eq!(config.advice.model, "gemini-3-flash-preview");
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        let mut config = Config::default();
        config.advice.model = "gemini-custom".into();
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }
}
