//! Client configuration
//!
//! `AppConfig` holds system paths and endpoints that are fixed for a run.
//! `ConfigStore` is the persisted key-value store behind the in-game
//! settings tab; every key has a documented default.

use crate::classify::DEFAULT_PRIMARY_HOST;
use crate::error::{LafError, LafResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// System-level configuration (paths and endpoints)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User data directory (config store lives here)
    pub data_dir: PathBuf,

    /// Cache directory (downloaded update packages)
    pub cache_dir: PathBuf,

    /// Host of the hosted game
    pub primary_host: String,

    /// Release manifest URL; `None` disables the update check
    pub update_feed: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("laf"),
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("laf"),
            primary_host: DEFAULT_PRIMARY_HOST.to_string(),
            update_feed: option_env!("LAF_UPDATE_FEED").map(str::to_string),
        }
    }
}

impl AppConfig {
    /// Path of the persisted settings store
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}

/// Keys understood by the settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Lang,
    EnableTimer,
    EnableRpc,
    ShowExitBtn,
    UnlimitedFps,
    AngleType,
    Webgl2Context,
    AcceleratedCanvas,
    InProcessGpu,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 9] = [
        ConfigKey::Lang,
        ConfigKey::EnableTimer,
        ConfigKey::EnableRpc,
        ConfigKey::ShowExitBtn,
        ConfigKey::UnlimitedFps,
        ConfigKey::AngleType,
        ConfigKey::Webgl2Context,
        ConfigKey::AcceleratedCanvas,
        ConfigKey::InProcessGpu,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Lang => "lang",
            ConfigKey::EnableTimer => "enableTimer",
            ConfigKey::EnableRpc => "enableRPC",
            ConfigKey::ShowExitBtn => "showExitBtn",
            ConfigKey::UnlimitedFps => "unlimitedFPS",
            ConfigKey::AngleType => "angleType",
            ConfigKey::Webgl2Context => "webgl2Context",
            ConfigKey::AcceleratedCanvas => "acceleratedCanvas",
            ConfigKey::InProcessGpu => "inProcessGPU",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == id)
    }

    /// Value used when the store has no entry for this key
    pub fn default_value(self) -> Value {
        match self {
            ConfigKey::Lang => Value::from(Lang::JaJp.as_str()),
            ConfigKey::EnableTimer => Value::Bool(true),
            ConfigKey::EnableRpc => Value::Bool(true),
            ConfigKey::ShowExitBtn => Value::from(ExitButtonPlacement::Bottom.as_str()),
            ConfigKey::UnlimitedFps => Value::Bool(true),
            ConfigKey::AngleType => Value::from("gl"),
            ConfigKey::Webgl2Context => Value::Bool(true),
            ConfigKey::AcceleratedCanvas => Value::Bool(true),
            ConfigKey::InProcessGpu => Value::Bool(false),
        }
    }
}

/// Label language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    JaJp,
    EnUs,
}

impl Lang {
    pub fn as_str(self) -> &'static str {
        match self {
            Lang::JaJp => "ja_JP",
            Lang::EnUs => "en_US",
        }
    }

    /// Anything other than `en_US` falls back to Japanese
    pub fn from_id(id: &str) -> Self {
        if id == "en_US" {
            Lang::EnUs
        } else {
            Lang::JaJp
        }
    }
}

/// Where the game's client exit button is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitButtonPlacement {
    Top,
    #[default]
    Bottom,
    Disable,
}

impl ExitButtonPlacement {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitButtonPlacement::Top => "top",
            ExitButtonPlacement::Bottom => "bottom",
            ExitButtonPlacement::Disable => "disable",
        }
    }

    pub fn from_id(id: &str) -> Self {
        match id {
            "top" => ExitButtonPlacement::Top,
            "disable" => ExitButtonPlacement::Disable,
            _ => ExitButtonPlacement::Bottom,
        }
    }
}

/// Persisted key-value settings store
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// Load the store from `path`, starting empty if the file is missing or
    /// unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::load(&path);
        Self {
            path: Some(path),
            values,
        }
    }

    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn load(path: &Path) -> Map<String, Value> {
        if !path.exists() {
            return Map::new();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    log::warn!("Ignoring malformed config store at {:?}", path);
                    Map::new()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config store {:?}: {}", path, e);
                Map::new()
            }
        }
    }

    /// Read `key`, falling back to `default` when absent
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.values.get(key).cloned().unwrap_or(default)
    }

    /// Read a known key with its documented default
    pub fn get_key(&self, key: ConfigKey) -> Value {
        self.get(key.as_str(), key.default_value())
    }

    pub fn get_bool(&self, key: ConfigKey) -> bool {
        match self.get_key(key) {
            Value::Bool(b) => b,
            _ => key.default_value().as_bool().unwrap_or(false),
        }
    }

    pub fn get_string(&self, key: ConfigKey) -> String {
        match self.get_key(key) {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    pub fn lang(&self) -> Lang {
        Lang::from_id(&self.get_string(ConfigKey::Lang))
    }

    pub fn exit_button(&self) -> ExitButtonPlacement {
        ExitButtonPlacement::from_id(&self.get_string(ConfigKey::ShowExitBtn))
    }

    /// Whether a value has been stored for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Write `value` under `key` and persist immediately
    pub fn set(&mut self, key: &str, value: Value) -> LafResult<()> {
        self.values.insert(key.to_string(), value);
        self.save()
    }

    /// Remove every stored value and persist the empty store
    pub fn clear(&mut self) -> LafResult<()> {
        self.values.clear();
        self.save()
    }

    fn save(&self) -> LafResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.values)
            .map_err(|e| LafError::config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_when_absent() {
        let store = ConfigStore::in_memory();
        assert_eq!(store.get_key(ConfigKey::Lang), json!("ja_JP"));
        assert!(store.get_bool(ConfigKey::EnableRpc));
        assert!(!store.get_bool(ConfigKey::InProcessGpu));
        assert_eq!(store.exit_button(), ExitButtonPlacement::Bottom);
        assert_eq!(store.get("missing", json!(42)), json!(42));
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut store = ConfigStore::open(&path);
        store.set("unlimitedFPS", json!(false)).unwrap();
        store.set("lang", json!("en_US")).unwrap();

        let reloaded = ConfigStore::open(&path);
        assert_eq!(reloaded.get("unlimitedFPS", json!(true)), json!(false));
        assert_eq!(reloaded.lang(), Lang::EnUs);
    }

    #[test]
    fn test_clear_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut store = ConfigStore::open(&path);
        store.set("angleType", json!("d3d11")).unwrap();
        store.clear().unwrap();

        assert!(!store.contains("angleType"));
        assert_eq!(ConfigStore::open(&path).get_string(ConfigKey::AngleType), "gl");
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = ConfigStore::open(&path);
        assert!(!store.contains("lang"));
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let mut store = ConfigStore::in_memory();
        store.set("enableTimer", json!("yes")).unwrap();
        assert!(store.get_bool(ConfigKey::EnableTimer));
    }

    #[test]
    fn test_key_ids_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_id(key.as_str()), Some(key));
        }
        assert_eq!(ConfigKey::from_id("nope"), None);
    }
}
