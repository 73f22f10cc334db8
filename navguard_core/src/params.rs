//! Simple runtime parameter system for NavGuard
//!
//! Provides a key-value store for runtime tunables such as the rollout step
//! time and horizon. Values are stored as JSON values and persisted as YAML.

use crate::error::NavGuardResult;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default location of the persisted parameter file
pub const DEFAULT_PARAMS_PATH: &str = ".navguard/config/params.yaml";

/// Runtime parameter store
///
/// Cloning is shallow: clones share the same underlying storage, so a
/// parameter written by one node is visible to every holder of the store.
pub struct RuntimeParams {
    /// Parameter storage - BTreeMap maintains sorted order
    params: Arc<RwLock<BTreeMap<String, Value>>>,
    /// Optional persistence path
    persist_path: Option<PathBuf>,
}

impl RuntimeParams {
    /// Create a parameter store holding only the defaults, without touching disk
    pub fn with_defaults() -> Self {
        let store = Self {
            params: Arc::new(RwLock::new(BTreeMap::new())),
            persist_path: None,
        };
        store.fill_missing_defaults();
        store
    }

    fn default_entries() -> [(&'static str, Value); 6] {
        [
            // Scheduler
            ("tick_rate", Value::from(50)),
            // Rollout
            ("roll_out_step_time", Value::from(0.25)),
            ("roll_out_steps", Value::from(10)),
            ("pass_through", Value::from(false)),
            // Safety
            ("fail_open_without_pose", Value::from(true)),
            ("max_contacts", Value::from(100)),
        ]
    }

    fn fill_missing_defaults(&self) {
        let mut params = self.params.write();
        for (key, value) in Self::default_entries() {
            params.entry(key.to_string()).or_insert(value);
        }
    }

    /// Get a parameter value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let params = self.params.read();
        let value = params.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Get parameter with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get parameter as f64 with default
    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get_or(key, default)
    }

    /// Get parameter as i64 with default
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get_or(key, default)
    }

    /// Get parameter as bool with default
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_or(key, default)
    }

    /// Set a parameter value
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> NavGuardResult<()> {
        let json_value = serde_json::to_value(value)?;
        self.params.write().insert(key.to_string(), json_value);
        Ok(())
    }

    /// Get all parameters
    pub fn get_all(&self) -> BTreeMap<String, Value> {
        self.params.read().clone()
    }

    /// List all parameter keys
    pub fn list_keys(&self) -> Vec<String> {
        self.params.read().keys().cloned().collect()
    }

    /// Check if a parameter exists
    pub fn has(&self, key: &str) -> bool {
        self.params.read().contains_key(key)
    }

    /// Remove a parameter
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.params.write().remove(key)
    }

    /// Clear all parameters and reset to defaults
    pub fn reset(&self) {
        self.params.write().clear();
        self.fill_missing_defaults();
    }

    /// Persist to `path` on the next save
    pub fn set_persist_path(&mut self, path: &Path) {
        self.persist_path = Some(path.to_path_buf());
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    /// Save parameters to the persistence path as YAML
    pub fn save_to_disk(&self) -> NavGuardResult<()> {
        let path = self
            .persist_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PARAMS_PATH));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&*self.params.read())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Load parameters from a YAML file, replacing keys present in the file
    ///
    /// The file becomes the persistence path for later saves.
    pub fn load_from_disk(&mut self, path: &Path) -> NavGuardResult<()> {
        let yaml_str = std::fs::read_to_string(path)?;
        let loaded: BTreeMap<String, Value> = serde_yaml::from_str(&yaml_str)?;

        self.params.write().extend(loaded);
        self.persist_path = Some(path.to_path_buf());
        Ok(())
    }
}

impl Clone for RuntimeParams {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            persist_path: self.persist_path.clone(),
        }
    }
}

impl std::fmt::Debug for RuntimeParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeParams")
            .field("keys", &self.list_keys())
            .field("persist_path", &self.persist_path)
            .finish()
    }
}
