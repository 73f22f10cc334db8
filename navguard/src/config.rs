//! Application configuration for the `navguard` binary
//!
//! Loaded from TOML or YAML. Every section is optional.
//!
//! ```toml
//! params_file = ".navguard/config/params.yaml"
//!
//! [scheduler]
//! rate_hz = 50.0
//!
//! [robot]
//! model_path = "robot.toml"
//!
//! [filter]
//! step_time = 0.25
//! horizon_steps = 10
//! ```

use navguard_core::error::{NavGuardError, NavGuardResult};
use navguard_core::RuntimeParams;
use navguard_library::algorithms::collision_world::RobotModel;
use navguard_library::algorithms::rollout_filter::{
    FilterConfig, MissingPosePolicy, DEFAULT_HORIZON_STEPS, DEFAULT_STEP_TIME,
};
use navguard_library::NodeTopics;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub rate_hz: f64,
    /// Per-node logging through the node context
    pub node_logging: bool,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            rate_hz: 50.0,
            node_logging: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotSection {
    /// Robot model file, TOML or YAML
    pub model_path: Option<PathBuf>,
    /// Inline robot model, used when no path is given
    pub model: Option<RobotModel>,
    /// Fixed frame of the occupancy map
    pub frame_id: String,
}

impl Default for RobotSection {
    fn default() -> Self {
        Self {
            model_path: None,
            model: None,
            frame_id: "world".to_string(),
        }
    }
}

/// Initial filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub step_time: f64,
    pub horizon_steps: usize,
    pub pass_through: bool,
    pub fail_open_without_pose: bool,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            step_time: DEFAULT_STEP_TIME,
            horizon_steps: DEFAULT_HORIZON_STEPS,
            pass_through: false,
            fail_open_without_pose: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSection {
    /// Publish the colliding robot configuration
    pub collision_state: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavGuardConfig {
    pub topics: NodeTopics,
    pub scheduler: SchedulerSection,
    pub robot: RobotSection,
    pub filter: FilterSection,
    pub diagnostics: DiagnosticsSection,
    /// Persisted runtime parameters. Values found there override `[filter]`.
    pub params_file: Option<PathBuf>,
}

impl NavGuardConfig {
    /// Load config from a file (auto-detect format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> NavGuardResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            NavGuardError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_toml(&contents).or_else(|_| Self::from_yaml(&contents)),
        }
    }

    pub fn from_toml(contents: &str) -> NavGuardResult<Self> {
        toml::from_str(contents)
            .map_err(|e| NavGuardError::config(format!("Failed to parse TOML: {}", e)))
    }

    pub fn from_yaml(contents: &str) -> NavGuardResult<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| NavGuardError::config(format!("Failed to parse YAML: {}", e)))
    }

    /// Load the first config found in the working directory, else defaults
    pub fn find_and_load() -> NavGuardResult<Self> {
        for path in Self::get_search_paths() {
            if path.exists() {
                tracing::info!("Using config {}", path.display());
                return Self::from_file(&path);
            }
        }
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn get_search_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("navguard.toml"),
            PathBuf::from("navguard.yaml"),
            PathBuf::from("navguard.yml"),
        ]
    }

    /// Robot model from `model_path`, else the inline model
    pub fn load_robot_model(&self) -> NavGuardResult<RobotModel> {
        match (&self.robot.model_path, &self.robot.model) {
            (Some(path), _) => RobotModel::from_file(path),
            (None, Some(model)) => {
                model.validate()?;
                Ok(model.clone())
            }
            (None, None) => Err(NavGuardError::model_load(
                "No robot model configured: set robot.model_path or robot.model",
            )),
        }
    }

    /// Validated initial filter configuration from the `[filter]` section
    pub fn filter_config(&self) -> NavGuardResult<FilterConfig> {
        let f = &self.filter;
        Ok(FilterConfig::new(f.step_time, f.horizon_steps, f.pass_through)?
            .with_missing_pose_policy(MissingPosePolicy::from_fail_open(
                f.fail_open_without_pose,
            )))
    }

    /// Parameter store seeded from `[filter]`, then overridden by `params_file`
    pub fn build_params(&self) -> NavGuardResult<RuntimeParams> {
        let mut params = RuntimeParams::with_defaults();
        params.set("tick_rate", self.scheduler.rate_hz)?;
        self.filter_config()?.write_to_params(&params)?;

        if let Some(path) = &self.params_file {
            if path.exists() {
                params.load_from_disk(path)?;
                tracing::info!("Loaded runtime parameters from {}", path.display());
            } else {
                params.set_persist_path(path);
            }
        }
        Ok(params)
    }
}
