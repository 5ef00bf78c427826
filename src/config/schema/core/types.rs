use super::super::{ObservabilityConfig, RuntimeConfig, SandboxConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory; relative process working directories resolve against it.
    #[serde(default)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home = directories::UserDirs::new()
            .map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let synthrun_dir = home.join(".synthrun");

        Self {
            workspace_dir: synthrun_dir.join("workspace"),
            config_path: synthrun_dir.join("config.toml"),
            observability: ObservabilityConfig::default(),
            runtime: RuntimeConfig::default(),
            sandbox: SandboxConfig::default(),
        }
    }
}

impl Config {
    /// Reject settings that would disable a mandatory limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let network = &self.sandbox.network;
        let process = &self.sandbox.process;

        if network.connect_timeout_secs == 0 || network.read_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "sandbox.network timeouts must be greater than zero".into(),
            ));
        }
        if process.default_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "sandbox.process.default_timeout_secs must be greater than zero".into(),
            ));
        }
        if process.default_timeout_secs > process.max_timeout_secs {
            return Err(ConfigError::Validation(format!(
                "sandbox.process.default_timeout_secs ({}) exceeds max_timeout_secs ({})",
                process.default_timeout_secs, process.max_timeout_secs
            )));
        }
        if self.runtime.max_call_depth == 0 {
            return Err(ConfigError::Validation(
                "runtime.max_call_depth must be at least 1".into(),
            ));
        }
        if self.observability.level().is_none() {
            return Err(ConfigError::Validation(format!(
                "observability.log_level '{}' is not a log level",
                self.observability.log_level
            )));
        }
        network
            .parsed_exemptions()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(())
    }
}
