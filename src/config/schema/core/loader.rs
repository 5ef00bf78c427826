use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let synthrun_dir = home.join(".synthrun");
        let config_path = synthrun_dir.join("config.toml");

        if !synthrun_dir.exists() {
            fs::create_dir_all(&synthrun_dir).context("Failed to create .synthrun directory")?;
        }

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self {
                config_path: config_path.clone(),
                workspace_dir: synthrun_dir.join("workspace"),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        fs::create_dir_all(&config.workspace_dir)
            .context("Failed to create workspace directory")?;
        Ok(config)
    }

    /// Read and parse a config file without touching the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .context("Failed to parse config file")?;
        config.config_path = path.to_path_buf();
        if config.workspace_dir.as_os_str().is_empty() {
            config.workspace_dir = path
                .parent()
                .map_or_else(|| PathBuf::from("workspace"), |p| p.join("workspace"));
        }
        config.workspace_dir = expand_path(&config.workspace_dir);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}

/// Expand a leading `~` the way a shell would.
pub(crate) fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
