use super::Config;
use std::path::PathBuf;

/// Environment variables consulted by [`Config::apply_env_overrides`].
pub(crate) const OVERRIDE_KEYS: [&str; 5] = [
    "SYNTHRUN_WORKSPACE",
    "SYNTHRUN_LOG_LEVEL",
    "SYNTHRUN_OBSERVABILITY",
    "SYNTHRUN_PROCESS_TIMEOUT_SECS",
    "SYNTHRUN_HTTP_READ_TIMEOUT_SECS",
];

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| {
            debug_assert!(OVERRIDE_KEYS.contains(&key), "unlisted override key {key}");
            std::env::var(key).ok()
        });
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workspace) = lookup("SYNTHRUN_WORKSPACE")
            && !workspace.is_empty()
        {
            self.workspace_dir = super::loader::expand_path(&PathBuf::from(workspace));
        }

        if let Some(level) = lookup("SYNTHRUN_LOG_LEVEL")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }

        if let Some(backend) = lookup("SYNTHRUN_OBSERVABILITY")
            && !backend.is_empty()
        {
            self.observability.backend = backend;
        }

        if let Some(secs) = lookup("SYNTHRUN_PROCESS_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && secs > 0
        {
            self.sandbox.process.default_timeout_secs = secs;
        }

        if let Some(secs) = lookup("SYNTHRUN_HTTP_READ_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && secs > 0
        {
            self.sandbox.network.read_timeout_secs = secs;
        }
    }
}
