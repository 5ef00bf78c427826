use serde::{Deserialize, Serialize};

fn default_backend() -> String {
    "log".into()
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "log" | "none"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            log_level: default_log_level(),
        }
    }
}

impl ObservabilityConfig {
    pub fn level(&self) -> Option<tracing::Level> {
        self.log_level.trim().parse().ok()
    }
}
