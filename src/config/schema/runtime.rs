use serde::{Deserialize, Serialize};

fn default_max_call_depth() -> usize {
    16
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Nested task invocations allowed in one call chain.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
        }
    }
}
