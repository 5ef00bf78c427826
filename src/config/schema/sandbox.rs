use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("synthrun-sandbox/", env!("CARGO_PKG_VERSION")).into()
}

fn default_max_response_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_process_timeout_secs() -> u64 {
    30
}

fn default_max_process_timeout_secs() -> u64 {
    300
}

fn default_max_output_bytes() -> usize {
    1_048_576
}

/// Environment variables passed through to child processes.
/// Only functional variables are included -- never API keys or secrets.
fn default_inherit_env() -> Vec<String> {
    ["PATH", "HOME", "LANG", "LC_ALL", "TERM", "USER"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default)]
    pub network: NetworkSandboxConfig,
    #[serde(default)]
    pub process: ProcessSandboxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSandboxConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Sent when the caller supplies no `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Follow at most one redirect hop; the target is validated like any request.
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
    /// Operator-trusted literal addresses exempt from the blocked-range table.
    #[serde(default)]
    pub exempt_addresses: Vec<String>,
}

impl Default for NetworkSandboxConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            user_agent: default_user_agent(),
            max_response_bytes: default_max_response_bytes(),
            follow_redirects: true,
            exempt_addresses: Vec::new(),
        }
    }
}

impl NetworkSandboxConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn parsed_exemptions(&self) -> anyhow::Result<Vec<IpAddr>> {
        self.exempt_addresses
            .iter()
            .map(|raw| {
                raw.trim()
                    .parse::<IpAddr>()
                    .map_err(|e| anyhow::anyhow!("invalid exempt address '{raw}': {e}"))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSandboxConfig {
    #[serde(default = "default_process_timeout_secs")]
    pub default_timeout_secs: u64,
    /// Upper bound applied to caller-requested timeouts.
    #[serde(default = "default_max_process_timeout_secs")]
    pub max_timeout_secs: u64,
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    /// Command names that may run. Empty allows any command.
    #[serde(default)]
    pub allowed_commands: Vec<String>,
    #[serde(default = "default_inherit_env")]
    pub inherit_env: Vec<String>,
}

impl Default for ProcessSandboxConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_process_timeout_secs(),
            max_timeout_secs: default_max_process_timeout_secs(),
            max_output_bytes: default_max_output_bytes(),
            allowed_commands: Vec::new(),
            inherit_env: default_inherit_env(),
        }
    }
}

impl ProcessSandboxConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn max_timeout(&self) -> Duration {
        Duration::from_secs(self.max_timeout_secs)
    }
}
