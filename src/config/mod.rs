pub mod schema;

pub use schema::{
    Config, NetworkSandboxConfig, ObservabilityConfig, ProcessSandboxConfig, RuntimeConfig,
    SandboxConfig,
};
