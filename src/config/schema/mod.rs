mod core;
mod observability;
mod runtime;
mod sandbox;

pub use core::Config;
pub use observability::ObservabilityConfig;
pub use runtime::RuntimeConfig;
pub use sandbox::{NetworkSandboxConfig, ProcessSandboxConfig, SandboxConfig};
