use crate::runtime::{BoxFuture, ExecutionContext};
use crate::value::{Value, ValueMap};
use serde::{Deserialize, Serialize};

/// Description of a tool, as listed to code generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A named capability callable from generated code
pub trait Tool: Send + Sync {
    /// Tool name (used by `call_tool` and workflow steps)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with given arguments.
    ///
    /// Sandboxed effects come back as a structured `Value`; `Err` is reserved
    /// for malformed arguments and removed capabilities.
    fn execute<'a>(
        &'a self,
        args: ValueMap,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<Value>>;

    /// Get the full spec for registration
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
