use super::http::HttpTool;
use super::process::ProcessTool;
use super::traits::{Tool, ToolSpec};
use crate::error::ToolError;
use crate::runtime::ExecutionContext;
use crate::value::{Value, ValueMap};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Central registry for tool instances.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the sandbox-backed built-ins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(HttpTool::new()));
        registry.register(Box::new(ProcessTool::new()));
        registry
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Remove a tool by name. Returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.tools.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Return sorted list of registered tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|tool| tool.spec()).collect()
    }

    pub async fn execute(
        &self,
        name: &str,
        args: ValueMap,
        ctx: &ExecutionContext,
    ) -> anyhow::Result<Value> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;
        tool.execute(args, ctx).await
    }
}
