//! Workflow documents in TOML or JSON.
//!
//! ```toml
//! [[steps]]
//! name = "fetch"
//! action = { kind = "tool_call", tool = "http_request", params = { url = "https://example.com" } }
//!
//! [[steps]]
//! name = "summary"
//! depends_on = ["fetch"]
//! action = { kind = "prompt_template", template = "Summarise: {fetch.body}" }
//! ```

use super::executor::DependencyWorkflowExecutor;
use super::step::{StepAction, WorkflowStep};
use crate::error::WorkflowError;
use crate::value::ValueMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDeclaration {
    pub name: String,
    #[serde(default, alias = "dependencies")]
    pub depends_on: Vec<String>,
    pub action: ActionDeclaration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDeclaration {
    ToolCall {
        tool: String,
        #[serde(default)]
        params: ValueMap,
    },
    PromptTemplate {
        template: String,
    },
}

impl WorkflowDeclaration {
    pub fn from_toml_str(text: &str) -> Result<Self, WorkflowError> {
        toml::from_str(text).map_err(|e| WorkflowError::InvalidDeclaration(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, WorkflowError> {
        serde_json::from_str(text).map_err(|e| WorkflowError::InvalidDeclaration(e.to_string()))
    }

    /// Read a `.json` file as JSON and anything else as TOML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read workflow {}: {e}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let decl = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_toml_str(&text)?
        };
        Ok(decl)
    }

    /// Build an executor, keeping declaration order.
    pub fn into_executor(self) -> Result<DependencyWorkflowExecutor, WorkflowError> {
        let mut executor = DependencyWorkflowExecutor::new();
        for step in self.steps {
            let action = match step.action {
                ActionDeclaration::ToolCall { tool, params } => StepAction::ToolCall { tool, params },
                ActionDeclaration::PromptTemplate { template } => {
                    StepAction::PromptTemplate { template }
                }
            };
            executor.add_step(WorkflowStep::new(step.name, action).depends_on(step.depends_on))?;
        }
        Ok(executor)
    }
}
