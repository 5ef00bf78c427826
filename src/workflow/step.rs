use super::store::StepResultStore;
use crate::runtime::{BoxFuture, ExecutionContext};
use crate::value::{Value, ValueMap};
use std::fmt;
use std::sync::Arc;

/// Code run as a workflow step. Sees every result stored so far.
pub trait StepCallable: Send + Sync {
    fn call<'a>(
        &'a self,
        results: &'a StepResultStore,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<Value>>;
}

struct FnStep<F>(F);

impl<F> StepCallable for FnStep<F>
where
    F: for<'a> Fn(&'a StepResultStore, &'a ExecutionContext) -> BoxFuture<'a, anyhow::Result<Value>>
        + Send
        + Sync,
{
    fn call<'a>(
        &'a self,
        results: &'a StepResultStore,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<Value>> {
        (self.0)(results, ctx)
    }
}

pub fn step_fn<F>(f: F) -> Arc<dyn StepCallable>
where
    F: for<'a> Fn(&'a StepResultStore, &'a ExecutionContext) -> BoxFuture<'a, anyhow::Result<Value>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnStep(f))
}

#[derive(Clone)]
pub enum StepAction {
    /// Call a registered tool; string params are interpolated.
    ToolCall { tool: String, params: ValueMap },
    /// Render the template and send it to the neural executor.
    PromptTemplate { template: String },
    Custom(Arc<dyn StepCallable>),
}

impl StepAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ToolCall { .. } => "tool_call",
            Self::PromptTemplate { .. } => "prompt_template",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolCall { tool, params } => f
                .debug_struct("ToolCall")
                .field("tool", tool)
                .field("params", params)
                .finish(),
            Self::PromptTemplate { template } => f
                .debug_struct("PromptTemplate")
                .field("template", template)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub name: String,
    /// Steps whose results must exist before this one runs.
    pub dependencies: Vec<String>,
    pub action: StepAction,
}

impl WorkflowStep {
    pub fn new(name: impl Into<String>, action: StepAction) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            action,
        }
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dep in deps {
            let dep = dep.into();
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
        self
    }

    pub fn tool_call(name: impl Into<String>, tool: impl Into<String>, params: ValueMap) -> Self {
        Self::new(
            name,
            StepAction::ToolCall {
                tool: tool.into(),
                params,
            },
        )
    }

    pub fn prompt(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(
            name,
            StepAction::PromptTemplate {
                template: template.into(),
            },
        )
    }

    pub fn custom(name: impl Into<String>, callable: Arc<dyn StepCallable>) -> Self {
        Self::new(name, StepAction::Custom(callable))
    }
}
