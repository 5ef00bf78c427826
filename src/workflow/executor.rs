use super::interpolate::{interpolate, interpolate_params};
use super::step::{StepAction, WorkflowStep};
use super::store::StepResultStore;
use crate::contract::{TaskContract, TypeSchema, TypeTag};
use crate::error::WorkflowError;
use crate::runtime::ExecutionContext;
use crate::runtime::observability::ObserverEvent;
use crate::value::{Value, ValueMap};
use std::time::Instant;
use tracing::debug;

/// Runs a fixed list of steps once, in declaration order.
///
/// Dependencies are checked, not scheduled: a step whose dependency has no
/// result yet stops the run with [`WorkflowError::DependencyNotSatisfied`].
/// No parallelism, no retries.
#[derive(Debug, Default, Clone)]
pub struct DependencyWorkflowExecutor {
    steps: Vec<WorkflowStep>,
}

impl DependencyWorkflowExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Names must be unique and must not contain `.`, `{` or `}`.
    pub fn add_step(&mut self, step: WorkflowStep) -> Result<(), WorkflowError> {
        let name = step.name.trim();
        if name.is_empty() || name.contains(['.', '{', '}']) {
            return Err(WorkflowError::InvalidDeclaration(format!(
                "invalid step name '{}'",
                step.name
            )));
        }
        if self.steps.iter().any(|s| s.name == step.name) {
            return Err(WorkflowError::DuplicateStep { step: step.name });
        }
        self.steps.push(step);
        Ok(())
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step once with a fresh result store.
    pub async fn execute(&self, ctx: &ExecutionContext) -> anyhow::Result<StepResultStore> {
        let mut results = StepResultStore::new();

        for step in &self.steps {
            if let Some(missing) = step.dependencies.iter().find(|d| !results.contains(d)) {
                return Err(WorkflowError::DependencyNotSatisfied {
                    step: step.name.clone(),
                    missing: missing.clone(),
                }
                .into());
            }

            debug!(step = %step.name, action = step.action.kind(), "workflow.step.start");
            let started = Instant::now();
            let value = run_action(step, &results, ctx).await?;
            results.record(&step.name, value);
            ctx.observer().record_event(&ObserverEvent::StepCompleted {
                step: step.name.clone(),
                duration: started.elapsed(),
            });
        }

        Ok(results)
    }
}

async fn run_action(
    step: &WorkflowStep,
    results: &StepResultStore,
    ctx: &ExecutionContext,
) -> anyhow::Result<Value> {
    match &step.action {
        StepAction::ToolCall { tool, params } => {
            let params = interpolate_params(params, results);
            ctx.call_tool(tool, params).await
        }
        StepAction::PromptTemplate { template } => {
            let prompt = interpolate(template, results);
            run_prompt(&step.name, &prompt, ctx).await
        }
        StepAction::Custom(callable) => callable.call(results, ctx).await,
    }
}

/// Send a rendered prompt through the neural executor and check the reply
/// like any contract output.
async fn run_prompt(step: &str, prompt: &str, ctx: &ExecutionContext) -> anyhow::Result<Value> {
    let neural = ctx
        .neural()
        .ok_or_else(|| WorkflowError::PromptUnavailable {
            step: step.to_string(),
        })?;
    let schema = TypeSchema::new().field("response", TypeTag::String)?;
    let contract = TaskContract::neural(step, TypeSchema::new(), schema, prompt);
    let outputs = neural
        .execute(prompt, &ValueMap::new(), contract.output_schema())
        .await?;
    let outputs = contract.validate_outputs(outputs)?;
    Ok(Value::Map(outputs))
}
