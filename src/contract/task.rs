use super::coerce::{coerce, describe};
use super::schema::TypeSchema;
use crate::error::ContractError;
use crate::runtime::{BoxFuture, ExecutionContext};
use crate::value::ValueMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// How a contract is carried out, derived from what was declared.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Instructions only; needs a neural executor.
    Neural,
    /// Body only.
    Symbolic,
    /// Both declared. The body always wins.
    Hybrid,
    /// Neither declared; invoking is a configuration error.
    Undefined,
}

impl Strategy {
    pub fn resolve(has_instructions: bool, has_body: bool) -> Self {
        match (has_instructions, has_body) {
            (true, false) => Self::Neural,
            (false, true) => Self::Symbolic,
            (true, true) => Self::Hybrid,
            (false, false) => Self::Undefined,
        }
    }
}

/// Code implementing a task.
///
/// Receives the declared, coerced inputs and the invocation's context, which
/// is how a body reaches other tasks, tools and the sandboxes.
pub trait TaskBody: Send + Sync {
    fn call<'a>(
        &'a self,
        inputs: ValueMap,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<ValueMap>>;
}

struct FnBody<F>(F);

impl<F> TaskBody for FnBody<F>
where
    F: for<'a> Fn(ValueMap, &'a ExecutionContext) -> BoxFuture<'a, anyhow::Result<ValueMap>>
        + Send
        + Sync,
{
    fn call<'a>(
        &'a self,
        inputs: ValueMap,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<ValueMap>> {
        (self.0)(inputs, ctx)
    }
}

/// Wrap a closure as a task body.
///
/// ```ignore
/// let body = body_fn(|inputs, ctx| Box::pin(async move {
///     ctx.log(tracing::Level::INFO, "running");
///     Ok(inputs)
/// }));
/// ```
pub fn body_fn<F>(f: F) -> Arc<dyn TaskBody>
where
    F: for<'a> Fn(ValueMap, &'a ExecutionContext) -> BoxFuture<'a, anyhow::Result<ValueMap>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnBody(f))
}

/// A named unit of work with a typed input/output contract.
///
/// Immutable once defined; [`TaskContract::invoke`] is the only execution path.
#[derive(Clone)]
pub struct TaskContract {
    name: String,
    input_schema: TypeSchema,
    output_schema: TypeSchema,
    instructions: Option<String>,
    body: Option<Arc<dyn TaskBody>>,
    strategy: Strategy,
}

impl fmt::Debug for TaskContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContract")
            .field("name", &self.name)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .field("instructions", &self.instructions)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl TaskContract {
    pub fn define(
        name: impl Into<String>,
        input_schema: TypeSchema,
        output_schema: TypeSchema,
        instructions: Option<String>,
        body: Option<Arc<dyn TaskBody>>,
    ) -> Self {
        let instructions = instructions.filter(|text| !text.trim().is_empty());
        let strategy = Strategy::resolve(instructions.is_some(), body.is_some());
        Self {
            name: name.into(),
            input_schema,
            output_schema,
            instructions,
            body,
            strategy,
        }
    }

    /// Task implemented by code only.
    pub fn symbolic(
        name: impl Into<String>,
        input_schema: TypeSchema,
        output_schema: TypeSchema,
        body: Arc<dyn TaskBody>,
    ) -> Self {
        Self::define(name, input_schema, output_schema, None, Some(body))
    }

    /// Task implemented by natural-language instructions only.
    pub fn neural(
        name: impl Into<String>,
        input_schema: TypeSchema,
        output_schema: TypeSchema,
        instructions: impl Into<String>,
    ) -> Self {
        Self::define(name, input_schema, output_schema, Some(instructions.into()), None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_schema(&self) -> &TypeSchema {
        &self.input_schema
    }

    pub fn output_schema(&self) -> &TypeSchema {
        &self.output_schema
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Validate inputs, run the body, validate outputs.
    ///
    /// Neural contracts fail with [`ContractError::NotSupportedHere`]; the
    /// enclosing runtime re-enters through [`Self::prepare_inputs`] and
    /// [`Self::validate_outputs`] with its own executor.
    pub async fn invoke(
        &self,
        inputs: ValueMap,
        ctx: &ExecutionContext,
    ) -> anyhow::Result<ValueMap> {
        if self.strategy == Strategy::Undefined {
            return Err(ContractError::UndefinedStrategy {
                task: self.name.clone(),
            }
            .into());
        }

        let inputs = self.prepare_inputs(inputs)?;
        let Some(body) = &self.body else {
            return Err(ContractError::NotSupportedHere {
                task: self.name.clone(),
            }
            .into());
        };

        let outputs = body.call(inputs, ctx).await?;
        Ok(self.validate_outputs(outputs)?)
    }

    /// Check and coerce inputs against the input schema.
    ///
    /// Undeclared keys are logged and dropped.
    pub fn prepare_inputs(&self, mut inputs: ValueMap) -> Result<ValueMap, ContractError> {
        let mut prepared = ValueMap::new();
        for (field, tag) in self.input_schema.iter() {
            let value = inputs
                .remove(field)
                .ok_or_else(|| ContractError::MissingInput {
                    task: self.name.clone(),
                    field: field.to_string(),
                })?;
            let coerced = coerce(&value, tag).ok_or_else(|| ContractError::TypeCoercion {
                task: self.name.clone(),
                field: field.to_string(),
                expected: tag.to_string(),
                found: describe(&value),
            })?;
            prepared.insert(field.to_string(), coerced);
        }
        for extra in inputs.keys() {
            debug!(task = %self.name, field = %extra, "ignoring undeclared input");
        }
        Ok(prepared)
    }

    /// Check and coerce declared outputs. Undeclared keys pass through untouched.
    pub fn validate_outputs(&self, mut outputs: ValueMap) -> Result<ValueMap, ContractError> {
        for (field, tag) in self.output_schema.iter() {
            let value = outputs
                .get(field)
                .ok_or_else(|| ContractError::MissingOutput {
                    task: self.name.clone(),
                    field: field.to_string(),
                })?;
            let coerced = coerce(value, tag).ok_or_else(|| ContractError::TypeCoercion {
                task: self.name.clone(),
                field: field.to_string(),
                expected: tag.to_string(),
                found: describe(value),
            })?;
            outputs.insert(field.to_string(), coerced);
        }
        Ok(outputs)
    }
}
