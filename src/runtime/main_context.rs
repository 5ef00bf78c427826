use super::context::ExecutionContext;
use super::observability::ObserverEvent;
use super::BoxFuture;
use crate::error::ErrorKind;
use crate::value::{Value, ValueMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

const MAX_TRACE_ENTRIES: usize = 8;
const MAX_TRACE_ENTRY_CHARS: usize = 240;

/// The single imperative entry point of an agent.
pub trait EntryPoint: Send + Sync {
    fn call<'a>(&'a self, input: ValueMap, ctx: &'a ExecutionContext)
    -> BoxFuture<'a, anyhow::Result<Value>>;
}

struct FnEntry<F>(F);

impl<F> EntryPoint for FnEntry<F>
where
    F: for<'a> Fn(ValueMap, &'a ExecutionContext) -> BoxFuture<'a, anyhow::Result<Value>>
        + Send
        + Sync,
{
    fn call<'a>(
        &'a self,
        input: ValueMap,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<Value>> {
        (self.0)(input, ctx)
    }
}

/// Holds the entry point and runs it with logging around failures.
#[derive(Default)]
pub struct MainExecutionContext {
    entry: Option<Arc<dyn EntryPoint>>,
}

impl MainExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the entry point, replacing any earlier one.
    pub fn define(&mut self, entry: Arc<dyn EntryPoint>) {
        self.entry = Some(entry);
    }

    pub fn define_fn<F>(&mut self, f: F)
    where
        F: for<'a> Fn(ValueMap, &'a ExecutionContext) -> BoxFuture<'a, anyhow::Result<Value>>
            + Send
            + Sync
            + 'static,
    {
        self.define(Arc::new(FnEntry(f)));
    }

    pub fn is_defined(&self) -> bool {
        self.entry.is_some()
    }

    /// Run the entry point with `input` as its only argument.
    ///
    /// Errors are recorded with their kind, message and a bounded trace, then
    /// returned unchanged. Nothing is retried.
    pub async fn call(&self, input: ValueMap, ctx: &ExecutionContext) -> anyhow::Result<Value> {
        let Some(entry) = &self.entry else {
            anyhow::bail!("no main entry point has been defined");
        };

        let observer = ctx.observer();
        observer.record_event(&ObserverEvent::InvocationStart {
            invocation_id: ctx.invocation_id().to_string(),
        });
        let started = Instant::now();

        let result = entry.call(input, ctx).await;

        if let Err(e) = &result {
            let kind = ErrorKind::classify(e);
            let trace = trace_excerpt(e);
            error!(invocation = %ctx.invocation_id(), kind = %kind, "main entry point failed: {e}");
            observer.record_event(&ObserverEvent::Error {
                component: "main".into(),
                kind: kind.to_string(),
                message: e.to_string(),
                trace,
            });
        }
        observer.record_event(&ObserverEvent::InvocationEnd {
            invocation_id: ctx.invocation_id().to_string(),
            duration: started.elapsed(),
            success: result.is_ok(),
        });
        result
    }
}

/// Causes below the top-level message, capped in count and length.
pub fn trace_excerpt(error: &anyhow::Error) -> Vec<String> {
    error
        .chain()
        .skip(1)
        .take(MAX_TRACE_ENTRIES)
        .map(|cause| {
            let text = cause.to_string();
            if text.chars().count() > MAX_TRACE_ENTRY_CHARS {
                let cut: String = text.chars().take(MAX_TRACE_ENTRY_CHARS).collect();
                format!("{cut}…")
            } else {
                text
            }
        })
        .collect()
}
