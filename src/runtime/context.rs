use super::observability::{NoopObserver, Observer, ObserverEvent};
use crate::config::{NetworkSandboxConfig, ProcessSandboxConfig};
use crate::contract::{NeuralExecutor, Strategy, TaskContract, TaskRegistry};
use crate::error::ContractError;
use crate::sandbox::{NetworkSandbox, ProcessSandbox};
use crate::tools::ToolRegistry;
use crate::value::{Value, ValueMap};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::Level;

const DEFAULT_MAX_CALL_DEPTH: usize = 16;

/// Everything generated code may reach during one invocation.
///
/// Passed explicitly to task bodies, entry points, workflow steps and tools.
/// A context is never shared between invocations.
pub struct ExecutionContext {
    invocation_id: String,
    started_at: DateTime<Utc>,
    workspace_dir: PathBuf,
    tasks: Arc<TaskRegistry>,
    tools: Arc<ToolRegistry>,
    network: Arc<NetworkSandbox>,
    process: Arc<ProcessSandbox>,
    observer: Arc<dyn Observer>,
    neural: Option<Arc<dyn NeuralExecutor>>,
    depth: AtomicUsize,
    max_depth: usize,
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ExecutionContext {
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::default()
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Outbound HTTP.
    pub fn http(&self) -> &NetworkSandbox {
        &self.network
    }

    /// External processes.
    pub fn process(&self) -> &ProcessSandbox {
        &self.process
    }

    pub fn observer(&self) -> &Arc<dyn Observer> {
        &self.observer
    }

    pub fn neural(&self) -> Option<&Arc<dyn NeuralExecutor>> {
        self.neural.as_ref()
    }

    /// Current nesting of `invoke_task` calls.
    pub fn call_depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.observer.record_event(&ObserverEvent::Log {
            level,
            message: message.into(),
        });
    }

    /// Invoke a registered task by name.
    ///
    /// Neural tasks run through the injected [`NeuralExecutor`] when one is
    /// present, under the same input and output checks as a body.
    pub async fn invoke_task(&self, name: &str, inputs: ValueMap) -> anyhow::Result<ValueMap> {
        let contract = self.tasks.lookup(name)?;
        let _guard = self.enter(name)?;

        let started = Instant::now();
        let result = self.dispatch(&contract, inputs).await;
        self.observer.record_event(&ObserverEvent::TaskInvoked {
            task: name.to_string(),
            strategy: contract.strategy().to_string(),
            duration: started.elapsed(),
            success: result.is_ok(),
        });
        result
    }

    /// Call a registered tool by name.
    pub async fn call_tool(&self, name: &str, args: ValueMap) -> anyhow::Result<Value> {
        let started = Instant::now();
        let result = self.tools.execute(name, args, self).await;
        let success = result
            .as_ref()
            .is_ok_and(|value| value.get("success").and_then(Value::as_bool) != Some(false));
        self.observer.record_event(&ObserverEvent::ToolCall {
            tool: name.to_string(),
            duration: started.elapsed(),
            success,
        });
        result
    }

    async fn dispatch(&self, contract: &TaskContract, inputs: ValueMap) -> anyhow::Result<ValueMap> {
        if let (Strategy::Neural, Some(neural)) = (contract.strategy(), &self.neural) {
            let inputs = contract.prepare_inputs(inputs)?;
            let instructions = contract.instructions().unwrap_or_default();
            let outputs = neural
                .execute(instructions, &inputs, contract.output_schema())
                .await?;
            return Ok(contract.validate_outputs(outputs)?);
        }
        contract.invoke(inputs, self).await
    }

    fn enter(&self, task: &str) -> Result<DepthGuard<'_>, ContractError> {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = DepthGuard(&self.depth);
        if depth > self.max_depth {
            return Err(ContractError::CallDepthExceeded {
                task: task.to_string(),
                limit: self.max_depth,
            });
        }
        Ok(guard)
    }
}

/// Assembles an [`ExecutionContext`]; unset parts fall back to defaults.
#[derive(Default)]
pub struct ExecutionContextBuilder {
    workspace_dir: Option<PathBuf>,
    tasks: Option<Arc<TaskRegistry>>,
    tools: Option<Arc<ToolRegistry>>,
    network: Option<Arc<NetworkSandbox>>,
    process: Option<Arc<ProcessSandbox>>,
    observer: Option<Arc<dyn Observer>>,
    neural: Option<Arc<dyn NeuralExecutor>>,
    max_depth: Option<usize>,
}

impl ExecutionContextBuilder {
    pub fn workspace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_dir = Some(dir.into());
        self
    }

    pub fn tasks(mut self, tasks: Arc<TaskRegistry>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn network(mut self, network: Arc<NetworkSandbox>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn process(mut self, process: Arc<ProcessSandbox>) -> Self {
        self.process = Some(process);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn neural(mut self, neural: Arc<dyn NeuralExecutor>) -> Self {
        self.neural = Some(neural);
        self
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn build(self) -> ExecutionContext {
        let observer = self.observer.unwrap_or_else(|| Arc::new(NoopObserver));
        let workspace_dir = self
            .workspace_dir
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let network = self.network.unwrap_or_else(|| {
            Arc::new(NetworkSandbox::new(NetworkSandboxConfig::default()).with_observer(observer.clone()))
        });
        let process = self.process.unwrap_or_else(|| {
            Arc::new(
                ProcessSandbox::new(ProcessSandboxConfig::default())
                    .with_default_dir(workspace_dir.clone())
                    .with_observer(observer.clone()),
            )
        });

        ExecutionContext {
            invocation_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            workspace_dir,
            tasks: self.tasks.unwrap_or_default(),
            tools: self
                .tools
                .unwrap_or_else(|| Arc::new(ToolRegistry::with_builtins())),
            network,
            process,
            observer,
            neural: self.neural,
            depth: AtomicUsize::new(0),
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_CALL_DEPTH),
        }
    }
}
