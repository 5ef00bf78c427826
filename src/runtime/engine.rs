use super::context::ExecutionContext;
use super::observability::{Observer, create_observer};
use crate::config::Config;
use crate::contract::{NeuralExecutor, TaskContract, TaskRegistry};
use crate::error::ContractError;
use crate::sandbox::{NetworkSandbox, ProcessSandbox};
use crate::tools::{Tool, ToolRegistry};
use std::sync::Arc;

/// Long-lived state for one agent: its tasks, tools and sandboxes.
///
/// Hands out a fresh [`ExecutionContext`] per invocation so no per-call
/// state leaks between invocations.
pub struct Engine {
    config: Config,
    tasks: Arc<TaskRegistry>,
    tools: Arc<ToolRegistry>,
    network: Arc<NetworkSandbox>,
    process: Arc<ProcessSandbox>,
    observer: Arc<dyn Observer>,
    neural: Option<Arc<dyn NeuralExecutor>>,
}

impl Engine {
    /// Build from config with the configured observer backend.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));
        Self::new(config, observer)
    }

    pub fn new(config: Config, observer: Arc<dyn Observer>) -> anyhow::Result<Self> {
        config.validate()?;
        let network = NetworkSandbox::from_config(&config.sandbox.network)?
            .with_observer(observer.clone());
        let process = ProcessSandbox::new(config.sandbox.process.clone())
            .with_default_dir(config.workspace_dir.clone())
            .with_observer(observer.clone());

        Ok(Self {
            config,
            tasks: Arc::new(TaskRegistry::new()),
            tools: Arc::new(ToolRegistry::with_builtins()),
            network: Arc::new(network),
            process: Arc::new(process),
            observer,
            neural: None,
        })
    }

    /// Replace the network sandbox, e.g. to inject a resolver.
    pub fn with_network(mut self, network: NetworkSandbox) -> Self {
        self.network = Arc::new(network.with_observer(self.observer.clone()));
        self
    }

    pub fn with_neural(mut self, neural: Arc<dyn NeuralExecutor>) -> Self {
        self.neural = Some(neural);
        self
    }

    pub fn register_task(&mut self, contract: TaskContract) -> Result<(), ContractError> {
        Arc::make_mut(&mut self.tasks).register(contract)
    }

    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        Arc::make_mut(&mut self.tools).register(tool);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn observer(&self) -> &Arc<dyn Observer> {
        &self.observer
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Fresh context for one invocation.
    pub fn context(&self) -> ExecutionContext {
        let mut builder = ExecutionContext::builder()
            .workspace_dir(self.config.workspace_dir.clone())
            .tasks(self.tasks.clone())
            .tools(self.tools.clone())
            .network(self.network.clone())
            .process(self.process.clone())
            .observer(self.observer.clone())
            .max_call_depth(self.config.runtime.max_call_depth);
        if let Some(neural) = &self.neural {
            builder = builder.neural(neural.clone());
        }
        builder.build()
    }
}
