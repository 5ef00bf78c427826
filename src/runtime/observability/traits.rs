use std::time::Duration;
use tracing::Level;

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    InvocationStart {
        invocation_id: String,
    },
    InvocationEnd {
        invocation_id: String,
        duration: Duration,
        success: bool,
    },
    TaskInvoked {
        task: String,
        strategy: String,
        duration: Duration,
        success: bool,
    },
    StepCompleted {
        step: String,
        duration: Duration,
    },
    ToolCall {
        tool: String,
        duration: Duration,
        success: bool,
    },
    SandboxRejected {
        sandbox: &'static str,
        target: String,
        reason: String,
    },
    ExternalFailure {
        sandbox: &'static str,
        target: String,
        message: String,
    },
    Error {
        component: String,
        kind: String,
        message: String,
        trace: Vec<String>,
    },
    /// Free-form log line emitted by generated code.
    Log {
        level: Level,
        message: String,
    },
}

/// Receives runtime and sandbox events; one implementation per backend
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
