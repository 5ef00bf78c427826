use super::traits::{Observer, ObserverEvent};
use tracing::{Level, debug, error, info, trace, warn};

/// Writes every event to `tracing`
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::InvocationStart { invocation_id } => {
                info!(invocation = %invocation_id, "invocation.start");
            }
            ObserverEvent::InvocationEnd {
                invocation_id,
                duration,
                success,
            } => {
                info!(
                    invocation = %invocation_id,
                    duration_ms = millis(*duration),
                    success = success,
                    "invocation.end"
                );
            }
            ObserverEvent::TaskInvoked {
                task,
                strategy,
                duration,
                success,
            } => {
                info!(
                    task = %task,
                    strategy = %strategy,
                    duration_ms = millis(*duration),
                    success = success,
                    "task.invoke"
                );
            }
            ObserverEvent::StepCompleted { step, duration } => {
                info!(step = %step, duration_ms = millis(*duration), "workflow.step");
            }
            ObserverEvent::ToolCall {
                tool,
                duration,
                success,
            } => {
                info!(tool = %tool, duration_ms = millis(*duration), success = success, "tool.call");
            }
            ObserverEvent::SandboxRejected {
                sandbox,
                target,
                reason,
            } => {
                warn!(sandbox = %sandbox, target = %target, reason = %reason, "sandbox.rejected");
            }
            ObserverEvent::ExternalFailure {
                sandbox,
                target,
                message,
            } => {
                warn!(sandbox = %sandbox, target = %target, error = %message, "sandbox.external_failure");
            }
            ObserverEvent::Error {
                component,
                kind,
                message,
                trace,
            } => {
                error!(
                    component = %component,
                    kind = %kind,
                    error = %message,
                    trace = %trace.join(" <- "),
                    "error"
                );
            }
            ObserverEvent::Log { level, message } => match *level {
                Level::ERROR => error!(target: "synthrun::generated", "{message}"),
                Level::WARN => warn!(target: "synthrun::generated", "{message}"),
                Level::INFO => info!(target: "synthrun::generated", "{message}"),
                Level::DEBUG => debug!(target: "synthrun::generated", "{message}"),
                _ => trace!(target: "synthrun::generated", "{message}"),
            },
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
