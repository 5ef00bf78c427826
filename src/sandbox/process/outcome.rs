use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a sandboxed process run.
///
/// Serialized with the field names generated code reads:
/// `{success, output, error, exitcode, timeout}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub success: bool,
    #[serde(rename = "output")]
    pub stdout: String,
    #[serde(rename = "error")]
    pub stderr: String,
    /// `-1` when the process never exited normally (rejected, failed to
    /// start, timed out, or killed by a signal).
    #[serde(rename = "exitcode")]
    pub exit_code: i32,
    #[serde(rename = "timeout")]
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: reason.into(),
            exit_code: -1,
            timed_out: false,
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self {
            timed_out: true,
            ..Self::rejected(format!(
                "process timed out after {} and was killed",
                describe(after)
            ))
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).map_or(Value::Null, Value::from)
    }
}

/// Whole seconds as `Ns`, anything finer as `Nms`.
pub(crate) fn describe(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
