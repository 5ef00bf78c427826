//! Capability sandboxes for the external effects generated code may request.
//!
//! Every request is checked against a fixed policy before anything leaves the
//! process. Rejections and ordinary failures come back as values
//! ([`HttpResponse`], [`ProcessOutcome`]) so generated code can branch on them
//! without error handling; only calls to permanently removed capabilities
//! return an `Err`.

pub mod network;
pub mod process;

use serde::{Deserialize, Serialize};

pub use network::{
    Auth, HttpMethod, HttpResponse, NetworkSandbox, RequestBody, RequestOptions, Resolver,
    StaticResolver, SystemResolver,
};
pub use process::{ProcessOutcome, ProcessSandbox, RunOptions};

/// Verdict reached before any external side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxDecision {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SandboxDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Cut `text` to at most `max_bytes` on a char boundary, appending `marker` when cut.
pub(crate) fn truncate_utf8(text: &mut String, max_bytes: usize, marker: &str) {
    if text.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.push_str(marker);
}
