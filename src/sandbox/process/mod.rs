//! External process execution for generated code.
//!
//! Commands always run as an argument vector (`execve` semantics). There is no
//! shell anywhere on this path, so metacharacters in arguments are inert text.

mod outcome;

pub use outcome::ProcessOutcome;

use outcome::describe;

use super::truncate_utf8;
use crate::config::ProcessSandboxConfig;
use crate::error::SecurityError;
use crate::runtime::observability::{NoopObserver, Observer, ObserverEvent};
use crate::security::escape::{has_nul, render_command_line};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SANDBOX: &str = "process";

/// Per-call options for [`ProcessSandbox::run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Added on top of the scrubbed, inherited environment.
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
    /// Clamped to `max_timeout_secs`; the configured default when unset.
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct ProcessSandbox {
    config: ProcessSandboxConfig,
    default_dir: Option<PathBuf>,
    observer: Arc<dyn Observer>,
}

impl ProcessSandbox {
    pub fn new(config: ProcessSandboxConfig) -> Self {
        Self {
            config,
            default_dir: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Directory used when a call does not name one.
    pub fn with_default_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_dir = Some(dir.into());
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ProcessSandboxConfig {
        &self.config
    }

    /// Effective timeout for a call that requested `requested`.
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or_else(|| self.config.default_timeout())
            .min(self.config.max_timeout())
    }

    pub async fn run<S: AsRef<str>>(
        &self,
        command: &str,
        args: &[S],
        options: &RunOptions,
    ) -> ProcessOutcome {
        let line = render_command_line(command, args);
        if let Err(reason) = self.check(command, args, options) {
            self.observer.record_event(&ObserverEvent::SandboxRejected {
                sandbox: SANDBOX,
                target: line,
                reason: reason.clone(),
            });
            return ProcessOutcome::rejected(reason);
        }

        let timeout = self.effective_timeout(options.timeout);
        debug!(command = %line, timeout_secs = timeout.as_secs(), "process.run");

        let mut cmd = tokio::process::Command::new(command);
        cmd.args(args.iter().map(AsRef::as_ref))
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for var in &self.config.inherit_env {
            if let Ok(val) = std::env::var(var) {
                cmd.env(var, val);
            }
        }
        cmd.envs(&options.env);
        if let Some(dir) = self.resolve_dir(options.working_dir.as_deref()) {
            cmd.current_dir(dir);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return self.failure(line, format!("failed to start process: {e}")),
        };

        // Dropping the pending future drops the child, which kills it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let limit = self.config.max_output_bytes;
                let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                truncate_utf8(&mut stdout, limit, &format!("\n... [output truncated at {limit} bytes]"));
                truncate_utf8(&mut stderr, limit, &format!("\n... [stderr truncated at {limit} bytes]"));
                ProcessOutcome {
                    success: output.status.success(),
                    stdout,
                    stderr,
                    exit_code: output.status.code().unwrap_or(-1),
                    timed_out: false,
                }
            }
            Ok(Err(e)) => self.failure(line, format!("failed to collect process output: {e}")),
            Err(_) => {
                self.observer.record_event(&ObserverEvent::ExternalFailure {
                    sandbox: SANDBOX,
                    target: line,
                    message: format!("timed out after {}", describe(timeout)),
                });
                ProcessOutcome::timed_out(timeout)
            }
        }
    }

    /// Relative directories resolve against the sandbox default directory.
    fn resolve_dir(&self, requested: Option<&Path>) -> Option<PathBuf> {
        match (requested, self.default_dir.as_deref()) {
            (Some(dir), Some(base)) if dir.is_relative() => Some(base.join(dir)),
            (Some(dir), _) => Some(dir.to_path_buf()),
            (None, base) => base.map(Path::to_path_buf),
        }
    }

    /// Raw shell-interpreted command strings are not offered.
    pub fn shell(&self, _command_line: &str) -> Result<ProcessOutcome, SecurityError> {
        Err(SecurityError::CapabilityRemoved {
            capability: "shell command execution",
        })
    }

    /// Detached processes would outlive the timeout and lifecycle control.
    pub fn spawn_background<S: AsRef<str>>(
        &self,
        _command: &str,
        _args: &[S],
    ) -> Result<u32, SecurityError> {
        Err(SecurityError::CapabilityRemoved {
            capability: "background process spawning",
        })
    }

    fn check<S: AsRef<str>>(
        &self,
        command: &str,
        args: &[S],
        options: &RunOptions,
    ) -> Result<(), String> {
        if command.trim().is_empty() {
            return Err("empty command".into());
        }
        if has_nul(command) || args.iter().any(|a| has_nul(a.as_ref())) {
            return Err("NUL byte in command or argument".into());
        }
        if options
            .env
            .iter()
            .any(|(k, v)| k.is_empty() || k.contains('=') || has_nul(k) || has_nul(v))
        {
            return Err("invalid environment variable".into());
        }
        if !self.is_command_allowed(command) {
            return Err(format!("command '{command}' is not in the allowed command list"));
        }
        Ok(())
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if self.config.allowed_commands.is_empty() {
            return true;
        }
        let base = Path::new(command)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(command);
        self.config
            .allowed_commands
            .iter()
            .any(|allowed| allowed == command || allowed == base)
    }

    fn failure(&self, target: String, message: String) -> ProcessOutcome {
        self.observer.record_event(&ObserverEvent::ExternalFailure {
            sandbox: SANDBOX,
            target,
            message: message.clone(),
        });
        ProcessOutcome::rejected(message)
    }
}
