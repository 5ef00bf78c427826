use super::parse_args;
use super::traits::Tool;
use crate::error::ToolError;
use crate::runtime::{BoxFuture, ExecutionContext};
use crate::sandbox::RunOptions;
use crate::value::{Value, ValueMap};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ProcessArgs {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    working_dir: Option<PathBuf>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Runs one program with an argument vector through the process sandbox.
pub struct ProcessTool;

impl ProcessTool {
    pub const fn new() -> Self {
        Self
    }
}

impl Tool for ProcessTool {
    fn name(&self) -> &str {
        "process_run"
    }

    fn description(&self) -> &str {
        "Run a program with an argument list (no shell) and return its output"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "Program name or path"},
                "args": {"type": "array", "items": {"type": "string"}},
                "env": {"type": "object", "additionalProperties": {"type": "string"}},
                "working_dir": {"type": "string"},
                "timeout_secs": {"type": "integer", "minimum": 1}
            },
            "required": ["command"]
        })
    }

    fn execute<'a>(
        &'a self,
        args: ValueMap,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<Value>> {
        Box::pin(async move {
            let args: ProcessArgs = parse_args(self.name(), args)?;
            if args.timeout_secs == Some(0) {
                return Err(ToolError::InvalidArguments {
                    name: self.name().to_string(),
                    message: "timeout_secs must be at least 1".into(),
                }
                .into());
            }
            let options = RunOptions {
                env: args.env,
                working_dir: args.working_dir,
                timeout: args.timeout_secs.map(Duration::from_secs),
            };
            let outcome = ctx.process().run(&args.command, args.args.as_slice(), &options).await;
            Ok(outcome.into_value())
        })
    }
}
