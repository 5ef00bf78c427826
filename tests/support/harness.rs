#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use synthrun::config::NetworkSandboxConfig;
use synthrun::contract::{NeuralExecutor, TypeSchema};
use synthrun::runtime::observability::RecordingObserver;
use synthrun::runtime::{BoxFuture, ExecutionContext};
use synthrun::sandbox::NetworkSandbox;
use synthrun::security::AddressPolicy;
use synthrun::tools::{Tool, ToolRegistry};
use synthrun::value::{Value, ValueMap};

/// Network sandbox that may reach the local mock server and nothing else private.
pub fn loopback_sandbox(config: NetworkSandboxConfig) -> NetworkSandbox {
    NetworkSandbox::new(config).with_policy(AddressPolicy::with_exemptions(vec![IpAddr::V4(
        Ipv4Addr::LOCALHOST,
    )]))
}

pub fn map(pairs: &[(&str, Value)]) -> ValueMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Returns its arguments unchanged.
pub struct EchoTool;

impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "returns its arguments"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    fn execute<'a>(
        &'a self,
        args: ValueMap,
        _ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<Value>> {
        Box::pin(async move { Ok(Value::Map(args)) })
    }
}

/// Answers every prompt with `response = "echo: <prompt>"`.
pub struct ScriptedNeural;

impl NeuralExecutor for ScriptedNeural {
    fn execute<'a>(
        &'a self,
        instructions: &'a str,
        _inputs: &'a ValueMap,
        _output_schema: &'a TypeSchema,
    ) -> BoxFuture<'a, anyhow::Result<ValueMap>> {
        Box::pin(async move { Ok(map(&[("response", Value::from(format!("echo: {instructions}")))])) })
    }
}

pub fn tools_with_echo() -> Arc<ToolRegistry> {
    let mut tools = ToolRegistry::with_builtins();
    tools.register(Box::new(EchoTool));
    Arc::new(tools)
}

pub fn recording_context() -> (ExecutionContext, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    let ctx = ExecutionContext::builder()
        .tools(tools_with_echo())
        .observer(observer.clone())
        .build();
    (ctx, observer)
}
