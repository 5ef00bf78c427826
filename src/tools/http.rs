use super::parse_args;
use super::traits::Tool;
use crate::runtime::{BoxFuture, ExecutionContext};
use crate::sandbox::{Auth, HttpMethod, RequestBody, RequestOptions};
use crate::value::{Value, ValueMap};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct HttpArgs {
    url: String,
    #[serde(default = "default_method")]
    method: HttpMethod,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    query: BTreeMap<String, String>,
    #[serde(default)]
    body: Option<serde_json::Value>,
    #[serde(default)]
    auth: Option<Auth>,
}

fn default_method() -> HttpMethod {
    HttpMethod::Get
}

/// Outbound HTTP through the network sandbox.
pub struct HttpTool;

impl HttpTool {
    pub const fn new() -> Self {
        Self
    }
}

impl Tool for HttpTool {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Send an HTTP request to a public http(s) URL and return the normalized response"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "Absolute http or https URL"},
                "method": {"type": "string", "enum": ["GET", "POST", "PUT", "DELETE", "HEAD"]},
                "headers": {"type": "object", "additionalProperties": {"type": "string"}},
                "query": {"type": "object", "additionalProperties": {"type": "string"}},
                "body": {"description": "Text body, or any other value sent as JSON"},
                "auth": {
                    "type": "object",
                    "description": "{scheme: basic|bearer|header, ...}"
                }
            },
            "required": ["url"]
        })
    }

    fn execute<'a>(
        &'a self,
        args: ValueMap,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, anyhow::Result<Value>> {
        Box::pin(async move {
            let args: HttpArgs = parse_args(self.name(), args)?;

            let mut options = RequestOptions {
                headers: args.headers,
                query: args.query.into_iter().collect(),
                body: None,
                auth: args.auth,
            };
            options.body = args.body.map(|body| match body {
                serde_json::Value::String(text) => RequestBody::Text(text),
                other => RequestBody::Json(other),
            });

            let response = ctx.http().request(args.method, &args.url, &options).await;
            Ok(response.into_value())
        })
    }
}
