pub mod http;
pub mod process;
pub mod registry;
pub mod traits;

pub use http::HttpTool;
pub use process::ProcessTool;
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolSpec};

use crate::error::ToolError;
use crate::value::{Value, ValueMap};
use serde::de::DeserializeOwned;

/// Deserialize a tool's argument map into its typed argument struct.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: ValueMap) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::from(Value::Map(args))).map_err(|e| {
        ToolError::InvalidArguments {
            name: tool.to_string(),
            message: e.to_string(),
        }
    })
}
