use super::schema::TypeSchema;
use crate::runtime::BoxFuture;
use crate::value::ValueMap;

/// Capability that carries out natural-language instructions.
///
/// Supplied by the host runtime (typically backed by a language model). The
/// returned map is validated against `output_schema` by the caller, exactly as
/// a task body's result would be.
pub trait NeuralExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        instructions: &'a str,
        inputs: &'a ValueMap,
        output_schema: &'a TypeSchema,
    ) -> BoxFuture<'a, anyhow::Result<ValueMap>>;

    fn name(&self) -> &str {
        "neural"
    }
}
