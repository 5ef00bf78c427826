pub mod context;
pub mod engine;
pub mod main_context;
pub mod observability;

pub use context::{ExecutionContext, ExecutionContextBuilder};
pub use engine::Engine;
pub use main_context::{EntryPoint, MainExecutionContext};

use std::future::Future;
use std::pin::Pin;

/// Boxed, sendable future returned across trait-object seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
