//! Typed task contracts.
//!
//! A [`TaskContract`] pairs an input and output [`TypeSchema`] with an
//! implementation: natural-language instructions, a code body, or both.
//! Whatever the implementation, values crossing the contract are checked and
//! coerced by the rules in [`coerce`].

pub mod coerce;
pub mod neural;
pub mod registry;
pub mod schema;
pub mod task;

pub use neural::NeuralExecutor;
pub use registry::TaskRegistry;
pub use schema::{TypeSchema, TypeTag};
pub use task::{Strategy, TaskBody, TaskContract, body_fn};
