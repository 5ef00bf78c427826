//! Declarative, dependency-checked step execution.

pub mod declaration;
pub mod executor;
pub mod interpolate;
pub mod step;
pub mod store;

pub use declaration::{ActionDeclaration, StepDeclaration, WorkflowDeclaration};
pub use executor::DependencyWorkflowExecutor;
pub use interpolate::{interpolate, interpolate_params};
pub use step::{StepAction, StepCallable, WorkflowStep, step_fn};
pub use store::StepResultStore;
