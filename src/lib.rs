#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

//! Execution core for machine-generated automation: typed task contracts,
//! dependency-checked workflows, a single imperative entry point, and
//! capability sandboxes for outbound HTTP and external processes.

pub mod config;
pub mod contract;
pub mod error;
pub mod runtime;
pub mod sandbox;
pub mod security;
pub mod tools;
pub mod value;
pub mod workflow;

pub use config::Config;
pub use contract::{NeuralExecutor, Strategy, TaskContract, TaskRegistry, TypeSchema, TypeTag};
pub use error::{ErrorKind, SynthError};
pub use runtime::{Engine, ExecutionContext, MainExecutionContext};
pub use sandbox::{NetworkSandbox, ProcessSandbox, SandboxDecision};
pub use value::{Value, ValueMap};
pub use workflow::{DependencyWorkflowExecutor, StepResultStore, WorkflowStep};
