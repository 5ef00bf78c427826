use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `synthrun`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these (or `downcast_ref` them out of an `anyhow::Error`) to decide how to
/// surface a failure; internal code uses `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum SynthError {
    // ── Task contracts ──────────────────────────────────────────────────
    #[error("contract: {0}")]
    Contract(#[from] ContractError),

    // ── Workflow ────────────────────────────────────────────────────────
    #[error("workflow: {0}")]
    Workflow(#[from] WorkflowError),

    // ── Security ────────────────────────────────────────────────────────
    #[error("security: {0}")]
    Security(#[from] SecurityError),

    // ── Tools ───────────────────────────────────────────────────────────
    #[error("tool: {0}")]
    Tool(#[from] ToolError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Contract errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("task {task}: missing required input '{field}'")]
    MissingInput { task: String, field: String },

    #[error("task {task}: missing declared output '{field}'")]
    MissingOutput { task: String, field: String },

    #[error("task {task}: field '{field}' cannot be coerced to {expected} (got {found})")]
    TypeCoercion {
        task: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("task {task}: neural strategy needs an enclosing runtime with a neural executor")]
    NotSupportedHere { task: String },

    #[error("task {task}: neither instructions nor body defined")]
    UndefinedStrategy { task: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("task {name} not found")]
    UnknownTask { name: String },

    #[error("task {name} already defined")]
    DuplicateTask { name: String },

    #[error("task {task}: call depth limit {limit} exceeded")]
    CallDepthExceeded { task: String, limit: usize },
}

impl ContractError {
    /// Field named by a contract violation, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingInput { field, .. }
            | Self::MissingOutput { field, .. }
            | Self::TypeCoercion { field, .. } => Some(field),
            _ => None,
        }
    }
}

// ─── Workflow errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("step {step} depends on '{missing}', which has not produced a result")]
    DependencyNotSatisfied { step: String, missing: String },

    #[error("step {step} already declared")]
    DuplicateStep { step: String },

    #[error("step {step}: prompt templates need a neural executor")]
    PromptUnavailable { step: String },

    #[error("invalid workflow declaration: {0}")]
    InvalidDeclaration(String),
}

// ─── Security errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("{capability} has been removed for security and cannot be re-enabled")]
    CapabilityRemoved { capability: &'static str },
}

// ─── Tool errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool {name} not found")]
    NotFound { name: String },

    #[error("tool {name}: invalid arguments: {message}")]
    InvalidArguments { name: String, message: String },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Taxonomy class of an error, used as the `kind` field when failures are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    ContractViolation,
    DependencyNotSatisfied,
    SecurityDisabled,
    Workflow,
    Tool,
    Config,
    Other,
}

impl ErrorKind {
    pub fn classify(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(err) = cause.downcast_ref::<SynthError>() {
                return match err {
                    SynthError::Contract(_) => Self::ContractViolation,
                    SynthError::Workflow(WorkflowError::DependencyNotSatisfied { .. }) => {
                        Self::DependencyNotSatisfied
                    }
                    SynthError::Workflow(_) => Self::Workflow,
                    SynthError::Security(_) => Self::SecurityDisabled,
                    SynthError::Tool(_) => Self::Tool,
                    SynthError::Config(_) => Self::Config,
                    SynthError::Other(_) => Self::Other,
                };
            }
            if cause.downcast_ref::<ContractError>().is_some() {
                return Self::ContractViolation;
            }
            if let Some(err) = cause.downcast_ref::<WorkflowError>() {
                return match err {
                    WorkflowError::DependencyNotSatisfied { .. } => Self::DependencyNotSatisfied,
                    _ => Self::Workflow,
                };
            }
            if cause.downcast_ref::<SecurityError>().is_some() {
                return Self::SecurityDisabled;
            }
            if cause.downcast_ref::<ToolError>().is_some() {
                return Self::Tool;
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::Config;
            }
        }
        Self::Other
    }
}
