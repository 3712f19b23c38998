//! Error types for port operations.

/// Failures reported by world repositories.
///
/// `NotFound` is kept distinct so the service can map it to a not-found code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Any other storage failure, tagged with the repository operation.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage-level constraint violated (cycles, capacity, uniqueness).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures of the access evaluator itself, never policy outcomes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("access evaluator unavailable: {0}")]
    Unavailable(String),
    #[error("policy evaluation failed: {0}")]
    Evaluation(String),
}

/// Errors from the event transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("publish to {stream} failed: {message}")]
    Transport { stream: String, message: String },
    #[error("event store append failed")]
    Append(#[source] AppendError),
}

impl PublishError {
    pub fn transport(stream: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            stream: stream.into(),
            message: message.to_string(),
        }
    }
}

/// Errors from the durable event log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppendError {
    #[error("append to {stream} failed: {message}")]
    Storage { stream: String, message: String },
}

/// A unit of transactional work stopped at a named step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("step {step} failed: {source}")]
pub struct TxAbort {
    pub step: &'static str,
    #[source]
    pub source: RepoError,
}

impl TxAbort {
    pub fn new(step: &'static str, source: RepoError) -> Self {
        Self { step, source }
    }
}

/// Transaction outcome other than commit. Every variant means rolled back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxError {
    #[error("transaction aborted")]
    Aborted(#[from] TxAbort),
    #[error("failed to begin transaction: {0}")]
    Begin(String),
    #[error("failed to commit transaction: {0}")]
    Commit(String),
}

impl TxError {
    /// Name of the step that triggered the rollback.
    pub fn step(&self) -> &'static str {
        match self {
            Self::Aborted(abort) => abort.step,
            Self::Begin(_) => "begin",
            Self::Commit(_) => "commit",
        }
    }

    /// The storage error behind an aborted step.
    pub fn repo_error(&self) -> Option<&RepoError> {
        match self {
            Self::Aborted(abort) => Some(&abort.source),
            _ => None,
        }
    }
}
