//! Errors surfaced by the world service.
//!
//! Every error carries the entity kind it concerns and, where relevant, the
//! operation that failed, so `code()` can produce a stable identifier such as
//! `LOCATION_NOT_FOUND` or `OBJECT_MOVE_EVENT_FAILED`.

use std::fmt;

use mushworld_domain::DomainError;

use crate::infrastructure::emitter::EmitError;
use crate::infrastructure::ports::{AccessError, InvalidAccessRequest, RepoError, TxError};
use crate::request_context::Interrupted;

/// Entity prefix used in error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Location,
    Exit,
    Object,
    Character,
    Scene,
    Property,
    /// Examine operations report under their own prefix.
    Examine,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Location => "LOCATION",
            Self::Exit => "EXIT",
            Self::Object => "OBJECT",
            Self::Character => "CHARACTER",
            Self::Scene => "SCENE",
            Self::Property => "PROPERTY",
            Self::Examine => "EXAMINE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Update,
    Delete,
    Find,
    List,
    Query,
    Move,
    Give,
    AddParticipant,
    RemoveParticipant,
    ListParticipants,
    Examine,
    ExamineLocation,
    ExamineObject,
    ExamineCharacter,
}

impl Operation {
    /// Middle segment of `{ENTITY}_{OP}_FAILED`. Plain examine has none.
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            Self::Get => Some("GET"),
            Self::Create => Some("CREATE"),
            Self::Update => Some("UPDATE"),
            Self::Delete => Some("DELETE"),
            Self::Find => Some("FIND"),
            Self::List => Some("LIST"),
            Self::Query => Some("QUERY"),
            Self::Move => Some("MOVE"),
            Self::Give => Some("GIVE"),
            Self::AddParticipant => Some("ADD_PARTICIPANT"),
            Self::RemoveParticipant => Some("REMOVE_PARTICIPANT"),
            Self::ListParticipants => Some("LIST_PARTICIPANTS"),
            Self::Examine => None,
            Self::ExamineLocation => Some("LOCATION"),
            Self::ExamineObject => Some("OBJECT"),
            Self::ExamineCharacter => Some("CHARACTER"),
        }
    }

    fn code(&self, entity: EntityKind, suffix: &str) -> String {
        match self.segment() {
            Some(segment) => format!("{}_{}_{}", entity.prefix(), segment, suffix),
            None => format!("{}_{}", entity.prefix(), suffix),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Find => "find",
            Self::List => "list",
            Self::Query => "query",
            Self::Move => "move",
            Self::Give => "give",
            Self::AddParticipant => "add participant",
            Self::RemoveParticipant => "remove participant",
            Self::ListParticipants => "list participants",
            Self::Examine => "examine",
            Self::ExamineLocation => "examine location",
            Self::ExamineObject => "examine object",
            Self::ExamineCharacter => "examine character",
        };
        f.write_str(name)
    }
}

/// Coarse classification for callers that branch on failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Validation,
    NotFound,
    PermissionDenied,
    AccessEvaluationFailed,
    StorageFailed,
    FailedPrecondition,
    EventDeliveryFailed,
    TransactionFailed,
    Cancelled,
}

/// Why an access decision could not be made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessFailure {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidAccessRequest),
    #[error(transparent)]
    Evaluator(#[from] AccessError),
    #[error("access check interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("{entity} {operation}: {collaborator} not configured")]
    Configuration {
        entity: EntityKind,
        operation: Operation,
        collaborator: &'static str,
    },

    #[error("invalid {entity}: {source}")]
    Invalid {
        entity: EntityKind,
        #[source]
        source: DomainError,
    },

    #[error("{entity} not found: {id}")]
    NotFound {
        entity: EntityKind,
        id: String,
        #[source]
        source: Option<RepoError>,
    },

    #[error("{entity} access denied: {reason}")]
    AccessDenied {
        entity: EntityKind,
        reason: String,
        policy_id: Option<String>,
    },

    #[error("{entity} access evaluation failed")]
    AccessEvaluationFailed {
        entity: EntityKind,
        #[source]
        source: AccessFailure,
    },

    #[error("{entity} {operation} failed")]
    OperationFailed {
        entity: EntityKind,
        operation: Operation,
        #[source]
        source: RepoError,
    },

    #[error("{entity} {operation} failed: {message}")]
    Precondition {
        entity: EntityKind,
        operation: Operation,
        message: String,
    },

    #[error("{entity} {operation} event failed")]
    EventDeliveryFailed {
        entity: EntityKind,
        operation: Operation,
        #[source]
        source: EmitError,
    },

    #[error("{entity} {operation} rolled back at {step}")]
    TransactionFailed {
        entity: EntityKind,
        operation: Operation,
        step: &'static str,
        #[source]
        source: TxError,
    },

    #[error("{entity} {operation} interrupted")]
    Interrupted {
        entity: EntityKind,
        operation: Operation,
        #[source]
        source: Interrupted,
    },
}

impl WorldError {
    pub fn configuration(entity: EntityKind, operation: Operation, collaborator: &'static str) -> Self {
        Self::Configuration {
            entity,
            operation,
            collaborator,
        }
    }

    pub fn invalid(entity: EntityKind, source: DomainError) -> Self {
        Self::Invalid { entity, source }
    }

    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
            source: None,
        }
    }

    pub fn precondition(entity: EntityKind, operation: Operation, message: impl Into<String>) -> Self {
        Self::Precondition {
            entity,
            operation,
            message: message.into(),
        }
    }

    pub fn interrupted(entity: EntityKind, operation: Operation, source: Interrupted) -> Self {
        Self::Interrupted {
            entity,
            operation,
            source,
        }
    }

    pub fn event_failed(entity: EntityKind, operation: Operation, source: EmitError) -> Self {
        Self::EventDeliveryFailed {
            entity,
            operation,
            source,
        }
    }

    /// Maps a storage error, keeping "not found" distinct from other failures.
    pub fn from_repo(entity: EntityKind, operation: Operation, id: impl ToString, err: RepoError) -> Self {
        if err.is_not_found() {
            Self::NotFound {
                entity,
                id: id.to_string(),
                source: Some(err),
            }
        } else {
            Self::OperationFailed {
                entity,
                operation,
                source: err,
            }
        }
    }

    /// Maps a rolled-back transaction. A not-found abort at one of
    /// `not_found_steps` surfaces as `NotFound` for the entity.
    pub fn from_transaction(
        entity: EntityKind,
        operation: Operation,
        id: impl ToString,
        err: TxError,
        not_found_steps: &[&str],
    ) -> Self {
        let step = err.step();
        match err.repo_error() {
            Some(repo) if repo.is_not_found() && not_found_steps.contains(&step) => Self::NotFound {
                entity,
                id: id.to_string(),
                source: Some(repo.clone()),
            },
            _ => Self::TransactionFailed {
                entity,
                operation,
                step,
                source: err,
            },
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Configuration { entity, .. }
            | Self::Invalid { entity, .. }
            | Self::NotFound { entity, .. }
            | Self::AccessDenied { entity, .. }
            | Self::AccessEvaluationFailed { entity, .. }
            | Self::OperationFailed { entity, .. }
            | Self::Precondition { entity, .. }
            | Self::EventDeliveryFailed { entity, .. }
            | Self::TransactionFailed { entity, .. }
            | Self::Interrupted { entity, .. } => *entity,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> String {
        match self {
            Self::Invalid { entity, .. } => format!("{}_INVALID", entity.prefix()),
            Self::NotFound { entity, .. } => format!("{}_NOT_FOUND", entity.prefix()),
            Self::AccessDenied { entity, .. } => format!("{}_ACCESS_DENIED", entity.prefix()),
            Self::AccessEvaluationFailed { entity, .. } => {
                format!("{}_ACCESS_EVALUATION_FAILED", entity.prefix())
            }
            Self::EventDeliveryFailed {
                entity, operation, ..
            } => operation.code(*entity, "EVENT_FAILED"),
            Self::Configuration {
                entity, operation, ..
            }
            | Self::OperationFailed {
                entity, operation, ..
            }
            | Self::Precondition {
                entity, operation, ..
            }
            | Self::TransactionFailed {
                entity, operation, ..
            }
            | Self::Interrupted {
                entity, operation, ..
            } => operation.code(*entity, "FAILED"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Invalid { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied { .. } => ErrorKind::PermissionDenied,
            Self::AccessEvaluationFailed { .. } => ErrorKind::AccessEvaluationFailed,
            Self::OperationFailed { .. } => ErrorKind::StorageFailed,
            Self::Precondition { .. } => ErrorKind::FailedPrecondition,
            Self::EventDeliveryFailed { .. } => ErrorKind::EventDeliveryFailed,
            Self::TransactionFailed { .. } => ErrorKind::TransactionFailed,
            Self::Interrupted { .. } => ErrorKind::Cancelled,
        }
    }

    /// True when the state change was stored before the failure, so the
    /// caller must not retry the operation itself.
    pub fn change_committed(&self) -> bool {
        matches!(
            self,
            Self::EventDeliveryFailed {
                operation: Operation::Move | Operation::Give,
                ..
            }
        )
    }

    /// Emission error behind an event failure.
    pub fn emit_error(&self) -> Option<&EmitError> {
        match self {
            Self::EventDeliveryFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type WorldResult<T> = Result<T, WorldError>;
