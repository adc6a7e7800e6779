//! Typed errors for repository and lifecycle operations.
//!
//! Expected problems (missing rows, forbidden transitions, short tool stock,
//! failed validation) each get their own variant so callers can react to
//! them; store faults keep their `rusqlite` or `io` cause. The command layer
//! turns any of them into a short [`Message`] with
//! [`WorkshopError::user_message`].

use crate::libs::messages::Message;
use crate::libs::session::{SessionStatus, Transition};
use crate::libs::validation::ValidationResult;
use std::fmt;
use thiserror::Error;

/// Kinds of rows that can be looked up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Student,
    Tool,
    Session,
    ToolUsage,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Student => "student",
            Entity::Tool => "tool",
            Entity::Session => "session",
            Entity::ToolUsage => "tool usage",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum WorkshopError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("{0} has no id, it was never stored")]
    Unsaved(Entity),

    #[error("cannot {action} session {id} while it is {status}")]
    InvalidTransition {
        id: i64,
        action: Transition,
        status: SessionStatus,
    },

    #[error("tool '{name}' has {available} unit(s) available, {requested} requested")]
    InsufficientQuantity {
        tool_id: i64,
        name: String,
        available: i32,
        requested: i32,
    },

    #[error("tool '{name}' is {status} and cannot be borrowed")]
    ToolUnavailable { tool_id: i64, name: String, status: String },

    #[error("tool '{name}' has {reserved} unit(s) reserved, quantity cannot drop below that")]
    NegativeAvailability { tool_id: i64, name: String, reserved: i32 },

    #[error("tool '{name}' is reserved by a session in progress")]
    ToolReserved { tool_id: i64, name: String },

    #[error("tools of session {0} can only change while it is scheduled")]
    ToolsLocked(i64),

    #[error("sessions cannot be created in progress")]
    UnreservedInProgress,

    #[error("student {0} has a session in progress")]
    StudentHasActiveSession(i64),

    #[error("validation failed: {0}")]
    Validation(ValidationResult),

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WorkshopResult<T> = Result<T, WorkshopError>;

impl WorkshopError {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        WorkshopError::NotFound { entity, id }
    }

    /// Short text suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> Message {
        match self {
            WorkshopError::NotFound { entity, id } => match entity {
                Entity::Student => Message::StudentNotFound(id.to_string()),
                Entity::Tool => Message::ToolNotFound(id.to_string()),
                Entity::Session => Message::SessionNotFound(*id),
                Entity::ToolUsage => Message::UsageNotFound(*id),
            },
            WorkshopError::Unsaved(entity) => Message::RecordNotSaved(entity.to_string()),
            WorkshopError::InvalidTransition { id, action, status } => {
                Message::InvalidTransition(*id, action.to_string(), status.to_string())
            }
            WorkshopError::InsufficientQuantity {
                name, available, requested, ..
            } => Message::InsufficientQuantity(name.clone(), *available, *requested),
            WorkshopError::ToolUnavailable { name, status, .. } => Message::ToolUnavailable(name.clone(), status.clone()),
            WorkshopError::NegativeAvailability { name, reserved, .. } => Message::NegativeAvailability(name.clone(), *reserved),
            WorkshopError::ToolReserved { name, .. } => Message::ToolReserved(name.clone()),
            WorkshopError::ToolsLocked(id) => Message::SessionToolsLocked(*id),
            WorkshopError::UnreservedInProgress => Message::SessionUnreservedInProgress,
            WorkshopError::StudentHasActiveSession(id) => Message::StudentHasActiveSession(*id),
            WorkshopError::Validation(_) => Message::ValidationFailed,
            WorkshopError::UnknownVariant { kind, value } => match *kind {
                "tool status" => Message::ToolStatusInvalid(value.clone()),
                "tool condition" => Message::ConditionInvalid(value.clone()),
                _ => Message::SessionStatusInvalid(value.clone()),
            },
            WorkshopError::Database(_) => Message::DatabaseFault,
            WorkshopError::Io(_) => Message::StorageFault,
        }
    }
}
