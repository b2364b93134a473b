//! Errors raised by the automaton mutation/query API

use thiserror::Error;

use crate::fsm::StateId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsaError {
    #[error("Invalid state name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("Unknown state: {0}")]
    UnknownState(StateId),
    #[error("Invalid event name '{0}': events may only contain letters")]
    InvalidEventName(String),
    #[error("Transition {from}({event}){to} already exists")]
    DuplicateTransition {
        from: String,
        event: String,
        to: String,
    },
}

pub type FsaResult<T> = Result<T, FsaError>;
