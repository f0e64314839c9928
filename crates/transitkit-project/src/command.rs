//! The undoable command abstraction.

use std::fmt;

use transitkit_core::{CommandError, IntegrityError};

use crate::project::Project;

/// One reversible mutation of a [`Project`].
///
/// `execute` may fail with a checked error, in which case the project must
/// be left untouched. `undo` and `redo` only fail when memento bookkeeping
/// is broken.
pub trait Command: Send {
    fn name(&self) -> &str;

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError>;

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError>;

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError>;
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name()).finish()
    }
}

/// Lifecycle of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandState {
    #[default]
    Created,
    Executed,
    Undone,
    Redone,
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandState::Created => "created",
            CommandState::Executed => "executed",
            CommandState::Undone => "undone",
            CommandState::Redone => "redone",
        };
        f.write_str(name)
    }
}

impl CommandState {
    fn invalid(self, command: &str, action: &'static str) -> IntegrityError {
        IntegrityError::InvalidState {
            command: command.to_string(),
            action,
            state: self.to_string(),
        }
    }

    /// Fails unless the command has not run yet.
    pub fn check_execute(self, command: &str) -> Result<(), IntegrityError> {
        match self {
            CommandState::Created => Ok(()),
            other => Err(other.invalid(command, "execute")),
        }
    }

    /// Fails unless the command is in effect.
    pub fn check_undo(self, command: &str) -> Result<(), IntegrityError> {
        match self {
            CommandState::Executed | CommandState::Redone => Ok(()),
            other => Err(other.invalid(command, "undo")),
        }
    }

    /// Fails unless the command has been undone.
    pub fn check_redo(self, command: &str) -> Result<(), IntegrityError> {
        match self {
            CommandState::Undone => Ok(()),
            other => Err(other.invalid(command, "redo")),
        }
    }
}

/// Wraps a checked error raised while replaying a command.
pub(crate) fn restore_failed(command: &str, err: impl fmt::Display) -> IntegrityError {
    IntegrityError::RestoreFailed {
        command: command.to_string(),
        reason: err.to_string(),
    }
}

/// A memento that should have been captured is missing.
pub(crate) fn missing_memento(command: &str, what: impl Into<String>) -> IntegrityError {
    IntegrityError::MissingMemento {
        command: command.to_string(),
        what: what.into(),
    }
}
