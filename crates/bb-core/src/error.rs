use std::fmt;

use thiserror::Error;

use crate::types::Opcode;

/// Where in a program a content error surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionLocation {
    pub node: String,
    pub instruction: usize,
    pub opcode: Opcode,
}

impl fmt::Display for InstructionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ({:?})", self.node, self.instruction, self.opcode)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct DialogueError {
    pub code: String,
    pub message: String,
    pub location: Option<InstructionLocation>,
}

impl DialogueError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a location unless one is already present.
    pub fn located(mut self, location: InstructionLocation) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }
}
