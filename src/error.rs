//! Error types for parsing and executing take-skip programmes.

use std::fmt;

/// The category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command string does not match the grammar.
    Syntax,
    /// An argument is outside its allowed set (remnant policy, repeat count,
    /// buffer shape or contents).
    InvalidArgument,
    /// A backup would move the cursor before the start of the buffer.
    NegativePointer,
    /// A skip or permute references past the end of the buffer.
    ExceedsLength,
}

/// Position information for error reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    /// Byte offset in the command string.
    pub source_pos: Option<usize>,
    /// Index of the failing command in the compiled programme.
    pub command: Option<usize>,
}

impl Position {
    /// Create a position with source location.
    pub fn at_source(pos: usize) -> Self {
        Self {
            source_pos: Some(pos),
            command: None,
        }
    }

    /// Create a position pointing at a compiled command.
    pub fn at_command(index: usize) -> Self {
        Self {
            source_pos: None,
            command: Some(index),
        }
    }
}

/// Errors that can occur while parsing or executing a programme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The category of the failure.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
    /// Position information for the error.
    pub position: Position,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: Position::default(),
        }
    }

    /// A grammar error at a byte offset of the command string.
    pub fn syntax(message: impl Into<String>, pos: usize) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            position: Position::at_source(pos),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn negative_pointer(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NegativePointer, message)
    }

    pub fn exceeds_length(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExceedsLength, message)
    }

    /// Add source position to an existing error.
    pub fn with_source_pos(mut self, pos: usize) -> Self {
        self.position.source_pos = Some(pos);
        self
    }

    /// Add the failing command index to an existing error.
    pub fn with_command(mut self, index: usize) -> Self {
        self.position.command = Some(index);
        self
    }

    /// Render the source line with a caret under the error position.
    ///
    /// Returns just the message when the error has no source position.
    pub fn caret(&self, source: &str) -> String {
        match self.position.source_pos {
            Some(pos) => {
                let column = source[..pos.min(source.len())].chars().count();
                format!("{}\n  {}\n  {}^", self.message, source, " ".repeat(column))
            }
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        match (self.position.source_pos, self.position.command) {
            (Some(pos), Some(cmd)) => {
                write!(f, " (at position {}, command {})", pos, cmd)
            }
            (Some(pos), None) => write!(f, " (at position {})", pos),
            (None, Some(cmd)) => write!(f, " (at command {})", cmd),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for parsing and execution.
pub type Result<T> = std::result::Result<T, Error>;
