//! Crate-wide error types.
//!
//! Every error carries the `(line, column)` of the source construct that
//! triggered it, so the CLI can report `"Line L: <message>"` regardless of
//! which pipeline stage raised it (spec.md §7).

use std::fmt;

use thiserror::Error;

/// 1-based source position, attached to AST nodes and tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A flag name used in `AlreadyMoving`/`NotAppeared` messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectName(pub String);

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State-machine violations shared by the analyzer (`TypeError` in spec.md
/// §7) and the interpreter (`EvalError`): both raise the same two cases.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("{0} is already moving")]
    AlreadyMoving(ObjectName),
    #[error("{0} has not appeared")]
    NotAppeared(ObjectName),
}

/// Runtime evaluation errors (spec.md §7 `EvalError`).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalErrorKind {
    #[error("{0} is not an integer")]
    NotInteger(f64),
    #[error("division by zero")]
    DivByZero,
    #[error("undeclared array '{0}'")]
    UndeclaredArray(String),
    #[error("'{array}' expects {expected} arguments, got {found}")]
    ArityMismatch {
        array: String,
        expected: usize,
        found: usize,
    },
    #[error("index {index} out of bounds for dimension {dim} of array '{array}' (extent {extent})")]
    IndexOutOfBounds {
        array: String,
        dim: usize,
        index: i64,
        extent: i64,
    },
    #[error("shape expression kind mismatch: array '{array}' holds {expected}, got {found}")]
    KindMismatch {
        array: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    State(#[from] StateError),
    #[error("objects {0} and {1} overlap")]
    Overlap(String, String),
    #[error("object {0} is covered by moving object {1}")]
    Covered(String, String),
    #[error("unsupported shape pairing for collision check")]
    UnsupportedShapePair,
    #[error("undefined loop variable '{0}'")]
    UndefinedVariable(String),
}

/// Top-level error type returned by every pipeline stage.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{pos}: {message}")]
    Parse { pos: Pos, message: String },
    #[error("{pos}: {kind}")]
    Type { pos: Pos, kind: StateError },
    #[error("{pos}: {kind}")]
    Eval { pos: Pos, kind: EvalErrorKind },
}

impl Error {
    pub fn parse(pos: Pos, message: impl Into<String>) -> Self {
        Error::Parse {
            pos,
            message: message.into(),
        }
    }

    pub fn type_err(pos: Pos, kind: StateError) -> Self {
        Error::Type { pos, kind }
    }

    pub fn eval(pos: Pos, kind: EvalErrorKind) -> Self {
        Error::Eval { pos, kind }
    }

    pub fn pos(&self) -> Pos {
        match self {
            Error::Parse { pos, .. } => *pos,
            Error::Type { pos, .. } => *pos,
            Error::Eval { pos, .. } => *pos,
        }
    }

    /// Render as `"Line L: <message>"`, the diagnostic-channel format
    /// mandated by spec.md §7.
    pub fn report(&self) -> String {
        let (pos, msg) = match self {
            Error::Parse { pos, message } => (*pos, message.clone()),
            Error::Type { pos, kind } => (*pos, kind.to_string()),
            Error::Eval { pos, kind } => (*pos, kind.to_string()),
        };
        format!("Line {}: {}", pos.line, msg)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
