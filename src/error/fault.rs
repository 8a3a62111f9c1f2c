//! Schema faults: programmer errors and execution-mode violations.

use thiserror::Error;

use super::validation_error::ValidationError;
use crate::path::JsonPath;

/// Boxed error returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A fatal condition that is not a problem with the data.
///
/// Faults are never part of an issue list. They abort the whole parse and
/// surface as `Err` from every entry point, including the safe ones.
#[derive(Debug, Error)]
pub enum SchemaFault {
    /// A pending operation was produced while synchronous execution was
    /// required. Use one of the async entry points.
    #[error("encountered an asynchronous operation during synchronous parse")]
    UnexpectedAsync,

    #[error("unmergeable intersection at '{path}'")]
    UnmergeableIntersection { path: JsonPath },

    #[error("discriminated union option {index} exposes no discriminator")]
    InvalidDiscriminatedUnionOption { index: usize },

    #[error("template literal part {index} has no pattern")]
    InvalidTemplateLiteralPart { index: usize },

    #[error("unrecognized key \"{key}\" in field mask")]
    UnknownMaskKey { key: String },

    #[error("unknown schema kind \"{name}\"")]
    UnknownKind { name: String },

    /// A transform, default, catch or refinement callback returned an error.
    #[error("callback failed: {source}")]
    Callback { source: BoxError },
}

impl SchemaFault {
    pub fn callback(source: impl Into<BoxError>) -> Self {
        SchemaFault::Callback {
            source: source.into(),
        }
    }
}

/// The error returned by [`Schema::parse`](crate::Schema::parse).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Fault(#[from] SchemaFault),
}

impl ParseError {
    /// The accumulated issues, if this is a data failure.
    pub fn issues(&self) -> Option<&ValidationError> {
        match self {
            ParseError::Invalid(errors) => Some(errors),
            ParseError::Fault(_) => None,
        }
    }

    pub fn fault(&self) -> Option<&SchemaFault> {
        match self {
            ParseError::Invalid(_) => None,
            ParseError::Fault(fault) => Some(fault),
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, ParseError::Fault(_))
    }
}
