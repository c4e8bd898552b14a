//! Error taxonomy for tool call handling
//!
//! Every variant here is recoverable: the handler turns it into an error
//! [`ToolResult`](crate::protocol::ToolResult) and the serving loop carries on.
//! Engine failures are not errors at this layer; they travel inside the
//! `ActionResult`.

use thiserror::Error;
use traverse_core::{ExecutorError, InvalidOption};

use crate::protocol::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};

/// A tool argument failed validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Missing or invalid required {expected} argument: '{key}'")]
    MissingOrWrongType { key: String, expected: &'static str },

    #[error("Missing required '{key}' for {tool} tool")]
    MissingRequired { key: String, tool: String },

    #[error("Invalid type for argument '{key}': expected {expected}, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid value for integer argument '{key}': received non-exact number {value}")]
    NonExactInteger { key: String, value: f64 },

    #[error("Value {value} for argument '{key}' is out of range")]
    OutOfRange { key: String, value: i64 },

    #[error("Invalid option '{field}': {reason}")]
    InvalidOption { field: String, reason: String },
}

impl From<InvalidOption> for ParameterError {
    fn from(err: InvalidOption) -> Self {
        ParameterError::InvalidOption {
            field: err.field.to_string(),
            reason: err.reason,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("failed to serialize ActionResult to JSON: {0}")]
    SerializationFailed(String),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Anything that stops a tool call before a result can be rendered
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CallError {
    /// JSON-RPC error code matching this failure class
    pub fn code(&self) -> i32 {
        match self {
            CallError::Parameter(_) => INVALID_PARAMS,
            CallError::Dispatch(_) => METHOD_NOT_FOUND,
            CallError::Internal(_) => INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_by_class() {
        let param: CallError = ParameterError::MissingRequired {
            key: "pid".to_string(),
            tool: "click-and-traverse".to_string(),
        }
        .into();
        assert_eq!(param.code(), INVALID_PARAMS);

        let dispatch: CallError = DispatchError::UnknownTool("nope".to_string()).into();
        assert_eq!(dispatch.code(), METHOD_NOT_FOUND);

        let internal: CallError = InternalError::from(ExecutorError::Stopped).into();
        assert_eq!(internal.code(), INTERNAL_ERROR);
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = ParameterError::MissingOrWrongType {
            key: "identifier".to_string(),
            expected: "string",
        };
        assert!(err.to_string().contains("'identifier'"));

        let err = ParameterError::OutOfRange {
            key: "pid".to_string(),
            value: 1 << 40,
        };
        assert!(err.to_string().contains(&(1i64 << 40).to_string()));
    }
}
