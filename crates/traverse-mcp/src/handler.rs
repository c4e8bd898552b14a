//! Tool Handler
//!
//! Runs one tool call end to end: validate and dispatch, hand the action to
//! the executor, then fold the engine's result into a [`ToolResult`]. Nothing
//! that goes wrong inside a single call escapes this module.

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use traverse_core::value::arguments_from_json;
use traverse_core::{ActionOptions, ActionResult, Executor};

use crate::dispatch::{dispatch, Dispatch};
use crate::error::{CallError, InternalError};
use crate::options::OptionsBuilder;
use crate::protocol::ToolResult;

/// Handles `tools/call` requests against a shared executor
#[derive(Clone)]
pub struct ToolHandler {
    executor: Executor,
    options: OptionsBuilder,
}

impl ToolHandler {
    pub fn new(executor: Executor, options: OptionsBuilder) -> Self {
        Self { executor, options }
    }

    /// Handle a tool call
    pub async fn handle_tool(&self, name: &str, arguments: Option<Map<String, Value>>) -> ToolResult {
        debug!("arguments for {}: {:?}", name, arguments);
        let args = arguments_from_json(arguments.unwrap_or_default());

        match self.run(name, &args).await {
            Ok(result) => result,
            Err(CallError::Internal(e)) => {
                error!("internal error executing tool '{}': {}", name, e);
                ToolResult::error(format!("Internal error executing tool '{}': {}", name, e))
            }
            Err(e) => {
                warn!(code = e.code(), "rejected call to tool '{}': {}", name, e);
                ToolResult::error(format!(
                    "Error processing parameters for tool '{}': {}",
                    name, e
                ))
            }
        }
    }

    async fn run(&self, name: &str, args: &traverse_core::Arguments) -> Result<ToolResult, CallError> {
        let Dispatch { action, options } = dispatch(name, args, &self.options)?;

        let label = action.label();
        let result = self
            .executor
            .execute(action, options.clone())
            .await
            .map_err(InternalError::from)?;
        debug!("{} action completed", label);

        render(name, &result, &options)
    }
}

/// Serialize the result and compute the overall error flag
pub fn render(name: &str, result: &ActionResult, options: &ActionOptions) -> Result<ToolResult, CallError> {
    let text = result
        .to_canonical_json()
        .map_err(|e| InternalError::SerializationFailed(e.to_string()))?;

    let is_error = result.has_error(options);
    if is_error {
        warn!(
            "tool '{}' resulted in an error state (primary: {:?}, before: {:?}, after: {:?})",
            name,
            result.primary_action_error,
            result.traversal_before_error,
            result.traversal_after_error
        );
    } else {
        info!("tool '{}' completed", name);
    }

    Ok(ToolResult::new(text, is_error))
}
