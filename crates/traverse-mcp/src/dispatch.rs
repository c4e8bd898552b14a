//! Action dispatch
//!
//! Maps a tool name and its arguments to exactly one [`PrimaryAction`] plus the
//! [`ActionOptions`] it runs with. The tool table is the single source of truth
//! for which fields each tool requires.

use tracing::debug;
use traverse_core::{ActionOptions, Arguments, PrimaryAction};

use crate::args::{modifier_flags, optional_pid, required};
use crate::error::{CallError, DispatchError, ParameterError};
use crate::options::OptionsBuilder;

pub const OPEN_TOOL: &str = "open-and-traverse";
pub const CLICK_TOOL: &str = "click-and-traverse";
pub const TYPE_TOOL: &str = "type-and-traverse";
pub const PRESS_KEY_TOOL: &str = "press-key-and-traverse";
pub const REFRESH_TOOL: &str = "refresh-traversal";

/// One row of the dispatch table
pub struct ToolSpec {
    pub name: &'static str,
    /// Whether the call must name a target process via `pid`
    pub requires_pid: bool,
    /// Tool-specific required fields, excluding `pid`
    pub required_fields: &'static [&'static str],
    build: fn(&Arguments) -> Result<PrimaryAction, ParameterError>,
}

impl ToolSpec {
    /// Every required field, `pid` first
    pub fn required(&self) -> Vec<&'static str> {
        let pid = self.requires_pid.then_some("pid");
        pid.into_iter()
            .chain(self.required_fields.iter().copied())
            .collect()
    }
}

fn build_open(args: &Arguments) -> Result<PrimaryAction, ParameterError> {
    Ok(PrimaryAction::Open {
        identifier: required(args, "identifier")?,
    })
}

fn build_click(args: &Arguments) -> Result<PrimaryAction, ParameterError> {
    let x = required(args, "x")?;
    let y = required(args, "y")?;
    Ok(PrimaryAction::click(x, y))
}

fn build_type(args: &Arguments) -> Result<PrimaryAction, ParameterError> {
    Ok(PrimaryAction::type_text(required::<String>(args, "text")?))
}

fn build_press(args: &Arguments) -> Result<PrimaryAction, ParameterError> {
    let key_name: String = required(args, "keyName")?;
    let flags = modifier_flags(args.get("modifierFlags"))?;
    debug!("parsed modifierFlags: {:?}", flags);
    Ok(PrimaryAction::press(key_name, flags))
}

fn build_refresh(_args: &Arguments) -> Result<PrimaryAction, ParameterError> {
    Ok(PrimaryAction::TraverseOnly)
}

/// The dispatch table
pub const TOOLS: &[ToolSpec] = &[
    // The engine resolves the pid itself when opening
    ToolSpec {
        name: OPEN_TOOL,
        requires_pid: false,
        required_fields: &["identifier"],
        build: build_open,
    },
    ToolSpec {
        name: CLICK_TOOL,
        requires_pid: true,
        required_fields: &["x", "y"],
        build: build_click,
    },
    ToolSpec {
        name: TYPE_TOOL,
        requires_pid: true,
        required_fields: &["text"],
        build: build_type,
    },
    ToolSpec {
        name: PRESS_KEY_TOOL,
        requires_pid: true,
        required_fields: &["keyName"],
        build: build_press,
    },
    ToolSpec {
        name: REFRESH_TOOL,
        requires_pid: true,
        required_fields: &[],
        build: build_refresh,
    },
];

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

/// A validated call, ready for the executor
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub action: PrimaryAction,
    pub options: ActionOptions,
}

/// Resolve a tool call.
///
/// Error order is fixed: unknown tool, then `pid`, then tool fields, then
/// generic overrides.
pub fn dispatch(
    name: &str,
    args: &Arguments,
    builder: &OptionsBuilder,
) -> Result<Dispatch, CallError> {
    let tool = find_tool(name).ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

    let pid = optional_pid(args, "pid")?;
    if tool.requires_pid && pid.is_none() {
        return Err(ParameterError::MissingRequired {
            key: "pid".to_string(),
            tool: tool.name.to_string(),
        }
        .into());
    }

    let action = (tool.build)(args)?;
    let mut options = builder.build(args, pid)?;

    // The tool's own pid is authoritative for the traversal target
    if tool.requires_pid {
        options.pid_for_traversal = pid;
    }

    debug!("constructed PrimaryAction: {:?}", action);
    debug!("constructed ActionOptions: {:?}", options);

    Ok(Dispatch { action, options })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use traverse_core::value::arguments_from_json;
    use traverse_core::ModifierFlags;

    fn call(name: &str, args: serde_json::Value) -> Result<Dispatch, CallError> {
        let args = arguments_from_json(args.as_object().cloned().unwrap_or_default());
        dispatch(name, &args, &OptionsBuilder::default())
    }

    #[test]
    fn test_click_with_defaults() {
        let d = call(CLICK_TOOL, json!({"pid": 501, "x": 10.5, "y": 20})).unwrap();
        assert_eq!(d.action, PrimaryAction::click(10.5, 20.0));
        assert_eq!(d.options.pid_for_traversal, Some(501));
        assert!(!d.options.traverse_before);
        assert!(!d.options.traverse_after);
    }

    #[test]
    fn test_press_skips_unknown_modifier() {
        let d = call(
            PRESS_KEY_TOOL,
            json!({"pid": 501, "keyName": "a", "modifierFlags": ["cmd", "bogus"]}),
        )
        .unwrap();
        assert_eq!(d.action, PrimaryAction::press("a", ModifierFlags::COMMAND));
    }

    #[test]
    fn test_press_rejects_non_string_modifier() {
        let err = call(
            PRESS_KEY_TOOL,
            json!({"pid": 501, "keyName": "a", "modifierFlags": ["cmd", 4]}),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CallError::Parameter(ParameterError::WrongType { .. })
        ));
    }

    #[test]
    fn test_pid_tools_require_pid() {
        for tool in TOOLS.iter().filter(|t| t.requires_pid) {
            let err = call(tool.name, json!({})).unwrap_err();
            assert_eq!(
                err,
                CallError::Parameter(ParameterError::MissingRequired {
                    key: "pid".to_string(),
                    tool: tool.name.to_string(),
                })
            );
            assert!(err.to_string().contains("pid"));
        }
    }

    #[test]
    fn test_pid_checked_before_tool_fields() {
        // x and y are missing too, but pid is reported
        let err = call(CLICK_TOOL, json!({"text": 1})).unwrap_err();
        assert!(err.to_string().contains("'pid'"));
    }

    #[test]
    fn test_open_without_identifier() {
        let err = call(OPEN_TOOL, json!({})).unwrap_err();
        assert!(err.to_string().contains("identifier"));
    }

    #[test]
    fn test_open_without_pid_leaves_target_to_engine() {
        let d = call(OPEN_TOOL, json!({"identifier": "Calculator", "traverseAfter": true})).unwrap();
        assert_eq!(
            d.action,
            PrimaryAction::Open {
                identifier: "Calculator".to_string()
            }
        );
        assert_eq!(d.options.pid_for_traversal, None);
        assert!(d.options.traverse_after);
    }

    #[test]
    fn test_exact_float_pid_equals_int_pid() {
        let a = call(REFRESH_TOOL, json!({"pid": 501.0})).unwrap();
        let b = call(REFRESH_TOOL, json!({"pid": 501})).unwrap();
        assert_eq!(a, b);

        let err = call(REFRESH_TOOL, json!({"pid": 501.5})).unwrap_err();
        assert!(matches!(
            err,
            CallError::Parameter(ParameterError::NonExactInteger { .. })
        ));
    }

    #[test]
    fn test_null_pid_is_absent() {
        let err = call(TYPE_TOOL, json!({"pid": null, "text": "hi"})).unwrap_err();
        assert!(matches!(
            err,
            CallError::Parameter(ParameterError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_out_of_range_pid() {
        let err = call(REFRESH_TOOL, json!({"pid": 4294967296i64})).unwrap_err();
        assert!(matches!(
            err,
            CallError::Parameter(ParameterError::OutOfRange { value: 4294967296, .. })
        ));
    }

    #[test]
    fn test_unknown_tool_checked_first() {
        let err = call("delete-everything", json!({"pid": "nope"})).unwrap_err();
        assert_eq!(
            err,
            CallError::Dispatch(DispatchError::UnknownTool("delete-everything".to_string()))
        );
    }

    #[test]
    fn test_type_and_refresh() {
        let d = call(TYPE_TOOL, json!({"pid": 3, "text": "hello"})).unwrap();
        assert_eq!(d.action, PrimaryAction::type_text("hello"));

        let d = call(REFRESH_TOOL, json!({"pid": 3})).unwrap();
        assert_eq!(d.action, PrimaryAction::TraverseOnly);
        assert_eq!(d.options.pid_for_traversal, Some(3));
    }

    #[test]
    fn test_required_lists() {
        assert_eq!(find_tool(CLICK_TOOL).unwrap().required(), vec!["pid", "x", "y"]);
        assert_eq!(find_tool(OPEN_TOOL).unwrap().required(), vec!["identifier"]);
        assert_eq!(find_tool(REFRESH_TOOL).unwrap().required(), vec!["pid"]);
    }
}
