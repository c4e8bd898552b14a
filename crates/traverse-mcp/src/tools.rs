//! Tool Definitions
//!
//! Schemas advertised through `tools/list`. They describe the wire contract
//! only; validation happens in [`crate::dispatch`], whose table decides which
//! fields are required.

use serde_json::{json, Map, Value};

use crate::dispatch::{find_tool, CLICK_TOOL, OPEN_TOOL, PRESS_KEY_TOOL, REFRESH_TOOL, TYPE_TOOL};
use crate::protocol::{InputSchema, Tool};

/// Create a tool definition with the given name, description, and schema properties
fn tool(name: &str, description: &str, properties: Value) -> Tool {
    let mut props = properties.as_object().cloned().unwrap_or_default();
    props.extend(generic_overrides());

    let required = find_tool(name)
        .map(|spec| spec.required().into_iter().map(str::to_string).collect())
        .unwrap_or_default();

    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: InputSchema {
            schema_type: "object".to_string(),
            properties: props,
            required,
        },
    }
}

/// Optional execution overrides shared by every tool
fn generic_overrides() -> Map<String, Value> {
    let overrides = json!({
        "traverseBefore": {"type": "boolean", "description": "OPTIONAL. Traverse the accessibility tree before the action."},
        "traverseAfter": {"type": "boolean", "description": "OPTIONAL. Traverse the accessibility tree after the action."},
        "showDiff": {"type": "boolean", "description": "OPTIONAL. Report elements added/removed by the action (implies both traversals)."},
        "onlyVisibleElements": {"type": "boolean", "description": "OPTIONAL. Only report elements with a visible frame."},
        "showAnimation": {"type": "boolean", "description": "OPTIONAL. Show a visual indicator for the action."},
        "animationDuration": {"type": "number", "description": "OPTIONAL. Indicator duration in seconds."},
        "delayAfterAction": {"type": "number", "description": "OPTIONAL. Seconds to wait before the after-traversal."}
    });
    overrides.as_object().cloned().unwrap_or_default()
}

fn pid_property() -> Value {
    json!({"type": "number", "description": "REQUIRED. PID of the target application window."})
}

/// Get all available tools
pub fn all_tools() -> Vec<Tool> {
    vec![
        tool(
            OPEN_TOOL,
            "Opens/activates an application and then traverses its accessibility tree.",
            json!({
                "identifier": {"type": "string", "description": "REQUIRED. App name, path, or bundle ID."}
            }),
        ),
        tool(
            CLICK_TOOL,
            "Simulates a click at the given coordinates within the app specified by PID, then traverses its accessibility tree.",
            json!({
                "pid": pid_property(),
                "x": {"type": "number", "description": "REQUIRED. X coordinate for the click."},
                "y": {"type": "number", "description": "REQUIRED. Y coordinate for the click."}
            }),
        ),
        tool(
            TYPE_TOOL,
            "Simulates typing text into the app specified by PID, then traverses its accessibility tree.",
            json!({
                "pid": pid_property(),
                "text": {"type": "string", "description": "REQUIRED. Text to type."}
            }),
        ),
        tool(
            PRESS_KEY_TOOL,
            "Simulates pressing a specific key (like Return, Enter, Escape, Tab, Arrow Keys, regular characters) with optional modifiers, then traverses the accessibility tree.",
            json!({
                "pid": pid_property(),
                "keyName": {"type": "string", "description": "REQUIRED. Name of the key to press (e.g., 'Return', 'Escape', 'Tab', 'ArrowUp', 'a')."},
                "modifierFlags": {
                    "type": "array",
                    "description": "OPTIONAL. Modifier keys to hold (e.g., ['Command', 'Shift']). Valid: CapsLock, Shift, Control, Option, Command, Function, NumericPad, Help.",
                    "items": {"type": "string"}
                }
            }),
        ),
        tool(
            REFRESH_TOOL,
            "Traverses the accessibility tree of the application specified by PID.",
            json!({
                "pid": {"type": "number", "description": "REQUIRED. PID of the application to traverse."}
            }),
        ),
    ]
}
