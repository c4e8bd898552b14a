use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};
use traverse_core::{
    ActionOptions, ActionResult, Engine, Executor, ModifierFlags, PrimaryAction,
};
use traverse_mcp::options::OptionsBuilder;
use traverse_mcp::ToolHandler;

type Calls = Arc<Mutex<Vec<(PrimaryAction, ActionOptions)>>>;

/// Records every action and answers with a canned result
struct RecordingEngine {
    calls: Calls,
    reply: ActionResult,
}

impl Engine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn execute(&mut self, action: &PrimaryAction, options: &ActionOptions) -> ActionResult {
        self.calls
            .lock()
            .unwrap()
            .push((action.clone(), options.clone()));
        self.reply.clone()
    }
}

fn setup(reply: ActionResult) -> (ToolHandler, Calls) {
    let calls = Calls::default();
    let executor = Executor::spawn(Box::new(RecordingEngine {
        calls: calls.clone(),
        reply,
    }))
    .unwrap();
    (ToolHandler::new(executor, OptionsBuilder::default()), calls)
}

fn object(value: Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

#[tokio::test]
async fn click_runs_one_action_without_traversal() {
    let (handler, calls) = setup(ActionResult::default());

    let result = handler
        .handle_tool("click-and-traverse", object(json!({"pid": 501, "x": 10.5, "y": 20})))
        .await;
    assert!(!result.is_error);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (action, options) = &calls[0];
    assert_eq!(*action, PrimaryAction::click(10.5, 20.0));
    assert_eq!(options.pid_for_traversal, Some(501));
    assert!(!options.traverse_before);
    assert!(!options.traverse_after);
}

#[tokio::test]
async fn press_key_ignores_unknown_modifier() {
    let (handler, calls) = setup(ActionResult::default());

    let result = handler
        .handle_tool(
            "press-key-and-traverse",
            object(json!({"pid": 501, "keyName": "a", "modifierFlags": ["cmd", "bogus"]})),
        )
        .await;
    assert!(!result.is_error);

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].0, PrimaryAction::press("a", ModifierFlags::COMMAND));
}

#[tokio::test]
async fn open_without_identifier_never_reaches_engine() {
    let (handler, calls) = setup(ActionResult::default());

    let result = handler.handle_tool("open-and-traverse", object(json!({}))).await;
    assert!(result.is_error);
    assert!(result.text().contains("identifier"));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_pid_is_reported_for_every_pid_tool() {
    let (handler, calls) = setup(ActionResult::default());

    for tool in [
        "click-and-traverse",
        "type-and-traverse",
        "press-key-and-traverse",
        "refresh-traversal",
    ] {
        let result = handler
            .handle_tool(tool, object(json!({"x": 1, "y": 2, "text": "t", "keyName": "a"})))
            .await;
        assert!(result.is_error, "{} accepted a call without pid", tool);
        assert!(result.text().contains("pid"));
    }
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn engine_errors_fold_into_flag() {
    let reply = ActionResult {
        traversal_after_error: Some("window vanished".to_string()),
        ..Default::default()
    };
    let (handler, _) = setup(reply);

    let quiet = handler
        .handle_tool("refresh-traversal", object(json!({"pid": 3})))
        .await;
    assert!(!quiet.is_error);

    let loud = handler
        .handle_tool(
            "refresh-traversal",
            object(json!({"pid": 3, "traverseAfter": true})),
        )
        .await;
    assert!(loud.is_error);
    assert!(loud.text().contains("window vanished"));
}

#[tokio::test]
async fn identical_results_render_identically() {
    let reply = ActionResult {
        traversal_pid: Some(3),
        primary_action_error: Some("path /Applications/X.app not found".to_string()),
        ..Default::default()
    };
    let (handler, _) = setup(reply);

    let first = handler
        .handle_tool("refresh-traversal", object(json!({"pid": 3})))
        .await;
    let second = handler
        .handle_tool("refresh-traversal", object(json!({"pid": 3.0})))
        .await;
    assert_eq!(first, second);
    assert!(first.text().contains("/Applications/X.app"));
}

#[tokio::test]
async fn concurrent_calls_reach_engine_once_each() {
    let (handler, calls) = setup(ActionResult::default());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle_tool(
                        "type-and-traverse",
                        object(json!({"pid": 1, "text": i.to_string()})),
                    )
                    .await
            })
        })
        .collect();
    for task in tasks {
        assert!(!task.await.unwrap().is_error);
    }

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 16);
    for i in 0..16 {
        let expected = PrimaryAction::type_text(i.to_string());
        assert_eq!(calls.iter().filter(|(a, _)| *a == expected).count(), 1);
    }
}
