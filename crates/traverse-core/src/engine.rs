//! Automation engines
//!
//! An [`Engine`] performs one action plus whatever traversal the options ask
//! for. Engines are synchronous and are only ever driven from the executor's
//! dedicated thread, so an implementation may hold thread-affine handles.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::action::PrimaryAction;
use crate::options::ActionOptions;
use crate::result::{ActionResult, OpenResult, Snapshot};

/// Performs automation actions against the target system
pub trait Engine: Send {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Run the action and the requested traversal phases.
    ///
    /// Failures are reported inside the returned result, per phase.
    fn execute(&mut self, action: &PrimaryAction, options: &ActionOptions) -> ActionResult;
}

/// Request written to an out-of-process engine's stdin
#[derive(Debug, Serialize)]
struct EngineRequest<'a> {
    action: &'a PrimaryAction,
    options: &'a ActionOptions,
}

/// Delegates every action to an external helper program.
///
/// The helper receives `{"action": .., "options": ..}` as JSON on stdin and
/// must print an `ActionResult` as JSON on stdout.
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn run(&self, action: &PrimaryAction, options: &ActionOptions) -> Result<ActionResult, String> {
        let request = serde_json::to_vec(&EngineRequest { action, options })
            .map_err(|e| format!("Failed to encode engine request: {}", e))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("Failed to start engine {:?}: {}", self.program, e))?;

        // Stdin is fed from a scoped thread while stdout drains
        let stdin = child.stdin.take();
        let request = &request;
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(request),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.map_err(|e| format!("Failed to wait for engine: {}", e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("engine stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            return Err(format!(
                "Engine exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ));
        }

        match written {
            Ok(Ok(())) => {}
            // The helper may answer without consuming the whole request
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("engine closed stdin early: {}", e);
            }
            Ok(Err(e)) => return Err(format!("Failed to write engine request: {}", e)),
            Err(_) => return Err("Engine request writer panicked".to_string()),
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| format!("Failed to parse engine output: {}", e))
    }
}

impl Engine for CommandEngine {
    fn name(&self) -> &str {
        "command"
    }

    fn execute(&mut self, action: &PrimaryAction, options: &ActionOptions) -> ActionResult {
        debug!("Running engine {:?} for {}", self.program, action.label());
        self.run(action, options)
            .unwrap_or_else(ActionResult::primary_failure)
    }
}

/// Performs nothing and reports success.
///
/// Stands in when no helper program is configured, so clients can be developed
/// against the server without touching a live desktop.
#[derive(Debug, Default)]
pub struct DryRunEngine;

impl DryRunEngine {
    fn snapshot(app_name: &str, started: Instant) -> Snapshot {
        Snapshot {
            app_name: app_name.to_string(),
            elements: Vec::new(),
            stats: Default::default(),
            processing_time_seconds: started.elapsed().as_secs_f64(),
        }
    }
}

impl Engine for DryRunEngine {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn execute(&mut self, action: &PrimaryAction, options: &ActionOptions) -> ActionResult {
        warn!("dry-run: skipping {} action", action.label());
        let started = Instant::now();

        let app_name = match action {
            PrimaryAction::Open { identifier } => identifier.clone(),
            _ => String::new(),
        };
        let pid = options.pid_for_traversal.unwrap_or(0);

        let mut result = ActionResult {
            traversal_pid: Some(pid),
            ..Default::default()
        };

        if let PrimaryAction::Open { identifier } = action {
            result.open_result = Some(OpenResult {
                pid,
                app_name: identifier.clone(),
                processing_time_seconds: 0.0,
            });
        }
        if options.traverse_before {
            result.traversal_before = Some(Self::snapshot(&app_name, started));
        }
        if options.traverse_after || matches!(action, PrimaryAction::TraverseOnly) {
            result.traversal_after = Some(Self::snapshot(&app_name, started));
        }
        if options.show_diff {
            result.traversal_diff = Some(Default::default());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_reports_requested_phases() {
        let mut engine = DryRunEngine;
        let options = ActionOptions {
            pid_for_traversal: Some(42),
            traverse_before: true,
            ..Default::default()
        };
        let result = engine.execute(&PrimaryAction::click(1.0, 2.0), &options);

        assert_eq!(result.traversal_pid, Some(42));
        assert!(result.traversal_before.is_some());
        assert!(result.traversal_after.is_none());
        assert!(!result.has_error(&options));
    }

    #[test]
    fn test_dry_run_open_records_identifier() {
        let mut engine = DryRunEngine;
        let result = engine.execute(
            &PrimaryAction::Open {
                identifier: "Safari".to_string(),
            },
            &ActionOptions::default(),
        );
        assert_eq!(result.open_result.unwrap().app_name, "Safari");
    }

    #[test]
    fn test_missing_program_is_a_primary_error() {
        let mut engine = CommandEngine::new("/nonexistent/traverse-engine", Vec::new());
        let result = engine.execute(&PrimaryAction::TraverseOnly, &ActionOptions::default());
        let err = result.primary_action_error.unwrap();
        assert!(err.contains("Failed to start engine"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_parses_stdout() {
        let mut engine = CommandEngine::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"cat >/dev/null; printf '{"traversalPid": 7}'"#.to_string(),
            ],
        );
        let result = engine.execute(&PrimaryAction::TraverseOnly, &ActionOptions::default());
        assert_eq!(result.traversal_pid, Some(7));
        assert!(result.primary_action_error.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_nonzero_exit() {
        let mut engine = CommandEngine::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo nope >&2; exit 3".to_string()],
        );
        let result = engine.execute(&PrimaryAction::TraverseOnly, &ActionOptions::default());
        let err = result.primary_action_error.unwrap();
        assert!(err.contains("code 3"));
        assert!(err.contains("nope"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_exit_before_reading_request() {
        let mut engine = CommandEngine::new(
            "sh",
            vec![
                "-c".to_string(),
                "echo 'unsupported platform' >&2; exit 2".to_string(),
            ],
        );
        let action = PrimaryAction::type_text("x".repeat(1 << 20));
        let result = engine.execute(&action, &ActionOptions::default());
        let err = result.primary_action_error.unwrap();
        assert!(err.contains("code 2"), "{}", err);
        assert!(err.contains("unsupported platform"), "{}", err);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_large_request_and_reply() {
        let mut engine = CommandEngine::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"cat >/dev/null; printf '{"traversalPid": 9}'"#.to_string(),
            ],
        );
        let action = PrimaryAction::type_text("y".repeat(1 << 20));
        let result = engine.execute(&action, &ActionOptions::default());
        assert!(result.primary_action_error.is_none());
        assert_eq!(result.traversal_pid, Some(9));
    }
}
