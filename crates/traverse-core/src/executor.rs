//! Execution serializer
//!
//! The automation engine is a single resource that must not be driven
//! concurrently or from arbitrary threads. [`Executor`] owns it on one
//! dedicated OS thread and feeds it from one FIFO queue: at most one action is
//! in flight, in submission order. There is no timeout and no cancellation; a
//! submitted job always runs to completion even if its caller goes away.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::action::PrimaryAction;
use crate::engine::Engine;
use crate::options::ActionOptions;
use crate::result::ActionResult;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("automation engine thread has stopped")]
    Stopped,

    #[error("failed to start automation engine thread: {0}")]
    Spawn(String),
}

struct Job {
    action: PrimaryAction,
    options: ActionOptions,
    reply: oneshot::Sender<ActionResult>,
}

/// Handle to the engine thread. Cheap to clone; every clone feeds the same queue.
#[derive(Clone)]
pub struct Executor {
    tx: mpsc::UnboundedSender<Job>,
}

impl Executor {
    /// Start the engine thread. It exits once every handle is dropped.
    pub fn spawn(engine: Box<dyn Engine>) -> Result<Self, ExecutorError> {
        let (tx, rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("automation-engine".to_string())
            .spawn(move || run_engine(engine, rx))
            .map_err(|e| ExecutorError::Spawn(e.to_string()))?;

        Ok(Self { tx })
    }

    /// Queue an action and return the receiver for its result.
    ///
    /// Queue order is fixed when this returns, not when the receiver is polled.
    pub fn enqueue(
        &self,
        action: PrimaryAction,
        options: ActionOptions,
    ) -> Result<oneshot::Receiver<ActionResult>, ExecutorError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job {
                action,
                options,
                reply,
            })
            .map_err(|_| ExecutorError::Stopped)?;
        Ok(rx)
    }

    /// Queue an action and wait for the engine to finish it
    pub async fn execute(
        &self,
        action: PrimaryAction,
        options: ActionOptions,
    ) -> Result<ActionResult, ExecutorError> {
        let rx = self.enqueue(action, options)?;
        rx.await.map_err(|_| ExecutorError::Stopped)
    }
}

fn run_engine(mut engine: Box<dyn Engine>, mut rx: mpsc::UnboundedReceiver<Job>) {
    info!("Automation engine '{}' ready", engine.name());

    while let Some(job) = rx.blocking_recv() {
        debug!("Engine executing {} action", job.action.label());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            engine.execute(&job.action, &job.options)
        }));

        let result = outcome.unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("Engine panicked during {} action: {}", job.action.label(), message);
            ActionResult::primary_failure(format!("Engine panicked: {}", message))
        });

        if job.reply.send(result).is_err() {
            debug!("Caller went away before the {} action finished", job.action.label());
        }
    }

    info!("Automation engine '{}' stopped", engine.name());
}
