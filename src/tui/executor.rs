//! Background task executor
//!
//! Long work runs on a blocking worker thread and writes lines into a
//! per-task ordered queue. A reader task drains the queue into the event loop
//! as [`Msg::TaskOutput`], and only once every writer handle is gone does it
//! collect the worker's result and send the terminal [`Msg::TaskDone`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::message::Msg;
use crate::error::{Result, StrataError};

/// Identity of one spawned task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// How a task ended, as the UI sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
    Cancelled,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Success => "success",
            TaskOutcome::Failed(_) => "failed",
            TaskOutcome::Cancelled => "cancelled",
        }
    }

    fn from_result(result: Result<()>) -> Self {
        match result {
            Ok(()) => TaskOutcome::Success,
            Err(e) if e.is_cancelled() => TaskOutcome::Cancelled,
            Err(e) => TaskOutcome::Failed(e.to_string()),
        }
    }
}

/// Work executed on a worker thread
pub type TaskFn = Box<dyn FnOnce(CancellationToken, TaskSink) -> Result<()> + Send + 'static>;

/// What a component asks the root controller to run
pub struct TaskRequest {
    pub title: String,
    pub subtitle: Option<String>,
    pub task: TaskFn,
    /// Close the output dialog on success without waiting for OK
    pub auto_exit: bool,
}

impl TaskRequest {
    pub fn new<F>(title: impl Into<String>, task: F) -> Self
    where
        F: FnOnce(CancellationToken, TaskSink) -> Result<()> + Send + 'static,
    {
        Self {
            title: title.into(),
            subtitle: None,
            task: Box::new(task),
            auto_exit: false,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn auto_exit(mut self, auto_exit: bool) -> Self {
        self.auto_exit = auto_exit;
        self
    }
}

impl fmt::Debug for TaskRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRequest")
            .field("title", &self.title)
            .field("subtitle", &self.subtitle)
            .field("auto_exit", &self.auto_exit)
            .finish_non_exhaustive()
    }
}

enum Chunk {
    Line(String),
    Confirm {
        title: String,
        question: String,
        default_yes: bool,
        reply: oneshot::Sender<bool>,
    },
}

/// Writer half of a task's output queue
///
/// Clones share the queue; it closes once the last clone is dropped.
#[derive(Clone)]
pub struct TaskSink {
    task: TaskId,
    queue: mpsc::UnboundedSender<Chunk>,
}

impl TaskSink {
    pub fn id(&self) -> TaskId {
        self.task
    }

    /// Append one output line. Embedded newlines split into several lines.
    pub fn line(&self, text: impl AsRef<str>) -> Result<()> {
        for line in text.as_ref().split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.queue
                .send(Chunk::Line(line.to_string()))
                .map_err(|_| StrataError::TaskCancelled)?;
        }
        Ok(())
    }

    /// Ask the user a yes/no question and block until they answer
    ///
    /// Must only be called from the worker thread. Lines written before the
    /// question are delivered before the dialog opens.
    pub fn confirm(&self, title: &str, question: &str, default_yes: bool) -> Result<bool> {
        let (reply, answer) = oneshot::channel();
        self.queue
            .send(Chunk::Confirm {
                title: title.to_string(),
                question: question.to_string(),
                default_yes,
                reply,
            })
            .map_err(|_| StrataError::TaskCancelled)?;
        answer.blocking_recv().map_err(|_| StrataError::TaskCancelled)
    }
}

impl fmt::Debug for TaskSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskSink({})", self.task)
    }
}

/// Handle kept by whoever displays the task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    pub id: TaskId,
    pub cancel: CancellationToken,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Spawns tasks and pipes their output into the event loop
#[derive(Debug)]
pub struct TaskExecutor {
    ui: mpsc::UnboundedSender<Msg>,
    next_id: AtomicU64,
    root: CancellationToken,
}

impl TaskExecutor {
    pub fn new(ui: mpsc::UnboundedSender<Msg>) -> Self {
        Self {
            ui,
            next_id: AtomicU64::new(1),
            root: CancellationToken::new(),
        }
    }

    /// Start `task` on a worker thread
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, task: TaskFn) -> TaskHandle {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cancel = self.root.child_token();
        let (queue, mut rx) = mpsc::unbounded_channel();
        let sink = TaskSink { task: id, queue };

        info!(task = %id, "Task started");
        let token = cancel.clone();
        let worker = tokio::task::spawn_blocking(move || task(token, sink));

        let ui = self.ui.clone();
        tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                let msg = match chunk {
                    Chunk::Line(line) => Msg::TaskOutput { task: id, line },
                    Chunk::Confirm {
                        title,
                        question,
                        default_yes,
                        reply,
                    } => Msg::ShowConfirm {
                        title,
                        question,
                        default_yes,
                        reply: Some(reply),
                    },
                };
                if ui.send(msg).is_err() {
                    debug!(task = %id, "Event loop gone, dropping task output");
                }
            }

            // queue closed: every writer handle is gone
            let outcome = match worker.await {
                Ok(result) => TaskOutcome::from_result(result),
                Err(e) if e.is_panic() => TaskOutcome::Failed("task panicked".to_string()),
                Err(_) => TaskOutcome::Cancelled,
            };
            match &outcome {
                TaskOutcome::Failed(reason) => warn!(task = %id, %reason, "Task failed"),
                other => info!(task = %id, outcome = other.label(), "Task finished"),
            }
            let _ = ui.send(Msg::TaskDone { task: id, outcome });
        });

        TaskHandle { id, cancel }
    }

    /// Signal every running task to stop
    pub fn cancel_all(&self) {
        self.root.cancel();
    }
}
