//! Messages processed by the event loop
//!
//! Everything that changes UI state arrives as a [`Msg`]: terminal input,
//! structural requests from components, and output from background tasks.

use crossterm::event::MouseButton;
use tokio::sync::oneshot;

use super::component::Component;
use super::executor::{TaskId, TaskOutcome, TaskRequest};
use super::focus::HeaderSlot;
use super::keymap::Action;
use crate::config::StrataConfig;
use crate::style::Theme;

/// Value a dialog hands back when it closes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogResult {
    #[default]
    None,
    Bool(bool),
    Choice(String),
}

impl DialogResult {
    /// Confirmation answer; anything but an explicit yes is no
    pub fn as_bool(&self) -> bool {
        matches!(self, DialogResult::Bool(true))
    }
}

/// Message dialog flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Success => "Success",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

pub enum Msg {
    // ─────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────
    Key(Action),
    /// Click resolved to a hit identity
    LayerHit { id: String, button: MouseButton },
    /// Wheel over a hit identity
    LayerWheel { id: String, up: bool },
    /// Focus a named panel inside the active component
    FocusPanel(String),
    /// Activate whatever element currently has focus
    ToggleFocused,
    Resize { width: u16, height: u16 },
    Tick,

    // ─────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────
    Navigate(Box<dyn Component>),
    NavigateBack,
    /// Pop the current screen and raise a dialog in one step
    FinalizeSelection(Box<dyn Component>),

    // ─────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────
    ShowDialog(Box<dyn Component>),
    ShowConfirm {
        title: String,
        question: String,
        default_yes: bool,
        reply: Option<oneshot::Sender<bool>>,
    },
    ShowMessage {
        title: String,
        message: String,
        kind: MessageKind,
    },
    CloseDialog(DialogResult),
    ShowHelp,

    // ─────────────────────────────────────────────────────────────────────
    // Chrome
    // ─────────────────────────────────────────────────────────────────────
    UpdateHeader {
        slot: HeaderSlot,
        version: String,
        update_available: bool,
    },
    HeaderFlags(Vec<String>),
    /// Enter on a focused header slot
    HeaderAction(HeaderSlot),
    ToggleLogPanel,
    LogLine(String),
    ConfigChanged(StrataConfig),
    ThemeChanged(Theme),

    // ─────────────────────────────────────────────────────────────────────
    // Background tasks
    // ─────────────────────────────────────────────────────────────────────
    /// Spawn a task and show its output in a program box
    RunTask(TaskRequest),
    TaskOutput { task: TaskId, line: String },
    TaskDone { task: TaskId, outcome: TaskOutcome },

    Quit,
    ForceQuit,
}

impl Msg {
    /// Short name for tracing
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Key(_) => "key",
            Msg::LayerHit { .. } => "layer_hit",
            Msg::LayerWheel { .. } => "layer_wheel",
            Msg::FocusPanel(_) => "focus_panel",
            Msg::ToggleFocused => "toggle_focused",
            Msg::Resize { .. } => "resize",
            Msg::Tick => "tick",
            Msg::Navigate(_) => "navigate",
            Msg::NavigateBack => "navigate_back",
            Msg::FinalizeSelection(_) => "finalize_selection",
            Msg::ShowDialog(_) => "show_dialog",
            Msg::ShowConfirm { .. } => "show_confirm",
            Msg::ShowMessage { .. } => "show_message",
            Msg::CloseDialog(_) => "close_dialog",
            Msg::ShowHelp => "show_help",
            Msg::UpdateHeader { .. } => "update_header",
            Msg::HeaderFlags(_) => "header_flags",
            Msg::HeaderAction(_) => "header_action",
            Msg::ToggleLogPanel => "toggle_log",
            Msg::LogLine(_) => "log_line",
            Msg::ConfigChanged(_) => "config_changed",
            Msg::ThemeChanged(_) => "theme_changed",
            Msg::RunTask(_) => "run_task",
            Msg::TaskOutput { .. } => "task_output",
            Msg::TaskDone { .. } => "task_done",
            Msg::Quit => "quit",
            Msg::ForceQuit => "force_quit",
        }
    }
}

impl std::fmt::Debug for Msg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Msg::Key(action) => write!(f, "Key({action:?})"),
            Msg::LayerHit { id, button } => write!(f, "LayerHit({id}, {button:?})"),
            Msg::LayerWheel { id, up } => write!(f, "LayerWheel({id}, up={up})"),
            Msg::TaskOutput { task, line } => write!(f, "TaskOutput({task}, {line:?})"),
            Msg::TaskDone { task, outcome } => write!(f, "TaskDone({task}, {outcome:?})"),
            Msg::RunTask(request) => write!(f, "RunTask({:?})", request.title),
            Msg::CloseDialog(result) => write!(f, "CloseDialog({result:?})"),
            other => f.write_str(other.kind()),
        }
    }
}

/// Messages a component emits while handling one message
///
/// The loop drains the outbox after the current message is fully processed,
/// so emitted messages never interleave with the step that produced them.
#[derive(Debug, Default)]
pub struct Outbox {
    msgs: Vec<Msg>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, msg: Msg) {
        self.msgs.push(msg);
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Msg> {
        self.msgs.drain(..)
    }
}
