//! Program box
//!
//! Streams a background task's output. The OK button stays disabled until
//! the task reports done; Esc before then cancels the task.

use ratatui::text::{Line, Span};

use super::frame::{ButtonRow, DialogFrame};
use super::scroll::Viewport;
use super::utils::{fit, truncate};
use crate::style::ansi::parse_ansi;
use crate::tui::compositor::Layer;
use crate::tui::component::{Component, Focusable, HelpText, Resizable};
use crate::tui::context::RenderContext;
use crate::tui::executor::{TaskHandle, TaskOutcome};
use crate::tui::focus::InteractionTarget;
use crate::tui::keymap::Action;
use crate::tui::layout::{Placement, BUTTON_HEIGHT, DIALOG_BORDER};
use crate::tui::message::{DialogResult, MessageKind, Msg, Outbox};

pub struct ProgramBox {
    title: String,
    subtitle: Option<String>,
    handle: TaskHandle,
    auto_exit: bool,
    lines: Vec<String>,
    viewport: Viewport,
    outcome: Option<TaskOutcome>,
    focused: bool,
    bounds: (u16, u16),
}

impl ProgramBox {
    pub fn new(title: impl Into<String>, handle: TaskHandle) -> Self {
        let mut viewport = Viewport::new(true);
        viewport.set_height(1);
        Self {
            title: title.into(),
            subtitle: None,
            handle,
            auto_exit: false,
            lines: Vec::new(),
            viewport,
            outcome: None,
            focused: true,
            bounds: (80, 24),
        }
    }

    pub fn subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle;
        self
    }

    /// Close without waiting for OK when the task succeeds
    pub fn auto_exit(mut self, auto_exit: bool) -> Self {
        self.auto_exit = auto_exit;
        self
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&TaskOutcome> {
        self.outcome.as_ref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn subtitle_rows(&self) -> u16 {
        u16::from(self.subtitle.is_some())
    }

    fn output_rows(&self) -> u16 {
        self.bounds
            .1
            .saturating_sub(DIALOG_BORDER + BUTTON_HEIGHT + self.subtitle_rows())
            .max(1)
    }

    fn close(&self, out: &mut Outbox) {
        let ok = self.outcome.as_ref().is_some_and(TaskOutcome::is_success);
        out.send(Msg::CloseDialog(DialogResult::Bool(ok)));
    }

    fn on_done(&mut self, outcome: &TaskOutcome, out: &mut Outbox) {
        self.outcome = Some(outcome.clone());
        match outcome {
            TaskOutcome::Success if self.auto_exit => self.close(out),
            TaskOutcome::Failed(reason) => out.send(Msg::ShowMessage {
                title: "Error".to_string(),
                message: reason.clone(),
                kind: MessageKind::Error,
            }),
            _ => {}
        }
    }

    fn on_key(&mut self, action: Action, out: &mut Outbox) {
        match action {
            Action::Up => self.viewport.scroll_up(1),
            Action::Down => self.viewport.scroll_down(1),
            Action::PageUp => self.viewport.page_up(),
            Action::PageDown => self.viewport.page_down(),
            Action::HalfPageUp => self.viewport.half_page_up(),
            Action::HalfPageDown => self.viewport.half_page_down(),
            Action::Home => self.viewport.top(),
            Action::End => self.viewport.bottom(),
            Action::Esc if !self.is_done() => {
                tracing::info!(task = %self.handle.id, "Cancel requested");
                self.handle.cancel();
            }
            Action::Esc | Action::Enter | Action::Space | Action::Char('o' | 'O') if self.is_done() => {
                self.close(out)
            }
            _ => {}
        }
    }
}

impl Component for ProgramBox {
    fn name(&self) -> &str {
        "program_box"
    }

    fn update(&mut self, msg: &Msg, out: &mut Outbox) {
        match msg {
            Msg::TaskOutput { task, line } if *task == self.handle.id => {
                self.lines.push(line.clone());
                self.viewport.set_total(self.lines.len());
            }
            Msg::TaskDone { task, outcome } if *task == self.handle.id => self.on_done(outcome, out),
            Msg::Key(action) => self.on_key(*action, out),
            Msg::LayerWheel { up, .. } => self.viewport.wheel(*up),
            Msg::LayerHit { id, .. } => {
                if self.is_done() && InteractionTarget::resolve(id).is_button() {
                    self.close(out);
                }
            }
            Msg::ToggleFocused if self.is_done() => self.close(out),
            _ => {}
        }
    }

    fn view(&self, ctx: &RenderContext) -> Layer {
        let styles = &ctx.styles;
        let (w, h) = self.bounds;
        let inner_w = usize::from(w.saturating_sub(2));

        let mut body = Vec::new();
        if let Some(subtitle) = &self.subtitle {
            body.push(fit(&ctx.line(subtitle, styles.title), inner_w, styles.program_box));
        }
        let visible = self.viewport.visible();
        let shown = visible.len();
        for line in &self.lines[visible] {
            let parsed = parse_ansi(line, styles.program_box);
            body.push(fit(&truncate(&parsed, inner_w), inner_w, styles.program_box));
        }
        for _ in shown..usize::from(self.output_rows()) {
            body.push(Line::from(Span::styled(" ".repeat(inner_w), styles.program_box)));
        }

        let buttons = ButtonRow::new(&["OK"])
            .active(Some(0))
            .enabled(0, self.is_done());
        DialogFrame::new(self.title.clone(), styles.title)
            .body(body)
            .buttons(buttons)
            .footer(format!(" {}% ", self.viewport.percent()))
            .focused(self.focused)
            .size(w, h)
            .layer(ctx, self.name(), w, h)
    }

    fn help(&self) -> Option<&dyn HelpText> {
        Some(self)
    }

    fn resizable(&mut self) -> Option<&mut dyn Resizable> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn placement(&self) -> Placement {
        Placement::Maximized
    }
}

impl HelpText for ProgramBox {
    fn help_text(&self) -> String {
        match &self.outcome {
            Some(_) => "Task finished. Press OK to continue.".to_string(),
            None if self.handle.is_cancelled() => "Cancelling...".to_string(),
            None => format!("Running {}... Esc to cancel", self.title),
        }
    }
}

impl Resizable for ProgramBox {
    fn set_size(&mut self, width: u16, height: u16) {
        self.bounds = (width, height);
        self.viewport.set_height(usize::from(self.output_rows()));
    }
}

impl Focusable for ProgramBox {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::compositor::{grid_rows, Compositor};
    use crate::tui::executor::TaskId;
    use tokio_util::sync::CancellationToken;

    fn program_box() -> ProgramBox {
        let handle = TaskHandle {
            id: TaskId(7),
            cancel: CancellationToken::new(),
        };
        let mut pb = ProgramBox::new("Build", handle);
        pb.set_size(40, 12);
        pb
    }

    fn output(pb: &mut ProgramBox, task: u64, line: &str) {
        let mut out = Outbox::new();
        pb.update(
            &Msg::TaskOutput {
                task: TaskId(task),
                line: line.to_string(),
            },
            &mut out,
        );
    }

    fn done(pb: &mut ProgramBox, outcome: TaskOutcome) -> Vec<Msg> {
        let mut out = Outbox::new();
        pb.update(&Msg::TaskDone { task: TaskId(7), outcome }, &mut out);
        out.drain().collect()
    }

    fn key(pb: &mut ProgramBox, action: Action) -> Vec<Msg> {
        let mut out = Outbox::new();
        pb.update(&Msg::Key(action), &mut out);
        out.drain().collect()
    }

    #[test]
    fn test_only_own_task_output_is_kept() {
        let mut pb = program_box();
        output(&mut pb, 7, "mine");
        output(&mut pb, 8, "other");
        assert_eq!(pb.lines(), &["mine".to_string()]);
    }

    #[test]
    fn test_ok_waits_for_done() {
        let mut pb = program_box();
        assert!(key(&mut pb, Action::Enter).is_empty());
        assert!(pb.help_text().starts_with("Running"));
        assert!(done(&mut pb, TaskOutcome::Success).is_empty());
        assert_eq!(pb.help_text(), "Task finished. Press OK to continue.");
        let msgs = key(&mut pb, Action::Enter);
        assert!(matches!(msgs.as_slice(), [Msg::CloseDialog(DialogResult::Bool(true))]));
    }

    #[test]
    fn test_esc_cancels_running_task() {
        let mut pb = program_box();
        assert!(key(&mut pb, Action::Esc).is_empty());
        assert!(pb.handle.is_cancelled());
        assert_eq!(pb.help_text(), "Cancelling...");
        done(&mut pb, TaskOutcome::Cancelled);
        assert!(matches!(
            key(&mut pb, Action::Esc).as_slice(),
            [Msg::CloseDialog(DialogResult::Bool(false))]
        ));
    }

    #[test]
    fn test_failure_raises_error_box() {
        let mut pb = program_box();
        let msgs = done(&mut pb, TaskOutcome::Failed("exit 2".to_string()));
        assert!(matches!(
            msgs.as_slice(),
            [Msg::ShowMessage { kind: MessageKind::Error, .. }]
        ));
    }

    #[test]
    fn test_auto_exit_on_success() {
        let mut pb = program_box().auto_exit(true);
        let msgs = done(&mut pb, TaskOutcome::Success);
        assert!(matches!(msgs.as_slice(), [Msg::CloseDialog(DialogResult::Bool(true))]));
    }

    #[test]
    fn test_follows_output_and_truncates() {
        let ctx = RenderContext::default();
        let mut pb = program_box();
        for i in 0..20 {
            output(&mut pb, 7, &format!("\x1b[32mline {i}\x1b[0m {}", "x".repeat(60)));
        }
        let layer = pb.view(&ctx);
        assert_eq!((layer.width, layer.height), (40, 12));
        let rows = grid_rows(&Compositor::new(40, 12).render(&[layer]));
        // 12 rows: border, 7 output rows, 3 button rows, border
        assert!(rows[7].starts_with("│line 19 xx"));
        assert_eq!(rows[7].chars().count(), 40);
        assert!(rows[11].contains(" 100% "));
    }

    #[test]
    fn test_wheel_scrolls_three_lines() {
        let mut pb = program_box();
        for i in 0..20 {
            output(&mut pb, 7, &format!("{i}"));
        }
        let mut out = Outbox::new();
        pb.update(
            &Msg::LayerWheel {
                id: "program_box".to_string(),
                up: true,
            },
            &mut out,
        );
        assert_eq!(pb.viewport.offset(), 20 - 7 - 3);
    }
}
