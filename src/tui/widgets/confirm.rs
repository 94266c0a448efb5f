//! Yes/No confirmation dialog

use ratatui::text::Line;

use super::frame::{ButtonRow, DialogFrame};
use super::utils::wrap;
use crate::tui::compositor::Layer;
use crate::tui::component::{Component, Focusable, HelpText, Resizable};
use crate::tui::context::RenderContext;
use crate::tui::focus::{InteractionTarget, PANEL_BUTTONS};
use crate::tui::keymap::Action;
use crate::tui::message::{DialogResult, Msg, Outbox};

const YES: usize = 0;
const NO: usize = 1;
const LABELS: [&str; 2] = ["Yes", "No"];

/// Widest the question text is wrapped to
const MAX_TEXT_WIDTH: usize = 60;

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    title: String,
    question: String,
    selected: usize,
    focused: bool,
    bounds: (u16, u16),
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, question: impl Into<String>, default_yes: bool) -> Self {
        Self {
            title: title.into(),
            question: question.into(),
            selected: if default_yes { YES } else { NO },
            focused: true,
            bounds: (80, 24),
        }
    }

    pub fn answer(&self) -> bool {
        self.selected == YES
    }

    fn close(&self, out: &mut Outbox, yes: bool) {
        out.send(Msg::CloseDialog(DialogResult::Bool(yes)));
    }

    fn buttons(&self) -> ButtonRow {
        ButtonRow::new(&LABELS).active(Some(self.selected))
    }

    fn frame(&self, ctx: &RenderContext) -> DialogFrame {
        let width = usize::from(self.bounds.0.saturating_sub(2)).min(MAX_TEXT_WIDTH);
        let body: Vec<Line<'static>> = wrap(&self.question, width)
            .iter()
            .map(|text| ctx.line(text, ctx.styles.dialog))
            .collect();
        DialogFrame::new(self.title.clone(), ctx.styles.title_question)
            .body(body)
            .buttons(self.buttons())
            .focused(self.focused)
    }
}

impl Component for ConfirmDialog {
    fn name(&self) -> &str {
        "confirm"
    }

    fn update(&mut self, msg: &Msg, out: &mut Outbox) {
        match msg {
            Msg::Key(action) => match action {
                Action::Char('y' | 'Y') => self.close(out, true),
                Action::Char('n' | 'N') | Action::Esc => self.close(out, false),
                Action::Left | Action::Right => self.selected = 1 - self.selected,
                Action::Enter | Action::Space => self.close(out, self.answer()),
                _ => {}
            },
            Msg::LayerHit { id, .. } => {
                if let InteractionTarget::Button(button) = InteractionTarget::resolve(id) {
                    if let Some(index) = self.buttons().index_of(&button) {
                        self.selected = index;
                        self.close(out, index == YES);
                    }
                }
            }
            Msg::LayerWheel { .. } => self.selected = 1 - self.selected,
            Msg::FocusPanel(panel) if panel == PANEL_BUTTONS => self.focused = true,
            Msg::ToggleFocused => self.close(out, self.answer()),
            _ => {}
        }
    }

    fn view(&self, ctx: &RenderContext) -> Layer {
        let (w, h) = self.bounds;
        self.frame(ctx).layer(ctx, self.name(), w, h)
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
}

impl HelpText for ConfirmDialog {
    fn help_text(&self) -> String {
        "y/n to answer, ←/→ to choose, Enter to confirm, Esc for No".to_string()
    }
}

impl Resizable for ConfirmDialog {
    fn set_size(&mut self, width: u16, height: u16) {
        self.bounds = (width, height);
    }
}

impl Focusable for ConfirmDialog {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
