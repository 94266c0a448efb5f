//! Message dialog with a single OK button

use ratatui::style::Style;
use ratatui::text::Line;

use super::frame::{ButtonRow, DialogFrame};
use super::utils::wrap;
use crate::tui::compositor::Layer;
use crate::tui::component::{Component, Focusable, Resizable};
use crate::tui::context::RenderContext;
use crate::tui::focus::InteractionTarget;
use crate::tui::keymap::Action;
use crate::tui::message::{DialogResult, MessageKind, Msg, Outbox};

const MAX_TEXT_WIDTH: usize = 64;

#[derive(Debug, Clone)]
pub struct MessageDialog {
    title: String,
    message: String,
    kind: MessageKind,
    focused: bool,
    bounds: (u16, u16),
}

impl MessageDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            focused: true,
            bounds: (80, 24),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    fn title_style(&self, ctx: &RenderContext) -> Style {
        let styles = &ctx.styles;
        match self.kind {
            MessageKind::Info => styles.title_notice,
            MessageKind::Success => styles.title,
            MessageKind::Warning => styles.title_warn,
            MessageKind::Error => styles.title_error,
        }
    }
}

impl Component for MessageDialog {
    fn name(&self) -> &str {
        "message"
    }

    fn update(&mut self, msg: &Msg, out: &mut Outbox) {
        let close = match msg {
            Msg::Key(action) => matches!(
                action,
                Action::Enter | Action::Esc | Action::Space | Action::Char('o' | 'O')
            ),
            Msg::LayerHit { id, .. } => InteractionTarget::resolve(id).is_button(),
            Msg::ToggleFocused => true,
            _ => false,
        };
        if close {
            out.send(Msg::CloseDialog(DialogResult::None));
        }
    }

    fn view(&self, ctx: &RenderContext) -> Layer {
        let (w, h) = self.bounds;
        let width = usize::from(w.saturating_sub(2)).min(MAX_TEXT_WIDTH);
        let base = if self.kind == MessageKind::Error {
            ctx.styles.error
        } else {
            ctx.styles.dialog
        };
        let body: Vec<Line<'static>> = wrap(&self.message, width)
            .iter()
            .map(|text| ctx.line(text, base))
            .collect();
        DialogFrame::new(self.title.clone(), self.title_style(ctx))
            .body(body)
            .buttons(ButtonRow::new(&["OK"]).active(Some(0)))
            .focused(self.focused)
            .layer(ctx, self.name(), w, h)
    }

    fn resizable(&mut self) -> Option<&mut dyn Resizable> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Resizable for MessageDialog {
    fn set_size(&mut self, width: u16, height: u16) {
        self.bounds = (width, height);
    }
}

impl Focusable for MessageDialog {
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

    #[test]
    fn test_ok_closes() {
        let mut d = MessageDialog::new("Done", "All good", MessageKind::Success);
        for msg in [Msg::Key(Action::Enter), Msg::Key(Action::Char('o')), Msg::ToggleFocused] {
            let mut out = Outbox::new();
            d.update(&msg, &mut out);
            assert_eq!(out.len(), 1);
        }
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut d = MessageDialog::new("Done", "All good", MessageKind::Info);
        let mut out = Outbox::new();
        d.update(&Msg::Key(Action::Down), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_error_title_style() {
        let ctx = RenderContext::default();
        let d = MessageDialog::new("Error", "boom", MessageKind::Error);
        assert_eq!(d.title_style(&ctx), ctx.styles.title_error);
        let layer = d.view(&ctx);
        let rows = grid_rows(&Compositor::new(layer.width, layer.height).render(&[layer]));
        assert!(rows[0].contains("Error"));
        assert!(rows[1].contains("boom"));
    }
}
