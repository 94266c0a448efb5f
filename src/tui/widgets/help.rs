//! Key binding overlay
//!
//! Sized against the whole terminal. Swallows every key and closes on the
//! first key press or click.

use ratatui::text::{Line, Span};

use super::frame::DialogFrame;
use crate::style::markup::display_width;
use crate::tui::compositor::Layer;
use crate::tui::component::{Component, HelpText, Resizable};
use crate::tui::context::RenderContext;
use crate::tui::keymap::{Action, Binding, BINDINGS};
use crate::tui::message::{DialogResult, Msg, Outbox};

#[derive(Debug, Clone)]
pub struct HelpDialog {
    bindings: &'static [Binding],
    bounds: (u16, u16),
}

impl Default for HelpDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpDialog {
    pub fn new() -> Self {
        Self {
            bindings: BINDINGS,
            bounds: (80, 24),
        }
    }

    fn body(&self, ctx: &RenderContext) -> Vec<Line<'static>> {
        let styles = &ctx.styles;
        let key_w = self.bindings.iter().map(|b| display_width(b.keys)).max().unwrap_or(0);
        let mut lines = vec![Line::from(Span::styled("", styles.dialog))];
        for binding in self.bindings {
            let pad = key_w - display_width(binding.keys);
            lines.push(Line::from(vec![
                Span::styled(format!("  {}{}", binding.keys, " ".repeat(pad)), styles.tag_key),
                Span::styled(format!("   {}  ", binding.description), styles.dialog),
            ]));
        }
        lines.push(Line::from(Span::styled("", styles.dialog)));
        lines.push(ctx.line("  Press any key to close", styles.helpline));
        lines
    }
}

impl Component for HelpDialog {
    fn name(&self) -> &str {
        "help"
    }

    fn update(&mut self, msg: &Msg, out: &mut Outbox) {
        let close = match msg {
            Msg::Key(action) => *action != Action::None,
            Msg::LayerHit { .. } | Msg::ToggleFocused => true,
            _ => false,
        };
        if close {
            out.send(Msg::CloseDialog(DialogResult::None));
        }
    }

    fn view(&self, ctx: &RenderContext) -> Layer {
        let (w, h) = self.bounds;
        DialogFrame::new("Help", ctx.styles.title_help)
            .body(self.body(ctx))
            .layer(ctx, self.name(), w, h)
    }

    fn help(&self) -> Option<&dyn HelpText> {
        Some(self)
    }

    fn resizable(&mut self) -> Option<&mut dyn Resizable> {
        Some(self)
    }

    fn full_screen(&self) -> bool {
        true
    }

    fn captures_input(&self) -> bool {
        true
    }
}

impl HelpText for HelpDialog {
    fn help_text(&self) -> String {
        "Press any key to close help".to_string()
    }
}

impl Resizable for HelpDialog {
    fn set_size(&mut self, width: u16, height: u16) {
        self.bounds = (width, height);
    }
}
