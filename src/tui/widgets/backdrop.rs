//! Backdrop: header, separator, filler and help line

use ratatui::text::{Line, Span};

use super::header::Header;
use super::utils::{center, fit, repeat, to_u16};
use crate::tui::compositor::{z, Layer};
use crate::tui::context::RenderContext;
use crate::tui::focus::{ids, HeaderSlot};
use crate::tui::layout::{LayoutBudget, HELPLINE_HEIGHT, SEPARATOR_HEIGHT};

#[derive(Debug, Clone)]
pub struct Backdrop {
    pub header: Header,
    help_text: String,
}

impl Backdrop {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            help_text: String::new(),
        }
    }

    pub fn set_help_text(&mut self, text: impl Into<String>) {
        self.help_text = text.into();
    }

    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    /// Header lines at this terminal width (padding excluded)
    pub fn header_height(&self, ctx: &RenderContext, width: u16) -> u16 {
        self.header.height(ctx, width.saturating_sub(2)).max(1)
    }

    pub fn budget(&self, ctx: &RenderContext, width: u16) -> LayoutBudget {
        ctx.budget(self.header_height(ctx, width))
    }

    /// Full backdrop for a `width` x `height` area
    pub fn view(&self, ctx: &RenderContext, width: u16, height: u16, focus: Option<HeaderSlot>) -> Layer {
        let styles = &ctx.styles;
        let w = usize::from(width);
        let h = usize::from(height);
        let header = self.header.view(ctx, width.saturating_sub(2), focus);
        let pad = || Span::styled(" ", styles.screen);

        let mut lines: Vec<Line<'static>> = Vec::with_capacity(h);
        for line in &header.lines {
            let mut spans = vec![pad()];
            spans.extend(line.spans.iter().cloned());
            spans.push(pad());
            lines.push(fit(&Line::from(spans), w, styles.screen));
        }

        let sep = Line::from(vec![
            pad(),
            Span::styled(repeat(ctx.borders().separator, w.saturating_sub(2)), styles.separator),
            pad(),
        ]);
        lines.push(fit(&sep, w, styles.screen));

        let used = header.lines.len() + usize::from(SEPARATOR_HEIGHT) + usize::from(HELPLINE_HEIGHT);
        let filler = h.saturating_sub(used);
        for _ in 0..filler {
            lines.push(Line::from(Span::styled(" ".repeat(w), styles.screen)));
        }

        let help = ctx.line(&self.help_text, styles.helpline);
        lines.push(center(&help, w, styles.helpline));
        lines.truncate(h);

        let hotspots = header.hotspots.into_iter().map(|spot| {
            let (x, y) = (spot.x, spot.y);
            spot.at(x + 1, y).z(1)
        });

        Layer::new(lines)
            .size(width, to_u16(h))
            .fill(styles.screen)
            .id(ids::BACKDROP)
            .z(z::BACKDROP)
            .with_children(hotspots)
    }
}
