//! Slide-up log panel
//!
//! Collapsed it is a one-line strip under the help line. Expanded it shows
//! a viewport over the log tail that follows the bottom while the user has
//! not scrolled away. The strip doubles as the resize handle.

use ratatui::text::{Line, Span};

use super::scroll::Viewport;
use super::utils::{fit, repeat, to_u16};
use crate::style::markup::display_width;
use crate::tui::compositor::{z, Layer};
use crate::tui::context::RenderContext;
use crate::tui::focus::ids;
use crate::tui::keymap::Action;

/// Lines retained in memory
const MAX_LINES: usize = 5000;

const COLLAPSED_HEIGHT: u16 = 1;
const MIN_EXPANDED_HEIGHT: u16 = 2;
/// Rows always left to the backdrop
const RESERVED_ROWS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    start_y: u16,
    start_height: u16,
}

#[derive(Debug, Clone)]
pub struct LogPanel {
    expanded: bool,
    focused: bool,
    lines: Vec<String>,
    viewport: Viewport,
    width: u16,
    total_height: u16,
    /// Expanded height; 0 until first sized
    height: u16,
    drag: Option<Drag>,
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LogPanel {
    /// `height` is the configured expanded height, if any
    pub fn new(height: Option<u16>) -> Self {
        Self {
            expanded: false,
            focused: false,
            lines: Vec::new(),
            viewport: Viewport::new(true),
            width: 0,
            total_height: 0,
            height: height.unwrap_or(0),
            drag: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn max_height(&self) -> u16 {
        self.total_height
            .saturating_sub(RESERVED_ROWS)
            .max(MIN_EXPANDED_HEIGHT)
    }

    fn clamp_height(&self, height: u16) -> u16 {
        height.clamp(MIN_EXPANDED_HEIGHT, self.max_height())
    }

    /// Rows the panel currently occupies
    pub fn height(&self) -> u16 {
        if !self.expanded {
            return COLLAPSED_HEIGHT;
        }
        let h = if self.height > 0 {
            self.height
        } else {
            self.total_height / 2
        };
        self.clamp_height(h)
    }

    pub fn set_size(&mut self, width: u16, total_height: u16) {
        self.width = width;
        self.total_height = total_height;
        if self.expanded {
            if self.height == 0 {
                self.height = total_height / 2;
            }
            self.height = self.clamp_height(self.height);
        }
        self.viewport
            .set_height(usize::from(self.height().saturating_sub(COLLAPSED_HEIGHT).max(1)));
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
        if self.expanded {
            self.set_size(self.width, self.total_height);
            self.viewport.bottom();
        }
    }

    /// Append log text; embedded newlines split into lines
    pub fn push(&mut self, text: &str) {
        self.lines.extend(text.split('\n').map(str::to_string));
        if self.lines.len() > MAX_LINES {
            let excess = self.lines.len() - MAX_LINES;
            self.lines.drain(..excess);
        }
        self.viewport.set_total(self.lines.len());
    }

    /// Scroll keys while focused and expanded; true when consumed
    pub fn handle_action(&mut self, action: Action) -> bool {
        if !self.expanded {
            return false;
        }
        match action {
            Action::Up => self.viewport.scroll_up(1),
            Action::Down => self.viewport.scroll_down(1),
            Action::PageUp => self.viewport.page_up(),
            Action::PageDown => self.viewport.page_down(),
            Action::HalfPageUp => self.viewport.half_page_up(),
            Action::HalfPageDown => self.viewport.half_page_down(),
            Action::Home => self.viewport.top(),
            Action::End => self.viewport.bottom(),
            _ => return false,
        }
        true
    }

    pub fn wheel(&mut self, up: bool) {
        if self.expanded {
            self.viewport.wheel(up);
        }
    }

    pub fn scroll_percent(&self) -> u16 {
        self.viewport.percent()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resize drag
    // ─────────────────────────────────────────────────────────────────────

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin_drag(&mut self, y: u16) {
        if !self.expanded {
            self.expanded = true;
            self.height = COLLAPSED_HEIGHT;
        }
        self.drag = Some(Drag {
            start_y: y,
            start_height: self.height.max(COLLAPSED_HEIGHT),
        });
    }

    /// Pointer moved to row `y` while dragging
    pub fn drag_to(&mut self, y: u16) {
        let Some(drag) = self.drag else { return };
        let delta = i32::from(drag.start_y) - i32::from(y);
        let wanted = (i32::from(drag.start_height) + delta).max(0);
        self.height = self.clamp_height(u16::try_from(wanted).unwrap_or(u16::MAX));
        self.set_size(self.width, self.total_height);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    fn label(&self) -> &'static str {
        if self.expanded {
            " v Log v "
        } else {
            " ^ Log ^ "
        }
    }

    /// Panel layer with its top edge at row `y`
    pub fn view(&self, ctx: &RenderContext, y: u16) -> Layer {
        let styles = &ctx.styles;
        let borders = ctx.borders();
        let w = usize::from(self.width);
        let line_char = if self.focused {
            borders.thick
        } else {
            borders.separator
        };

        let label = self.label();
        let label_w = display_width(label);
        let dash_w = w.saturating_sub(label_w) / 2;
        let right_total = w.saturating_sub(dash_w + label_w);
        let right = if self.focused && self.expanded {
            let indicator = format!(" {}% ", self.scroll_percent());
            let dashes = right_total.saturating_sub(display_width(&indicator));
            format!("{}{}", repeat(line_char, dashes), indicator)
        } else {
            repeat(line_char, right_total)
        };
        let strip = Line::from(vec![
            Span::styled(repeat(line_char, dash_w), styles.log_panel),
            Span::styled(label, styles.log_panel),
            Span::styled(right, styles.log_panel),
        ]);

        let mut lines = vec![fit(&strip, w, styles.log_panel)];
        let mut children = vec![
            Layer::hotspot(ids::LOG_RESIZE, 0, 0, to_u16(dash_w), 1).z(1),
            Layer::hotspot(ids::LOG_TOGGLE, i32::try_from(dash_w).unwrap_or(0), 0, to_u16(label_w), 1).z(1),
            Layer::hotspot(
                ids::LOG_RESIZE,
                i32::try_from(dash_w + label_w).unwrap_or(0),
                0,
                to_u16(right_total),
                1,
            )
            .z(1),
        ];

        let height = self.height();
        if self.expanded {
            let rows = usize::from(height - COLLAPSED_HEIGHT);
            let engine = ctx.markup();
            let visible = self.viewport.visible();
            let shown = visible.len();
            for line in &self.lines[visible] {
                lines.push(fit(&engine.render_line(line, styles.console), w, styles.console));
            }
            for _ in shown..rows {
                lines.push(Line::from(Span::styled(" ".repeat(w), styles.console)));
            }
            children.push(Layer::hotspot(ids::LOG_VIEWPORT, 0, 1, self.width, to_u16(rows)).z(1));
        }

        Layer::new(lines)
            .size(self.width, height)
            .at(0, i32::from(y))
            .z(z::LOG_PANEL)
            .id(ids::LOG_PANEL)
            .with_children(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::compositor::{grid_rows, Compositor};

    fn panel(w: u16, h: u16) -> LogPanel {
        let mut p = LogPanel::new(None);
        p.set_size(w, h);
        p
    }

    #[test]
    fn test_collapsed_strip() {
        let ctx = RenderContext::default();
        let p = panel(21, 24);
        assert_eq!(p.height(), 1);
        let rows = grid_rows(&Compositor::new(21, 1).render(&[p.view(&ctx, 0)]));
        assert_eq!(rows[0], "────── ^ Log ^ ──────");
    }

    #[test]
    fn test_expanded_height_is_half_terminal_clamped() {
        let mut p = panel(40, 24);
        p.toggle();
        assert_eq!(p.height(), 12);

        let mut tiny = panel(40, 5);
        tiny.toggle();
        assert_eq!(tiny.height(), 2);
    }

    #[test]
    fn test_follows_bottom_until_scrolled() {
        let mut p = panel(40, 10);
        p.toggle();
        for i in 0..20 {
            p.push(&format!("line {i}"));
        }
        assert_eq!(p.scroll_percent(), 100);
        p.wheel(true);
        p.push("more");
        assert!(p.scroll_percent() < 100);
        assert!(p.handle_action(Action::End));
        assert_eq!(p.scroll_percent(), 100);
    }

    #[test]
    fn test_drag_resizes_upwards() {
        let mut p = panel(40, 30);
        p.begin_drag(29);
        assert!(p.is_expanded());
        p.drag_to(20);
        assert_eq!(p.height(), 10);
        p.drag_to(0);
        assert_eq!(p.height(), 26);
        p.end_drag();
        assert!(!p.is_dragging());
    }

    #[test]
    fn test_hotspots_and_focus_indicator() {
        let ctx = RenderContext::default();
        let mut p = panel(30, 20);
        p.toggle();
        p.set_focused(true);
        let layer = p.view(&ctx, 10);
        let regions = Compositor::new(30, 20).regions(&[layer.clone()]);
        let ids: Vec<_> = regions.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"log_toggle"));
        assert!(ids.contains(&"log_viewport"));
        assert_eq!(regions.iter().filter(|r| r.id == "log_resize").count(), 2);

        let rows = grid_rows(&Compositor::new(30, 20).render(&[layer]));
        assert!(rows[10].contains("━"));
        assert!(rows[10].ends_with(" 100% "));
    }

    #[test]
    fn test_push_caps_lines() {
        let mut p = panel(40, 10);
        for i in 0..MAX_LINES {
            p.push(&format!("line {i}"));
        }
        p.push("tail a\ntail b");
        assert_eq!(p.lines.len(), MAX_LINES);
        assert_eq!(p.lines.first().map(String::as_str), Some("line 2"));
        assert_eq!(p.lines.last().map(String::as_str), Some("tail b"));
    }

    #[test]
    fn test_keys_ignored_while_collapsed() {
        let mut p = panel(30, 20);
        assert!(!p.handle_action(Action::Home));
    }
}
