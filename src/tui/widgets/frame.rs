//! Dialog frame and button row
//!
//! A dialog is a bordered box with its title embedded in the top border,
//! an optional drop shadow, and an optional row of bordered buttons. The
//! top and left edges use the light border style, the bottom and right edges
//! the dark one.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::utils::{center, fit, repeat, to_u16};
use crate::style::markup::{display_width, RESET_TAG};
use crate::tui::compositor::{z, Layer};
use crate::tui::context::RenderContext;
use crate::tui::focus::ids;
use crate::tui::layout::BUTTON_HEIGHT;

// ─────────────────────────────────────────────────────────────────────────────
// Buttons
// ─────────────────────────────────────────────────────────────────────────────

/// A centered row of bordered buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonRow {
    labels: Vec<String>,
    active: Option<usize>,
    enabled: Vec<bool>,
}

impl ButtonRow {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        Self {
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            active: None,
            enabled: vec![true; labels.len()],
        }
    }

    /// Highlight button `index` (`None` when the row is not focused)
    pub fn active(mut self, index: Option<usize>) -> Self {
        self.active = index;
        self
    }

    pub fn enabled(mut self, index: usize, enabled: bool) -> Self {
        if let Some(slot) = self.enabled.get_mut(index) {
            *slot = enabled;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn button_width(&self) -> usize {
        self.labels.iter().map(|l| display_width(l)).max().unwrap_or(0) + 4 + 2
    }

    /// Width the row needs to show every button side by side
    pub fn min_width(&self) -> u16 {
        to_u16(self.button_width() * self.labels.len())
    }

    /// Three rows of buttons plus one hotspot per button, relative to the row
    pub fn render(&self, ctx: &RenderContext, width: u16) -> (Vec<Line<'static>>, Vec<Layer>) {
        let width = usize::from(width);
        let styles = &ctx.styles;
        let borders = ctx.borders();
        let mut rows = vec![Vec::new(), Vec::new(), Vec::new()];
        let mut hotspots = Vec::new();

        if self.labels.is_empty() || width == 0 {
            let blank = Line::from(Span::styled(" ".repeat(width), styles.dialog));
            return (vec![blank.clone(), blank.clone(), blank], hotspots);
        }

        let n = self.labels.len();
        let section = width / n;
        let bw = self.button_width().min(section.max(1));
        let inner = bw.saturating_sub(2);

        for (i, label) in self.labels.iter().enumerate() {
            let is_active = self.active == Some(i) && self.enabled[i];
            let style = if is_active {
                styles.button_active
            } else {
                styles.button_inactive
            };
            let key_style = if is_active {
                styles.tag_key_selected
            } else {
                styles.tag_key
            };
            let left = section.saturating_sub(bw) / 2;
            let right = section.saturating_sub(bw + left);
            let pad = |n: usize| Span::styled(" ".repeat(n), styles.dialog);

            let top = format!(
                "{}{}{}",
                borders.top_left,
                repeat(borders.horizontal, inner),
                borders.top_right
            );
            let bottom = format!(
                "{}{}{}",
                borders.bottom_left,
                repeat(borders.horizontal, inner),
                borders.bottom_right
            );
            let caption = hotkey_label(label, style, key_style);
            let caption = center(&caption, inner, style);

            rows[0].extend([pad(left), Span::styled(top, style), pad(right)]);
            rows[1].push(pad(left));
            rows[1].push(Span::styled(borders.vertical.to_string(), style));
            rows[1].extend(caption.spans);
            rows[1].push(Span::styled(borders.vertical.to_string(), style));
            rows[1].push(pad(right));
            rows[2].extend([pad(left), Span::styled(bottom, style), pad(right)]);

            hotspots.push(
                Layer::hotspot(
                    ids::button(label),
                    i32::try_from(i * section + left).unwrap_or(0),
                    0,
                    to_u16(bw),
                    BUTTON_HEIGHT,
                )
                .z(1),
            );
        }

        let lines = rows
            .into_iter()
            .map(|spans| fit(&Line::from(spans), width, styles.dialog))
            .collect();
        (lines, hotspots)
    }

    /// Button whose first letter matches `ch`, case-insensitively
    pub fn hotkey(&self, ch: char) -> Option<usize> {
        let ch = ch.to_ascii_lowercase();
        self.labels.iter().position(|label| {
            label
                .trim()
                .chars()
                .next()
                .is_some_and(|c| c.to_ascii_lowercase() == ch)
        })
    }

    /// Button index for a `btn-*` hit identity
    pub fn index_of(&self, hit_id: &str) -> Option<usize> {
        self.labels.iter().position(|l| ids::button(l) == hit_id)
    }
}

/// Label with its first letter in the hotkey style
fn hotkey_label(label: &str, style: Style, key_style: Style) -> Line<'static> {
    let trimmed = label.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => Line::from(vec![
            Span::styled(first.to_string(), key_style),
            Span::styled(chars.as_str().to_string(), style),
        ]),
        None => Line::from(Span::styled(label.to_string(), style)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for one framed dialog
#[derive(Debug, Clone)]
pub struct DialogFrame {
    title: String,
    title_style: Style,
    body: Vec<Line<'static>>,
    buttons: Option<ButtonRow>,
    focused: bool,
    fixed: Option<(u16, u16)>,
    /// Right-aligned text in the bottom border
    footer: Option<String>,
}

impl DialogFrame {
    /// `title` is markup rendered over `title_style`
    pub fn new(title: impl Into<String>, title_style: Style) -> Self {
        Self {
            title: title.into(),
            title_style,
            body: Vec::new(),
            buttons: None,
            focused: true,
            fixed: None,
            footer: None,
        }
    }

    pub fn body(mut self, body: Vec<Line<'static>>) -> Self {
        self.body = body;
        self
    }

    pub fn buttons(mut self, buttons: ButtonRow) -> Self {
        self.buttons = Some(buttons);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Fix the outer size instead of sizing to content
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.fixed = Some((width, height));
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Inner (content) size once clamped to `max_w` x `max_h` outer
    pub fn inner_size(&self, max_w: u16, max_h: u16) -> (u16, u16) {
        let max_inner_w = max_w.saturating_sub(2).max(1);
        let max_inner_h = max_h.saturating_sub(2).max(1);
        if let Some((w, h)) = self.fixed {
            return (
                w.saturating_sub(2).clamp(1, max_inner_w),
                h.saturating_sub(2).clamp(1, max_inner_h),
            );
        }

        let body_w = self.body.iter().map(Line::width).max().unwrap_or(0);
        let title_w = if self.title.is_empty() {
            0
        } else {
            display_width(&self.title) + 4
        };
        let buttons_w = self.buttons.as_ref().map_or(0, |b| usize::from(b.min_width()));
        let mut w = body_w.max(title_w).max(buttons_w).max(1);
        if w % 2 != 0 {
            w += 1;
        }
        let h = self.body.len() + self.buttons.as_ref().map_or(0, |_| usize::from(BUTTON_HEIGHT));
        (to_u16(w).min(max_inner_w), to_u16(h.max(1)).min(max_inner_h))
    }

    /// Rows available for body text at the given outer bounds
    pub fn body_rows(&self, max_w: u16, max_h: u16) -> u16 {
        let (_, h) = self.inner_size(max_w, max_h);
        let buttons = self.buttons.as_ref().map_or(0, |_| BUTTON_HEIGHT);
        h.saturating_sub(buttons)
    }

    /// The framed box as a layer tree rooted at (0, 0)
    pub fn layer(&self, ctx: &RenderContext, id: &str, max_w: u16, max_h: u16) -> Layer {
        let (inner_w, inner_h) = self.inner_size(max_w, max_h);
        let w = usize::from(inner_w);
        let styles = &ctx.styles;
        let borders = ctx.borders();
        let light = styles.border;
        let dark = styles.border2;

        let button_rows = self.buttons.as_ref().map_or(0, |_| BUTTON_HEIGHT).min(inner_h);
        let body_rows = usize::from(inner_h - button_rows);

        let mut lines = Vec::with_capacity(usize::from(inner_h) + 2);
        lines.push(self.top_border(ctx, w, light));

        let side = |content: Line<'static>| {
            let mut spans = vec![Span::styled(borders.vertical.to_string(), light)];
            spans.extend(content.spans);
            spans.push(Span::styled(borders.vertical.to_string(), dark));
            Line::from(spans)
        };

        for row in 0..body_rows {
            let content = match self.body.get(row) {
                Some(line) => fit(line, w, styles.dialog),
                None => Line::from(Span::styled(" ".repeat(w), styles.dialog)),
            };
            lines.push(side(content));
        }

        let mut children = Vec::new();
        if let Some(buttons) = &self.buttons {
            let (rows, hotspots) = buttons.render(ctx, inner_w);
            for row in rows.into_iter().take(usize::from(button_rows)) {
                lines.push(side(row));
            }
            let row_y = 1 + i32::try_from(body_rows).unwrap_or(0);
            children.extend(hotspots.into_iter().map(|h| {
                let (x, y) = (h.x, h.y);
                h.at(x + 1, y + row_y)
            }));
        }

        let bottom = match self.footer.as_deref() {
            Some(text) if display_width(text) + 2 <= w => {
                let left = w - display_width(text) - 2;
                format!(
                    "{}{}{}{}{}",
                    borders.bottom_left,
                    repeat(borders.horizontal, left),
                    text,
                    repeat(borders.horizontal, 2),
                    borders.bottom_right
                )
            }
            _ => format!(
                "{}{}{}",
                borders.bottom_left,
                repeat(borders.horizontal, w),
                borders.bottom_right
            ),
        };
        lines.push(Line::from(Span::styled(bottom, dark)));

        let outer_w = inner_w.saturating_add(2);
        let outer_h = inner_h.saturating_add(2);
        if ctx.ui.shadow {
            children.extend(shadow(ctx, outer_w, outer_h));
        }

        Layer::new(lines)
            .size(outer_w, outer_h)
            .id(id)
            .with_children(children)
    }

    fn top_border(&self, ctx: &RenderContext, w: usize, light: Style) -> Line<'static> {
        let borders = ctx.borders();
        let edge = |n: usize| Span::styled(repeat(borders.horizontal, n), light);
        let mut spans = vec![Span::styled(borders.top_left.to_string(), light)];

        if self.title.is_empty() || w < 5 {
            spans.push(edge(w));
        } else {
            let (left_c, right_c) = if self.focused {
                (borders.focus_left, borders.focus_right)
            } else {
                (borders.label_left, borders.label_right)
            };
            let base = self.title_style.patch(Style::default().bg(ctx.styles.dialog.bg.unwrap_or_default()));
            let mut markup = self.title.clone();
            if !markup.ends_with(RESET_TAG) {
                markup.push_str(RESET_TAG);
            }
            let title = super::utils::truncate(&ctx.line(&markup, base), w - 4);
            let section = title.width() + 4;
            let left = (w - section) / 2;
            let right = w - section - left;

            spans.push(edge(left));
            spans.push(Span::styled(format!("{} ", left_c), light));
            spans.extend(title.spans);
            spans.push(Span::styled(format!(" {}", right_c), light));
            spans.push(edge(right));
        }
        spans.push(Span::styled(borders.top_right.to_string(), light));
        Line::from(spans)
    }
}

/// Drop shadow strips for a `w` x `h` box, offset by the shadow size
pub fn shadow(ctx: &RenderContext, w: u16, h: u16) -> Vec<Layer> {
    let shade = ctx.shade_char();
    let style = ctx.styles.shadow;
    let (sw, sh) = ctx.budget(1).shadow_size();
    let rows = |width: u16, height: u16| {
        (0..height)
            .map(|_| Line::from(Span::styled(repeat(shade, usize::from(width)), style)))
            .collect::<Vec<_>>()
    };
    let rel = z::HALO - z::DIALOG;
    vec![
        Layer::new(rows(sw, h.saturating_sub(sh)))
            .at(i32::from(w), i32::from(sh))
            .z(rel),
        Layer::new(rows(w, sh)).at(i32::from(sw), i32::from(h)).z(rel),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::style::Theme;
    use crate::tui::compositor::{grid_rows, Compositor};
    use pretty_assertions::assert_eq;

    fn ctx(shadow: bool) -> RenderContext {
        let ui = UiConfig {
            shadow,
            ..UiConfig::default()
        };
        RenderContext::new(Theme::classic(), ui)
    }

    #[test]
    fn test_title_embedded_in_top_border() {
        let ctx = ctx(false);
        let frame = DialogFrame::new("Hi", ctx.styles.title).body(vec![Line::raw("abcdefgh")]);
        let layer = frame.layer(&ctx, "dlg", 40, 20);
        let rows = grid_rows(&Compositor::new(10, 3).render(&[layer]));
        assert_eq!(rows, vec!["╭─┫ Hi ┣─╮", "│abcdefgh│", "╰────────╯"]);
    }

    #[test]
    fn test_unfocused_uses_light_connectors() {
        let ctx = ctx(false);
        let frame = DialogFrame::new("Hi", ctx.styles.title)
            .body(vec![Line::raw("abcdefgh")])
            .focused(false);
        let rows = grid_rows(&Compositor::new(10, 1).render(&[frame.layer(&ctx, "d", 40, 20)]));
        assert_eq!(rows[0], "╭─┤ Hi ├─╮");
    }

    #[test]
    fn test_size_clamped_to_bounds() {
        let ctx = ctx(false);
        let body = (0..30).map(|i| Line::raw(format!("line {i}"))).collect();
        let frame = DialogFrame::new("T", ctx.styles.title).body(body);
        let layer = frame.layer(&ctx, "d", 20, 8);
        assert_eq!((layer.width, layer.height), (10, 8));
        assert_eq!(frame.body_rows(20, 8), 6);
    }

    #[test]
    fn test_button_hotspots_inside_frame() {
        let ctx = ctx(false);
        let frame = DialogFrame::new("Q", ctx.styles.title)
            .body(vec![Line::raw("Proceed?")])
            .buttons(ButtonRow::new(&["Yes", "No"]).active(Some(0)));
        let layer = frame.layer(&ctx, "confirm", 60, 20).at(5, 2);
        let regions = Compositor::new(80, 24).regions(&[layer]);
        let yes = regions.iter().find(|r| r.id == "btn-yes").unwrap();
        let no = regions.iter().find(|r| r.id == "btn-no").unwrap();
        assert_eq!(yes.rect.y, 2 + 1 + 1);
        assert_eq!(yes.rect.height, 3);
        assert!(no.rect.x > yes.rect.x);
        assert!(yes.z > regions.iter().find(|r| r.id == "confirm").unwrap().z);
    }

    #[test]
    fn test_shadow_adds_strips() {
        let ctx = ctx(true);
        let layer = DialogFrame::new("", ctx.styles.title)
            .body(vec![Line::raw("xx")])
            .layer(&ctx, "d", 40, 20);
        let rows = grid_rows(&Compositor::new(6, 4).render(&[layer]));
        assert_eq!(rows, vec!["╭──╮  ", "│xx│▒▒", "╰──╯▒▒", "  ▒▒▒▒"]);
    }

    #[test]
    fn test_footer_in_bottom_border() {
        let ctx = ctx(false);
        let frame = DialogFrame::new("", ctx.styles.title)
            .body(vec![Line::raw("abcdefghij")])
            .footer(" 50% ");
        let rows = grid_rows(&Compositor::new(12, 3).render(&[frame.layer(&ctx, "d", 40, 20)]));
        assert_eq!(rows[2], "╰─── 50% ──╯");
    }

    #[test]
    fn test_button_hotkeys() {
        let row = ButtonRow::new(&["Select", "Back", "Exit"]);
        assert_eq!(row.hotkey('b'), Some(1));
        assert_eq!(row.hotkey('E'), Some(2));
        assert_eq!(row.hotkey('z'), None);
        assert_eq!(row.index_of("btn-exit"), Some(2));
    }
}
