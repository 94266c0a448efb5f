//! Header bar
//!
//! Hostname and flags on the left, application name in the center, the two
//! version slots on the right. On narrow terminals the sections wrap onto
//! up to four lines.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::utils::{center, fit, to_u16, truncate};
use crate::tui::compositor::Layer;
use crate::tui::context::RenderContext;
use crate::tui::focus::HeaderSlot;
use crate::tui::layout::MAX_HEADER_HEIGHT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSlot {
    pub version: String,
    pub update_available: bool,
}

impl VersionSlot {
    fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            update_available: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    hostname: String,
    flags: Vec<String>,
    app_name: String,
    app: VersionSlot,
    template: VersionSlot,
}

/// Rendered header plus hotspots for the version slots
#[derive(Debug, Clone)]
pub struct HeaderView {
    pub lines: Vec<Line<'static>>,
    pub hotspots: Vec<Layer>,
}

struct Segment {
    spans: Vec<Span<'static>>,
    width: usize,
}

impl Segment {
    fn new() -> Self {
        Self {
            spans: Vec::new(),
            width: 0,
        }
    }

    fn push(&mut self, text: impl Into<String>, style: Style) {
        let text = text.into();
        self.width += crate::style::markup::display_width(&text);
        self.spans.push(Span::styled(text, style));
    }

    fn append(&mut self, other: Segment) {
        self.width += other.width;
        self.spans.extend(other.spans);
    }

    fn line(self) -> Line<'static> {
        Line::from(self.spans)
    }
}

impl Header {
    pub fn new(app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            hostname: hostname(),
            flags: Vec::new(),
            app_name: app_name.into(),
            app: VersionSlot::new(app_version),
            template: VersionSlot::new("-"),
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn set_flags(&mut self, flags: Vec<String>) {
        self.flags = flags;
    }

    pub fn set_slot(&mut self, slot: HeaderSlot, version: impl Into<String>, update_available: bool) {
        let target = match slot {
            HeaderSlot::App => &mut self.app,
            HeaderSlot::Template => &mut self.template,
        };
        target.version = version.into();
        target.update_available = update_available;
    }

    pub fn slot(&self, slot: HeaderSlot) -> &VersionSlot {
        match slot {
            HeaderSlot::App => &self.app,
            HeaderSlot::Template => &self.template,
        }
    }

    /// Lines the header needs at `width`
    pub fn height(&self, ctx: &RenderContext, width: u16) -> u16 {
        to_u16(self.view(ctx, width, None).lines.len())
    }

    fn left(&self, ctx: &RenderContext) -> Segment {
        let styles = &ctx.styles;
        let mut seg = Segment::new();
        seg.push(self.hostname.clone(), styles.hostname);
        if !self.flags.is_empty() {
            seg.push(" |", styles.screen);
            for (i, flag) in self.flags.iter().enumerate() {
                if i > 0 {
                    seg.push("|", styles.screen);
                }
                seg.push(flag.clone(), styles.app_flags);
            }
            seg.push("|", styles.screen);
        }
        seg
    }

    fn version(&self, ctx: &RenderContext, slot: HeaderSlot, focused: bool) -> Segment {
        let styles = &ctx.styles;
        let data = self.slot(slot);
        let tag = match slot {
            HeaderSlot::App => "A",
            HeaderSlot::Template => "T",
        };
        let version_style = if focused {
            styles.version_selected
        } else if data.update_available {
            styles.update_flag
        } else {
            styles.screen
        };

        let mut seg = Segment::new();
        if data.update_available {
            seg.push("*", styles.update_flag);
        } else {
            seg.push(" ", styles.screen);
        }
        seg.push(format!("{}:[", tag), styles.screen);
        seg.push(data.version.clone(), version_style);
        seg.push("]", styles.screen);
        seg
    }

    /// Render at `width` with `focus` highlighting one slot
    pub fn view(&self, ctx: &RenderContext, width: u16, focus: Option<HeaderSlot>) -> HeaderView {
        let w = usize::from(width);
        let fill = ctx.styles.screen;
        let left = self.left(ctx);
        let mut center_seg = Segment::new();
        center_seg.push(self.app_name.clone(), ctx.styles.app_name);
        let app = self.version(ctx, HeaderSlot::App, focus == Some(HeaderSlot::App));
        let tmpl = self.version(ctx, HeaderSlot::Template, focus == Some(HeaderSlot::Template));
        let (app_w, tmpl_w) = (app.width, tmpl.width);
        let right_w = app_w + tmpl_w;

        let mut lines = Vec::new();
        // (slot, row, x, width)
        let mut slots: Vec<(HeaderSlot, usize, usize, usize)> = Vec::new();

        if left.width + center_seg.width + right_w <= w {
            let free = w - left.width - center_seg.width - right_w;
            let lpad = free / 2;
            let mut line = Segment::new();
            line.append(left);
            line.push(" ".repeat(lpad), fill);
            line.append(center_seg);
            line.push(" ".repeat(free - lpad), fill);
            let x = line.width;
            line.append(app);
            line.append(tmpl);
            slots.push((HeaderSlot::App, 0, x, app_w));
            slots.push((HeaderSlot::Template, 0, x + app_w, tmpl_w));
            lines.push(line.line());
        } else if left.width + right_w < w {
            let mut line = Segment::new();
            let gap = w - left.width - right_w;
            line.append(left);
            line.push(" ".repeat(gap), fill);
            let x = line.width;
            line.append(app);
            line.append(tmpl);
            slots.push((HeaderSlot::App, 0, x, app_w));
            slots.push((HeaderSlot::Template, 0, x + app_w, tmpl_w));
            lines.push(line.line());
            lines.push(center(&center_seg.line(), w, fill));
        } else {
            lines.push(fit(&left.line(), w, fill));
            lines.push(center(&center_seg.line(), w, fill));
            if right_w <= w {
                let x = w - right_w;
                let mut line = Segment::new();
                line.push(" ".repeat(x), fill);
                line.append(app);
                line.append(tmpl);
                slots.push((HeaderSlot::App, 2, x, app_w));
                slots.push((HeaderSlot::Template, 2, x + app_w, tmpl_w));
                lines.push(line.line());
            } else {
                for (row, (slot, seg)) in [(HeaderSlot::App, app), (HeaderSlot::Template, tmpl)]
                    .into_iter()
                    .enumerate()
                {
                    let x = w.saturating_sub(seg.width);
                    let seg_w = seg.width.min(w);
                    let mut line = Segment::new();
                    line.push(" ".repeat(x), fill);
                    line.append(seg);
                    slots.push((slot, 2 + row, x, seg_w));
                    lines.push(truncate(&line.line(), w));
                }
            }
        }

        lines.truncate(usize::from(MAX_HEADER_HEIGHT));
        let lines: Vec<Line<'static>> = lines.iter().map(|l| fit(l, w, fill)).collect();
        let hotspots = slots
            .into_iter()
            .filter(|&(_, row, _, _)| row < lines.len())
            .map(|(slot, row, x, width)| {
                Layer::hotspot(
                    slot.hit_id(),
                    i32::try_from(x).unwrap_or(0),
                    i32::try_from(row).unwrap_or(0),
                    to_u16(width),
                    1,
                )
            })
            .collect();

        HeaderView { lines, hotspots }
    }
}

/// Best-effort machine name
fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn header() -> Header {
        Header::new("Strata", "1.2.0").with_hostname("box")
    }

    #[test]
    fn test_single_line_when_wide() {
        let ctx = RenderContext::default();
        let view = header().view(&ctx, 60, None);
        assert_eq!(view.lines.len(), 1);
        let row = text(&view.lines[0]);
        assert!(row.starts_with("box"));
        assert!(row.ends_with(" A:[1.2.0] T:[-]"));
        assert!(row.contains("Strata"));
        assert_eq!(view.lines[0].width(), 60);
    }

    #[test]
    fn test_update_marker() {
        let ctx = RenderContext::default();
        let mut h = header();
        h.set_slot(HeaderSlot::Template, "2024.1", true);
        let row = text(&h.view(&ctx, 60, None).lines[0]);
        assert!(row.ends_with("*T:[2024.1]"));
    }

    #[test]
    fn test_wraps_on_narrow_terminal() {
        let ctx = RenderContext::default();
        let mut h = header();
        h.set_flags(vec!["DEBUG".into(), "FORCE".into()]);
        assert_eq!(h.view(&ctx, 36, None).lines.len(), 2);
        assert_eq!(h.view(&ctx, 16, None).lines.len(), 3);
        assert_eq!(h.view(&ctx, 10, None).lines.len(), 4);
        assert!(h.height(&ctx, 4) <= MAX_HEADER_HEIGHT);
    }

    #[test]
    fn test_slot_hotspots_cover_versions() {
        let ctx = RenderContext::default();
        let view = header().view(&ctx, 60, None);
        let ids: Vec<_> = view.hotspots.iter().filter_map(|h| h.id.clone()).collect();
        assert_eq!(ids, vec!["app_version", "tmpl_version"]);
        let app = &view.hotspots[0];
        assert_eq!(app.x, 60 - 16);
        assert_eq!(app.width, 10);
    }

    #[test]
    fn test_focused_slot_uses_selected_style() {
        let ctx = RenderContext::default();
        let view = header().view(&ctx, 60, Some(HeaderSlot::App));
        let selected = view.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "1.2.0")
            .map(|s| s.style);
        assert_eq!(selected, Some(ctx.styles.version_selected));
    }
}
