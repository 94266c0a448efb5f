//! TUI Widgets
//!
//! Chrome (backdrop, header, log panel) is owned by the root controller.
//! Screens and dialogs implement [`Component`](super::component::Component).
//! Everything here produces [`Layer`](super::compositor::Layer) trees.

pub mod backdrop;
pub mod confirm;
pub mod frame;
pub mod header;
pub mod help;
pub mod log_panel;
pub mod menu;
pub mod message;
pub mod program_box;
pub mod scroll;

pub use backdrop::Backdrop;
pub use confirm::ConfirmDialog;
pub use header::Header;
pub use help::HelpDialog;
pub use log_panel::LogPanel;
pub use menu::{MenuItem, MenuScreen};
pub use message::MessageDialog;
pub use program_box::ProgramBox;

/// Line helpers shared by the widgets
pub mod utils {
    use ratatui::style::Style;
    use ratatui::text::{Line, Span};
    use unicode_width::UnicodeWidthChar;

    /// `ch` repeated `n` times
    pub fn repeat(ch: char, n: usize) -> String {
        std::iter::repeat(ch).take(n).collect()
    }

    /// Cut a line to at most `width` display columns
    pub fn truncate(line: &Line<'_>, width: usize) -> Line<'static> {
        let mut spans = Vec::new();
        let mut used = 0;
        'outer: for span in &line.spans {
            let mut content = String::new();
            for ch in span.content.chars() {
                let w = ch.width().unwrap_or(0);
                if used + w > width {
                    if !content.is_empty() {
                        spans.push(Span::styled(content, span.style));
                    }
                    break 'outer;
                }
                used += w;
                content.push(ch);
            }
            if !content.is_empty() {
                spans.push(Span::styled(content, span.style));
            }
        }
        Line::from(spans).style(line.style)
    }

    /// Truncate or pad a line to exactly `width` columns
    pub fn fit(line: &Line<'_>, width: usize, fill: Style) -> Line<'static> {
        let mut out = truncate(line, width);
        let pad = width.saturating_sub(out.width());
        if pad > 0 {
            out.spans.push(Span::styled(" ".repeat(pad), fill));
        }
        out
    }

    /// Center a line in `width` columns
    pub fn center(line: &Line<'_>, width: usize, fill: Style) -> Line<'static> {
        let inner = truncate(line, width);
        let free = width.saturating_sub(inner.width());
        let left = free / 2;
        let mut spans = Vec::with_capacity(inner.spans.len() + 2);
        if left > 0 {
            spans.push(Span::styled(" ".repeat(left), fill));
        }
        spans.extend(inner.spans);
        let right = free - left;
        if right > 0 {
            spans.push(Span::styled(" ".repeat(right), fill));
        }
        Line::from(spans)
    }

    /// Scroll position as a whole percentage
    pub fn scroll_percent(offset: usize, total: usize, visible: usize) -> u16 {
        let max = total.saturating_sub(visible);
        if max == 0 {
            return 100;
        }
        let pct = offset.min(max) * 100 / max;
        u16::try_from(pct).unwrap_or(100)
    }

    /// Word-wrap plain text to `width` columns; long words are split
    pub fn wrap(text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut out = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            let mut used = 0;
            for word in paragraph.split_whitespace() {
                let ww = crate::style::markup::display_width(word);
                if used > 0 && used + 1 + ww > width {
                    out.push(std::mem::take(&mut line));
                    used = 0;
                }
                if used > 0 {
                    line.push(' ');
                    used += 1;
                }
                for ch in word.chars() {
                    let cw = ch.width().unwrap_or(0);
                    if used + cw > width {
                        out.push(std::mem::take(&mut line));
                        used = 0;
                    }
                    line.push(ch);
                    used += cw;
                }
            }
            out.push(line);
        }
        out
    }

    /// Convert a usize to u16, saturating
    pub fn to_u16(value: usize) -> u16 {
        u16::try_from(value).unwrap_or(u16::MAX)
    }
}
