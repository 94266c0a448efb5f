//! SGR escape sequences
//!
//! Conversion between `ratatui` styles and ANSI SGR text, used for
//! non-interactive output and for captured subprocess output.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

pub const RESET: &str = "\x1b[0m";

/// Any sequence that drops the background: full reset, default fg, default bg
static RESET_SEQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[(?:0|39|49)?m").unwrap());

/// SGR sequences (captured) and other CSI sequences that get stripped
static CSI_SEQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[([0-9;?]*)([A-Za-z])").unwrap());

/// Absolute SGR sequence for a style: always starts from a full reset
pub fn sgr(style: Style) -> String {
    let mut params: Vec<String> = vec!["0".to_string()];
    if let Some(fg) = style.fg {
        params.push(color_param(fg, false));
    }
    if let Some(bg) = style.bg {
        params.push(color_param(bg, true));
    }

    let mods = style.add_modifier - style.sub_modifier;
    let table = [
        (Modifier::BOLD, "1"),
        (Modifier::DIM, "2"),
        (Modifier::ITALIC, "3"),
        (Modifier::UNDERLINED, "4"),
        (Modifier::SLOW_BLINK, "5"),
        (Modifier::RAPID_BLINK, "6"),
        (Modifier::REVERSED, "7"),
        (Modifier::HIDDEN, "8"),
        (Modifier::CROSSED_OUT, "9"),
    ];
    for (m, code) in table {
        if mods.contains(m) {
            params.push(code.to_string());
        }
    }

    if params.len() == 1 {
        return RESET.to_string();
    }
    format!("\x1b[{}m", params.join(";"))
}

fn color_param(color: Color, background: bool) -> String {
    let offset = if background { 10 } else { 0 };
    let basic = |n: u8| (n + offset).to_string();
    match color {
        Color::Reset => basic(39),
        Color::Black => basic(30),
        Color::Red => basic(31),
        Color::Green => basic(32),
        Color::Yellow => basic(33),
        Color::Blue => basic(34),
        Color::Magenta => basic(35),
        Color::Cyan => basic(36),
        Color::Gray => basic(37),
        Color::DarkGray => basic(90),
        Color::LightRed => basic(91),
        Color::LightGreen => basic(92),
        Color::LightYellow => basic(93),
        Color::LightBlue => basic(94),
        Color::LightMagenta => basic(95),
        Color::LightCyan => basic(96),
        Color::White => basic(97),
        Color::Indexed(i) => format!("{};5;{}", 38 + offset, i),
        Color::Rgb(r, g, b) => format!("{};2;{};{};{}", 38 + offset, r, g, b),
    }
}

/// Follow every background-dropping reset with the full base style
///
/// Captured program output often ends its own coloring with `ESC[0m`, which
/// would otherwise expose the terminal default background inside a themed
/// panel.
pub fn maintain_background(text: &str, base: Style) -> String {
    let base_code = sgr(base);
    RESET_SEQ
        .replace_all(text, |caps: &regex::Captures| format!("{}{}", &caps[0], base_code))
        .into_owned()
}

/// Remove every CSI escape sequence
pub fn strip_ansi(text: &str) -> String {
    CSI_SEQ.replace_all(text, "").into_owned()
}

/// Parse one line of SGR-colored text into styled spans
///
/// The running style starts at `base` and every reset returns to `base`, so
/// the surrounding background survives resets emitted by the producer.
/// Non-SGR control sequences are dropped.
pub fn parse_ansi(line: &str, base: Style) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current = base;
    let mut last = 0;

    for caps in CSI_SEQ.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            push_text(&mut spans, &line[last..whole.start()], current);
        }
        last = whole.end();
        if &caps[2] == "m" {
            current = apply_sgr(&caps[1], current, base);
        }
    }
    if last < line.len() {
        push_text(&mut spans, &line[last..], current);
    }

    Line::from(spans)
}

fn push_text(spans: &mut Vec<Span<'static>>, text: &str, style: Style) {
    let cleaned: String = text.chars().filter(|c| !c.is_control() || *c == '\t').collect();
    if !cleaned.is_empty() {
        spans.push(Span::styled(cleaned.replace('\t', "    "), style));
    }
}

fn apply_sgr(params: &str, mut style: Style, base: Style) -> Style {
    if params.is_empty() {
        return base;
    }
    let nums: Vec<u16> = params
        .split(';')
        .map(|p| p.parse::<u16>().unwrap_or(0))
        .collect();

    let mut i = 0;
    while i < nums.len() {
        let n = nums[i];
        match n {
            0 => style = base,
            1 => style = style.add_modifier(Modifier::BOLD),
            2 => style = style.add_modifier(Modifier::DIM),
            3 => style = style.add_modifier(Modifier::ITALIC),
            4 => style = style.add_modifier(Modifier::UNDERLINED),
            5 => style = style.add_modifier(Modifier::SLOW_BLINK),
            7 => style = style.add_modifier(Modifier::REVERSED),
            9 => style = style.add_modifier(Modifier::CROSSED_OUT),
            22 => style = style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style = style.remove_modifier(Modifier::ITALIC),
            24 => style = style.remove_modifier(Modifier::UNDERLINED),
            25 => style = style.remove_modifier(Modifier::SLOW_BLINK),
            27 => style = style.remove_modifier(Modifier::REVERSED),
            29 => style = style.remove_modifier(Modifier::CROSSED_OUT),
            30..=37 => style.fg = Some(basic_color(n - 30)),
            39 => style.fg = base.fg,
            40..=47 => style.bg = Some(basic_color(n - 40)),
            49 => style.bg = base.bg,
            90..=97 => style.fg = Some(bright_color(n - 90)),
            100..=107 => style.bg = Some(bright_color(n - 100)),
            38 | 48 => {
                let (color, used) = extended_color(&nums[i + 1..]);
                if let Some(color) = color {
                    if n == 38 {
                        style.fg = Some(color);
                    } else {
                        style.bg = Some(color);
                    }
                }
                i += used;
            }
            _ => {}
        }
        i += 1;
    }
    style
}

fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    match rest {
        [5, idx, ..] => (u8::try_from(*idx).ok().map(Color::Indexed), 2),
        [2, r, g, b, ..] => {
            let c = |v: u16| u8::try_from(v).unwrap_or(u8::MAX);
            (Some(Color::Rgb(c(*r), c(*g), c(*b))), 4)
        }
        _ => (None, rest.len()),
    }
}

fn basic_color(n: u16) -> Color {
    match n {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::Gray,
    }
}

fn bright_color(n: u16) -> Color {
    match n {
        0 => Color::DarkGray,
        1 => Color::LightRed,
        2 => Color::LightGreen,
        3 => Color::LightYellow,
        4 => Color::LightBlue,
        5 => Color::LightMagenta,
        6 => Color::LightCyan,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Style {
        Style::default().fg(Color::Gray).bg(Color::Black)
    }

    #[test]
    fn test_sgr_absolute_sequence() {
        let style = Style::default()
            .fg(Color::Rgb(1, 2, 3))
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD);
        assert_eq!(sgr(style), "\x1b[0;38;2;1;2;3;44;1m");
        assert_eq!(sgr(Style::default()), RESET);
    }

    #[test]
    fn test_maintain_background_after_each_reset() {
        let base_code = sgr(panel());
        let out = maintain_background("\x1b[31mred\x1b[0m plain \x1b[49mx", panel());
        assert_eq!(
            out,
            format!("\x1b[31mred\x1b[0m{base_code} plain \x1b[49m{base_code}x")
        );
    }

    #[test]
    fn test_maintain_background_bare_reset() {
        let out = maintain_background("a\x1b[mb", panel());
        assert_eq!(out, format!("a\x1b[m{}b", sgr(panel())));
    }

    #[test]
    fn test_parse_ansi_reset_returns_to_base() {
        let line = parse_ansi("\x1b[1;31merr\x1b[0m ok", panel());
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content, "err");
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[1].content, " ok");
        assert_eq!(line.spans[1].style, panel());
    }

    #[test]
    fn test_parse_ansi_truecolor_and_indexed() {
        let line = parse_ansi("\x1b[38;2;10;20;30ma\x1b[48;5;200mb", panel());
        assert_eq!(line.spans[0].style.fg, Some(Color::Rgb(10, 20, 30)));
        assert_eq!(line.spans[1].style.bg, Some(Color::Indexed(200)));
    }

    #[test]
    fn test_parse_ansi_drops_cursor_sequences() {
        let line = parse_ansi("\x1b[2Kdone\x1b[1A", panel());
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "done");
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1mhi\x1b[0m"), "hi");
    }
}
