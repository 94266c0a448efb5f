//! Direct style codes
//!
//! A direct code is `fg:bg:flags`, each slot optional. `-` alone is a full
//! reset to the caller's base style; `-` inside the fg or bg slot resets only
//! that slot. Flags are single letters: uppercase toggles an attribute,
//! lowercase clears it, `H` brightens, and a leading `-` clears every
//! attribute before the rest apply.

use ratatui::style::{Color, Modifier, Style};

/// One color slot of a direct code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    /// Slot left empty: current value unchanged
    Keep,
    /// `-`: take the base style's value
    Base,
    Set(Color),
}

/// Attribute operations of a direct code, applied in order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlagOps {
    clear_all: bool,
    ops: Vec<FlagOp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagOp {
    Toggle(Modifier),
    Off(Modifier),
    Brighten,
}

/// A parsed direct code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleCode {
    Reset,
    Direct {
        fg: ColorSlot,
        bg: ColorSlot,
        flags: FlagOps,
    },
}

impl StyleCode {
    /// Parse a direct code body (without the surrounding tag delimiters)
    ///
    /// Returns `None` only for an empty body. Unknown colors and flags inside
    /// an otherwise valid code are ignored rather than rejected.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        if code == "-" {
            return Some(StyleCode::Reset);
        }

        let mut parts = code.splitn(3, ':');
        let fg = parse_slot(parts.next().unwrap_or(""));
        let bg = parse_slot(parts.next().unwrap_or(""));
        let flags = parse_flags(parts.next().unwrap_or(""));

        Some(StyleCode::Direct { fg, bg, flags })
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, StyleCode::Reset)
    }

    /// Apply this code onto `current`; resets go back to `base`
    pub fn apply(&self, current: Style, base: Style) -> Style {
        match self {
            StyleCode::Reset => base,
            StyleCode::Direct { fg, bg, flags } => {
                let mut style = current;
                style.fg = match fg {
                    ColorSlot::Keep => style.fg,
                    ColorSlot::Base => base.fg,
                    ColorSlot::Set(c) => Some(*c),
                };
                style.bg = match bg {
                    ColorSlot::Keep => style.bg,
                    ColorSlot::Base => base.bg,
                    ColorSlot::Set(c) => Some(*c),
                };
                flags.apply(style)
            }
        }
    }
}

impl FlagOps {
    fn apply(&self, mut style: Style) -> Style {
        if self.clear_all {
            style.add_modifier = Modifier::empty();
            style.sub_modifier = Modifier::empty();
        }
        for op in &self.ops {
            match *op {
                FlagOp::Toggle(m) => {
                    if style.add_modifier.contains(m) {
                        style = style.remove_modifier(m);
                    } else {
                        style = style.add_modifier(m);
                    }
                }
                FlagOp::Off(m) => style = style.remove_modifier(m),
                FlagOp::Brighten => {
                    style.fg = style.fg.map(brighten);
                    style.bg = style.bg.map(brighten);
                }
            }
        }
        style
    }
}

fn parse_slot(slot: &str) -> ColorSlot {
    match slot.trim() {
        "" => ColorSlot::Keep,
        "-" => ColorSlot::Base,
        other => parse_color(other).map_or(ColorSlot::Keep, ColorSlot::Set),
    }
}

fn parse_flags(flags: &str) -> FlagOps {
    let flags = flags.trim();
    let (clear_all, rest) = match flags.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, flags),
    };

    let ops = rest
        .chars()
        .filter_map(|c| {
            let modifier = match c.to_ascii_uppercase() {
                'B' => Modifier::BOLD,
                'U' => Modifier::UNDERLINED,
                'I' => Modifier::ITALIC,
                'D' => Modifier::DIM,
                'L' => Modifier::SLOW_BLINK,
                'R' => Modifier::REVERSED,
                'S' => Modifier::CROSSED_OUT,
                'H' if c == 'H' => return Some(FlagOp::Brighten),
                _ => return None,
            };
            if c.is_ascii_uppercase() {
                Some(FlagOp::Toggle(modifier))
            } else {
                Some(FlagOp::Off(modifier))
            }
        })
        .collect();

    FlagOps { clear_all, ops }
}

/// Parse a color name or `#rrggbb`
pub fn parse_color(name: &str) -> Option<Color> {
    let lower = name.trim().to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| hex.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok());
        let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
        return Some(Color::Rgb(r, g, b));
    }

    let color = match lower.as_str() {
        "default" | "reset" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::Gray,
        "brightblack" | "gray" | "grey" => Color::DarkGray,
        "brightred" => Color::LightRed,
        "brightgreen" => Color::LightGreen,
        "brightyellow" => Color::LightYellow,
        "brightblue" => Color::LightBlue,
        "brightmagenta" => Color::LightMagenta,
        "brightcyan" => Color::LightCyan,
        "brightwhite" => Color::White,
        _ => return None,
    };
    Some(color)
}

/// RGB approximation used when a named color has to be brightened
fn to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    let rgb = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (205, 0, 0),
        Color::Green => (0, 205, 0),
        Color::Yellow => (205, 205, 0),
        Color::Blue => (0, 0, 238),
        Color::Magenta => (205, 0, 205),
        Color::Cyan => (0, 205, 205),
        Color::Gray => (229, 229, 229),
        Color::DarkGray => (127, 127, 127),
        Color::LightRed => (255, 0, 0),
        Color::LightGreen => (0, 255, 0),
        Color::LightYellow => (255, 255, 0),
        Color::LightBlue => (92, 92, 255),
        Color::LightMagenta => (255, 0, 255),
        Color::LightCyan => (0, 255, 255),
        Color::White => (255, 255, 255),
        _ => return None,
    };
    Some(rgb)
}

/// Brighten by 30% of the remaining headroom on each channel
pub fn brighten(color: Color) -> Color {
    match to_rgb(color) {
        Some((r, g, b)) => {
            let lift = |c: u8| c.saturating_add(((255 - c) as f32 * 0.3) as u8);
            Color::Rgb(lift(r), lift(g), lift(b))
        }
        None => color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> Style {
        Style::default().fg(Color::Black).bg(Color::Blue)
    }

    #[test]
    fn test_parse_full_reset() {
        assert_eq!(StyleCode::parse("-"), Some(StyleCode::Reset));
        assert_eq!(StyleCode::parse("  "), None);
    }

    #[test]
    fn test_apply_sets_fg_and_bg() {
        let code = StyleCode::parse("red:white").unwrap();
        let style = code.apply(base(), base());
        assert_eq!(style.fg, Some(Color::Red));
        assert_eq!(style.bg, Some(Color::Gray));
    }

    #[test]
    fn test_empty_slot_keeps_current() {
        let current = Style::default().fg(Color::Green).bg(Color::Red);
        let style = StyleCode::parse("::B").unwrap().apply(current, base());
        assert_eq!(style.fg, Some(Color::Green));
        assert_eq!(style.bg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_dash_slot_resets_to_base() {
        let current = Style::default().fg(Color::Green).bg(Color::Red);
        let style = StyleCode::parse("-:-").unwrap().apply(current, base());
        assert_eq!(style.fg, base().fg);
        assert_eq!(style.bg, base().bg);
    }

    #[test]
    fn test_uppercase_flag_toggles() {
        let code = StyleCode::parse("::B").unwrap();
        let once = code.apply(base(), base());
        let twice = code.apply(once, base());
        assert!(once.add_modifier.contains(Modifier::BOLD));
        assert!(!twice.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_lowercase_flag_clears() {
        let bold = base().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let style = StyleCode::parse("::b").unwrap().apply(bold, base());
        assert!(!style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_leading_dash_clears_all_flags() {
        let styled = base().add_modifier(Modifier::BOLD | Modifier::ITALIC);
        let style = StyleCode::parse("::-U").unwrap().apply(styled, base());
        assert_eq!(style.add_modifier, Modifier::UNDERLINED);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color("#FF8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("#ff80"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn test_unknown_color_is_ignored() {
        let style = StyleCode::parse("nope:red").unwrap().apply(base(), base());
        assert_eq!(style.fg, Some(Color::Black));
        assert_eq!(style.bg, Some(Color::Red));
    }

    #[test]
    fn test_brighten_moves_toward_white() {
        assert_eq!(brighten(Color::Rgb(0, 100, 255)), Color::Rgb(76, 146, 255));
        assert_eq!(brighten(Color::Reset), Color::Reset);
    }

    #[test]
    fn test_malformed_hex_is_rejected() {
        assert_eq!(parse_color("#a\u{e9}baa"), None);
        assert_eq!(parse_color("#\u{e9}\u{e9}\u{e9}"), None);
        assert_eq!(parse_color("#ff80001"), None);
        assert_eq!(parse_color("#gg0000"), None);
        assert_eq!(parse_color("#"), None);
    }

    #[test]
    fn test_non_ascii_hex_slot_keeps_current() {
        let style = StyleCode::parse("#a\u{e9}baa:white:").unwrap().apply(base(), base());
        assert_eq!(style.fg, Some(Color::Black));
        assert_eq!(style.bg, Some(Color::Gray));
    }

    proptest! {
        #[test]
        fn test_parse_color_never_panics(hex in "#\\PC{0,8}") {
            let _ = parse_color(&hex);
        }

        #[test]
        fn test_parse_code_never_panics(code in "\\PC{0,12}") {
            if let Some(code) = StyleCode::parse(&code) {
                let _ = code.apply(base(), base());
            }
        }
    }
}
