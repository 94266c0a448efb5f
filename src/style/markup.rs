//! Markup Engine - inline style tags
//!
//! Two tag shapes are recognised:
//!
//! - `{{|Name|}}` semantic reference, resolved through a [`StyleResolver`]
//! - `{{[fg:bg:flags]}}` direct code, `{{[-]}}` resets to the base style
//!
//! Rendering keeps a running style that starts at the caller's base style.
//! A reset goes back to that base, never to a blank style, so nested markup
//! keeps the surrounding background.

use once_cell::sync::Lazy;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use regex::Regex;

use super::ansi;
use super::code::StyleCode;
use super::theme::StyleResolver;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(?:\|([A-Za-z0-9_]+)\||\[([A-Za-z0-9_:#\-]*)\])\}\}").unwrap()
});

/// Semantic definitions may reference each other; deeper chains are dropped
const MAX_DEPTH: usize = 8;

/// A tag found in markup text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleTag {
    Semantic(String),
    Direct(String),
}

/// Renders markup against a resolver
#[derive(Clone, Copy)]
pub struct MarkupEngine<'a> {
    resolver: &'a dyn StyleResolver,
}

impl<'a> MarkupEngine<'a> {
    pub fn new(resolver: &'a dyn StyleResolver) -> Self {
        Self { resolver }
    }

    /// Render possibly multi-line markup into styled lines
    pub fn render_text(&self, text: &str, base: Style) -> Text<'static> {
        Text::from(self.render_lines(text, base))
    }

    /// Render markup, splitting on newlines; style carries across lines
    pub fn render_lines(&self, text: &str, base: Style) -> Vec<Line<'static>> {
        let mut lines = vec![Vec::<Span<'static>>::new()];
        self.walk(text, base, |segment, style| {
            let mut parts = segment.split('\n');
            if let Some(first) = parts.next() {
                push_span(&mut lines, first, style);
            }
            for part in parts {
                lines.push(Vec::new());
                push_span(&mut lines, part, style);
            }
        });
        lines.into_iter().map(Line::from).collect()
    }

    /// Render single-line markup; embedded newlines become spaces
    pub fn render_line(&self, text: &str, base: Style) -> Line<'static> {
        let mut spans = Vec::new();
        self.walk(text, base, |segment, style| {
            if !segment.is_empty() {
                spans.push(Span::styled(segment.replace('\n', " "), style));
            }
        });
        Line::from(spans)
    }

    /// Render markup to an SGR string framed by base codes and a final reset
    ///
    /// Background-dropping resets inside the text are repaired afterwards.
    pub fn render_ansi(&self, text: &str, base: Style) -> String {
        let mut out = ansi::sgr(base);
        let mut last = base;
        self.walk(text, base, |segment, style| {
            if segment.is_empty() {
                return;
            }
            if style != last {
                out.push_str(&ansi::sgr(style));
                last = style;
            }
            out.push_str(segment);
        });
        let end = self.final_style(text, base);
        if end != last {
            out.push_str(&ansi::sgr(end));
        }
        out.push_str(ansi::RESET);
        ansi::maintain_background(&out, base)
    }

    /// The running style after every tag in `text` has been applied
    pub fn final_style(&self, text: &str, base: Style) -> Style {
        let mut current = base;
        for tag in tags(text) {
            current = self.apply_tag(&tag, current, base);
        }
        current
    }

    /// Style produced by the first tag in `text`, or `base` when untagged
    pub fn initial_style(&self, text: &str, base: Style) -> Style {
        match tags(text).into_iter().next() {
            Some(tag) => self.apply_tag(&tag, base, base),
            None => base,
        }
    }

    /// Resolve one semantic name onto `base`
    pub fn semantic_style(&self, name: &str, base: Style) -> Style {
        self.apply_tag(&StyleTag::Semantic(name.to_string()), base, base)
    }

    /// Expand a semantic name into its flat list of direct codes
    ///
    /// Unknown names expand to nothing.
    pub fn expand(&self, name: &str) -> Vec<StyleCode> {
        let mut codes = Vec::new();
        self.expand_into(name, 0, &mut codes);
        codes
    }

    fn expand_into(&self, name: &str, depth: usize, codes: &mut Vec<StyleCode>) {
        if depth >= MAX_DEPTH {
            tracing::debug!(name, "semantic style chain too deep, truncated");
            return;
        }
        let Some(definition) = self.resolver.resolve(name) else {
            return;
        };
        if !definition.contains("{{") {
            codes.extend(StyleCode::parse(definition));
            return;
        }
        for tag in tags(definition) {
            match tag {
                StyleTag::Direct(code) => codes.extend(StyleCode::parse(&code)),
                StyleTag::Semantic(inner) => self.expand_into(&inner, depth + 1, codes),
            }
        }
    }

    fn apply_tag(&self, tag: &StyleTag, current: Style, base: Style) -> Style {
        match tag {
            StyleTag::Direct(code) => match StyleCode::parse(code) {
                Some(code) => code.apply(current, base),
                None => current,
            },
            StyleTag::Semantic(name) => {
                let mut codes = self.expand(name);
                if codes.is_empty() {
                    return base;
                }
                let applied_before_reset = codes[..codes.len() - 1].iter().any(|c| !c.is_reset());
                if codes.len() > 1 && applied_before_reset {
                    if let Some(last) = codes.last() {
                        if last.is_reset() {
                            codes.pop();
                        }
                    }
                }
                codes.iter().fold(current, |style, code| code.apply(style, base))
            }
        }
    }

    /// Scan `text`, calling `emit` for each untagged segment with its style
    fn walk(&self, text: &str, base: Style, mut emit: impl FnMut(&str, Style)) {
        let mut current = base;
        let mut last = 0;
        for caps in TAG.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            emit(&text[last..whole.start()], current);
            last = whole.end();
            if let Some(tag) = tag_from(&caps) {
                current = self.apply_tag(&tag, current, base);
            }
        }
        emit(&text[last..], current);
    }
}

fn push_span(lines: &mut [Vec<Span<'static>>], text: &str, style: Style) {
    if text.is_empty() {
        return;
    }
    if let Some(line) = lines.last_mut() {
        line.push(Span::styled(text.to_string(), style));
    }
}

fn tag_from(caps: &regex::Captures) -> Option<StyleTag> {
    if let Some(name) = caps.get(1) {
        return Some(StyleTag::Semantic(name.as_str().to_string()));
    }
    caps.get(2).map(|c| StyleTag::Direct(c.as_str().to_string()))
}

/// All tags in `text`, in order
pub fn tags(text: &str) -> Vec<StyleTag> {
    TAG.captures_iter(text).filter_map(|c| tag_from(&c)).collect()
}

/// Strip every tag, leaving the visible text
pub fn plain_text(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Display width of markup once tags are stripped
pub fn display_width(text: &str) -> usize {
    use unicode_width::UnicodeWidthStr;
    plain_text(text).width()
}

/// Wrap a semantic name into tag syntax
pub fn semantic(name: &str) -> String {
    format!("{{{{|{}|}}}}", name)
}

pub const RESET_TAG: &str = "{{[-]}}";
