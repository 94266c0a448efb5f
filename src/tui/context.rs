//! Render context
//!
//! Theme, resolved styles and UI options for one frame. The loop takes a
//! snapshot at the start of every render and passes it down explicitly;
//! reconfiguration swaps the whole context behind [`ContextHandle`].

use std::sync::Arc;

use parking_lot::RwLock;
use ratatui::style::Style;
use ratatui::text::Line;

use super::layout::LayoutBudget;
use crate::config::UiConfig;
use crate::style::styles::{SHADE_CHARS, SHADE_CHARS_ASCII};
use crate::style::{MarkupEngine, Styles, Theme};

/// Box-drawing set for borders and separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    /// Connectors around an embedded label: `┤label├`
    pub label_left: char,
    pub label_right: char,
    /// Connectors used while the box has focus: `┫label┣`
    pub focus_left: char,
    pub focus_right: char,
    pub separator: char,
    /// Heavy separator for focused strips
    pub thick: char,
}

impl BorderChars {
    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
        label_left: '┤',
        label_right: '├',
        focus_left: '┫',
        focus_right: '┣',
        separator: '─',
        thick: '━',
    };

    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
        label_left: '|',
        label_right: '|',
        focus_left: 'H',
        focus_right: 'H',
        separator: '-',
        thick: '=',
    };
}

/// Read-only inputs for one render pass
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub theme: Arc<Theme>,
    pub styles: Styles,
    pub ui: UiConfig,
}

impl RenderContext {
    pub fn new(theme: Theme, ui: UiConfig) -> Self {
        let styles = Styles::resolve(&theme);
        Self {
            theme: Arc::new(theme),
            styles,
            ui,
        }
    }

    pub fn markup(&self) -> MarkupEngine<'_> {
        MarkupEngine::new(self.theme.as_ref())
    }

    /// Render one line of markup over `base`
    pub fn line(&self, markup: &str, base: Style) -> Line<'static> {
        self.markup().render_line(markup, base)
    }

    pub fn budget(&self, header_height: u16) -> LayoutBudget {
        LayoutBudget::new(self.ui.shadow, header_height)
    }

    pub fn borders(&self) -> BorderChars {
        if self.ui.line_characters {
            BorderChars::ROUNDED
        } else {
            BorderChars::ASCII
        }
    }

    /// Shadow glyph for the configured shade level
    pub fn shade_char(&self) -> char {
        let level = usize::from(self.ui.shadow_level.min(4));
        if self.ui.line_characters {
            SHADE_CHARS[level]
        } else {
            SHADE_CHARS_ASCII[level]
        }
    }

    /// Same options with another theme
    pub fn with_theme(&self, theme: Theme) -> Self {
        Self::new(theme, self.ui.clone())
    }

    /// Same theme with other options
    pub fn with_ui(&self, ui: UiConfig) -> Self {
        Self {
            theme: Arc::clone(&self.theme),
            styles: self.styles.clone(),
            ui,
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Theme::classic(), UiConfig::default())
    }
}

/// Process-wide swappable reference to the current context
///
/// Readers take a cheap `Arc` snapshot; writers replace the whole context.
/// Nothing mutates a published context in place.
#[derive(Debug, Clone, Default)]
pub struct ContextHandle {
    inner: Arc<RwLock<Arc<RenderContext>>>,
}

impl ContextHandle {
    pub fn new(ctx: RenderContext) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(ctx))),
        }
    }

    pub fn snapshot(&self) -> Arc<RenderContext> {
        Arc::clone(&self.inner.read())
    }

    pub fn swap(&self, ctx: RenderContext) {
        *self.inner.write() = Arc::new(ctx);
    }

    pub fn set_theme(&self, theme: Theme) {
        let next = self.snapshot().with_theme(theme);
        self.swap(next);
    }

    pub fn set_ui(&self, ui: UiConfig) {
        let next = self.snapshot().with_ui(ui);
        self.swap(next);
    }
}
