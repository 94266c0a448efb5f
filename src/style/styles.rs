//! Resolved panel styles
//!
//! `Styles` is the concrete style table derived from a theme. It is rebuilt
//! whenever the theme is swapped and never mutated afterwards.

use ratatui::style::{Color, Style};

use super::markup::MarkupEngine;
use super::theme::Theme;

/// Shade characters by level (0 = off .. 4 = solid)
pub const SHADE_CHARS: [char; 5] = [' ', '░', '▒', '▓', '█'];
pub const SHADE_CHARS_ASCII: [char; 5] = [' ', '.', ':', '#', '#'];

#[derive(Debug, Clone, PartialEq)]
pub struct Styles {
    // ─────────────────────────────────────────────────────────────────────
    // Backdrop
    // ─────────────────────────────────────────────────────────────────────
    pub screen: Style,
    pub separator: Style,
    pub helpline: Style,
    pub hostname: Style,
    pub app_name: Style,
    pub app_flags: Style,
    pub update_flag: Style,
    pub version_selected: Style,

    // ─────────────────────────────────────────────────────────────────────
    // Dialog chrome
    // ─────────────────────────────────────────────────────────────────────
    pub dialog: Style,
    pub title: Style,
    pub title_help: Style,
    pub title_notice: Style,
    pub title_warn: Style,
    pub title_error: Style,
    pub title_question: Style,
    pub border: Style,
    pub border2: Style,
    pub shadow: Style,
    pub button_active: Style,
    pub button_inactive: Style,

    // ─────────────────────────────────────────────────────────────────────
    // Lists
    // ─────────────────────────────────────────────────────────────────────
    pub item: Style,
    pub item_selected: Style,
    pub tag: Style,
    pub tag_selected: Style,
    pub tag_key: Style,
    pub tag_key_selected: Style,

    // ─────────────────────────────────────────────────────────────────────
    // Output panels
    // ─────────────────────────────────────────────────────────────────────
    pub log_panel: Style,
    pub console: Style,
    pub program_box: Style,
    pub error: Style,
}

impl Styles {
    /// Resolve every panel style from `theme`
    ///
    /// Dialog-scoped styles resolve on top of the dialog style, so a button or
    /// item definition without a background inherits the dialog background.
    pub fn resolve(theme: &Theme) -> Self {
        let engine = MarkupEngine::new(theme);
        let root = Style::default().fg(Color::Reset).bg(Color::Reset);
        let on = |name: &str, base: Style| engine.semantic_style(name, base);

        let screen = on("Theme_Screen", root);
        let dialog = on("Theme_Dialog", root);
        let console = on("Theme_Console", root);

        Self {
            screen,
            separator: on("Theme_Separator", screen),
            helpline: on("Theme_Helpline", screen),
            hostname: on("Theme_Hostname", screen),
            app_name: on("Theme_ApplicationName", screen),
            app_flags: on("Theme_ApplicationFlags", screen),
            update_flag: on("Theme_ApplicationUpdate", screen),
            version_selected: on("Theme_VersionSelected", screen),

            dialog,
            title: on("Theme_Title", dialog),
            title_help: on("Theme_TitleHelp", dialog),
            title_notice: on("Theme_TitleNotice", dialog),
            title_warn: on("Theme_TitleWarn", dialog),
            title_error: on("Theme_TitleError", dialog),
            title_question: on("Theme_TitleQuestion", dialog),
            border: on("Theme_Border", dialog),
            border2: on("Theme_Border2", dialog),
            shadow: on("Theme_Shadow", root),
            button_active: on("Theme_ButtonActive", dialog),
            button_inactive: on("Theme_ButtonInactive", dialog),

            item: on("Theme_Item", dialog),
            item_selected: on("Theme_ItemSelected", dialog),
            tag: on("Theme_Tag", dialog),
            tag_selected: on("Theme_TagSelected", dialog),
            tag_key: on("Theme_TagKey", dialog),
            tag_key_selected: on("Theme_TagKeySelected", dialog),

            log_panel: on("Theme_LogPanel", root),
            console,
            program_box: on("Theme_ProgramBox", root),
            error: on("Theme_Error", dialog),
        }
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::resolve(&Theme::classic())
    }
}
