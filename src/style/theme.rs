//! Themes - named style definitions
//!
//! A theme maps semantic names (`Theme_Dialog`, `Theme_Title`, ...) to a
//! definition. A definition is either a raw direct code such as
//! `black:white:B` or a markup sequence such as `{{[-]}}{{[cyan::B]}}`, which
//! may itself reference other semantic names.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};

/// Resolves a semantic name to its definition
///
/// Names are matched case-insensitively. Returning `None` means the name is
/// unknown, which markup rendering treats as a reset to the base style.
pub trait StyleResolver {
    fn resolve(&self, name: &str) -> Option<&str>;
}

/// A named table of semantic style definitions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Semantic name -> definition; keys are stored lowercased
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Theme {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, definition: &str) -> Self {
        self.set(name, definition);
        self
    }

    pub fn set(&mut self, name: &str, definition: &str) {
        self.entries
            .insert(name.to_ascii_lowercase(), definition.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a theme from a YAML file
    ///
    /// The file carries `name`, optional `description`, and an `entries` map.
    /// Entries missing from the file are filled in from the classic theme so a
    /// partial theme still renders every panel.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StrataError::ThemeError {
            reason: format!("Failed to read theme file {}: {}", path.display(), e),
        })?;
        let parsed: Theme = serde_yaml::from_str(&content).map_err(|e| StrataError::ThemeError {
            reason: format!("Failed to parse theme file {}: {}", path.display(), e),
        })?;

        let mut theme = Theme::classic();
        theme.name = parsed.name;
        theme.description = parsed.description;
        for (key, value) in parsed.entries {
            theme.set(&key, &value);
        }
        Ok(theme)
    }

    /// Look up a built-in theme by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "midnight" => Some(Self::midnight()),
            _ => None,
        }
    }

    /// Resolve a theme argument: built-in name first, then a file path
    pub fn find(name_or_path: &str) -> Result<Self> {
        if let Some(theme) = Self::builtin(name_or_path) {
            return Ok(theme);
        }
        let path = Path::new(name_or_path);
        if path.exists() {
            return Self::load(path);
        }
        Err(StrataError::ThemeError {
            reason: format!("Unknown theme '{}'", name_or_path),
        })
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["classic", "midnight"]
    }

    // ═══════════════════════════════════════════
    // Built-in themes
    // ═══════════════════════════════════════════

    /// Blue screen, light dialogs
    pub fn classic() -> Self {
        Theme::new("classic", "Blue backdrop with light dialogs")
            .with("Theme_Screen", "white:blue:")
            .with("Theme_Dialog", "black:white:")
            .with("Theme_Title", "blue:white:B")
            .with("Theme_TitleHelp", "blue:white:")
            .with("Theme_TitleNotice", "{{[-]}}{{[black:green:B]}}")
            .with("Theme_TitleWarn", "{{[-]}}{{[black:yellow:B]}}")
            .with("Theme_TitleError", "{{[-]}}{{[white:red:B]}}")
            .with("Theme_TitleQuestion", "black:yellow:B")
            .with("Theme_Border", "brightwhite:white:B")
            .with("Theme_Border2", "black:white:")
            .with("Theme_Shadow", "black:black:")
            .with("Theme_ButtonActive", "brightwhite:blue:B")
            .with("Theme_ButtonInactive", "black::")
            .with("Theme_Item", "black::")
            .with("Theme_ItemSelected", "brightwhite:blue:")
            .with("Theme_Tag", "blue::")
            .with("Theme_TagSelected", "brightwhite:blue:B")
            .with("Theme_TagKey", "red::B")
            .with("Theme_TagKeySelected", "brightwhite:blue:B")
            .with("Theme_Helpline", "black:cyan:")
            .with("Theme_Separator", "brightwhite:blue:")
            .with("Theme_Hostname", "::B")
            .with("Theme_ApplicationName", "brightwhite::B")
            .with("Theme_ApplicationFlags", "yellow::")
            .with("Theme_ApplicationUpdate", "yellow::B")
            .with("Theme_VersionSelected", "black:cyan:")
            .with("Theme_LogPanel", "white:black:")
            .with("Theme_Console", "white:black:")
            .with("Theme_ProgramBox", "white:black:")
            .with("Theme_Highlight", "black:yellow:")
            .with("Theme_Notice", "green::B")
            .with("Theme_Warn", "yellow::B")
            .with("Theme_Error", "red::B")
            .with("Theme_Debug", "blue::")
            .with("Theme_ProgressWaiting", "-")
            .with("Theme_ProgressInProgress", "{{|Theme_Warn|}}")
            .with("Theme_ProgressCompleted", "{{|Theme_Notice|}}")
    }

    /// Dark truecolor palette
    pub fn midnight() -> Self {
        Theme::new("midnight", "Dark slate palette with cyan accents")
            .with("Theme_Screen", "#c0c5ce:#101418:")
            .with("Theme_Dialog", "#d8dee9:#2e3440:")
            .with("Theme_Title", "#88c0d0:#2e3440:B")
            .with("Theme_TitleHelp", "#81a1c1:#2e3440:")
            .with("Theme_TitleNotice", "{{[-]}}{{[#2e3440:#a3be8c:B]}}")
            .with("Theme_TitleWarn", "{{[-]}}{{[#2e3440:#ebcb8b:B]}}")
            .with("Theme_TitleError", "{{[-]}}{{[#eceff4:#bf616a:B]}}")
            .with("Theme_TitleQuestion", "#2e3440:#ebcb8b:B")
            .with("Theme_Border", "#4c566a:#2e3440:")
            .with("Theme_Border2", "#3b4252:#2e3440:")
            .with("Theme_Shadow", "#000000:#000000:")
            .with("Theme_ButtonActive", "#2e3440:#88c0d0:B")
            .with("Theme_ButtonInactive", "#d8dee9::")
            .with("Theme_Item", "#d8dee9::")
            .with("Theme_ItemSelected", "#2e3440:#88c0d0:")
            .with("Theme_Tag", "#81a1c1::")
            .with("Theme_TagSelected", "#2e3440:#88c0d0:B")
            .with("Theme_TagKey", "#bf616a::B")
            .with("Theme_TagKeySelected", "#2e3440:#88c0d0:B")
            .with("Theme_Helpline", "#101418:#81a1c1:")
            .with("Theme_Separator", "#4c566a:#101418:")
            .with("Theme_Hostname", "::B")
            .with("Theme_ApplicationName", "#88c0d0::B")
            .with("Theme_ApplicationFlags", "#ebcb8b::")
            .with("Theme_ApplicationUpdate", "#ebcb8b::B")
            .with("Theme_VersionSelected", "#101418:#88c0d0:")
            .with("Theme_LogPanel", "#a0a8b4:#0b0e11:")
            .with("Theme_Console", "#d8dee9:#0b0e11:")
            .with("Theme_ProgramBox", "#d8dee9:#0b0e11:")
            .with("Theme_Highlight", "#2e3440:#ebcb8b:")
            .with("Theme_Notice", "#a3be8c::B")
            .with("Theme_Warn", "#ebcb8b::B")
            .with("Theme_Error", "#bf616a::B")
            .with("Theme_Debug", "#5e81ac::")
            .with("Theme_ProgressWaiting", "-")
            .with("Theme_ProgressInProgress", "{{|Theme_Warn|}}")
            .with("Theme_ProgressCompleted", "{{|Theme_Notice|}}")
    }
}

impl StyleResolver for Theme {
    fn resolve(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let theme = Theme::classic();
        assert_eq!(theme.resolve("theme_dialog"), Some("black:white:"));
        assert_eq!(theme.resolve("THEME_DIALOG"), Some("black:white:"));
        assert_eq!(theme.resolve("Theme_Missing"), None);
    }

    #[test]
    fn test_builtin_themes_define_same_names() {
        let classic = Theme::classic();
        let midnight = Theme::midnight();
        assert_eq!(classic.len(), midnight.len());
        for name in ["Theme_Screen", "Theme_Dialog", "Theme_LogPanel", "Theme_Helpline"] {
            assert!(midnight.resolve(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(Theme::builtin("Classic").is_some());
        assert!(Theme::builtin("neon").is_none());
        assert!(Theme::find("neon").is_err());
    }

    #[test]
    fn test_load_partial_theme_fills_from_classic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mine.yaml");
        fs::write(
            &path,
            "name: mine\nentries:\n  Theme_Screen: \"red:black:\"\n",
        )
        .unwrap();

        let theme = Theme::load(&path).unwrap();
        assert_eq!(theme.name, "mine");
        assert_eq!(theme.resolve("Theme_Screen"), Some("red:black:"));
        assert_eq!(theme.resolve("Theme_Dialog"), Some("black:white:"));
    }

    #[test]
    fn test_load_malformed_theme_is_theme_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "name: [unclosed").unwrap();
        let err = Theme::load(&path).unwrap_err();
        assert!(matches!(err, StrataError::ThemeError { .. }));
    }

    #[test]
    fn test_load_theme_with_malformed_hex_degrades() {
        use crate::style::{MarkupEngine, Styles};
        use ratatui::style::{Color, Style};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odd.yaml");
        fs::write(
            &path,
            "name: odd\nentries:\n  Theme_Bad: \"#a\u{e9}baa:white:\"\n  Theme_Screen: \"#12345:black:\"\n",
        )
        .unwrap();

        let theme = Theme::load(&path).unwrap();
        let styles = Styles::resolve(&theme);
        assert_eq!(styles.screen.bg, Some(Color::Black));

        let base = Style::default().fg(Color::Blue);
        let line = MarkupEngine::new(&theme).render_line("{{|Theme_Bad|}}x", base);
        assert_eq!(line.spans[0].style.fg, Some(Color::Blue));
        assert_eq!(line.spans[0].style.bg, Some(Color::Gray));
    }
}
