//! Focus ring and interaction targets
//!
//! Keyboard focus cycles content -> log panel -> header slot A -> header slot
//! B -> content. Mouse input resolves a hit identity into an
//! [`InteractionTarget`], and that same target decides where focus lands, so
//! clicks and the Tab ring can never disagree about who owns input.

/// Who currently owns keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusTarget {
    #[default]
    Screen,
    Dialog,
    LogPanel,
    HeaderSlotA,
    HeaderSlotB,
    None,
}

impl FocusTarget {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Dialog => "dialog",
            Self::LogPanel => "log",
            Self::HeaderSlotA => "header-a",
            Self::HeaderSlotB => "header-b",
            Self::None => "none",
        }
    }

    pub fn is_content(&self) -> bool {
        matches!(self, Self::Screen | Self::Dialog | Self::None)
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Self::HeaderSlotA | Self::HeaderSlotB)
    }

    pub fn header_slot(&self) -> Option<HeaderSlot> {
        match self {
            Self::HeaderSlotA => Some(HeaderSlot::App),
            Self::HeaderSlotB => Some(HeaderSlot::Template),
            _ => None,
        }
    }
}

/// The two focusable header widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderSlot {
    /// Application version (slot A)
    App,
    /// Template version (slot B)
    Template,
}

impl HeaderSlot {
    pub fn hit_id(&self) -> &'static str {
        match self {
            Self::App => ids::APP_VERSION,
            Self::Template => ids::TMPL_VERSION,
        }
    }

    pub fn focus_target(&self) -> FocusTarget {
        match self {
            Self::App => FocusTarget::HeaderSlotA,
            Self::Template => FocusTarget::HeaderSlotB,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::App => Self::Template,
            Self::Template => Self::App,
        }
    }
}

/// Well-known hit identities
pub mod ids {
    pub const LOG_PANEL: &str = "log_panel";
    pub const LOG_TOGGLE: &str = "log_toggle";
    pub const LOG_RESIZE: &str = "log_resize";
    pub const LOG_VIEWPORT: &str = "log_viewport";
    pub const APP_VERSION: &str = "app_version";
    pub const TMPL_VERSION: &str = "tmpl_version";
    pub const BACKDROP: &str = "backdrop";

    pub const BUTTON_PREFIX: &str = "btn-";
    pub const ITEM_PREFIX: &str = "item-";

    pub fn button(label: &str) -> String {
        format!("{}{}", BUTTON_PREFIX, label.to_ascii_lowercase())
    }

    pub fn item(menu: &str, index: usize) -> String {
        format!("{}{}-{}", ITEM_PREFIX, menu, index)
    }
}

/// Logical owner of a hit identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionTarget {
    LogToggle,
    LogResize,
    /// Log strip or viewport
    LogPanel,
    Header(HeaderSlot),
    /// `btn-*` or `*_button`
    Button(String),
    /// `item-{menu}-{index}`
    Item { menu: String, index: usize },
    Backdrop,
    /// Any other identity drawn by a screen or dialog
    Content(String),
}

impl InteractionTarget {
    /// Map a hit identity to its owner
    pub fn resolve(id: &str) -> Self {
        match id {
            ids::LOG_TOGGLE => return Self::LogToggle,
            ids::LOG_RESIZE => return Self::LogResize,
            ids::LOG_PANEL | ids::LOG_VIEWPORT => return Self::LogPanel,
            ids::APP_VERSION => return Self::Header(HeaderSlot::App),
            ids::TMPL_VERSION => return Self::Header(HeaderSlot::Template),
            ids::BACKDROP => return Self::Backdrop,
            _ => {}
        }
        if id.starts_with(ids::BUTTON_PREFIX) || id.ends_with("_button") {
            return Self::Button(id.to_string());
        }
        if let Some(rest) = id.strip_prefix(ids::ITEM_PREFIX) {
            if let Some((menu, index)) = rest.rsplit_once('-') {
                if let Ok(index) = index.parse() {
                    return Self::Item {
                        menu: menu.to_string(),
                        index,
                    };
                }
            }
        }
        Self::Content(id.to_string())
    }

    /// Focus target a direct click or scroll over this owner selects
    pub fn focus_target(&self, has_dialog: bool) -> FocusTarget {
        let content = if has_dialog {
            FocusTarget::Dialog
        } else {
            FocusTarget::Screen
        };
        match self {
            Self::LogToggle | Self::LogResize | Self::LogPanel => FocusTarget::LogPanel,
            Self::Header(slot) => slot.focus_target(),
            Self::Button(_) | Self::Item { .. } | Self::Content(_) | Self::Backdrop => content,
        }
    }

    /// Panel inside the owning component that should take focus
    pub fn panel(&self) -> Option<String> {
        match self {
            Self::Item { menu, .. } => Some(menu.clone()),
            Self::Button(_) => Some(PANEL_BUTTONS.to_string()),
            _ => None,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self, Self::Button(_))
    }
}

/// Panel name components use for their button row
pub const PANEL_BUTTONS: &str = "buttons";

/// Focus ring state
#[derive(Debug, Clone)]
pub struct FocusCycle {
    current: FocusTarget,
    /// Content target the ring returns to
    content: FocusTarget,
}

impl Default for FocusCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusCycle {
    pub fn new() -> Self {
        Self {
            current: FocusTarget::Screen,
            content: FocusTarget::Screen,
        }
    }

    pub fn current(&self) -> FocusTarget {
        self.current
    }

    /// Content target the ring returns to
    pub fn content(&self) -> FocusTarget {
        self.content
    }

    /// Track which content surface is on top
    ///
    /// Called after every structural change. A dialog always outranks the
    /// screen; with neither present the content target is `None`.
    pub fn sync_content(&mut self, has_dialog: bool, has_screen: bool) {
        let content = if has_dialog {
            FocusTarget::Dialog
        } else if has_screen {
            FocusTarget::Screen
        } else {
            FocusTarget::None
        };
        self.content = content;
        if self.current.is_content() {
            self.current = content;
        }
    }

    /// Forward ring step
    pub fn next(&mut self) {
        self.current = match self.current {
            FocusTarget::Screen | FocusTarget::Dialog | FocusTarget::None => FocusTarget::LogPanel,
            FocusTarget::LogPanel => FocusTarget::HeaderSlotA,
            FocusTarget::HeaderSlotA => FocusTarget::HeaderSlotB,
            FocusTarget::HeaderSlotB => self.content,
        };
    }

    /// Backward ring step
    pub fn prev(&mut self) {
        self.current = match self.current {
            FocusTarget::Screen | FocusTarget::Dialog | FocusTarget::None => FocusTarget::HeaderSlotB,
            FocusTarget::HeaderSlotB => FocusTarget::HeaderSlotA,
            FocusTarget::HeaderSlotA => FocusTarget::LogPanel,
            FocusTarget::LogPanel => self.content,
        };
    }

    /// Direct focus from a click, scroll or shortcut
    pub fn focus(&mut self, target: FocusTarget) {
        if target.is_content() {
            self.current = self.content;
        } else {
            self.current = target;
        }
    }

    pub fn return_to_content(&mut self) {
        self.current = self.content;
    }

    pub fn is_log_focused(&self) -> bool {
        self.current == FocusTarget::LogPanel
    }

    pub fn header_slot(&self) -> Option<HeaderSlot> {
        self.current.header_slot()
    }
}
