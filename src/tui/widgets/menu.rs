//! Data-driven menu screen
//!
//! A framed list of tagged items above a Select/Back/Exit button row. The
//! item list and the button row are separate panels. Tab belongs to the
//! global focus ring, so panel focus follows arrow keys and clicks.

use std::fmt;

use ratatui::text::{Line, Span};

use super::frame::{ButtonRow, DialogFrame};
use super::scroll::Viewport;
use super::utils::{fit, to_u16};
use crate::style::markup::display_width;
use crate::tui::compositor::Layer;
use crate::tui::component::{Component, Focusable, HelpText, Resizable};
use crate::tui::context::RenderContext;
use crate::tui::focus::{ids, InteractionTarget, PANEL_BUTTONS};
use crate::tui::keymap::Action;
use crate::tui::layout::BUTTON_HEIGHT;
use crate::tui::message::{Msg, Outbox};

const SELECT: usize = 0;
const BACK: usize = 1;
const EXIT: usize = 2;
const LABELS: [&str; 3] = ["Select", "Back", "Exit"];

/// Default help line when an item carries none
const DEFAULT_HELP: &str = "↑/↓ to move, Enter to select, Esc to go back";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub tag: String,
    pub description: String,
    pub help: String,
}

impl MenuItem {
    pub fn new(tag: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            description: description.into(),
            help: String::new(),
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

/// Builds the message sent when an item is selected
pub type SelectFn = Box<dyn Fn(usize, &MenuItem) -> Option<Msg> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Items,
    Buttons,
}

pub struct MenuScreen {
    name: String,
    title: String,
    items: Vec<MenuItem>,
    cursor: usize,
    button: usize,
    panel: Panel,
    viewport: Viewport,
    focused: bool,
    bounds: (u16, u16),
    on_select: SelectFn,
}

impl fmt::Debug for MenuScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuScreen")
            .field("name", &self.name)
            .field("items", &self.items.len())
            .field("cursor", &self.cursor)
            .field("panel", &self.panel)
            .finish()
    }
}

impl MenuScreen {
    /// `name` doubles as the item panel's hit identity
    pub fn new(name: impl Into<String>, title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        let mut viewport = Viewport::new(false);
        viewport.set_total(items.len());
        Self {
            name: name.into(),
            title: title.into(),
            items,
            cursor: 0,
            button: SELECT,
            panel: Panel::Items,
            viewport,
            focused: true,
            bounds: (80, 24),
            on_select: Box::new(|_, _| None),
        }
    }

    pub fn on_select<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, &MenuItem) -> Option<Msg> + Send + 'static,
    {
        self.on_select = Box::new(f);
        self
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&MenuItem> {
        self.items.get(self.cursor)
    }

    pub fn buttons_focused(&self) -> bool {
        self.panel == Panel::Buttons
    }

    fn list_rows(&self) -> u16 {
        // border, buttons
        self.bounds.1.saturating_sub(2 + BUTTON_HEIGHT).max(1)
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.viewport.reveal(self.cursor);
    }

    fn activate(&mut self, out: &mut Outbox) {
        let button = match self.panel {
            Panel::Items => SELECT,
            Panel::Buttons => self.button,
        };
        match button {
            SELECT => {
                if let Some(item) = self.items.get(self.cursor) {
                    tracing::debug!(menu = %self.name, tag = %item.tag, "Menu item selected");
                    if let Some(msg) = (self.on_select)(self.cursor, item) {
                        out.send(msg);
                    }
                }
            }
            BACK => out.send(Msg::NavigateBack),
            EXIT => out.send(Msg::Quit),
            _ => {}
        }
    }

    fn on_key(&mut self, action: Action, out: &mut Outbox) {
        match action {
            Action::Up => self.move_cursor(-1),
            Action::Down => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-(self.viewport.height().max(1) as isize)),
            Action::PageDown => self.move_cursor(self.viewport.height().max(1) as isize),
            Action::Home => self.move_cursor(isize::MIN / 2),
            Action::End => self.move_cursor(isize::MAX / 2),
            Action::Left => {
                self.panel = Panel::Buttons;
                self.button = self.button.checked_sub(1).unwrap_or(LABELS.len() - 1);
            }
            Action::Right => {
                self.panel = Panel::Buttons;
                self.button = (self.button + 1) % LABELS.len();
            }
            Action::Enter | Action::Space => self.activate(out),
            Action::Esc => out.send(Msg::NavigateBack),
            Action::Char(ch) => {
                let ch = ch.to_ascii_lowercase();
                let hit = self.items.iter().position(|item| {
                    item.tag
                        .chars()
                        .next()
                        .is_some_and(|c| c.to_ascii_lowercase() == ch)
                });
                if let Some(index) = hit {
                    self.panel = Panel::Items;
                    self.cursor = index;
                    self.viewport.reveal(index);
                }
            }
            _ => {}
        }
    }

    fn on_hit(&mut self, id: &str, out: &mut Outbox) {
        match InteractionTarget::resolve(id) {
            InteractionTarget::Item { menu, index } if menu == self.name && index < self.items.len() => {
                self.panel = Panel::Items;
                self.cursor = index;
            }
            InteractionTarget::Button(button) => {
                if let Some(index) = ButtonRow::new(&LABELS).index_of(&button) {
                    self.panel = Panel::Buttons;
                    self.button = index;
                    self.activate(out);
                }
            }
            _ => {}
        }
    }

    fn on_wheel(&mut self, up: bool) {
        self.viewport.wheel(up);
        let visible = self.viewport.visible();
        if !visible.is_empty() {
            self.cursor = self.cursor.clamp(visible.start, visible.end - 1);
        }
    }

    fn item_line(&self, ctx: &RenderContext, index: usize, tag_w: usize, width: usize) -> Line<'static> {
        let styles = &ctx.styles;
        let item = &self.items[index];
        let selected = index == self.cursor && self.panel == Panel::Items;
        let (tag_style, key_style, item_style) = if selected {
            (styles.tag_selected, styles.tag_key_selected, styles.item_selected)
        } else {
            (styles.tag, styles.tag_key, styles.item)
        };

        let mut chars = item.tag.chars();
        let first = chars.next().map(String::from).unwrap_or_default();
        let pad = tag_w.saturating_sub(display_width(&item.tag));
        let line = Line::from(vec![
            Span::styled(" ", styles.dialog),
            Span::styled(first, key_style),
            Span::styled(format!("{}{}", chars.as_str(), " ".repeat(pad)), tag_style),
            Span::styled("  ", item_style),
            Span::styled(item.description.clone(), item_style),
        ]);
        fit(&line, width, styles.dialog)
    }
}

impl Component for MenuScreen {
    fn name(&self) -> &str {
        &self.name
    }

    // panel focus survives a return from a submenu
    fn init(&mut self, _out: &mut Outbox) {
        self.viewport.reveal(self.cursor);
    }

    fn update(&mut self, msg: &Msg, out: &mut Outbox) {
        match msg {
            Msg::Key(action) => self.on_key(*action, out),
            Msg::LayerHit { id, .. } => self.on_hit(id, out),
            Msg::LayerWheel { up, .. } => self.on_wheel(*up),
            Msg::FocusPanel(panel) => {
                self.panel = if panel == PANEL_BUTTONS {
                    Panel::Buttons
                } else {
                    Panel::Items
                };
            }
            Msg::ToggleFocused => self.activate(out),
            _ => {}
        }
    }

    fn view(&self, ctx: &RenderContext) -> Layer {
        let (w, h) = self.bounds;
        let tag_w = self.items.iter().map(|i| display_width(&i.tag)).max().unwrap_or(0);
        let desc_w = self.items.iter().map(|i| display_width(&i.description)).max().unwrap_or(0);
        // leading space, gap, trailing space
        let natural = tag_w + desc_w + 4;
        let width = natural.min(usize::from(w.saturating_sub(2)));

        let visible = self.viewport.visible();
        let body: Vec<Line<'static>> = visible
            .clone()
            .map(|i| self.item_line(ctx, i, tag_w, width))
            .collect();

        let active = match self.panel {
            Panel::Items => SELECT,
            Panel::Buttons => self.button,
        };
        let frame = DialogFrame::new(self.title.clone(), ctx.styles.title)
            .body(body)
            .buttons(ButtonRow::new(&LABELS).active(Some(active)))
            .focused(self.focused);
        let (inner_w, _) = frame.inner_size(w, h);

        let hotspots = visible.enumerate().map(|(row, index)| {
            Layer::hotspot(ids::item(&self.name, index), 1, 1 + i32::from(to_u16(row)), inner_w, 1).z(1)
        });
        frame.layer(ctx, &self.name, w, h).with_children(hotspots)
    }

    fn help(&self) -> Option<&dyn HelpText> {
        Some(self)
    }

    fn resizable(&mut self) -> Option<&mut dyn Resizable> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl HelpText for MenuScreen {
    fn help_text(&self) -> String {
        match self.selected() {
            Some(item) if !item.help.is_empty() => item.help.clone(),
            _ => DEFAULT_HELP.to_string(),
        }
    }
}

impl Resizable for MenuScreen {
    fn set_size(&mut self, width: u16, height: u16) {
        self.bounds = (width, height);
        self.viewport.set_height(usize::from(self.list_rows()));
        self.viewport.reveal(self.cursor);
    }
}

impl Focusable for MenuScreen {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::compositor::Compositor;
    use crossterm::event::MouseButton;

    fn menu(n: usize) -> MenuScreen {
        let items = (0..n)
            .map(|i| MenuItem::new(format!("{}item", (b'a' + i as u8) as char), format!("Item number {i}")))
            .collect();
        let mut m = MenuScreen::new("main", "Main", items)
            .on_select(|i, _| Some(Msg::HeaderFlags(vec![format!("picked {i}")])));
        m.set_size(40, 10);
        m
    }

    fn send(m: &mut MenuScreen, msg: Msg) -> Vec<Msg> {
        let mut out = Outbox::new();
        m.update(&msg, &mut out);
        out.drain().collect()
    }

    #[test]
    fn test_cursor_clamps() {
        let mut m = menu(3);
        send(&mut m, Msg::Key(Action::Up));
        assert_eq!(m.cursor(), 0);
        send(&mut m, Msg::Key(Action::End));
        assert_eq!(m.cursor(), 2);
        send(&mut m, Msg::Key(Action::Down));
        assert_eq!(m.cursor(), 2);
    }

    #[test]
    fn test_enter_selects_current_item() {
        let mut m = menu(3);
        send(&mut m, Msg::Key(Action::Down));
        let msgs = send(&mut m, Msg::Key(Action::Enter));
        assert!(matches!(msgs.as_slice(), [Msg::HeaderFlags(f)] if f[0] == "picked 1"));
    }

    #[test]
    fn test_buttons_back_and_exit() {
        let mut m = menu(3);
        send(&mut m, Msg::Key(Action::Right));
        assert!(m.buttons_focused());
        assert!(matches!(send(&mut m, Msg::Key(Action::Enter)).as_slice(), [Msg::NavigateBack]));
        let hit = Msg::LayerHit {
            id: "btn-exit".to_string(),
            button: MouseButton::Left,
        };
        assert!(matches!(send(&mut m, hit).as_slice(), [Msg::Quit]));
    }

    #[test]
    fn test_item_click_moves_cursor() {
        let mut m = menu(5);
        let hit = Msg::LayerHit {
            id: "item-main-3".to_string(),
            button: MouseButton::Left,
        };
        assert!(send(&mut m, hit).is_empty());
        assert_eq!(m.cursor(), 3);
        // other menus are ignored
        let foreign = Msg::LayerHit {
            id: "item-other-1".to_string(),
            button: MouseButton::Left,
        };
        send(&mut m, foreign);
        assert_eq!(m.cursor(), 3);
    }

    #[test]
    fn test_wheel_scrolls_and_keeps_cursor_visible() {
        let mut m = menu(12);
        // 10 rows - 2 border - 3 buttons = 5 list rows
        let wheel = |up| Msg::LayerWheel {
            id: "main".to_string(),
            up,
        };
        send(&mut m, wheel(false));
        assert_eq!(m.cursor(), 3);
        assert_eq!(m.viewport.visible(), 3..8);
    }

    #[test]
    fn test_middle_click_path_activates_focused_panel() {
        let mut m = menu(3);
        send(&mut m, Msg::FocusPanel("buttons".to_string()));
        assert!(m.buttons_focused());
        assert!(matches!(
            send(&mut m, Msg::ToggleFocused).as_slice(),
            [Msg::HeaderFlags(_)]
        ));
        send(&mut m, Msg::FocusPanel("main".to_string()));
        assert!(!m.buttons_focused());
    }

    #[test]
    fn test_reentry_keeps_panel_and_cursor() {
        let mut m = menu(3);
        send(&mut m, Msg::Key(Action::End));
        send(&mut m, Msg::Key(Action::Left));
        assert!(m.buttons_focused());

        m.init(&mut Outbox::new());
        assert!(m.buttons_focused());
        assert_eq!(m.cursor(), 2);
        assert!(matches!(send(&mut m, Msg::Key(Action::Enter)).as_slice(), [Msg::Quit]));
    }

    #[test]
    fn test_tag_hotkey() {
        let mut m = menu(4);
        send(&mut m, Msg::Key(Action::Char('C')));
        assert_eq!(m.cursor(), 2);
    }

    #[test]
    fn test_item_hotspots_cover_visible_rows() {
        let ctx = RenderContext::default();
        let m = menu(12);
        let regions = Compositor::new(80, 24).regions(&[m.view(&ctx)]);
        let items: Vec<_> = regions
            .iter()
            .filter(|r| r.id.starts_with("item-main-"))
            .collect();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].rect.y, 1);
        assert!(regions.iter().any(|r| r.id == "btn-select"));
    }

    #[test]
    fn test_item_help_text() {
        let items = vec![MenuItem::new("a", "A").help("Does A"), MenuItem::new("b", "B")];
        let mut m = MenuScreen::new("m", "M", items);
        assert_eq!(m.help_text(), "Does A");
        send(&mut m, Msg::Key(Action::Down));
        assert_eq!(m.help_text(), DEFAULT_HELP);
    }
}
