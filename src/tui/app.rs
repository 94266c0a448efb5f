//! Root controller
//!
//! Owns the backdrop, the log panel, the navigation and dialog stacks, the
//! focus ring and the frame's hit regions. Terminal events come in through
//! [`App::handle_event`]; everything else arrives as a [`Msg`] and is fully
//! processed, including any messages it emits, before `update` returns.

use std::collections::VecDeque;

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::component::Component;
use super::compositor::{z, Compositor, Layer};
use super::context::{ContextHandle, RenderContext};
use super::executor::TaskExecutor;
use super::focus::{FocusCycle, FocusTarget, HeaderSlot, InteractionTarget, PANEL_BUTTONS};
use super::hit::HitRegistry;
use super::keymap::{action_for, Action};
use super::layout::MIN_TERMINAL;
use super::message::{DialogResult, Msg, Outbox};
use super::widgets::{Backdrop, ConfirmDialog, HelpDialog, LogPanel, MessageDialog, ProgramBox};
use crate::style::Theme;

/// Receives a dialog's result once it closes
pub type Waiter = Box<dyn FnOnce(DialogResult) + Send>;

/// Runs when Enter is pressed on a focused header slot
pub type HeaderActionFn = Box<dyn FnMut(HeaderSlot, &mut Outbox) + Send>;

struct DialogEntry {
    dialog: Box<dyn Component>,
    waiter: Option<Waiter>,
}

/// Z of the dialog at `index` in the stack (0 = bottom)
pub fn dialog_z(index: usize) -> i32 {
    match index {
        0 => z::DIALOG,
        i => z::OVERLAY + 10 * i32::try_from(i - 1).unwrap_or(0),
    }
}

pub struct App {
    ctx: ContextHandle,
    executor: TaskExecutor,
    backdrop: Backdrop,
    log: LogPanel,
    screen: Option<Box<dyn Component>>,
    history: Vec<Box<dyn Component>>,
    dialogs: Vec<DialogEntry>,
    focus: FocusCycle,
    hits: HitRegistry,
    on_header: Option<HeaderActionFn>,
    size: (u16, u16),
    ready: bool,
    quit: bool,
    fatal: bool,
}

impl App {
    /// `tx` is the event loop's own message queue; task output is sent there
    pub fn new(ctx: ContextHandle, backdrop: Backdrop, tx: mpsc::UnboundedSender<Msg>) -> Self {
        let log_height = ctx.snapshot().ui.log_panel_height;
        Self {
            ctx,
            executor: TaskExecutor::new(tx),
            backdrop,
            log: LogPanel::new(log_height),
            screen: None,
            history: Vec::new(),
            dialogs: Vec::new(),
            focus: FocusCycle::new(),
            hits: HitRegistry::new(),
            on_header: None,
            size: (80, 24),
            ready: false,
            quit: false,
            fatal: false,
        }
    }

    pub fn on_header_action<F>(mut self, f: F) -> Self
    where
        F: FnMut(HeaderSlot, &mut Outbox) + Send + 'static,
    {
        self.on_header = Some(Box::new(f));
        self
    }

    /// Show the first screen; from here on an empty UI means exit
    pub fn start(&mut self, screen: Box<dyn Component>) {
        self.update(Msg::Navigate(screen));
        self.ready = true;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Sticky: set by force-quit
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus.current()
    }

    pub fn screen_name(&self) -> Option<&str> {
        self.screen.as_ref().map(|s| s.name())
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Dialog names, bottom first
    pub fn dialog_names(&self) -> Vec<&str> {
        self.dialogs.iter().map(|d| d.dialog.name()).collect()
    }

    pub fn log_panel(&self) -> &LogPanel {
        &self.log
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn hits(&self) -> &HitRegistry {
        &self.hits
    }

    pub fn context(&self) -> &ContextHandle {
        &self.ctx
    }

    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    // ─────────────────────────────────────────────────────────────────────
    // Message processing
    // ─────────────────────────────────────────────────────────────────────

    /// Process `msg` and everything it emits, in order
    pub fn update(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        let mut out = Outbox::new();
        while let Some(msg) = queue.pop_front() {
            if !matches!(msg, Msg::Tick | Msg::LogLine(_) | Msg::TaskOutput { .. }) {
                debug!(msg = ?msg, "update");
            }
            self.dispatch(msg, &mut out);
            queue.extend(out.drain());
            self.sync();
        }
        if self.ready && self.screen.is_none() && self.dialogs.is_empty() {
            self.quit = true;
        }
    }

    /// Translate a raw terminal event
    pub fn handle_event(&mut self, event: Event) {
        let mut out = Outbox::new();
        match event {
            Event::Key(key) => self.route_key(key, &mut out),
            Event::Mouse(mouse) => self.route_mouse(mouse, &mut out),
            Event::Resize(width, height) => out.send(Msg::Resize { width, height }),
            _ => {}
        }
        self.sync();
        for msg in out.drain() {
            self.update(msg);
        }
    }

    fn dispatch(&mut self, msg: Msg, out: &mut Outbox) {
        match msg {
            msg @ (Msg::Key(_)
            | Msg::LayerHit { .. }
            | Msg::LayerWheel { .. }
            | Msg::FocusPanel(_)
            | Msg::ToggleFocused
            | Msg::Tick) => self.deliver(&msg, out),
            Msg::Resize { width, height } => {
                self.size = (width.max(MIN_TERMINAL.0), height.max(MIN_TERMINAL.1));
                self.layout();
            }

            Msg::Navigate(screen) => self.navigate(screen, out),
            Msg::NavigateBack => self.navigate_back(out),
            Msg::FinalizeSelection(dialog) => {
                self.navigate_back(out);
                self.show_dialog(dialog, None, out);
            }

            Msg::ShowDialog(dialog) => self.show_dialog(dialog, None, out),
            Msg::ShowConfirm {
                title,
                question,
                default_yes,
                reply,
            } => {
                let waiter: Option<Waiter> = reply.map(|tx| {
                    Box::new(move |result: DialogResult| {
                        // worker may have given up waiting
                        let _ = tx.send(result.as_bool());
                    }) as Waiter
                });
                let dialog = ConfirmDialog::new(title, question, default_yes);
                self.show_dialog(Box::new(dialog), waiter, out);
            }
            Msg::ShowMessage { title, message, kind } => {
                self.show_dialog(Box::new(MessageDialog::new(title, message, kind)), None, out);
            }
            Msg::CloseDialog(result) => self.close_dialog(result, out),
            Msg::ShowHelp => {
                let open = self.dialogs.last().is_some_and(|d| d.dialog.name() == "help");
                if !open {
                    self.show_dialog(Box::new(HelpDialog::new()), None, out);
                }
            }

            Msg::UpdateHeader {
                slot,
                version,
                update_available,
            } => self.backdrop.header.set_slot(slot, version, update_available),
            Msg::HeaderFlags(flags) => self.backdrop.header.set_flags(flags),
            Msg::HeaderAction(slot) => match self.on_header.as_mut() {
                Some(f) => f(slot, out),
                None => debug!(slot = slot.hit_id(), "No header action registered"),
            },
            Msg::ToggleLogPanel => {
                self.log.toggle();
                self.layout();
            }
            Msg::LogLine(line) => self.log.push(&line),
            Msg::ConfigChanged(config) => {
                let current = self.ctx.snapshot();
                if config.ui.theme != current.theme.name {
                    match Theme::find(&config.ui.theme) {
                        Ok(theme) => self.ctx.swap(RenderContext::new(theme, config.ui.clone())),
                        Err(e) => {
                            warn!(error = %e, "Keeping current theme");
                            self.ctx.set_ui(config.ui.clone());
                        }
                    }
                } else {
                    self.ctx.set_ui(config.ui.clone());
                }
                info!("Configuration reloaded");
                self.layout();
            }
            Msg::ThemeChanged(theme) => {
                info!(theme = %theme.name, "Theme changed");
                self.ctx.set_theme(theme);
            }

            Msg::RunTask(request) => {
                let handle = self.executor.spawn(request.task);
                let program = ProgramBox::new(request.title, handle)
                    .subtitle(request.subtitle)
                    .auto_exit(request.auto_exit);
                self.show_dialog(Box::new(program), None, out);
            }
            msg @ (Msg::TaskOutput { .. } | Msg::TaskDone { .. }) => self.broadcast(&msg, out),

            Msg::Quit => self.quit = true,
            Msg::ForceQuit => {
                warn!("Force quit requested");
                self.fatal = true;
                self.quit = true;
                self.executor.cancel_all();
            }
        }
    }

    /// The component currently receiving content input
    fn active(&mut self) -> Option<&mut Box<dyn Component>> {
        match self.dialogs.last_mut() {
            Some(entry) => Some(&mut entry.dialog),
            None => self.screen.as_mut(),
        }
    }

    fn deliver(&mut self, msg: &Msg, out: &mut Outbox) {
        if let Some(component) = self.active() {
            component.update(msg, out);
        }
    }

    /// Task traffic reaches every live component, not just the top one
    fn broadcast(&mut self, msg: &Msg, out: &mut Outbox) {
        for entry in &mut self.dialogs {
            entry.dialog.update(msg, out);
        }
        if let Some(screen) = self.screen.as_mut() {
            screen.update(msg, out);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stacks
    // ─────────────────────────────────────────────────────────────────────

    fn navigate(&mut self, mut screen: Box<dyn Component>, out: &mut Outbox) {
        debug!(screen = screen.name(), "Navigate");
        screen.init(out);
        if let Some(previous) = self.screen.replace(screen) {
            self.history.push(previous);
        }
        self.layout();
    }

    fn navigate_back(&mut self, out: &mut Outbox) {
        self.screen = self.history.pop();
        if let Some(screen) = self.screen.as_mut() {
            debug!(screen = screen.name(), "Navigate back");
            screen.init(out);
        }
        self.layout();
    }

    fn show_dialog(&mut self, mut dialog: Box<dyn Component>, waiter: Option<Waiter>, out: &mut Outbox) {
        debug!(dialog = dialog.name(), depth = self.dialogs.len(), "Show dialog");
        dialog.init(out);
        self.dialogs.push(DialogEntry { dialog, waiter });
        self.focus.sync_content(true, self.screen.is_some());
        self.focus.return_to_content();
        self.layout();
    }

    fn close_dialog(&mut self, result: DialogResult, out: &mut Outbox) {
        let Some(entry) = self.dialogs.pop() else {
            debug!("Close with no dialog open");
            return;
        };
        debug!(dialog = entry.dialog.name(), result = ?result, "Close dialog");
        if let Some(waiter) = entry.waiter {
            waiter(result);
        }
        if let Some(top) = self.dialogs.last_mut() {
            top.dialog.init(out);
        }
        self.layout();
    }

    /// Propagate focus state to the log panel and components
    fn sync(&mut self) {
        self.focus
            .sync_content(!self.dialogs.is_empty(), self.screen.is_some());
        let current = self.focus.current();
        self.log.set_focused(current == FocusTarget::LogPanel);

        let top = self.dialogs.len().saturating_sub(1);
        for (i, entry) in self.dialogs.iter_mut().enumerate() {
            if let Some(f) = entry.dialog.focusable() {
                f.set_focused(i == top && current == FocusTarget::Dialog);
            }
        }
        if let Some(f) = self.screen.as_mut().and_then(|s| s.focusable()) {
            f.set_focused(current == FocusTarget::Screen);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Input routing
    // ─────────────────────────────────────────────────────────────────────

    fn captures_input(&self) -> bool {
        self.dialogs.last().is_some_and(|d| d.dialog.captures_input())
    }

    fn route_key(&mut self, key: KeyEvent, out: &mut Outbox) {
        let action = action_for(key);
        if action == Action::None {
            return;
        }
        if self.captures_input() {
            out.send(Msg::Key(action));
            return;
        }

        match action {
            Action::ToggleLog => return out.send(Msg::ToggleLogPanel),
            Action::Help => return out.send(Msg::ShowHelp),
            Action::ForceQuit => return out.send(Msg::ForceQuit),
            Action::ChromeFocus => return self.focus.focus(FocusTarget::HeaderSlotA),
            Action::Tab => return self.focus.next(),
            Action::ShiftTab => return self.focus.prev(),
            _ => {}
        }

        if let Some(slot) = self.focus.header_slot() {
            match action {
                Action::Left | Action::Right => self.focus.focus(slot.other().focus_target()),
                Action::Esc => self.focus.return_to_content(),
                Action::Enter => out.send(Msg::HeaderAction(slot)),
                _ => {}
            }
            return;
        }

        if self.focus.is_log_focused() {
            match action {
                Action::Esc => self.focus.return_to_content(),
                Action::Enter | Action::Space => out.send(Msg::ToggleLogPanel),
                other => {
                    self.log.handle_action(other);
                }
            }
            return;
        }

        out.send(Msg::Key(action));
    }

    fn route_mouse(&mut self, mouse: MouseEvent, out: &mut Outbox) {
        let (x, y) = (mouse.column, mouse.row);

        if self.log.is_dragging() {
            match mouse.kind {
                MouseEventKind::Drag(MouseButton::Left) => {
                    self.log.drag_to(y);
                    self.layout();
                }
                MouseEventKind::Up(_) => self.log.end_drag(),
                _ => {}
            }
            return;
        }

        let wheel = match mouse.kind {
            MouseEventKind::ScrollUp => Some(true),
            MouseEventKind::ScrollDown => Some(false),
            _ => None,
        };

        if self.focus.is_log_focused() {
            if let Some(up) = wheel {
                return self.log.wheel(up);
            }
            if mouse.kind == MouseEventKind::Down(MouseButton::Middle) {
                return out.send(Msg::ToggleLogPanel);
            }
        }

        if self.captures_input() {
            if let MouseEventKind::Down(button) = mouse.kind {
                let id = self.hits.find_id(x, y).unwrap_or_default().to_string();
                out.send(Msg::LayerHit { id, button });
            }
            return;
        }

        let Some(id) = self.hits.find_id(x, y).map(str::to_string) else {
            return;
        };
        let target = InteractionTarget::resolve(&id);
        let has_dialog = !self.dialogs.is_empty();

        if let Some(up) = wheel {
            return self.route_wheel(id, target, up, out);
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Middle) => {
                self.focus.focus(target.focus_target(has_dialog));
                match target {
                    InteractionTarget::LogToggle | InteractionTarget::LogResize | InteractionTarget::LogPanel => {
                        out.send(Msg::ToggleLogPanel)
                    }
                    InteractionTarget::Header(slot) => out.send(Msg::HeaderAction(slot)),
                    // the button under the pointer, not the selected one
                    InteractionTarget::Button(_) => out.send(Msg::LayerHit {
                        id,
                        button: MouseButton::Left,
                    }),
                    other => {
                        if let Some(panel) = other.panel() {
                            out.send(Msg::FocusPanel(panel));
                        }
                        out.send(Msg::ToggleFocused);
                    }
                }
            }
            MouseEventKind::Down(button) => match target {
                InteractionTarget::LogToggle if button == MouseButton::Left => {
                    self.focus.focus(FocusTarget::LogPanel);
                    out.send(Msg::ToggleLogPanel);
                }
                InteractionTarget::LogResize if button == MouseButton::Left => {
                    self.focus.focus(FocusTarget::LogPanel);
                    self.log.begin_drag(y);
                    self.layout();
                }
                InteractionTarget::LogToggle | InteractionTarget::LogResize | InteractionTarget::LogPanel => {
                    self.focus.focus(FocusTarget::LogPanel);
                }
                InteractionTarget::Header(slot) => {
                    self.focus.focus(slot.focus_target());
                    if button == MouseButton::Left {
                        out.send(Msg::HeaderAction(slot));
                    }
                }
                other => {
                    self.focus.focus(other.focus_target(has_dialog));
                    out.send(Msg::LayerHit { id, button });
                }
            },
            _ => {}
        }
    }

    fn route_wheel(&mut self, id: String, target: InteractionTarget, up: bool, out: &mut Outbox) {
        match target {
            InteractionTarget::Header(slot) => {
                let next = match self.focus.header_slot() {
                    Some(current) => current.other(),
                    None => slot,
                };
                self.focus.focus(next.focus_target());
            }
            InteractionTarget::LogToggle | InteractionTarget::LogResize | InteractionTarget::LogPanel => {
                self.focus.focus(FocusTarget::LogPanel);
                self.log.wheel(up);
            }
            InteractionTarget::Item { menu, .. } => {
                self.focus.return_to_content();
                out.send(Msg::LayerWheel { id: menu, up });
            }
            InteractionTarget::Button(_) => {
                self.focus.return_to_content();
                out.send(Msg::FocusPanel(PANEL_BUTTONS.to_string()));
                out.send(Msg::LayerWheel { id, up });
            }
            InteractionTarget::Content(_) | InteractionTarget::Backdrop => {
                self.focus.return_to_content();
                out.send(Msg::LayerWheel { id, up });
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Layout and rendering
    // ─────────────────────────────────────────────────────────────────────

    /// Rows left above the log panel
    fn backdrop_height(&self) -> u16 {
        self.size.1.saturating_sub(self.log.height())
    }

    /// Hand every component the space it may use
    fn layout(&mut self) {
        let ctx = self.ctx.snapshot();
        let (w, h) = self.size;
        self.log.set_size(w, h);
        let budget = self.backdrop.budget(&ctx, w);
        let area = budget.content_area(w, self.backdrop_height());
        let full = budget.content_area(w, h);

        if let Some(r) = self.screen.as_mut().and_then(|s| s.resizable()) {
            r.set_size(area.width, area.height);
        }
        for entry in &mut self.dialogs {
            let bounds = if entry.dialog.full_screen() { full } else { area };
            if let Some(r) = entry.dialog.resizable() {
                r.set_size(bounds.width, bounds.height);
            }
        }
    }

    /// Help line text for whatever is focused
    fn help_text(&self) -> String {
        if let Some(slot) = self.focus.header_slot() {
            return format!("{} version. ←/→ to switch, Enter to check, Esc to return", slot_name(slot));
        }
        if self.focus.is_log_focused() {
            return "Log panel. Enter to toggle, ↑/↓ to scroll, Esc to return".to_string();
        }
        let active = self
            .dialogs
            .last()
            .map(|d| d.dialog.as_ref())
            .or(self.screen.as_deref());
        active
            .and_then(|c| c.help())
            .map(|h| h.help_text())
            .unwrap_or_default()
    }

    /// This frame's layer trees
    pub fn view(&mut self) -> Vec<Layer> {
        let ctx = self.ctx.snapshot();
        self.layout();
        let help = self.help_text();
        self.backdrop.set_help_text(help);

        let (w, h) = self.size;
        let bh = self.backdrop_height();
        let budget = self.backdrop.budget(&ctx, w);
        let mut layers = vec![self.backdrop.view(&ctx, w, bh, self.focus.header_slot())];

        if let Some(screen) = self.screen.as_ref() {
            let layer = screen.view(&ctx);
            let rect = budget.place(screen.placement(), layer.width, layer.height, w, bh);
            layers.push(layer.at(i32::from(rect.x), i32::from(rect.y)).z(z::SCREEN));
        }

        layers.push(self.log.view(&ctx, bh));

        for (i, entry) in self.dialogs.iter().enumerate() {
            let dialog = &entry.dialog;
            let layer = dialog.view(&ctx);
            let height = if dialog.full_screen() { h } else { bh };
            let rect = budget.place(dialog.placement(), layer.width, layer.height, w, height);
            layers.push(layer.at(i32::from(rect.x), i32::from(rect.y)).z(dialog_z(i)));
        }
        layers
    }

    /// Compose the frame and record its hit regions
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        if (area.width, area.height) != self.size {
            self.size = (area.width.max(MIN_TERMINAL.0), area.height.max(MIN_TERMINAL.1));
        }
        let layers = self.view();
        let composition = Compositor::new(area.width, area.height).compose(&layers);
        frame.buffer_mut().merge(&composition.grid);
        self.hits.record(composition.regions);
    }

    /// Compose off-screen; used by tests and snapshot rendering
    pub fn render_rows(&mut self) -> Vec<String> {
        let (w, h) = self.size;
        let layers = self.view();
        let composition = Compositor::new(w, h).compose(&layers);
        self.hits.record(composition.regions);
        super::compositor::grid_rows(&composition.grid)
    }
}

fn slot_name(slot: HeaderSlot) -> &'static str {
    match slot {
        HeaderSlot::App => "Application",
        HeaderSlot::Template => "Template",
    }
}
