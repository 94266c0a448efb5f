//! Component contract
//!
//! Screens and dialogs implement [`Component`]. Optional behaviour is exposed
//! through capability queries: the root controller asks once per use whether
//! a component can resize, track focus, or provide help text, and otherwise
//! leaves it alone.

use super::compositor::Layer;
use super::context::RenderContext;
use super::layout::Placement;
use super::message::{Msg, Outbox};

pub trait Component: Send {
    /// Stable name for logging and hit identities
    fn name(&self) -> &str;

    /// Runs each time the component becomes active (pushed or restored)
    fn init(&mut self, _out: &mut Outbox) {}

    fn update(&mut self, msg: &Msg, out: &mut Outbox);

    /// This frame's layer tree, positioned at the component's own origin
    fn view(&self, ctx: &RenderContext) -> Layer;

    // ─────────────────────────────────────────────────────────────────────
    // Capability queries
    // ─────────────────────────────────────────────────────────────────────

    fn help(&self) -> Option<&dyn HelpText> {
        None
    }

    fn resizable(&mut self) -> Option<&mut dyn Resizable> {
        None
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }

    /// Where a dialog sits in the content area
    fn placement(&self) -> Placement {
        Placement::Centered
    }

    /// Sized against the whole terminal instead of the backdrop content area
    fn full_screen(&self) -> bool {
        false
    }

    /// Every key goes to this component, ahead of global bindings
    fn captures_input(&self) -> bool {
        false
    }
}

/// Text shown on the backdrop help line while the component is active
pub trait HelpText {
    fn help_text(&self) -> String;
}

pub trait Resizable {
    /// Space available to the component, borders included
    fn set_size(&mut self, width: u16, height: u16);
}

pub trait Focusable {
    fn set_focused(&mut self, focused: bool);
    fn is_focused(&self) -> bool;
}
