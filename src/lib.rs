//! Strata - layered terminal dashboard core

pub mod config;
pub mod error;
pub mod logging;
pub mod style;
pub mod tui;

pub use config::{StrataConfig, UiConfig};
pub use error::{FixSuggestion, Result, StrataError};
pub use style::{MarkupEngine, Styles, Theme};
pub use tui::{App, ContextHandle, ExitStatus, Msg, RenderContext, Runtime};
