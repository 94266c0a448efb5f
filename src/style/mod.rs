//! Style engine
//!
//! Themes, direct codes, markup rendering, and SGR conversion.

pub mod ansi;
pub mod code;
pub mod markup;
pub mod styles;
pub mod theme;

pub use code::StyleCode;
pub use markup::{plain_text, MarkupEngine, StyleTag};
pub use styles::Styles;
pub use theme::{StyleResolver, Theme};
