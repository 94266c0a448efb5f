//! TUI Module - Layered Dashboard
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     EVENT LOOP (runtime.rs)                         │
//! │  Terminal guard. select! over input, queue, log stream, tick.       │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               │ Event / Msg
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     ROOT CONTROLLER (app.rs)                        │
//! │  Screen history, dialog stack, focus cycle, routing, task spawn.    │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               │ Vec<Layer>
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     COMPOSITOR (compositor.rs)                      │
//! │  Z-ordered layers into one grid. Hotspots into the hit registry.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod component;
pub mod compositor;
pub mod context;
pub mod executor;
pub mod focus;
pub mod hit;
pub mod keymap;
pub mod layout;
pub mod message;
pub mod runtime;
pub mod widgets;

use std::time::Duration;

use tokio::sync::mpsc;

pub use app::App;
pub use component::Component;
pub use compositor::{Compositor, Layer};
pub use context::{ContextHandle, RenderContext};
pub use executor::{TaskExecutor, TaskRequest, TaskSink};
pub use focus::{FocusTarget, HeaderSlot};
pub use hit::HitRegistry;
pub use layout::LayoutBudget;
pub use message::{DialogResult, MessageKind, Msg, Outbox};
pub use runtime::{ExitStatus, Runtime, Shutdown, TerminalGuard};

use crate::error::Result;
use crate::logging::LogSource;
use widgets::Backdrop;

/// Run the dashboard with `screen` as the first screen
///
/// `build` receives the app before it starts, to install header hooks.
pub async fn run<F>(
    ctx: ContextHandle,
    backdrop: Backdrop,
    screen: Box<dyn Component>,
    logs: Option<(&dyn LogSource, usize)>,
    build: F,
) -> Result<ExitStatus>
where
    F: FnOnce(App) -> App,
{
    let tick = Duration::from_millis(ctx.snapshot().ui.tick_rate_ms.max(1));
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = build(App::new(ctx, backdrop, tx));
    app.start(screen);

    let mut runtime = Runtime::new(app, rx, tick);
    if let Some((source, backlog)) = logs {
        runtime = runtime.with_logs(source, backlog);
    }
    runtime.run().await
}
