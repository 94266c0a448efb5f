//! Demo screens for `strata run`
//!
//! A main menu whose items exercise the dialog stack, nested navigation and
//! background tasks.

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio_util::sync::CancellationToken;

use strata::style::Theme;
use strata::tui::executor::{TaskRequest, TaskSink};
use strata::tui::widgets::{MenuItem, MenuScreen, MessageDialog};
use strata::tui::{ContextHandle, HeaderSlot, MessageKind, Msg, Outbox};
use strata::{StrataConfig, StrataError};

const STEP: Duration = Duration::from_millis(120);

pub fn main_menu(ctx: ContextHandle) -> MenuScreen {
    let items = vec![
        MenuItem::new("Build", "Stream output from a background task")
            .help("Runs a {{[::B]}}build{{[-]}} task; Esc cancels it"),
        MenuItem::new("Deploy", "Task that asks before continuing")
            .help("The task pauses on a confirmation dialog"),
        MenuItem::new("Broken", "Task that fails half way")
            .help("Failures open an error box over the output"),
        MenuItem::new("Settings", "Theme and shadow"),
        MenuItem::new("About", "What this is"),
        MenuItem::new("Finish", "Leave the menu with a summary"),
    ];
    MenuScreen::new("main", "Strata demo", items).on_select(move |_, item| match item.tag.as_str() {
        "Build" => Some(Msg::RunTask(
            TaskRequest::new("Build", |cancel, sink| stream_build(&cancel, &sink)).subtitle("cargo-like output"),
        )),
        "Deploy" => Some(Msg::RunTask(TaskRequest::new("Deploy", |cancel, sink| {
            deploy(&cancel, &sink)
        }))),
        "Broken" => Some(Msg::RunTask(TaskRequest::new("Broken", |cancel, sink| {
            broken(&cancel, &sink).map_err(|e| StrataError::task(format!("{:#}", e)))
        }))),
        "Settings" => Some(Msg::Navigate(Box::new(settings_menu(ctx.clone())))),
        "About" => Some(Msg::ShowMessage {
            title: "About".to_string(),
            message: format!(
                "Strata {}\n\nLayered dialogs over a static backdrop, with a log panel you can drag.",
                env!("CARGO_PKG_VERSION")
            ),
            kind: MessageKind::Info,
        }),
        "Finish" => Some(Msg::FinalizeSelection(Box::new(MessageDialog::new(
            "Done",
            "Menu closed. Dismiss this box to exit.",
            MessageKind::Success,
        )))),
        _ => None,
    })
}

fn settings_menu(ctx: ContextHandle) -> MenuScreen {
    let mut items: Vec<MenuItem> = Theme::builtin_names()
        .iter()
        .map(|name| MenuItem::new(*name, format!("Switch to the {} theme", name)))
        .collect();
    items.push(MenuItem::new("Shadow", "Toggle dialog shadows"));
    items.push(MenuItem::new("ASCII", "Toggle line characters"));

    MenuScreen::new("settings", "Settings", items).on_select(move |_, item| {
        let mut config = StrataConfig {
            ui: ctx.snapshot().ui.clone(),
            ..StrataConfig::default()
        };
        match item.tag.as_str() {
            "Shadow" => config.ui.shadow = !config.ui.shadow,
            "ASCII" => config.ui.line_characters = !config.ui.line_characters,
            theme => config.ui.theme = theme.to_string(),
        }
        Some(Msg::ConfigChanged(config))
    })
}

/// Header slot Enter
pub fn header_action(slot: HeaderSlot, out: &mut Outbox) {
    let message = match slot {
        HeaderSlot::App => format!("Running version {}", env!("CARGO_PKG_VERSION")),
        HeaderSlot::Template => "Template version is reported by the host application".to_string(),
    };
    out.send(Msg::ShowMessage {
        title: "Version".to_string(),
        message,
        kind: MessageKind::Info,
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Task bodies (run on worker threads)
// ─────────────────────────────────────────────────────────────────────────────

fn pause(cancel: &CancellationToken) -> strata::Result<()> {
    thread::sleep(STEP);
    if cancel.is_cancelled() {
        return Err(StrataError::TaskCancelled);
    }
    Ok(())
}

fn stream_build(cancel: &CancellationToken, sink: &TaskSink) -> strata::Result<()> {
    const CRATES: &[&str] = &["unicode-width", "ratatui", "crossterm", "tokio", "strata"];
    for (i, name) in CRATES.iter().enumerate() {
        pause(cancel)?;
        sink.line(format!("\x1b[1;32m   Compiling\x1b[0m {} ({}/{})", name, i + 1, CRATES.len()))?;
    }
    pause(cancel)?;
    sink.line("\x1b[1;32m    Finished\x1b[0m release target(s)")
}

fn deploy(cancel: &CancellationToken, sink: &TaskSink) -> strata::Result<()> {
    sink.line("Checking target...")?;
    pause(cancel)?;
    sink.line("Target is reachable")?;
    if !sink.confirm("Deploy", "Push the new build to the target?", false)? {
        sink.line("\x1b[33mDeploy skipped\x1b[0m")?;
        return Ok(());
    }
    for step in ["Uploading", "Restarting", "Verifying"] {
        pause(cancel)?;
        sink.line(format!("{}...", step))?;
    }
    sink.line("\x1b[32mDeployed\x1b[0m")
}

fn broken(cancel: &CancellationToken, sink: &TaskSink) -> anyhow::Result<()> {
    sink.line("Reading manifest.yaml")?;
    pause(cancel)?;
    let manifest: serde_yaml::Value =
        serde_yaml::from_str("name: demo\nsteps: [a, b").context("Failed to parse manifest.yaml")?;
    if manifest.get("steps").is_none() {
        bail!("manifest.yaml has no steps");
    }
    Ok(())
}
