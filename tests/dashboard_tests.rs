//! Integration tests for the root controller
//!
//! Drives `App` through the public message and event API without a terminal.

use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use strata::tui::executor::TaskRequest;
use strata::tui::widgets::{Backdrop, Header, MenuItem, MenuScreen};
use strata::tui::{App, ContextHandle, FocusTarget, Msg};
use strata::StrataError;

fn app() -> (App, mpsc::UnboundedReceiver<Msg>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let backdrop = Backdrop::new(Header::new("Strata", "0.1.0").with_hostname("ci"));
    let mut app = App::new(ContextHandle::default(), backdrop, tx);
    app.update(Msg::Resize { width: 80, height: 24 });
    (app, rx)
}

fn main_menu() -> Box<MenuScreen> {
    let items = vec![
        MenuItem::new("alpha", "First item"),
        MenuItem::new("beta", "Second item"),
        MenuItem::new("gamma", "Opens a submenu"),
    ];
    Box::new(MenuScreen::new("main", "Main", items).on_select(|idx, _| {
        (idx == 2).then(|| {
            Msg::Navigate(Box::new(MenuScreen::new(
                "sub",
                "Sub",
                vec![MenuItem::new("leaf", "Nothing below")],
            )))
        })
    }))
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn press(button: MouseButton, x: u16, y: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(button),
        column: x,
        row: y,
        modifiers: KeyModifiers::NONE,
    })
}

fn click(x: u16, y: u16) -> Event {
    press(MouseButton::Left, x, y)
}

fn middle_click(x: u16, y: u16) -> Event {
    press(MouseButton::Middle, x, y)
}

/// Feed queued messages back into the app until `done` holds
async fn pump<F>(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Msg>, mut done: F)
where
    F: FnMut(&App, &Msg) -> bool,
{
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = rx.recv().await {
            let stop = done(app, &msg);
            app.update(msg);
            if stop {
                return;
            }
        }
    })
    .await;
    assert!(result.is_ok(), "timed out waiting for task messages");
}

#[test]
fn test_enter_navigates_and_esc_returns() {
    let (mut app, _rx) = app();
    app.start(main_menu());
    app.handle_event(key(KeyCode::End));
    app.handle_event(key(KeyCode::Enter));
    assert_eq!(app.screen_name(), Some("sub"));
    assert_eq!(app.history_len(), 1);

    app.handle_event(key(KeyCode::Esc));
    assert_eq!(app.screen_name(), Some("main"));
    app.handle_event(key(KeyCode::Esc));
    assert!(app.should_quit());
}

#[test]
fn test_render_shows_chrome_and_menu() {
    let (mut app, _rx) = app();
    app.start(main_menu());
    let rows = app.render_rows();
    assert_eq!(rows.len(), 24);
    assert!(rows[0].contains("Strata"));
    assert!(rows.iter().any(|r| r.contains("First item")));
    assert!(rows[23].contains("Log"));
}

#[test]
fn test_clicking_an_item_uses_recorded_hits() {
    let (mut app, _rx) = app();
    app.start(main_menu());
    app.render_rows();

    let (x, y) = {
        let region = app
            .hits()
            .regions()
            .iter()
            .find(|r| r.id == "item-main-1")
            .expect("item hotspot recorded");
        (region.rect.x, region.rect.y)
    };
    app.handle_event(click(x, y));
    assert_eq!(app.focus(), FocusTarget::Screen);
    app.handle_event(key(KeyCode::Enter));
    // second item has no action; still on the main screen
    assert_eq!(app.screen_name(), Some("main"));
}

#[test]
fn test_middle_click_presses_button_under_pointer() {
    let (mut app, _rx) = app();
    app.start(main_menu());
    app.handle_event(key(KeyCode::End));
    app.handle_event(key(KeyCode::Enter));
    assert_eq!(app.screen_name(), Some("sub"));

    app.render_rows();
    let back = app.hits().get("btn-back").map(|r| r.rect).expect("back button recorded");
    app.handle_event(middle_click(back.x + 1, back.y + 1));
    assert_eq!(app.screen_name(), Some("main"));
    assert!(!app.should_quit());
}

#[test]
fn test_middle_click_answers_confirm_dialog() {
    let (mut app, _rx) = app();
    app.start(main_menu());
    let (tx, mut reply) = tokio::sync::oneshot::channel();
    app.update(Msg::ShowConfirm {
        title: "Delete".into(),
        question: "Really?".into(),
        default_yes: true,
        reply: Some(tx),
    });

    app.render_rows();
    let no = app.hits().get("btn-no").map(|r| r.rect).expect("no button recorded");
    app.handle_event(middle_click(no.x + 1, no.y + 1));
    assert_eq!(reply.try_recv(), Ok(false));
    assert!(app.dialog_names().is_empty());
    assert_eq!(app.screen_name(), Some("main"));
}

#[test]
fn test_help_overlay_over_menu() {
    let (mut app, _rx) = app();
    app.start(main_menu());
    app.handle_event(key(KeyCode::Char('?')));
    assert_eq!(app.dialog_names(), vec!["help"]);
    let rows = app.render_rows();
    assert!(rows.iter().any(|r| r.contains("Press any key to close")));
    app.handle_event(key(KeyCode::Char('x')));
    assert!(app.dialog_names().is_empty());
    assert_eq!(app.screen_name(), Some("main"));
}

#[tokio::test]
async fn test_task_output_reaches_program_box() {
    let (mut app, mut rx) = app();
    app.start(main_menu());
    app.update(Msg::RunTask(TaskRequest::new("Build", |_cancel, sink| {
        sink.line("step one")?;
        sink.line("step two")
    })));
    assert_eq!(app.dialog_names(), vec!["program_box"]);

    pump(&mut app, &mut rx, |_, msg| matches!(msg, Msg::TaskDone { .. })).await;
    let rows = app.render_rows();
    assert!(rows.iter().any(|r| r.contains("step one")));
    assert!(rows.iter().any(|r| r.contains("step two")));
    assert!(rows[22].contains("Task finished"));

    app.handle_event(key(KeyCode::Enter));
    assert!(app.dialog_names().is_empty());
}

#[tokio::test]
async fn test_task_confirm_round_trip() {
    let (mut app, mut rx) = app();
    app.start(main_menu());
    app.update(Msg::RunTask(TaskRequest::new("Deploy", |_cancel, sink| {
        sink.line("before")?;
        if sink.confirm("Deploy", "Continue?", false)? {
            sink.line("approved")?;
        }
        Ok(())
    })));

    pump(&mut app, &mut rx, |_, msg| matches!(msg, Msg::ShowConfirm { .. })).await;
    assert_eq!(app.dialog_names(), vec!["program_box", "confirm"]);
    app.handle_event(key(KeyCode::Char('y')));
    assert_eq!(app.dialog_names(), vec!["program_box"]);

    pump(&mut app, &mut rx, |_, msg| matches!(msg, Msg::TaskDone { .. })).await;
    let rows = app.render_rows();
    assert!(rows.iter().any(|r| r.contains("before")));
    assert!(rows.iter().any(|r| r.contains("approved")));
}

#[tokio::test]
async fn test_failed_task_raises_error_box() {
    let (mut app, mut rx) = app();
    app.start(main_menu());
    app.update(Msg::RunTask(TaskRequest::new("Broken", |_cancel, _sink| {
        Err(StrataError::task("disk full"))
    })));

    pump(&mut app, &mut rx, |_, msg| matches!(msg, Msg::TaskDone { .. })).await;
    assert_eq!(app.dialog_names(), vec!["program_box", "message"]);
    let rows = app.render_rows();
    assert!(rows.iter().any(|r| r.contains("disk full")));

    app.handle_event(key(KeyCode::Enter));
    app.handle_event(key(KeyCode::Enter));
    assert!(app.dialog_names().is_empty());
    assert_eq!(app.screen_name(), Some("main"));
}

#[tokio::test]
async fn test_esc_cancels_running_task() {
    let (mut app, mut rx) = app();
    app.start(main_menu());
    app.update(Msg::RunTask(TaskRequest::new("Wait", |cancel, _sink| {
        while !cancel.is_cancelled() {
            std::thread::sleep(Duration::from_millis(5));
        }
        Err(StrataError::TaskCancelled)
    })));
    app.handle_event(key(KeyCode::Esc));
    assert_eq!(app.dialog_names(), vec!["program_box"]);

    pump(&mut app, &mut rx, |_, msg| matches!(msg, Msg::TaskDone { .. })).await;
    app.handle_event(key(KeyCode::Esc));
    assert!(app.dialog_names().is_empty());
}
