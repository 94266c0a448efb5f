//! Event loop
//!
//! One cooperative loop: terminal input, the message queue, the live log
//! stream and a tick timer are multiplexed with `tokio::select!`, and each
//! input is fully processed before the next is read. Every step runs behind
//! a panic boundary; a panic becomes [`StrataError::Fatal`] after the
//! terminal has been restored.

use std::any::Any;
use std::io::{self, Stdout};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::app::App;
use super::message::Msg;
use crate::error::{Result, StrataError};
use crate::logging::LogSource;

/// How the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Clean,
    ForceQuit,
}

impl ExitStatus {
    /// Process exit code
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::ForceQuit => 130,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Terminal guard
// ─────────────────────────────────────────────────────────────────────────────

type Backend = CrosstermBackend<Stdout>;

/// Raw mode plus alternate screen, undone on drop
pub struct TerminalGuard {
    terminal: Terminal<Backend>,
    restored: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().map_err(StrataError::tui)?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(StrataError::tui(e));
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).map_err(StrataError::tui)?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn terminal(&mut self) -> &mut Terminal<Backend> {
        &mut self.terminal
    }

    /// Idempotent
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shutdown
// ─────────────────────────────────────────────────────────────────────────────

/// Stops a running loop from outside
#[derive(Debug, Clone)]
pub struct Shutdown {
    token: CancellationToken,
    done: watch::Receiver<bool>,
}

impl Shutdown {
    /// Signal the loop without waiting
    pub fn request(&self) {
        self.token.cancel();
    }

    /// Signal the loop and wait until it has unwound and restored the terminal
    pub async fn shutdown(mut self) {
        self.token.cancel();
        let _ = self.done.wait_for(|done| *done).await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime
// ─────────────────────────────────────────────────────────────────────────────

enum Input {
    Event(Event),
    Msg(Msg),
}

pub struct Runtime {
    app: App,
    rx: mpsc::UnboundedReceiver<Msg>,
    logs: Option<broadcast::Receiver<String>>,
    tick: Duration,
    token: CancellationToken,
    done: watch::Sender<bool>,
}

impl Runtime {
    /// `rx` is the receiving end of the queue handed to [`App::new`]
    pub fn new(app: App, rx: mpsc::UnboundedReceiver<Msg>, tick: Duration) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            app,
            rx,
            logs: None,
            tick,
            token: CancellationToken::new(),
            done,
        }
    }

    /// Preload the log panel and tail `source` from here on
    pub fn with_logs(mut self, source: &dyn LogSource, backlog: usize) -> Self {
        self.logs = Some(source.subscribe());
        for line in source.backlog(backlog) {
            self.app.update(Msg::LogLine(line));
        }
        self
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        Shutdown {
            token: self.token.clone(),
            done: self.done.subscribe(),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Take over the terminal and run until quit
    pub async fn run(mut self) -> Result<ExitStatus> {
        let mut guard = TerminalGuard::enter()?;
        let result = self.event_loop(&mut guard).await;
        let restored = guard.restore();
        drop(guard);
        let _ = self.done.send(true);

        match &result {
            Ok(status) => info!(status = ?status, "Event loop finished"),
            Err(e) => error!(error = %e, "Event loop failed"),
        }
        restored?;
        result
    }

    async fn event_loop(&mut self, guard: &mut TerminalGuard) -> Result<ExitStatus> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut logs = self.logs.take().map(BroadcastStream::new);

        let size = guard.terminal().size().map_err(StrataError::tui)?;
        self.app.update(Msg::Resize {
            width: size.width,
            height: size.height,
        });

        loop {
            let app = &mut self.app;
            let terminal = guard.terminal();
            guarded("render", || terminal.draw(|frame| app.draw(frame)).map(|_| ()))?
                .map_err(StrataError::tui)?;

            if self.app.should_quit() {
                break;
            }

            let input = tokio::select! {
                _ = self.token.cancelled() => {
                    debug!("Shutdown requested");
                    break;
                }
                event = events.next() => match event {
                    Some(Ok(event)) => Input::Event(event),
                    Some(Err(e)) => return Err(StrataError::tui(e)),
                    None => break,
                },
                Some(msg) = self.rx.recv() => Input::Msg(msg),
                Some(line) = next_log(&mut logs) => Input::Msg(Msg::LogLine(line)),
                _ = ticker.tick() => Input::Msg(Msg::Tick),
            };

            let app = &mut self.app;
            guarded("update", move || match input {
                Input::Event(event) => app.handle_event(event),
                Input::Msg(msg) => app.update(msg),
            })?;

            if self.app.should_quit() {
                break;
            }
        }

        self.app.executor().cancel_all();
        Ok(if self.app.is_fatal() {
            ExitStatus::ForceQuit
        } else {
            ExitStatus::Clean
        })
    }
}

/// Next live log line; pending forever once the stream is gone
async fn next_log(logs: &mut Option<BroadcastStream<String>>) -> Option<String> {
    let Some(stream) = logs.as_mut() else {
        return std::future::pending().await;
    };
    match stream.next().await {
        Some(Ok(line)) => Some(line),
        Some(Err(BroadcastStreamRecvError::Lagged(n))) => Some(format!("... {} log lines skipped", n)),
        None => {
            *logs = None;
            std::future::pending().await
        }
    }
}

/// Run one loop step, turning a panic into a fatal error
fn guarded<T>(step: &str, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| StrataError::Fatal {
        reason: format!("{} step panicked: {}", step, panic_message(payload.as_ref())),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Clean.code(), 0);
        assert_eq!(ExitStatus::ForceQuit.code(), 130);
    }

    #[test]
    fn test_guarded_converts_panic() {
        let err = guarded::<()>("update", || panic!("boom")).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("STRATA-011"));
        assert!(message.contains("update step panicked: boom"));
    }

    #[test]
    fn test_guarded_passes_values_through() {
        assert_eq!(guarded("render", || 7).unwrap(), 7);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_done() {
        let token = CancellationToken::new();
        let (done_tx, done_rx) = watch::channel(false);
        let handle = Shutdown {
            token: token.clone(),
            done: done_rx,
        };
        let waiter = tokio::spawn(handle.shutdown());
        token.cancelled().await;
        done_tx.send(true).unwrap();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_next_log_reports_lag() {
        let (tx, rx) = broadcast::channel(2);
        for i in 0..4 {
            tx.send(format!("line {i}")).unwrap();
        }
        let mut logs = Some(BroadcastStream::new(rx));
        let first = next_log(&mut logs).await.unwrap();
        assert!(first.contains("skipped"));
        assert_eq!(next_log(&mut logs).await.as_deref(), Some("line 2"));
    }
}
