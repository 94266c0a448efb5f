//! Logging setup
//!
//! While the dashboard owns the terminal, tracing output goes to a log file.
//! Every formatted line is also published on a broadcast channel so the log
//! panel can tail it live; the panel's backlog is read back from the file.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, StrataError};
use crate::style::ansi::strip_ansi;

/// Live line buffer per subscriber
const CHANNEL_CAPACITY: usize = 1024;

/// Where the log panel gets its lines
pub trait LogSource: Send + Sync {
    /// Most recent `n` lines, oldest first
    fn backlog(&self, n: usize) -> Vec<String>;

    /// Lines logged from now on
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// Default filter: `STRATA_LOG`, then `RUST_LOG`, then `info`
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("STRATA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr for the non-interactive commands
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Route tracing into `path` and return the matching source
pub fn init_file(path: &Path) -> Result<Arc<FileLogSource>> {
    let source = Arc::new(FileLogSource::open(path)?);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(source.tee())
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| StrataError::ConfigError {
            reason: format!("Failed to install log subscriber: {}", e),
        })?;
    Ok(source)
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed source
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct FileLogSource {
    path: PathBuf,
    file: Arc<Mutex<File>>,
    tx: broadcast::Sender<String>,
}

impl FileLogSource {
    /// Open (appending) or create the log file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Ok(Self {
            path: path.to_path_buf(),
            file: Arc::new(Mutex::new(file)),
            tx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `MakeWriter` that writes to the file and the broadcast
    pub fn tee(&self) -> LogTee {
        LogTee {
            file: Arc::clone(&self.file),
            tx: self.tx.clone(),
        }
    }
}

impl LogSource for FileLogSource {
    fn backlog(&self, n: usize) -> Vec<String> {
        let Ok(file) = File::open(&self.path) else {
            return Vec::new();
        };
        // invalid UTF-8 is decoded lossily and never ends the read
        let mut reader = BufReader::new(file);
        let mut tail = VecDeque::with_capacity(n.min(1024));
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if n == 0 {
                continue;
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            if tail.len() == n {
                tail.pop_front();
            }
            tail.push_back(String::from_utf8_lossy(&buf).into_owned());
        }
        tail.into()
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

/// Source with no file, fed by hand (used by tests)
#[derive(Debug, Clone)]
pub struct MemoryLogSource {
    lines: Arc<Mutex<Vec<String>>>,
    tx: broadcast::Sender<String>,
}

impl Default for MemoryLogSource {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            lines: Arc::new(Mutex::new(Vec::new())),
            tx,
        }
    }
}

impl MemoryLogSource {
    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        self.lines.lock().push(line.clone());
        let _ = self.tx.send(line);
    }
}

impl LogSource for MemoryLogSource {
    fn backlog(&self, n: usize) -> Vec<String> {
        let lines = self.lines.lock();
        let skip = lines.len().saturating_sub(n);
        lines[skip..].to_vec()
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tee writer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LogTee {
    file: Arc<Mutex<File>>,
    tx: broadcast::Sender<String>,
}

impl<'a> MakeWriter<'a> for LogTee {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: Arc::clone(&self.file),
            tx: self.tx.clone(),
            buf: Vec::new(),
        }
    }
}

/// Buffers one formatted event and publishes it when dropped
pub struct LogWriter {
    file: Arc<Mutex<File>>,
    tx: broadcast::Sender<String>,
    buf: Vec<u8>,
}

impl Write for LogWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.buf);
        self.file.lock().write_all(&bytes)?;

        let text = String::from_utf8_lossy(&bytes);
        for line in text.lines().filter(|l| !l.is_empty()) {
            // no receivers is fine
            let _ = self.tx.send(strip_ansi(line));
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tee_writes_file_and_broadcast() {
        let dir = TempDir::new().unwrap();
        let source = FileLogSource::open(&dir.path().join("logs/strata.log")).unwrap();
        let mut rx = source.subscribe();

        let tee = source.tee();
        {
            let mut writer = tee.make_writer();
            writer.write_all(b"first line\nsecond line\n").unwrap();
        }

        assert_eq!(rx.try_recv().unwrap(), "first line");
        assert_eq!(rx.try_recv().unwrap(), "second line");
        assert_eq!(source.backlog(10), vec!["first line", "second line"]);
    }

    #[test]
    fn test_backlog_keeps_most_recent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strata.log");
        let body: String = (0..250).map(|i| format!("line {i}\n")).collect();
        fs::write(&path, body).unwrap();

        let source = FileLogSource::open(&path).unwrap();
        let backlog = source.backlog(200);
        assert_eq!(backlog.len(), 200);
        assert_eq!(backlog.first().map(String::as_str), Some("line 50"));
        assert_eq!(backlog.last().map(String::as_str), Some("line 249"));
    }

    #[test]
    fn test_backlog_survives_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strata.log");
        fs::write(&path, b"before\nbad \xff\xfe bytes\r\nafter\n").unwrap();

        let source = FileLogSource::open(&path).unwrap();
        let backlog = source.backlog(10);
        assert_eq!(backlog.len(), 3);
        assert_eq!(backlog[0], "before");
        assert!(backlog[1].starts_with("bad "));
        assert!(backlog[1].contains('\u{fffd}'));
        assert_eq!(backlog[2], "after");
        assert_eq!(source.backlog(1), vec!["after"]);
        assert!(source.backlog(0).is_empty());
    }

    #[test]
    fn test_broadcast_strips_escape_codes() {
        let dir = TempDir::new().unwrap();
        let source = FileLogSource::open(&dir.path().join("strata.log")).unwrap();
        let mut rx = source.subscribe();
        {
            let mut writer = source.tee().make_writer();
            writer.write_all(b"\x1b[32mINFO\x1b[0m ready\n").unwrap();
        }
        assert_eq!(rx.try_recv().unwrap(), "INFO ready");
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryLogSource::default();
        let mut rx = source.subscribe();
        source.push("a");
        source.push("b");
        source.push("c");
        assert_eq!(source.backlog(2), vec!["b", "c"]);
        assert_eq!(rx.try_recv().unwrap(), "a");
    }
}
