// notify.rs - Transient user notifications and their sinks.
//
// Every page action ends in at most one notice: a success message, or a
// short description of what failed. Sinks decide where notices go: the
// tracing log, an in-memory queue the renderer shows, or a JSONL file.
// A failing sink never stops the others.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::PageError;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Receives notices.
pub trait NoticeSink: Send {
    /// Handle a notice. Errors are logged but don't stop other sinks.
    fn send(&self, notice: &Notice) -> Result<(), PageError>;
}

/// Mirrors notices into the tracing log.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NoticeSink for TracingSink {
    fn send(&self, notice: &Notice) -> Result<(), PageError> {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::info!(notice = %notice.message)
            }
            NoticeLevel::Warning => tracing::warn!(notice = %notice.message),
            NoticeLevel::Error => tracing::error!(notice = %notice.message),
        }
        Ok(())
    }
}

/// Bounded in-memory queue of recent notices.
///
/// Clones share the same queue, so one handle can go to the [`Notifier`]
/// while another is read by the renderer.
#[derive(Debug, Clone)]
pub struct MemorySink {
    queue: Arc<Mutex<VecDeque<Notice>>>,
    capacity: usize,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Notices currently held, oldest first.
    pub fn recent(&self) -> Vec<Notice> {
        self.queue
            .lock()
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove and return all held notices.
    pub fn drain(&self) -> Vec<Notice> {
        self.queue
            .lock()
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default()
    }
}

impl NoticeSink for MemorySink {
    fn send(&self, notice: &Notice) -> Result<(), PageError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|e| PageError::Notification(e.to_string()))?;
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(notice.clone());
        Ok(())
    }
}

/// Appends notices as JSON lines to a file.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NoticeSink for JsonlSink {
    fn send(&self, notice: &Notice) -> Result<(), PageError> {
        let io_err = |e: std::io::Error| {
            PageError::Notification(format!("{}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        let json =
            serde_json::to_string(notice).map_err(|e| PageError::Notification(e.to_string()))?;
        writeln!(file, "{}", json).map_err(io_err)?;
        Ok(())
    }
}

/// Dispatches notices to every registered sink.
pub struct Notifier {
    sinks: Vec<Box<dyn NoticeSink>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn NoticeSink>) {
        self.sinks.push(sink);
    }

    pub fn notify(&self, notice: Notice) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(&notice) {
                tracing::warn!("notification sink error: {}", e);
            }
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notice::success(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Notice::warning(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notice::error(message));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
