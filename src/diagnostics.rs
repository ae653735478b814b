use std::{cell::RefCell, collections::VecDeque, fs::File, path::Path, rc::Rc};

use anyhow::Context;
use chrono::{DateTime, Local};

pub const DIAGNOSTICS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Side channel from the effects core toward the host's diagnostics overlay.
pub trait LogSink {
    fn log(&self, message: &str, severity: Severity);
}

impl<F> LogSink for F
where
    F: Fn(&str, Severity),
{
    fn log(&self, message: &str, severity: Severity) {
        self(message, severity);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

/// Bounded log shown by the host. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsLog {
    entries: Rc<RefCell<VecDeque<LogEntry>>>,
}

impl DiagnosticsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Info => log::info!("{message}"),
            Severity::Warn => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
        let mut entries = self.entries.borrow_mut();
        if entries.len() == DIAGNOSTICS_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            at: Local::now(),
            severity,
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Newest entries last.
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.entries.borrow();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }
}

impl LogSink for DiagnosticsLog {
    fn log(&self, message: &str, severity: Severity) {
        self.push(message, severity);
    }
}

/// Routes the `log` facade into a file; the terminal is owned by the UI.
pub fn init_file_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {} failed", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("installing logger failed")
}
