use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, Layer};

pub const DEFAULT_TAIL_LINES: usize = 10;

/// Wall-clock timestamps in the operational log: `[2024-05-01 13:37:00]`
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Layer writing the operational log, capped at INFO regardless of the
/// global filter.
pub fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::INFO)
}

/// Access to the operational log file, if one is configured
#[derive(Debug, Clone, Default)]
pub struct LogCollector {
    path: Option<PathBuf>,
}

impl LogCollector {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open the log for appending, creating it if needed.
    pub fn open_writer(&self) -> Result<Option<File>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Some(file))
    }

    /// Last `lines` lines of the log, oldest first.
    pub fn tail(&self, lines: usize) -> String {
        let Some(path) = &self.path else {
            return "Actions weren't logging".to_string();
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return format!("Couldn't read the log: {}", e),
        };

        let all: Vec<&str> = content.lines().collect();
        let start = all.len().saturating_sub(lines);
        let tail = all[start..].join("\n");

        if tail.trim().is_empty() {
            "The log is empty".to_string()
        } else {
            tail
        }
    }
}
