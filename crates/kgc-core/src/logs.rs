//! Day-rotated log files written on behalf of the front end.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const DEFAULT_RECENT_LINES: usize = 100;
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub timestamp: String,
    pub context: String,
    pub data: String,
}

impl LogEntry {
    /// `[ts] [LEVEL] [context] message | Data: data`, omitting empty parts.
    pub fn format_line(&self) -> String {
        let mut line = format!("[{}] [{}] ", self.timestamp, self.level.to_uppercase());
        if !self.context.is_empty() {
            line.push_str(&format!("[{}] ", self.context));
        }
        line.push_str(&self.message);
        if !self.data.is_empty() {
            line.push_str(" | Data: ");
            line.push_str(&self.data);
        }
        line
    }
}

/// Directory of `app-YYYY-MM-DD.log` files.
#[derive(Debug, Clone)]
pub struct LogFiles {
    dir: PathBuf,
}

impl LogFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.kgc-toolkit/logs`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::InvalidInput("Cannot find home directory".into()))?;
        Ok(Self::new(home.join(".kgc-toolkit").join("logs")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    pub fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("app-{}.log", date.format("%Y-%m-%d")))
    }

    pub fn write(&self, entry: &LogEntry) -> Result<()> {
        self.write_at(entry, today())
    }

    pub fn write_at(&self, entry: &LogEntry, date: NaiveDate) -> Result<()> {
        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(date))?;
        writeln!(file, "{}", entry.format_line())?;
        file.flush()?;
        Ok(())
    }

    /// Last `lines` lines of today's file, oldest first.
    pub fn recent(&self, lines: usize) -> Result<Vec<String>> {
        self.recent_at(lines, today())
    }

    pub fn recent_at(&self, lines: usize, date: NaiveDate) -> Result<Vec<String>> {
        let path = self.file_for(date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        let all: Vec<&str> = content.lines().collect();
        let start = all.len().saturating_sub(lines);
        Ok(all[start..].iter().map(|line| line.to_string()).collect())
    }

    /// Removes log files dated more than `days` days ago. Returns how many went.
    pub fn clear_old(&self, days: u64) -> Result<u32> {
        self.clear_old_at(days, today())
    }

    pub fn clear_old_at(&self, days: u64, today: NaiveDate) -> Result<u32> {
        if !self.dir.exists() {
            return Ok(0);
        }

        // A retention too long to represent keeps everything.
        let Some(cutoff) = i64::try_from(days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .and_then(|retention| today.checked_sub_signed(retention))
        else {
            return Ok(0);
        };
        let mut deleted = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(date) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(file_date)
            else {
                continue;
            };
            if date >= cutoff {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(error) => {
                    log::warn!("[Logs] Failed to delete old log file {}: {error}", path.display())
                }
            }
        }
        Ok(deleted)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn file_date(name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix("app-")?.strip_suffix(".log")?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
