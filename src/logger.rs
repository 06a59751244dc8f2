//! Tagged line logger.
//!
//! The terminal is in raw mode while the game runs, so nothing may be printed
//! to stdout or stderr; log lines go to an append-only file instead, one
//! `[Tag] message` per line.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

pub struct Logger {
    out: Option<BufWriter<File>>,
}

impl Logger {
    /// Open `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;
        Ok(Self {
            out: Some(BufWriter::new(file)),
        })
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self { out: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    /// Write one line. A failed write turns the logger off.
    pub fn log(&mut self, tag: &str, message: fmt::Arguments<'_>) {
        let Some(out) = self.out.as_mut() else {
            return;
        };
        let ok = writeln!(out, "[{}] {}", tag, message).is_ok() && out.flush().is_ok();
        if !ok {
            self.out = None;
        }
    }

    pub fn info(&mut self, tag: &str, message: impl fmt::Display) {
        self.log(tag, format_args!("{}", message));
    }

    pub fn warn(&mut self, tag: &str, message: impl fmt::Display) {
        self.log(tag, format_args!("warning: {}", message));
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
