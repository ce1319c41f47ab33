use std::fmt;
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;

use movie_index::{print_error, print_warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Simple file logger with buffered writes
pub struct FileLogger {
    writer: BufWriter<File>,
}

/// Console logger that also appends to an optional log file.
pub struct Logger {
    file: Option<FileLogger>,
    verbose: bool,
}

impl FileLogger {
    /// Open the log file for appending, creating parent directories as needed.
    pub(crate) fn new(log_path: &Path) -> Result<Self> {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub(crate) fn log(&mut self, level: Level, message: &str) {
        let _ = writeln!(self.writer, "[{}] [{level}] {message}", Self::timestamp());
        let _ = self.writer.flush();
    }
}

impl Logger {
    /// Create a logger.
    /// Falls back to console output only if the log file cannot be opened.
    pub(crate) fn new(log_file: Option<&Path>, verbose: bool) -> Self {
        let file = log_file.and_then(|path| {
            FileLogger::new(path)
                .map_err(|error| {
                    print_warning!("Cannot write to log file {}: {error:#}", path.display());
                    print_warning!("Continuing with console logging only...");
                })
                .ok()
        });
        Self { file, verbose }
    }

    /// Logger without console or file output for tests.
    #[cfg(test)]
    pub(crate) const fn silent() -> Self {
        Self {
            file: None,
            verbose: false,
        }
    }

    pub(crate) fn debug(&mut self, message: &str) {
        if self.verbose {
            println!("{}", message.dimmed());
            self.write(Level::Debug, message);
        }
    }

    pub(crate) fn info(&mut self, message: &str) {
        println!("{message}");
        self.write(Level::Info, message);
    }

    pub(crate) fn success(&mut self, message: &str) {
        println!("{}", message.green());
        self.write(Level::Info, message);
    }

    pub(crate) fn warning(&mut self, message: &str) {
        print_warning!("{message}");
        self.write(Level::Warning, message);
    }

    pub(crate) fn error(&mut self, message: &str) {
        print_error!("{message}");
        self.write(Level::Error, message);
    }

    fn write(&mut self, level: Level, message: &str) {
        if let Some(file) = self.file.as_mut() {
            file.log(level, message);
        }
    }
}
