//! Shared diagnostic types produced by every pipeline stage.
//!
//! Every stage (lexer, parser, semantic analyzer, code generator) appends to
//! its own [`DiagnosticLog`] rather than failing fast; ownership of the log
//! transfers to the driver once the stage completes (see `spec.md` §5).

use std::fmt::{self, Display};

use colored::Colorize;
use serde::Serialize;

/// Severity of a single diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Info,
    Debug,
    Warning,
    Error,
}

impl Level {
    /// Whether a log containing an entry at this level blocks the next
    /// pipeline stage. Only `Error` does; warnings never block.
    pub fn blocks_pipeline(self) -> bool {
        matches!(self, Level::Error)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Level::Info => "INFO".normal(),
            Level::Debug => "DEBUG".dimmed(),
            Level::Warning => "WARNING".yellow(),
            Level::Error => "ERROR".red().bold(),
        };
        write!(f, "{text}")
    }
}

/// A single line in one of the four output logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(level: Level, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            level,
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Level::Debug, message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(f, "[{}] {} ({line}:{col})", self.level, self.message)
            }
            _ => write!(f, "[{}] {}", self.level, self.message),
        }
    }
}

/// An append-only, ordered log of diagnostics owned by its producing stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticLog(Vec<Diagnostic>);

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::info(message));
    }

    pub fn error_at(&mut self, message: impl Into<String>, line: usize, column: usize) {
        self.push(Diagnostic::at(Level::Error, message, line, column));
    }

    pub fn warning_at(&mut self, message: impl Into<String>, line: usize, column: usize) {
        self.push(Diagnostic::at(Level::Warning, message, line, column));
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.level.blocks_pipeline())
    }

    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|d| d.level == Level::Error).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Append all entries from `other`, draining it.
    pub fn extend_from(&mut self, other: DiagnosticLog) {
        self.0.extend(other.0);
    }
}

impl Display for DiagnosticLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.0 {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl IntoIterator for DiagnosticLog {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
