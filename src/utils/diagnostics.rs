//! Parse diagnostics
//!
//! Non-fatal findings collected while walking a document. The walker records
//! a diagnostic whenever a parsing-state delta is thrown away, and records the
//! failing open context right before a [`ParseError`](super::error::ParseError)
//! propagates to the caller.
//!
//! ## Example
//!
//! ```rust
//! use latexnodes::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLevel, Diagnostics};
//!
//! let mut diagnostics = Diagnostics::new();
//! diagnostics.add(Diagnostic::new(
//!     DiagnosticLevel::Warning,
//!     DiagnosticKind::DiscardedStateDelta { argument_index: 0 },
//!     "parsing state change ignored in argument",
//! ));
//! assert_eq!(diagnostics.summary(), "1 warning");
//! ```

use std::fmt;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Informational note
    Info,
    /// Warning - parsing continued, but something was ignored
    Warning,
    /// Error - the parse was aborted
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

impl DiagnosticLevel {
    fn noun(&self) -> &'static str {
        match self {
            DiagnosticLevel::Info => "note",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        }
    }

    fn ansi_color(&self) -> &'static str {
        match self {
            DiagnosticLevel::Info => "\x1b[36m",
            DiagnosticLevel::Warning => "\x1b[33m",
            DiagnosticLevel::Error => "\x1b[1;31m",
        }
    }
}

/// What a diagnostic is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An argument parser returned a parsing-state delta, which was dropped
    DiscardedStateDelta { argument_index: usize },
    /// A delta produced inside a group or environment body did not leave it
    DiscardedScopedDelta,
    /// A parse failed inside the given open context
    ParseFailure { context: String },
}

impl DiagnosticKind {
    /// Stable short code, shown next to the level
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::DiscardedStateDelta { .. } => "discarded-delta",
            DiagnosticKind::DiscardedScopedDelta => "scoped-delta",
            DiagnosticKind::ParseFailure { .. } => "parse-failure",
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level
    pub level: DiagnosticLevel,
    /// Structured category
    pub kind: DiagnosticKind,
    /// Human-readable message
    pub message: String,
    /// Span in the source, as character offsets (start, end)
    pub span: Option<(usize, usize)>,
    /// Line number (1-indexed)
    pub line: Option<usize>,
    /// Column number (1-indexed)
    pub column: Option<usize>,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(level: DiagnosticLevel, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            message: message.into(),
            span: None,
            line: None,
            column: None,
            suggestion: None,
        }
    }

    /// Add span information
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some((start, end));
        self
    }

    /// Add location information
    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Resolve the span start to a line and column in `source`
    pub fn located_in(self, source: &str) -> Self {
        match self.span {
            Some((start, _)) => {
                let (line, column) = offset_to_location(source, start);
                self.with_location(line, column)
            }
            None => self,
        }
    }

    /// Add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.level, self.kind.code())?;
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, " at {}:{}: {}", line, column, self.message)?,
            _ => write!(f, ": {}", self.message)?,
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n    hint: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Collected diagnostics with per-level counts
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    /// All diagnostics, in the order they were recorded
    pub items: Vec<Diagnostic>,
    /// Number of errors
    pub errors: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Number of info messages
    pub infos: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diag: Diagnostic) {
        match diag.level {
            DiagnosticLevel::Error => self.errors += 1,
            DiagnosticLevel::Warning => self.warnings += 1,
            DiagnosticLevel::Info => self.infos += 1,
        }
        self.items.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Diagnostics of the given kind
    pub fn of_kind<'a>(
        &'a self,
        pred: impl Fn(&DiagnosticKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.items.iter().filter(move |d| pred(&d.kind))
    }

    /// Counts per level, e.g. "1 error, 2 warnings"
    pub fn summary(&self) -> String {
        let counts = [
            (self.errors, DiagnosticLevel::Error),
            (self.warnings, DiagnosticLevel::Warning),
            (self.infos, DiagnosticLevel::Info),
        ];
        let parts: Vec<String> = counts
            .into_iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, level)| match count {
                1 => format!("1 {}", level.noun()),
                n => format!("{} {}s", n, level.noun()),
            })
            .collect();
        if parts.is_empty() {
            "no diagnostics".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Most severe level recorded so far
    pub fn worst_level(&self) -> Option<DiagnosticLevel> {
        self.items.iter().map(|d| d.level).max()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Convert a character offset to a 1-indexed (line, column) pair
pub fn offset_to_location(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in source.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Render diagnostics one per line, followed by the summary.
///
/// With `use_color`, each line is colored by its level and the summary by the
/// most severe level present.
pub fn format_diagnostics(diagnostics: &Diagnostics, use_color: bool) -> String {
    const RESET: &str = "\x1b[0m";
    let paint = |level: Option<DiagnosticLevel>, text: String| match (use_color, level) {
        (true, Some(level)) => format!("{}{}{}", level.ansi_color(), text, RESET),
        (true, None) => format!("\x1b[32m{}{}", text, RESET),
        (false, _) => text,
    };

    let mut lines: Vec<String> = diagnostics
        .iter()
        .map(|diag| paint(Some(diag.level), diag.to_string()))
        .collect();
    lines.push(paint(
        diagnostics.worst_level(),
        format!("= {}", diagnostics.summary()),
    ));
    lines.join("\n")
}
