//! Parse orchestration
//!
//! The [`Walker`] owns the source text, the registry and the collected
//! diagnostics for one parse. Parsers recurse into each other only through
//! [`Walker::parse_content`], which keeps a stack of open contexts (what is
//! currently being parsed, and where it started) so that a failure deep inside
//! the tree can be reported with the chain of constructs that led to it.

use std::sync::Arc;

use super::nodes::NodeList;
use super::parsers::{ContentParser, GeneralNodesParser, Parsed};
use super::registry::SpecRegistry;
use super::state::{ParsingState, ParsingStateDelta};
use super::tokens::{StringTokenReader, Token, TokenReader};
use crate::utils::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLevel, Diagnostics};
use crate::utils::error::{ParseError, ParseResult};

// ============================================================================
// Options
// ============================================================================

/// Options for a walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerOptions {
    /// Unknown macro and environment names are errors instead of
    /// argument-less callables
    /// Default: false
    pub strict_callables: bool,

    /// Maximum nesting of `parse_content` calls
    /// Default: 200
    pub max_depth: usize,

    /// Start in math mode
    /// Default: false
    pub math_mode: bool,

    /// Recognize `%` comments
    /// Default: true
    pub enable_comments: bool,

    /// Recognize registered specials
    /// Default: true
    pub enable_specials: bool,
}

impl Default for WalkerOptions {
    fn default() -> Self {
        Self {
            strict_callables: false,
            max_depth: 200,
            math_mode: false,
            enable_comments: true,
            enable_specials: true,
        }
    }
}

impl WalkerOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict options (errors on unknown callables)
    pub fn strict() -> Self {
        Self {
            strict_callables: true,
            ..Self::default()
        }
    }

    /// Create options for parsing a math snippet
    pub fn math() -> Self {
        Self {
            math_mode: true,
            ..Self::default()
        }
    }
}

// ============================================================================
// Open contexts
// ============================================================================

/// A construct currently being parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenContext {
    pub label: String,
    pub pos: usize,
}

impl OpenContext {
    pub fn new(label: impl Into<String>, pos: usize) -> Self {
        Self {
            label: label.into(),
            pos,
        }
    }

    /// Context for the `index`-th argument of a callable
    pub fn argument(index: usize, pos: usize, next: Option<&Token>) -> Self {
        let label = match next {
            Some(token) => format!("argument #{} (at {})", index + 1, token.describe()),
            None => format!("argument #{} (at end of input)", index + 1),
        };
        Self::new(label, pos)
    }

    pub fn describe(&self) -> String {
        format!("{} starting at offset {}", self.label, self.pos)
    }
}

// ============================================================================
// Walker
// ============================================================================

/// Orchestrator for one parse of one source text
#[derive(Debug)]
pub struct Walker {
    source: Arc<str>,
    registry: Arc<SpecRegistry>,
    options: WalkerOptions,
    diagnostics: Diagnostics,
    depth: usize,
    open_contexts: Vec<OpenContext>,
    failure_reported: bool,
}

impl Walker {
    pub fn new(source: impl Into<Arc<str>>, registry: Arc<SpecRegistry>) -> Self {
        Self {
            source: source.into(),
            registry,
            options: WalkerOptions::default(),
            diagnostics: Diagnostics::new(),
            depth: 0,
            open_contexts: Vec::new(),
            failure_reported: false,
        }
    }

    /// Walker over the built-in LaTeX registry
    pub fn with_default_specs(source: impl Into<Arc<str>>) -> Self {
        Self::new(source, Arc::clone(&crate::data::DEFAULT_REGISTRY))
    }

    pub fn with_options(mut self, options: WalkerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &WalkerOptions {
        &self.options
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn registry(&self) -> &SpecRegistry {
        &self.registry
    }

    /// Initial parsing state, following the walker options
    pub fn make_parsing_state(&self) -> ParsingState {
        let mut state = ParsingState::new(Arc::clone(&self.source), Arc::clone(&self.registry));
        state.in_math_mode = self.options.math_mode;
        state.enable_comments = self.options.enable_comments;
        state.enable_specials = self.options.enable_specials;
        state
    }

    pub fn make_token_reader(&self) -> StringTokenReader {
        StringTokenReader::new(Arc::clone(&self.source))
    }

    /// Run `parser` at the reader position.
    ///
    /// This is the only way parsers invoke one another. Errors propagate
    /// unchanged; the innermost failing context is recorded as an error
    /// diagnostic on the way out.
    pub fn parse_content<P: ContentParser + ?Sized>(
        &mut self,
        parser: &P,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
        open_context: Option<OpenContext>,
    ) -> ParseResult<Parsed<P::Output>> {
        if self.depth >= self.options.max_depth {
            let err = ParseError::NestingTooDeep {
                pos: reader.cur_pos(),
                max_depth: self.options.max_depth,
            };
            self.report_failure(&err);
            return Err(err);
        }

        let has_context = open_context.is_some();
        if let Some(context) = open_context {
            tracing::trace!(context = %context.describe(), "open");
            self.open_contexts.push(context);
        }
        self.depth += 1;

        let result = parser.parse(self, reader, state);

        match result {
            Ok(_) => self.failure_reported = false,
            Err(ref err) => self.report_failure(err),
        }

        self.depth -= 1;
        if has_context {
            self.open_contexts.pop();
        }
        if self.depth == 0 {
            self.failure_reported = false;
        }
        result
    }

    /// Parse the whole source as a node sequence
    pub fn parse_document(&mut self) -> ParseResult<NodeList> {
        let state = self.make_parsing_state();
        let mut reader = self.make_token_reader();
        let (nodes, _) = self.parse_content(&GeneralNodesParser::new(), &mut reader, &state, None)?;
        Ok(nodes)
    }

    /// Record that the delta returned by argument `index` was dropped
    pub fn report_discarded_delta(
        &mut self,
        index: usize,
        delta: &ParsingStateDelta,
        pos: usize,
        pos_end: usize,
    ) {
        tracing::warn!(
            argument = index,
            math_mode = delta.state().in_math_mode,
            "discarding parsing state change requested by argument"
        );
        let diag = Diagnostic::new(
            DiagnosticLevel::Warning,
            DiagnosticKind::DiscardedStateDelta {
                argument_index: index,
            },
            format!(
                "argument #{} requested a parsing state change, which was ignored",
                index + 1
            ),
        )
        .with_span(pos, pos_end)
        .located_in(&self.source);
        self.diagnostics.add(diag);
    }

    /// Record that a state change ended with its enclosing group or environment
    pub fn report_scoped_delta(&mut self, pos: usize) {
        tracing::debug!(pos, "state change dropped at end of scope");
        let diag = Diagnostic::new(
            DiagnosticLevel::Info,
            DiagnosticKind::DiscardedScopedDelta,
            "parsing state change does not extend past the end of its scope",
        )
        .with_span(pos, pos)
        .located_in(&self.source);
        self.diagnostics.add(diag);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Labels of the constructs currently open, outermost first
    pub fn open_contexts(&self) -> &[OpenContext] {
        &self.open_contexts
    }

    fn report_failure(&mut self, err: &ParseError) {
        if self.failure_reported {
            return;
        }
        self.failure_reported = true;

        let context = self
            .open_contexts
            .iter()
            .map(OpenContext::describe)
            .collect::<Vec<_>>()
            .join(", in ");
        tracing::debug!(%err, %context, "parse failed");

        let message = if context.is_empty() {
            err.to_string()
        } else {
            format!("{} (while parsing {})", err, context)
        };
        let mut diag = Diagnostic::new(
            DiagnosticLevel::Error,
            DiagnosticKind::ParseFailure { context },
            message,
        )
        .with_span(err.pos(), err.pos())
        .located_in(&self.source);
        if let Some(hint) = err.hint() {
            diag = diag.with_suggestion(hint);
        }
        self.diagnostics.add(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsers::NoArgumentsParser;
    use crate::core::specs::MacroSpec;

    fn registry() -> Arc<SpecRegistry> {
        let mut registry = SpecRegistry::new();
        registry
            .add_context_category("base", [MacroSpec::new("textbf", "{").unwrap()], [], [])
            .unwrap();
        registry.freeze();
        Arc::new(registry)
    }

    #[test]
    fn test_options_presets() {
        assert!(!WalkerOptions::new().strict_callables);
        assert!(WalkerOptions::strict().strict_callables);
        assert!(WalkerOptions::math().math_mode);
        assert_eq!(WalkerOptions::math().max_depth, 200);
    }

    #[test]
    fn test_initial_state_follows_options() {
        let walker = Walker::new("x", registry()).with_options(WalkerOptions {
            enable_comments: false,
            ..WalkerOptions::math()
        });
        let state = walker.make_parsing_state();
        assert!(state.in_math_mode);
        assert!(!state.enable_comments);
        assert!(state.enable_specials);
    }

    #[test]
    fn test_failure_recorded_once_with_context() {
        let mut walker = Walker::new(r"\textbf{ab", registry());
        let err = walker.parse_document().unwrap_err();
        assert!(matches!(err, ParseError::Unterminated { .. }));

        let diags = walker.diagnostics();
        assert_eq!(diags.errors, 1);
        let diag = &diags.items[0];
        match &diag.kind {
            DiagnosticKind::ParseFailure { context } => {
                assert!(context.contains("macro '\\textbf'"), "{}", context);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(diag.line, Some(1));
        assert_eq!(diag.column, Some(8));
        assert_eq!(diag.suggestion.as_deref(), Some("add '}' before the end of input"));
        assert!(walker.open_contexts().is_empty());
    }

    /// Swallows a failed attempt, then retries the same content
    struct RetryOnce;

    impl ContentParser for RetryOnce {
        type Output = NodeList;

        fn parse(
            &self,
            walker: &mut Walker,
            reader: &mut dyn TokenReader,
            state: &ParsingState,
        ) -> ParseResult<Parsed<NodeList>> {
            let start = reader.cur_pos();
            let first = walker.parse_content(&GeneralNodesParser::new(), reader, state, None);
            assert!(first.is_err());

            reader.move_to_pos(start);
            walker.parse_content(&NoArgumentsParser, reader, state, None)?;
            walker.parse_content(&GeneralNodesParser::new(), reader, state, None)
        }
    }

    #[test]
    fn test_failure_after_recovery_is_recorded() {
        let mut walker = Walker::new("x{ab", registry());
        let state = walker.make_parsing_state();
        let mut reader = walker.make_token_reader();

        let err = walker
            .parse_content(&RetryOnce, &mut reader, &state, None)
            .unwrap_err();
        assert_eq!(err.pos(), 1);
        assert_eq!(walker.diagnostics().errors, 2);
    }

    #[test]
    fn test_depth_limit() {
        let source = "{".repeat(20) + &"}".repeat(20);
        let mut walker = Walker::new(source, registry()).with_options(WalkerOptions {
            max_depth: 8,
            ..WalkerOptions::default()
        });
        let err = walker.parse_document().unwrap_err();
        assert_eq!(err, ParseError::NestingTooDeep { pos: 4, max_depth: 8 });
    }
}
