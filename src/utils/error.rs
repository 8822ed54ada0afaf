//! Error handling for latexnodes
//!
//! This module provides the error types raised while building a spec registry,
//! while resolving argument codes, and while parsing content.
//!
//! All positions are character offsets into the parsed source.

use thiserror::Error;

/// Fatal parse failure
///
/// Any of these aborts the parser that raised it and every enclosing parser;
/// no partial node list is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The token reader could not produce a token from malformed input
    #[error("malformed input at position {pos}: {message}")]
    TokenStream { pos: usize, message: String },

    /// A mandatory argument was not found
    #[error("expected {expected} at position {pos}")]
    ExpectedArgument { pos: usize, expected: String },

    /// A token that cannot appear here, e.g. a stray closing brace
    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { pos: usize, found: String },

    /// End of input reached before a closing delimiter
    #[error("missing {expected} for construct opened at position {open_pos}")]
    Unterminated { open_pos: usize, expected: String },

    /// `\end{...}` does not close the innermost open environment
    #[error("expected \\end{{{expected}}} at position {pos}, found \\end{{{found}}}")]
    MismatchedEnvironment {
        pos: usize,
        expected: String,
        found: String,
    },

    /// Unknown macro in strict mode
    #[error("unknown macro '\\{name}' at position {pos}")]
    UnknownMacro { pos: usize, name: String },

    /// Unknown environment in strict mode
    #[error("unknown environment '{name}' at position {pos}")]
    UnknownEnvironment { pos: usize, name: String },

    /// Recursion guard tripped
    #[error("nesting deeper than {max_depth} levels at position {pos}")]
    NestingTooDeep { pos: usize, max_depth: usize },
}

impl ParseError {
    /// Source position the error refers to
    pub fn pos(&self) -> usize {
        match self {
            ParseError::TokenStream { pos, .. }
            | ParseError::ExpectedArgument { pos, .. }
            | ParseError::UnexpectedToken { pos, .. }
            | ParseError::MismatchedEnvironment { pos, .. }
            | ParseError::UnknownMacro { pos, .. }
            | ParseError::UnknownEnvironment { pos, .. }
            | ParseError::NestingTooDeep { pos, .. } => *pos,
            ParseError::Unterminated { open_pos, .. } => *open_pos,
        }
    }

    /// Short advice on fixing the input, where there is an obvious one
    pub fn hint(&self) -> Option<String> {
        match self {
            ParseError::ExpectedArgument { .. } => {
                Some("give the argument as a {...} group".to_string())
            }
            ParseError::Unterminated { expected, .. } => {
                Some(format!("add {} before the end of input", expected))
            }
            ParseError::MismatchedEnvironment { expected, .. } => {
                Some(format!("close the open environment with \\end{{{}}}", expected))
            }
            ParseError::UnknownMacro { .. } | ParseError::UnknownEnvironment { .. } => {
                Some("register a spec for it or turn off strict_callables".to_string())
            }
            ParseError::NestingTooDeep { .. } => Some("raise WalkerOptions::max_depth".to_string()),
            ParseError::TokenStream { .. } | ParseError::UnexpectedToken { .. } => None,
        }
    }

    pub fn token_stream(pos: usize, message: impl Into<String>) -> Self {
        ParseError::TokenStream {
            pos,
            message: message.into(),
        }
    }

    pub fn expected(pos: usize, expected: impl Into<String>) -> Self {
        ParseError::ExpectedArgument {
            pos,
            expected: expected.into(),
        }
    }

    pub fn unexpected(pos: usize, found: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            pos,
            found: found.into(),
        }
    }

    pub fn unterminated(open_pos: usize, expected: impl Into<String>) -> Self {
        ParseError::Unterminated {
            open_pos,
            expected: expected.into(),
        }
    }
}

/// Misuse of the spec registry
///
/// These indicate a programming error by the caller rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Mutation attempted after `freeze()`
    #[error("cannot add category '{category}': registry is frozen")]
    AlreadyFrozen { category: String },

    /// Category name already present
    #[error("category '{name}' is already defined")]
    DuplicateCategory { name: String },

    /// Category name uses the prefix reserved for generated layers
    #[error("category name '{name}' uses a reserved prefix")]
    ReservedCategoryName { name: String },

    /// `extended_with()` called on a registry that was never frozen
    #[error("registry must be frozen before it can be extended")]
    NotFrozen,
}

/// Invalid argument specification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("unknown argument code '{code}'")]
    UnknownArgumentCode { code: String },

    #[error("empty argument code")]
    EmptyArgumentCode,
}

/// Result type for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::expected(7, "'{'");
        assert_eq!(err.to_string(), "expected '{' at position 7");
        assert_eq!(err.pos(), 7);
    }

    #[test]
    fn test_mismatched_environment_display() {
        let err = ParseError::MismatchedEnvironment {
            pos: 12,
            expected: "itemize".to_string(),
            found: "enumerate".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains(r"\end{itemize}"));
        assert!(msg.contains(r"\end{enumerate}"));
    }

    #[test]
    fn test_unterminated_reports_open_position() {
        let err = ParseError::unterminated(3, "'}'");
        assert_eq!(err.pos(), 3);
        assert!(err.to_string().contains("'}'"));
    }

    #[test]
    fn test_hints() {
        assert_eq!(
            ParseError::unterminated(0, "'}'").hint().as_deref(),
            Some("add '}' before the end of input")
        );
        let mismatched = ParseError::MismatchedEnvironment {
            pos: 4,
            expected: "a".to_string(),
            found: "b".to_string(),
        };
        assert_eq!(
            mismatched.hint().as_deref(),
            Some("close the open environment with \\end{a}")
        );
        assert_eq!(ParseError::unexpected(2, "'}'").hint(), None);
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::AlreadyFrozen {
            category: "extra".to_string(),
        };
        assert!(err.to_string().contains("frozen"));

        let err = RegistryError::DuplicateCategory {
            name: "base".to_string(),
        };
        assert!(err.to_string().contains("base"));
    }
}
