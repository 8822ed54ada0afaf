//! Content and argument parsers
//!
//! Every parser implements [`ContentParser`]: it reads from a
//! [`TokenReader`](super::tokens::TokenReader) under a given
//! [`ParsingState`] and returns its result together with an optional
//! [`ParsingStateDelta`] for whatever parsing follows.
//!
//! Parsers never call each other directly. They recurse through
//! [`Walker::parse_content`](super::walker::Walker::parse_content), which
//! tracks nesting depth and open contexts for diagnostics.
//!
//! ## Components
//!
//! - `arguments`: argument specs, `ArgumentsParser`, `NoArgumentsParser`
//! - `standard`: the standard argument kinds (`{`, `[`, `*`, `t<c>`)
//! - `general`: general-sequence and single-node parsers
//! - `callables`: groups, macro calls, environments and specials

pub mod arguments;
pub mod callables;
pub mod general;
pub mod standard;

#[cfg(test)]
mod tests;

use super::state::{ParsingState, ParsingStateDelta};
use super::tokens::{Token, TokenKind, TokenReader};
use super::walker::Walker;
use crate::utils::error::ParseResult;

pub use arguments::{
    ArgumentParserRef, ArgumentSpec, ArgumentSpecRecord, ArgumentsParser, DynArgumentParser,
    NoArgumentsParser,
};
pub use callables::{
    EnvironmentCallParser, GroupDelimiters, GroupParser, MacroCallParser, SpecialsCallParser,
};
pub use general::{GeneralNodesParser, SingleNodeParser};
pub use standard::{StandardArgument, StandardArgumentParser};

/// A parser result paired with the requested state replacement, if any
pub type Parsed<T> = (T, Option<ParsingStateDelta>);

/// Common interface of argument and node parsers
pub trait ContentParser {
    type Output;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Self::Output>>;

    /// Identifier used in logs and in serialized argument specs
    fn identifier(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Where a node sequence ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopCondition {
    /// Run to the end of input
    EndOfInput,
    /// Stop before a `}`
    BraceClose,
    /// Stop before the given ordinary character, e.g. `]`
    Char(char),
    /// Stop before `\end{name}`
    EndEnvironment(String),
}

impl StopCondition {
    pub fn matches(&self, token: &Token) -> bool {
        match (self, &token.kind) {
            (StopCondition::BraceClose, TokenKind::BraceClose) => true,
            (StopCondition::Char(c), TokenKind::Char(t)) => c == t,
            (StopCondition::EndEnvironment(name), TokenKind::EndEnvironment(found)) => {
                name == found
            }
            _ => false,
        }
    }

    /// What the closing token looks like, for error messages
    pub fn describe(&self) -> String {
        match self {
            StopCondition::EndOfInput => "end of input".to_string(),
            StopCondition::BraceClose => "'}'".to_string(),
            StopCondition::Char(c) => format!("'{}'", c),
            StopCondition::EndEnvironment(name) => format!("\\end{{{}}}", name),
        }
    }
}
