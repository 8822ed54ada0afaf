//! Argument specifications and the arguments parser
//!
//! An [`ArgumentSpec`] describes one argument a callable accepts: either one
//! of the standard kinds, selected by a short code such as `{` or `[`, or any
//! custom parser object. An [`ArgumentsParser`] reads a whole sequence of
//! them and produces [`ParsedArguments`].

use std::fmt;
use std::sync::Arc;

use super::standard::{StandardArgument, StandardArgumentParser};
use super::{ContentParser, Parsed};
use crate::core::nodes::{NodeList, ParsedArguments};
use crate::core::state::ParsingState;
use crate::core::tokens::TokenReader;
use crate::core::walker::{OpenContext, Walker};
use crate::utils::error::{ParseResult, SpecError};

/// A custom argument parser object
pub type DynArgumentParser = dyn ContentParser<Output = Option<NodeList>> + Send + Sync;

/// The parser behind an argument spec
#[derive(Clone)]
pub enum ArgumentParserRef {
    /// A standard kind, remembered together with the code it was built from
    Standard {
        code: String,
        parser: StandardArgumentParser,
    },
    Custom(Arc<DynArgumentParser>),
}

impl ArgumentParserRef {
    /// The code for standard parsers, or the parser's identifier
    pub fn describe(&self) -> String {
        match self {
            ArgumentParserRef::Standard { code, .. } => code.clone(),
            ArgumentParserRef::Custom(parser) => parser.identifier(),
        }
    }
}

impl PartialEq for ArgumentParserRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ArgumentParserRef::Standard { code: a, .. },
                ArgumentParserRef::Standard { code: b, .. },
            ) => a == b,
            (ArgumentParserRef::Custom(a), ArgumentParserRef::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ArgumentParserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentParserRef::Standard { code, .. } => write!(f, "Standard({:?})", code),
            ArgumentParserRef::Custom(parser) => write!(f, "Custom({})", parser.identifier()),
        }
    }
}

impl ContentParser for ArgumentParserRef {
    type Output = Option<NodeList>;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Option<NodeList>>> {
        match self {
            ArgumentParserRef::Standard { parser, .. } => parser.parse(walker, reader, state),
            ArgumentParserRef::Custom(parser) => parser.parse(walker, reader, state),
        }
    }

    fn identifier(&self) -> String {
        match self {
            ArgumentParserRef::Standard { parser, .. } => parser.identifier(),
            ArgumentParserRef::Custom(parser) => parser.identifier(),
        }
    }
}

/// One argument accepted by a callable
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    parser: ArgumentParserRef,
    name: Option<String>,
}

impl ArgumentSpec {
    /// Resolve a standard argument code
    pub fn new(code: &str) -> Result<Self, SpecError> {
        let kind = StandardArgument::from_code(code)?;
        Ok(Self {
            parser: ArgumentParserRef::Standard {
                code: code.to_string(),
                parser: StandardArgumentParser::new(kind),
            },
            name: None,
        })
    }

    pub fn named(code: &str, name: impl Into<String>) -> Result<Self, SpecError> {
        Ok(Self::new(code)?.with_name(name))
    }

    pub fn custom(parser: Arc<DynArgumentParser>) -> Self {
        Self {
            parser: ArgumentParserRef::Custom(parser),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Code the spec was built from, `None` for custom parsers
    pub fn code(&self) -> Option<&str> {
        match &self.parser {
            ArgumentParserRef::Standard { code, .. } => Some(code),
            ArgumentParserRef::Custom(_) => None,
        }
    }

    pub fn parser(&self) -> &ArgumentParserRef {
        &self.parser
    }

    /// Split a compact argument string such as `"*[{"` or `"t+{"` into specs
    pub fn list_from_compact(argspec: &str) -> Result<Vec<Self>, SpecError> {
        let mut specs = Vec::new();
        let mut chars = argspec.chars();
        while let Some(c) = chars.next() {
            let code = if c == 't' {
                match chars.next() {
                    Some(token) => format!("t{}", token),
                    None => return Err(SpecError::UnknownArgumentCode { code: "t".into() }),
                }
            } else {
                c.to_string()
            };
            specs.push(Self::new(&code)?);
        }
        Ok(specs)
    }

    /// Plain structural record for introspection
    pub fn to_record(&self) -> ArgumentSpecRecord {
        ArgumentSpecRecord {
            argname: self.name.clone(),
            parser: self.parser.describe(),
        }
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.to_record()).unwrap_or(serde_json::Value::Null)
    }
}

impl From<StandardArgument> for ArgumentSpec {
    fn from(kind: StandardArgument) -> Self {
        Self {
            parser: ArgumentParserRef::Standard {
                code: kind.code(),
                parser: StandardArgumentParser::new(kind),
            },
            name: None,
        }
    }
}

/// Exported form of an [`ArgumentSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArgumentSpecRecord {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub argname: Option<String>,
    pub parser: String,
}

/// Parser for callables that take no arguments at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoArgumentsParser;

impl ContentParser for NoArgumentsParser {
    type Output = ParsedArguments;

    fn parse(
        &self,
        _walker: &mut Walker,
        reader: &mut dyn TokenReader,
        _state: &ParsingState,
    ) -> ParseResult<Parsed<ParsedArguments>> {
        Ok((ParsedArguments::empty(reader.cur_pos()), None))
    }
}

/// Parser for the argument sequence of a callable.
///
/// Parsing-state deltas returned by individual arguments are dropped and
/// reported as diagnostics: an argument never changes the state seen by its
/// siblings or by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentsParser {
    spec_list: Vec<ArgumentSpec>,
}

impl ArgumentsParser {
    pub fn new(spec_list: Vec<ArgumentSpec>) -> Self {
        Self { spec_list }
    }

    pub fn spec_list(&self) -> &[ArgumentSpec] {
        &self.spec_list
    }

    pub fn len(&self) -> usize {
        self.spec_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spec_list.is_empty()
    }
}

impl ContentParser for ArgumentsParser {
    type Output = ParsedArguments;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<ParsedArguments>> {
        let pos_start_default = reader.cur_pos();
        let mut values = Vec::with_capacity(self.spec_list.len());
        let mut span: Option<(usize, usize)> = None;

        for (j, arg) in self.spec_list.iter().enumerate() {
            tracing::debug!(argument = j, parser = %arg.parser.identifier(), "parsing argument");

            let arg_start = reader.cur_pos();
            let peeked = reader.peek_token(state).ok().flatten();
            let context = OpenContext::argument(j, arg_start, peeked.as_ref());
            let (value, delta) = walker.parse_content(&arg.parser, reader, state, Some(context))?;

            if let Some(delta) = delta {
                walker.report_discarded_delta(j, &delta, arg_start, reader.cur_pos());
            }

            if let Some(ref nodes) = value {
                span = Some(match span {
                    None => (nodes.pos, nodes.pos_end),
                    Some((start, _)) => (start, nodes.pos_end),
                });
            }
            values.push(value);
        }

        let (pos, pos_end) = span.unwrap_or((pos_start_default, pos_start_default));
        let parsed = ParsedArguments::new(self.spec_list.clone(), values, pos, pos_end);
        tracing::debug!(?parsed, "parsed arguments");

        Ok((parsed, None))
    }
}
