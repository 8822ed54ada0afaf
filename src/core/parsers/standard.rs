//! Standard argument kinds
//!
//! | code       | kind                                     |
//! |------------|------------------------------------------|
//! | `{`, `m`   | mandatory: brace group or single token   |
//! | `[`, `o`   | optional `[...]` group                   |
//! | `*`, `s`   | optional star                            |
//! | `t<c>`     | optional single character `c`            |
//!
//! Optional arguments that are not present leave the reader where it was
//! and produce `None`.

use phf::phf_map;

use super::callables::{GroupParser, MacroCallParser, SpecialsCallParser};
use super::{ContentParser, Parsed};
use crate::core::nodes::{Node, NodeKind, NodeList};
use crate::core::state::ParsingState;
use crate::core::tokens::{TokenKind, TokenReader};
use crate::core::walker::{OpenContext, Walker};
use crate::utils::error::{ParseError, ParseResult, SpecError};

/// A standard argument kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardArgument {
    Mandatory,
    OptionalBracket,
    OptionalStar,
    OptionalToken(char),
}

static STANDARD_ARGUMENT_CODES: phf::Map<&'static str, StandardArgument> = phf_map! {
    "{" => StandardArgument::Mandatory,
    "m" => StandardArgument::Mandatory,
    "[" => StandardArgument::OptionalBracket,
    "o" => StandardArgument::OptionalBracket,
    "*" => StandardArgument::OptionalStar,
    "s" => StandardArgument::OptionalStar,
};

impl StandardArgument {
    pub fn from_code(code: &str) -> Result<Self, SpecError> {
        if code.is_empty() {
            return Err(SpecError::EmptyArgumentCode);
        }
        if let Some(kind) = STANDARD_ARGUMENT_CODES.get(code) {
            return Ok(*kind);
        }

        let mut chars = code.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('t'), Some(token), None) => Ok(StandardArgument::OptionalToken(token)),
            _ => Err(SpecError::UnknownArgumentCode {
                code: code.to_string(),
            }),
        }
    }

    /// Canonical code
    pub fn code(&self) -> String {
        match self {
            StandardArgument::Mandatory => "{".to_string(),
            StandardArgument::OptionalBracket => "[".to_string(),
            StandardArgument::OptionalStar => "*".to_string(),
            StandardArgument::OptionalToken(c) => format!("t{}", c),
        }
    }

    pub fn is_optional(&self) -> bool {
        !matches!(self, StandardArgument::Mandatory)
    }
}

/// Parser for one standard argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardArgumentParser {
    kind: StandardArgument,
}

impl StandardArgumentParser {
    pub fn new(kind: StandardArgument) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> StandardArgument {
        self.kind
    }

    fn parse_mandatory(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Option<NodeList>>> {
        let Some(token) = reader.peek_token(state)? else {
            return Err(ParseError::expected(
                reader.cur_pos(),
                "mandatory argument, found end of input",
            ));
        };

        let context = Some(OpenContext::new("mandatory argument", token.pos));
        let (node, delta) = match &token.kind {
            TokenKind::BraceOpen => {
                walker.parse_content(&GroupParser::braces(), reader, state, context)?
            }
            TokenKind::Char(c) => {
                reader.move_past_token(&token);
                let node = Node::new(
                    NodeKind::Chars {
                        text: c.to_string(),
                    },
                    token.pos,
                    token.pos_end,
                    state.clone(),
                );
                (node, None)
            }
            TokenKind::Macro(_) => walker.parse_content(
                &MacroCallParser::without_arguments(token.clone()),
                reader,
                state,
                context,
            )?,
            TokenKind::Specials(_) => walker.parse_content(
                &SpecialsCallParser::without_arguments(token.clone()),
                reader,
                state,
                context,
            )?,
            _ => {
                return Err(ParseError::expected(
                    token.pos,
                    format!("mandatory argument, found {}", token.describe()),
                ))
            }
        };

        Ok((Some(NodeList::from_node(node)), delta))
    }

    fn parse_optional_group(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Option<NodeList>>> {
        match reader.peek_token(state)? {
            Some(token) if token.is_char('[') => {
                let context = Some(OpenContext::new("optional argument", token.pos));
                let (node, delta) =
                    walker.parse_content(&GroupParser::brackets(), reader, state, context)?;
                Ok((Some(NodeList::from_node(node)), delta))
            }
            _ => Ok((None, None)),
        }
    }

    fn parse_optional_token(
        &self,
        expected: char,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Option<NodeList>>> {
        match reader.peek_token(state)? {
            Some(token) if token.is_char(expected) => {
                reader.move_past_token(&token);
                let node = Node::new(
                    NodeKind::Chars {
                        text: expected.to_string(),
                    },
                    token.pos,
                    token.pos_end,
                    state.clone(),
                );
                Ok((Some(NodeList::from_node(node)), None))
            }
            _ => Ok((None, None)),
        }
    }
}

impl ContentParser for StandardArgumentParser {
    type Output = Option<NodeList>;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Option<NodeList>>> {
        let start = reader.cur_pos();
        skip_space_and_comments(reader, state)?;

        let result = match self.kind {
            StandardArgument::Mandatory => return self.parse_mandatory(walker, reader, state),
            StandardArgument::OptionalBracket => self.parse_optional_group(walker, reader, state)?,
            StandardArgument::OptionalStar => self.parse_optional_token('*', reader, state)?,
            StandardArgument::OptionalToken(c) => self.parse_optional_token(c, reader, state)?,
        };

        if result.0.is_none() {
            reader.move_to_pos(start);
        }
        Ok(result)
    }
}

/// Consume whitespace and comments at the reader position
pub(crate) fn skip_space_and_comments(
    reader: &mut dyn TokenReader,
    state: &ParsingState,
) -> ParseResult<()> {
    while let Some(token) = reader.peek_token(state)? {
        if !token.is_whitespace() && !matches!(token.kind, TokenKind::Comment(_)) {
            break;
        }
        reader.move_past_token(&token);
    }
    Ok(())
}
