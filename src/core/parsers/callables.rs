//! Parsers for single constructs: groups, macro calls, environments and
//! specials.
//!
//! Each of them is handed the token that introduces the construct (already
//! peeked by the caller) and produces exactly one [`Node`].

use std::sync::Arc;

use super::arguments::NoArgumentsParser;
use super::general::GeneralNodesParser;
use super::{ContentParser, Parsed, StopCondition};
use crate::core::nodes::{Node, NodeKind, ParsedArguments};
use crate::core::state::{ParsingState, ParsingStateDelta};
use crate::core::tokens::{Token, TokenKind, TokenReader};
use crate::core::walker::{OpenContext, Walker};
use crate::utils::error::{ParseError, ParseResult};

/// Delimiters of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDelimiters {
    /// `{...}`
    Braces,
    /// `[...]`, as used by optional arguments
    Brackets,
}

impl GroupDelimiters {
    pub fn open(&self) -> &'static str {
        match self {
            GroupDelimiters::Braces => "{",
            GroupDelimiters::Brackets => "[",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            GroupDelimiters::Braces => "}",
            GroupDelimiters::Brackets => "]",
        }
    }

    fn opens(&self, token: &Token) -> bool {
        match self {
            GroupDelimiters::Braces => token.kind == TokenKind::BraceOpen,
            GroupDelimiters::Brackets => token.is_char('['),
        }
    }

    fn stop_condition(&self) -> StopCondition {
        match self {
            GroupDelimiters::Braces => StopCondition::BraceClose,
            GroupDelimiters::Brackets => StopCondition::Char(']'),
        }
    }
}

/// Parser for a delimited group. State changes inside the group stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupParser {
    delimiters: GroupDelimiters,
}

impl GroupParser {
    pub fn new(delimiters: GroupDelimiters) -> Self {
        Self { delimiters }
    }

    pub fn braces() -> Self {
        Self::new(GroupDelimiters::Braces)
    }

    pub fn brackets() -> Self {
        Self::new(GroupDelimiters::Brackets)
    }
}

impl ContentParser for GroupParser {
    type Output = Node;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Node>> {
        let open = match reader.peek_token(state)? {
            Some(token) if self.delimiters.opens(&token) => token,
            Some(token) => {
                return Err(ParseError::expected(
                    token.pos,
                    format!("'{}', found {}", self.delimiters.open(), token.describe()),
                ))
            }
            None => {
                return Err(ParseError::expected(
                    reader.cur_pos(),
                    format!("'{}', found end of input", self.delimiters.open()),
                ))
            }
        };
        reader.move_past_token(&open);

        let body_parser =
            GeneralNodesParser::until(self.delimiters.stop_condition()).opened_at(open.pos);
        let context = OpenContext::new(
            format!("group {}...{}", self.delimiters.open(), self.delimiters.close()),
            open.pos,
        );
        let (children, delta) = walker.parse_content(&body_parser, reader, state, Some(context))?;

        let end_state = scope_end_state(walker, state, delta, open.pos);
        let close = reader
            .next_token(&end_state)?
            .ok_or_else(|| ParseError::unterminated(open.pos, format!("'{}'", self.delimiters.close())))?;

        let node = Node::new(
            NodeKind::Group {
                open_delim: self.delimiters.open().to_string(),
                close_delim: self.delimiters.close().to_string(),
                children,
            },
            open.pos,
            close.pos_end,
            state.clone(),
        );
        Ok((node, None))
    }
}

/// Parser for a macro invocation, starting at its name token
#[derive(Debug, Clone, PartialEq)]
pub struct MacroCallParser {
    token: Token,
    parse_arguments: bool,
}

impl MacroCallParser {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            parse_arguments: true,
        }
    }

    /// Read the macro name only, as when a macro is itself an argument
    pub fn without_arguments(token: Token) -> Self {
        Self {
            token,
            parse_arguments: false,
        }
    }
}

impl ContentParser for MacroCallParser {
    type Output = Node;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Node>> {
        let token = &self.token;
        let TokenKind::Macro(name) = &token.kind else {
            return Err(ParseError::unexpected(token.pos, token.describe()));
        };
        reader.move_past_token(token);

        let spec = state.registry().get_macro_spec(name).cloned();
        if spec.is_none() && walker.options().strict_callables {
            return Err(ParseError::UnknownMacro {
                pos: token.pos,
                name: name.clone(),
            });
        }

        let context = OpenContext::new(format!("arguments of \\{}", name), token.pos);
        let args = match &spec {
            Some(spec) if self.parse_arguments => {
                walker
                    .parse_content(&spec.arguments, reader, state, Some(context))?
                    .0
            }
            _ => {
                walker
                    .parse_content(&NoArgumentsParser, reader, state, Some(context))?
                    .0
            }
        };

        let delta = spec
            .as_ref()
            .and_then(|s| s.after_state)
            .map(|change| change.delta_from(state));

        let pos_end = call_end(token, &args);
        let node = Node::new(
            NodeKind::Macro {
                name: name.clone(),
                args,
                post_space: token.post_space.clone(),
                spec,
            },
            token.pos,
            pos_end,
            state.clone(),
        );
        Ok((node, delta))
    }
}

/// Parser for a specials invocation, starting at its symbol token
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialsCallParser {
    token: Token,
    parse_arguments: bool,
}

impl SpecialsCallParser {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            parse_arguments: true,
        }
    }

    pub fn without_arguments(token: Token) -> Self {
        Self {
            token,
            parse_arguments: false,
        }
    }
}

impl ContentParser for SpecialsCallParser {
    type Output = Node;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Node>> {
        let token = &self.token;
        let TokenKind::Specials(spec) = &token.kind else {
            return Err(ParseError::unexpected(token.pos, token.describe()));
        };
        reader.move_past_token(token);

        let context = OpenContext::new(format!("arguments of '{}'", spec.symbol), token.pos);
        let (args, _) = if self.parse_arguments {
            walker.parse_content(&spec.arguments, reader, state, Some(context))?
        } else {
            walker.parse_content(&NoArgumentsParser, reader, state, Some(context))?
        };

        let delta = spec.after_state.map(|change| change.delta_from(state));
        let pos_end = call_end(token, &args);
        let node = Node::new(
            NodeKind::Specials {
                symbol: spec.symbol.clone(),
                args,
                spec: Arc::clone(spec),
            },
            token.pos,
            pos_end,
            state.clone(),
        );
        Ok((node, delta))
    }
}

/// Parser for `\begin{name} ... \end{name}`, starting at the begin token
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentCallParser {
    token: Token,
}

impl EnvironmentCallParser {
    pub fn new(token: Token) -> Self {
        Self { token }
    }
}

impl ContentParser for EnvironmentCallParser {
    type Output = Node;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Node>> {
        let token = &self.token;
        let TokenKind::BeginEnvironment(name) = &token.kind else {
            return Err(ParseError::unexpected(token.pos, token.describe()));
        };
        reader.move_past_token(token);

        let spec = state.registry().get_environment_spec(name).cloned();
        if spec.is_none() && walker.options().strict_callables {
            return Err(ParseError::UnknownEnvironment {
                pos: token.pos,
                name: name.clone(),
            });
        }

        let context = OpenContext::new(format!("arguments of environment {{{}}}", name), token.pos);
        let (args, _) = match &spec {
            Some(spec) => walker.parse_content(&spec.arguments, reader, state, Some(context))?,
            None => walker.parse_content(&NoArgumentsParser, reader, state, Some(context))?,
        };

        let body_state = match spec.as_ref().and_then(|s| s.body_state) {
            Some(change) => change.apply(state),
            None => state.clone(),
        };
        let body_parser = GeneralNodesParser::until(StopCondition::EndEnvironment(name.clone()))
            .opened_at(token.pos);
        let context = OpenContext::new(format!("body of environment {{{}}}", name), token.pos);
        let (body, delta) = walker.parse_content(&body_parser, reader, &body_state, Some(context))?;

        let end_state = scope_end_state(walker, &body_state, delta, token.pos);
        let end = reader
            .next_token(&end_state)?
            .ok_or_else(|| ParseError::unterminated(token.pos, format!("\\end{{{}}}", name)))?;

        let node = Node::new(
            NodeKind::Environment {
                name: name.clone(),
                args,
                body,
                spec,
            },
            token.pos,
            end.pos_end,
            state.clone(),
        );
        Ok((node, None))
    }
}

/// State to read a closing token with; the body's delta ends here
fn scope_end_state(
    walker: &mut Walker,
    state: &ParsingState,
    delta: Option<ParsingStateDelta>,
    open_pos: usize,
) -> ParsingState {
    match delta {
        Some(delta) => {
            walker.report_scoped_delta(open_pos);
            delta.into_state()
        }
        None => state.clone(),
    }
}

/// End of a call: the last present argument, or the name token itself
fn call_end(token: &Token, args: &ParsedArguments) -> usize {
    if args.has_values() {
        args.pos_end.max(token.pos_end)
    } else {
        token.pos_end
    }
}
