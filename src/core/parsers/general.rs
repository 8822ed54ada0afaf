//! General-sequence and single-node parsers
//!
//! Both share one collection loop. Ordinary characters accumulate into a
//! `Chars` node until any other construct interrupts them; braces, macros,
//! environments and specials are handed to the parsers in
//! [`callables`](super::callables). A state delta returned by a callable is
//! applied to everything that follows it in the same sequence.

use super::callables::{EnvironmentCallParser, GroupParser, MacroCallParser, SpecialsCallParser};
use super::{ContentParser, Parsed, StopCondition};
use crate::core::nodes::{Node, NodeKind, NodeList};
use crate::core::state::{ParsingState, ParsingStateDelta};
use crate::core::tokens::{Token, TokenKind, TokenReader};
use crate::core::walker::{OpenContext, Walker};
use crate::utils::error::{ParseError, ParseResult};

/// Parser for a node sequence running up to a stop condition.
///
/// With `stop_on_comment`, the sequence also ends right before the first
/// comment, which is left unconsumed.
///
/// Reaching the end of input before the stop condition is an
/// [`Unterminated`](ParseError::Unterminated) error located at the opener
/// given to [`opened_at`](Self::opened_at), or at the sequence start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralNodesParser {
    stop: StopCondition,
    stop_on_comment: bool,
    open_pos: Option<usize>,
}

impl Default for GeneralNodesParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneralNodesParser {
    /// Parse to the end of input
    pub fn new() -> Self {
        Self::until(StopCondition::EndOfInput)
    }

    pub fn until(stop: StopCondition) -> Self {
        Self {
            stop,
            stop_on_comment: false,
            open_pos: None,
        }
    }

    /// Position of the construct whose body this sequence is
    pub fn opened_at(mut self, pos: usize) -> Self {
        self.open_pos = Some(pos);
        self
    }

    pub fn stop_on_comment(mut self, stop_on_comment: bool) -> Self {
        self.stop_on_comment = stop_on_comment;
        self
    }

    pub fn stop_condition(&self) -> &StopCondition {
        &self.stop
    }
}

impl ContentParser for GeneralNodesParser {
    type Output = NodeList;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<NodeList>> {
        let mode = CollectMode::Sequence {
            stop_on_comment: self.stop_on_comment,
        };
        let start = reader.cur_pos();
        let open_pos = self.open_pos.unwrap_or(start);
        NodeCollector::new(start, state).run(walker, reader, &self.stop, open_pos, mode)
    }
}

/// Parser for exactly one top-level node.
///
/// A run of characters counts as one node. When `stop_on_comment` is set a
/// comment is itself the node; otherwise comments are collected and skipped
/// over until a non-comment node has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleNodeParser {
    stop_on_comment: bool,
}

impl Default for SingleNodeParser {
    fn default() -> Self {
        Self {
            stop_on_comment: true,
        }
    }
}

impl SingleNodeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_on_comment(mut self, stop_on_comment: bool) -> Self {
        self.stop_on_comment = stop_on_comment;
        self
    }
}

impl ContentParser for SingleNodeParser {
    type Output = NodeList;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<NodeList>> {
        let mode = CollectMode::Single {
            stop_on_comment: self.stop_on_comment,
        };
        let start = reader.cur_pos();
        NodeCollector::new(start, state).run(walker, reader, &StopCondition::EndOfInput, start, mode)
    }
}

#[derive(Debug, Clone, Copy)]
enum CollectMode {
    Sequence { stop_on_comment: bool },
    Single { stop_on_comment: bool },
}

impl CollectMode {
    fn is_single(&self) -> bool {
        matches!(self, CollectMode::Single { .. })
    }
}

/// Characters waiting to become a `Chars` node
struct PendingChars {
    text: String,
    pos: usize,
    pos_end: usize,
}

struct NodeCollector {
    start: usize,
    state: ParsingState,
    state_changed: bool,
    nodes: Vec<Node>,
    pending: Option<PendingChars>,
}

impl NodeCollector {
    fn new(start: usize, state: &ParsingState) -> Self {
        Self {
            start,
            state: state.clone(),
            state_changed: false,
            nodes: Vec::new(),
            pending: None,
        }
    }

    fn run(
        mut self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        stop: &StopCondition,
        open_pos: usize,
        mode: CollectMode,
    ) -> ParseResult<Parsed<NodeList>> {
        loop {
            let Some(token) = reader.peek_token(&self.state)? else {
                if *stop != StopCondition::EndOfInput {
                    return Err(ParseError::unterminated(open_pos, stop.describe()));
                }
                break;
            };
            if stop.matches(&token) {
                break;
            }

            if let TokenKind::Char(c) = token.kind {
                reader.move_past_token(&token);
                self.push_char(c, &token);
                continue;
            }

            // anything else ends the current run of characters
            if self.pending.is_some() {
                self.flush_chars();
                if mode.is_single() {
                    break;
                }
            }

            if let TokenKind::Comment(text) = &token.kind {
                match mode {
                    CollectMode::Sequence {
                        stop_on_comment: true,
                    } => break,
                    CollectMode::Single { stop_on_comment } => {
                        reader.move_past_token(&token);
                        self.push_comment(text, &token);
                        if stop_on_comment {
                            break;
                        }
                    }
                    CollectMode::Sequence {
                        stop_on_comment: false,
                    } => {
                        reader.move_past_token(&token);
                        self.push_comment(text, &token);
                    }
                }
                continue;
            }

            let (node, delta) = self.parse_construct(walker, reader, stop, &token)?;
            self.nodes.push(node);
            if let Some(delta) = delta {
                tracing::debug!(pos = token.pos, "state changed for following nodes");
                self.state = delta.into_state();
                self.state_changed = true;
            }

            if mode.is_single() {
                break;
            }
        }
        self.flush_chars();

        let delta = self
            .state_changed
            .then(|| ParsingStateDelta::replace(self.state.clone()));
        Ok((NodeList::new(self.nodes, self.start), delta))
    }

    fn parse_construct(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        stop: &StopCondition,
        token: &Token,
    ) -> ParseResult<Parsed<Node>> {
        let state = &self.state;
        let context = Some(OpenContext::new(token.describe(), token.pos));
        match &token.kind {
            TokenKind::BraceOpen => walker.parse_content(&GroupParser::braces(), reader, state, context),
            TokenKind::Macro(_) => walker.parse_content(
                &MacroCallParser::new(token.clone()),
                reader,
                state,
                context,
            ),
            TokenKind::BeginEnvironment(_) => walker.parse_content(
                &EnvironmentCallParser::new(token.clone()),
                reader,
                state,
                context,
            ),
            TokenKind::Specials(_) => walker.parse_content(
                &SpecialsCallParser::new(token.clone()),
                reader,
                state,
                context,
            ),
            TokenKind::EndEnvironment(found) => match stop {
                StopCondition::EndEnvironment(expected) => Err(ParseError::MismatchedEnvironment {
                    pos: token.pos,
                    expected: expected.clone(),
                    found: found.clone(),
                }),
                _ => Err(ParseError::unexpected(token.pos, token.describe())),
            },
            TokenKind::BraceClose | TokenKind::Char(_) | TokenKind::Comment(_) => {
                Err(ParseError::unexpected(token.pos, token.describe()))
            }
        }
    }

    fn push_char(&mut self, c: char, token: &Token) {
        match self.pending {
            Some(ref mut pending) => {
                pending.text.push(c);
                pending.pos_end = token.pos_end;
            }
            None => {
                self.pending = Some(PendingChars {
                    text: c.to_string(),
                    pos: token.pos,
                    pos_end: token.pos_end,
                })
            }
        }
    }

    fn push_comment(&mut self, text: &str, token: &Token) {
        self.nodes.push(Node::new(
            NodeKind::Comment {
                text: text.to_string(),
                post_space: token.post_space.clone(),
            },
            token.pos,
            token.pos_end,
            self.state.clone(),
        ));
    }

    fn flush_chars(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.nodes.push(Node::new(
                NodeKind::Chars { text: pending.text },
                pending.pos,
                pending.pos_end,
                self.state.clone(),
            ));
        }
    }
}
