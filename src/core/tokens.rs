//! Tokens and token readers
//!
//! The parsers never look at raw characters. They pull [`Token`]s from a
//! [`TokenReader`], which can peek without consuming, report its position and
//! jump to any character offset (used to backtrack when an optional argument
//! turns out to be absent).
//!
//! [`StringTokenReader`] is the in-memory implementation. All positions are
//! character offsets, not byte offsets.

use std::sync::Arc;

use super::specs::SpecialsSpec;
use super::state::ParsingState;
use crate::utils::error::{ParseError, ParseResult};

/// Token type
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Any ordinary character, whitespace included
    Char(char),
    /// `\name`, without the backslash
    Macro(String),
    BraceOpen,
    BraceClose,
    /// `%...`, without the percent sign and the newline
    Comment(String),
    /// `\begin{name}`
    BeginEnvironment(String),
    /// `\end{name}`
    EndEnvironment(String),
    Specials(Arc<SpecialsSpec>),
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
    /// End of the token, `post_space` included
    pub pos_end: usize,
    /// Whitespace swallowed after a macro name or a comment
    pub post_space: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: usize, pos_end: usize) -> Self {
        Self {
            kind,
            pos,
            pos_end,
            post_space: String::new(),
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Char(c) if c.is_whitespace())
    }

    pub fn is_char(&self, expected: char) -> bool {
        matches!(self.kind, TokenKind::Char(c) if c == expected)
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Char(c) => format!("character '{}'", c),
            TokenKind::Macro(name) => format!("macro '\\{}'", name),
            TokenKind::BraceOpen => "'{'".to_string(),
            TokenKind::BraceClose => "'}'".to_string(),
            TokenKind::Comment(_) => "comment".to_string(),
            TokenKind::BeginEnvironment(name) => format!("\\begin{{{}}}", name),
            TokenKind::EndEnvironment(name) => format!("\\end{{{}}}", name),
            TokenKind::Specials(spec) => format!("specials '{}'", spec.symbol),
        }
    }
}

/// Source of tokens for the parsers
pub trait TokenReader {
    /// Token at the current position, without consuming it.
    /// `Ok(None)` at end of input.
    fn peek_token(&mut self, state: &ParsingState) -> ParseResult<Option<Token>>;

    /// Current position, as a character offset
    fn cur_pos(&self) -> usize;

    /// Move to an arbitrary character offset
    fn move_to_pos(&mut self, pos: usize);

    fn move_past_token(&mut self, token: &Token) {
        self.move_to_pos(token.pos_end);
    }

    /// Consume and return the next token
    fn next_token(&mut self, state: &ParsingState) -> ParseResult<Option<Token>> {
        let token = self.peek_token(state)?;
        if let Some(ref tok) = token {
            self.move_past_token(tok);
        }
        Ok(token)
    }
}

/// Token reader over an in-memory string
#[derive(Debug, Clone)]
pub struct StringTokenReader {
    chars: Vec<char>,
    /// Byte offset of every char, plus one past the end
    byte_offsets: Vec<usize>,
    source: Arc<str>,
    pos: usize,
}

impl StringTokenReader {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        let source: Arc<str> = source.into();
        let mut chars = Vec::new();
        let mut byte_offsets = Vec::new();
        for (i, c) in source.char_indices() {
            byte_offsets.push(i);
            chars.push(c);
        }
        byte_offsets.push(source.len());
        Self {
            chars,
            byte_offsets,
            source,
            pos: 0,
        }
    }

    /// Total length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn rest_from(&self, pos: usize) -> &str {
        &self.source[self.byte_offsets[pos.min(self.chars.len())]..]
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    fn collect(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// End of the blanks starting at `pos`, spanning at most one newline and
    /// never a blank line
    fn scan_post_space(&self, pos: usize) -> usize {
        let blanks = |mut p: usize| {
            while matches!(self.char_at(p), Some(' ' | '\t')) {
                p += 1;
            }
            p
        };
        let end = blanks(pos);
        if self.char_at(end) != Some('\n') {
            return end;
        }
        let after_newline = blanks(end + 1);
        if self.char_at(after_newline) == Some('\n') {
            end
        } else {
            after_newline
        }
    }

    fn read_macro(&self, pos: usize) -> ParseResult<Token> {
        let first = self
            .char_at(pos + 1)
            .ok_or_else(|| ParseError::token_stream(pos, "escape character at end of input"))?;

        if !first.is_ascii_alphabetic() {
            return Ok(Token::new(
                TokenKind::Macro(first.to_string()),
                pos,
                pos + 2,
            ));
        }

        let mut name_end = pos + 1;
        while self.char_at(name_end).is_some_and(|c| c.is_ascii_alphabetic()) {
            name_end += 1;
        }
        let name = self.collect(pos + 1, name_end);

        if name == "begin" || name == "end" {
            return self.read_environment_name(pos, name_end, name == "begin");
        }

        let space_end = self.scan_post_space(name_end);
        Ok(Token {
            kind: TokenKind::Macro(name),
            pos,
            pos_end: space_end,
            post_space: self.collect(name_end, space_end),
        })
    }

    fn read_environment_name(&self, pos: usize, after: usize, begin: bool) -> ParseResult<Token> {
        let mut p = after;
        while self.char_at(p).is_some_and(char::is_whitespace) {
            p += 1;
        }
        if self.char_at(p) != Some('{') {
            return Err(ParseError::token_stream(
                pos,
                "expected '{' with environment name",
            ));
        }
        let name_start = p + 1;
        let name_end = (name_start..self.chars.len())
            .find(|&i| self.chars[i] == '}')
            .ok_or_else(|| ParseError::token_stream(pos, "unterminated environment name"))?;
        let name = self.collect(name_start, name_end).trim().to_string();
        if name.is_empty() {
            return Err(ParseError::token_stream(pos, "empty environment name"));
        }

        let kind = if begin {
            TokenKind::BeginEnvironment(name)
        } else {
            TokenKind::EndEnvironment(name)
        };
        Ok(Token::new(kind, pos, name_end + 1))
    }

    fn read_comment(&self, pos: usize) -> Token {
        let text_end = (pos + 1..self.chars.len())
            .find(|&i| self.chars[i] == '\n')
            .unwrap_or(self.chars.len());
        let mut space_end = text_end;
        if self.char_at(space_end) == Some('\n') {
            space_end += 1;
            while matches!(self.char_at(space_end), Some(' ' | '\t')) {
                space_end += 1;
            }
        }
        Token {
            kind: TokenKind::Comment(self.collect(pos + 1, text_end)),
            pos,
            pos_end: space_end,
            post_space: self.collect(text_end, space_end),
        }
    }
}

impl TokenReader for StringTokenReader {
    fn peek_token(&mut self, state: &ParsingState) -> ParseResult<Option<Token>> {
        let pos = self.pos;
        let Some(c) = self.char_at(pos) else {
            return Ok(None);
        };

        let token = match c {
            '\\' => self.read_macro(pos)?,
            '%' if state.enable_comments => self.read_comment(pos),
            '{' => Token::new(TokenKind::BraceOpen, pos, pos + 1),
            '}' => Token::new(TokenKind::BraceClose, pos, pos + 1),
            _ => {
                let specials = if state.enable_specials {
                    state.registry().match_specials(self.rest_from(pos))
                } else {
                    None
                };
                match specials {
                    Some(spec) => {
                        let len = spec.symbol.chars().count();
                        Token::new(TokenKind::Specials(Arc::clone(spec)), pos, pos + len)
                    }
                    None => Token::new(TokenKind::Char(c), pos, pos + 1),
                }
            }
        };
        Ok(Some(token))
    }

    fn cur_pos(&self) -> usize {
        self.pos
    }

    fn move_to_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.chars.len());
    }
}
