//! Callable specifications
//!
//! A spec tells the content parsers how to read the arguments of a macro,
//! an environment or a specials sequence, and which parsing-state change
//! (if any) the construct triggers.

use super::parsers::arguments::{ArgumentSpec, ArgumentsParser};
use super::state::StateChange;
use crate::utils::error::SpecError;

/// Specification of a macro such as `\textbf`
#[derive(Debug, Clone, PartialEq)]
pub struct MacroSpec {
    /// Macro name without the leading backslash
    pub name: String,
    pub arguments: ArgumentsParser,
    /// State change applied to the siblings that follow the macro
    pub after_state: Option<StateChange>,
}

impl MacroSpec {
    /// Build from a compact argument string, e.g. `"*[{"`
    pub fn new(name: impl Into<String>, argspec: &str) -> Result<Self, SpecError> {
        Ok(Self::with_arguments(
            name,
            ArgumentSpec::list_from_compact(argspec)?,
        ))
    }

    pub fn with_arguments(name: impl Into<String>, arguments: Vec<ArgumentSpec>) -> Self {
        Self {
            name: name.into(),
            arguments: ArgumentsParser::new(arguments),
            after_state: None,
        }
    }

    pub fn no_arguments(name: impl Into<String>) -> Self {
        Self::with_arguments(name, Vec::new())
    }

    pub fn with_after_state(mut self, change: StateChange) -> Self {
        self.after_state = Some(change);
        self
    }
}

/// Specification of an environment such as `\begin{itemize}`
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentSpec {
    pub name: String,
    /// Arguments read right after `\begin{name}`
    pub arguments: ArgumentsParser,
    /// State change applied to the body only
    pub body_state: Option<StateChange>,
}

impl EnvironmentSpec {
    pub fn new(name: impl Into<String>, argspec: &str) -> Result<Self, SpecError> {
        Ok(Self::with_arguments(
            name,
            ArgumentSpec::list_from_compact(argspec)?,
        ))
    }

    pub fn with_arguments(name: impl Into<String>, arguments: Vec<ArgumentSpec>) -> Self {
        Self {
            name: name.into(),
            arguments: ArgumentsParser::new(arguments),
            body_state: None,
        }
    }

    pub fn no_arguments(name: impl Into<String>) -> Self {
        Self::with_arguments(name, Vec::new())
    }

    pub fn with_body_state(mut self, change: StateChange) -> Self {
        self.body_state = Some(change);
        self
    }
}

/// Specification of a specials sequence such as `~` or `--`
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialsSpec {
    pub symbol: String,
    pub arguments: ArgumentsParser,
    pub after_state: Option<StateChange>,
}

impl SpecialsSpec {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_arguments(symbol, Vec::new())
    }

    pub fn with_arguments(symbol: impl Into<String>, arguments: Vec<ArgumentSpec>) -> Self {
        Self {
            symbol: symbol.into(),
            arguments: ArgumentsParser::new(arguments),
            after_state: None,
        }
    }

    pub fn with_after_state(mut self, change: StateChange) -> Self {
        self.after_state = Some(change);
        self
    }
}
