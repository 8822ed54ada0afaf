//! Core parsing modules
//!
//! This module contains the parsing engine:
//! - `registry`: layered spec registry
//! - `specs`: macro, environment and specials specs
//! - `state`: parsing state and state deltas
//! - `tokens`: tokens and the token reader
//! - `nodes`: node model
//! - `parsers`: argument and content parsers
//! - `walker`: parse orchestration

pub mod nodes;
pub mod parsers;
pub mod registry;
pub mod specs;
pub mod state;
pub mod tokens;
pub mod walker;

// Re-export main types
pub use nodes::{Node, NodeKind, NodeList, ParsedArguments};
pub use parsers::{
    ArgumentSpec, ArgumentSpecRecord, ArgumentsParser, ContentParser, GeneralNodesParser,
    NoArgumentsParser, Parsed, SingleNodeParser, StandardArgument, StopCondition,
};
pub use registry::{Category, SpecRegistry, AUTOGEN_CATEGORY_PREFIX};
pub use specs::{EnvironmentSpec, MacroSpec, SpecialsSpec};
pub use state::{ParsingState, ParsingStateDelta, StateChange};
pub use tokens::{StringTokenReader, Token, TokenKind, TokenReader};
pub use walker::{OpenContext, Walker, WalkerOptions};
