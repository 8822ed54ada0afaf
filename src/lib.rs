//! # latexnodes
//!
//! Layered LaTeX spec registry and node parsers written in Rust.
//!
//! ## Features
//!
//! - **Layered Registry**: macro, environment and specials specs grouped in
//!   categories, where later categories shadow earlier ones
//! - **Cheap Extension**: a frozen registry is shared, never copied; extensions
//!   add one generated layer on top
//! - **Argument Parsing**: standard argument codes (`{`, `[`, `*`, `t<c>`) or
//!   any custom parser
//! - **Node Tree**: characters, macros, groups, comments, environments and
//!   specials with exact source spans
//! - **Diagnostics**: discarded state changes and parse failures are recorded,
//!   with line and column
//!
//! ## Usage Examples
//!
//! ### Parsing a Document
//!
//! ```rust
//! use latexnodes::{NodeKind, Walker};
//!
//! let mut walker = Walker::with_default_specs(r"Some \textbf{bold} text.");
//! let nodes = walker.parse_document().unwrap();
//!
//! assert_eq!(nodes.len(), 3);
//! match &nodes[1].kind {
//!     NodeKind::Macro { name, args, .. } => {
//!         assert_eq!(name, "textbf");
//!         assert_eq!(args.get(0).unwrap().latex_verbatim(), "{bold}");
//!     }
//!     other => panic!("unexpected node {:?}", other),
//! }
//! ```
//!
//! ### Extending the Registry
//!
//! ```rust
//! use std::sync::Arc;
//! use latexnodes::{MacroSpec, Walker, DEFAULT_REGISTRY};
//!
//! let registry = DEFAULT_REGISTRY
//!     .extended_with([MacroSpec::new("yourname", "[").unwrap()], [], [])
//!     .unwrap();
//!
//! let mut walker = Walker::new(r"Hello \yourname[full].", Arc::new(registry));
//! let nodes = walker.parse_document().unwrap();
//! assert_eq!(nodes[1].latex_verbatim(), r"\yourname[full]");
//! ```

/// Core parsing modules
pub mod core;

/// Data layer - built-in spec tables
pub mod data;

/// Utility modules
pub mod utils;

// Re-export core types
pub use core::nodes::{Node, NodeKind, NodeList, ParsedArguments};
pub use core::parsers;
pub use core::parsers::{
    ArgumentSpec, ArgumentSpecRecord, ArgumentsParser, ContentParser, GeneralNodesParser,
    NoArgumentsParser, Parsed, SingleNodeParser, StandardArgument, StopCondition,
};
pub use core::registry::{Category, SpecRegistry, AUTOGEN_CATEGORY_PREFIX};
pub use core::specs::{EnvironmentSpec, MacroSpec, SpecialsSpec};
pub use core::state::{ParsingState, ParsingStateDelta, StateChange};
pub use core::tokens::{StringTokenReader, Token, TokenKind, TokenReader};
pub use core::walker::{OpenContext, Walker, WalkerOptions};

// Re-export data
pub use data::DEFAULT_REGISTRY;

// Re-export utilities
pub use utils::diagnostics;
pub use utils::error::{ParseError, ParseResult, RegistryError, RegistryResult, SpecError};

/// Parse `source` with the built-in LaTeX specs
pub fn parse_latex(source: &str) -> ParseResult<NodeList> {
    Walker::with_default_specs(source).parse_document()
}

/// Parse `source` with the built-in LaTeX specs, returning the diagnostics
/// collected along the way
pub fn parse_latex_with_diagnostics(
    source: &str,
) -> (ParseResult<NodeList>, diagnostics::Diagnostics) {
    let mut walker = Walker::with_default_specs(source);
    let result = walker.parse_document();
    (result, walker.take_diagnostics())
}
