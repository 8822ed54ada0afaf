//! Parsing state and parsing-state deltas
//!
//! A [`ParsingState`] is the read-only bundle every parser receives: the spec
//! registry, the source text and a handful of mode flags. It is never
//! mutated in place. Parsers that want subsequent parsing to happen under a
//! different state return a [`ParsingStateDelta`] carrying the replacement.

use std::fmt;
use std::sync::Arc;

use super::registry::SpecRegistry;

/// Read-only context passed through a parse
#[derive(Clone)]
pub struct ParsingState {
    source: Arc<str>,
    registry: Arc<SpecRegistry>,
    /// Whether content is being parsed in math mode
    pub in_math_mode: bool,
    /// Whether `%` starts a comment
    pub enable_comments: bool,
    /// Whether registered specials are recognized
    pub enable_specials: bool,
}

impl ParsingState {
    pub fn new(source: impl Into<Arc<str>>, registry: Arc<SpecRegistry>) -> Self {
        Self {
            source: source.into(),
            registry,
            in_math_mode: false,
            enable_comments: true,
            enable_specials: true,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn registry(&self) -> &SpecRegistry {
        &self.registry
    }

    /// Shared handle to the registry, for building derived states
    pub fn registry_handle(&self) -> Arc<SpecRegistry> {
        Arc::clone(&self.registry)
    }

    /// Source text between two character offsets
    pub fn source_slice(&self, pos: usize, pos_end: usize) -> String {
        self.source
            .chars()
            .skip(pos)
            .take(pos_end.saturating_sub(pos))
            .collect()
    }

    pub fn with_math_mode(&self, in_math_mode: bool) -> Self {
        Self {
            in_math_mode,
            ..self.clone()
        }
    }

    pub fn with_comments(&self, enable_comments: bool) -> Self {
        Self {
            enable_comments,
            ..self.clone()
        }
    }

    pub fn with_specials(&self, enable_specials: bool) -> Self {
        Self {
            enable_specials,
            ..self.clone()
        }
    }

    pub fn with_registry(&self, registry: Arc<SpecRegistry>) -> Self {
        Self {
            registry,
            ..self.clone()
        }
    }
}

/// States are equal when they share the same source and registry instances
/// and agree on every flag.
impl PartialEq for ParsingState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
            && Arc::ptr_eq(&self.registry, &other.registry)
            && self.in_math_mode == other.in_math_mode
            && self.enable_comments == other.enable_comments
            && self.enable_specials == other.enable_specials
    }
}

impl fmt::Debug for ParsingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsingState")
            .field("categories", &self.registry.category_names())
            .field("in_math_mode", &self.in_math_mode)
            .field("enable_comments", &self.enable_comments)
            .field("enable_specials", &self.enable_specials)
            .finish()
    }
}

/// A requested replacement state for whatever parsing follows
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingStateDelta {
    new_state: ParsingState,
}

impl ParsingStateDelta {
    pub fn replace(new_state: ParsingState) -> Self {
        Self { new_state }
    }

    pub fn state(&self) -> &ParsingState {
        &self.new_state
    }

    pub fn into_state(self) -> ParsingState {
        self.new_state
    }
}

/// Declarative state change attached to a callable spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChange {
    MathMode(bool),
    Comments(bool),
    Specials(bool),
}

impl StateChange {
    pub fn apply(&self, state: &ParsingState) -> ParsingState {
        match *self {
            StateChange::MathMode(on) => state.with_math_mode(on),
            StateChange::Comments(on) => state.with_comments(on),
            StateChange::Specials(on) => state.with_specials(on),
        }
    }

    /// Delta that replaces `state` with the changed one
    pub fn delta_from(&self, state: &ParsingState) -> ParsingStateDelta {
        ParsingStateDelta::replace(self.apply(state))
    }
}
