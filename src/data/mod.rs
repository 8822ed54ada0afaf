//! Data layer - built-in spec tables
//!
//! This module contains the static LaTeX specs and the shared default
//! registry built from them.

pub mod latex_specs;

// Re-export commonly used items
pub use latex_specs::{
    build_default_registry, BASE_CATEGORY, DEFAULT_REGISTRY, ENVIRONMENTS_CATEGORY,
    SPECIALS_CATEGORY,
};
