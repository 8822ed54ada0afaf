//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Diagnostics and error reporting
//! - Error types and result types

pub mod diagnostics;
pub mod error;

// Re-export commonly used items
pub use diagnostics::{format_diagnostics, Diagnostic, DiagnosticKind, DiagnosticLevel, Diagnostics};
pub use error::{ParseError, ParseResult, RegistryError, RegistryResult, SpecError};
