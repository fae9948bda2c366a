#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for Thicket.
//!
//! Three layers:
//! - **Grammar layer**: the rule tree of a tree-sitter style `grammar.json`,
//!   with JSON deserialization and compact binary serialization
//! - **Identifier layer**: the integer ids shared by the compiler, the table
//!   format and the runtime
//! - **Text layer**: byte-offset edits and row/column points

use std::num::NonZeroU16;

pub mod colors;
mod edit;
pub mod grammar;

#[cfg(test)]
mod colors_tests;
#[cfg(test)]
mod edit_tests;

pub use colors::Colors;
pub use edit::{Edit, Point};
pub use grammar::{Grammar, GrammarError, Precedence, PrecedenceEntry, Rule};

// ============================================================================
// Common Types
// ============================================================================

/// Grammar symbol ID (terminals first, then nonterminals).
pub type SymbolId = u16;

/// Parse state ID.
pub type StateId = u16;

/// Production ID (index into the production list).
pub type ProductionId = u16;

/// Field ID (0 is reserved for "no field").
pub type FieldId = NonZeroU16;

/// End-of-input terminal. Always symbol 0.
pub const SYMBOL_END: SymbolId = 0;

/// Error symbol used for ERROR nodes and unrecognized input.
pub const SYMBOL_ERROR: SymbolId = u16::MAX;

/// Name rendered for [`SYMBOL_ERROR`].
pub const ERROR_NAME: &str = "ERROR";

/// Name rendered for [`SYMBOL_END`].
pub const END_NAME: &str = "end";
