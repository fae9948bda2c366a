//! Grammar types for tree-sitter style grammars.
//!
//! This module provides types for representing `grammar.json` files, with
//! support for JSON deserialization, compact binary serialization and a small
//! builder API for constructing grammars in code.

mod binary;
mod builder;
mod json;
mod types;

#[cfg(test)]
mod binary_tests;

pub use json::GrammarError;
pub use types::{Grammar, Precedence, PrecedenceEntry, Rule};
