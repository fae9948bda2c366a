//! Thicket parser runtime.
//!
//! Drives a compiled [`ParseTable`](thicket_table::ParseTable) over source
//! text and produces a full-coverage [`Tree`]:
//! - [`Language`] - a loaded table plus an optional [`ExternalScanner`]
//! - [`Parser`] - GLR engine with bounded forking, merging and error recovery
//! - [`Tree`] / [`Node`] - immutable arena of visible nodes
//!
//! Reparsing after an edit reuses undamaged subtrees of the old tree; the
//! result is identical to a full parse of the new text.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod cancel;
mod error;
mod incremental;
mod language;
mod lexer;
mod options;
mod parser;
mod scanner;
mod stack;
mod subtree;
pub mod trace;
mod tree;

#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod options_tests;
#[cfg(test)]
mod recovery_tests;
#[cfg(test)]
pub(crate) mod test_utils;

pub use cancel::{Cancellation, CancellationToken};
pub use error::ParseError;
pub use incremental::ReuseStats;
pub use language::Language;
pub use lexer::Token;
pub use options::ParseOptions;
pub use parser::Parser;
pub use scanner::{ExternalScanner, ScanCursor};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use tree::{Children, Descendants, Node, NodeId, Tree, TreeCursor};
