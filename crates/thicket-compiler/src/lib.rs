//! Thicket grammar compiler.
//!
//! Turns a [`Grammar`] into a parse table blob in four passes:
//! - `lower` - numbers symbols and flattens rules into productions
//! - `lalr` - builds the LALR(1) automaton
//! - `conflicts` - fills the action table, resolving what precedence can
//! - `emit` - deduplicates actions and compiles token DFAs
//!
//! Conflicts that survive resolution stay in the table; the GLR runtime
//! explores them at parse time.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod conflicts;
pub mod diagnostics;
mod emit;
mod first;
mod lalr;
mod lower;
mod precedence;
mod tokens;

#[cfg(test)]
mod diagnostics_tests;
#[cfg(test)]
mod lalr_tests;
#[cfg(test)]
mod lower_tests;
#[cfg(test)]
mod precedence_tests;
#[cfg(test)]
mod tokens_tests;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};

use thicket_core::Grammar;
use thicket_table::{TableData, TableError};

/// Errors that stop compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("grammar compilation failed with {} errors", .0.error_count())]
    Grammar(Diagnostics),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Result of a successful compilation.
#[derive(Debug)]
pub struct Compiled {
    pub table: TableData,
    /// Encoded blob, ready for `ParseTable::from_bytes`.
    pub bytes: Vec<u8>,
    /// Warnings collected along the way.
    pub diagnostics: Diagnostics,
    pub stats: CompileStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub states: usize,
    pub productions: usize,
    /// Table cells holding more than one action.
    pub conflicts: usize,
}

/// Compile a grammar into a parse table.
pub fn compile(grammar: &Grammar) -> Result<Compiled, CompileError> {
    let mut diagnostics = Diagnostics::new();
    let Some((table, stats)) = run(grammar, &mut diagnostics) else {
        return Err(CompileError::Grammar(diagnostics));
    };
    let bytes = thicket_table::encode(&table)?;
    Ok(Compiled {
        table,
        bytes,
        diagnostics,
        stats,
    })
}

/// Run every pass and return the diagnostics without producing a table.
pub fn check(grammar: &Grammar) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    run(grammar, &mut diagnostics);
    diagnostics
}

fn run(grammar: &Grammar, diagnostics: &mut Diagnostics) -> Option<(TableData, CompileStats)> {
    let lowered = lower::lower(grammar, diagnostics)?;
    if diagnostics.has_errors() {
        return None;
    }

    let first = first::FirstSets::compute(&lowered);
    let automaton = lalr::build(&lowered, &first, diagnostics)?;
    let actions = conflicts::resolve(&lowered, &automaton, diagnostics);
    let table = emit::emit(&lowered, &actions, diagnostics)?;

    let stats = CompileStats {
        states: automaton.states.len(),
        productions: lowered.productions.len(),
        conflicts: actions.conflict_count,
    };
    Some((table, stats))
}
