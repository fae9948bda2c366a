//! Tracing infrastructure for debugging parser execution.
//!
//! # Design: Zero-Cost Abstraction
//!
//! The parser is generic over [`Tracer`]. With [`NoopTracer`]:
//! - All trait methods are `#[inline(always)]` empty functions
//! - The compiler eliminates all tracer calls and their arguments
//! - No tracing-related state exists in the parse stack or heads
//!
//! [`PrintTracer`] resolves symbol names against the table and collects one
//! line per event.

use std::ops::Range;

use thicket_core::{Colors, ProductionId, StateId, SymbolId};
use thicket_table::ParseTable;

use crate::lexer::Token;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Default: shifts, forks, recovery, reuse and accept. No text.
    #[default]
    Default,
    /// Verbose (-v): also lexing, reductions, merges and pruning.
    Verbose,
    /// Very verbose (-vv): everything, with token text.
    VeryVerbose,
}

/// What error recovery did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recovery {
    /// A zero-width ERROR node standing for `symbol` was inserted at `at`.
    Insert { symbol: SymbolId, at: usize },
    /// A token was skipped into an ERROR node.
    Skip { symbol: SymbolId, range: Range<usize> },
    /// `popped` stack entries were folded into an ERROR node.
    Pop { popped: usize },
    /// The whole stack was wrapped in an ERROR root.
    Wrap,
}

/// Tracer trait for parser instrumentation.
///
/// Methods receive raw ids; name resolution happens in the implementation.
pub trait Tracer {
    /// Called after a token is lexed.
    fn trace_lex(&mut self, token: &Token);

    /// Called when a head shifts the lookahead.
    fn trace_shift(&mut self, symbol: SymbolId, state: StateId, extra: bool);

    /// Called after a reduction pushes its node.
    fn trace_reduce(&mut self, production: ProductionId, symbol: SymbolId, state: StateId);

    /// Called when a head meets several actions.
    fn trace_fork(&mut self, state: StateId, symbol: SymbolId, branches: usize);

    /// Called when a head is absorbed by an equivalent one.
    fn trace_merge(&mut self, state: StateId);

    /// Called when heads beyond the cap are dropped.
    fn trace_prune(&mut self, dropped: usize);

    /// Called after error recovery acts.
    fn trace_recover(&mut self, recovery: &Recovery);

    /// Called when an old subtree is reused.
    fn trace_reuse(&mut self, symbol: SymbolId, range: Range<usize>);

    /// Called when the parse accepts.
    fn trace_accept(&mut self, symbol: SymbolId);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_lex(&mut self, _token: &Token) {}

    #[inline(always)]
    fn trace_shift(&mut self, _symbol: SymbolId, _state: StateId, _extra: bool) {}

    #[inline(always)]
    fn trace_reduce(&mut self, _production: ProductionId, _symbol: SymbolId, _state: StateId) {}

    #[inline(always)]
    fn trace_fork(&mut self, _state: StateId, _symbol: SymbolId, _branches: usize) {}

    #[inline(always)]
    fn trace_merge(&mut self, _state: StateId) {}

    #[inline(always)]
    fn trace_prune(&mut self, _dropped: usize) {}

    #[inline(always)]
    fn trace_recover(&mut self, _recovery: &Recovery) {}

    #[inline(always)]
    fn trace_reuse(&mut self, _symbol: SymbolId, _range: Range<usize>) {}

    #[inline(always)]
    fn trace_accept(&mut self, _symbol: SymbolId) {}
}

/// Tracer that collects a parse trace for debugging.
pub struct PrintTracer<'s> {
    /// Source code for extracting token text.
    source: &'s str,
    /// Table for symbol names.
    table: &'s ParseTable,
    /// Verbosity level for output filtering.
    verbosity: Verbosity,
    /// Collected trace lines.
    lines: Vec<String>,
    /// Color palette.
    colors: Colors,
}

impl<'s> PrintTracer<'s> {
    pub fn new(source: &'s str, table: &'s ParseTable, verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            source,
            table,
            verbosity,
            lines: Vec::new(),
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Print all collected lines to stdout.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }

    fn verbose(&self) -> bool {
        self.verbosity != Verbosity::Default
    }

    fn push(&mut self, op: &str, detail: String) {
        let c = self.colors;
        self.lines.push(format!("  {}{op:<8}{} {detail}", c.dim, c.reset));
    }

    fn name(&self, symbol: SymbolId) -> String {
        let c = self.colors;
        let name = self.table.symbol_name(symbol);
        if self.table.is_named(symbol) {
            format!("{}{name}{}", c.blue, c.reset)
        } else {
            format!("{}\"{name}\"{}", c.green, c.reset)
        }
    }

    fn range(&self, range: Range<usize>) -> String {
        let c = self.colors;
        let text = if self.verbosity == Verbosity::VeryVerbose {
            let snippet = self.source.get(range.clone()).unwrap_or_default();
            format!(" {}{}{snippet:?}{}", c.dim, c.green, c.reset)
        } else {
            String::new()
        };
        format!("{}{}..{}{}{text}", c.dim, range.start, range.end, c.reset)
    }
}

impl Tracer for PrintTracer<'_> {
    fn trace_lex(&mut self, token: &Token) {
        if !self.verbose() {
            return;
        }
        let detail = format!("{} {}", self.name(token.symbol), self.range(token.start..token.end));
        self.push("lex", detail);
    }

    fn trace_shift(&mut self, symbol: SymbolId, state: StateId, extra: bool) {
        let suffix = if extra { " (extra)" } else { "" };
        let detail = format!("{} -> {state}{suffix}", self.name(symbol));
        self.push("shift", detail);
    }

    fn trace_reduce(&mut self, production: ProductionId, symbol: SymbolId, state: StateId) {
        if !self.verbose() {
            return;
        }
        let children = self.table.production(production).len();
        let detail = format!("{} ({children}) -> {state}", self.name(symbol));
        self.push("reduce", detail);
    }

    fn trace_fork(&mut self, state: StateId, symbol: SymbolId, branches: usize) {
        let detail = format!("{branches} ways on {} in state {state}", self.name(symbol));
        self.push("fork", detail);
    }

    fn trace_merge(&mut self, state: StateId) {
        if !self.verbose() {
            return;
        }
        self.push("merge", format!("heads in state {state}"));
    }

    fn trace_prune(&mut self, dropped: usize) {
        if !self.verbose() {
            return;
        }
        self.push("prune", format!("{dropped} heads over the cap"));
    }

    fn trace_recover(&mut self, recovery: &Recovery) {
        let c = self.colors;
        let detail = match recovery {
            Recovery::Insert { symbol, at } => format!("insert {} at {at}", self.name(*symbol)),
            Recovery::Skip { symbol, range } => {
                format!("skip {} {}", self.name(*symbol), self.range(range.clone()))
            }
            Recovery::Pop { popped } => format!("pop {popped} entries"),
            Recovery::Wrap => "wrap stack".to_string(),
        };
        self.push("recover", format!("{}{detail}{}", c.red, c.reset));
    }

    fn trace_reuse(&mut self, symbol: SymbolId, range: Range<usize>) {
        let detail = format!("{} {}", self.name(symbol), self.range(range));
        self.push("reuse", detail);
    }

    fn trace_accept(&mut self, symbol: SymbolId) {
        let detail = self.name(symbol);
        self.push("accept", detail);
    }
}
