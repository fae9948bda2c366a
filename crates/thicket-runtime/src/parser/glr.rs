//! GLR engine.
//!
//! One token at a time: every head reduces as far as the lookahead allows,
//! forking at cells with several actions, then all surviving heads shift the
//! token together. Heads whose stacks carry identical states are merged and
//! the rest are capped at `max_heads`. When no head survives, recovery takes
//! over with the preferred dead head.

use std::collections::VecDeque;
use std::sync::Arc;

use thicket_core::{ProductionId, SYMBOL_END, StateId, SymbolId};
use thicket_table::{Action, ParseTable};

use crate::cancel::Cancellation;
use crate::error::ParseError;
use crate::incremental::{self, ReuseCursor, ReuseStats};
use crate::language::Language;
use crate::lexer::{Lexer, Token};
use crate::options::ParseOptions;
use crate::stack::{Head, Stack, preferred};
use crate::subtree::{Span, Subtree};
use crate::trace::Tracer;

use super::recover::Recovered;

/// Reductions allowed while processing one lookahead.
const MAX_REDUCTIONS: usize = 4096;

pub(super) struct Engine<'a, T: Tracer> {
    pub(super) table: &'a ParseTable,
    lexer: Lexer<'a>,
    pub(super) options: &'a ParseOptions,
    cancellation: Option<&'a dyn Cancellation>,
    pub(super) tracer: &'a mut T,
    pub(super) stack: Stack,
    pub(super) heads: Vec<Head>,
    /// Where the next token's padding starts.
    pub(super) position: usize,
    /// Lex the next token in this state instead of the heads' states.
    lex_override: Option<StateId>,
    /// Tokens skipped since the parse last made sense.
    pub(super) pending: Vec<Arc<Subtree>>,
    /// A recovery symbol was skipped into `pending`.
    pub(super) resync: bool,
    reuse: Option<ReuseCursor>,
    stats: ReuseStats,
    fuel: Option<u32>,
}

/// Outcome of running every head against one lookahead.
pub(super) struct Phase {
    /// Heads that shift, with the target state (`None` for extras).
    pub shifts: Vec<(Head, Option<StateId>)>,
    pub accepts: Vec<Head>,
    pub dead: Vec<Head>,
    /// The phase ran with several heads or hit a conflict.
    pub fragile: bool,
}

impl<'a, T: Tracer> Engine<'a, T> {
    pub(super) fn new(
        language: &'a Language,
        options: &'a ParseOptions,
        cancellation: Option<&'a dyn Cancellation>,
        text: &'a str,
        reuse: Option<ReuseCursor>,
        tracer: &'a mut T,
    ) -> Self {
        let table = language.table();
        Self {
            table,
            lexer: Lexer::new(table, language.scanner(), text),
            options,
            cancellation,
            tracer,
            stack: Stack::new(0),
            heads: vec![Head::new(0)],
            position: 0,
            lex_override: None,
            pending: Vec::new(),
            resync: false,
            reuse,
            stats: ReuseStats::default(),
            fuel: options.exec_fuel,
        }
    }

    pub(super) fn run(mut self) -> Result<(Arc<Subtree>, ReuseStats), ParseError> {
        loop {
            if self.cancellation.is_some_and(|c| c.is_cancelled()) {
                self.heads.clear();
                return Err(ParseError::Cancelled);
            }
            let token = self.next_token();
            if let Some(root) = self.consume(token)? {
                return Ok((root, self.stats));
            }
        }
    }

    fn next_token(&mut self) -> Token {
        let states: Vec<StateId> = match self.lex_override.take() {
            Some(state) => vec![state],
            None => self
                .heads
                .iter()
                .map(|head| self.stack.state(head.node))
                .collect(),
        };
        let token = self.lexer.lex(self.position, &states);
        self.tracer.trace_lex(&token);
        token
    }

    pub(super) fn spend_fuel(&mut self) -> Result<(), ParseError> {
        if let Some(fuel) = &mut self.fuel {
            if *fuel == 0 {
                return Err(ParseError::FuelExhausted);
            }
            *fuel -= 1;
        }
        Ok(())
    }

    /// Process one token until it is shifted, skipped or ends the parse.
    fn consume(&mut self, mut token: Token) -> Result<Option<Arc<Subtree>>, ParseError> {
        let mut attempts = 0;
        loop {
            // Reductions that only happen because recovery reshaped the stack
            // depend on more than their own tokens.
            let recovering = attempts > 0 || !self.pending.is_empty();
            let dead = if !self.pending.is_empty() && !self.resume(&token) {
                self.heads[0].clone()
            } else {
                let phase = self.reduce_phase(&token, recovering)?;
                if let Some(head) = preferred(phase.accepts) {
                    return Ok(Some(self.accept(head, &token)));
                }
                if !phase.shifts.is_empty() {
                    if !self.try_reuse(&phase.shifts, &token)? {
                        self.shift(phase.shifts, &token, phase.fragile, None);
                    }
                    return Ok(None);
                }
                preferred(phase.dead).unwrap_or_else(|| Head::new(0))
            };

            attempts += 1;
            match self.recover(dead, &mut token, attempts)? {
                Recovered::Retry => continue,
                Recovered::Consumed => return Ok(None),
                Recovered::Finished(root) => return Ok(Some(root)),
            }
        }
    }

    /// Run every head against `token`, reducing until each one shifts,
    /// accepts or dies. With `recovering`, every node reduced here is fragile.
    pub(super) fn reduce_phase(
        &mut self,
        token: &Token,
        recovering: bool,
    ) -> Result<Phase, ParseError> {
        let table = self.table;
        let multi = self.heads.len() > 1;
        let mut work: VecDeque<(Head, bool)> = self.heads.drain(..).map(|h| (h, false)).collect();
        let mut phase = Phase {
            shifts: Vec::new(),
            accepts: Vec::new(),
            dead: Vec::new(),
            fragile: multi,
        };
        let mut reductions = 0;

        while let Some((head, forked)) = work.pop_front() {
            let state = self.stack.state(head.node);
            let actions = table.actions(state, token.symbol);
            if actions.is_empty() {
                phase.dead.push(head);
                continue;
            }
            let conflict = actions.len() > 1;
            if conflict {
                self.tracer.trace_fork(state, token.symbol, actions.len());
                phase.fragile = true;
            }

            for (index, &action) in actions.iter().enumerate() {
                self.spend_fuel()?;
                let mut branch = head.clone();
                if conflict {
                    branch.path.push(index as u16);
                }
                match action {
                    Action::Shift { state } => phase.shifts.push((branch, Some(state))),
                    Action::ShiftExtra => phase.shifts.push((branch, None)),
                    Action::Accept => phase.accepts.push(branch),
                    Action::Reduce { production } => {
                        if reductions >= MAX_REDUCTIONS {
                            phase.dead.push(branch);
                            continue;
                        }
                        reductions += 1;
                        let fragile = recovering || multi || forked || conflict;
                        match self.reduce(&branch, production, token, fragile) {
                            Some(next) => work.push_back((next, forked || conflict)),
                            None => phase.dead.push(branch),
                        }
                    }
                }
            }
        }
        Ok(phase)
    }

    /// Pop the production's children, push its node. Extras on top of the
    /// stack stay on top.
    fn reduce(
        &mut self,
        head: &Head,
        production: ProductionId,
        token: &Token,
        fragile: bool,
    ) -> Option<Head> {
        let table = self.table;
        let rule = table.production(production);

        let mut node = head.node;
        let mut trailing = Vec::new();
        loop {
            let entry = self.stack.node(node);
            match &entry.subtree {
                Some(subtree) if subtree.extra => {
                    trailing.push(Arc::clone(subtree));
                    node = entry.parent?;
                }
                _ => break,
            }
        }

        let mut children = Vec::with_capacity(rule.len());
        let mut remaining = rule.len();
        while remaining > 0 {
            let entry = self.stack.node(node);
            let subtree = entry.subtree.clone()?;
            if !subtree.extra {
                remaining -= 1;
            }
            children.push(subtree);
            node = entry.parent?;
        }
        children.reverse();
        trailing.reverse();

        let base = self.stack.node(node);
        let (state, start) = (base.state, base.position);
        let next = table.goto(state, rule.lhs)?;
        let span = Span {
            start,
            lookahead_end: token.lookahead_end,
        };
        let subtree = Subtree::node(
            rule.lhs,
            Some(production),
            children,
            span,
            rule.dynamic_precedence,
            fragile,
            Some(state),
        );

        let mut top = self.stack.push(node, next, subtree);
        for extra in trailing {
            top = self.stack.push(top, next, extra);
        }
        self.tracer.trace_reduce(production, rule.lhs, next);

        Some(Head {
            node: top,
            dynamic_precedence: head.dynamic_precedence + rule.dynamic_precedence,
            ..head.clone()
        })
    }

    /// Shift `token` on every head. With `missing`, the token is a zero-width
    /// stand-in and each head gets an ERROR node instead of a leaf.
    pub(super) fn shift(
        &mut self,
        shifts: Vec<(Head, Option<StateId>)>,
        token: &Token,
        fragile: bool,
        missing: Option<SymbolId>,
    ) {
        let fragile = fragile || shifts.len() > 1;
        let mut heads = Vec::with_capacity(shifts.len());
        for (mut head, target) in shifts {
            let state = self.stack.state(head.node);
            let (next, extra) = match target {
                Some(next) => (next, false),
                None => (state, true),
            };
            let leaf = match missing {
                Some(symbol) => Subtree::missing(symbol, token),
                None => Subtree::leaf(token, extra, fragile, state, next),
            };
            head.node = self.stack.push(head.node, next, leaf);
            if missing.is_some() {
                head.insertions += 1;
                head.error_cost += 1;
            } else if !extra {
                head.insertions = 0;
            }
            self.tracer.trace_shift(token.symbol, next, extra);
            heads.push(head);
        }
        self.position = token.end;
        self.heads = heads;
        self.merge_heads();
    }

    /// Splice an old subtree in place of shifting `token`.
    ///
    /// Only when exactly one head shifts: the old subtree was then built from
    /// the same state over the same tokens and would be built again.
    fn try_reuse(
        &mut self,
        shifts: &[(Head, Option<StateId>)],
        token: &Token,
    ) -> Result<bool, ParseError> {
        let [(head, Some(_))] = shifts else {
            return Ok(false);
        };
        let Some(reuse) = &self.reuse else {
            return Ok(false);
        };
        let candidates = reuse.candidates(self.position);
        let state = self.stack.state(head.node);

        for candidate in candidates {
            if !incremental::reusable(&candidate, token, state) {
                continue;
            }
            let Some(next) = self.table.goto(state, candidate.symbol) else {
                continue;
            };
            self.spend_fuel()?;

            let start = self.position;
            let end = start + candidate.total();
            self.tracer
                .trace_reuse(candidate.symbol, start + candidate.padding..end);
            self.stats.reused_nodes += 1;
            self.stats.reused_bytes += candidate.total();
            self.lex_override = candidate.lex_after;

            let dynamic_precedence = head.dynamic_precedence + candidate.dynamic_precedence;
            let node = self.stack.push(head.node, next, candidate);
            self.heads = vec![Head {
                node,
                dynamic_precedence,
                insertions: 0,
                ..head.clone()
            }];
            self.position = end;
            return Ok(true);
        }
        Ok(false)
    }

    /// Merge heads with identical state stacks, keeping the preferred one,
    /// then enforce the head cap.
    fn merge_heads(&mut self) {
        let mut heads = std::mem::take(&mut self.heads);
        heads.sort_by(|a, b| a.preference(b));

        let mut kept: Vec<Head> = Vec::with_capacity(heads.len());
        for head in heads {
            if kept
                .iter()
                .any(|k| self.stack.same_states(k.node, head.node))
            {
                self.tracer.trace_merge(self.stack.state(head.node));
                continue;
            }
            kept.push(head);
        }

        let cap = self.options.max_heads;
        if kept.len() > cap {
            self.tracer.trace_prune(kept.len() - cap);
            kept.truncate(cap);
        }
        if let [only] = kept.as_mut_slice() {
            only.path.clear();
        }
        self.heads = kept;
    }

    /// Build the root from an accepting head. Extras around the start node
    /// become its first and last children.
    fn accept(&mut self, head: Head, token: &Token) -> Arc<Subtree> {
        let subtrees = self.stack.subtrees(head.node);
        let span = Span {
            start: 0,
            lookahead_end: token.lookahead_end,
        };
        let main: Vec<usize> = subtrees
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.extra)
            .map(|(i, _)| i)
            .collect();

        let root = match main[..] {
            [index] => {
                let leading = subtrees[..index].to_vec();
                let trailing = subtrees[index + 1..].to_vec();
                subtrees[index].with_extras(leading, trailing, span)
            }
            _ => Subtree::error(subtrees, span, false),
        };
        debug_assert!(token.symbol == SYMBOL_END);
        self.tracer.trace_accept(root.symbol);
        root
    }
}
