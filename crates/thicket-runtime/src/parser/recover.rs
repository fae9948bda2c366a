//! Error recovery.
//!
//! When no head can take the lookahead, the preferred dead head tries, in
//! order:
//! 1. inserting a zero-width ERROR node for a missing symbol after which the
//!    lookahead is viable (nonterminals before terminals, lower ids first);
//! 2. at end of input or a recovery symbol, popping to the topmost stack
//!    entry where the lookahead is viable, folding the popped entries into
//!    an ERROR node;
//! 3. skipping the token into a pending ERROR node that is closed as soon as
//!    a token is viable again. Once a recovery symbol has been skipped, later
//!    tokens may also pop to a lower entry as in 2.
//!
//! At end of input with nothing viable the whole stack becomes an ERROR root.

use std::sync::Arc;

use thicket_core::{SYMBOL_END, SYMBOL_ERROR, StateId, SymbolId};
use thicket_table::Action;

use crate::error::ParseError;
use crate::lexer::Token;
use crate::stack::{Head, Stack, StackId};
use crate::subtree::{Span, Subtree};
use crate::trace::{Recovery, Tracer};

use super::glr::Engine;

/// Recovery attempts per token before falling back to skipping.
const MAX_ATTEMPTS: u32 = 6;

/// Actions a viability check may simulate.
const SIMULATION_BUDGET: usize = 256;

pub(super) enum Recovered {
    /// The stack changed; process the same token again.
    Retry,
    /// The token was skipped.
    Consumed,
    Finished(Arc<Subtree>),
}

/// A stack as seen by a simulation: states pushed on top of a real node.
#[derive(Clone, Debug)]
struct Sim {
    base: StackId,
    pushed: Vec<StateId>,
}

impl Sim {
    fn new(base: StackId, pushed: &[StateId]) -> Self {
        Self {
            base,
            pushed: pushed.to_vec(),
        }
    }

    fn top(&self, stack: &Stack) -> StateId {
        self.pushed
            .last()
            .copied()
            .unwrap_or_else(|| stack.state(self.base))
    }

    /// Pop `count` non-extra entries; fails at the bottom of the stack.
    fn pop(&mut self, stack: &Stack, count: usize) -> bool {
        for _ in 0..count {
            if self.pushed.pop().is_some() {
                continue;
            }
            loop {
                let node = stack.node(self.base);
                let Some(parent) = node.parent else {
                    return false;
                };
                let extra = node.is_extra();
                self.base = parent;
                if !extra {
                    break;
                }
            }
        }
        true
    }
}

impl<T: Tracer> Engine<'_, T> {
    pub(super) fn recover(
        &mut self,
        head: Head,
        token: &mut Token,
        attempts: u32,
    ) -> Result<Recovered, ParseError> {
        self.spend_fuel()?;
        let at_end = token.symbol == SYMBOL_END;

        if attempts <= MAX_ATTEMPTS {
            if self.pending.is_empty()
                && token.symbol != SYMBOL_ERROR
                && head.insertions < self.options.max_insertions
                && let Some(inserted) = self.insert(&head, token)?
            {
                self.heads = vec![inserted];
                return Ok(Recovered::Retry);
            }
            if (at_end || self.resync || self.table.is_recovery(token.symbol))
                && let Some(popped) = self.pop_to_viable(&head, token)
            {
                self.heads = vec![popped];
                return Ok(Recovered::Retry);
            }
        }

        if at_end {
            return Ok(Recovered::Finished(self.wrap(&head, token)));
        }
        self.skip(head, token);
        Ok(Recovered::Consumed)
    }

    /// Close the pending ERROR node if `token` makes sense again.
    pub(super) fn resume(&mut self, token: &Token) -> bool {
        let node = self.heads[0].node;
        if !self.table.is_extra(token.symbol) && !self.viable(node, &[], token.symbol) {
            return false;
        }
        let children = std::mem::take(&mut self.pending);
        let span = Span {
            start: self.stack.node(node).position,
            lookahead_end: token.lookahead_end,
        };
        let error = Subtree::error(children, span, true);
        let state = self.stack.state(node);
        self.heads[0].node = self.stack.push(node, state, error);
        self.heads[0].error_cost += 1;
        self.resync = false;
        true
    }

    /// Insert a zero-width ERROR node for the first missing symbol that makes
    /// `token` viable. The node takes over the token's padding.
    fn insert(&mut self, head: &Head, token: &mut Token) -> Result<Option<Head>, ParseError> {
        let table = self.table;
        let state = self.stack.state(head.node);
        let first = table.terminal_count();
        let last = first + table.data().nonterminal_count as usize;

        for symbol in (first..last).map(|s| s as SymbolId) {
            let Some(next) = table.goto(state, symbol) else {
                continue;
            };
            if !self.viable(head.node, &[next], token.symbol) {
                continue;
            }
            let node = self.stack.push(head.node, next, Subtree::missing(symbol, token));
            self.inserted(symbol, token);
            return Ok(Some(Head {
                node,
                error_cost: head.error_cost + 1,
                insertions: head.insertions + 1,
                ..head.clone()
            }));
        }

        for &symbol in table.valid_terminals(state) {
            if symbol == SYMBOL_END || table.is_extra(symbol) {
                continue;
            }
            let Some(after) = self.simulate(Sim::new(head.node, &[]), symbol) else {
                continue;
            };
            if self.simulate(after, token.symbol).is_none() {
                continue;
            }

            let stand_in = Token {
                symbol,
                padding_start: token.padding_start,
                start: token.start,
                end: token.start,
                lookahead_end: token.lookahead_end,
            };
            self.heads = vec![head.clone()];
            let phase = self.reduce_phase(&stand_in, true)?;
            let Some(best) = phase
                .shifts
                .into_iter()
                .filter(|(_, target)| target.is_some())
                .min_by(|(a, _), (b, _)| a.preference(b))
            else {
                continue;
            };
            self.shift(vec![best], &stand_in, true, Some(symbol));
            self.inserted(symbol, token);
            return Ok(self.heads.first().cloned());
        }
        Ok(None)
    }

    fn inserted(&mut self, symbol: SymbolId, token: &mut Token) {
        self.tracer.trace_recover(&Recovery::Insert {
            symbol,
            at: token.start,
        });
        token.padding_start = token.start;
        self.position = token.start;
    }

    /// Pop to the topmost entry where `token` is viable; the popped entries
    /// and any pending skipped tokens become an extra ERROR node there.
    fn pop_to_viable(&mut self, head: &Head, token: &Token) -> Option<Head> {
        let mut node = head.node;
        let mut popped = 0;
        loop {
            node = self.stack.node(node).parent?;
            popped += 1;
            if !self.viable(node, &[], token.symbol) {
                continue;
            }

            let below = self.stack.node(node);
            let (state, start, depth) = (below.state, below.position, below.depth as usize);
            let mut children = self.stack.subtrees(head.node).split_off(depth);
            children.append(&mut self.pending);
            let span = Span {
                start,
                lookahead_end: token.lookahead_end,
            };
            let error = Subtree::error(children, span, true);
            let top = self.stack.push(node, state, error);
            self.resync = false;
            self.tracer.trace_recover(&Recovery::Pop { popped });
            return Some(Head {
                node: top,
                error_cost: head.error_cost + 1,
                dynamic_precedence: head.dynamic_precedence,
                path: Vec::new(),
                insertions: 0,
            });
        }
    }

    fn skip(&mut self, head: Head, token: &Token) {
        let state = self.stack.state(head.node);
        self.pending
            .push(Subtree::leaf(token, false, true, state, state));
        self.resync |= self.table.is_recovery(token.symbol);
        self.tracer.trace_recover(&Recovery::Skip {
            symbol: token.symbol,
            range: token.start..token.end,
        });
        self.position = token.end;
        self.heads = vec![head];
    }

    /// ERROR root over everything on the stack.
    fn wrap(&mut self, head: &Head, token: &Token) -> Arc<Subtree> {
        let mut children = self.stack.subtrees(head.node);
        children.append(&mut self.pending);
        self.tracer.trace_recover(&Recovery::Wrap);
        let span = Span {
            start: 0,
            lookahead_end: token.lookahead_end,
        };
        Subtree::error(children, span, false)
    }

    fn viable(&self, node: StackId, pushed: &[StateId], symbol: SymbolId) -> bool {
        self.simulate(Sim::new(node, pushed), symbol).is_some()
    }

    /// Run the LR automaton on `symbol` without touching the real stack.
    /// Returns the simulated stack after the symbol is shifted or accepted.
    fn simulate(&self, start: Sim, symbol: SymbolId) -> Option<Sim> {
        let table = self.table;
        let mut work = vec![start];
        let mut budget = SIMULATION_BUDGET;

        while let Some(mut sim) = work.pop() {
            loop {
                if budget == 0 {
                    return None;
                }
                budget -= 1;

                let mut reduced: Option<Sim> = None;
                for &action in table.actions(sim.top(&self.stack), symbol) {
                    match action {
                        Action::Shift { state } => {
                            sim.pushed.push(state);
                            return Some(sim);
                        }
                        Action::ShiftExtra | Action::Accept => return Some(sim),
                        Action::Reduce { production } => {
                            let rule = table.production(production);
                            let mut next = sim.clone();
                            if !next.pop(&self.stack, rule.len()) {
                                continue;
                            }
                            let Some(goto) = table.goto(next.top(&self.stack), rule.lhs) else {
                                continue;
                            };
                            next.pushed.push(goto);
                            match reduced {
                                None => reduced = Some(next),
                                Some(_) => work.push(next),
                            }
                        }
                    }
                }

                match reduced {
                    Some(next) => sim = next,
                    None => break,
                }
            }
        }
        None
    }
}
