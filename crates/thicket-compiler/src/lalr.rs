//! LALR(1) automaton construction.
//!
//! States are built from LR(1) item sets, merging states whose kernels share
//! the same cores. When a merge adds lookaheads to an existing state the
//! state is revisited so the new lookaheads reach its successors.

use std::collections::{BTreeMap, HashMap, VecDeque};

use thicket_core::{SYMBOL_END, StateId, SymbolId};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::first::{FirstSets, TerminalSet};
use crate::lower::LoweredGrammar;

/// Largest number of states a table can address.
pub(crate) const MAX_STATES: usize = u16::MAX as usize - 1;

/// An LR(0) core: a production with a position in its right-hand side.
/// The augmented production `S' -> start` has index `productions.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Item {
    pub production: u32,
    pub dot: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct LrState {
    /// Kernel items with their lookaheads, sorted by core.
    pub kernel: Vec<(Item, TerminalSet)>,
    /// Kernel plus closure items.
    pub closure: Vec<(Item, TerminalSet)>,
    pub transitions: BTreeMap<SymbolId, StateId>,
}

#[derive(Debug)]
pub(crate) struct Automaton {
    pub states: Vec<LrState>,
    /// Right-hand sides, augmented production last.
    rhs: Vec<Vec<SymbolId>>,
}

impl Automaton {
    pub(crate) fn augmented(&self) -> u32 {
        (self.rhs.len() - 1) as u32
    }

    pub(crate) fn rhs(&self, production: u32) -> &[SymbolId] {
        &self.rhs[production as usize]
    }

    /// Symbol after the dot, if any.
    pub(crate) fn next_symbol(&self, item: Item) -> Option<SymbolId> {
        self.rhs(item.production).get(item.dot as usize).copied()
    }
}

struct Builder<'a> {
    grammar: &'a LoweredGrammar,
    first: &'a FirstSets,
    rhs: Vec<Vec<SymbolId>>,
    /// Productions of each nonterminal, indexed by `symbol - terminal_count`.
    by_lhs: Vec<Vec<u32>>,
}

/// Build the automaton. Reports `TableTooLarge` and returns `None` when
/// the state count does not fit the table format.
pub(crate) fn build(
    grammar: &LoweredGrammar,
    first: &FirstSets,
    diagnostics: &mut Diagnostics,
) -> Option<Automaton> {
    let mut rhs: Vec<Vec<SymbolId>> = grammar
        .productions
        .iter()
        .map(|p| p.children.iter().map(|c| c.symbol).collect())
        .collect();
    rhs.push(vec![grammar.start]);

    let mut by_lhs = vec![Vec::new(); grammar.nonterminal_count];
    for (index, production) in grammar.productions.iter().enumerate() {
        by_lhs[production.lhs as usize - grammar.terminal_count].push(index as u32);
    }

    let builder = Builder {
        grammar,
        first,
        rhs,
        by_lhs,
    };
    builder.run(diagnostics)
}

impl Builder<'_> {
    fn run(self, diagnostics: &mut Diagnostics) -> Option<Automaton> {
        let terminals = self.grammar.terminal_count;
        let augmented = (self.rhs.len() - 1) as u32;

        let mut start_lookahead = TerminalSet::new(terminals);
        start_lookahead.insert(SYMBOL_END);
        let start_kernel = vec![(
            Item {
                production: augmented,
                dot: 0,
            },
            start_lookahead,
        )];

        let mut kernels: Vec<Vec<(Item, TerminalSet)>> = vec![start_kernel];
        let mut transitions: Vec<BTreeMap<SymbolId, StateId>> = vec![BTreeMap::new()];
        let mut by_core: HashMap<Vec<Item>, StateId> = HashMap::new();
        by_core.insert(core_of(&kernels[0]), 0);

        let mut queue = VecDeque::from([0usize]);
        let mut queued = vec![true];

        while let Some(state) = queue.pop_front() {
            queued[state] = false;
            let closure = self.closure(&kernels[state]);

            let mut successors: BTreeMap<SymbolId, Vec<(Item, TerminalSet)>> = BTreeMap::new();
            for (item, lookahead) in &closure {
                let Some(symbol) = self.next_symbol(*item) else {
                    continue;
                };
                let advanced = Item {
                    production: item.production,
                    dot: item.dot + 1,
                };
                let kernel = successors.entry(symbol).or_default();
                match kernel.iter_mut().find(|(i, _)| *i == advanced) {
                    Some((_, existing)) => {
                        existing.union_with(lookahead);
                    }
                    None => kernel.push((advanced, lookahead.clone())),
                }
            }

            for (symbol, mut kernel) in successors {
                kernel.sort_by_key(|(item, _)| *item);
                let core = core_of(&kernel);
                let target = match by_core.get(&core) {
                    Some(&target) => {
                        let mut grew = false;
                        for ((_, mine), (_, theirs)) in
                            kernels[target as usize].iter_mut().zip(&kernel)
                        {
                            grew |= mine.union_with(theirs);
                        }
                        if grew && !queued[target as usize] {
                            queued[target as usize] = true;
                            queue.push_back(target as usize);
                        }
                        target
                    }
                    None => {
                        if kernels.len() >= MAX_STATES {
                            diagnostics
                                .report(
                                    DiagnosticKind::TableTooLarge,
                                    format!("grammar needs more than {MAX_STATES} parse states"),
                                )
                                .emit();
                            return None;
                        }
                        let target = kernels.len() as StateId;
                        kernels.push(kernel);
                        transitions.push(BTreeMap::new());
                        queued.push(true);
                        queue.push_back(target as usize);
                        by_core.insert(core, target);
                        target
                    }
                };
                transitions[state].insert(symbol, target);
            }
        }

        let states = kernels
            .into_iter()
            .zip(transitions)
            .map(|(kernel, transitions)| LrState {
                closure: self.closure(&kernel),
                kernel,
                transitions,
            })
            .collect();

        Some(Automaton {
            states,
            rhs: self.rhs,
        })
    }

    fn next_symbol(&self, item: Item) -> Option<SymbolId> {
        self.rhs[item.production as usize].get(item.dot as usize).copied()
    }

    /// LR(1) closure of a kernel, one entry per core.
    fn closure(&self, kernel: &[(Item, TerminalSet)]) -> Vec<(Item, TerminalSet)> {
        let terminals = self.grammar.terminal_count;
        let mut items: Vec<(Item, TerminalSet)> = kernel.to_vec();
        let mut index: HashMap<Item, usize> = items
            .iter()
            .enumerate()
            .map(|(i, (item, _))| (*item, i))
            .collect();

        let mut pending: VecDeque<usize> = (0..items.len()).collect();
        while let Some(position) = pending.pop_front() {
            let (item, lookahead) = items[position].clone();
            let Some(symbol) = self.next_symbol(item) else {
                continue;
            };
            if (symbol as usize) < terminals {
                continue;
            }

            let rest = &self.rhs[item.production as usize][item.dot as usize + 1..];
            let mut follow = TerminalSet::new(terminals);
            if self.first.first_of(rest, &mut follow) {
                follow.union_with(&lookahead);
            }

            for &production in &self.by_lhs[symbol as usize - terminals] {
                let child = Item { production, dot: 0 };
                match index.get(&child) {
                    Some(&existing) => {
                        if items[existing].1.union_with(&follow) {
                            pending.push_back(existing);
                        }
                    }
                    None => {
                        index.insert(child, items.len());
                        pending.push_back(items.len());
                        items.push((child, follow.clone()));
                    }
                }
            }
        }
        items
    }
}

fn core_of(kernel: &[(Item, TerminalSet)]) -> Vec<Item> {
    kernel.iter().map(|(item, _)| *item).collect()
}
