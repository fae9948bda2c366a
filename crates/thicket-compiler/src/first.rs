//! Terminal sets, FIRST sets and nullability.

use thicket_core::SymbolId;

use crate::lower::LoweredGrammar;

/// Bitset over terminal ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    pub(crate) fn new(terminal_count: usize) -> Self {
        Self {
            words: vec![0; terminal_count.div_ceil(64)],
        }
    }

    pub(crate) fn insert(&mut self, terminal: SymbolId) -> bool {
        let (word, bit) = (terminal as usize / 64, terminal as usize % 64);
        let before = self.words[word];
        self.words[word] |= 1u64 << bit;
        before != self.words[word]
    }

    pub(crate) fn contains(&self, terminal: SymbolId) -> bool {
        let (word, bit) = (terminal as usize / 64, terminal as usize % 64);
        self.words.get(word).is_some_and(|&w| (w >> bit) & 1 != 0)
    }

    /// Returns whether anything was added.
    pub(crate) fn union_with(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64usize)
                .filter(move |&bit| (word >> bit) & 1 != 0)
                .map(move |bit| (i * 64 + bit) as SymbolId)
        })
    }
}

/// FIRST sets and nullability of every nonterminal.
#[derive(Debug)]
pub(crate) struct FirstSets {
    terminal_count: usize,
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl FirstSets {
    pub(crate) fn compute(grammar: &LoweredGrammar) -> Self {
        let terminals = grammar.terminal_count;
        let nonterminals = grammar.nonterminal_count;
        let mut sets = Self {
            terminal_count: terminals,
            first: vec![TerminalSet::new(terminals); nonterminals],
            nullable: vec![false; nonterminals],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for production in &grammar.productions {
                let lhs = production.lhs as usize - terminals;
                let symbols: Vec<SymbolId> = production.children.iter().map(|c| c.symbol).collect();
                let mut first = TerminalSet::new(terminals);
                let nullable = sets.first_of(&symbols, &mut first);
                changed |= sets.first[lhs].union_with(&first);
                if nullable && !sets.nullable[lhs] {
                    sets.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
        sets
    }

    /// Add FIRST of a symbol string to `out`; returns whether it is nullable.
    pub(crate) fn first_of(&self, symbols: &[SymbolId], out: &mut TerminalSet) -> bool {
        for &symbol in symbols {
            let id = symbol as usize;
            if id < self.terminal_count {
                out.insert(symbol);
                return false;
            }
            let nt = id - self.terminal_count;
            out.union_with(&self.first[nt]);
            if !self.nullable[nt] {
                return false;
            }
        }
        true
    }

    pub(crate) fn is_nullable(&self, symbol: SymbolId) -> bool {
        (symbol as usize)
            .checked_sub(self.terminal_count)
            .is_some_and(|nt| self.nullable[nt])
    }

    pub(crate) fn first(&self, symbol: SymbolId) -> TerminalSet {
        let mut out = TerminalSet::new(self.terminal_count);
        self.first_of(&[symbol], &mut out);
        out
    }
}
