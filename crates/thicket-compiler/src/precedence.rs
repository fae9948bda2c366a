//! Named precedence resolution.
//!
//! Each list in the grammar's `precedences` orders its entries from
//! tightest to loosest. Entries get integer values so that every entry
//! compares greater than everything listed after it in any list.

use std::collections::HashMap;

use indexmap::IndexMap;
use thicket_core::{Grammar, Precedence, PrecedenceEntry};

use crate::diagnostics::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Name(String),
    Symbol(String),
}

impl From<&PrecedenceEntry> for Key {
    fn from(entry: &PrecedenceEntry) -> Self {
        match entry {
            PrecedenceEntry::Name(n) => Key::Name(n.clone()),
            PrecedenceEntry::Symbol(s) => Key::Symbol(s.clone()),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PrecedenceTable {
    values: HashMap<Key, i32>,
}

impl PrecedenceTable {
    pub(crate) fn resolve(grammar: &Grammar, diagnostics: &mut Diagnostics) -> Self {
        let mut successors: IndexMap<Key, Vec<usize>> = IndexMap::new();
        for list in &grammar.precedences {
            for entry in list {
                successors.entry(Key::from(entry)).or_default();
            }
        }
        for list in &grammar.precedences {
            for pair in list.windows(2) {
                let later = successors.get_index_of(&Key::from(&pair[1]));
                if let (Some(edges), Some(later)) = (successors.get_mut(&Key::from(&pair[0])), later) {
                    edges.push(later);
                }
            }
        }

        let count = successors.len();
        let mut values = vec![0i32; count];
        let mut marks = vec![Mark::New; count];
        let mut cycle = false;
        for node in 0..count {
            visit(node, &successors, &mut values, &mut marks, &mut cycle);
        }
        if cycle {
            diagnostics
                .report(
                    DiagnosticKind::PrecedenceCycle,
                    "precedence orderings contradict each other",
                )
                .emit();
        }

        let values = successors
            .into_keys()
            .zip(values)
            .collect();
        Self { values }
    }

    /// Integer value of a rule's precedence annotation.
    pub(crate) fn value(&self, precedence: &Precedence, rule: &str, diagnostics: &mut Diagnostics) -> i32 {
        match precedence {
            Precedence::Integer(value) => *value,
            Precedence::Name(name) => match self.values.get(&Key::Name(name.clone())) {
                Some(&value) => value,
                None => {
                    diagnostics
                        .report(
                            DiagnosticKind::UnknownPrecedence,
                            format!("precedence `{name}` is not declared in `precedences`"),
                        )
                        .rule(rule)
                        .emit();
                    0
                }
            },
        }
    }

    /// Precedence a rule gets by being listed in an ordering.
    pub(crate) fn rule_value(&self, rule: &str) -> Option<i32> {
        self.values.get(&Key::Symbol(rule.to_string())).copied()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Active,
    Done,
}

/// Longest path to a sink, counted in nodes.
fn visit(
    node: usize,
    successors: &IndexMap<Key, Vec<usize>>,
    values: &mut [i32],
    marks: &mut [Mark],
    cycle: &mut bool,
) -> i32 {
    match marks[node] {
        Mark::Done => return values[node],
        Mark::Active => {
            *cycle = true;
            return 0;
        }
        Mark::New => {}
    }
    marks[node] = Mark::Active;
    let mut value = 1;
    if let Some((_, edges)) = successors.get_index(node) {
        for &next in edges {
            value = value.max(visit(next, successors, values, marks, cycle) + 1);
        }
    }
    marks[node] = Mark::Done;
    values[node] = value;
    value
}
