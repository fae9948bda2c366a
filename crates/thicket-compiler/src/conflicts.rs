//! Action table construction and conflict resolution.
//!
//! Shift/reduce conflicts are settled by precedence, then associativity.
//! Reduce/reduce conflicts are settled by precedence. Whatever remains is
//! kept in the table for the GLR runtime; conflicts the grammar does not
//! declare are reported as warnings.

use std::collections::{BTreeSet, HashSet};

use thicket_core::{ProductionId, SYMBOL_END, StateId, SymbolId};
use thicket_table::{Action, Associativity};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::lalr::Automaton;
use crate::lower::LoweredGrammar;

#[derive(Debug)]
pub(crate) struct ActionTable {
    /// `actions[state][terminal]`, reduces ascending, then shift, then accept.
    pub actions: Vec<Vec<Vec<Action>>>,
    /// `gotos[state][symbol - terminal_count]`.
    pub gotos: Vec<Vec<Option<StateId>>>,
    /// Cells left with more than one action.
    pub conflict_count: usize,
}

#[derive(Default)]
struct Cell {
    shift: Option<StateId>,
    shift_precedence: Option<i32>,
    /// Owning rules of the items that would shift.
    shift_owners: BTreeSet<SymbolId>,
    reduces: BTreeSet<ProductionId>,
    accept: bool,
}

pub(crate) fn resolve(
    grammar: &LoweredGrammar,
    automaton: &Automaton,
    diagnostics: &mut Diagnostics,
) -> ActionTable {
    let terminals = grammar.terminal_count;
    let augmented = automaton.augmented();
    let mut reported: HashSet<BTreeSet<SymbolId>> = HashSet::new();
    let mut table = ActionTable {
        actions: Vec::with_capacity(automaton.states.len()),
        gotos: Vec::with_capacity(automaton.states.len()),
        conflict_count: 0,
    };

    for state in &automaton.states {
        let mut cells: Vec<Cell> = (0..terminals).map(|_| Cell::default()).collect();
        let mut gotos = vec![None; grammar.nonterminal_count];

        for (&symbol, &target) in &state.transitions {
            match (symbol as usize).checked_sub(terminals) {
                Some(nt) => gotos[nt] = Some(target),
                None => cells[symbol as usize].shift = Some(target),
            }
        }

        for (item, lookahead) in &state.closure {
            match automaton.next_symbol(*item) {
                Some(symbol) if (symbol as usize) < terminals => {
                    let cell = &mut cells[symbol as usize];
                    let (precedence, owner) = if item.production == augmented {
                        (0, grammar.start)
                    } else {
                        let production = &grammar.productions[item.production as usize];
                        (production.precedence, grammar.owner[production.lhs as usize])
                    };
                    cell.shift_precedence =
                        Some(cell.shift_precedence.map_or(precedence, |p| p.max(precedence)));
                    cell.shift_owners.insert(owner);
                }
                Some(_) => {}
                None if item.production == augmented => {
                    if lookahead.contains(SYMBOL_END) {
                        cells[SYMBOL_END as usize].accept = true;
                    }
                }
                None => {
                    for terminal in lookahead.iter() {
                        cells[terminal as usize].reduces.insert(item.production as ProductionId);
                    }
                }
            }
        }

        let mut row = Vec::with_capacity(terminals);
        for (terminal, cell) in cells.into_iter().enumerate() {
            let actions = resolve_cell(grammar, cell, terminal as SymbolId, &mut reported, diagnostics);
            if actions.len() > 1 {
                table.conflict_count += 1;
            }
            row.push(actions);
        }
        table.actions.push(row);
        table.gotos.push(gotos);
    }
    table
}

fn resolve_cell(
    grammar: &LoweredGrammar,
    mut cell: Cell,
    terminal: SymbolId,
    reported: &mut HashSet<BTreeSet<SymbolId>>,
    diagnostics: &mut Diagnostics,
) -> Vec<Action> {
    let production = |id: &ProductionId| &grammar.productions[*id as usize];

    if cell.reduces.len() > 1 {
        let best = cell.reduces.iter().map(|p| production(p).precedence).max();
        cell.reduces.retain(|p| Some(production(p).precedence) == best);
    }

    if cell.shift.is_some() && !cell.reduces.is_empty() {
        let shift = cell.shift_precedence.unwrap_or(0);
        let reduce = cell
            .reduces
            .iter()
            .map(|p| production(p).precedence)
            .max()
            .unwrap_or(0);
        let associativity: HashSet<Associativity> = cell
            .reduces
            .iter()
            .map(|p| production(p).associativity)
            .collect();

        if reduce > shift {
            cell.shift = None;
        } else if reduce < shift {
            cell.reduces.clear();
        } else if associativity.len() == 1 && associativity.contains(&Associativity::Left) {
            cell.shift = None;
        } else if associativity.len() == 1 && associativity.contains(&Associativity::Right) {
            cell.reduces.clear();
        }
    }

    let mut actions: Vec<Action> = cell
        .reduces
        .iter()
        .map(|&production| Action::Reduce { production })
        .collect();
    if let Some(state) = cell.shift {
        actions.push(Action::Shift { state });
    }
    if cell.accept {
        actions.push(Action::Accept);
    }

    let choices = actions.len();
    if choices > 1 {
        let mut involved: BTreeSet<SymbolId> = cell
            .reduces
            .iter()
            .map(|p| grammar.owner[production(p).lhs as usize])
            .collect();
        if cell.shift.is_some() {
            involved.extend(cell.shift_owners.iter().copied());
        }
        let declared = grammar
            .conflicts
            .iter()
            .any(|set| involved.iter().all(|symbol| set.contains(symbol)));
        if !declared && reported.insert(involved.clone()) {
            let names: Vec<&str> = involved.iter().map(|&s| grammar.name(s)).collect();
            let lookahead = grammar.name(terminal);
            let builder = diagnostics.report(
                DiagnosticKind::UnresolvedConflict,
                format!(
                    "unresolved conflict between [{}] before `{lookahead}`",
                    names.join(", ")
                ),
            );
            match names.first() {
                Some(&rule) => builder.rule(rule).emit(),
                None => builder.emit(),
            }
        }
    }
    actions
}
