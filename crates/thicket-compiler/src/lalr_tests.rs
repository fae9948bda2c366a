use thicket_core::{Grammar, Rule};

use crate::diagnostics::Diagnostics;
use crate::first::FirstSets;
use crate::lalr::{Automaton, Item, build};
use crate::lower::lower;

fn automaton(grammar: &Grammar) -> Automaton {
    let mut diagnostics = Diagnostics::new();
    let lowered = lower(grammar, &mut diagnostics).unwrap();
    let first = FirstSets::compute(&lowered);
    build(&lowered, &first, &mut diagnostics).unwrap()
}

fn sum() -> Grammar {
    Grammar::new("sum")
        .rule(
            "sum",
            Rule::choice([
                Rule::seq([Rule::symbol("sum"), Rule::string("+"), Rule::symbol("num")]),
                Rule::symbol("num"),
            ]),
        )
        .rule("num", Rule::pattern(r"\d+"))
}

#[test]
fn single_token_grammar_has_three_states() {
    let automaton = automaton(&Grammar::new("tiny").rule("s", Rule::string("a")));
    assert_eq!(automaton.states.len(), 3);
    assert_eq!(automaton.augmented(), 1);
    assert_eq!(automaton.rhs(1), [2]);

    let start = &automaton.states[0];
    assert_eq!(start.kernel.len(), 1);
    assert_eq!(start.closure.len(), 2);
    assert_eq!(start.transitions.get(&1), Some(&1));
    assert_eq!(start.transitions.get(&2), Some(&2));
}

#[test]
fn left_recursion_states_and_lookaheads() {
    // terminals: end, num, "+"; sum = 3
    let automaton = automaton(&sum());
    assert_eq!(automaton.states.len(), 5);

    let start = &automaton.states[0];
    let lookahead = |item: Item| {
        start
            .closure
            .iter()
            .find(|(i, _)| *i == item)
            .map(|(_, la)| la.iter().collect::<Vec<_>>())
    };
    // sum -> . num sees end and "+"
    assert_eq!(lookahead(Item { production: 1, dot: 0 }), Some(vec![0, 2]));

    let after_sum = start.transitions[&3] as usize;
    let plus = automaton.states[after_sum].transitions[&2] as usize;
    let num = automaton.states[plus].transitions[&1] as usize;
    assert_eq!(automaton.states[num].kernel[0].0, Item { production: 0, dot: 3 });
    assert!(automaton.states[num].transitions.is_empty());
}

#[test]
fn equal_cores_merge() {
    // "a" x "b" and "c" x "d" both reach x -> "e" . with different lookaheads
    let grammar = Grammar::new("merge")
        .rule(
            "s",
            Rule::choice([
                Rule::seq([Rule::string("a"), Rule::symbol("x"), Rule::string("b")]),
                Rule::seq([Rule::string("c"), Rule::symbol("x"), Rule::string("d")]),
            ]),
        )
        .rule("x", Rule::seq([Rule::string("e"), Rule::string("f")]));
    let automaton = automaton(&grammar);

    let reduce_x: Vec<_> = automaton
        .states
        .iter()
        .filter(|s| s.kernel.iter().any(|(i, _)| *i == Item { production: 2, dot: 2 }))
        .collect();
    assert_eq!(reduce_x.len(), 1);
    let lookahead: Vec<_> = reduce_x[0].kernel[0].1.iter().collect();
    assert_eq!(lookahead.len(), 2);
}
