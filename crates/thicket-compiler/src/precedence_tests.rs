use thicket_core::{Grammar, Precedence, PrecedenceEntry, Rule};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::precedence::PrecedenceTable;

fn name(n: &str) -> PrecedenceEntry {
    PrecedenceEntry::Name(n.to_string())
}

fn grammar_with(precedences: Vec<Vec<PrecedenceEntry>>) -> Grammar {
    let mut grammar = Grammar::new("p").rule("a", Rule::string("a"));
    grammar.precedences = precedences;
    grammar
}

#[test]
fn earlier_entries_bind_tighter() {
    let grammar = grammar_with(vec![
        vec![name("call"), name("unary"), name("binary")],
        vec![name("unary"), name("assign")],
    ]);
    let mut diagnostics = Diagnostics::new();
    let table = PrecedenceTable::resolve(&grammar, &mut diagnostics);
    assert!(diagnostics.is_empty());

    let v = |n: &str| table.value(&Precedence::Name(n.to_string()), "a", &mut Diagnostics::new());
    assert!(v("call") > v("unary"));
    assert!(v("unary") > v("binary"));
    assert!(v("unary") > v("assign"));
}

#[test]
fn symbol_entries_give_rule_values() {
    let grammar = grammar_with(vec![vec![
        PrecedenceEntry::Symbol("call".to_string()),
        name("member"),
    ]]);
    let table = PrecedenceTable::resolve(&grammar, &mut Diagnostics::new());
    assert_eq!(table.rule_value("call"), Some(2));
    assert_eq!(table.rule_value("member"), None);
}

#[test]
fn unknown_name_is_an_error() {
    let table = PrecedenceTable::resolve(&grammar_with(vec![]), &mut Diagnostics::new());
    let mut diagnostics = Diagnostics::new();
    let value = table.value(&Precedence::Name("nope".to_string()), "a", &mut diagnostics);
    assert_eq!(value, 0);
    assert!(diagnostics.contains(DiagnosticKind::UnknownPrecedence));
}

#[test]
fn contradicting_orders_are_reported() {
    let grammar = grammar_with(vec![vec![name("a"), name("b")], vec![name("b"), name("a")]]);
    let mut diagnostics = Diagnostics::new();
    PrecedenceTable::resolve(&grammar, &mut diagnostics);
    assert!(diagnostics.contains(DiagnosticKind::PrecedenceCycle));
}
