use thicket_core::{FieldId, Grammar, Rule};
use thicket_table::{Associativity, SymbolKind};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::lower::{LoweredGrammar, TokenSpec, lower};

fn lowered(grammar: &Grammar) -> (LoweredGrammar, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let lowered = lower(grammar, &mut diagnostics).expect("grammar has rules");
    (lowered, diagnostics)
}

fn id(grammar: &LoweredGrammar, name: &str) -> u16 {
    grammar
        .symbols
        .iter()
        .position(|s| s.name == name)
        .unwrap_or_else(|| panic!("no symbol `{name}`")) as u16
}

fn assignments() -> Grammar {
    Grammar::new("assign")
        .rule("program", Rule::repeat(Rule::symbol("statement")))
        .rule(
            "statement",
            Rule::seq([
                Rule::field("name", Rule::symbol("identifier")),
                Rule::string("="),
                Rule::field("value", Rule::symbol("number")),
                Rule::string(";"),
            ]),
        )
        .rule("identifier", Rule::pattern("[a-z]+"))
        .rule("number", Rule::pattern(r"\d+"))
        .extra(Rule::pattern(r"\s"))
}

#[test]
fn symbols_are_numbered_terminals_first() {
    let (grammar, diagnostics) = lowered(&assignments());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let names: Vec<_> = grammar.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        ["end", "identifier", "number", "=", ";", "program", "statement", "program_repeat1"]
    );
    assert_eq!(grammar.terminal_count, 5);
    assert_eq!(grammar.nonterminal_count, 3);
    assert_eq!(grammar.start, 5);

    let repeat = &grammar.symbols[7];
    assert_eq!(repeat.kind, SymbolKind::Auxiliary);
    assert!(!repeat.visible);
    assert!(!grammar.symbols[3].named);
    assert!(grammar.symbols[1].named);
    assert_eq!(grammar.owner[7], 5);
}

#[test]
fn repeat_becomes_left_recursive_helper() {
    let (grammar, _) = lowered(&assignments());
    let shapes: Vec<(u16, Vec<u16>)> = grammar
        .productions
        .iter()
        .map(|p| (p.lhs, p.children.iter().map(|c| c.symbol).collect()))
        .collect();
    assert_eq!(
        shapes,
        [
            (5, vec![7]),
            (5, vec![]),
            (6, vec![1, 3, 2, 4]),
            (7, vec![7, 6]),
            (7, vec![6]),
        ]
    );
}

#[test]
fn fields_are_sorted_and_numbered_from_one() {
    let (grammar, _) = lowered(&assignments());
    assert_eq!(grammar.fields, ["name", "value"]);

    let statement = &grammar.productions[2];
    assert_eq!(statement.children[0].field, FieldId::new(1));
    assert_eq!(statement.children[1].field, None);
    assert_eq!(statement.children[2].field, FieldId::new(2));
}

#[test]
fn padding_collects_pattern_extras() {
    let (grammar, _) = lowered(&assignments());
    assert_eq!(grammar.padding.as_deref(), Some(r"(?:(?:\s))"));
    assert!(grammar.extras.is_empty());
}

#[test]
fn choices_carry_precedence_and_associativity() {
    let grammar = Grammar::new("calc")
        .rule(
            "expr",
            Rule::choice([
                Rule::prec_left(1, Rule::seq([Rule::symbol("expr"), Rule::string("+"), Rule::symbol("expr")])),
                Rule::prec_right(2, Rule::seq([Rule::symbol("expr"), Rule::string("^"), Rule::symbol("expr")])),
                Rule::prec_dynamic(-1, Rule::symbol("number")),
            ]),
        )
        .rule("number", Rule::pattern(r"\d+"));
    let (grammar, diagnostics) = lowered(&grammar);
    assert!(diagnostics.is_empty());

    let p = &grammar.productions;
    assert_eq!(p.len(), 3);
    assert_eq!((p[0].precedence, p[0].associativity), (1, Associativity::Left));
    assert_eq!((p[1].precedence, p[1].associativity), (2, Associativity::Right));
    assert_eq!((p[2].precedence, p[2].dynamic_precedence), (0, -1));
}

#[test]
fn inner_precedence_overrides_outer() {
    let grammar = Grammar::new("p").rule(
        "s",
        Rule::prec(1, Rule::choice([Rule::prec(5, Rule::string("a")), Rule::string("b")])),
    );
    let (grammar, _) = lowered(&grammar);
    let values: Vec<i32> = grammar.productions.iter().map(|p| p.precedence).collect();
    assert_eq!(values, [5, 1]);
}

#[test]
fn optional_expands_into_two_productions() {
    let grammar = Grammar::new("p").rule(
        "s",
        Rule::seq([Rule::optional(Rule::string("a")), Rule::string("b")]),
    );
    let (grammar, _) = lowered(&grammar);
    let lengths: Vec<usize> = grammar.productions.iter().map(|p| p.len()).collect();
    assert_eq!(lengths, [2, 1]);
}

#[test]
fn alias_reuses_visible_symbol_or_adds_one() {
    let grammar = Grammar::new("p")
        .rule(
            "s",
            Rule::seq([
                Rule::alias(Rule::symbol("word"), "identifier", true),
                Rule::symbol("identifier"),
                Rule::alias(Rule::symbol("word"), "label", true),
            ]),
        )
        .rule("identifier", Rule::pattern("[A-Z]+"))
        .rule("word", Rule::pattern("[a-z]+"));
    let (grammar, _) = lowered(&grammar);

    let children = &grammar.productions[0].children;
    assert_eq!(children[0].alias, Some(id(&grammar, "identifier")));
    let label = id(&grammar, "label");
    assert_eq!(children[2].alias, Some(label));
    assert_eq!(grammar.symbols[label as usize].kind, SymbolKind::Alias);
    assert_eq!(label as usize, grammar.terminal_count + grammar.nonterminal_count);
}

#[test]
fn anonymous_patterns_are_hidden_tokens() {
    let grammar = Grammar::new("p").rule(
        "s",
        Rule::seq([Rule::string("let"), Rule::pattern("[a-z]+")]),
    );
    let (grammar, _) = lowered(&grammar);
    let token = &grammar.symbols[2];
    assert_eq!(token.name, "s_token1");
    assert!(!token.visible && !token.named);
    assert_eq!(grammar.tokens[2].spec, TokenSpec::Regex("(?:[a-z]+)".to_string()));
    assert_eq!(grammar.tokens[1].spec, TokenSpec::Literal("let".to_string()));
}

#[test]
fn token_extras_are_flagged() {
    let grammar = Grammar::new("p")
        .rule("s", Rule::string("a"))
        .rule("comment", Rule::token(Rule::seq([Rule::string("#"), Rule::pattern(".*")])))
        .extra(Rule::symbol("comment"));
    let (grammar, diagnostics) = lowered(&grammar);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let comment = id(&grammar, "comment");
    assert!(grammar.symbols[comment as usize].extra);
    assert_eq!(grammar.extras, [comment]);
    assert_eq!(grammar.padding, None);
}

#[test]
fn external_tokens_come_after_end() {
    let grammar = Grammar::new("p")
        .rule("s", Rule::seq([Rule::symbol("indent"), Rule::string("x")]))
        .external(Rule::symbol("indent"));
    let (grammar, diagnostics) = lowered(&grammar);
    assert!(diagnostics.is_empty());
    assert_eq!(grammar.symbols[1].name, "indent");
    assert_eq!(grammar.symbols[1].kind, SymbolKind::External);
    assert_eq!(grammar.tokens[1].spec, TokenSpec::External(0));
    assert_eq!(grammar.external_count, 1);
}

#[test]
fn word_keywords_and_recovery_resolve() {
    let grammar = Grammar::new("p")
        .rule("s", Rule::repeat1(Rule::choice([Rule::string("if"), Rule::symbol("name")])))
        .rule("name", Rule::pattern("[a-z]+"))
        .word("name")
        .recovery("if")
        .recovery("name")
        .recovery("missing");
    let (grammar, diagnostics) = lowered(&grammar);

    assert_eq!(grammar.word, Some(id(&grammar, "name")));
    assert_eq!(grammar.recovery, [id(&grammar, "if"), id(&grammar, "name")]);
    assert!(diagnostics.contains(DiagnosticKind::UnknownRecoverySymbol));
    assert!(!diagnostics.has_errors());
}

#[test]
fn undefined_symbol_is_an_error() {
    let grammar = Grammar::new("p").rule("s", Rule::symbol("nowhere"));
    let mut diagnostics = Diagnostics::new();
    lower(&grammar, &mut diagnostics);
    let first = diagnostics.iter().next().unwrap();
    assert_eq!(first.kind, DiagnosticKind::UndefinedSymbol);
    assert_eq!(first.rule.as_deref(), Some("s"));
}

#[test]
fn unreachable_rule_is_a_warning() {
    let grammar = Grammar::new("p")
        .rule("s", Rule::string("a"))
        .rule("orphan", Rule::string("b"));
    let (grammar, diagnostics) = lowered(&grammar);
    assert!(diagnostics.contains(DiagnosticKind::UnreachableRule));
    assert!(!diagnostics.has_errors());
    assert!(grammar.symbols.iter().all(|s| s.name != "orphan"));
}

#[test]
fn rule_that_never_finishes_is_unproductive() {
    let grammar = Grammar::new("p")
        .rule("s", Rule::symbol("forever"))
        .rule("forever", Rule::seq([Rule::string("x"), Rule::symbol("forever")]));
    let (_, diagnostics) = lowered(&grammar);
    assert!(diagnostics.contains(DiagnosticKind::UnproductiveRule));
}

#[test]
fn empty_string_token_is_ignored_with_warning() {
    let grammar = Grammar::new("p").rule("s", Rule::seq([Rule::string(""), Rule::string("a")]));
    let (grammar, diagnostics) = lowered(&grammar);
    assert!(diagnostics.contains(DiagnosticKind::EmptyToken));
    assert_eq!(grammar.productions[0].len(), 1);
}

#[test]
fn nonterminal_extra_is_unsupported() {
    let grammar = Grammar::new("p")
        .rule("s", Rule::string("a"))
        .rule("note", Rule::seq([Rule::string("("), Rule::string(")")]))
        .extra(Rule::symbol("note"));
    let (_, diagnostics) = lowered(&grammar);
    assert!(diagnostics.contains(DiagnosticKind::UnsupportedExtra));
}

#[test]
fn symbol_inside_token_is_an_error() {
    let grammar = Grammar::new("p")
        .rule("s", Rule::token(Rule::seq([Rule::string("a"), Rule::symbol("t")])))
        .rule("t", Rule::string("b"));
    let mut diagnostics = Diagnostics::new();
    lower(&grammar, &mut diagnostics);
    assert!(diagnostics.contains(DiagnosticKind::SymbolInToken));
}

#[test]
fn empty_grammar_is_rejected() {
    let mut diagnostics = Diagnostics::new();
    assert!(lower(&Grammar::new("empty"), &mut diagnostics).is_none());
    assert!(diagnostics.contains(DiagnosticKind::EmptyGrammar));
}
