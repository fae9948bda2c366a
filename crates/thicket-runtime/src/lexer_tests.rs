use thicket_core::{Grammar, Rule, SYMBOL_END, SYMBOL_ERROR, SymbolId};
use thicket_table::ParseTable;

use crate::lexer::{Lexer, Token};
use crate::test_utils::{arithmetic, assignments, keywords, language};

fn symbol(table: &ParseTable, name: &str, named: bool) -> SymbolId {
    table
        .symbol_for_name(name, named)
        .unwrap_or_else(|| panic!("no symbol `{name}`"))
}

fn only(table: &ParseTable, symbols: &[SymbolId]) -> Vec<bool> {
    let mut valid = vec![false; table.terminal_count()];
    for &s in symbols {
        valid[s as usize] = true;
    }
    valid
}

fn lex(grammar: &Grammar, text: &str, valid: &[(&str, bool)]) -> (Token, Vec<String>) {
    let language = language(grammar);
    let table = language.table();
    let ids: Vec<_> = valid.iter().map(|&(n, named)| symbol(table, n, named)).collect();
    let lexer = Lexer::new(table, None, text);

    let mut names = Vec::new();
    let mut position = 0;
    let first = lexer.lex_with(0, &only(table, &ids));
    loop {
        let token = lexer.lex_with(position, &only(table, &ids));
        if token.symbol == SYMBOL_END {
            return (first, names);
        }
        names.push(table.symbol_name(token.symbol).to_string());
        position = token.end;
    }
}

#[test]
fn padding_and_longest_match() {
    let language = language(&arithmetic());
    let table = language.table();
    let number = symbol(table, "number", true);
    let lexer = Lexer::new(table, None, "  12+3");

    let token = lexer.lex_with(0, &only(table, &[number]));
    assert_eq!(token.symbol, number);
    assert_eq!((token.padding_start, token.start, token.end), (0, 2, 4));
    assert_eq!(token.padding(), 2);
    assert_eq!(token.len(), 2);
    assert!(token.lookahead_end > token.end);
}

#[test]
fn end_of_input_keeps_trailing_padding() {
    let language = language(&arithmetic());
    let table = language.table();
    let lexer = Lexer::new(table, None, "1  \n");
    let token = lexer.lex_with(1, &only(table, &[]));
    assert_eq!(token.symbol, SYMBOL_END);
    assert_eq!((token.padding_start, token.start, token.end), (1, 4, 4));
    assert!(token.is_empty());
}

#[test]
fn keyword_only_where_valid() {
    let (token, _) = lex(&keywords(), "let", &[("let", false), ("identifier", true)]);
    let language = language(&keywords());
    let table = language.table();
    assert_eq!(token.symbol, symbol(table, "let", false));

    let (token, _) = lex(&keywords(), "let", &[("identifier", true)]);
    assert_eq!(token.symbol, symbol(table, "identifier", true));
}

#[test]
fn keyword_needs_the_whole_word() {
    let (_, names) = lex(&keywords(), "letter let", &[("let", false), ("identifier", true)]);
    assert_eq!(names, ["identifier", "let"]);
}

#[test]
fn invalid_terminals_are_a_fallback() {
    // Nothing valid matches, so any terminal may.
    let (_, names) = lex(&assignments(), "abc = 1", &[(";", false)]);
    assert_eq!(names, ["identifier", "=", "number"]);
}

#[test]
fn literal_wins_a_tie_with_a_pattern() {
    let grammar = Grammar::new("tie")
        .rule("s", Rule::choice([Rule::string("abc"), Rule::symbol("name")]))
        .rule("name", Rule::pattern("[a-z]+"));
    let valid = [("abc", false), ("name", true)];
    let (_, names) = lex(&grammar, "abc", &valid);
    assert_eq!(names, ["abc"]);
    let (_, names) = lex(&grammar, "abcd", &valid);
    assert_eq!(names, ["name"]);
}

#[test]
fn extras_are_always_candidates() {
    let (_, names) = lex(&arithmetic(), "# note\n1", &[("number", true)]);
    assert_eq!(names, ["comment", "number"]);
}

#[test]
fn unknown_character_is_one_error_token() {
    let language = language(&arithmetic());
    let table = language.table();
    let lexer = Lexer::new(table, None, " €1");
    let token = lexer.lex_with(0, &only(table, &[]));
    assert_eq!(token.symbol, SYMBOL_ERROR);
    assert_eq!((token.start, token.end), (1, 4));
}

#[test]
fn lex_unions_the_states() {
    let language = language(&assignments());
    let table = language.table();
    let lexer = Lexer::new(table, None, "x");
    let states: Vec<_> = (0..table.state_count() as u16).collect();
    let token = lexer.lex(0, &states);
    assert_eq!(token.symbol, symbol(table, "identifier", true));
}
