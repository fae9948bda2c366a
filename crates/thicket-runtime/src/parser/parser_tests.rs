use std::sync::Arc;
use std::thread;

use thicket_core::{Edit, Grammar, Rule};

use crate::test_utils::{
    arithmetic, assignments, assert_full_coverage, dangling_else, either, ifs, keywords, language,
    parse, parser, sexp,
};
use crate::{ParseError, ParseOptions, Parser};

#[test]
fn valid_input_has_no_errors() {
    let tree = parse(&ifs(), "if 1 then if 22 then pass");
    assert_eq!(tree.to_sexp(), "(stmt (expr) (stmt (expr) (stmt)))");
    assert!(!tree.has_error());
    assert!(!tree.root_node().has_error());
    assert_full_coverage(&tree);
}

#[test]
fn left_associative_precedence() {
    assert_eq!(
        sexp(&arithmetic(), "1 + 2 + 3"),
        "(program (sum left: (sum left: (number) right: (number)) right: (number)))"
    );
    assert_eq!(
        sexp(&arithmetic(), "1 * 2 + 3"),
        "(program (sum left: (product left: (number) right: (number)) right: (number)))"
    );
}

#[test]
fn repeats_are_flat() {
    let tree = parse(&assignments(), "a = 1; b = 2; c = 3;");
    let root = tree.root_node();
    assert_eq!(root.named_child_count(), 3);
    let names: Vec<_> = root
        .named_children()
        .filter_map(|s| s.child_by_field("name"))
        .map(|n| n.text())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn empty_repeat() {
    let tree = parse(&assignments(), "   ");
    assert_eq!(tree.to_sexp(), "(program)");
    assert_eq!(tree.root_node().byte_range(), 0..3);
    assert!(!tree.has_error());
}

#[test]
fn dangling_else_binds_to_the_outer_if() {
    // Both readings survive to the end; the reduction listed first wins.
    let tree = parse(&dangling_else(), "if c if c x else x");
    assert_eq!(tree.to_sexp(), "(stmt (cond) (stmt (cond) (stmt)) (stmt))");
    assert!(!tree.has_error());
}

#[test]
fn dangling_else_with_one_head() {
    let options = ParseOptions::new().max_heads(1);
    let tree = parser(&dangling_else())
        .with_options(options)
        .parse("if c if c x else x")
        .unwrap();
    assert_eq!(tree.to_sexp(), "(stmt (cond) (stmt (cond) (stmt)) (stmt))");
}

#[test]
fn dynamic_precedence_breaks_ties() {
    assert_eq!(sexp(&either(0), "x"), "(s (a))");
    assert_eq!(sexp(&either(1), "x"), "(s (b))");
    assert_eq!(sexp(&either(-1), "x"), "(s (a))");
}

#[test]
fn keywords_depend_on_the_state() {
    let tree = parse(&keywords(), "let let = x; lets;");
    assert_eq!(
        tree.to_sexp(),
        "(program (statement name: (identifier) value: (identifier)) (statement (identifier)))"
    );
    let first = tree.root_node().child(0).unwrap();
    assert_eq!(first.child(0).unwrap().kind(), "let");
    assert_eq!(first.child_by_field("name").unwrap().text(), "let");
}

#[test]
fn fuel_bounds_the_work() {
    let options = ParseOptions::new().exec_fuel(1);
    let err = parser(&arithmetic())
        .with_options(options)
        .parse("1 + 2")
        .unwrap_err();
    assert_eq!(err, ParseError::FuelExhausted);

    let options = ParseOptions::new().exec_fuel(10_000);
    assert!(parser(&arithmetic()).with_options(options).parse("1 + 2").is_ok());
}

#[test]
fn edit_must_match_the_text() {
    let parser = parser(&assignments());
    let old = parser.parse("a = 1;").unwrap();
    let edit = Edit::replace(4, 1, 2);

    let err = parser.reparse(&old, &edit, "a = 1;").unwrap_err();
    assert_eq!(
        err,
        ParseError::EditConflict {
            edit,
            old_len: 6,
            new_len: 6
        }
    );
    assert!(parser.reparse(&old, &edit, "a = 12;").is_ok());
}

#[test]
fn externals_need_a_scanner() {
    let grammar = Grammar::new("ext")
        .rule("s", Rule::symbol("indent"))
        .external(Rule::symbol("indent"));
    let err = Parser::new(&language(&grammar)).unwrap_err();
    assert_eq!(err, ParseError::MissingScanner("ext".to_string()));
}

#[test]
fn parsing_is_deterministic() {
    let parser = parser(&arithmetic());
    let text = "1 + (2 * 3) + 4 * 5";
    assert_eq!(parser.parse(text).unwrap(), parser.parse(text).unwrap());
}

#[test]
fn parser_is_shared_across_threads() {
    let parser = Arc::new(parser(&arithmetic()));
    let expected = parser.parse("1 + 2 * 3").unwrap().to_sexp();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = Arc::clone(&parser);
            thread::spawn(move || parser.parse("1 + 2 * 3").unwrap().to_sexp())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
