use crate::ParseOptions;
use crate::test_utils::{assert_full_coverage, assignments, ifs, outline, parse, parser};

#[test]
fn missing_expression_and_statement() {
    let tree = parse(&ifs(), "if then");

    insta::assert_snapshot!(outline(&tree), @r#"
    stmt 0..7
      "if" 0..2
      ERROR 3..3 MISSING
      "then" 3..7
      ERROR 7..7 MISSING
    "#);
    assert_eq!(tree.to_sexp(), "(stmt (MISSING expr) (MISSING stmt))");
    assert!(tree.has_error());
    assert_eq!(tree.errors().len(), 2);
    assert_full_coverage(&tree);
}

#[test]
fn missing_terminal_keeps_its_field() {
    let tree = parse(&assignments(), "a = ;");
    assert_eq!(
        tree.to_sexp(),
        "(program (statement name: (identifier) value: (MISSING number)))"
    );
    let value = tree.root_node().child(0).unwrap().child_by_field("value").unwrap();
    assert!(value.is_missing());
    assert_eq!(value.missing_kind(), Some("number"));
    assert_eq!(value.byte_range(), 4..4);
}

#[test]
fn unexpected_token_is_skipped() {
    let tree = parse(&assignments(), "a = = 1;");

    insta::assert_snapshot!(outline(&tree), @r#"
    program 0..8
      statement 0..8
        name: identifier 0..1
        "=" 2..3
        ERROR 4..5
          "=" 4..5
        value: number 6..7
        ";" 7..8
    "#);
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].text(), "=");
    assert!(errors[0].is_extra());
    assert_full_coverage(&tree);
}

#[test]
fn unknown_character_becomes_an_error_token() {
    let tree = parse(&assignments(), "a = 1 $;");
    assert_eq!(
        tree.to_sexp(),
        "(program (statement name: (identifier) value: (number) (ERROR)))"
    );
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].text(), "$");
    let token = errors[0].child(0).unwrap();
    assert!(token.is_error());
    assert!(!token.is_named());
    assert_full_coverage(&tree);
}

#[test]
fn recovery_symbol_resynchronizes() {
    let tree = parse(&assignments(), "a = = ; b = 3;");

    insta::assert_snapshot!(outline(&tree), @r#"
    program 0..14
      ERROR 0..7
        identifier 0..1
        "=" 2..3
        "=" 4..5
        ";" 6..7
      statement 8..14
        name: identifier 8..9
        "=" 10..11
        value: number 12..13
        ";" 13..14
    "#);
    assert_full_coverage(&tree);
}

#[test]
fn trailing_garbage() {
    let tree = parse(&assignments(), "a = 1; )");
    assert_eq!(
        tree.to_sexp(),
        "(program (statement name: (identifier) value: (number)) (ERROR))"
    );
    assert_eq!(tree.errors()[0].byte_range(), 7..8);
    assert_full_coverage(&tree);
}

#[test]
fn nothing_viable_wraps_everything() {
    let tree = parse(&ifs(), "then");
    assert_eq!(tree.to_sexp(), "(ERROR)");
    assert!(tree.root_node().is_error());
    assert_eq!(tree.root_node().byte_range(), 0..4);
    assert_full_coverage(&tree);
}

#[test]
fn empty_input_gets_a_placeholder() {
    let tree = parse(&ifs(), "");
    assert_eq!(tree.to_sexp(), "(MISSING stmt)");
    assert_eq!(tree.root_node().byte_range(), 0..0);
}

#[test]
fn insertions_can_be_disabled() {
    let tree = parser(&ifs())
        .with_options(ParseOptions::new().max_insertions(0))
        .parse("if then")
        .unwrap();
    assert_eq!(tree.to_sexp(), "(ERROR)");
    assert_full_coverage(&tree);
}

#[test]
fn errors_do_not_leak_into_later_statements() {
    let tree = parse(&assignments(), "a = 1 2; b = 3;");
    let statements: Vec<_> = tree.root_node().named_children().collect();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].has_error());
    assert!(!statements[1].has_error());
    assert_eq!(statements[1].text(), "b = 3;");
}
