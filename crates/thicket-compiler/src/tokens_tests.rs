use thicket_core::Rule;

use super::tokens::*;

#[test]
fn literal_text_sees_through_wrappers() {
    let rule = Rule::token(Rule::prec(2, Rule::string("=>")));
    assert_eq!(literal_text(&rule), Some("=>"));
    assert_eq!(literal_text(&Rule::pattern("a")), None);
}

#[test]
fn pattern_flags() {
    assert_eq!(pattern_regex("abc", None), "(?:abc)");
    assert_eq!(pattern_regex("abc", Some("iu")), "(?i:abc)");
}

#[test]
fn token_body_to_regex() {
    let rule = Rule::token(Rule::seq([
        Rule::string("//"),
        Rule::pattern(".*"),
    ]));
    assert_eq!(rule_to_regex(&rule).unwrap(), "(?://(?:.*))");

    let rule = Rule::token(Rule::repeat1(Rule::choice([Rule::string("+"), Rule::Blank])));
    assert_eq!(rule_to_regex(&rule).unwrap(), r"(?:(?:\+|))+");
}

#[test]
fn symbol_inside_token_is_rejected() {
    let rule = Rule::token(Rule::seq([Rule::string("a"), Rule::symbol("b")]));
    assert_eq!(
        rule_to_regex(&rule),
        Err(TokenError::SymbolInToken("b".to_string()))
    );
}

#[test]
fn validate_reports_empty_matches() {
    assert_eq!(validate("a*"), Ok(true));
    assert_eq!(validate("a+"), Ok(false));
    assert!(matches!(validate("a("), Err(TokenError::InvalidRegex { .. })));
}

#[test]
fn dfa_matches_longest() {
    let dfa = build_dense(r"[a-z]+|[a-z]+\?").unwrap();
    assert_eq!(longest_match(&dfa, "abc? rest"), Some(4));
    assert_eq!(longest_match(&dfa, "123"), None);
    assert!(!build_dfa("[0-9]+").unwrap().is_empty());
}
