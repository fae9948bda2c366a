use super::*;

#[test]
fn roundtrip() {
    let json = r#"{
        "name": "test",
        "rules": {
            "source_file": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "STRING", "value": "x" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    let decoded = Grammar::from_binary(&grammar.to_binary()).unwrap();

    assert_eq!(grammar, decoded);
}

#[test]
fn roundtrip_preserves_precedence_and_recovery() {
    let grammar = Grammar::new("calc")
        .rule(
            "expr",
            Rule::choice([
                Rule::prec_left(1, Rule::seq([
                    Rule::symbol("expr"),
                    Rule::string("+"),
                    Rule::symbol("expr"),
                ])),
                Rule::prec_dynamic(2, Rule::symbol("num")),
            ]),
        )
        .rule("num", Rule::pattern(r"\d+"))
        .recovery(";");

    let decoded = Grammar::from_binary(&grammar.to_binary()).unwrap();

    assert_eq!(decoded.recovery, vec![";".to_string()]);
    assert_eq!(decoded, grammar);
}

#[test]
fn truncated_binary_fails() {
    let bytes = Grammar::new("x").rule("a", Rule::string("a")).to_binary();

    let err = Grammar::from_binary(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err, GrammarError::Binary(_)));
}
