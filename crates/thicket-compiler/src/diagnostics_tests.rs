use indoc::indoc;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};

#[test]
fn builder_collects_and_counts() {
    let mut diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());

    diagnostics
        .report(DiagnosticKind::UndefinedSymbol, "undefined symbol `x`")
        .rule("expr")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnreachableRule, "rule `y` is unreachable")
        .emit();

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(diagnostics.warning_count(), 1);
    assert!(diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
    assert!(diagnostics.contains(DiagnosticKind::UndefinedSymbol));
    assert!(!diagnostics.contains(DiagnosticKind::EmptyGrammar));
}

#[test]
fn severity_follows_kind() {
    assert_eq!(DiagnosticKind::PrecedenceCycle.default_severity(), Severity::Error);
    assert_eq!(DiagnosticKind::UnresolvedConflict.default_severity(), Severity::Warning);
    assert_eq!(DiagnosticKind::EmptyToken.default_severity(), Severity::Warning);
}

#[test]
fn display_mentions_rule() {
    let mut diag = Diagnostic::new(DiagnosticKind::InvalidWord, "word `x` must name a token rule");
    assert_eq!(diag.to_string(), "error: word `x` must name a token rule");
    diag.rule = Some("x".to_string());
    assert_eq!(
        diag.to_string(),
        "error: word `x` must name a token rule (in rule `x`)"
    );
}

#[test]
fn plain_render_without_source() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EmptyGrammar, "grammar has no rules")
        .emit();
    diagnostics
        .report(DiagnosticKind::EmptyToken, "empty string token is ignored")
        .rule("s")
        .emit();

    assert_eq!(
        diagnostics.printer().render(),
        indoc! {"
            error: grammar has no rules

            warning: empty string token is ignored (in rule `s`)
        "}
    );
}

#[test]
fn render_points_at_rule_in_json() {
    let source = indoc! {r#"
        {
          "name": "p",
          "rules": {
            "s": { "type": "SYMBOL", "name": "missing" }
          }
        }
    "#};
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedSymbol, "undefined symbol `missing`")
        .rule("s")
        .emit();

    let out = diagnostics.printer().source(source).path("grammar.json").render();
    assert!(out.starts_with("error: undefined symbol `missing`"), "{out}");
    assert!(out.contains("grammar.json:4:5"), "{out}");
    assert!(out.contains("rule `s`"), "{out}");
}

#[test]
fn extend_merges() {
    let mut a = Diagnostics::new();
    a.report(DiagnosticKind::EmptyToken, "one").emit();
    let mut b = Diagnostics::new();
    b.report(DiagnosticKind::InvalidRegex, "two").emit();
    a.extend(b);
    assert_eq!(a.len(), 2);
    assert!(a.has_errors());
}
