use indoc::indoc;
use thicket_core::{Grammar, Rule};
use thicket_runtime::{ParseError, Verbosity};

use super::compile::{CompileArgs, compile};
use super::error::CliError;
use super::parse::{ParseArgs, parse, parse_edit};
use super::test_utils::{Workspace, assignments};

fn args(ws: &Workspace, text: &str) -> ParseArgs {
    ParseArgs {
        grammar_path: ws.grammar(&assignments()),
        source_path: None,
        source_text: Some(text.to_string()),
        errors: false,
        verbosity: None,
        edit: None,
        fuel: None,
        max_heads: None,
        max_insertions: None,
        color: false,
    }
}

#[test]
fn prints_the_tree() {
    let ws = Workspace::new();
    let out = parse(&args(&ws, "a = 1;")).unwrap();
    assert_eq!(out, "(program (statement name: (identifier) value: (number)))\n");
}

#[test]
fn compiled_table_and_source_file() {
    let ws = Workspace::new();
    let grammar_path = ws.grammar(&assignments());
    compile(&CompileArgs {
        grammar_path,
        output: None,
        color: false,
    })
    .unwrap();

    let out = parse(&ParseArgs {
        grammar_path: ws.path("grammar.thkt"),
        source_path: Some(ws.write("input.txt", "a = 1; b = 2;")),
        source_text: None,
        ..args(&ws, "")
    })
    .unwrap();
    insta::assert_snapshot!(out, @"(program (statement name: (identifier) value: (number)) (statement name: (identifier) value: (number)))");
}

#[test]
fn renders_syntax_errors() {
    let ws = Workspace::new();
    let out = parse(&ParseArgs {
        errors: true,
        ..args(&ws, "a = ;")
    })
    .unwrap();

    assert!(out.starts_with(
        "(program (statement name: (identifier) value: (MISSING number)))\n\n"
    ));
    assert!(out.contains("missing number"));
    assert!(out.contains("expected number here"));
    assert!(out.contains("<source>"));
    assert!(out.ends_with("1 syntax error\n"));
}

#[test]
fn clean_parse_has_no_error_report() {
    let ws = Workspace::new();
    let out = parse(&ParseArgs {
        errors: true,
        ..args(&ws, "a = 1;")
    })
    .unwrap();
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn trace_comes_before_the_tree() {
    let ws = Workspace::new();
    let out = parse(&ParseArgs {
        verbosity: Some(Verbosity::Default),
        ..args(&ws, "a = 1;")
    })
    .unwrap();

    let lines: Vec<_> = out.lines().collect();
    assert!(lines[0].starts_with("  shift    identifier -> "));
    assert_eq!(lines[lines.len() - 2], "  accept   program");
    assert!(lines[lines.len() - 1].starts_with("(program"));
}

#[test]
fn edit_reparses_incrementally() {
    let ws = Workspace::new();
    let source = indoc! {"
        a = 1;
        b = 2;
        c = 3;
    "};
    let out = parse(&ParseArgs {
        edit: Some("11:12:22".to_string()),
        ..args(&ws, source)
    })
    .unwrap();

    insta::assert_snapshot!(out, @r#"
    ; 11..12 -> 11..13: reused 2 nodes, 13 bytes
    (program (statement name: (identifier) value: (number)) (statement name: (identifier) value: (number)) (statement name: (identifier) value: (number)))
    "#);
}

#[test]
fn edit_outside_the_source() {
    let ws = Workspace::new();
    let err = parse(&ParseArgs {
        edit: Some("40:41:x".to_string()),
        ..args(&ws, "a = 1;")
    })
    .unwrap_err();
    assert!(matches!(
        err,
        CliError::EditRange {
            start: 40,
            old_end: 41,
            len: 6
        }
    ));
}

#[test]
fn edit_specs() {
    assert_eq!(parse_edit("3:5:a:b").unwrap(), (3..5, "a:b"));
    assert_eq!(parse_edit("0:0:").unwrap(), (0..0, ""));
    for bad in ["1:2", "x:1:y", "5:3:z", ""] {
        assert!(matches!(parse_edit(bad), Err(CliError::EditSyntax(_))), "{bad}");
    }
}

#[test]
fn limits_reach_the_parser() {
    let ws = Workspace::new();
    let err = parse(&ParseArgs {
        fuel: Some(1),
        ..args(&ws, "a = 1;")
    })
    .unwrap_err();
    assert!(matches!(err, CliError::Parse(ParseError::FuelExhausted)));
    assert_eq!(err.to_string(), "parse step budget exhausted");
}

#[test]
fn source_is_required() {
    let ws = Workspace::new();
    let err = parse(&ParseArgs {
        source_text: None,
        ..args(&ws, "")
    })
    .unwrap_err();
    assert!(matches!(err, CliError::NoSource));
}

#[test]
fn externals_need_a_scanner() {
    let ws = Workspace::new();
    let grammar = Grammar::new("ext")
        .rule("s", Rule::symbol("indent"))
        .external(Rule::symbol("indent"));
    let base = args(&ws, "");
    let grammar_path = ws.write("external.json", grammar.to_json());
    let err = parse(&ParseArgs {
        grammar_path,
        ..base
    })
    .unwrap_err();
    assert!(matches!(err, CliError::Parse(ParseError::MissingScanner(_))));
    assert_eq!(
        err.to_string(),
        "grammar `ext` declares external tokens but no external scanner is registered"
    );
}
