//! Tests for CLI dispatch logic.

use std::path::PathBuf;

use thicket_runtime::Verbosity;

use super::*;
use crate::cli::commands::{check_command, compile_command, dump_command, parse_command};
use crate::commands::parse::ParseArgs;

fn parse_params(argv: &[&str]) -> ParseParams {
    let m = parse_command().try_get_matches_from(argv).unwrap();
    ParseParams::from_matches(&m)
}

#[test]
fn parse_with_source_file() {
    let params = parse_params(&["parse", "grammar.json", "app.txt"]);
    assert_eq!(params.grammar_path, PathBuf::from("grammar.json"));
    assert_eq!(params.source_path, Some(PathBuf::from("app.txt")));
    assert_eq!(params.source_text, None);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn parse_with_inline_source_and_limits() {
    let params = parse_params(&[
        "parse",
        "grammar.thkt",
        "-s",
        "1 + 2",
        "--fuel",
        "500",
        "--max-heads",
        "2",
        "--max-insertions",
        "0",
        "--errors",
        "--color",
        "never",
    ]);
    assert_eq!(params.source_text.as_deref(), Some("1 + 2"));
    assert_eq!(params.fuel, Some(500));
    assert_eq!(params.max_heads, Some(2));
    assert_eq!(params.max_insertions, Some(0));
    assert!(params.errors);
    assert_eq!(params.color, ColorChoice::Never);
}

#[test]
fn source_file_and_text_conflict() {
    let result = parse_command().try_get_matches_from(["parse", "g.json", "app.txt", "-s", "x"]);
    assert!(result.is_err());
}

#[test]
fn verbosity_levels() {
    let levels = [
        (vec!["parse", "g.json", "-s", "x"], None),
        (vec!["parse", "g.json", "-s", "x", "--trace"], Some(Verbosity::Default)),
        (vec!["parse", "g.json", "-s", "x", "-v"], Some(Verbosity::Verbose)),
        (vec!["parse", "g.json", "-s", "x", "-vv"], Some(Verbosity::VeryVerbose)),
        (vec!["parse", "g.json", "-s", "x", "--trace", "-vvv"], Some(Verbosity::VeryVerbose)),
    ];
    for (argv, expected) in levels {
        let args: ParseArgs = parse_params(&argv).into();
        assert_eq!(args.verbosity, expected, "{argv:?}");
    }
}

#[test]
fn edit_is_passed_verbatim() {
    let params = parse_params(&["parse", "g.json", "app.txt", "--edit", "4:5:a:b"]);
    assert_eq!(params.edit.as_deref(), Some("4:5:a:b"));
}

#[test]
fn compile_output() {
    let m = compile_command()
        .try_get_matches_from(["compile", "grammar.json", "-o", "out.thkt"])
        .unwrap();
    let params = CompileParams::from_matches(&m);
    assert_eq!(params.grammar_path, PathBuf::from("grammar.json"));
    assert_eq!(params.output, Some(PathBuf::from("out.thkt")));
}

#[test]
fn grammar_is_required() {
    assert!(compile_command().try_get_matches_from(["compile"]).is_err());
    assert!(check_command().try_get_matches_from(["check"]).is_err());
    assert!(dump_command().try_get_matches_from(["dump"]).is_err());
    assert!(parse_command().try_get_matches_from(["parse"]).is_err());
}

#[test]
fn check_strict() {
    let m = check_command()
        .try_get_matches_from(["check", "grammar.json", "--strict", "--color", "always"])
        .unwrap();
    let params = CheckParams::from_matches(&m);
    assert!(params.strict);
    assert_eq!(params.color, ColorChoice::Always);
}

#[test]
fn dump_takes_a_table() {
    let m = dump_command()
        .try_get_matches_from(["dump", "grammar.thkt"])
        .unwrap();
    let params = DumpParams::from_matches(&m);
    assert_eq!(params.grammar_path, PathBuf::from("grammar.thkt"));
}

#[test]
fn unknown_color_is_rejected() {
    let result = dump_command().try_get_matches_from(["dump", "g.thkt", "--color", "sometimes"]);
    assert!(result.is_err());
}

#[test]
fn cli_is_well_formed() {
    build_cli().debug_assert();
}
