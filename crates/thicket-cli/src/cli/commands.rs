//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("thicket")
        .about("Incremental, error-tolerant GLR parsing from tree-sitter style grammars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(compile_command())
        .subcommand(check_command())
        .subcommand(dump_command())
        .subcommand(parse_command())
}

/// Compile a grammar into a table blob.
pub fn compile_command() -> Command {
    Command::new("compile")
        .about("Compile a grammar into a parse table")
        .after_help(
            r#"EXAMPLES:
  thicket compile grammar.json                # writes grammar.thkt
  thicket compile grammar.json -o json.thkt"#,
        )
        .arg(grammar_json_arg())
        .arg(output_file_arg())
        .arg(color_arg())
}

/// Report grammar diagnostics.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a grammar")
        .after_help(
            r#"EXAMPLES:
  thicket check grammar.json            # fail on errors
  thicket check grammar.json --strict   # fail on warnings too"#,
        )
        .arg(grammar_json_arg())
        .arg(strict_arg())
        .arg(color_arg())
}

/// Show a compiled table.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show a parse table")
        .after_help(
            r#"EXAMPLES:
  thicket dump grammar.json    # compile, then dump
  thicket dump grammar.thkt    # dump a compiled table"#,
        )
        .arg(grammar_or_table_arg())
        .arg(color_arg())
}

/// Parse text and print its tree.
pub fn parse_command() -> Command {
    Command::new("parse")
        .about("Parse source text and print the syntax tree")
        .override_usage(
            "\
  thicket parse <GRAMMAR> <SOURCE>
  thicket parse <GRAMMAR> -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  thicket parse grammar.json app.txt               # S-expression tree
  thicket parse grammar.thkt -s '1 + 2' --errors   # also render syntax errors
  thicket parse grammar.json app.txt --trace       # trace the parse
  thicket parse grammar.json app.txt -vv           # trace every action
  thicket parse grammar.json app.txt --edit 4:5:42 # edit, then reparse"#,
        )
        .arg(grammar_or_table_arg())
        .arg(source_path_arg())
        .arg(source_text_arg())
        .arg(errors_arg())
        .arg(trace_arg())
        .arg(verbose_arg())
        .arg(edit_arg())
        .arg(fuel_arg())
        .arg(max_heads_arg())
        .arg(max_insertions_arg())
        .arg(color_arg())
}
