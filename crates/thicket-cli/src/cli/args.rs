//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Grammar JSON file (positional).
pub fn grammar_json_arg() -> Arg {
    Arg::new("grammar_path")
        .value_name("GRAMMAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Grammar JSON file")
}

/// Grammar JSON or compiled table (positional).
pub fn grammar_or_table_arg() -> Arg {
    Arg::new("grammar_path")
        .value_name("GRAMMAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Grammar JSON file or compiled table")
}

/// Source file to parse (positional).
pub fn source_path_arg() -> Arg {
    Arg::new("source_path")
        .value_name("SOURCE")
        .value_parser(value_parser!(PathBuf))
        .help("Source file to parse (use \"-\" for stdin)")
}

/// Inline source text (-s/--source).
pub fn source_text_arg() -> Arg {
    Arg::new("source_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .conflicts_with("source_path")
        .help("Inline source text")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write the table to FILE (default: GRAMMAR with a .thkt extension)")
}

/// Treat warnings as errors (--strict).
pub fn strict_arg() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Treat warnings as errors")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Render syntax errors (--errors).
pub fn errors_arg() -> Arg {
    Arg::new("errors")
        .long("errors")
        .action(ArgAction::SetTrue)
        .help("Render syntax errors below the tree")
}

/// Print the parse trace (--trace).
pub fn trace_arg() -> Arg {
    Arg::new("trace")
        .long("trace")
        .action(ArgAction::SetTrue)
        .help("Print shifts, forks, recovery and reuse before the tree")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Trace verbosity (-v adds lexing and reductions, -vv token text)")
}

/// Incremental edit (--edit).
pub fn edit_arg() -> Arg {
    Arg::new("edit")
        .long("edit")
        .value_name("START:OLD_END:TEXT")
        .help("Replace bytes START..OLD_END with TEXT and reparse incrementally")
}

/// Parser step budget (--fuel).
pub fn fuel_arg() -> Arg {
    Arg::new("fuel")
        .long("fuel")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Parser step budget (unlimited by default)")
}

/// GLR head cap (--max-heads).
pub fn max_heads_arg() -> Arg {
    Arg::new("max_heads")
        .long("max-heads")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Maximum live parse heads (default: 6)")
}

/// Consecutive recovery insertions (--max-insertions).
pub fn max_insertions_arg() -> Arg {
    Arg::new("max_insertions")
        .long("max-insertions")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Maximum consecutive missing-node insertions (default: 3)")
}
