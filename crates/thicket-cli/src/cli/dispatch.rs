//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! - `*Params` structs mirror command `*Args` but are populated from clap
//! - `Into<*Args>` impls bridge dispatch to the command handlers

use std::path::PathBuf;

use clap::ArgMatches;
use thicket_runtime::Verbosity;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::compile::CompileArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::parse::ParseArgs;

pub struct CompileParams {
    pub grammar_path: PathBuf,
    pub output: Option<PathBuf>,
    pub color: ColorChoice,
}

impl CompileParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            output: m.get_one::<PathBuf>("output").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<CompileParams> for CompileArgs {
    fn from(p: CompileParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            output: p.output,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub grammar_path: PathBuf,
    pub strict: bool,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub grammar_path: PathBuf,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ParseParams {
    pub grammar_path: PathBuf,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub errors: bool,
    pub trace: bool,
    pub verbose: u8,
    pub edit: Option<String>,
    pub fuel: Option<u32>,
    pub max_heads: Option<usize>,
    pub max_insertions: Option<u32>,
    pub color: ColorChoice,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            // Input
            grammar_path: grammar_path(m),
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),

            // Output
            errors: m.get_flag("errors"),
            trace: m.get_flag("trace"),
            verbose: m.get_count("verbose"),
            edit: m.get_one::<String>("edit").cloned(),

            // Limits
            fuel: m.get_one::<u32>("fuel").copied(),
            max_heads: m.get_one::<usize>("max_heads").copied(),
            max_insertions: m.get_one::<u32>("max_insertions").copied(),
            color: parse_color(m),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        // -v and -vv imply --trace.
        let verbosity = match (p.trace, p.verbose) {
            (false, 0) => None,
            (true, 0) => Some(Verbosity::Default),
            (_, 1) => Some(Verbosity::Verbose),
            _ => Some(Verbosity::VeryVerbose),
        };

        Self {
            grammar_path: p.grammar_path,
            source_path: p.source_path,
            source_text: p.source_text,
            errors: p.errors,
            verbosity,
            edit: p.edit,
            fuel: p.fuel,
            max_heads: p.max_heads,
            max_insertions: p.max_insertions,
            color: p.color.should_colorize(),
        }
    }
}

/// Required positional; clap rejects the command line without it.
fn grammar_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("grammar_path")
        .cloned()
        .unwrap_or_default()
}

/// Parse --color flag into ColorChoice.
fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
