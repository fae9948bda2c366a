use std::fs;
use std::path::PathBuf;

use super::error::{CliError, exit_with};
use super::loader::{LoadedGrammar, load_grammar};

pub struct CompileArgs {
    pub grammar_path: PathBuf,
    pub output: Option<PathBuf>,
    pub color: bool,
}

pub fn run(args: CompileArgs) {
    match compile(&args) {
        Ok(report) => eprint!("{report}"),
        Err(e) => exit_with(e),
    }
}

/// Compile and write the table; returns warnings plus a summary line.
pub fn compile(args: &CompileArgs) -> Result<String, CliError> {
    let path = &args.grammar_path;
    let LoadedGrammar { grammar, json } = load_grammar(path)?;
    let compiled = thicket_compiler::compile(&grammar)
        .map_err(|e| CliError::compile(e, &json, path, args.color))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| path.with_extension("thkt"));
    fs::write(&output, &compiled.bytes).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;

    let display = path.display().to_string();
    let mut report = compiled
        .diagnostics
        .printer()
        .source(&json)
        .path(&display)
        .colored(args.color)
        .render();
    let stats = compiled.stats;
    report.push_str(&format!(
        "compiled '{}': {} states, {} productions, {} conflicts -> {}\n",
        grammar.name,
        stats.states,
        stats.productions,
        stats.conflicts,
        output.display()
    ));
    Ok(report)
}
