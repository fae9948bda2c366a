use std::path::PathBuf;

use super::error::{CliError, exit_with};
use super::loader::{LoadedGrammar, load_grammar};

pub struct CheckArgs {
    pub grammar_path: PathBuf,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    match check(&args) {
        Ok(warnings) => eprint!("{warnings}"),
        Err(e) => exit_with(e),
    }
}

/// Returns rendered warnings when the grammar passes, and fails with every
/// diagnostic when it does not.
pub fn check(args: &CheckArgs) -> Result<String, CliError> {
    let path = &args.grammar_path;
    let LoadedGrammar { grammar, json } = load_grammar(path)?;
    let diagnostics = thicket_compiler::check(&grammar);

    let display = path.display().to_string();
    let rendered = diagnostics
        .printer()
        .source(&json)
        .path(&display)
        .colored(args.color)
        .render();

    let failed = diagnostics.has_errors() || (args.strict && diagnostics.has_warnings());
    if failed {
        return Err(CliError::Diagnostics(rendered));
    }
    Ok(rendered)
}
