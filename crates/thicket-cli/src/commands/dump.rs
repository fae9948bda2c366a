use std::path::PathBuf;

use thicket_core::Colors;

use super::error::{CliError, exit_with};
use super::loader::load_language;

pub struct DumpArgs {
    pub grammar_path: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    match dump(&args) {
        Ok(out) => print!("{out}"),
        Err(e) => exit_with(e),
    }
}

pub fn dump(args: &DumpArgs) -> Result<String, CliError> {
    let language = load_language(&args.grammar_path, args.color)?;
    Ok(thicket_table::dump(language.table(), Colors::new(args.color)))
}
