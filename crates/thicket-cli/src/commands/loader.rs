//! Reading grammars, tables and source text.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use thicket_core::Grammar;
use thicket_runtime::Language;
use thicket_table::MAGIC;

use super::error::CliError;

/// A grammar together with the JSON it was read from.
pub struct LoadedGrammar {
    pub grammar: Grammar,
    pub json: String,
}

pub fn load_grammar(path: &Path) -> Result<LoadedGrammar, CliError> {
    let json = fs::read_to_string(path).map_err(|e| CliError::read(path, e))?;
    let grammar = Grammar::from_json(&json).map_err(|source| CliError::Grammar {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedGrammar { grammar, json })
}

/// Load a compiled table, or compile grammar JSON on the fly.
pub fn load_language(path: &Path, colored: bool) -> Result<Language, CliError> {
    let bytes = fs::read(path).map_err(|e| CliError::read(path, e))?;
    if bytes.starts_with(&MAGIC) {
        return Ok(Language::load(&bytes)?);
    }

    let LoadedGrammar { grammar, json } = load_grammar(path)?;
    let compiled = thicket_compiler::compile(&grammar)
        .map_err(|e| CliError::compile(e, &json, path, colored))?;
    Ok(Language::load(&compiled.bytes)?)
}

pub fn load_source(path: Option<&Path>, text: Option<&str>) -> Result<String, CliError> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }
    let Some(path) = path else {
        return Err(CliError::NoSource);
    };
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::read(path, e))?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|e| CliError::read(path, e))
}
