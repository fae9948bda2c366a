use std::io;
use std::path::{Path, PathBuf};

use thicket_compiler::CompileError;
use thicket_core::GrammarError;
use thicket_runtime::ParseError;
use thicket_table::TableError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is neither a compiled table nor a grammar: {source}", .path.display())]
    Grammar {
        path: PathBuf,
        #[source]
        source: GrammarError,
    },

    /// Rendered grammar diagnostics.
    #[error("{0}")]
    Diagnostics(String),

    #[error("invalid table: {0}")]
    Table(#[from] TableError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("source is required: use a SOURCE argument or -s/--source")]
    NoSource,

    #[error("invalid edit '{0}': expected START:OLD_END:TEXT")]
    EditSyntax(String),

    #[error("edit {start}..{old_end} does not fit the {len}-byte source")]
    EditRange {
        start: usize,
        old_end: usize,
        len: usize,
    },
}

impl CliError {
    pub fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Render grammar diagnostics against the JSON they came from.
    pub fn compile(err: CompileError, json: &str, path: &Path, colored: bool) -> Self {
        match err {
            CompileError::Grammar(diagnostics) => {
                let path = path.display().to_string();
                Self::Diagnostics(
                    diagnostics
                        .printer()
                        .source(json)
                        .path(&path)
                        .colored(colored)
                        .render(),
                )
            }
            CompileError::Table(e) => Self::Table(e),
        }
    }
}

/// Report `err` on stderr and exit with status 1.
pub fn exit_with(err: CliError) -> ! {
    match err {
        CliError::Diagnostics(rendered) => eprint!("{rendered}"),
        other => eprintln!("error: {other}"),
    }
    std::process::exit(1);
}
