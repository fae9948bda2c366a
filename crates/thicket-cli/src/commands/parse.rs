//! Parse source text and print its tree.

use std::ops::Range;
use std::path::PathBuf;

use thicket_core::{Colors, Edit};
use thicket_runtime::{ParseOptions, Parser, PrintTracer, Tree, Verbosity};

use super::error::{CliError, exit_with};
use super::loader::{load_language, load_source};
use super::report;

pub struct ParseArgs {
    pub grammar_path: PathBuf,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub errors: bool,
    /// Trace the parse at this level; no trace when `None`.
    pub verbosity: Option<Verbosity>,
    /// `START:OLD_END:TEXT`
    pub edit: Option<String>,
    pub fuel: Option<u32>,
    pub max_heads: Option<usize>,
    pub max_insertions: Option<u32>,
    pub color: bool,
}

pub fn run(args: ParseArgs) {
    match parse(&args) {
        Ok(out) => print!("{out}"),
        Err(e) => exit_with(e),
    }
}

pub fn parse(args: &ParseArgs) -> Result<String, CliError> {
    let language = load_language(&args.grammar_path, args.color)?;
    let source = load_source(args.source_path.as_deref(), args.source_text.as_deref())?;
    let parser = Parser::new(&language)?.with_options(options(args));
    let mut out = String::new();

    let tree = match &args.edit {
        None => traced(&parser, &source, None, args, &mut out)?,
        Some(spec) => {
            let (range, inserted) = parse_edit(spec)?;
            let old = parser.parse(&source)?;
            let (edit, text) =
                Edit::splice(&source, range.clone(), inserted).ok_or_else(|| {
                    CliError::EditRange {
                        start: range.start,
                        old_end: range.end,
                        len: source.len(),
                    }
                })?;
            let tree = traced(&parser, &text, Some((&old, &edit)), args, &mut out)?;
            let stats = tree.reuse_stats();
            out.push_str(&format!(
                "; {edit}: reused {} nodes, {} bytes\n",
                stats.reused_nodes, stats.reused_bytes
            ));
            tree
        }
    };

    out.push_str(&tree.to_sexp());
    out.push('\n');

    if args.errors && tree.has_error() {
        let origin = match &args.source_path {
            Some(path) => path.display().to_string(),
            None => "<source>".to_string(),
        };
        out.push('\n');
        out.push_str(&report::render_errors(&tree, &origin, args.color));
        out.push_str(&report::summary(&tree));
        out.push('\n');
    }
    Ok(out)
}

fn options(args: &ParseArgs) -> ParseOptions {
    let mut options = ParseOptions::new();
    if let Some(fuel) = args.fuel {
        options = options.exec_fuel(fuel);
    }
    if let Some(heads) = args.max_heads {
        options = options.max_heads(heads);
    }
    if let Some(insertions) = args.max_insertions {
        options = options.max_insertions(insertions);
    }
    options
}

/// Parse, appending the trace to `out` when one was requested.
fn traced(
    parser: &Parser,
    text: &str,
    old: Option<(&Tree, &Edit)>,
    args: &ParseArgs,
    out: &mut String,
) -> Result<Tree, CliError> {
    let Some(verbosity) = args.verbosity else {
        return Ok(match old {
            Some((tree, edit)) => parser.reparse(tree, edit, text)?,
            None => parser.parse(text)?,
        });
    };

    let table = parser.language().table();
    let mut tracer = PrintTracer::new(text, table, verbosity, Colors::new(args.color));
    let result = parser.parse_with(text, old, &mut tracer);
    for line in tracer.lines() {
        out.push_str(line);
        out.push('\n');
    }
    Ok(result?)
}

/// Split `START:OLD_END:TEXT`; TEXT may itself contain colons.
pub fn parse_edit(spec: &str) -> Result<(Range<usize>, &str), CliError> {
    let invalid = || CliError::EditSyntax(spec.to_string());
    let mut parts = spec.splitn(3, ':');
    let (Some(start), Some(old_end), Some(text)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let start: usize = start.parse().map_err(|_| invalid())?;
    let old_end: usize = old_end.parse().map_err(|_| invalid())?;
    if old_end < start {
        return Err(invalid());
    }
    Ok((start..old_end, text))
}
