//! Human-readable table dump for debugging.

use std::fmt::Write as _;

use thicket_core::Colors;

use super::data::{Action, Associativity, SymbolKind, TokenMatcher};
use super::table::ParseTable;

/// Generate a human-readable dump of a parse table.
pub fn dump(table: &ParseTable, colors: Colors) -> String {
    let mut out = String::new();
    let ctx = DumpContext::new(table, colors);

    dump_header(&mut out, table, &ctx);
    dump_symbols(&mut out, table, &ctx);
    dump_fields(&mut out, table, &ctx);
    dump_productions(&mut out, table, &ctx);
    dump_states(&mut out, table, &ctx);

    out
}

fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        ((count - 1) as f64).log10().floor() as usize + 1
    }
}

/// Precomputed display names and index widths.
struct DumpContext {
    /// Display name per symbol: literals quoted, the rest bare.
    names: Vec<String>,
    symbol_width: usize,
    production_width: usize,
    state_width: usize,
    colors: Colors,
}

impl DumpContext {
    fn new(table: &ParseTable, colors: Colors) -> Self {
        let names = table
            .data()
            .symbols
            .iter()
            .map(|s| match s.kind {
                SymbolKind::Literal => format!("{:?}", s.name),
                _ => s.name.clone(),
            })
            .collect();

        Self {
            names,
            symbol_width: width_for_count(table.symbol_count()),
            production_width: width_for_count(table.productions().len()),
            state_width: width_for_count(table.state_count()),
            colors,
        }
    }

    fn name(&self, symbol: u16) -> &str {
        self.names.get(symbol as usize).map(String::as_str).unwrap_or("?")
    }
}

fn dump_header(out: &mut String, table: &ParseTable, ctx: &DumpContext) {
    let c = &ctx.colors;
    writeln!(out, "{}[table]{}", c.blue, c.reset).unwrap();
    writeln!(out, "name = {}{:?}{}", c.green, table.name(), c.reset).unwrap();
    writeln!(out, "start = {}", ctx.name(table.start_symbol())).unwrap();
    writeln!(out, "terminals = {}", table.terminal_count()).unwrap();
    writeln!(out, "states = {}", table.state_count()).unwrap();
    if let Some(word) = table.word() {
        writeln!(out, "word = {}", ctx.name(word)).unwrap();
    }
    if !table.recovery().is_empty() {
        let names: Vec<_> = table.recovery().iter().map(|&s| ctx.name(s)).collect();
        writeln!(out, "recovery = {}", names.join(" ")).unwrap();
    }
    out.push('\n');
}

fn dump_symbols(out: &mut String, table: &ParseTable, ctx: &DumpContext) {
    let c = &ctx.colors;
    let w = ctx.symbol_width;

    writeln!(out, "{}[symbols]{}", c.blue, c.reset).unwrap();
    for (id, info) in table.data().symbols.iter().enumerate() {
        let mut flags = Vec::new();
        if !info.visible {
            flags.push("hidden");
        }
        if info.extra {
            flags.push("extra");
        }
        if info.supertype {
            flags.push("supertype");
        }
        if table.is_keyword(id as u16) {
            flags.push("keyword");
        }

        let detail = match table.data().lex.tokens.get(id).map(|t| &t.matcher) {
            Some(TokenMatcher::Pattern { source, .. }) => format!(" /{source}/"),
            Some(TokenMatcher::External { index }) => format!(" external #{index}"),
            _ => String::new(),
        };
        let kind = format!("{:?}", info.kind).to_lowercase();

        write!(out, "{id:0w$} {}{}{}", c.green, ctx.name(id as u16), c.reset).unwrap();
        write!(out, "{}  ; {kind}{detail}", c.dim).unwrap();
        if !flags.is_empty() {
            write!(out, " [{}]", flags.join(", ")).unwrap();
        }
        writeln!(out, "{}", c.reset).unwrap();
    }
    out.push('\n');
}

fn dump_fields(out: &mut String, table: &ParseTable, ctx: &DumpContext) {
    let fields = &table.data().fields;
    if fields.is_empty() {
        return;
    }
    let c = &ctx.colors;
    writeln!(out, "{}[fields]{}", c.blue, c.reset).unwrap();
    for (i, name) in fields.iter().enumerate() {
        writeln!(out, "F{} {}{name}{}", i + 1, c.green, c.reset).unwrap();
    }
    out.push('\n');
}

fn dump_productions(out: &mut String, table: &ParseTable, ctx: &DumpContext) {
    let c = &ctx.colors;
    let w = ctx.production_width;

    writeln!(out, "{}[productions]{}", c.blue, c.reset).unwrap();
    for (i, p) in table.productions().iter().enumerate() {
        write!(out, "P{i:0w$} {} ->", ctx.name(p.lhs)).unwrap();
        if p.children.is_empty() {
            write!(out, " {}ε{}", c.dim, c.reset).unwrap();
        }
        for child in &p.children {
            out.push(' ');
            if let Some(field) = child.field {
                write!(out, "{}{}:{}", c.green, table.field_name(field), c.reset).unwrap();
            }
            out.push_str(ctx.name(child.symbol));
            if let Some(alias) = child.alias {
                write!(out, "{}@{}{}", c.dim, ctx.name(alias), c.reset).unwrap();
            }
        }

        let mut meta = Vec::new();
        if p.precedence != 0 || p.associativity != Associativity::None {
            let assoc = match p.associativity {
                Associativity::None => "",
                Associativity::Left => " left",
                Associativity::Right => " right",
            };
            meta.push(format!("prec {}{assoc}", p.precedence));
        }
        if p.dynamic_precedence != 0 {
            meta.push(format!("dynamic {}", p.dynamic_precedence));
        }
        if !meta.is_empty() {
            write!(out, "{}  ; {}{}", c.dim, meta.join(", "), c.reset).unwrap();
        }
        out.push('\n');
    }
    out.push('\n');
}

fn dump_states(out: &mut String, table: &ParseTable, ctx: &DumpContext) {
    let c = &ctx.colors;
    let sw = ctx.state_width;
    let pw = ctx.production_width;

    writeln!(out, "{}[states]{}", c.blue, c.reset).unwrap();
    for state in 0..table.state_count() as u16 {
        writeln!(out, "S{state:0sw$}").unwrap();

        for &terminal in table.valid_terminals(state) {
            let actions: Vec<String> = table
                .actions(state, terminal)
                .iter()
                .map(|action| match *action {
                    Action::Shift { state } => format!("shift S{state:0sw$}"),
                    Action::ShiftExtra => "shift-extra".to_string(),
                    Action::Reduce { production } => format!("reduce P{production:0pw$}"),
                    Action::Accept => "accept".to_string(),
                })
                .collect();
            let conflict = if actions.len() > 1 {
                format!("{}  ; conflict{}", c.red, c.reset)
            } else {
                String::new()
            };
            writeln!(out, "  {} {}{conflict}", ctx.name(terminal), actions.join(" | ")).unwrap();
        }

        let first_nonterminal = table.terminal_count();
        for symbol in first_nonterminal..table.symbol_count() {
            if let Some(next) = table.goto(state, symbol as u16) {
                writeln!(
                    out,
                    "  {}{}{} goto S{next:0sw$}",
                    c.dim,
                    ctx.name(symbol as u16),
                    c.reset
                )
                .unwrap();
            }
        }
    }
}
