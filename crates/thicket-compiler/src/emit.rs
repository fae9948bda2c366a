//! Table emission: dense indexes, deduplicated action lists and lexer DFAs.

use std::collections::HashMap;

use thicket_table::{
    Action, LexTable, NO_GOTO, TableData, TokenDef, TokenMatcher, TokenPattern,
};

use crate::conflicts::ActionTable;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::lower::{LoweredGrammar, TokenSpec};
use crate::tokens::{self, TokenError};

pub(crate) fn emit(
    grammar: &LoweredGrammar,
    table: &ActionTable,
    diagnostics: &mut Diagnostics,
) -> Option<TableData> {
    let lex = lex_table(grammar, diagnostics)?;

    let mut action_lists: Vec<Vec<Action>> = vec![Vec::new()];
    let mut list_ids: HashMap<Vec<Action>, u16> = HashMap::from([(Vec::new(), 0)]);
    let mut action_index = Vec::with_capacity(table.actions.len() * grammar.terminal_count);

    for row in &table.actions {
        for (terminal, actions) in row.iter().enumerate() {
            let mut actions = actions.clone();
            if actions.is_empty() && grammar.symbols[terminal].extra {
                actions.push(Action::ShiftExtra);
            }
            let next = action_lists.len() as u16;
            let id = *list_ids.entry(actions.clone()).or_insert_with(|| {
                action_lists.push(actions);
                next
            });
            action_index.push(id);
        }
    }

    let goto_index = table
        .gotos
        .iter()
        .flat_map(|row| row.iter().map(|target| target.unwrap_or(NO_GOTO)))
        .collect();

    Some(TableData {
        name: grammar.name.clone(),
        symbols: grammar.symbols.clone(),
        terminal_count: grammar.terminal_count as u16,
        nonterminal_count: grammar.nonterminal_count as u16,
        external_count: grammar.external_count as u16,
        fields: grammar.fields.clone(),
        productions: grammar.productions.clone(),
        state_count: table.actions.len() as u16,
        action_lists,
        action_index,
        goto_index,
        start_symbol: grammar.start,
        lex,
        recovery: grammar.recovery.clone(),
        conflicts: grammar.conflicts.clone(),
    })
}

fn lex_table(grammar: &LoweredGrammar, diagnostics: &mut Diagnostics) -> Option<LexTable> {
    let mut failed = false;
    let mut report = |err: TokenError, owner: &str| {
        failed = true;
        let message = match err {
            TokenError::InvalidRegex { pattern, message } => {
                format!("invalid regex `{pattern}`: {message}")
            }
            TokenError::SymbolInToken(name) => {
                format!("token bodies cannot reference rule `{name}`")
            }
        };
        diagnostics
            .report(DiagnosticKind::InvalidRegex, message)
            .rule(owner)
            .emit();
    };

    let mut tokens_out = Vec::with_capacity(grammar.tokens.len());
    for (terminal, def) in grammar.tokens.iter().enumerate() {
        let matcher = match &def.spec {
            TokenSpec::End => TokenMatcher::End,
            TokenSpec::Literal(text) => TokenMatcher::Literal(text.clone()),
            TokenSpec::External(index) => TokenMatcher::External { index: *index },
            TokenSpec::Regex(source) => match tokens::build_dfa(source) {
                Ok(dfa) => TokenMatcher::Pattern {
                    source: source.clone(),
                    dfa,
                },
                Err(err) => {
                    report(err, &grammar.symbols[terminal].name);
                    continue;
                }
            },
        };
        tokens_out.push(TokenDef {
            matcher,
            immediate: def.immediate,
        });
    }

    let padding = match &grammar.padding {
        Some(source) => match tokens::build_dfa(source) {
            Ok(dfa) => Some(TokenPattern {
                source: source.clone(),
                dfa,
            }),
            Err(err) => {
                report(err, "extras");
                None
            }
        },
        None => None,
    };

    let keywords = match keywords(grammar) {
        Ok(keywords) => keywords,
        Err(err) => {
            report(err, "word");
            Vec::new()
        }
    };

    if failed {
        return None;
    }
    Some(LexTable {
        tokens: tokens_out,
        padding,
        word: grammar.word,
        keywords,
    })
}

/// Literal terminals matched in full by the word token.
fn keywords(grammar: &LoweredGrammar) -> Result<Vec<thicket_core::SymbolId>, TokenError> {
    let Some(word) = grammar.word else {
        return Ok(Vec::new());
    };
    let TokenSpec::Regex(source) = &grammar.tokens[word as usize].spec else {
        return Ok(Vec::new());
    };
    let dfa = tokens::build_dense(source)?;
    let keywords = grammar
        .tokens
        .iter()
        .enumerate()
        .filter_map(|(terminal, def)| match &def.spec {
            TokenSpec::Literal(text)
                if !text.is_empty() && tokens::longest_match(&dfa, text) == Some(text.len()) =>
            {
                Some(terminal as thicket_core::SymbolId)
            }
            _ => None,
        })
        .collect();
    Ok(keywords)
}
