//! Token bodies to regular expressions and anchored DFAs.
//!
//! Every pattern terminal is compiled to an anchored sparse DFA with
//! `MatchKind::All`, so a forward search reports the longest match.

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input, MatchKind};
use thicket_core::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenError {
    /// A rule reference inside `token(...)`.
    SymbolInToken(String),
    InvalidRegex { pattern: String, message: String },
}

/// Literal text of a token body made only of a string (possibly wrapped in
/// precedence or token markers).
pub(crate) fn literal_text(rule: &Rule) -> Option<&str> {
    match rule {
        Rule::String(s) => Some(s),
        Rule::Token(inner) | Rule::ImmediateToken(inner) => literal_text(inner),
        Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. } => literal_text(content),
        _ => None,
    }
}

/// Regex for a JS-style pattern with flags. Only `i`, `m` and `s` carry
/// over; `u`, `g` and `y` have no meaning for an anchored token.
pub(crate) fn pattern_regex(value: &str, flags: Option<&str>) -> String {
    let flags: String = flags
        .unwrap_or_default()
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's'))
        .collect();
    if flags.is_empty() {
        format!("(?:{value})")
    } else {
        format!("(?{flags}:{value})")
    }
}

/// Regex source for a token body.
pub(crate) fn rule_to_regex(rule: &Rule) -> Result<String, TokenError> {
    let mut out = String::new();
    write_regex(rule, &mut out)?;
    Ok(out)
}

fn write_regex(rule: &Rule, out: &mut String) -> Result<(), TokenError> {
    match rule {
        Rule::Blank => {}
        Rule::String(s) => out.push_str(&regex_syntax::escape(s)),
        Rule::Pattern { value, flags } => out.push_str(&pattern_regex(value, flags.as_deref())),
        Rule::Symbol(name) => return Err(TokenError::SymbolInToken(name.clone())),
        Rule::Seq(members) => {
            out.push_str("(?:");
            for member in members {
                write_regex(member, out)?;
            }
            out.push(')');
        }
        Rule::Choice(members) => {
            out.push_str("(?:");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                write_regex(member, out)?;
            }
            out.push(')');
        }
        Rule::Repeat(inner) => {
            out.push_str("(?:");
            write_regex(inner, out)?;
            out.push_str(")*");
        }
        Rule::Repeat1(inner) => {
            out.push_str("(?:");
            write_regex(inner, out)?;
            out.push_str(")+");
        }
        Rule::Token(inner) | Rule::ImmediateToken(inner) => write_regex(inner, out)?,
        Rule::Field { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. }
        | Rule::Reserved { content, .. } => write_regex(content, out)?,
    }
    Ok(())
}

/// Parse a regex, returning whether it can match the empty string.
pub(crate) fn validate(pattern: &str) -> Result<bool, TokenError> {
    let hir = regex_syntax::ParserBuilder::new()
        .build()
        .parse(pattern)
        .map_err(|e| TokenError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    Ok(hir.properties().minimum_len() == Some(0))
}

/// Build an anchored, longest-match dense DFA.
pub(crate) fn build_dense(pattern: &str) -> Result<dense::DFA<Vec<u32>>, TokenError> {
    dense::DFA::builder()
        .configure(
            dense::DFA::config()
                .start_kind(StartKind::Anchored)
                .match_kind(MatchKind::All)
                .unicode_word_boundary(true)
                .minimize(true),
        )
        .build(pattern)
        .map_err(|e| TokenError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Build and serialize the sparse DFA stored in the table.
pub(crate) fn build_dfa(pattern: &str) -> Result<Vec<u8>, TokenError> {
    let sparse = build_dense(pattern)?
        .to_sparse()
        .map_err(|e| TokenError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    Ok(sparse.to_bytes_little_endian())
}

/// Length of the longest anchored match at the start of `text`.
pub(crate) fn longest_match(dfa: &dense::DFA<Vec<u32>>, text: &str) -> Option<usize> {
    let input = Input::new(text).anchored(Anchored::Yes);
    dfa.try_search_fwd(&input).ok().flatten().map(|m| m.offset())
}
