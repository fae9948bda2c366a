//! Context-aware lexer.
//!
//! The lexer is pulled one token at a time with the parse states of the live
//! heads; only terminals with an action in one of those states (plus extras)
//! compete. Pattern terminals run their anchored DFA by hand so the lexer
//! knows how far it looked, which incremental reparsing needs.

use regex_automata::dfa::Automaton;
use regex_automata::dfa::sparse::DFA;
use regex_automata::{Anchored, Input};
use thicket_core::{SYMBOL_END, SYMBOL_ERROR, StateId, SymbolId};
use thicket_table::{ParseTable, TokenMatcher};

use crate::scanner::{ExternalScanner, ScanCursor};

/// A lexed token. Offsets are absolute byte positions in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub symbol: SymbolId,
    /// Where the padding before the token starts.
    pub padding_start: usize,
    pub start: usize,
    pub end: usize,
    /// Furthest byte examined while producing this token (exclusive).
    pub lookahead_end: usize,
}

impl Token {
    pub fn padding(&self) -> usize {
        self.start - self.padding_start
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub(crate) struct Lexer<'a> {
    table: &'a ParseTable,
    scanner: Option<&'a dyn ExternalScanner>,
    text: &'a str,
}

#[derive(Clone, Copy)]
struct Candidate {
    symbol: SymbolId,
    len: usize,
    literal: bool,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(
        table: &'a ParseTable,
        scanner: Option<&'a dyn ExternalScanner>,
        text: &'a str,
    ) -> Self {
        Self {
            table,
            scanner,
            text,
        }
    }

    /// Lex the token starting at `position`, valid in any of `states`.
    pub(crate) fn lex(&self, position: usize, states: &[StateId]) -> Token {
        let mut valid = vec![false; self.table.terminal_count()];
        for &state in states {
            for &terminal in self.table.valid_terminals(state) {
                valid[terminal as usize] = true;
            }
        }
        self.lex_with(position, &valid)
    }

    pub(crate) fn lex_with(&self, position: usize, valid: &[bool]) -> Token {
        let bytes = self.text.as_bytes();
        let (start, mut extent) = self.skip_padding(position);

        if let Some(token) = self.scan_external(position, start, valid) {
            return token;
        }

        if start >= bytes.len() {
            return Token {
                symbol: SYMBOL_END,
                padding_start: position,
                start: bytes.len(),
                end: bytes.len(),
                lookahead_end: extent.max(bytes.len()),
            };
        }

        let padded = start > position;
        let found = match self.longest(start, padded, valid, false, &mut extent) {
            Some(found) => Some(found),
            None => self.longest(start, padded, valid, true, &mut extent),
        };

        let (symbol, len) = match found {
            Some((symbol, len)) => (symbol, len),
            None => {
                let len = self.text[start..].chars().next().map_or(1, char::len_utf8);
                extent = extent.max(start + len);
                (SYMBOL_ERROR, len)
            }
        };

        Token {
            symbol,
            padding_start: position,
            start,
            end: start + len,
            lookahead_end: extent.max(start + len),
        }
    }

    /// Skip padding; returns the content start and the furthest byte examined.
    fn skip_padding(&self, position: usize) -> (usize, usize) {
        let mut pos = position;
        let mut extent = position;
        let Some(dfa) = self.table.padding_dfa() else {
            return (pos, extent);
        };
        while pos < self.text.len() {
            match longest_match(dfa, self.text.as_bytes(), pos, &mut extent) {
                Some(len) if len > 0 => pos += len,
                _ => break,
            }
        }
        (pos, extent)
    }

    fn scan_external(&self, position: usize, start: usize, valid: &[bool]) -> Option<Token> {
        let scanner = self.scanner?;
        let count = self.table.external_count();
        if count == 0 {
            return None;
        }
        let external_valid: Vec<bool> = (0..count as u16)
            .map(|index| {
                self.table
                    .external_symbol(index)
                    .is_some_and(|symbol| valid[symbol as usize])
            })
            .collect();
        if !external_valid.contains(&true) {
            return None;
        }

        let mut cursor = ScanCursor::new(self.text, start);
        let index = scanner.scan(&mut cursor, &external_valid)?;
        let symbol = self.table.external_symbol(index)?;
        let end = cursor.token_end();
        if !external_valid[index as usize] || end <= start {
            return None;
        }
        Some(Token {
            symbol,
            padding_start: position,
            start,
            end,
            lookahead_end: cursor.extent().max(end),
        })
    }

    /// Longest match among the candidate terminals, resolving keywords.
    fn longest(
        &self,
        start: usize,
        padded: bool,
        valid: &[bool],
        any: bool,
        extent: &mut usize,
    ) -> Option<(SymbolId, usize)> {
        let table = self.table;
        let word = table.word();
        let keywords = table.keywords();
        let word_wanted = word.is_some_and(|w| {
            any || valid[w as usize] || keywords.iter().any(|&k| valid[k as usize])
        });

        let mut best: Option<Candidate> = None;
        for terminal in 1..table.terminal_count() as SymbolId {
            let candidate = if Some(terminal) == word {
                word_wanted
            } else if word.is_some() && table.is_keyword(terminal) {
                false
            } else {
                any || valid[terminal as usize] || table.is_extra(terminal)
            };
            if !candidate {
                continue;
            }

            let token = table.token(terminal);
            if token.immediate && padded {
                continue;
            }
            let (len, literal) = match &token.matcher {
                TokenMatcher::Literal(text) => {
                    (self.match_literal(text, start, extent), true)
                }
                TokenMatcher::Pattern { .. } => match table.token_dfa(terminal) {
                    Some(dfa) => (longest_match(dfa, self.text.as_bytes(), start, extent), false),
                    None => continue,
                },
                TokenMatcher::End | TokenMatcher::External { .. } => continue,
            };
            let Some(len) = len.filter(|&len| len > 0) else {
                continue;
            };

            let better = match best {
                None => true,
                Some(b) => len > b.len || (len == b.len && literal && !b.literal),
            };
            if better {
                best = Some(Candidate {
                    symbol: terminal,
                    len,
                    literal,
                });
            }
        }

        let best = best?;
        if Some(best.symbol) == word
            && let Some(keyword) = self.keyword_for(start, best.len)
            && (any || valid[keyword as usize])
        {
            return Some((keyword, best.len));
        }
        Some((best.symbol, best.len))
    }

    fn keyword_for(&self, start: usize, len: usize) -> Option<SymbolId> {
        let text = &self.text[start..start + len];
        self.table.keywords().iter().copied().find(|&keyword| {
            matches!(&self.table.token(keyword).matcher, TokenMatcher::Literal(lit) if lit == text)
        })
    }

    fn match_literal(&self, literal: &str, start: usize, extent: &mut usize) -> Option<usize> {
        let rest = &self.text.as_bytes()[start..];
        let common = literal
            .bytes()
            .zip(rest)
            .take_while(|(a, b)| a == *b)
            .count();
        if common == literal.len() {
            *extent = (*extent).max(start + common);
            return Some(common);
        }
        *extent = (*extent).max((start + common + 1).min(self.text.len()));
        None
    }
}

/// Longest anchored match of `dfa` at `start`, walking states byte by byte.
///
/// Match states are delayed by one byte: reaching a match state after
/// consuming byte `i` means a match ends at `i`.
pub(crate) fn longest_match(
    dfa: &DFA<Vec<u8>>,
    bytes: &[u8],
    start: usize,
    extent: &mut usize,
) -> Option<usize> {
    let input = Input::new(bytes).range(start..).anchored(Anchored::Yes);
    let mut state = dfa.start_state_forward(&input).ok()?;
    let mut last = None;

    for (i, &byte) in bytes[start..].iter().enumerate() {
        state = dfa.next_state(state, byte);
        if dfa.is_special_state(state) {
            if dfa.is_match_state(state) {
                last = Some(i);
            } else if dfa.is_dead_state(state) || dfa.is_quit_state(state) {
                *extent = (*extent).max(start + i + 1);
                return last;
            }
        }
    }

    *extent = (*extent).max(bytes.len());
    state = dfa.next_eoi_state(state);
    if dfa.is_match_state(state) {
        last = Some(bytes.len() - start);
    }
    last
}
