//! Loaded parse table and its read contract.

use std::io;
use std::path::Path;

use regex_automata::dfa::sparse::DFA;
use thicket_core::{END_NAME, ERROR_NAME, FieldId, ProductionId, SYMBOL_ERROR, StateId, SymbolId};

use super::data::{Action, NO_GOTO, Production, SymbolInfo, SymbolKind, TableData, TokenDef, TokenMatcher};
use super::{HEADER_SIZE, Header, VERSION};

/// Error loading or encoding a table blob.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("invalid magic: expected THKT")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("file too small: {0} bytes (minimum 64)")]
    FileTooSmall(usize),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {expected:#010x}, body hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("malformed table body: {0}")]
    Decode(#[from] postcard::Error),
    #[error("invalid DFA for token `{name}`: {message}")]
    InvalidDfa { name: String, message: String },
    #[error("inconsistent table: {0}")]
    Inconsistent(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Deserialize a sparse DFA produced by `DFA::to_bytes_little_endian()`.
pub(crate) fn deserialize_dfa(bytes: &[u8]) -> Result<DFA<Vec<u8>>, String> {
    DFA::from_bytes(bytes)
        .map(|(dfa, _)| dfa.to_owned())
        .map_err(|e| e.to_string())
}

/// A compiled parse table, validated and ready to drive a parser.
///
/// Immutable once loaded; share it behind an `Arc`.
#[derive(Debug)]
pub struct ParseTable {
    data: TableData,
    /// Pattern DFAs indexed by terminal id.
    dfas: Vec<Option<DFA<Vec<u8>>>>,
    padding: Option<DFA<Vec<u8>>>,
    /// Terminals with at least one action, per state.
    valid: Vec<Vec<SymbolId>>,
}

impl ParseTable {
    /// Load a table from a blob produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TableError> {
        if bytes.len() < HEADER_SIZE {
            return Err(TableError::FileTooSmall(bytes.len()));
        }

        let header = Header::from_bytes(&bytes[..HEADER_SIZE]);

        if !header.validate_magic() {
            return Err(TableError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(TableError::UnsupportedVersion(header.version));
        }
        if header.total_size as usize != bytes.len()
            || header.body_size as usize != bytes.len() - HEADER_SIZE
        {
            return Err(TableError::SizeMismatch {
                header: header.total_size,
                actual: bytes.len(),
            });
        }

        let body = &bytes[HEADER_SIZE..];
        let actual = crc32fast::hash(body);
        if actual != header.checksum {
            return Err(TableError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        let data: TableData = postcard::from_bytes(body)?;
        Self::from_data(data)
    }

    /// Load a table from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Validate decoded table data and deserialize its DFAs.
    pub fn from_data(data: TableData) -> Result<Self, TableError> {
        validate(&data)?;

        let mut dfas = Vec::with_capacity(data.lex.tokens.len());
        for (id, token) in data.lex.tokens.iter().enumerate() {
            let dfa = match &token.matcher {
                TokenMatcher::Pattern { dfa, .. } => {
                    Some(deserialize_dfa(dfa).map_err(|message| TableError::InvalidDfa {
                        name: data.symbols[id].name.clone(),
                        message,
                    })?)
                }
                _ => None,
            };
            dfas.push(dfa);
        }

        let padding = match &data.lex.padding {
            Some(pattern) => Some(deserialize_dfa(&pattern.dfa).map_err(|message| {
                TableError::InvalidDfa {
                    name: "padding".to_string(),
                    message,
                }
            })?),
            None => None,
        };

        let terminals = data.terminal_count as usize;
        let valid = (0..data.state_count as usize)
            .map(|state| {
                (0..terminals)
                    .filter(|&t| data.action_index[state * terminals + t] != 0)
                    .map(|t| t as SymbolId)
                    .collect()
            })
            .collect();

        Ok(Self {
            data,
            dfas,
            padding,
            valid,
        })
    }

    /// Encode to a blob: 64-byte header followed by the postcard body.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TableError> {
        encode(&self.data)
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn symbol_count(&self) -> usize {
        self.data.symbols.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.data.terminal_count as usize
    }

    pub fn state_count(&self) -> usize {
        self.data.state_count as usize
    }

    pub fn external_count(&self) -> usize {
        self.data.external_count as usize
    }

    pub fn start_symbol(&self) -> SymbolId {
        self.data.start_symbol
    }

    pub fn is_terminal(&self, symbol: SymbolId) -> bool {
        (symbol as usize) < self.terminal_count()
    }

    pub fn is_nonterminal(&self, symbol: SymbolId) -> bool {
        let id = symbol as usize;
        id >= self.terminal_count() && id < self.terminal_count() + self.data.nonterminal_count as usize
    }

    /// Symbol metadata. Panics on ids outside the table; see [`symbol_name`](Self::symbol_name)
    /// for a total lookup that also knows [`SYMBOL_ERROR`].
    pub fn symbol(&self, symbol: SymbolId) -> &SymbolInfo {
        &self.data.symbols[symbol as usize]
    }

    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        if symbol == SYMBOL_ERROR {
            return ERROR_NAME;
        }
        self.data
            .symbols
            .get(symbol as usize)
            .map(|s| s.name.as_str())
            .unwrap_or(END_NAME)
    }

    /// Whether nodes of this symbol are named (ERROR nodes are).
    pub fn is_named(&self, symbol: SymbolId) -> bool {
        symbol == SYMBOL_ERROR || self.data.symbols.get(symbol as usize).is_some_and(|s| s.named)
    }

    pub fn is_visible(&self, symbol: SymbolId) -> bool {
        symbol == SYMBOL_ERROR || self.data.symbols.get(symbol as usize).is_some_and(|s| s.visible)
    }

    pub fn is_extra(&self, symbol: SymbolId) -> bool {
        self.data.symbols.get(symbol as usize).is_some_and(|s| s.extra)
    }

    /// Find a symbol by its node name. Visible symbols win over hidden ones.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<SymbolId> {
        let mut hidden = None;
        for (id, info) in self.data.symbols.iter().enumerate() {
            if info.name != name || info.named != named {
                continue;
            }
            if info.visible {
                return Some(id as SymbolId);
            }
            hidden.get_or_insert(id as SymbolId);
        }
        hidden
    }

    /// Actions for `(state, terminal)`; empty when the terminal is not viable.
    #[inline]
    pub fn actions(&self, state: StateId, terminal: SymbolId) -> &[Action] {
        let terminals = self.terminal_count();
        if terminal as usize >= terminals || state as usize >= self.state_count() {
            return &[];
        }
        let list = self.data.action_index[state as usize * terminals + terminal as usize];
        &self.data.action_lists[list as usize]
    }

    /// Whether any action exists for `(state, terminal)`.
    #[inline]
    pub fn is_viable(&self, state: StateId, terminal: SymbolId) -> bool {
        !self.actions(state, terminal).is_empty()
    }

    /// Successor state after reducing to `nonterminal` in `state`.
    #[inline]
    pub fn goto(&self, state: StateId, nonterminal: SymbolId) -> Option<StateId> {
        if !self.is_nonterminal(nonterminal) || state as usize >= self.state_count() {
            return None;
        }
        let columns = self.data.nonterminal_count as usize;
        let column = nonterminal as usize - self.terminal_count();
        match self.data.goto_index[state as usize * columns + column] {
            NO_GOTO => None,
            next => Some(next),
        }
    }

    /// Terminals with at least one action in `state`, ascending.
    pub fn valid_terminals(&self, state: StateId) -> &[SymbolId] {
        self.valid.get(state as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.data.productions[id as usize]
    }

    pub fn productions(&self) -> &[Production] {
        &self.data.productions
    }

    pub fn field_name(&self, field: FieldId) -> &str {
        self.data
            .fields
            .get(field.get() as usize - 1)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        let index = self.data.fields.iter().position(|f| f == name)?;
        FieldId::new(index as u16 + 1)
    }

    pub fn token(&self, terminal: SymbolId) -> &TokenDef {
        &self.data.lex.tokens[terminal as usize]
    }

    /// Anchored DFA of a pattern terminal.
    pub fn token_dfa(&self, terminal: SymbolId) -> Option<&DFA<Vec<u8>>> {
        self.dfas.get(terminal as usize).and_then(Option::as_ref)
    }

    /// Anchored DFA matching one unit of padding.
    pub fn padding_dfa(&self) -> Option<&DFA<Vec<u8>>> {
        self.padding.as_ref()
    }

    pub fn word(&self) -> Option<SymbolId> {
        self.data.lex.word
    }

    pub fn is_keyword(&self, terminal: SymbolId) -> bool {
        self.data.lex.keywords.contains(&terminal)
    }

    pub fn keywords(&self) -> &[SymbolId] {
        &self.data.lex.keywords
    }

    pub fn recovery(&self) -> &[SymbolId] {
        &self.data.recovery
    }

    pub fn is_recovery(&self, terminal: SymbolId) -> bool {
        self.data.recovery.contains(&terminal)
    }

    /// External scanner index of a terminal.
    pub fn external_index(&self, terminal: SymbolId) -> Option<u16> {
        match self.data.lex.tokens.get(terminal as usize)?.matcher {
            TokenMatcher::External { index } => Some(index),
            _ => None,
        }
    }

    /// Terminal for an external scanner index.
    pub fn external_symbol(&self, index: u16) -> Option<SymbolId> {
        self.data
            .lex
            .tokens
            .iter()
            .position(|t| matches!(t.matcher, TokenMatcher::External { index: i } if i == index))
            .map(|id| id as SymbolId)
    }
}

/// Encode table data to a blob.
pub fn encode(data: &TableData) -> Result<Vec<u8>, TableError> {
    let body = postcard::to_allocvec(data)?;
    let total = HEADER_SIZE + body.len();

    let header = Header {
        checksum: crc32fast::hash(&body),
        total_size: total as u32,
        body_size: body.len() as u32,
        symbol_count: data.symbols.len() as u16,
        terminal_count: data.terminal_count,
        external_count: data.external_count,
        field_count: data.fields.len() as u16,
        production_count: data.productions.len() as u16,
        state_count: data.state_count,
        action_list_count: data.action_lists.len() as u16,
        ..Header::default()
    };

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

fn validate(data: &TableData) -> Result<(), TableError> {
    let symbols = data.symbols.len();
    let terminals = data.terminal_count as usize;
    let nonterminals = data.nonterminal_count as usize;
    let states = data.state_count as usize;

    let fail = |msg: String| Err(TableError::Inconsistent(msg));

    if terminals == 0 || data.symbols.first().map(|s| s.kind) != Some(SymbolKind::End) {
        return fail("symbol 0 must be end of input".to_string());
    }
    if terminals + nonterminals > symbols {
        return fail(format!(
            "{terminals} terminals + {nonterminals} nonterminals exceed {symbols} symbols"
        ));
    }
    if data.lex.tokens.len() != terminals {
        return fail(format!(
            "{} token definitions for {terminals} terminals",
            data.lex.tokens.len()
        ));
    }
    if data.action_index.len() != states * terminals {
        return fail(format!("action index has {} entries", data.action_index.len()));
    }
    if data.goto_index.len() != states * nonterminals {
        return fail(format!("goto index has {} entries", data.goto_index.len()));
    }
    if data.action_lists.first().is_none_or(|l| !l.is_empty()) {
        return fail("action list 0 must be empty".to_string());
    }
    if let Some(&bad) = data
        .action_index
        .iter()
        .find(|&&i| i as usize >= data.action_lists.len())
    {
        return fail(format!("action list {bad} out of range"));
    }
    if let Some(&bad) = data
        .goto_index
        .iter()
        .find(|&&s| s != NO_GOTO && s as usize >= states)
    {
        return fail(format!("goto target {bad} out of range"));
    }
    for action in data.action_lists.iter().flatten() {
        match *action {
            Action::Shift { state } if state as usize >= states => {
                return fail(format!("shift target {state} out of range"));
            }
            Action::Reduce { production } if production as usize >= data.productions.len() => {
                return fail(format!("production {production} out of range"));
            }
            _ => {}
        }
    }
    for production in &data.productions {
        let lhs = production.lhs as usize;
        if lhs < terminals || lhs >= terminals + nonterminals {
            return fail(format!("production lhs {lhs} is not a nonterminal"));
        }
        if production
            .children
            .iter()
            .any(|c| c.symbol as usize >= symbols || c.alias.is_some_and(|a| a as usize >= symbols))
        {
            return fail(format!("production for symbol {lhs} references unknown symbol"));
        }
    }
    if states == 0 {
        return fail("table has no states".to_string());
    }
    Ok(())
}
