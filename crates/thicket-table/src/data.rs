//! Table data model.
//!
//! Symbol ids are laid out as `[terminals | nonterminals | aliases]`:
//! terminal 0 is end of input, nonterminals follow the terminals, and
//! symbols that only exist as alias targets come last.

use serde::{Deserialize, Serialize};
use thicket_core::{FieldId, ProductionId, StateId, SymbolId};

/// How a symbol is recognized or built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// End of input.
    End,
    /// Literal token (`"if"`).
    Literal,
    /// Regular token (`/\d+/`, `token(...)`).
    Pattern,
    /// Token produced by an external scanner.
    External,
    /// Grammar rule.
    NonTerminal,
    /// Helper rule introduced by lowering (repeats). Never visible.
    Auxiliary,
    /// Name introduced by `alias(...)`, never parsed directly.
    Alias,
}

impl SymbolKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::End | Self::Literal | Self::Pattern | Self::External)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    /// Named nodes come from rules and patterns; literals are anonymous.
    pub named: bool,
    /// Hidden symbols are flattened away by tree accessors.
    pub visible: bool,
    /// Listed in the grammar's extras (comments, whitespace).
    pub extra: bool,
    pub supertype: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Associativity {
    #[default]
    None,
    Left,
    Right,
}

/// One right-hand-side position of a production.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildInfo {
    pub symbol: SymbolId,
    pub field: Option<FieldId>,
    /// Symbol the child is renamed to in the tree.
    pub alias: Option<SymbolId>,
}

impl ChildInfo {
    pub fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            field: None,
            alias: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SymbolId,
    pub children: Vec<ChildInfo>,
    pub precedence: i32,
    pub associativity: Associativity,
    pub dynamic_precedence: i32,
}

impl Production {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parser action for a `(state, terminal)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Shift { state: StateId },
    /// Shift an extra token without changing state.
    ShiftExtra,
    Reduce { production: ProductionId },
    Accept,
}

/// How a terminal is recognized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenMatcher {
    /// End of input, never matched by the lexer.
    End,
    Literal(String),
    /// Serialized anchored sparse DFA (little endian) plus its source regex.
    Pattern { source: String, dfa: Vec<u8> },
    /// Index into the grammar's `externals`.
    External { index: u16 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDef {
    pub matcher: TokenMatcher,
    /// `token.immediate`: not allowed after padding.
    pub immediate: bool,
}

/// Lexical description of every terminal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexTable {
    /// Indexed by terminal id.
    pub tokens: Vec<TokenDef>,
    /// DFA matching one unit of padding (pattern extras such as `\s`).
    pub padding: Option<TokenPattern>,
    /// The grammar's `word` token.
    pub word: Option<SymbolId>,
    /// Literal terminals that the word token also matches.
    pub keywords: Vec<SymbolId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPattern {
    pub source: String,
    pub dfa: Vec<u8>,
}

/// Body of a table blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub name: String,
    pub symbols: Vec<SymbolInfo>,
    pub terminal_count: u16,
    pub nonterminal_count: u16,
    pub external_count: u16,
    /// Field names; field id `n` is `fields[n - 1]`.
    pub fields: Vec<String>,
    pub productions: Vec<Production>,
    pub state_count: u16,
    /// Deduplicated action lists. List 0 is always empty.
    pub action_lists: Vec<Vec<Action>>,
    /// `state * terminal_count + terminal` → index into `action_lists`.
    pub action_index: Vec<u16>,
    /// `state * nonterminal_count + (symbol - terminal_count)` → state,
    /// `u16::MAX` when absent.
    pub goto_index: Vec<u16>,
    pub start_symbol: SymbolId,
    pub lex: LexTable,
    pub recovery: Vec<SymbolId>,
    /// Conflicts the grammar declares as expected.
    pub conflicts: Vec<Vec<SymbolId>>,
}

/// Marker for a missing goto entry.
pub const NO_GOTO: u16 = u16::MAX;
