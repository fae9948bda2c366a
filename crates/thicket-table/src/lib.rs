//! Compiled parse table format for Thicket.
//!
//! This crate contains:
//! - The on-disk blob format (64-byte [`Header`] + postcard body)
//! - The table data model (symbols, productions, actions, lexical table)
//! - [`ParseTable`], the read-only view the runtime parses with
//! - A human-readable [`dump`] of a loaded table

mod constants;
mod data;
mod dump;
mod header;
mod table;


pub use constants::{HEADER_SIZE, MAGIC, VERSION};
pub use data::{
    Action, Associativity, ChildInfo, LexTable, NO_GOTO, Production, SymbolInfo, SymbolKind,
    TableData, TokenDef, TokenMatcher, TokenPattern,
};
pub use dump::dump;
pub use header::Header;
pub use table::{ParseTable, TableError, encode};
