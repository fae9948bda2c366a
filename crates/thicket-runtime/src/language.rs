use std::fmt;
use std::sync::Arc;

use thicket_table::{ParseTable, TableError};

use crate::scanner::ExternalScanner;

/// A loaded grammar: the parse table plus its external scanner.
///
/// Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct Language {
    table: Arc<ParseTable>,
    scanner: Option<Arc<dyn ExternalScanner>>,
}

impl Language {
    /// Load a table blob.
    pub fn load(bytes: &[u8]) -> Result<Self, TableError> {
        Ok(Self::from_table(ParseTable::from_bytes(bytes)?))
    }

    pub fn from_table(table: ParseTable) -> Self {
        Self {
            table: Arc::new(table),
            scanner: None,
        }
    }

    /// Register the scanner for the grammar's external tokens.
    pub fn with_scanner(mut self, scanner: impl ExternalScanner + 'static) -> Self {
        self.scanner = Some(Arc::new(scanner));
        self
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn scanner(&self) -> Option<&dyn ExternalScanner> {
        self.scanner.as_deref()
    }

    /// Node kind name of a symbol.
    pub fn kind_name(&self, symbol: thicket_core::SymbolId) -> &str {
        self.table.symbol_name(symbol)
    }

    /// Field id for a field name.
    pub fn field_id(&self, name: &str) -> Option<thicket_core::FieldId> {
        self.table.field_id(name)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.table.name())
            .field("states", &self.table.state_count())
            .field("scanner", &self.scanner.is_some())
            .finish()
    }
}
