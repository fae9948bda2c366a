use thicket_core::Edit;

/// Errors that abort a parse.
///
/// Syntax errors are not among them: they become ERROR nodes and the parse
/// still yields a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("parse cancelled")]
    Cancelled,

    #[error("parse step budget exhausted")]
    FuelExhausted,

    #[error(
        "edit {edit} does not fit the old text ({old_len} bytes) and the new text ({new_len} bytes)"
    )]
    EditConflict {
        edit: Edit,
        old_len: usize,
        new_len: usize,
    },

    #[error("grammar `{0}` declares external tokens but no external scanner is registered")]
    MissingScanner(String),
}
