//! Terminal colors for table dumps and parse traces.
//!
//! - Blue: dump section headers, named symbols in traces
//! - Green: symbol and field names in dumps, literal tokens and token text
//!   in traces
//! - Red: unresolved conflicts in dumps, recovery steps in traces
//! - Dim: ids, byte ranges, state numbers and other metadata

/// Escape sequences to splice around colored output. With [`Colors::OFF`]
/// every field is empty, so callers format the same way either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Colors {
    pub blue: &'static str,
    pub green: &'static str,
    pub red: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub const ON: Self = Self {
        blue: "\x1b[34m",
        green: "\x1b[32m",
        red: "\x1b[31m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        blue: "",
        green: "",
        red: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }
}
