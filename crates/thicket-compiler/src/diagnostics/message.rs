use std::fmt;

/// Diagnostic kinds, errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // The grammar cannot be compiled
    EmptyGrammar,
    UndefinedSymbol,
    UnproductiveRule,
    InvalidRegex,
    SymbolInToken,
    InvalidExternal,
    InvalidWord,
    UnknownPrecedence,
    PrecedenceCycle,
    TableTooLarge,

    // The grammar compiles, but probably not as intended
    UnreachableRule,
    UnsupportedExtra,
    UnresolvedConflict,
    UnknownRecoverySymbol,
    UnknownConflictSymbol,
    EmptyToken,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnreachableRule
            | Self::UnsupportedExtra
            | Self::UnresolvedConflict
            | Self::UnknownRecoverySymbol
            | Self::UnknownConflictSymbol
            | Self::EmptyToken => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Rule the diagnostic is about, when there is one.
    pub rule: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            rule: None,
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity(), self.message)?;
        if let Some(rule) = &self.rule {
            write!(f, " (in rule `{rule}`)")?;
        }
        Ok(())
    }
}
