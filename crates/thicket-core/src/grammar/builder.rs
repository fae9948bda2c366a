//! Constructors for building grammars in code.
//!
//! ```
//! use thicket_core::{Grammar, Rule};
//!
//! let grammar = Grammar::new("calc")
//!     .rule("expr", Rule::choice([Rule::symbol("number"), Rule::string("x")]))
//!     .rule("number", Rule::pattern(r"\d+"))
//!     .extra(Rule::pattern(r"\s"));
//! assert_eq!(grammar.start_rule().map(|(name, _)| name), Some("expr"));
//! ```

use indexmap::IndexMap;

use super::types::{Grammar, Precedence, Rule};

impl Grammar {
    /// Empty grammar with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: IndexMap::new(),
            extras: Vec::new(),
            precedences: Vec::new(),
            conflicts: Vec::new(),
            externals: Vec::new(),
            inline: Vec::new(),
            supertypes: Vec::new(),
            word: None,
            reserved: Vec::new(),
            inherits: None,
            recovery: Vec::new(),
        }
    }

    /// Append a rule. The first rule added is the start symbol; adding a
    /// name again replaces its body in place.
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    pub fn extra(mut self, rule: Rule) -> Self {
        self.extras.push(rule);
        self
    }

    pub fn external(mut self, rule: Rule) -> Self {
        self.externals.push(rule);
        self
    }

    pub fn word(mut self, name: impl Into<String>) -> Self {
        self.word = Some(name.into());
        self
    }

    pub fn conflict<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflicts
            .push(symbols.into_iter().map(Into::into).collect());
        self
    }

    pub fn recovery(mut self, token: impl Into<String>) -> Self {
        self.recovery.push(token.into());
        self
    }
}

impl Rule {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Self::Pattern {
            value: value.into(),
            flags: None,
        }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn seq(members: impl IntoIterator<Item = Rule>) -> Self {
        Self::Seq(members.into_iter().collect())
    }

    pub fn choice(members: impl IntoIterator<Item = Rule>) -> Self {
        Self::Choice(members.into_iter().collect())
    }

    /// `choice(rule, blank)`.
    pub fn optional(rule: Rule) -> Self {
        Self::Choice(vec![rule, Self::Blank])
    }

    pub fn repeat(rule: Rule) -> Self {
        Self::Repeat(Box::new(rule))
    }

    pub fn repeat1(rule: Rule) -> Self {
        Self::Repeat1(Box::new(rule))
    }

    pub fn field(name: impl Into<String>, rule: Rule) -> Self {
        Self::Field {
            name: name.into(),
            content: Box::new(rule),
        }
    }

    pub fn alias(rule: Rule, value: impl Into<String>, named: bool) -> Self {
        Self::Alias {
            content: Box::new(rule),
            value: value.into(),
            named,
        }
    }

    pub fn token(rule: Rule) -> Self {
        Self::Token(Box::new(rule))
    }

    pub fn prec(value: i32, rule: Rule) -> Self {
        Self::Prec {
            value: Precedence::Integer(value),
            content: Box::new(rule),
        }
    }

    pub fn prec_left(value: i32, rule: Rule) -> Self {
        Self::PrecLeft {
            value: Precedence::Integer(value),
            content: Box::new(rule),
        }
    }

    pub fn prec_right(value: i32, rule: Rule) -> Self {
        Self::PrecRight {
            value: Precedence::Integer(value),
            content: Box::new(rule),
        }
    }

    pub fn prec_dynamic(value: i32, rule: Rule) -> Self {
        Self::PrecDynamic {
            value,
            content: Box::new(rule),
        }
    }
}
