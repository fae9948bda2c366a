//! Grammar type definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Complete grammar description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name (e.g., "oz", "json").
    pub name: String,
    /// Production rules, preserving definition order. The first rule is the
    /// start symbol.
    pub rules: IndexMap<String, Rule>,
    /// Extra/trivia nodes (comments, whitespace).
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Precedence orderings.
    #[serde(default)]
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    /// Expected conflicts.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    /// External scanner tokens.
    #[serde(default)]
    pub externals: Vec<Rule>,
    /// Rules to inline (hidden).
    #[serde(default)]
    pub inline: Vec<String>,
    /// Supertype rules.
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Keyword identifier rule.
    #[serde(default)]
    pub word: Option<String>,
    /// Reserved word contexts.
    #[serde(default)]
    pub reserved: Vec<(String, Vec<Rule>)>,
    /// Parent grammar name (for inheritance).
    #[serde(default)]
    pub inherits: Option<String>,
    /// Terminals used to resynchronize after a syntax error, given either as
    /// literal token text or as a token rule name.
    #[serde(default)]
    pub recovery: Vec<String>,
}

impl Grammar {
    /// Name and body of the start rule.
    pub fn start_rule(&self) -> Option<(&str, &Rule)> {
        self.rules.first().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn rule_body(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Hidden rules produce no visible node (leading underscore or inlined).
    pub fn is_hidden(&self, name: &str) -> bool {
        name.starts_with('_') || self.inline.iter().any(|n| n == name)
    }
}

/// Grammar rule variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rule {
    /// Epsilon (empty match).
    Blank,
    /// Literal token.
    String(String),
    /// Regex token.
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    /// Reference to another rule.
    Symbol(String),
    /// Sequence of rules (must match in order).
    Seq(Vec<Rule>),
    /// Alternation.
    Choice(Vec<Rule>),
    /// Zero or more repetitions.
    Repeat(Box<Rule>),
    /// One or more repetitions.
    Repeat1(Box<Rule>),
    /// Named field.
    Field { name: String, content: Box<Rule> },
    /// Rename node.
    Alias {
        content: Box<Rule>,
        value: String,
        named: bool,
    },
    /// Force tokenization.
    Token(Box<Rule>),
    /// Immediate tokenization (no leading trivia).
    ImmediateToken(Box<Rule>),
    /// Precedence.
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Left-associative precedence.
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Right-associative precedence.
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Dynamic precedence.
    PrecDynamic { value: i32, content: Box<Rule> },
    /// Reserved word context.
    Reserved {
        context_name: String,
        content: Box<Rule>,
    },
}

/// Precedence value (numeric or named).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
    Name(String),
}

/// Entry in precedence ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecedenceEntry {
    /// Named precedence level.
    Name(String),
    /// Symbol reference.
    Symbol(String),
}
