//! `grammar.json` reading and writing.
//!
//! The JSON form tags every rule with a `type` field (`SEQ`, `CHOICE`, ...).
//! The raw mirror types below follow that shape exactly and convert into the
//! untagged [`Rule`] tree in both directions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{Grammar, Precedence, PrecedenceEntry, Rule};

/// Error while reading or writing a grammar.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar JSON error: {0}")]
    Json(#[source] serde_json::Error),
    #[error("grammar binary decode error: {0}")]
    Binary(#[source] postcard::Error),
    /// Structurally valid input that does not describe a usable grammar.
    #[error("invalid grammar: {0}")]
    Invalid(String),
}

impl Grammar {
    /// Parse a grammar from `grammar.json` text.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: JsonGrammar = serde_json::from_str(json).map_err(GrammarError::Json)?;
        if raw.rules.is_empty() {
            return Err(GrammarError::Invalid(format!(
                "grammar '{}' defines no rules",
                raw.name
            )));
        }
        Ok(raw.into())
    }

    /// Render the grammar back to `grammar.json` text.
    pub fn to_json(&self) -> String {
        let raw = JsonGrammar::from(self);
        serde_json::to_string_pretty(&raw).expect("grammar JSON serialization is infallible")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonGrammar {
    name: String,
    rules: IndexMap<String, JsonRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extras: Vec<JsonRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    precedences: Vec<Vec<JsonPrecedenceEntry>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conflicts: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    externals: Vec<JsonRule>,
    #[serde(default, rename = "inline", skip_serializing_if = "Vec::is_empty")]
    inline_rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    supertypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    word: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    reserved: IndexMap<String, Vec<JsonRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inherits: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    recovery: Vec<String>,
}

impl From<JsonGrammar> for Grammar {
    fn from(raw: JsonGrammar) -> Self {
        // IndexMap keeps definition order, so the start rule stays first.
        Self {
            name: raw.name,
            rules: raw.rules.into_iter().map(|(k, v)| (k, v.into())).collect(),
            extras: raw.extras.into_iter().map(Into::into).collect(),
            precedences: raw
                .precedences
                .into_iter()
                .map(|level| level.into_iter().map(Into::into).collect())
                .collect(),
            conflicts: raw.conflicts,
            externals: raw.externals.into_iter().map(Into::into).collect(),
            inline: raw.inline_rules,
            supertypes: raw.supertypes,
            word: raw.word,
            reserved: raw
                .reserved
                .into_iter()
                .map(|(ctx, words)| (ctx, words.into_iter().map(Into::into).collect()))
                .collect(),
            inherits: raw.inherits,
            recovery: raw.recovery,
        }
    }
}

impl From<&Grammar> for JsonGrammar {
    fn from(grammar: &Grammar) -> Self {
        Self {
            name: grammar.name.clone(),
            rules: grammar
                .rules
                .iter()
                .map(|(k, v)| (k.clone(), v.into()))
                .collect(),
            extras: grammar.extras.iter().map(Into::into).collect(),
            precedences: grammar
                .precedences
                .iter()
                .map(|level| level.iter().map(Into::into).collect())
                .collect(),
            conflicts: grammar.conflicts.clone(),
            externals: grammar.externals.iter().map(Into::into).collect(),
            inline_rules: grammar.inline.clone(),
            supertypes: grammar.supertypes.clone(),
            word: grammar.word.clone(),
            reserved: grammar
                .reserved
                .iter()
                .map(|(ctx, words)| (ctx.clone(), words.iter().map(Into::into).collect()))
                .collect(),
            inherits: grammar.inherits.clone(),
            recovery: grammar.recovery.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum JsonRule {
    Blank,
    String {
        value: String,
    },
    Pattern {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    Symbol {
        name: String,
    },
    Seq {
        members: Vec<JsonRule>,
    },
    Choice {
        members: Vec<JsonRule>,
    },
    Repeat {
        content: Box<JsonRule>,
    },
    Repeat1 {
        content: Box<JsonRule>,
    },
    Field {
        name: String,
        content: Box<JsonRule>,
    },
    Alias {
        content: Box<JsonRule>,
        value: String,
        named: bool,
    },
    Token {
        content: Box<JsonRule>,
    },
    ImmediateToken {
        content: Box<JsonRule>,
    },
    Prec {
        value: JsonPrecedence,
        content: Box<JsonRule>,
    },
    PrecLeft {
        value: JsonPrecedence,
        content: Box<JsonRule>,
    },
    PrecRight {
        value: JsonPrecedence,
        content: Box<JsonRule>,
    },
    PrecDynamic {
        value: i32,
        content: Box<JsonRule>,
    },
    Reserved {
        context_name: String,
        content: Box<JsonRule>,
    },
}

fn boxed_rule(content: JsonRule) -> Box<Rule> {
    Box::new(content.into())
}

fn boxed_json(content: &Rule) -> Box<JsonRule> {
    Box::new(content.into())
}

impl From<JsonRule> for Rule {
    fn from(raw: JsonRule) -> Self {
        match raw {
            JsonRule::Blank => Rule::Blank,
            JsonRule::String { value } => Rule::String(value),
            JsonRule::Pattern { value, flags } => Rule::Pattern { value, flags },
            JsonRule::Symbol { name } => Rule::Symbol(name),
            JsonRule::Seq { members } => Rule::Seq(members.into_iter().map(Into::into).collect()),
            JsonRule::Choice { members } => {
                Rule::Choice(members.into_iter().map(Into::into).collect())
            }
            JsonRule::Repeat { content } => Rule::Repeat(boxed_rule(*content)),
            JsonRule::Repeat1 { content } => Rule::Repeat1(boxed_rule(*content)),
            JsonRule::Field { name, content } => Rule::Field {
                name,
                content: boxed_rule(*content),
            },
            JsonRule::Alias {
                content,
                value,
                named,
            } => Rule::Alias {
                content: boxed_rule(*content),
                value,
                named,
            },
            JsonRule::Token { content } => Rule::Token(boxed_rule(*content)),
            JsonRule::ImmediateToken { content } => Rule::ImmediateToken(boxed_rule(*content)),
            JsonRule::Prec { value, content } => Rule::Prec {
                value: value.into(),
                content: boxed_rule(*content),
            },
            JsonRule::PrecLeft { value, content } => Rule::PrecLeft {
                value: value.into(),
                content: boxed_rule(*content),
            },
            JsonRule::PrecRight { value, content } => Rule::PrecRight {
                value: value.into(),
                content: boxed_rule(*content),
            },
            JsonRule::PrecDynamic { value, content } => Rule::PrecDynamic {
                value,
                content: boxed_rule(*content),
            },
            JsonRule::Reserved {
                context_name,
                content,
            } => Rule::Reserved {
                context_name,
                content: boxed_rule(*content),
            },
        }
    }
}

impl From<&Rule> for JsonRule {
    fn from(rule: &Rule) -> Self {
        match rule {
            Rule::Blank => JsonRule::Blank,
            Rule::String(value) => JsonRule::String {
                value: value.clone(),
            },
            Rule::Pattern { value, flags } => JsonRule::Pattern {
                value: value.clone(),
                flags: flags.clone(),
            },
            Rule::Symbol(name) => JsonRule::Symbol { name: name.clone() },
            Rule::Seq(members) => JsonRule::Seq {
                members: members.iter().map(Into::into).collect(),
            },
            Rule::Choice(members) => JsonRule::Choice {
                members: members.iter().map(Into::into).collect(),
            },
            Rule::Repeat(content) => JsonRule::Repeat {
                content: boxed_json(content),
            },
            Rule::Repeat1(content) => JsonRule::Repeat1 {
                content: boxed_json(content),
            },
            Rule::Field { name, content } => JsonRule::Field {
                name: name.clone(),
                content: boxed_json(content),
            },
            Rule::Alias {
                content,
                value,
                named,
            } => JsonRule::Alias {
                content: boxed_json(content),
                value: value.clone(),
                named: *named,
            },
            Rule::Token(content) => JsonRule::Token {
                content: boxed_json(content),
            },
            Rule::ImmediateToken(content) => JsonRule::ImmediateToken {
                content: boxed_json(content),
            },
            Rule::Prec { value, content } => JsonRule::Prec {
                value: value.into(),
                content: boxed_json(content),
            },
            Rule::PrecLeft { value, content } => JsonRule::PrecLeft {
                value: value.into(),
                content: boxed_json(content),
            },
            Rule::PrecRight { value, content } => JsonRule::PrecRight {
                value: value.into(),
                content: boxed_json(content),
            },
            Rule::PrecDynamic { value, content } => JsonRule::PrecDynamic {
                value: *value,
                content: boxed_json(content),
            },
            Rule::Reserved {
                context_name,
                content,
            } => JsonRule::Reserved {
                context_name: context_name.clone(),
                content: boxed_json(content),
            },
        }
    }
}

/// Precedence value: either an integer or a named level.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum JsonPrecedence {
    Integer(i32),
    Name(String),
}

impl From<JsonPrecedence> for Precedence {
    fn from(raw: JsonPrecedence) -> Self {
        match raw {
            JsonPrecedence::Integer(n) => Precedence::Integer(n),
            JsonPrecedence::Name(s) => Precedence::Name(s),
        }
    }
}

impl From<&Precedence> for JsonPrecedence {
    fn from(prec: &Precedence) -> Self {
        match prec {
            Precedence::Integer(n) => JsonPrecedence::Integer(*n),
            Precedence::Name(s) => JsonPrecedence::Name(s.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum JsonPrecedenceEntry {
    String { value: String },
    Symbol { name: String },
}

impl From<JsonPrecedenceEntry> for PrecedenceEntry {
    fn from(raw: JsonPrecedenceEntry) -> Self {
        match raw {
            JsonPrecedenceEntry::String { value } => PrecedenceEntry::Name(value),
            JsonPrecedenceEntry::Symbol { name } => PrecedenceEntry::Symbol(name),
        }
    }
}

impl From<&PrecedenceEntry> for JsonPrecedenceEntry {
    fn from(entry: &PrecedenceEntry) -> Self {
        match entry {
            PrecedenceEntry::Name(value) => JsonPrecedenceEntry::String {
                value: value.clone(),
            },
            PrecedenceEntry::Symbol(name) => JsonPrecedenceEntry::Symbol { name: name.clone() },
        }
    }
}
