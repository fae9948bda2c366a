//! Lowering: rule trees to symbols and flat productions.
//!
//! Terminals are numbered first (end of input, externals, token rules, then
//! anonymous tokens in discovery order), followed by grammar rules in
//! definition order, the auxiliary rules introduced for repetition, and
//! finally names that only exist as alias targets.
//!
//! Choices are expanded into separate productions. Repetitions become
//! hidden left-recursive auxiliary rules (`A -> A x | x`).

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use thicket_core::{FieldId, Grammar, Rule, SymbolId};
use thicket_table::{Associativity, ChildInfo, Production, SymbolInfo, SymbolKind};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::precedence::PrecedenceTable;
use crate::tokens::{self, TokenError};

/// Seq expansions beyond this many alternatives move choices into helper rules.
const MAX_ALTERNATIVES: usize = 256;

/// How the lexer recognizes a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenSpec {
    End,
    Literal(String),
    Regex(String),
    External(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TerminalDef {
    pub spec: TokenSpec,
    pub immediate: bool,
}

/// A grammar reduced to numbered symbols and flat productions.
#[derive(Debug, Clone)]
pub(crate) struct LoweredGrammar {
    pub name: String,
    pub symbols: Vec<SymbolInfo>,
    pub terminal_count: usize,
    pub nonterminal_count: usize,
    pub external_count: usize,
    pub fields: Vec<String>,
    pub productions: Vec<Production>,
    pub start: SymbolId,
    /// Indexed by terminal id.
    pub tokens: Vec<TerminalDef>,
    /// Regex matching one unit of padding.
    pub padding: Option<String>,
    pub extras: Vec<SymbolId>,
    pub word: Option<SymbolId>,
    pub recovery: Vec<SymbolId>,
    pub conflicts: Vec<Vec<SymbolId>>,
    /// Grammar rule each symbol belongs to (auxiliary rules map to the rule
    /// that introduced them).
    pub owner: Vec<SymbolId>,
}

impl LoweredGrammar {
    pub(crate) fn name(&self, symbol: SymbolId) -> &str {
        &self.symbols[symbol as usize].name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Sym {
    Terminal(usize),
    NonTerminal(usize),
}

#[derive(Debug, Clone)]
struct DraftChild {
    sym: Sym,
    field: Option<String>,
    alias: Option<(String, bool)>,
}

#[derive(Debug, Clone, Default)]
struct Alt {
    children: Vec<DraftChild>,
    prec: Option<i32>,
    assoc: Option<Associativity>,
    dynamic: Option<i32>,
}

impl Alt {
    fn single(sym: Sym) -> Self {
        Self {
            children: vec![DraftChild {
                sym,
                field: None,
                alias: None,
            }],
            ..Self::default()
        }
    }

    fn concat(&self, other: &Alt) -> Alt {
        let mut children = self.children.clone();
        children.extend(other.children.iter().cloned());
        let dynamic = match (self.dynamic, other.dynamic) {
            (Some(a), Some(b)) => Some(if b.abs() >= a.abs() { b } else { a }),
            (a, b) => b.or(a),
        };
        Alt {
            children,
            prec: other.prec.or(self.prec),
            assoc: other.assoc.or(self.assoc),
            dynamic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TerminalKey {
    Literal(String, bool),
    Regex(String, bool),
}

#[derive(Debug)]
struct TerminalDraft {
    name: String,
    kind: SymbolKind,
    named: bool,
    visible: bool,
    extra: bool,
    def: TerminalDef,
}

#[derive(Debug)]
struct NonTerminalDraft {
    name: String,
    kind: SymbolKind,
    visible: bool,
    supertype: bool,
    /// Rule nonterminal that introduced this one.
    owner: usize,
    alts: Vec<Alt>,
    rule_prec: Option<i32>,
    aux_count: usize,
}

struct Lowerer<'g, 'd> {
    grammar: &'g Grammar,
    diagnostics: &'d mut Diagnostics,
    precedences: PrecedenceTable,
    terminals: Vec<TerminalDraft>,
    terminal_keys: HashMap<TerminalKey, usize>,
    nonterminals: Vec<NonTerminalDraft>,
    /// Rule or external name to symbol.
    names: HashMap<&'g str, Sym>,
    anonymous_tokens: usize,
}

/// Lower a grammar. Returns `None` when there is nothing to lower; other
/// problems are reported to `diagnostics` and lowering continues so that
/// as many of them as possible surface at once.
pub(crate) fn lower(grammar: &Grammar, diagnostics: &mut Diagnostics) -> Option<LoweredGrammar> {
    let Some((start_name, _)) = grammar.start_rule() else {
        diagnostics
            .report(DiagnosticKind::EmptyGrammar, "grammar has no rules")
            .emit();
        return None;
    };

    let precedences = PrecedenceTable::resolve(grammar, diagnostics);
    let mut lowerer = Lowerer {
        grammar,
        diagnostics,
        precedences,
        terminals: Vec::new(),
        terminal_keys: HashMap::new(),
        nonterminals: Vec::new(),
        names: HashMap::new(),
        anonymous_tokens: 0,
    };

    lowerer.check_undefined();
    let reachable = lowerer.reachable(start_name);
    lowerer.declare_symbols(start_name, &reachable);
    lowerer.lower_rules();
    let (padding, extras) = lowerer.lower_extras();
    Some(lowerer.finish(padding, extras))
}

impl<'g, 'd> Lowerer<'g, 'd> {
    fn is_defined(&self, name: &str) -> bool {
        self.grammar.has_rule(name) || external_names(self.grammar).any(|n| n == name)
    }

    fn check_undefined(&mut self) {
        let grammar = self.grammar;
        let mut reported = HashSet::new();
        for (name, rule) in &grammar.rules {
            self.report_undefined(&mut reported, Some(name.as_str()), rule);
        }
        for rule in &grammar.extras {
            self.report_undefined(&mut reported, None, rule);
        }
    }

    fn report_undefined(
        &mut self,
        reported: &mut HashSet<String>,
        owner: Option<&str>,
        rule: &Rule,
    ) {
        let mut refs = Vec::new();
        collect_refs(rule, &mut refs);
        for name in refs {
            if self.is_defined(name) || !reported.insert(name.to_string()) {
                continue;
            }
            let builder = self.diagnostics.report(
                DiagnosticKind::UndefinedSymbol,
                format!("undefined symbol `{name}`"),
            );
            match owner {
                Some(owner) => builder.rule(owner).emit(),
                None => builder.emit(),
            }
        }
    }

    /// Rules reachable from the start rule and the extras.
    fn reachable(&mut self, start: &'g str) -> HashSet<&'g str> {
        let grammar = self.grammar;
        let externals: HashSet<&str> = external_names(grammar).collect();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        let mut extra_refs = Vec::new();
        for rule in &grammar.extras {
            collect_refs(rule, &mut extra_refs);
        }
        queue.extend(extra_refs);

        while let Some(name) = queue.pop_front() {
            if externals.contains(name) || !seen.insert(name) {
                continue;
            }
            if let Some(rule) = grammar.rule_body(name) {
                let mut refs = Vec::new();
                collect_refs(rule, &mut refs);
                queue.extend(refs);
            }
        }

        for (name, _) in &grammar.rules {
            if !seen.contains(name.as_str()) && !externals.contains(name.as_str()) {
                self.diagnostics
                    .report(
                        DiagnosticKind::UnreachableRule,
                        format!("rule `{name}` is unreachable from the start rule"),
                    )
                    .rule(name)
                    .emit();
            }
        }
        seen
    }

    fn declare_symbols(&mut self, start: &'g str, reachable: &HashSet<&'g str>) {
        self.terminals.push(TerminalDraft {
            name: thicket_core::END_NAME.to_string(),
            kind: SymbolKind::End,
            named: false,
            visible: false,
            extra: false,
            def: TerminalDef {
                spec: TokenSpec::End,
                immediate: false,
            },
        });

        let grammar = self.grammar;
        for (index, rule) in grammar.externals.iter().enumerate() {
            let (name, named) = match rule {
                Rule::Symbol(name) => (name.as_str(), true),
                Rule::String(text) => (text.as_str(), false),
                _ => {
                    self.diagnostics
                        .report(
                            DiagnosticKind::InvalidExternal,
                            format!("external token #{index} must be a symbol or a string"),
                        )
                        .emit();
                    continue;
                }
            };
            let id = self.terminals.len();
            self.terminals.push(TerminalDraft {
                name: name.to_string(),
                kind: SymbolKind::External,
                named,
                visible: !named || !grammar.is_hidden(name),
                extra: false,
                def: TerminalDef {
                    spec: TokenSpec::External(index as u16),
                    immediate: false,
                },
            });
            if named {
                self.names.insert(name, Sym::Terminal(id));
            } else {
                self.terminal_keys
                    .insert(TerminalKey::Literal(name.to_string(), false), id);
            }
        }

        // Token rules become named terminals.
        for (name, rule) in &grammar.rules {
            let name = name.as_str();
            if name == start || !reachable.contains(name) || self.names.contains_key(name) {
                continue;
            }
            let Some((body, immediate)) = token_body(rule) else {
                continue;
            };
            let spec = self.token_spec(body, name);
            let id = self.terminals.len();
            self.terminals.push(TerminalDraft {
                name: name.to_string(),
                kind: match spec {
                    TokenSpec::Literal(_) => SymbolKind::Literal,
                    _ => SymbolKind::Pattern,
                },
                named: true,
                visible: !grammar.is_hidden(name),
                extra: false,
                def: TerminalDef { spec, immediate },
            });
            self.names.insert(name, Sym::Terminal(id));
        }

        // Everything else reachable is a nonterminal, start rule first.
        let rule_order = std::iter::once(start).chain(
            grammar
                .rules
                .iter()
                .map(|(name, _)| name.as_str())
                .filter(|&name| name != start),
        );
        for name in rule_order {
            if !reachable.contains(name) || self.names.contains_key(name) {
                continue;
            }
            let id = self.nonterminals.len();
            let supertype = grammar.supertypes.iter().any(|s| s == name);
            self.nonterminals.push(NonTerminalDraft {
                name: name.to_string(),
                kind: SymbolKind::NonTerminal,
                visible: !grammar.is_hidden(name) && !supertype,
                supertype,
                owner: id,
                alts: Vec::new(),
                rule_prec: self.precedences.rule_value(name),
                aux_count: 0,
            });
            self.names.insert(name, Sym::NonTerminal(id));
        }
    }

    fn token_spec(&mut self, body: &Rule, owner: &str) -> TokenSpec {
        if let Some(text) = tokens::literal_text(body) {
            return TokenSpec::Literal(text.to_string());
        }
        let regex = match tokens::rule_to_regex(body) {
            Ok(regex) => regex,
            Err(err) => {
                self.report_token_error(err, owner);
                return TokenSpec::Regex(String::new());
            }
        };
        match tokens::validate(&regex) {
            Ok(false) => {}
            Ok(true) => self
                .diagnostics
                .report(
                    DiagnosticKind::EmptyToken,
                    format!("token `{regex}` matches the empty string; empty matches are ignored"),
                )
                .rule(owner)
                .emit(),
            Err(err) => self.report_token_error(err, owner),
        }
        TokenSpec::Regex(regex)
    }

    fn report_token_error(&mut self, err: TokenError, owner: &str) {
        let (kind, message) = match err {
            TokenError::SymbolInToken(name) => (
                DiagnosticKind::SymbolInToken,
                format!("token bodies cannot reference rule `{name}`"),
            ),
            TokenError::InvalidRegex { pattern, message } => (
                DiagnosticKind::InvalidRegex,
                format!("invalid regex `{pattern}`: {message}"),
            ),
        };
        self.diagnostics.report(kind, message).rule(owner).emit();
    }

    fn lower_rules(&mut self) {
        let grammar = self.grammar;
        let count = self.nonterminals.len();
        for nt in 0..count {
            let name = self.nonterminals[nt].name.clone();
            let Some(rule) = grammar.rule_body(&name) else {
                continue;
            };
            let alts = self.expand(rule, nt);
            self.nonterminals[nt].alts = alts;
        }
    }

    fn intern(&mut self, key: TerminalKey, owner: usize) -> usize {
        if let Some(&id) = self.terminal_keys.get(&key) {
            return id;
        }
        let id = self.terminals.len();
        let draft = match &key {
            TerminalKey::Literal(text, immediate) => TerminalDraft {
                name: text.clone(),
                kind: SymbolKind::Literal,
                named: false,
                visible: true,
                extra: false,
                def: TerminalDef {
                    spec: TokenSpec::Literal(text.clone()),
                    immediate: *immediate,
                },
            },
            TerminalKey::Regex(regex, immediate) => {
                self.anonymous_tokens += 1;
                TerminalDraft {
                    name: format!(
                        "{}_token{}",
                        self.nonterminals[owner].name, self.anonymous_tokens
                    ),
                    kind: SymbolKind::Pattern,
                    named: false,
                    visible: false,
                    extra: false,
                    def: TerminalDef {
                        spec: TokenSpec::Regex(regex.clone()),
                        immediate: *immediate,
                    },
                }
            }
        };
        self.terminals.push(draft);
        self.terminal_keys.insert(key, id);
        id
    }

    /// Terminal for an inline token rule (string, pattern or token(...)).
    fn inline_token(&mut self, body: &Rule, immediate: bool, owner: usize) -> Option<usize> {
        let owner_name = self.nonterminals[owner].name.clone();
        let key = match self.token_spec(body, &owner_name) {
            TokenSpec::Literal(text) if text.is_empty() => {
                self.diagnostics
                    .report(DiagnosticKind::EmptyToken, "empty string token is ignored")
                    .rule(owner_name)
                    .emit();
                return None;
            }
            TokenSpec::Literal(text) => TerminalKey::Literal(text, immediate),
            TokenSpec::Regex(regex) => TerminalKey::Regex(regex, immediate),
            TokenSpec::End | TokenSpec::External(_) => return None,
        };
        Some(self.intern(key, owner))
    }

    fn expand(&mut self, rule: &Rule, owner: usize) -> Vec<Alt> {
        match rule {
            Rule::Blank => vec![Alt::default()],
            Rule::String(_) | Rule::Pattern { .. } => self.token_alt(rule, false, owner),
            Rule::Token(inner) => self.token_alt(inner, false, owner),
            Rule::ImmediateToken(inner) => self.token_alt(inner, true, owner),
            Rule::Symbol(name) => match self.names.get(name.as_str()) {
                Some(&sym) => vec![Alt::single(sym)],
                None => vec![Alt::default()],
            },
            Rule::Seq(members) => {
                let mut acc = vec![Alt::default()];
                for member in members {
                    let mut alts = self.expand(member, owner);
                    if alts.len() > 1 && acc.len() * alts.len() > MAX_ALTERNATIVES {
                        let aux = self.add_aux(owner, "seq", alts);
                        alts = vec![Alt::single(Sym::NonTerminal(aux))];
                    }
                    acc = acc
                        .iter()
                        .flat_map(|a| alts.iter().map(move |b| a.concat(b)))
                        .collect();
                }
                acc
            }
            Rule::Choice(members) => {
                let alts: Vec<Alt> = members.iter().flat_map(|m| self.expand(m, owner)).collect();
                if alts.is_empty() {
                    vec![Alt::default()]
                } else {
                    alts
                }
            }
            Rule::Repeat(inner) => {
                let aux = self.repeat_aux(inner, owner);
                vec![Alt::single(Sym::NonTerminal(aux)), Alt::default()]
            }
            Rule::Repeat1(inner) => {
                let aux = self.repeat_aux(inner, owner);
                vec![Alt::single(Sym::NonTerminal(aux))]
            }
            Rule::Field { name, content } => {
                let mut alts = self.expand(content, owner);
                for child in alts.iter_mut().flat_map(|a| a.children.iter_mut()) {
                    child.field.get_or_insert_with(|| name.clone());
                }
                alts
            }
            Rule::Alias {
                content,
                value,
                named,
            } => {
                let mut alts = self.expand(content, owner);
                if alts.iter().any(|a| a.children.len() != 1) {
                    let aux = self.add_aux(owner, "alias", alts);
                    alts = vec![Alt::single(Sym::NonTerminal(aux))];
                }
                for alt in &mut alts {
                    alt.children[0].alias = Some((value.clone(), *named));
                }
                alts
            }
            Rule::Prec { value, content } => {
                let value = self.precedence(value, owner);
                self.with_precedence(content, owner, value, None)
            }
            Rule::PrecLeft { value, content } => {
                let value = self.precedence(value, owner);
                self.with_precedence(content, owner, value, Some(Associativity::Left))
            }
            Rule::PrecRight { value, content } => {
                let value = self.precedence(value, owner);
                self.with_precedence(content, owner, value, Some(Associativity::Right))
            }
            Rule::PrecDynamic { value, content } => {
                let mut alts = self.expand(content, owner);
                for alt in &mut alts {
                    alt.dynamic.get_or_insert(*value);
                }
                alts
            }
            Rule::Reserved { content, .. } => self.expand(content, owner),
        }
    }

    fn token_alt(&mut self, body: &Rule, immediate: bool, owner: usize) -> Vec<Alt> {
        match self.inline_token(body, immediate, owner) {
            Some(id) => vec![Alt::single(Sym::Terminal(id))],
            None => vec![Alt::default()],
        }
    }

    fn precedence(&mut self, value: &thicket_core::Precedence, owner: usize) -> i32 {
        let rule = self.nonterminals[owner].name.clone();
        self.precedences.value(value, &rule, self.diagnostics)
    }

    fn with_precedence(
        &mut self,
        content: &Rule,
        owner: usize,
        value: i32,
        assoc: Option<Associativity>,
    ) -> Vec<Alt> {
        let mut alts = self.expand(content, owner);
        for alt in &mut alts {
            alt.prec.get_or_insert(value);
            if let Some(assoc) = assoc {
                alt.assoc.get_or_insert(assoc);
            }
        }
        alts
    }

    fn add_aux(&mut self, owner: usize, suffix: &str, alts: Vec<Alt>) -> usize {
        let rule = self.nonterminals[owner].owner;
        self.nonterminals[rule].aux_count += 1;
        let name = format!(
            "{}_{suffix}{}",
            self.nonterminals[rule].name, self.nonterminals[rule].aux_count
        );
        let id = self.nonterminals.len();
        self.nonterminals.push(NonTerminalDraft {
            name,
            kind: SymbolKind::Auxiliary,
            visible: false,
            supertype: false,
            owner: rule,
            alts,
            rule_prec: None,
            aux_count: 0,
        });
        id
    }

    /// `A -> A x | x` for every alternative `x` of the repeated rule.
    fn repeat_aux(&mut self, inner: &Rule, owner: usize) -> usize {
        let aux = self.add_aux(owner, "repeat", Vec::new());
        let body = self.expand(inner, owner);
        let body: Vec<Alt> = body.into_iter().filter(|a| !a.children.is_empty()).collect();
        let mut alts = Vec::with_capacity(body.len() * 2);
        for alt in &body {
            alts.push(Alt::single(Sym::NonTerminal(aux)).concat(alt));
        }
        alts.extend(body);
        if alts.is_empty() {
            alts.push(Alt::default());
        }
        self.nonterminals[aux].alts = alts;
        aux
    }

    /// Extras: patterns feed the padding regex, token rules become extra
    /// terminals.
    fn lower_extras(&mut self) -> (Option<String>, Vec<usize>) {
        let grammar = self.grammar;
        let mut padding = Vec::new();
        let mut extras = Vec::new();

        for rule in &grammar.extras {
            match rule {
                Rule::String(text) if !text.is_empty() => padding.push(regex_syntax::escape(text)),
                Rule::Pattern { value, flags } => {
                    let regex = tokens::pattern_regex(value, flags.as_deref());
                    match tokens::validate(&regex) {
                        Ok(_) => padding.push(regex),
                        Err(err) => self.report_token_error(err, "extras"),
                    }
                }
                Rule::Symbol(name) => match self.names.get(name.as_str()) {
                    Some(Sym::Terminal(id)) => extras.push(*id),
                    Some(Sym::NonTerminal(_)) => self
                        .diagnostics
                        .report(
                            DiagnosticKind::UnsupportedExtra,
                            format!("extra `{name}` is not a token; only token extras are supported"),
                        )
                        .rule(name)
                        .emit(),
                    None => {}
                },
                other => match token_body(other) {
                    Some((body, immediate)) if !self.nonterminals.is_empty() => {
                        if let Some(id) = self.inline_token(body, immediate, 0) {
                            extras.push(id);
                        }
                    }
                    _ => self
                        .diagnostics
                        .report(
                            DiagnosticKind::UnsupportedExtra,
                            "extras must be patterns, strings or token rules",
                        )
                        .emit(),
                },
            }
        }

        for &id in &extras {
            self.terminals[id].extra = true;
        }
        let padding = (!padding.is_empty()).then(|| {
            padding
                .iter()
                .map(|p| format!("(?:{p})"))
                .collect::<Vec<_>>()
                .join("|")
        });
        (padding, extras)
    }

    fn finish(mut self, padding: Option<String>, extras: Vec<usize>) -> LoweredGrammar {
        let terminal_count = self.terminals.len();
        let nonterminal_count = self.nonterminals.len();
        let id_of = |sym: Sym| -> SymbolId {
            match sym {
                Sym::Terminal(i) => i as SymbolId,
                Sym::NonTerminal(i) => (terminal_count + i) as SymbolId,
            }
        };

        let mut symbols: Vec<SymbolInfo> = self
            .terminals
            .iter()
            .map(|t| SymbolInfo {
                name: t.name.clone(),
                kind: t.kind,
                named: t.named,
                visible: t.visible,
                extra: t.extra,
                supertype: false,
            })
            .chain(self.nonterminals.iter().map(|n| SymbolInfo {
                name: n.name.clone(),
                kind: n.kind,
                named: true,
                visible: n.visible,
                extra: false,
                supertype: n.supertype,
            }))
            .collect();

        let fields: Vec<String> = self
            .nonterminals
            .iter()
            .flat_map(|n| n.alts.iter())
            .flat_map(|a| a.children.iter())
            .filter_map(|c| c.field.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Alias targets reuse an existing visible symbol of the same name.
        let mut aliases: IndexMap<(String, bool), SymbolId> = IndexMap::new();
        for child in self
            .nonterminals
            .iter()
            .flat_map(|n| n.alts.iter())
            .flat_map(|a| a.children.iter())
        {
            let Some(key) = &child.alias else {
                continue;
            };
            if aliases.contains_key(key) {
                continue;
            }
            let existing = symbols
                .iter()
                .position(|s| s.visible && s.name == key.0 && s.named == key.1);
            let id = match existing {
                Some(id) => id as SymbolId,
                None => {
                    symbols.push(SymbolInfo {
                        name: key.0.clone(),
                        kind: SymbolKind::Alias,
                        named: key.1,
                        visible: true,
                        extra: false,
                        supertype: false,
                    });
                    (symbols.len() - 1) as SymbolId
                }
            };
            aliases.insert(key.clone(), id);
        }

        let field_id = |name: &str| -> Option<FieldId> {
            let index = fields.iter().position(|f| f == name)?;
            FieldId::new(index as u16 + 1)
        };

        let mut productions = Vec::new();
        for (index, nt) in self.nonterminals.iter().enumerate() {
            let lhs = (terminal_count + index) as SymbolId;
            let mut seen = HashSet::new();
            for alt in &nt.alts {
                let production = Production {
                    lhs,
                    children: alt
                        .children
                        .iter()
                        .map(|c| ChildInfo {
                            symbol: id_of(c.sym),
                            field: c.field.as_deref().and_then(field_id),
                            alias: c.alias.as_ref().and_then(|k| aliases.get(k).copied()),
                        })
                        .collect(),
                    precedence: alt.prec.or(nt.rule_prec).unwrap_or(0),
                    associativity: alt.assoc.unwrap_or_default(),
                    dynamic_precedence: alt.dynamic.unwrap_or(0),
                };
                if seen.insert(format!("{:?}", production.children)) {
                    productions.push(production);
                }
            }
        }

        let owner: Vec<SymbolId> = (0..symbols.len())
            .map(|id| match id.checked_sub(terminal_count) {
                Some(nt) if nt < nonterminal_count => {
                    (terminal_count + self.nonterminals[nt].owner) as SymbolId
                }
                _ => id as SymbolId,
            })
            .collect();

        let grammar = self.grammar;
        let word = grammar.word.as_deref().and_then(|name| match self.names.get(name) {
            Some(&Sym::Terminal(id)) => Some(id as SymbolId),
            _ => {
                self.diagnostics
                    .report(
                        DiagnosticKind::InvalidWord,
                        format!("word `{name}` must name a token rule"),
                    )
                    .rule(name)
                    .emit();
                None
            }
        });

        let mut recovery = Vec::new();
        for name in &grammar.recovery {
            let by_rule = match self.names.get(name.as_str()) {
                Some(&Sym::Terminal(id)) => Some(id),
                _ => None,
            };
            let by_text = || {
                self.terminals
                    .iter()
                    .position(|t| t.def.spec == TokenSpec::Literal(name.clone()))
            };
            match by_rule.or_else(by_text) {
                Some(id) => recovery.push(id as SymbolId),
                None => self
                    .diagnostics
                    .report(
                        DiagnosticKind::UnknownRecoverySymbol,
                        format!("recovery symbol `{name}` is not a token of this grammar"),
                    )
                    .emit(),
            }
        }

        let mut conflicts = Vec::new();
        for set in &grammar.conflicts {
            let mut ids = Vec::new();
            for name in set {
                match self.names.get(name.as_str()) {
                    Some(&Sym::NonTerminal(nt)) => ids.push(id_of(Sym::NonTerminal(nt))),
                    _ => self
                        .diagnostics
                        .report(
                            DiagnosticKind::UnknownConflictSymbol,
                            format!("conflict entry `{name}` is not a rule"),
                        )
                        .emit(),
                }
            }
            ids.sort_unstable();
            conflicts.push(ids);
        }

        let lowered = LoweredGrammar {
            name: grammar.name.clone(),
            symbols,
            terminal_count,
            nonterminal_count,
            external_count: grammar.externals.len(),
            fields,
            productions,
            start: terminal_count as SymbolId,
            tokens: self.terminals.iter().map(|t| t.def.clone()).collect(),
            padding,
            extras: extras.into_iter().map(|id| id as SymbolId).collect(),
            word,
            recovery,
            conflicts,
            owner,
        };
        check_productive(&lowered, self.diagnostics);
        lowered
    }
}

/// Every nonterminal must derive at least one terminal string.
fn check_productive(grammar: &LoweredGrammar, diagnostics: &mut Diagnostics) {
    let terminals = grammar.terminal_count;
    let mut productive = vec![false; grammar.nonterminal_count];
    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            let lhs = production.lhs as usize - terminals;
            if productive[lhs] {
                continue;
            }
            let ok = production.children.iter().all(|c| {
                let id = c.symbol as usize;
                id < terminals || productive[id - terminals]
            });
            if ok {
                productive[lhs] = true;
                changed = true;
            }
        }
    }

    let mut reported = HashSet::new();
    for (nt, ok) in productive.iter().enumerate() {
        if *ok {
            continue;
        }
        let owner = grammar.owner[terminals + nt];
        if reported.insert(owner) {
            let name = grammar.name(owner);
            diagnostics
                .report(
                    DiagnosticKind::UnproductiveRule,
                    format!("rule `{name}` can never finish matching"),
                )
                .rule(name)
                .emit();
        }
    }
}

fn external_names(grammar: &Grammar) -> impl Iterator<Item = &str> {
    grammar.externals.iter().filter_map(|rule| match rule {
        Rule::Symbol(name) => Some(name.as_str()),
        _ => None,
    })
}

/// Token body of a rule that lexes as a single terminal.
fn token_body(rule: &Rule) -> Option<(&Rule, bool)> {
    match rule {
        Rule::String(_) | Rule::Pattern { .. } => Some((rule, false)),
        Rule::Token(inner) => Some((inner, false)),
        Rule::ImmediateToken(inner) => Some((inner, true)),
        Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. }
        | Rule::Reserved { content, .. } => token_body(content),
        _ => None,
    }
}

/// Rule names referenced outside token bodies.
fn collect_refs<'r>(rule: &'r Rule, out: &mut Vec<&'r str>) {
    match rule {
        Rule::Symbol(name) => out.push(name),
        Rule::Blank | Rule::String(_) | Rule::Pattern { .. } => {}
        Rule::Token(_) | Rule::ImmediateToken(_) => {}
        Rule::Seq(members) | Rule::Choice(members) => {
            for member in members {
                collect_refs(member, out);
            }
        }
        Rule::Repeat(inner) | Rule::Repeat1(inner) => collect_refs(inner, out),
        Rule::Field { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. }
        | Rule::Reserved { content, .. } => collect_refs(content, out),
    }
}
