//! Green subtrees.
//!
//! Subtrees store relative sizes only, so a subtree can be shared between an
//! old tree and a tree reparsed after an edit without adjusting offsets.
//! Every subtree covers `padding + size` bytes: the padding before its first
//! token, then its content.

use std::sync::Arc;

use thicket_core::{ProductionId, SYMBOL_ERROR, StateId, SymbolId};

use crate::lexer::Token;

#[derive(Debug)]
pub(crate) struct Subtree {
    pub symbol: SymbolId,
    pub padding: usize,
    pub size: usize,
    /// Bytes past the end examined while building this subtree.
    pub lookahead_bytes: usize,
    pub children: Vec<Arc<Subtree>>,
    pub production: Option<ProductionId>,
    pub extra: bool,
    /// Symbol a zero-width ERROR node stands for.
    pub missing: Option<SymbolId>,
    /// ERROR nodes in this subtree, itself included.
    pub error_count: u32,
    pub dynamic_precedence: i32,
    /// Built while the parser was forked, at a conflict or recovering from
    /// an error; never reused.
    pub fragile: bool,
    /// Parse state the first token was shifted in.
    pub parse_state: Option<StateId>,
    /// Parse state the token after this subtree was lexed in.
    pub lex_after: Option<StateId>,
}

/// Absolute context for building an internal subtree.
pub(crate) struct Span {
    /// Absolute start of the first child's padding.
    pub start: usize,
    /// Furthest byte the lexer examined when this subtree was built.
    pub lookahead_end: usize,
}

impl Subtree {
    pub fn total(&self) -> usize {
        self.padding + self.size
    }

    pub fn is_error(&self) -> bool {
        self.symbol == SYMBOL_ERROR
    }

    /// A token consumed by the parser.
    pub fn leaf(
        token: &Token,
        extra: bool,
        fragile: bool,
        parse_state: StateId,
        lex_after: StateId,
    ) -> Arc<Self> {
        Arc::new(Self {
            symbol: token.symbol,
            padding: token.padding(),
            size: token.len(),
            lookahead_bytes: token.lookahead_end.saturating_sub(token.end),
            children: Vec::new(),
            production: None,
            extra,
            missing: None,
            error_count: 0,
            dynamic_precedence: 0,
            fragile,
            parse_state: Some(parse_state),
            lex_after: Some(lex_after),
        })
    }

    /// Zero-width ERROR node standing for `symbol`, placed before `token`.
    /// It takes over the token's padding.
    pub fn missing(symbol: SymbolId, token: &Token) -> Arc<Self> {
        Arc::new(Self {
            symbol: SYMBOL_ERROR,
            padding: token.padding(),
            size: 0,
            lookahead_bytes: token.lookahead_end.saturating_sub(token.start),
            children: Vec::new(),
            production: None,
            extra: false,
            missing: Some(symbol),
            error_count: 1,
            dynamic_precedence: 0,
            fragile: true,
            parse_state: None,
            lex_after: None,
        })
    }

    /// Internal node over `children`.
    pub fn node(
        symbol: SymbolId,
        production: Option<ProductionId>,
        children: Vec<Arc<Subtree>>,
        span: Span,
        dynamic_precedence: i32,
        fragile: bool,
        parse_state: Option<StateId>,
    ) -> Arc<Self> {
        let padding = children.first().map_or(0, |c| c.padding);
        let total: usize = children.iter().map(|c| c.total()).sum();
        let end = span.start + total;

        let mut lookahead_end = span.lookahead_end;
        let mut offset = span.start;
        for child in &children {
            offset += child.total();
            lookahead_end = lookahead_end.max(offset + child.lookahead_bytes);
        }

        let error_count = children.iter().map(|c| c.error_count).sum::<u32>()
            + u32::from(symbol == SYMBOL_ERROR);
        let dynamic_precedence =
            dynamic_precedence + children.iter().map(|c| c.dynamic_precedence).sum::<i32>();
        let fragile = fragile || children.iter().any(|c| c.fragile);
        let parse_state = parse_state.filter(|_| children.first().is_some_and(|c| c.size > 0));
        let lex_after = children
            .iter()
            .rev()
            .find(|c| c.size > 0)
            .and_then(|c| c.lex_after);

        Arc::new(Self {
            symbol,
            padding,
            size: total - padding,
            lookahead_bytes: lookahead_end.saturating_sub(end),
            children,
            production,
            extra: false,
            missing: None,
            error_count,
            dynamic_precedence,
            fragile,
            parse_state,
            lex_after,
        })
    }

    /// ERROR node over skipped or popped subtrees.
    pub fn error(children: Vec<Arc<Subtree>>, span: Span, extra: bool) -> Arc<Self> {
        let mut node = Self::node(SYMBOL_ERROR, None, children, span, 0, true, None);
        if let Some(inner) = Arc::get_mut(&mut node) {
            inner.extra = extra;
        }
        node
    }

    /// Copy of this node with extra subtrees around its children.
    pub fn with_extras(
        self: &Arc<Self>,
        leading: Vec<Arc<Subtree>>,
        trailing: Vec<Arc<Subtree>>,
        span: Span,
    ) -> Arc<Self> {
        if leading.is_empty() && trailing.is_empty() {
            return Arc::clone(self);
        }
        let children: Vec<Arc<Subtree>> = leading
            .into_iter()
            .chain(self.children.iter().cloned())
            .chain(trailing)
            .collect();
        let own_dynamic = self.dynamic_precedence
            - self.children.iter().map(|c| c.dynamic_precedence).sum::<i32>();
        Self::node(
            self.symbol,
            self.production,
            children,
            span,
            own_dynamic,
            self.fragile,
            self.parse_state,
        )
    }

    /// Leftmost leaf, descending through first children.
    pub fn first_leaf(&self) -> &Subtree {
        let mut node = self;
        while let Some(first) = node.children.first() {
            node = first;
        }
        node
    }

    /// Padding-extended byte ranges of every leaf, in order.
    pub fn leaf_spans(&self, out: &mut Vec<std::ops::Range<usize>>) {
        let mut stack: Vec<(&Subtree, usize)> = vec![(self, 0)];
        while let Some((node, start)) = stack.pop() {
            if node.children.is_empty() {
                if node.total() > 0 {
                    out.push(start..start + node.total());
                }
                continue;
            }
            let mut offset = start + node.total();
            for child in node.children.iter().rev() {
                offset -= child.total();
                stack.push((child, offset));
            }
        }
    }
}
