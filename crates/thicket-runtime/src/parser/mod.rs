//! Parser entry points.

mod glr;
mod recover;

#[cfg(test)]
mod parser_tests;

use std::fmt;
use std::sync::Arc;

use thicket_core::Edit;

use crate::cancel::Cancellation;
use crate::error::ParseError;
use crate::incremental::ReuseCursor;
use crate::language::Language;
use crate::options::ParseOptions;
use crate::trace::{NoopTracer, Tracer};
use crate::tree::Tree;

use glr::Engine;

/// Parses text with one [`Language`].
///
/// A parser holds no per-parse state; one instance can run any number of
/// parses, sequentially or from several threads.
#[derive(Clone)]
pub struct Parser {
    language: Language,
    options: ParseOptions,
    cancellation: Option<Arc<dyn Cancellation>>,
}

impl Parser {
    /// Fails when the grammar declares external tokens and the language has
    /// no scanner.
    pub fn new(language: &Language) -> Result<Self, ParseError> {
        if language.table().external_count() > 0 && language.scanner().is_none() {
            return Err(ParseError::MissingScanner(language.name().to_string()));
        }
        Ok(Self {
            language: language.clone(),
            options: ParseOptions::default(),
            cancellation: None,
        })
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Poll `cancellation` before every token.
    pub fn cancellation(mut self, cancellation: impl Cancellation + 'static) -> Self {
        self.cancellation = Some(Arc::new(cancellation));
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `text` from scratch.
    pub fn parse(&self, text: &str) -> Result<Tree, ParseError> {
        self.parse_with(text, None, &mut NoopTracer)
    }

    /// Parse `text`, the result of applying `edit` to `old`'s source,
    /// reusing what the edit left intact.
    pub fn reparse(&self, old: &Tree, edit: &Edit, text: &str) -> Result<Tree, ParseError> {
        self.parse_with(text, Some((old, edit)), &mut NoopTracer)
    }

    /// Full control: optional old tree and a tracer.
    pub fn parse_with<T: Tracer>(
        &self,
        text: &str,
        old: Option<(&Tree, &Edit)>,
        tracer: &mut T,
    ) -> Result<Tree, ParseError> {
        let reuse = match old {
            Some((tree, edit)) => {
                let old_len = tree.source().len();
                if edit.new_text_len(old_len) != Some(text.len()) {
                    return Err(ParseError::EditConflict {
                        edit: *edit,
                        old_len,
                        new_len: text.len(),
                    });
                }
                Some(ReuseCursor::new(Arc::clone(tree.green()), *edit))
            }
            None => None,
        };

        let engine = Engine::new(
            &self.language,
            &self.options,
            self.cancellation.as_deref(),
            text,
            reuse,
            tracer,
        );
        let (root, stats) = engine.run()?;
        Ok(Tree::build(self.language.clone(), text, root, stats))
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language)
            .field("options", &self.options)
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}
