//! Builder-pattern printer for rendering grammar diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use super::Diagnostics;
use super::message::Severity;

/// Renders diagnostics, with snippets when the grammar JSON is available.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }

            let span = match (self.source, diag.rule.as_deref()) {
                (Some(source), Some(rule)) => rule_span(source, rule).map(|span| (source, span)),
                _ => None,
            };

            let Some((source, span)) = span else {
                writeln!(w, "{diag}")?;
                continue;
            };

            let label = format!("rule `{}`", diag.rule.as_deref().unwrap_or_default());
            let mut snippet = Snippet::source(source)
                .line_start(1)
                .annotation(AnnotationKind::Primary.span(span).label(&label));
            if let Some(p) = self.path {
                snippet = snippet.path(p);
            }

            let level = match diag.severity() {
                Severity::Error => Level::ERROR,
                Severity::Warning => Level::WARNING,
            };
            let report = vec![level.primary_title(&diag.message).element(snippet)];
            writeln!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }
}

/// Byte range of the `"rule":` key in grammar JSON.
fn rule_span(source: &str, rule: &str) -> Option<std::ops::Range<usize>> {
    let needle = format!("\"{rule}\"");
    let mut from = 0;
    while let Some(found) = source[from..].find(&needle) {
        let start = from + found;
        let end = start + needle.len();
        if source[end..].trim_start().starts_with(':') {
            return Some(start..end);
        }
        from = end;
    }
    None
}
