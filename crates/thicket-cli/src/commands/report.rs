//! Syntax error rendering.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use thicket_runtime::{Node, Tree};

/// Render every ERROR node of `tree` as a snippet of its source.
pub fn render_errors(tree: &Tree, origin: &str, colored: bool) -> String {
    let renderer = if colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    };

    let mut out = String::new();
    for node in tree.errors() {
        let (title, label) = describe(node);
        let snippet = Snippet::source(tree.source())
            .line_start(1)
            .path(origin)
            .annotation(AnnotationKind::Primary.span(node.byte_range()).label(&label));
        let report = vec![Level::ERROR.primary_title(&title).element(snippet)];
        out.push_str(&renderer.render(&report));
        out.push('\n');
    }
    out
}

/// One-line summary, for when there is nothing to point at.
pub fn summary(tree: &Tree) -> String {
    match tree.errors().len() {
        0 => "no syntax errors".to_string(),
        1 => "1 syntax error".to_string(),
        n => format!("{n} syntax errors"),
    }
}

fn describe(node: Node<'_>) -> (String, String) {
    if let Some(kind) = node.missing_kind() {
        return (format!("missing {kind}"), format!("expected {kind} here"));
    }
    let start = node.start_point();
    let title = format!(
        "unexpected input at {}:{}",
        start.row + 1,
        start.column + 1
    );
    let label = match node.byte_range().len() {
        1 => "1 byte skipped".to_string(),
        n => format!("{n} bytes skipped"),
    };
    (title, label)
}
