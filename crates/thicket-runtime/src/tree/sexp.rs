//! S-expression rendering.
//!
//! Named nodes only; anonymous tokens are left out unless the node being
//! rendered is itself anonymous. Fields prefix the child they label, and
//! recovery placeholders print as `(MISSING kind)`.
//!
//! ```text
//! (sum left: (number) right: (product left: (number) right: (number)))
//! ```

use super::node::Node;

pub(super) fn write(node: Node<'_>, out: &mut String) {
    out.push('(');
    if let Some(kind) = node.missing_kind() {
        out.push_str("MISSING ");
        out.push_str(kind);
    } else if node.is_named() {
        out.push_str(node.kind());
    } else {
        out.push('"');
        out.push_str(node.kind());
        out.push('"');
    }
    for child in node.named_children() {
        out.push(' ');
        if let Some(field) = child.field_name() {
            out.push_str(field);
            out.push_str(": ");
        }
        write(child, out);
    }
    out.push(')');
}
