//! Fixture grammars and helpers shared by the runtime tests.

use thicket_core::{Edit, Grammar, Rule};

use crate::{Language, Parser, Tree};

pub fn language(grammar: &Grammar) -> Language {
    let compiled = thicket_compiler::compile(grammar).expect("fixture grammar compiles");
    Language::load(&compiled.bytes).expect("compiled table loads")
}

pub fn parser(grammar: &Grammar) -> Parser {
    Parser::new(&language(grammar)).expect("fixture has no externals")
}

pub fn parse(grammar: &Grammar, text: &str) -> Tree {
    parser(grammar).parse(text).expect("parse succeeds")
}

pub fn sexp(grammar: &Grammar, text: &str) -> String {
    parse(grammar, text).to_sexp()
}

/// Apply `edit` to `text`, replacing the old range with `inserted`.
pub fn apply(text: &str, edit: &Edit, inserted: &str) -> String {
    assert_eq!(edit.new_len(), inserted.len());
    let mut out = String::with_capacity(text.len() + inserted.len());
    out.push_str(&text[..edit.byte_start]);
    out.push_str(inserted);
    out.push_str(&text[edit.old_end..]);
    out
}

/// Leaf spans start at 0, touch each other, and leave only padding after.
pub fn assert_full_coverage(tree: &Tree) {
    let spans = tree.leaf_spans();
    let mut end = 0;
    for span in &spans {
        assert_eq!(span.start, end, "gap or overlap before {span:?} in {spans:?}");
        end = span.end;
    }
    let len = tree.source().len();
    assert!(end <= len, "leaves run past the end: {end} > {len}");
    assert!(
        tree.source()[end..].trim().is_empty(),
        "uncovered text {:?}",
        &tree.source()[end..]
    );
    assert_eq!(tree.root_node().byte_range(), 0..len);
}

/// `stmt := "if" expr "then" stmt | "pass"`.
pub fn ifs() -> Grammar {
    Grammar::new("ifs")
        .rule(
            "stmt",
            Rule::choice([
                Rule::seq([
                    Rule::string("if"),
                    Rule::symbol("expr"),
                    Rule::string("then"),
                    Rule::symbol("stmt"),
                ]),
                Rule::string("pass"),
            ]),
        )
        .rule("expr", Rule::pattern("[0-9]+"))
        .extra(Rule::pattern(r"\s"))
}

/// `name = number;` statements with `;` as the recovery symbol.
pub fn assignments() -> Grammar {
    Grammar::new("assign")
        .rule("program", Rule::repeat(Rule::symbol("statement")))
        .rule(
            "statement",
            Rule::seq([
                Rule::field("name", Rule::symbol("identifier")),
                Rule::string("="),
                Rule::field("value", Rule::symbol("number")),
                Rule::string(";"),
            ]),
        )
        .rule("identifier", Rule::pattern("[a-z]+"))
        .rule("number", Rule::pattern(r"\d+"))
        .rule("comment", Rule::pattern("#[^\n]*"))
        .extra(Rule::pattern(r"\s"))
        .extra(Rule::symbol("comment"))
        .recovery(";")
}

/// Arithmetic through a hidden `_expression` rule, with comments.
pub fn arithmetic() -> Grammar {
    let binary = |op: &str| {
        Rule::seq([
            Rule::field("left", Rule::symbol("_expression")),
            Rule::string(op),
            Rule::field("right", Rule::symbol("_expression")),
        ])
    };
    Grammar::new("arithmetic")
        .rule("program", Rule::symbol("_expression"))
        .rule(
            "_expression",
            Rule::choice([
                Rule::symbol("sum"),
                Rule::symbol("product"),
                Rule::symbol("parens"),
                Rule::symbol("number"),
            ]),
        )
        .rule("sum", Rule::prec_left(1, binary("+")))
        .rule("product", Rule::prec_left(2, binary("*")))
        .rule(
            "parens",
            Rule::seq([Rule::string("("), Rule::symbol("_expression"), Rule::string(")")]),
        )
        .rule("number", Rule::pattern(r"\d+"))
        .rule("comment", Rule::pattern("#[^\n]*"))
        .extra(Rule::pattern(r"\s"))
        .extra(Rule::symbol("comment"))
}

/// Ambiguous `if`/`else`, left to the runtime.
pub fn dangling_else() -> Grammar {
    Grammar::new("dangling")
        .rule(
            "stmt",
            Rule::choice([
                Rule::seq([Rule::string("if"), Rule::symbol("cond"), Rule::symbol("stmt")]),
                Rule::seq([
                    Rule::string("if"),
                    Rule::symbol("cond"),
                    Rule::symbol("stmt"),
                    Rule::string("else"),
                    Rule::symbol("stmt"),
                ]),
                Rule::string("x"),
            ]),
        )
        .rule("cond", Rule::pattern("c"))
        .extra(Rule::pattern(r"\s"))
        .conflict(["stmt"])
}

/// `x` derives either `a` or `b`; `weight` is `b`'s dynamic precedence.
pub fn either(weight: i32) -> Grammar {
    let x = || Rule::seq([Rule::string("x")]);
    Grammar::new("either")
        .rule("s", Rule::choice([Rule::symbol("a"), Rule::symbol("b")]))
        .rule("a", x())
        .rule("b", Rule::prec_dynamic(weight, x()))
        .conflict(["a", "b"])
}

/// Keywords lexed through the `identifier` word token.
pub fn keywords() -> Grammar {
    Grammar::new("keywords")
        .rule("program", Rule::repeat(Rule::symbol("statement")))
        .rule(
            "statement",
            Rule::choice([
                Rule::seq([
                    Rule::string("let"),
                    Rule::field("name", Rule::symbol("identifier")),
                    Rule::string("="),
                    Rule::field("value", Rule::symbol("identifier")),
                    Rule::string(";"),
                ]),
                Rule::seq([Rule::symbol("identifier"), Rule::string(";")]),
            ]),
        )
        .rule("identifier", Rule::pattern("[a-z]+"))
        .word("identifier")
        .extra(Rule::pattern(r"\s"))
}

/// One line per node: field, kind, byte range. Anonymous kinds are quoted.
pub fn outline(tree: &Tree) -> String {
    let mut out = String::new();
    let mut cursor = tree.root_node().walk();
    let mut depth = 0;
    loop {
        let node = cursor.node();
        let field = cursor.field_name().map(|f| format!("{f}: ")).unwrap_or_default();
        let kind = if node.is_named() {
            node.kind().to_string()
        } else {
            format!("{:?}", node.kind())
        };
        let missing = if node.is_missing() { " MISSING" } else { "" };
        let range = node.byte_range();
        out.push_str(&format!(
            "{}{field}{kind} {}..{}{missing}\n",
            "  ".repeat(depth),
            range.start,
            range.end
        ));

        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return out;
            }
            depth -= 1;
        }
    }
}
