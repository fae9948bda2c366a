use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use thicket_core::{Grammar, Rule};

/// `name = number;` statements, `;` resynchronizes.
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
        .extra(Rule::pattern(r"\s"))
        .recovery(";")
}

/// Writes fixture files into a temporary directory.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn grammar(&self, grammar: &Grammar) -> PathBuf {
        self.write("grammar.json", grammar.to_json())
    }
}
