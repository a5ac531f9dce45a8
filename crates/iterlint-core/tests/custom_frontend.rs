//! Plugging a hand-written front-end into the engine.

use iterlint_core::{
    Analyzer, Category, ConstructKind, Dialect, Finding, Frontend, IndexUse, IterationNode,
    Matcher, Node, NodeKind, ParseError, Span,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// One construct per line: `<map|each> <receiver> [uses-index] [keep]`.
struct LineFrontend;

impl Frontend for LineFrontend {
    fn language_id(&self) -> &'static str {
        "lines"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".lines"]
    }

    fn dialect(&self) -> Dialect {
        Dialect::JavaScript
    }

    fn parse(&self, source: &str) -> Result<Node, ParseError> {
        let mut stmts = Vec::new();
        for (i, line) in source.lines().enumerate() {
            let words: Vec<&str> = line.split_whitespace().collect();
            let [verb, receiver, flags @ ..] = words.as_slice() else {
                continue;
            };
            let construct = match *verb {
                "map" => ConstructKind::Map,
                "each" => ConstructKind::ForEach,
                other => {
                    return Err(ParseError {
                        language: "lines",
                        line: i + 1,
                        column: 1,
                        message: format!("unknown verb `{other}`"),
                    })
                }
            };
            let body = if flags.contains(&"uses-index") {
                NodeKind::Ident("i".to_string())
            } else {
                NodeKind::Ident("x".to_string())
            };
            let iteration = Node::new(
                NodeKind::Iteration {
                    construct,
                    receiver: Box::new(Node::synthetic(NodeKind::Ident((*receiver).to_string()))),
                    callback: Some(Box::new(Node::synthetic(NodeKind::Lambda {
                        params: vec!["x".to_string(), "i".to_string()],
                        body: Box::new(Node::synthetic(body)),
                    }))),
                    args: Vec::new(),
                },
                Span::new(i + 1, 1),
            );
            let stmt = if flags.contains(&"keep") {
                NodeKind::Let {
                    name: "kept".to_string(),
                    init: Some(Box::new(iteration)),
                }
            } else {
                NodeKind::ExprStmt(Box::new(iteration))
            };
            stmts.push(Node::new(stmt, Span::new(i + 1, 1)));
        }
        Ok(Node::new(NodeKind::Block(stmts), Span::new(1, 1)))
    }
}

/// Flags discarded maps whose callback ignores the index.
struct DiscardedMap;

impl Matcher for DiscardedMap {
    fn category(&self) -> Category {
        Category::MapForSideEffectOnly
    }

    fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
        let flagged = node.construct == ConstructKind::Map
            && !node.result_used
            && node.index_use == IndexUse::Unreferenced;
        flagged.then(|| Finding::at(node, self.category(), "discarded map", "forEach"))
    }
}

fn run(files: &[(&str, &str)]) -> iterlint_core::LintResult {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    Analyzer::builder()
        .root(dir.path())
        .frontend(LineFrontend)
        .matcher(DiscardedMap)
        .build()
        .unwrap()
        .analyze()
        .unwrap()
}

#[test]
fn findings_follow_the_custom_tree() {
    let result = run(&[(
        "a.lines",
        "map xs\nmap ys uses-index\nmap zs keep\neach ws\nmap vs\n",
    )]);
    let lines: Vec<usize> = result.findings.iter().map(|f| f.location.line).collect();
    assert_eq!(lines, vec![1, 5]);
    assert_eq!(result.findings[0].location.file, PathBuf::from("a.lines"));
}

#[test]
fn parse_failures_are_per_file() {
    let result = run(&[("bad.lines", "zip xs\n"), ("good.lines", "map xs\n")]);
    assert_eq!(result.files_checked, 1);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].message.contains("unknown verb `zip`"));
}

#[test]
fn unhandled_extensions_are_not_discovered() {
    let result = run(&[("a.lines", "map xs\n"), ("notes.txt", "map xs\n")]);
    assert_eq!(result.files_checked, 1);
}
