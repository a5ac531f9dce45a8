//! Traversal engine: finds iteration constructs in a tree.
//!
//! [`Traversal::iter`] walks the tree in pre-order with an explicit stack
//! and yields one [`IterationNode`] per indexed loop or iteration call.
//! Each node carries the facts the matchers need (result usage, index
//! usage, guarded side effects, the preceding statement), computed once
//! here so matchers stay pure functions of the node.

use crate::frontend::Dialect;
use crate::tree::{ConstructKind, Node, NodeKind, Span};
use crate::types::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and running scans.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A node claims to be an iteration construct but lacks its expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {construct} at {line}:{column}: {reason}")]
pub struct MalformedTreeError {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Construct the node claimed to be.
    pub construct: ConstructKind,
    /// What is missing.
    pub reason: String,
}

impl MalformedTreeError {
    fn new(node: &Node, construct: ConstructKind, reason: impl Into<String>) -> Self {
        Self {
            line: node.span.line,
            column: node.span.column,
            construct,
            reason: reason.into(),
        }
    }
}

/// How a construct's body uses the element index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexUse {
    /// Never mentioned.
    Unreferenced,
    /// Only as `sequence[index]`, to read the current element.
    SubscriptOnly,
    /// Any other use (arithmetic, other sequences, writes, unknown code).
    Other,
}

/// The per-element code of a construct.
#[derive(Debug, Clone, Copy)]
pub enum Callback<'t> {
    /// Inline lambda or loop body.
    Inline {
        /// Parameter names; for an indexed loop, the index variable.
        params: &'t [String],
        /// Body expression or block.
        body: &'t Node,
    },
    /// Named function or any other expression; its body is not visible.
    Reference(&'t Node),
}

/// One occurrence of an iteration construct, borrowed from the tree.
#[derive(Debug, Clone)]
pub struct IterationNode<'t> {
    /// Which construct.
    pub construct: ConstructKind,
    /// Position of the construct.
    pub span: Span,
    /// File the tree came from, relative to the scan root.
    pub file: &'t Path,
    /// The tree node itself.
    pub node: &'t Node,
    /// Sequence iterated over (method receiver, or the loop's sequence).
    pub receiver: &'t Node,
    /// Per-element code.
    pub callback: Callback<'t>,
    /// Arguments other than the callback (e.g. a reduce seed).
    pub extra_args: &'t [Node],
    /// Whether the construct's value is assigned, passed, returned or chained.
    pub result_used: bool,
    /// How the index is used.
    pub index_use: IndexUse,
    /// Whether the body is a single `if` without `else` guarding a side effect.
    pub guarded_side_effect: bool,
    /// Statement immediately before the one containing this construct.
    pub preceding: Option<&'t Node>,
    /// Number of enclosing construct bodies; 0 = top-level.
    pub depth: usize,
    /// Vocabulary of the source language.
    pub dialect: Dialect,
}

impl<'t> IterationNode<'t> {
    /// Location for findings.
    #[must_use]
    pub fn location(&self) -> Location {
        Location::from_span(self.file.to_path_buf(), self.span)
    }

    /// Inline body, if the callback is a lambda or loop body.
    #[must_use]
    pub fn body(&self) -> Option<&'t Node> {
        match self.callback {
            Callback::Inline { body, .. } => Some(body),
            Callback::Reference(_) => None,
        }
    }

    /// Name of this construct in the source language.
    #[must_use]
    pub fn construct_name(&self) -> &'static str {
        self.dialect.construct_name(self.construct)
    }

    /// Line where the expression holding this construct starts.
    ///
    /// For a call chain split over several lines this is the line of the
    /// chain's base receiver, above the construct's own line.
    #[must_use]
    pub fn start_line(&self) -> usize {
        let mut base = self.receiver;
        loop {
            base = match &base.kind {
                NodeKind::Iteration { receiver, .. } | NodeKind::MethodCall { receiver, .. } => {
                    receiver
                }
                NodeKind::Member { object, .. } | NodeKind::Index { object, .. } => object,
                NodeKind::Call { callee, .. } => callee,
                _ => break,
            };
        }
        match base.span.line {
            0 => self.span.line,
            line => line.min(self.span.line),
        }
    }
}

/// A restartable traversal over one tree.
#[derive(Debug, Clone)]
pub struct Traversal<'t> {
    root: &'t Node,
    file: &'t Path,
    dialect: Dialect,
    cancel: Option<CancelToken>,
}

impl<'t> Traversal<'t> {
    /// Creates a traversal of `root`.
    #[must_use]
    pub fn new(root: &'t Node) -> Self {
        Self {
            root,
            file: Path::new(""),
            dialect: Dialect::default(),
            cancel: None,
        }
    }

    /// Sets the file path reported in locations.
    #[must_use]
    pub fn file(mut self, file: &'t Path) -> Self {
        self.file = file;
        self
    }

    /// Sets the source vocabulary.
    #[must_use]
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets a cancellation token, checked before each top-level construct.
    #[must_use]
    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Starts a fresh pass from the root.
    #[must_use]
    pub fn iter(&self) -> IterationNodes<'t> {
        IterationNodes {
            stack: vec![Frame {
                node: self.root,
                used: false,
                preceding: None,
                depth: 0,
            }],
            file: self.file,
            dialect: self.dialect,
            cancel: self.cancel.clone(),
            cancelled: false,
        }
    }
}

impl<'a, 't> IntoIterator for &'a Traversal<'t> {
    type Item = Result<IterationNode<'t>, MalformedTreeError>;
    type IntoIter = IterationNodes<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame<'t> {
    node: &'t Node,
    used: bool,
    preceding: Option<&'t Node>,
    depth: usize,
}

/// Lazy pre-order iterator returned by [`Traversal::iter`].
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug)]
pub struct IterationNodes<'t> {
    stack: Vec<Frame<'t>>,
    file: &'t Path,
    dialect: Dialect,
    cancel: Option<CancelToken>,
    cancelled: bool,
}

impl<'t> IterationNodes<'t> {
    /// Whether the pass stopped early because of cancellation.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    fn push_children(&mut self, frame: Frame<'t>) {
        let start = self.stack.len();
        let plain = |node: &'t Node| Frame {
            node,
            used: true,
            preceding: None,
            depth: frame.depth,
        };
        match &frame.node.kind {
            NodeKind::Block(stmts) => {
                for (i, stmt) in stmts.iter().enumerate() {
                    self.stack.push(Frame {
                        preceding: i.checked_sub(1).and_then(|p| stmts.get(p)),
                        ..plain(stmt)
                    });
                }
            }
            NodeKind::ExprStmt(expr) => self.stack.push(Frame {
                used: false,
                preceding: frame.preceding,
                ..plain(expr)
            }),
            NodeKind::Iteration {
                receiver,
                callback,
                args,
                ..
            } => {
                self.stack.push(plain(receiver));
                if let Some(callback) = callback {
                    self.stack.push(Frame {
                        depth: frame.depth + 1,
                        ..plain(callback)
                    });
                }
                self.stack.extend(args.iter().map(plain));
            }
            NodeKind::IndexedLoop { sequence, body, .. } => {
                self.stack.push(plain(sequence));
                self.stack.push(Frame {
                    depth: frame.depth + 1,
                    ..plain(body)
                });
            }
            _ => self.stack.extend(frame.node.children().into_iter().map(plain)),
        }
        self.stack[start..].reverse();
    }

    fn build(&self, frame: Frame<'t>) -> Result<Option<IterationNode<'t>>, MalformedTreeError> {
        let node = frame.node;
        let (construct, receiver, callback, extra_args, index_use) = match &node.kind {
            NodeKind::IndexedLoop {
                index,
                sequence,
                body,
            } => {
                if index.is_empty() {
                    return Err(MalformedTreeError::new(
                        node,
                        ConstructKind::IndexedLoop,
                        "indexed loop has no index variable",
                    ));
                }
                let callback = Callback::Inline {
                    params: std::slice::from_ref(index),
                    body,
                };
                let index_use = loop_index_use(index, sequence, body);
                let no_args: &'t [Node] = &[];
                (
                    ConstructKind::IndexedLoop,
                    sequence.as_ref(),
                    callback,
                    no_args,
                    index_use,
                )
            }
            NodeKind::Iteration {
                construct,
                receiver,
                callback,
                args,
            } => {
                if *construct == ConstructKind::IndexedLoop {
                    return Err(MalformedTreeError::new(
                        node,
                        *construct,
                        "iteration call cannot be an indexed loop",
                    ));
                }
                let Some(callback) = callback.as_deref() else {
                    return Err(MalformedTreeError::new(
                        node,
                        *construct,
                        format!(
                            "{}() call has no callback argument",
                            self.dialect.construct_name(*construct)
                        ),
                    ));
                };
                let callback = match &callback.kind {
                    NodeKind::Lambda { params, body } => Callback::Inline { params, body },
                    _ => Callback::Reference(callback),
                };
                let index_use = self.callback_index_use(*construct, callback);
                (*construct, receiver.as_ref(), callback, args.as_slice(), index_use)
            }
            _ => return Ok(None),
        };

        let guarded_side_effect = match callback {
            Callback::Inline { body, .. } => is_guarded_side_effect(body),
            Callback::Reference(_) => false,
        };

        Ok(Some(IterationNode {
            construct,
            span: node.span,
            file: self.file,
            node,
            receiver,
            callback,
            extra_args,
            result_used: frame.used,
            index_use,
            guarded_side_effect,
            preceding: frame.preceding,
            depth: frame.depth,
            dialect: self.dialect,
        }))
    }

    fn callback_index_use(&self, construct: ConstructKind, callback: Callback<'_>) -> IndexUse {
        match callback {
            Callback::Inline { params, body } => {
                let index = self
                    .dialect
                    .index_param(construct)
                    .and_then(|p| params.get(p))
                    .filter(|name| !name.is_empty());
                match index {
                    Some(name) if body.references(name) => IndexUse::Other,
                    _ => IndexUse::Unreferenced,
                }
            }
            Callback::Reference(_) => IndexUse::Other,
        }
    }
}

impl<'t> Iterator for IterationNodes<'t> {
    type Item = Result<IterationNode<'t>, MalformedTreeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            self.push_children(frame);
            match self.build(frame) {
                Ok(None) => {}
                Ok(Some(node)) => {
                    let cancelled = node.depth == 0
                        && self.cancel.as_ref().is_some_and(CancelToken::is_cancelled);
                    if cancelled {
                        tracing::debug!(file = %self.file.display(), "traversal cancelled");
                        self.cancelled = true;
                        self.stack.clear();
                        return None;
                    }
                    return Some(Ok(node));
                }
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

fn is_element_of(node: &Node, index: &str, sequence: &Node) -> bool {
    matches!(
        &node.kind,
        NodeKind::Index { object, index: i } if i.is_ident(index) && object.same_shape(sequence)
    )
}

fn loop_index_use(index: &str, sequence: &Node, body: &Node) -> IndexUse {
    let mut found = IndexUse::Unreferenced;
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        match &node.kind {
            NodeKind::Opaque => return IndexUse::Other,
            NodeKind::Ident(name) if name == index => return IndexUse::Other,
            NodeKind::Assign { target, .. } | NodeKind::Update { target, .. }
                if is_element_of(target, index, sequence) =>
            {
                return IndexUse::Other;
            }
            NodeKind::Index { object, .. } if is_element_of(node, index, sequence) => {
                found = IndexUse::SubscriptOnly;
                stack.push(object);
            }
            NodeKind::Lambda { params, .. } if params.iter().any(|p| p == index) => {}
            _ => stack.extend(node.children()),
        }
    }
    found
}

fn is_guarded_side_effect(body: &Node) -> bool {
    match body.statements() {
        [only] => matches!(
            &only.unwrap_stmt().kind,
            NodeKind::If { consequent, alternate: None, .. } if consequent.has_side_effect()
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{Frontend, RustFrontend};

    fn parse(src: &str) -> Node {
        RustFrontend::new().parse(src).unwrap()
    }

    fn collect(root: &Node) -> Vec<IterationNode<'_>> {
        Traversal::new(root)
            .dialect(Dialect::Rust)
            .iter()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn pre_order_outer_before_inner() {
        let root = parse(
            "fn f() { xs.iter().for_each(|x| { x.items.iter().map(|y| y.save()); }); }",
        );
        let nodes = collect(&root);
        let kinds: Vec<_> = nodes.iter().map(|n| (n.construct, n.depth)).collect();
        assert_eq!(
            kinds,
            vec![(ConstructKind::ForEach, 0), (ConstructKind::Map, 1)]
        );
        assert!(!nodes[1].result_used);
    }

    #[test]
    fn result_usage() {
        let root = parse(
            "fn f() { let a = xs.iter().map(g); xs.iter().map(g); xs.iter().map(g).count(); }",
        );
        let used: Vec<bool> = collect(&root).iter().map(|n| n.result_used).collect();
        assert_eq!(used, vec![true, false, true]);
    }

    #[test]
    fn chained_receiver_is_used() {
        let root = parse("fn f() { xs.iter().filter(p).for_each(g); }");
        let nodes = collect(&root);
        assert_eq!(nodes[0].construct, ConstructKind::ForEach);
        assert!(!nodes[0].result_used);
        assert_eq!(nodes[1].construct, ConstructKind::Filter);
        assert!(nodes[1].result_used);
    }

    #[test]
    fn preceding_statement() {
        let root = parse(
            "fn f() { let mut names = Vec::new(); xs.iter().for_each(|x| names.push(x)); }",
        );
        let nodes = collect(&root);
        let Some(Node {
            kind: NodeKind::Let { name, .. },
            ..
        }) = nodes[0].preceding
        else {
            panic!("expected preceding let");
        };
        assert_eq!(name, "names");
    }

    #[test]
    fn chain_start_line() {
        let root = parse(
            "fn f() {\n    xs\n        .iter()\n        .filter(p)\n        .for_each(g);\n}",
        );
        let lines: Vec<_> = collect(&root)
            .iter()
            .map(|n| (n.construct, n.span.line, n.start_line()))
            .collect();
        assert_eq!(
            lines,
            vec![(ConstructKind::ForEach, 5, 2), (ConstructKind::Filter, 4, 2)]
        );

        let root = parse("fn f() { xs.iter().map(g); }");
        let node = &collect(&root)[0];
        assert_eq!(node.start_line(), node.span.line);
    }

    #[test]
    fn loop_index_usage() {
        let cases = [
            ("for i in 0..xs.len() { xs[i].save(); }", IndexUse::SubscriptOnly),
            ("for i in 0..xs.len() { save(); }", IndexUse::Unreferenced),
            ("for i in 0..xs.len() { ys[i].save(); }", IndexUse::Other),
            ("for i in 0..xs.len() { println!(\"{}\", i); }", IndexUse::Other),
            ("for i in 0..xs.len() { xs[i] = 0; }", IndexUse::Other),
            ("for i in 0..xs.len() { xs[i + 1].save(); }", IndexUse::Other),
            ("for i in 0..xs.len() { xs[i].each(|i| i.save()); }", IndexUse::SubscriptOnly),
        ];
        for (body, expected) in cases {
            let root = parse(&format!("fn f() {{ {body} }}"));
            let nodes = collect(&root);
            assert_eq!(nodes[0].index_use, expected, "{body}");
        }
    }

    #[test]
    fn guarded_side_effect_detection() {
        let root = parse(
            "fn f() {
                xs.iter().for_each(|x| { if x.ok { out.push(x); } });
                xs.iter().for_each(|x| { if x.ok { out.push(x); } else { log(x); } });
                xs.iter().for_each(|x| { if x.ok { } });
            }",
        );
        let guarded: Vec<bool> = collect(&root).iter().map(|n| n.guarded_side_effect).collect();
        assert_eq!(guarded, vec![true, false, false]);
    }

    #[test]
    fn restartable_and_deterministic() {
        let root = parse("fn f() { xs.iter().map(g); for i in 0..xs.len() { xs[i].go(); } }");
        let traversal = Traversal::new(&root);
        let first: Vec<_> = traversal.iter().map(|n| n.unwrap().span).collect();
        let second: Vec<_> = (&traversal).into_iter().map(|n| n.unwrap().span).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_callback_is_malformed() {
        let root = Node::synthetic(NodeKind::Block(vec![
            Node::new(
                NodeKind::Iteration {
                    construct: ConstructKind::Map,
                    receiver: Box::new(Node::synthetic(NodeKind::Ident("xs".into()))),
                    callback: None,
                    args: Vec::new(),
                },
                Span::new(3, 4),
            ),
            Node::synthetic(NodeKind::Iteration {
                construct: ConstructKind::Map,
                receiver: Box::new(Node::synthetic(NodeKind::Ident("xs".into()))),
                callback: Some(Box::new(Node::synthetic(NodeKind::Ident("f".into())))),
                args: Vec::new(),
            }),
        ]));
        let traversal = Traversal::new(&root);
        let mut nodes = traversal.iter();
        let err = nodes.next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "malformed map at 3:4: map() call has no callback argument");
        assert!(nodes.next().is_none());
    }

    #[test]
    fn empty_index_is_malformed() {
        let root = Node::synthetic(NodeKind::IndexedLoop {
            index: String::new(),
            sequence: Box::new(Node::synthetic(NodeKind::Ident("xs".into()))),
            body: Box::new(Node::synthetic(NodeKind::Block(Vec::new()))),
        });
        let result: Result<Vec<_>, _> = Traversal::new(&root).iter().collect();
        assert_eq!(result.unwrap_err().construct, ConstructKind::IndexedLoop);
    }

    #[test]
    fn cancellation_between_top_level_nodes() {
        let root = parse(
            "fn f() { xs.iter().for_each(|x| x.ys.iter().map(g).count()); xs.iter().map(g); }",
        );
        let token = CancelToken::new();
        let traversal = Traversal::new(&root).cancel(token.clone());
        let mut nodes = traversal.iter();
        assert_eq!(nodes.next().unwrap().unwrap().construct, ConstructKind::ForEach);
        token.cancel();
        // nested constructs of the current top-level node still come through
        assert_eq!(nodes.next().unwrap().unwrap().construct, ConstructKind::Map);
        assert!(nodes.next().is_none());
        assert!(nodes.was_cancelled());
    }
}
