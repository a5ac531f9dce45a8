//! Generic expression tree shared by every front-end.
//!
//! Front-ends lower their concrete syntax into [`Node`]s. Iteration
//! constructs are tagged explicitly ([`NodeKind::IndexedLoop`] and
//! [`NodeKind::Iteration`]) so the engine never inspects method names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source span of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in the source.
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Span {
    /// Creates a span at the given line and column.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length.
    #[must_use]
    pub fn with_range(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// The iteration constructs the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructKind {
    /// `for (let i = 0; i < xs.length; i++)` / `for i in 0..xs.len()`.
    IndexedLoop,
    /// `forEach` / `for_each`.
    ForEach,
    /// `map`.
    Map,
    /// `filter`.
    Filter,
    /// `reduce` / `fold`.
    Reduce,
}

impl ConstructKind {
    /// Language-neutral identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IndexedLoop => "indexedLoop",
            Self::ForEach => "forEach",
            Self::Map => "map",
            Self::Filter => "filter",
            Self::Reduce => "reduce",
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary operators, normalised across languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Other,
}

impl BinOp {
    /// Maps an operator token (`+`, `===`, `&&`, ...) to a [`BinOp`].
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            "&&" => Self::And,
            "||" => Self::Or,
            "==" | "===" => Self::Eq,
            "!=" | "!==" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            _ => Self::Other,
        }
    }

    /// Whether `(a op b) op c == a op (b op c)`.
    #[must_use]
    pub fn is_associative(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::BitAnd | Self::BitOr | Self::BitXor | Self::And | Self::Or
        )
    }
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,
    /// Where it came from.
    pub span: Span,
}

/// Tagged node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Statement list (program, function body, block).
    Block(Vec<Node>),
    /// `let name = init`.
    Let {
        /// Bound name; empty for destructuring patterns.
        name: String,
        /// Initialiser.
        init: Option<Box<Node>>,
    },
    /// Expression evaluated for its effect; the value is discarded.
    ExprStmt(Box<Node>),
    /// Conditional.
    If {
        /// Condition.
        test: Box<Node>,
        /// Taken branch.
        consequent: Box<Node>,
        /// `else` branch.
        alternate: Option<Box<Node>>,
    },
    /// `return value`.
    Return(Option<Box<Node>>),
    /// Counting loop over the indices of `sequence`.
    IndexedLoop {
        /// Index variable.
        index: String,
        /// Sequence whose length bounds the loop.
        sequence: Box<Node>,
        /// Loop body.
        body: Box<Node>,
    },
    /// Call to an iteration method.
    Iteration {
        /// Which construct.
        construct: ConstructKind,
        /// Sequence the method is called on.
        receiver: Box<Node>,
        /// The per-element callback.
        callback: Option<Box<Node>>,
        /// Remaining arguments (e.g. the initial value of a reduce).
        args: Vec<Node>,
    },
    /// Closure / arrow function.
    Lambda {
        /// One entry per parameter; empty for destructuring patterns.
        params: Vec<String>,
        /// Expression or block body.
        body: Box<Node>,
    },
    /// Free function call.
    Call {
        /// Called expression.
        callee: Box<Node>,
        /// Arguments.
        args: Vec<Node>,
    },
    /// Method call that is not an iteration construct.
    MethodCall {
        /// Receiver.
        receiver: Box<Node>,
        /// Method name.
        method: String,
        /// Arguments.
        args: Vec<Node>,
    },
    /// Variable or path reference.
    Ident(String),
    /// Numeric literal.
    Number(String),
    /// String literal.
    Str(String),
    /// Array / vector literal; empty means a fresh collection.
    Array(Vec<Node>),
    /// `object.property`.
    Member {
        /// Accessed object.
        object: Box<Node>,
        /// Property name.
        property: String,
    },
    /// `object[index]`.
    Index {
        /// Indexed object.
        object: Box<Node>,
        /// Index expression.
        index: Box<Node>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Node>,
        /// Right operand.
        rhs: Box<Node>,
    },
    /// `target = value` or `target op= value`.
    Assign {
        /// Compound operator, `None` for plain assignment.
        op: Option<BinOp>,
        /// Assigned place.
        target: Box<Node>,
        /// Assigned value.
        value: Box<Node>,
    },
    /// `target++` / `--target`.
    Update {
        /// Updated place.
        target: Box<Node>,
        /// `++` rather than `--`.
        increment: bool,
    },
    /// Syntax the front-end could not lower. May reference anything.
    Opaque,
    /// Any other construct; children are still traversed.
    Other(Vec<Node>),
}

impl Node {
    /// Creates a node.
    #[must_use]
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Creates a node without source position.
    #[must_use]
    pub fn synthetic(kind: NodeKind) -> Self {
        Self::new(kind, Span::default())
    }

    /// Returns the identifier name if this is an [`NodeKind::Ident`].
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this node is the identifier `name`.
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        self.as_ident() == Some(name)
    }

    /// Whether this node is an empty collection literal.
    #[must_use]
    pub fn is_fresh_collection(&self) -> bool {
        matches!(&self.kind, NodeKind::Array(items) if items.is_empty())
    }

    /// Statements of a block, or the node itself for expression bodies.
    #[must_use]
    pub fn statements(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Block(stmts) => stmts,
            _ => std::slice::from_ref(self),
        }
    }

    /// Strips an [`NodeKind::ExprStmt`] wrapper.
    #[must_use]
    pub fn unwrap_stmt(&self) -> &Node {
        match &self.kind {
            NodeKind::ExprStmt(expr) => expr,
            _ => self,
        }
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Block(nodes) | NodeKind::Array(nodes) | NodeKind::Other(nodes) => {
                nodes.iter().collect()
            }
            NodeKind::Let { init, .. } => init.as_deref().into_iter().collect(),
            NodeKind::ExprStmt(expr) => vec![expr.as_ref()],
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let mut children = vec![test.as_ref(), consequent.as_ref()];
                children.extend(alternate.as_deref());
                children
            }
            NodeKind::Return(value) => value.as_deref().into_iter().collect(),
            NodeKind::IndexedLoop { sequence, body, .. } => vec![sequence.as_ref(), body.as_ref()],
            NodeKind::Iteration {
                receiver,
                callback,
                args,
                ..
            } => {
                let mut children = vec![receiver.as_ref()];
                children.extend(callback.as_deref());
                children.extend(args.iter());
                children
            }
            NodeKind::Lambda { body, .. } => vec![body.as_ref()],
            NodeKind::Call { callee, args } => {
                std::iter::once(callee.as_ref()).chain(args.iter()).collect()
            }
            NodeKind::MethodCall { receiver, args, .. } => {
                std::iter::once(receiver.as_ref()).chain(args.iter()).collect()
            }
            NodeKind::Member { object, .. } => vec![object.as_ref()],
            NodeKind::Index { object, index } => vec![object.as_ref(), index.as_ref()],
            NodeKind::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            NodeKind::Assign { target, value, .. } => vec![target.as_ref(), value.as_ref()],
            NodeKind::Update { target, .. } => vec![target.as_ref()],
            NodeKind::Ident(_) | NodeKind::Number(_) | NodeKind::Str(_) | NodeKind::Opaque => {
                Vec::new()
            }
        }
    }

    /// Pre-order iterator over this node and everything below it.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Whether `name` is read or written anywhere below this node.
    ///
    /// Opaque nodes count as a reference.
    #[must_use]
    pub fn references(&self, name: &str) -> bool {
        self.descendants()
            .any(|n| n.is_ident(name) || matches!(n.kind, NodeKind::Opaque))
    }

    /// Whether evaluating this node can have an observable effect.
    #[must_use]
    pub fn has_side_effect(&self) -> bool {
        self.descendants().any(|n| {
            matches!(
                n.kind,
                NodeKind::Assign { .. }
                    | NodeKind::Update { .. }
                    | NodeKind::Call { .. }
                    | NodeKind::MethodCall { .. }
                    | NodeKind::Iteration { .. }
                    | NodeKind::Opaque
            )
        })
    }

    /// Structural equality that ignores spans.
    ///
    /// Only plain data expressions compare equal; anything containing a
    /// lambda, statement, or opaque node never does.
    #[must_use]
    pub fn same_shape(&self, other: &Node) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Ident(a), NodeKind::Ident(b))
            | (NodeKind::Number(a), NodeKind::Number(b))
            | (NodeKind::Str(a), NodeKind::Str(b)) => a == b,
            (
                NodeKind::Member {
                    object: a,
                    property: pa,
                },
                NodeKind::Member {
                    object: b,
                    property: pb,
                },
            ) => pa == pb && a.same_shape(b),
            (
                NodeKind::Index {
                    object: a,
                    index: ia,
                },
                NodeKind::Index {
                    object: b,
                    index: ib,
                },
            ) => a.same_shape(b) && ia.same_shape(ib),
            (
                NodeKind::MethodCall {
                    receiver: a,
                    method: ma,
                    args: xs,
                },
                NodeKind::MethodCall {
                    receiver: b,
                    method: mb,
                    args: ys,
                },
            ) => ma == mb && a.same_shape(b) && all_same_shape(xs, ys),
            (
                NodeKind::Call {
                    callee: a,
                    args: xs,
                },
                NodeKind::Call {
                    callee: b,
                    args: ys,
                },
            ) => a.same_shape(b) && all_same_shape(xs, ys),
            _ => false,
        }
    }
}

fn all_same_shape(xs: &[Node], ys: &[Node]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.same_shape(y))
}

/// Pre-order iterator returned by [`Node::descendants`].
#[derive(Debug)]
pub struct Descendants<'t> {
    stack: Vec<&'t Node>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = &'t Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::synthetic(NodeKind::Ident(name.into()))
    }

    fn member(object: Node, property: &str) -> Node {
        Node::synthetic(NodeKind::Member {
            object: Box::new(object),
            property: property.into(),
        })
    }

    #[test]
    fn same_shape_ignores_spans() {
        let a = member(ident("employees"), "list");
        let mut b = member(ident("employees"), "list");
        b.span = Span::new(7, 3);
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&member(ident("managers"), "list")));
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = Node::synthetic(NodeKind::Binary {
            op: BinOp::Add,
            lhs: Box::new(ident("a")),
            rhs: Box::new(member(ident("b"), "c")),
        });
        let names: Vec<&str> = tree.descendants().filter_map(Node::as_ident).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn opaque_counts_as_reference() {
        let tree = Node::synthetic(NodeKind::Other(vec![Node::synthetic(NodeKind::Opaque)]));
        assert!(tree.references("i"));
        assert!(tree.has_side_effect());
    }

    #[test]
    fn statements_of_expression_body_is_itself() {
        let body = ident("x");
        assert_eq!(body.statements().len(), 1);
        let block = Node::synthetic(NodeKind::Block(vec![ident("a"), ident("b")]));
        assert_eq!(block.statements().len(), 2);
    }

    #[test]
    fn associative_operators() {
        assert!(BinOp::from_symbol("+").is_associative());
        assert!(BinOp::from_symbol("||").is_associative());
        assert!(!BinOp::from_symbol("-").is_associative());
        assert_eq!(BinOp::from_symbol("==="), BinOp::Eq);
    }
}
