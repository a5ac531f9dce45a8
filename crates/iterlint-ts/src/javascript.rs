//! JavaScript front-end using Tree-sitter.
//!
//! Recognised constructs:
//!
//! - `for (let i = 0; i < xs.length; i++)`, also with `i <= xs.length - 1`
//!   and `i += 1` / `i = i + 1` / `++i` updates (indexed loop)
//! - `.forEach(cb)`, `.map(cb)`, `.filter(cb)`, `.reduce(cb, seed)`
//!
//! Every other node is lowered structurally so that identifier references
//! stay visible to the engine.

use iterlint_core::{
    BinOp, ConstructKind, Dialect, Frontend, LineIndex, Node, NodeKind, ParseError, Span,
};
use tracing::debug;
use tree_sitter::{Language, Node as TsNode, Parser};

const LANGUAGE_ID: &str = "javascript";

/// Lowers JavaScript source through `tree-sitter-javascript`.
pub struct JavaScriptFrontend {
    language: Language,
}

impl JavaScriptFrontend {
    /// Creates a new JavaScript front-end.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

impl Default for JavaScriptFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JavaScriptFrontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaScriptFrontend").finish_non_exhaustive()
    }
}

impl Frontend for JavaScriptFrontend {
    fn language_id(&self) -> &'static str {
        LANGUAGE_ID
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".js", ".mjs", ".cjs", ".jsx"]
    }

    fn dialect(&self) -> Dialect {
        Dialect::JavaScript
    }

    fn parse(&self, source: &str) -> Result<Node, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| parse_error(1, 1, e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| parse_error(1, 1, "parser produced no tree".to_string()))?;
        let root = tree.root_node();
        let lowerer = Lowerer {
            source,
            lines: LineIndex::new(source),
        };

        if root.has_error() {
            if let Some(bad) = first_error(root) {
                let (line, column) = lowerer.position(bad);
                let message = if bad.is_missing() {
                    format!("missing `{}`", bad.kind())
                } else {
                    format!("unexpected `{}`", lowerer.snippet(bad))
                };
                debug!(line, column, "JavaScript parse error");
                return Err(parse_error(line, column, message));
            }
        }

        Ok(lowerer.block(root))
    }
}

fn parse_error(line: usize, column: usize, message: String) -> ParseError {
    ParseError {
        language: LANGUAGE_ID,
        line,
        column,
        message,
    }
}

/// First error or missing node in document order.
fn first_error(root: TsNode<'_>) -> Option<TsNode<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

/// Named children that are not comments.
fn named(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}

fn construct_for(method: &str) -> Option<ConstructKind> {
    match method {
        "forEach" => Some(ConstructKind::ForEach),
        "map" => Some(ConstructKind::Map),
        "filter" => Some(ConstructKind::Filter),
        "reduce" => Some(ConstructKind::Reduce),
        _ => None,
    }
}

struct Lowerer<'s> {
    source: &'s str,
    lines: LineIndex,
}

impl Lowerer<'_> {
    fn text(&self, node: TsNode<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    fn snippet(&self, node: TsNode<'_>) -> String {
        let text = self.text(node).trim();
        match text.lines().next() {
            Some(first) if !first.is_empty() => first.chars().take(20).collect(),
            _ => node.kind().to_string(),
        }
    }

    fn position(&self, node: TsNode<'_>) -> (usize, usize) {
        self.lines.position(self.source, node.start_byte())
    }

    fn span(&self, node: TsNode<'_>) -> Span {
        let (line, column) = self.position(node);
        Span::new(line, column).with_range(node.start_byte(), node.end_byte() - node.start_byte())
    }

    fn node(&self, kind: NodeKind, at: TsNode<'_>) -> Node {
        Node::new(kind, self.span(at))
    }

    fn boxed(&self, node: TsNode<'_>) -> Box<Node> {
        Box::new(self.expr(node))
    }

    fn field(&self, node: TsNode<'_>, name: &str) -> Box<Node> {
        match node.child_by_field_name(name) {
            Some(child) => self.boxed(child),
            None => Box::new(self.node(NodeKind::Opaque, node)),
        }
    }

    fn exprs<'n>(&self, nodes: impl IntoIterator<Item = TsNode<'n>>) -> Vec<Node> {
        nodes.into_iter().map(|n| self.expr(n)).collect()
    }

    fn block(&self, node: TsNode<'_>) -> Node {
        let mut stmts = Vec::new();
        for child in named(node) {
            self.stmt(child, &mut stmts);
        }
        self.node(NodeKind::Block(stmts), node)
    }

    /// Lowers a statement position; non-block statements become one-element blocks.
    fn body(&self, node: TsNode<'_>) -> Node {
        if node.kind() == "statement_block" {
            return self.block(node);
        }
        let mut stmts = Vec::new();
        self.stmt(node, &mut stmts);
        self.node(NodeKind::Block(stmts), node)
    }

    fn stmt(&self, node: TsNode<'_>, out: &mut Vec<Node>) {
        match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                for declarator in named(node) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let name = declarator
                        .child_by_field_name("name")
                        .filter(|n| n.kind() == "identifier")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    let init = declarator.child_by_field_name("value").map(|v| self.boxed(v));
                    out.push(self.node(NodeKind::Let { name, init }, declarator));
                }
            }
            "expression_statement" => {
                let kind = match named(node).first() {
                    Some(expr) => NodeKind::ExprStmt(self.boxed(*expr)),
                    None => NodeKind::Other(Vec::new()),
                };
                out.push(self.node(kind, node));
            }
            "empty_statement" => {}
            _ => out.push(self.expr(node)),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn expr(&self, node: TsNode<'_>) -> Node {
        let kind = match node.kind() {
            "statement_block" | "program" => return self.block(node),
            "parenthesized_expression" => match named(node).first() {
                Some(inner) => return self.expr(*inner),
                None => NodeKind::Opaque,
            },
            "expression_statement" => match named(node).first() {
                Some(inner) => NodeKind::ExprStmt(self.boxed(*inner)),
                None => NodeKind::Other(Vec::new()),
            },
            "if_statement" => NodeKind::If {
                test: self.field(node, "condition"),
                consequent: Box::new(match node.child_by_field_name("consequence") {
                    Some(c) => self.body(c),
                    None => self.node(NodeKind::Opaque, node),
                }),
                alternate: node
                    .child_by_field_name("alternative")
                    .map(|alt| match named(alt).first() {
                        Some(stmt) => Box::new(self.body(*stmt)),
                        None => Box::new(self.node(NodeKind::Block(Vec::new()), alt)),
                    }),
            },
            "return_statement" => {
                NodeKind::Return(named(node).first().map(|value| self.boxed(*value)))
            }
            "for_statement" => return self.for_statement(node),
            "call_expression" => return self.call(node),
            "member_expression" => NodeKind::Member {
                object: self.field(node, "object"),
                property: node
                    .child_by_field_name("property")
                    .map(|p| self.text(p).to_string())
                    .unwrap_or_default(),
            },
            "subscript_expression" => NodeKind::Index {
                object: self.field(node, "object"),
                index: self.field(node, "index"),
            },
            "binary_expression" => NodeKind::Binary {
                op: node
                    .child_by_field_name("operator")
                    .map_or(BinOp::Other, |op| BinOp::from_symbol(op.kind())),
                lhs: self.field(node, "left"),
                rhs: self.field(node, "right"),
            },
            "assignment_expression" => NodeKind::Assign {
                op: None,
                target: self.field(node, "left"),
                value: self.field(node, "right"),
            },
            "augmented_assignment_expression" => NodeKind::Assign {
                op: Some(
                    node.child_by_field_name("operator")
                        .map_or(BinOp::Other, |op| {
                            BinOp::from_symbol(op.kind().trim_end_matches('='))
                        }),
                ),
                target: self.field(node, "left"),
                value: self.field(node, "right"),
            },
            "update_expression" => NodeKind::Update {
                target: self.field(node, "argument"),
                increment: node
                    .child_by_field_name("operator")
                    .is_some_and(|op| op.kind() == "++"),
            },
            "arrow_function" => {
                let params = match node.child_by_field_name("parameter") {
                    Some(single) => vec![self.text(single).to_string()],
                    None => self.params(node),
                };
                NodeKind::Lambda {
                    params,
                    body: self.field(node, "body"),
                }
            }
            "function_expression" | "function" | "function_declaration"
            | "generator_function" | "generator_function_declaration" | "method_definition" => {
                NodeKind::Lambda {
                    params: self.params(node),
                    body: self.field(node, "body"),
                }
            }
            "array" => NodeKind::Array(self.exprs(named(node))),
            "identifier" | "shorthand_property_identifier" | "this" => {
                NodeKind::Ident(self.text(node).to_string())
            }
            "number" => NodeKind::Number(self.text(node).to_string()),
            "string" => NodeKind::Str(self.text(node).to_string()),
            "lexical_declaration" | "variable_declaration" => {
                let mut lets = Vec::new();
                self.stmt(node, &mut lets);
                NodeKind::Other(lets)
            }
            _ => NodeKind::Other(self.exprs(named(node))),
        };
        self.node(kind, node)
    }

    fn params(&self, function: TsNode<'_>) -> Vec<String> {
        let Some(params) = function.child_by_field_name("parameters") else {
            return Vec::new();
        };
        named(params)
            .into_iter()
            .map(|p| {
                let name = match p.kind() {
                    "assignment_pattern" => p.child_by_field_name("left"),
                    _ => Some(p),
                };
                name.filter(|n| n.kind() == "identifier")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn call(&self, node: TsNode<'_>) -> Node {
        let mut args = node
            .child_by_field_name("arguments")
            .map(|a| self.exprs(named(a)))
            .unwrap_or_default();
        let Some(function) = node.child_by_field_name("function") else {
            return self.node(NodeKind::Opaque, node);
        };

        if function.kind() != "member_expression" {
            return self.node(
                NodeKind::Call {
                    callee: self.boxed(function),
                    args,
                },
                node,
            );
        }

        let receiver = self.field(function, "object");
        let Some(property) = function.child_by_field_name("property") else {
            return self.node(NodeKind::Opaque, node);
        };
        let method = self.text(property).to_string();

        match construct_for(&method) {
            Some(construct) => {
                let callback = (!args.is_empty()).then(|| Box::new(args.remove(0)));
                self.node(
                    NodeKind::Iteration {
                        construct,
                        receiver,
                        callback,
                        args,
                    },
                    property,
                )
            }
            None => self.node(
                NodeKind::MethodCall {
                    receiver,
                    method,
                    args,
                },
                node,
            ),
        }
    }

    fn for_statement(&self, node: TsNode<'_>) -> Node {
        let body = match node.child_by_field_name("body") {
            Some(b) => self.body(b),
            None => self.node(NodeKind::Block(Vec::new()), node),
        };

        if let Some((index, sequence)) = self.indexed_header(node) {
            return self.node(
                NodeKind::IndexedLoop {
                    index,
                    sequence: self.boxed(sequence),
                    body: Box::new(body),
                },
                node,
            );
        }

        let mut children: Vec<Node> = ["initializer", "condition", "increment"]
            .into_iter()
            .filter_map(|f| node.child_by_field_name(f))
            .map(|c| self.expr(c))
            .collect();
        children.push(body);
        self.node(NodeKind::Other(children), node)
    }

    /// Matches `let i = 0; i < X.length; i++` and returns `(i, X)`.
    fn indexed_header<'t>(&self, node: TsNode<'t>) -> Option<(String, TsNode<'t>)> {
        let index = self.zero_initialised(node.child_by_field_name("initializer")?)?;
        let sequence = self.length_bound(&index, node.child_by_field_name("condition")?)?;
        self.is_step(&index, node.child_by_field_name("increment")?)
            .then_some((index, sequence))
    }

    fn zero_initialised(&self, init: TsNode<'_>) -> Option<String> {
        let (name, value) = match init.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let declarators = named(init);
                let [declarator] = declarators.as_slice() else {
                    return None;
                };
                (
                    declarator.child_by_field_name("name")?,
                    declarator.child_by_field_name("value")?,
                )
            }
            "expression_statement" => return self.zero_initialised(*named(init).first()?),
            "assignment_expression" => (
                init.child_by_field_name("left")?,
                init.child_by_field_name("right")?,
            ),
            _ => return None,
        };
        (name.kind() == "identifier" && value.kind() == "number" && self.text(value) == "0")
            .then(|| self.text(name).to_string())
    }

    fn length_bound<'t>(&self, index: &str, condition: TsNode<'t>) -> Option<TsNode<'t>> {
        let condition = match condition.kind() {
            "expression_statement" => *named(condition).first()?,
            _ => condition,
        };
        if condition.kind() != "binary_expression" {
            return None;
        }
        let left = condition.child_by_field_name("left")?;
        let right = condition.child_by_field_name("right")?;
        if left.kind() != "identifier" || self.text(left) != index {
            return None;
        }
        match condition.child_by_field_name("operator")?.kind() {
            "<" => self.length_of(right),
            "<=" => {
                let minus_one = right.kind() == "binary_expression"
                    && right.child_by_field_name("operator").map(|o| o.kind()) == Some("-")
                    && right
                        .child_by_field_name("right")
                        .is_some_and(|r| r.kind() == "number" && self.text(r) == "1");
                if minus_one {
                    self.length_of(right.child_by_field_name("left")?)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// `X.length` → `X`.
    fn length_of<'t>(&self, node: TsNode<'t>) -> Option<TsNode<'t>> {
        if node.kind() != "member_expression" {
            return None;
        }
        let property = node.child_by_field_name("property")?;
        (self.text(property) == "length")
            .then(|| node.child_by_field_name("object"))
            .flatten()
    }

    fn is_step(&self, index: &str, update: TsNode<'_>) -> bool {
        let is_index = |n: Option<TsNode<'_>>| {
            n.is_some_and(|n| n.kind() == "identifier" && self.text(n) == index)
        };
        let is_one = |n: Option<TsNode<'_>>| {
            n.is_some_and(|n| n.kind() == "number" && self.text(n) == "1")
        };
        match update.kind() {
            "update_expression" => {
                self.text(update).contains("++") && is_index(update.child_by_field_name("argument"))
            }
            "augmented_assignment_expression" => {
                update.child_by_field_name("operator").map(|o| o.kind()) == Some("+=")
                    && is_index(update.child_by_field_name("left"))
                    && is_one(update.child_by_field_name("right"))
            }
            "assignment_expression" => {
                let Some(sum) = update.child_by_field_name("right") else {
                    return false;
                };
                is_index(update.child_by_field_name("left"))
                    && sum.kind() == "binary_expression"
                    && sum.child_by_field_name("operator").map(|o| o.kind()) == Some("+")
                    && is_index(sum.child_by_field_name("left"))
                    && is_one(sum.child_by_field_name("right"))
            }
            _ => false,
        }
    }
}
