//! Rust front-end built on `syn`.
//!
//! Recognised constructs:
//!
//! - `for i in 0..xs.len()` and `for i in 0..=xs.len() - 1` (indexed loop)
//! - `.for_each(f)`, `.map(f)`, `.filter(f)`, `.reduce(f)`, `.fold(init, f)`
//!
//! Function bodies, impl and trait methods, inline modules and constant
//! initialisers are lowered; everything else is ignored.

use super::{Dialect, Frontend, ParseError};
use crate::context::LineIndex;
use crate::tree::{BinOp, ConstructKind, Node, NodeKind, Span};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, ImplItem, Item, Lit, Pat, RangeLimits, Stmt, TraitItem};

/// Lowers Rust source through `syn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustFrontend;

impl RustFrontend {
    /// Creates a new Rust front-end.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for RustFrontend {
    fn language_id(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".rs"]
    }

    fn dialect(&self) -> Dialect {
        Dialect::Rust
    }

    fn parse(&self, source: &str) -> Result<Node, ParseError> {
        let file = syn::parse_file(source).map_err(|e| {
            let start = e.span().start();
            ParseError {
                language: "rust",
                line: start.line.max(1),
                column: start.column + 1,
                message: e.to_string(),
            }
        })?;

        let lowerer = Lowerer {
            source,
            lines: LineIndex::new(source),
        };
        let mut items = Vec::new();
        for item in &file.items {
            lowerer.item(item, &mut items);
        }
        Ok(Node::new(NodeKind::Block(items), Span::new(1, 1)))
    }
}

struct Lowerer<'s> {
    source: &'s str,
    lines: LineIndex,
}

impl Lowerer<'_> {
    fn span(&self, span: proc_macro2::Span) -> Span {
        let start = span.start();
        let end = span.end();
        let offset = self.lines.offset(self.source, start.line, start.column + 1);
        let end_offset = self.lines.offset(self.source, end.line, end.column + 1);
        Span::new(start.line, start.column + 1)
            .with_range(offset, end_offset.saturating_sub(offset))
    }

    fn node(&self, kind: NodeKind, span: proc_macro2::Span) -> Node {
        Node::new(kind, self.span(span))
    }

    fn item(&self, item: &Item, out: &mut Vec<Node>) {
        match item {
            Item::Fn(f) => out.push(self.block(&f.block)),
            Item::Impl(imp) => {
                for it in &imp.items {
                    if let ImplItem::Fn(f) = it {
                        out.push(self.block(&f.block));
                    }
                }
            }
            Item::Trait(tr) => {
                for it in &tr.items {
                    if let TraitItem::Fn(f) = it {
                        if let Some(body) = &f.default {
                            out.push(self.block(body));
                        }
                    }
                }
            }
            Item::Mod(m) => {
                if let Some((_, items)) = &m.content {
                    for it in items {
                        self.item(it, out);
                    }
                }
            }
            Item::Const(c) => out.push(self.expr(&c.expr)),
            Item::Static(s) => out.push(self.expr(&s.expr)),
            _ => {}
        }
    }

    fn block(&self, block: &syn::Block) -> Node {
        let mut stmts = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            match stmt {
                Stmt::Local(local) => stmts.push(self.node(
                    NodeKind::Let {
                        name: pat_name(&local.pat),
                        init: local.init.as_ref().map(|i| Box::new(self.expr(&i.expr))),
                    },
                    local.span(),
                )),
                Stmt::Item(item) => self.item(item, &mut stmts),
                Stmt::Expr(expr, semi) => {
                    let lowered = self.expr(expr);
                    if semi.is_some() {
                        stmts.push(self.node(NodeKind::ExprStmt(Box::new(lowered)), stmt.span()));
                    } else {
                        stmts.push(lowered);
                    }
                }
                Stmt::Macro(m) => {
                    let lowered = self.mac(&m.mac);
                    stmts.push(self.node(NodeKind::ExprStmt(Box::new(lowered)), m.span()));
                }
            }
        }
        self.node(NodeKind::Block(stmts), block.span())
    }

    fn exprs<'a>(&self, exprs: impl IntoIterator<Item = &'a Expr>) -> Vec<Node> {
        exprs.into_iter().map(|e| self.expr(e)).collect()
    }

    fn boxed(&self, expr: &Expr) -> Box<Node> {
        Box::new(self.expr(expr))
    }

    #[allow(clippy::too_many_lines)]
    fn expr(&self, expr: &Expr) -> Node {
        let kind = match expr {
            Expr::MethodCall(m) => return self.method_call(m),
            Expr::Call(c) => {
                if is_fresh_collection_ctor(&c.func) {
                    NodeKind::Array(Vec::new())
                } else {
                    NodeKind::Call {
                        callee: self.boxed(&c.func),
                        args: self.exprs(&c.args),
                    }
                }
            }
            Expr::Path(p) => NodeKind::Ident(path_string(&p.path)),
            Expr::Lit(l) => match &l.lit {
                Lit::Int(i) => NodeKind::Number(i.base10_digits().to_string()),
                Lit::Float(f) => NodeKind::Number(f.base10_digits().to_string()),
                Lit::Str(s) => NodeKind::Str(s.value()),
                _ => NodeKind::Other(Vec::new()),
            },
            Expr::Field(f) => NodeKind::Member {
                object: self.boxed(&f.base),
                property: match &f.member {
                    syn::Member::Named(ident) => ident.to_string(),
                    syn::Member::Unnamed(index) => index.index.to_string(),
                },
            },
            Expr::Index(i) => NodeKind::Index {
                object: self.boxed(&i.expr),
                index: self.boxed(&i.index),
            },
            Expr::Binary(b) => {
                let lhs = self.boxed(&b.left);
                let rhs = self.boxed(&b.right);
                match bin_op(b.op) {
                    (op, false) => NodeKind::Binary { op, lhs, rhs },
                    (op, true) => NodeKind::Assign {
                        op: Some(op),
                        target: lhs,
                        value: rhs,
                    },
                }
            }
            Expr::Assign(a) => NodeKind::Assign {
                op: None,
                target: self.boxed(&a.left),
                value: self.boxed(&a.right),
            },
            Expr::Unary(u) => match u.op {
                syn::UnOp::Deref(_) => return self.expr(&u.expr),
                _ => NodeKind::Other(vec![self.expr(&u.expr)]),
            },
            Expr::Paren(p) => return self.expr(&p.expr),
            Expr::Group(g) => return self.expr(&g.expr),
            Expr::Reference(r) => return self.expr(&r.expr),
            Expr::Try(t) => return self.expr(&t.expr),
            Expr::Await(a) => return self.expr(&a.base),
            Expr::Cast(c) => return self.expr(&c.expr),
            Expr::Block(b) => return self.block(&b.block),
            Expr::Unsafe(u) => return self.block(&u.block),
            Expr::Async(a) => return self.block(&a.block),
            Expr::If(i) => NodeKind::If {
                test: self.boxed(&i.cond),
                consequent: Box::new(self.block(&i.then_branch)),
                alternate: i.else_branch.as_ref().map(|(_, e)| self.boxed(e)),
            },
            Expr::Let(l) => NodeKind::Other(vec![self.expr(&l.expr)]),
            Expr::Return(r) => NodeKind::Return(r.expr.as_deref().map(|e| self.boxed(e))),
            Expr::Closure(c) => NodeKind::Lambda {
                params: c.inputs.iter().map(pat_name).collect(),
                body: self.boxed(&c.body),
            },
            Expr::ForLoop(f) => match indexed_header(f) {
                Some((index, sequence)) => NodeKind::IndexedLoop {
                    index,
                    sequence: self.boxed(sequence),
                    body: Box::new(self.block(&f.body)),
                },
                None => NodeKind::Other(vec![self.expr(&f.expr), self.block(&f.body)]),
            },
            Expr::While(w) => NodeKind::Other(vec![self.expr(&w.cond), self.block(&w.body)]),
            Expr::Loop(l) => NodeKind::Other(vec![self.block(&l.body)]),
            Expr::Match(m) => {
                let mut children = vec![self.expr(&m.expr)];
                for arm in &m.arms {
                    if let Some((_, guard)) = &arm.guard {
                        children.push(self.expr(guard));
                    }
                    children.push(self.expr(&arm.body));
                }
                NodeKind::Other(children)
            }
            Expr::Macro(m) => return self.mac(&m.mac),
            Expr::Array(a) => NodeKind::Array(self.exprs(&a.elems)),
            Expr::Tuple(t) => NodeKind::Other(self.exprs(&t.elems)),
            Expr::Struct(s) => {
                let mut children = self.exprs(s.fields.iter().map(|f| &f.expr));
                children.extend(s.rest.as_deref().map(|e| self.expr(e)));
                NodeKind::Other(children)
            }
            Expr::Range(r) => NodeKind::Other(self.exprs(
                r.start.as_deref().into_iter().chain(r.end.as_deref()),
            )),
            Expr::Break(b) => NodeKind::Other(self.exprs(b.expr.as_deref())),
            Expr::Repeat(r) => NodeKind::Other(vec![self.expr(&r.expr), self.expr(&r.len)]),
            Expr::Continue(_) => NodeKind::Other(Vec::new()),
            _ => NodeKind::Opaque,
        };
        self.node(kind, expr.span())
    }

    fn method_call(&self, m: &syn::ExprMethodCall) -> Node {
        let method = m.method.to_string();
        let receiver = self.boxed(&m.receiver);
        let mut args = self.exprs(&m.args);

        let construct = match (method.as_str(), args.len()) {
            ("for_each", 1) => Some(ConstructKind::ForEach),
            ("map", 1) => Some(ConstructKind::Map),
            ("filter", 1) => Some(ConstructKind::Filter),
            ("reduce", 1) | ("fold", 2) => Some(ConstructKind::Reduce),
            _ => None,
        };

        match construct {
            Some(construct) => {
                let callback = args.pop().map(Box::new);
                self.node(
                    NodeKind::Iteration {
                        construct,
                        receiver,
                        callback,
                        args,
                    },
                    m.method.span(),
                )
            }
            None => self.node(
                NodeKind::MethodCall {
                    receiver,
                    method,
                    args,
                },
                m.span(),
            ),
        }
    }

    fn mac(&self, mac: &syn::Macro) -> Node {
        let name = mac
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default();
        let Ok(parsed) = mac.parse_body_with(Punctuated::<Expr, syn::Token![,]>::parse_terminated)
        else {
            return self.node(NodeKind::Opaque, mac.span());
        };

        if name == "vec" {
            return self.node(NodeKind::Array(self.exprs(&parsed)), mac.span());
        }

        let mut args = Vec::with_capacity(parsed.len());
        for arg in &parsed {
            if let Expr::Lit(syn::ExprLit {
                lit: Lit::Str(s), ..
            }) = arg
            {
                let span = self.span(s.span());
                args.extend(
                    format_captures(&s.value())
                        .into_iter()
                        .map(|name| Node::new(NodeKind::Ident(name), span)),
                );
            }
            args.push(self.expr(arg));
        }
        let callee = self.node(NodeKind::Ident(format!("{name}!")), mac.path.span());
        self.node(
            NodeKind::Call {
                callee: Box::new(callee),
                args,
            },
            mac.span(),
        )
    }
}

fn pat_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(p) => p.ident.to_string(),
        Pat::Type(t) => pat_name(&t.pat),
        Pat::Reference(r) => pat_name(&r.pat),
        _ => String::new(),
    }
}

fn path_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

fn is_fresh_collection_ctor(func: &Expr) -> bool {
    let Expr::Path(p) = strip(func) else {
        return false;
    };
    matches!(
        path_string(&p.path).as_str(),
        "Vec::new" | "Vec::with_capacity" | "VecDeque::new" | "Vec::default"
    )
}

fn strip(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(p) => strip(&p.expr),
        Expr::Group(g) => strip(&g.expr),
        _ => expr,
    }
}

fn int_literal(expr: &Expr, value: &str) -> bool {
    matches!(
        strip(expr),
        Expr::Lit(syn::ExprLit { lit: Lit::Int(i), .. }) if i.base10_digits() == value
    )
}

/// `X.len()` → `X`.
fn len_receiver(expr: &Expr) -> Option<&Expr> {
    match strip(expr) {
        Expr::MethodCall(m) if m.method == "len" && m.args.is_empty() => Some(&m.receiver),
        _ => None,
    }
}

/// Matches `i in 0..X.len()` and `i in 0..=X.len() - 1`.
fn indexed_header(f: &syn::ExprForLoop) -> Option<(String, &Expr)> {
    let Pat::Ident(index) = &*f.pat else {
        return None;
    };
    let Expr::Range(range) = strip(&f.expr) else {
        return None;
    };
    if !range.start.as_deref().is_some_and(|s| int_literal(s, "0")) {
        return None;
    }
    let end = range.end.as_deref()?;
    let sequence = match range.limits {
        RangeLimits::HalfOpen(_) => len_receiver(end),
        RangeLimits::Closed(_) => match strip(end) {
            Expr::Binary(b) if matches!(b.op, syn::BinOp::Sub(_)) && int_literal(&b.right, "1") => {
                len_receiver(&b.left)
            }
            _ => None,
        },
    }?;
    Some((index.ident.to_string(), sequence))
}

/// Maps a syn operator to `(op, is_compound_assignment)`.
fn bin_op(op: syn::BinOp) -> (BinOp, bool) {
    use syn::BinOp as B;
    match op {
        B::Add(_) => (BinOp::Add, false),
        B::Sub(_) => (BinOp::Sub, false),
        B::Mul(_) => (BinOp::Mul, false),
        B::Div(_) => (BinOp::Div, false),
        B::Rem(_) => (BinOp::Rem, false),
        B::And(_) => (BinOp::And, false),
        B::Or(_) => (BinOp::Or, false),
        B::BitXor(_) => (BinOp::BitXor, false),
        B::BitAnd(_) => (BinOp::BitAnd, false),
        B::BitOr(_) => (BinOp::BitOr, false),
        B::Shl(_) => (BinOp::Shl, false),
        B::Shr(_) => (BinOp::Shr, false),
        B::Eq(_) => (BinOp::Eq, false),
        B::Lt(_) => (BinOp::Lt, false),
        B::Le(_) => (BinOp::Le, false),
        B::Ne(_) => (BinOp::Ne, false),
        B::Ge(_) => (BinOp::Ge, false),
        B::Gt(_) => (BinOp::Gt, false),
        B::AddAssign(_) => (BinOp::Add, true),
        B::SubAssign(_) => (BinOp::Sub, true),
        B::MulAssign(_) => (BinOp::Mul, true),
        B::DivAssign(_) => (BinOp::Div, true),
        B::RemAssign(_) => (BinOp::Rem, true),
        B::BitXorAssign(_) => (BinOp::BitXor, true),
        B::BitAndAssign(_) => (BinOp::BitAnd, true),
        B::BitOrAssign(_) => (BinOp::BitOr, true),
        B::ShlAssign(_) => (BinOp::Shl, true),
        B::ShrAssign(_) => (BinOp::Shr, true),
        _ => (BinOp::Other, false),
    }
}

/// Names captured inline by a format string, e.g. `"{name} #{i:>3}"` → `name`, `i`.
fn format_captures(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '{' {
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            continue;
        }
        let mut inner = String::new();
        for c in chars.by_ref() {
            if c == '}' {
                break;
            }
            inner.push(c);
        }
        let name = inner.split(':').next().unwrap_or_default().trim();
        let is_ident = name
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if is_ident {
            names.push(name.to_string());
        }
    }
    names
}
