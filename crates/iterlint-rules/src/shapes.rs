//! Statement shapes shared by the matchers.

use iterlint_core::{IterationNode, Node, NodeKind};

const APPEND_METHODS: &[&str] = &["push", "push_back"];

/// `target.push(value)` → `(target, value)`.
pub(crate) fn push_into(stmt: &Node) -> Option<(&str, &Node)> {
    match &stmt.unwrap_stmt().kind {
        NodeKind::MethodCall {
            receiver,
            method,
            args,
        } if APPEND_METHODS.contains(&method.as_str()) => match args.as_slice() {
            [value] => receiver.as_ident().map(|target| (target, value)),
            _ => None,
        },
        _ => None,
    }
}

/// Name of the variable folded by an associative update, if `stmt` is one.
///
/// Recognises `acc op= x`, `acc = acc op x`, `acc = x op acc`,
/// `acc = acc.concat(x)` and `acc++`. Decrements do not fold associatively.
pub(crate) fn accumulator_update(stmt: &Node) -> Option<&str> {
    match &stmt.unwrap_stmt().kind {
        NodeKind::Assign {
            op: Some(op),
            target,
            value,
        } if op.is_associative() => {
            let name = target.as_ident()?;
            (!value.references(name)).then_some(name)
        }
        NodeKind::Assign {
            op: None,
            target,
            value,
        } => {
            let name = target.as_ident()?;
            match &value.kind {
                NodeKind::Binary { op, lhs, rhs } if op.is_associative() => {
                    let folds = (lhs.is_ident(name) && !rhs.references(name))
                        || (rhs.is_ident(name) && !lhs.references(name));
                    folds.then_some(name)
                }
                NodeKind::MethodCall {
                    receiver,
                    method,
                    args,
                } if method == "concat" && receiver.is_ident(name) => {
                    (!args.iter().any(|a| a.references(name))).then_some(name)
                }
                _ => None,
            }
        }
        NodeKind::Update {
            target,
            increment: true,
        } => target.as_ident(),
        _ => None,
    }
}

/// Initialiser of `name` if the statement before the construct declares it.
pub(crate) fn declared_before<'t>(node: &IterationNode<'t>, name: &str) -> Option<&'t Node> {
    match &node.preceding?.kind {
        NodeKind::Let {
            name: declared,
            init: Some(init),
        } if !declared.is_empty() && declared == name => Some(init),
        _ => None,
    }
}

/// Whether an initialiser is a numeric or collection seed.
pub(crate) fn is_accumulator_seed(init: &Node) -> bool {
    matches!(init.kind, NodeKind::Number(_) | NodeKind::Array(_))
}

/// Branch of a body that is a single `if` without `else`.
pub(crate) fn guarded_branch(body: &Node) -> Option<&Node> {
    match body.statements() {
        [only] => match &only.unwrap_stmt().kind {
            NodeKind::If {
                consequent,
                alternate: None,
                ..
            } => Some(consequent),
            _ => None,
        },
        _ => None,
    }
}

/// The only statement of a block or expression body.
pub(crate) fn sole_statement(body: &Node) -> Option<&Node> {
    match body.statements() {
        [only] => Some(only),
        _ => None,
    }
}

/// Accumulator folded by a construct whose whole effect, optionally behind
/// a guard, updates a variable seeded by the preceding statement.
pub(crate) fn manual_accumulator<'t>(node: &IterationNode<'t>) -> Option<&'t str> {
    let body = node.body()?;
    let effect = match guarded_branch(body) {
        Some(branch) => sole_statement(branch)?,
        None => sole_statement(body)?,
    };
    let name = accumulator_update(effect)?;
    declared_before(node, name)
        .filter(|init| is_accumulator_seed(init))
        .map(|_| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iterlint_core::{Frontend, RustFrontend};

    fn stmt(code: &str) -> Node {
        let root = RustFrontend::new()
            .parse(&format!("fn f() {{ {code} }}"))
            .expect("Failed to parse");
        root.statements()[0].statements()[0].clone()
    }

    #[test]
    fn recognises_pushes() {
        let s = stmt("names.push(e.name);");
        let (target, value) = push_into(&s).unwrap();
        assert_eq!(target, "names");
        assert!(matches!(value.kind, NodeKind::Member { .. }));
        assert!(push_into(&stmt("self.names.push(e);")).is_none());
        assert!(push_into(&stmt("names.insert(0, e);")).is_none());
    }

    #[test]
    fn recognises_accumulator_updates() {
        assert_eq!(accumulator_update(&stmt("sum += e.salary;")), Some("sum"));
        assert_eq!(accumulator_update(&stmt("sum = sum * e;")), Some("sum"));
        assert_eq!(accumulator_update(&stmt("sum = e | sum;")), Some("sum"));
        assert_eq!(accumulator_update(&stmt("all = all.concat(e);")), Some("all"));
        assert_eq!(accumulator_update(&stmt("sum -= e;")), None);
        assert_eq!(accumulator_update(&stmt("sum = sum - e;")), None);
        assert_eq!(accumulator_update(&stmt("sum += sum;")), None);
        assert_eq!(accumulator_update(&stmt("sum = e + 1;")), None);
    }

    #[test]
    fn guarded_branch_requires_no_else() {
        let body = stmt("{ if ok { go(); } }");
        assert!(guarded_branch(&body).is_some());
        let body = stmt("{ if ok { go(); } else { stop(); } }");
        assert!(guarded_branch(&body).is_none());
    }
}
