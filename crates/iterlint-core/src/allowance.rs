//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // iterlint: allow(ForEachBuildingCollection) reason="order matters here"
//! xs.forEach(x => out.push(x));
//! ```
//!
//! A directive applies to constructs on its own line and on the line below.
//! A construct in a call chain split over several lines is also covered by a
//! directive above the chain's first line. Categories may be given by name,
//! kebab-case alias or code; `all` silences every category.

use crate::category::Category;

/// Result of checking for an allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Category is not allowed.
    Denied,
    /// Category is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// What a directive allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allowed {
    /// Every category.
    All,
    /// The listed categories.
    Only(Vec<Category>),
}

/// Parsed allowance directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Allowed categories.
    pub allowed: Allowed,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    /// Whether this directive covers `category`.
    #[must_use]
    pub fn covers(&self, category: Category) -> bool {
        match &self.allowed {
            Allowed::All => true,
            Allowed::Only(categories) => categories.contains(&category),
        }
    }
}

/// Checks whether `category` is allowed for a construct on `line` (1-indexed).
///
/// Looks at the line itself, then the line before.
#[must_use]
pub fn check_allow(content: &str, line: usize, category: Category) -> AllowCheck {
    if line == 0 {
        return AllowCheck::Denied;
    }
    let mut lines = content.lines().skip(line.saturating_sub(2));
    let previous = if line > 1 { lines.next() } else { None };
    let current = lines.next();

    [current, previous]
        .into_iter()
        .flatten()
        .filter_map(parse_allow_directive)
        .find(|d| d.covers(category))
        .map_or(AllowCheck::Denied, |d| AllowCheck::Allowed { reason: d.reason })
}

/// Parses the first `iterlint: allow(...)` directive in a line.
///
/// Unknown category names are ignored; a directive naming none that is
/// known is not a directive.
#[must_use]
pub fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    comment_start(line).and_then(|i| parse_comment(&line[i..]))
}

/// Byte index of the `//` opening a line comment, skipping string literals.
///
/// A `'` without a closing quote on the line is a Rust lifetime, not a string.
fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => return Some(i),
            quote @ (b'"' | b'\'' | b'`') => match closing_quote(&bytes[i + 1..], quote) {
                Some(len) => i += len + 1,
                None if quote == b'\'' => {}
                None => return None,
            },
            _ => {}
        }
        i += 1;
    }
    None
}

/// Offset of the unescaped `quote` ending a literal.
fn closing_quote(rest: &[u8], quote: u8) -> Option<usize> {
    let mut escaped = false;
    for (i, &b) in rest.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == quote {
            return Some(i);
        }
    }
    None
}

fn parse_comment(comment: &str) -> Option<AllowDirective> {
    let body = comment.trim_start_matches('/').trim();
    let directive = body.strip_prefix("iterlint:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let names: Vec<&str> = allow_content[..paren_end]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let allowed = if names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
        Allowed::All
    } else {
        let categories: Vec<Category> = names.iter().filter_map(|n| n.parse().ok()).collect();
        if categories.is_empty() {
            return None;
        }
        Allowed::Only(categories)
    };

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .and_then(|r| r.trim().strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { allowed, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_directive() {
        let directive =
            parse_allow_directive("// iterlint: allow(map-for-side-effect-only)").unwrap();
        assert!(directive.covers(Category::MapForSideEffectOnly));
        assert!(!directive.covers(Category::AccumulatorPatternManual));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive =
            parse_allow_directive("  // iterlint: allow(IT003) reason=\"order matters\"").unwrap();
        assert!(directive.covers(Category::ForEachBuildingCollection));
        assert_eq!(directive.reason.as_deref(), Some("order matters"));
    }

    #[test]
    fn test_parse_multiple_and_all() {
        let directive =
            parse_allow_directive("// iterlint: allow(IT001, AccumulatorPatternManual, bogus)")
                .unwrap();
        assert_eq!(
            directive.allowed,
            Allowed::Only(vec![
                Category::IndexedLoopWithoutIndexUse,
                Category::AccumulatorPatternManual
            ])
        );
        let all = parse_allow_directive("/// iterlint: allow(all)").unwrap();
        assert!(all.covers(Category::ForEachWithFilterConditional));
        assert!(parse_allow_directive("// iterlint: allow(bogus)").is_none());
        assert!(parse_allow_directive("// otherlint: allow(all)").is_none());
    }

    #[test]
    fn test_trailing_comment() {
        let content = "xs.map(save); // iterlint: allow(IT002) reason=\"legacy\"";
        let result = check_allow(content, 1, Category::MapForSideEffectOnly);
        assert_eq!(result.reason(), Some("legacy"));
    }

    #[test]
    fn test_directive_inside_string_is_ignored() {
        let content = "log(\"// iterlint: allow(all)\"); xs.map(save);";
        assert!(!check_allow(content, 1, Category::MapForSideEffectOnly).is_allowed());
        assert!(parse_allow_directive("const s = '// iterlint: allow(all)';").is_none());
        assert!(parse_allow_directive("const s = `a \\` // iterlint: allow(all)`;").is_none());

        let after_string = r#"log("a \" b"); // iterlint: allow(IT002)"#;
        assert!(parse_allow_directive(after_string).is_some());
        let after_lifetime = "fn f<'a>(xs: &'a [u8]) {} // iterlint: allow(IT002)";
        assert!(parse_allow_directive(after_lifetime).is_some());
    }

    #[test]
    fn test_check_allow_previous_line() {
        let content = r"function f() {
    // iterlint: allow(for-each-building-collection)
    xs.forEach(x => out.push(x));
}";

        assert!(check_allow(content, 3, Category::ForEachBuildingCollection).is_allowed());
        assert!(!check_allow(content, 3, Category::MapForSideEffectOnly).is_allowed());
        assert!(!check_allow(content, 4, Category::ForEachBuildingCollection).is_allowed());
        assert_eq!(
            check_allow(content, 0, Category::ForEachBuildingCollection),
            AllowCheck::Denied
        );
    }
}
