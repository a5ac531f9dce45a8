//! Language front-ends.
//!
//! [`Frontend`] is the extension point for adding new languages. An
//! implementation lowers raw source text into the generic [`Node`] tree,
//! tagging indexed loops and iteration calls with their [`ConstructKind`].

mod rust;

pub use rust::RustFrontend;

use crate::tree::{ConstructKind, Node};

/// Vocabulary of the source language.
///
/// Controls how constructs are named in messages and which callback
/// parameter, if any, carries the element index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `forEach`, `map`, `filter`, `reduce`; callbacks receive `(item, index)`.
    #[default]
    JavaScript,
    /// `for_each`, `map`, `filter`, `fold`; closures never receive an index.
    Rust,
}

impl Dialect {
    /// Name of a construct in this language.
    #[must_use]
    pub fn construct_name(self, construct: ConstructKind) -> &'static str {
        match (self, construct) {
            (_, ConstructKind::IndexedLoop) => "indexed loop",
            (Self::JavaScript, ConstructKind::ForEach) => "forEach",
            (Self::Rust, ConstructKind::ForEach) => "for_each",
            (_, ConstructKind::Map) => "map",
            (_, ConstructKind::Filter) => "filter",
            (Self::JavaScript, ConstructKind::Reduce) => "reduce",
            (Self::Rust, ConstructKind::Reduce) => "fold",
        }
    }

    /// Position of the index parameter in a construct's callback.
    #[must_use]
    pub fn index_param(self, construct: ConstructKind) -> Option<usize> {
        match (self, construct) {
            (Self::Rust, _) | (_, ConstructKind::IndexedLoop) => None,
            (
                Self::JavaScript,
                ConstructKind::ForEach | ConstructKind::Map | ConstructKind::Filter,
            ) => Some(1),
            (Self::JavaScript, ConstructKind::Reduce) => Some(2),
        }
    }

    /// Joins construct names into a suggested chain, e.g. `filter + map + reduce`.
    #[must_use]
    pub fn chain(self, constructs: &[ConstructKind]) -> String {
        constructs
            .iter()
            .map(|c| self.construct_name(*c))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// Error produced when a front-end cannot parse a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{language} parse error at {line}:{column}: {message}")]
pub struct ParseError {
    /// Language identifier of the failing front-end.
    pub language: &'static str,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// What went wrong.
    pub message: String,
}

/// Trait for language-specific lowering into the generic tree.
pub trait Frontend: Send + Sync {
    /// Language identifier (e.g., `"javascript"`, `"rust"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this front-end handles (e.g., `&[".js", ".mjs"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Vocabulary used in messages and for index-parameter detection.
    fn dialect(&self) -> Dialect;

    /// Parses source text into a tree rooted at a [`crate::NodeKind::Block`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the source is not syntactically valid.
    fn parse(&self, source: &str) -> Result<Node, ParseError>;

    /// Whether this front-end handles the given path.
    fn handles(&self, path: &std::path::Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.extensions().iter().any(|ext| name.ends_with(ext)))
    }
}

/// Boxed front-end.
pub type FrontendBox = Box<dyn Frontend>;
