//! # iterlint-core
//!
//! Core engine for linting array-iteration constructs.
//!
//! Source files are lowered by a [`Frontend`] into a generic expression
//! [`Node`] tree in which indexed loops and `forEach` / `map` / `filter` /
//! `reduce` calls are explicit variants. The engine then:
//!
//! - walks the tree with a [`Traversal`], yielding one [`IterationNode`] per construct
//! - applies the enabled [`Matcher`]s through a [`RuleRegistry`]
//! - collects [`Finding`]s in traversal order with a [`Reporter`]
//! - runs many files in parallel through the [`Analyzer`]
//!
//! ## Example
//!
//! ```ignore
//! use iterlint_core::{Analyzer, RuleConfig};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .frontend(MyFrontend::new())
//!     .matchers(my_matchers())
//!     .rule_config(RuleConfig::default())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod category;
mod config;
mod context;
mod registry;
mod reporter;
mod rule;
mod scanner;
mod traversal;
mod tree;
mod types;

/// Source-language front-ends.
pub mod frontend;
/// Comment-based suppression directives.
pub mod allowance;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use category::{Category, UnknownCategory};
pub use config::{
    AnalyzerConfig, CategoryConfig, CategorySettings, Config, ConfigError, Preset, RuleConfig,
};
pub use context::{FileContext, LineIndex};
pub use frontend::{Dialect, Frontend, FrontendBox, ParseError, RustFrontend};
pub use registry::RuleRegistry;
pub use reporter::{RenderedFinding, Reporter};
pub use rule::{Matcher, MatcherBox};
pub use scanner::{ScanError, ScanReport, Scanner};
pub use traversal::{
    Callback, CancelToken, IndexUse, IterationNode, IterationNodes, MalformedTreeError, Traversal,
};
pub use tree::{BinOp, ConstructKind, Descendants, Node, NodeKind, Span};
pub use types::{FileFailure, Finding, FindingDiagnostic, LintResult, Location, Severity};
