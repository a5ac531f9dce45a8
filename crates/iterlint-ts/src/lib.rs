//! # iterlint-ts
//!
//! Tree-sitter front-ends for iterlint.
//!
//! [`JavaScriptFrontend`] lowers `.js`, `.mjs`, `.cjs` and `.jsx` files into
//! the generic tree consumed by `iterlint-core`:
//!
//! ```ignore
//! use iterlint_core::Analyzer;
//! use iterlint_ts::JavaScriptFrontend;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./web")
//!     .frontend(JavaScriptFrontend::new())
//!     .matchers(iterlint_rules::all_matchers())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod javascript;

pub use javascript::JavaScriptFrontend;
