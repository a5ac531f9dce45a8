//! Core analyzer for orchestrating multi-file lint runs.

use crate::config::{Config, ConfigError, RuleConfig};
use crate::context::FileContext;
use crate::frontend::{Frontend, FrontendBox};
use crate::registry::RuleRegistry;
use crate::rule::{Matcher, MatcherBox};
use crate::scanner::{ScanReport, Scanner};
use crate::traversal::CancelToken;
use crate::types::{FileFailure, LintResult};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a whole run.
///
/// Per-file problems (unreadable file, parse error, malformed tree) are
/// recorded in [`LintResult::failures`] instead.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Error walking the directory tree.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    frontends: Vec<FrontendBox>,
    matchers: Vec<MatcherBox>,
    rule_config: Option<RuleConfig>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    cancel: Option<CancelToken>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory or single file to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a language front-end.
    #[must_use]
    pub fn frontend<F: Frontend + 'static>(mut self, frontend: F) -> Self {
        self.frontends.push(Box::new(frontend));
        self
    }

    /// Adds a boxed language front-end.
    #[must_use]
    pub fn frontend_box(mut self, frontend: FrontendBox) -> Self {
        self.frontends.push(frontend);
        self
    }

    /// Adds a matcher.
    #[must_use]
    pub fn matcher<M: Matcher + 'static>(mut self, matcher: M) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Adds a boxed matcher.
    #[must_use]
    pub fn matcher_box(mut self, matcher: MatcherBox) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Adds several boxed matchers.
    #[must_use]
    pub fn matchers(mut self, matchers: impl IntoIterator<Item = MatcherBox>) -> Self {
        self.matchers.extend(matchers);
        self
    }

    /// Sets the resolved category settings, overriding the config file's.
    #[must_use]
    pub fn rule_config(mut self, rules: RuleConfig) -> Self {
        self.rule_config = Some(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets a cancellation token shared with every file scan.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved, an exclude pattern
    /// is invalid, or the configuration names an unknown category or preset.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        let base = if root.is_file() {
            root.parent().map_or_else(|| root.clone(), Path::to_path_buf)
        } else {
            root.clone()
        };

        let rule_config = match (self.rule_config, &self.config) {
            (Some(rules), _) => rules,
            (None, Some(config)) => config.rule_config()?,
            (None, None) => RuleConfig::default(),
        };
        let settings = self
            .config
            .map(|c| c.analyzer)
            .unwrap_or_default();

        let exclude = self
            .exclude_patterns
            .iter()
            .chain(&settings.exclude)
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            root,
            base,
            frontends: self.frontends,
            registry: RuleRegistry::new(self.matchers, rule_config),
            exclude,
            respect_gitignore: settings.respect_gitignore,
            parallelism: settings.parallelism,
            cancel: self.cancel,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    base: PathBuf,
    frontends: Vec<FrontendBox>,
    registry: RuleRegistry,
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
    parallelism: Option<usize>,
    cancel: Option<CancelToken>,
}

enum FileOutcome {
    Scanned(ScanReport),
    Cancelled,
    Failed(FileFailure),
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that finding paths are relative to.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns the number of enabled categories.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.registry.len()
    }

    /// Analyzes all files and returns the results.
    ///
    /// Files are scanned in parallel; findings come back grouped by file in
    /// path order.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails or the worker pool cannot start.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let scan_all = || {
            files
                .par_iter()
                .map(|path| self.analyze_file(path))
                .collect::<Vec<_>>()
        };
        let outcomes = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(scan_all),
            None => scan_all(),
        };

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Scanned(report) => {
                    result.files_checked += 1;
                    result.cancelled |= report.cancelled;
                    result.findings.extend(report.findings);
                }
                FileOutcome::Cancelled => result.cancelled = true,
                FileOutcome::Failed(failure) => result.failures.push(failure),
            }
        }

        info!(
            "Analysis complete: {} findings in {} files",
            result.findings.len(),
            result.files_checked
        );

        Ok(result)
    }

    fn frontend_for(&self, path: &Path) -> Option<&dyn Frontend> {
        self.frontends
            .iter()
            .find(|f| f.handles(path))
            .map(|f| &**f)
    }

    fn analyze_file(&self, path: &Path) -> FileOutcome {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return FileOutcome::Cancelled;
        }
        let Some(frontend) = self.frontend_for(path) else {
            return self.failure(path, "no front-end handles this file".to_string());
        };
        debug!("Analyzing: {} ({})", path.display(), frontend.language_id());

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return self.failure(path, e.to_string()),
        };
        let ctx = FileContext::new(path, &content, &self.base);

        let mut scanner = Scanner::new(&self.registry);
        if let Some(token) = &self.cancel {
            scanner = scanner.with_cancel(token.clone());
        }
        match scanner.scan_source(frontend, &ctx) {
            Ok(report) => FileOutcome::Scanned(report),
            Err(e) => self.failure(path, e.to_string()),
        }
    }

    fn failure(&self, path: &Path, message: String) -> FileOutcome {
        warn!("Skipping {}: {}", path.display(), message);
        let file = path
            .strip_prefix(&self.base)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        FileOutcome::Failed(FileFailure { file, message })
    }

    /// Discovers all files some front-end handles, sorted by path.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if self.root.is_file() {
            return Ok(self
                .frontend_for(&self.root)
                .map(|_| vec![self.root.clone()])
                .unwrap_or_default());
        }

        let walker = ignore::WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if self.frontend_for(&path).is_none() {
                continue;
            }
            if self.should_exclude(&path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path, relative to the base, matches an exclude pattern.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.base).unwrap_or(path);
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("root", &self.root)
            .field("registry", &self.registry)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}
