//! Lint command implementation.

use anyhow::{Context, Result};
use iterlint_core::{Analyzer, Category, Config, RustFrontend, Severity};
use iterlint_rules::all_matchers;
use iterlint_ts::JavaScriptFrontend;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command-line options of `iterlint lint`.
#[derive(Debug, Default)]
pub struct LintOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Categories disabled on top of the configuration.
    pub disable: Vec<Category>,
    /// Exit-code threshold overriding `fail_on`.
    pub severity: Option<Severity>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
}

/// Runs the lint command.
///
/// Returns whether any finding reached the failure threshold.
pub fn run(path: &Path, options: &LintOptions, source: &ConfigSource) -> Result<bool> {
    let config = load_config(source)?;

    let threshold = match options.severity {
        Some(severity) => severity,
        None => config
            .fail_on()
            .context("Invalid `fail_on` in config")?
            .unwrap_or(Severity::Warning),
    };

    let mut rules = config.rule_config().context("Invalid rule configuration")?;
    for category in &options.disable {
        tracing::debug!("Disabled on the command line: {}", category);
        rules = rules.disable(*category);
    }

    let analyzer = Analyzer::builder()
        .root(path)
        .config(config)
        .rule_config(rules)
        .excludes(options.exclude.iter().cloned())
        .frontend(JavaScriptFrontend::new())
        .frontend(RustFrontend::new())
        .matchers(all_matchers())
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} categories",
        path.display(),
        analyzer.category_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, options.format, analyzer.base())?;

    Ok(result.has_findings_at(threshold))
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}
