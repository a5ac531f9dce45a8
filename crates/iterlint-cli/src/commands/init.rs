//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# iterlint configuration

# Starting point: "recommended", "strict" or "minimal"
preset = "recommended"

# Exit non-zero when a finding is at or above this severity
fail_on = "warning"

[analyzer]
# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/target/**",
    "**/vendor/**",
    "**/dist/**",
]

# Respect .gitignore files
respect_gitignore = true

# Maximum number of files scanned in parallel (default: one per core)
# parallelism = 4

# Per-category overrides, keyed by name, kebab name or code

[rules.IndexedLoopWithoutIndexUse]
enabled = true

[rules.MapForSideEffectOnly]
enabled = true
# severity = "error"

# [rules.AccumulatorPatternManual]
# enabled = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("iterlint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created iterlint.toml");
    println!("\nNext steps:");
    println!("  1. Edit iterlint.toml to configure categories");
    println!("  2. Run: iterlint lint");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iterlint_core::{Category, Config, Severity};

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let rules = config.rule_config().unwrap();
        assert!(rules.is_enabled(Category::AccumulatorPatternManual));
        assert_eq!(config.fail_on().unwrap(), Some(Severity::Warning));
        assert!(config.analyzer.exclude.contains(&"**/dist/**".to_string()));
    }
}
