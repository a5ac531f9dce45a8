//! Locates the configuration file for a run.
//!
//! First hit wins:
//!
//! 1. `--config <file>`, trusted as given
//! 2. `iterlint.toml`, then `.iterlint.toml`, in the project directory
//! 3. `config.toml` in `$ITERLINT_CONFIG_DIR`, or else in `~/.iterlint/`
//! 4. built-in defaults

use std::path::{Path, PathBuf};

const PROJECT_CONFIG_NAMES: [&str; 2] = ["iterlint.toml", ".iterlint.toml"];
const GLOBAL_CONFIG_NAME: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "ITERLINT_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the user-wide config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// File to load, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Whether the file is the user-wide one.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Resolves the configuration for a project directory.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let source = resolve_with(project_dir, explicit, global_config_dir().as_deref());
    tracing::debug!("Config source: {:?}", source);
    source
}

/// Resolution with the global directory passed in, so tests need no env vars.
fn resolve_with(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<&Path>,
) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let project = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file());
    if let Some(path) = project {
        return ConfigSource::Project(path);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// User-wide configuration directory: `$ITERLINT_CONFIG_DIR`, else `~/.iterlint`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".iterlint")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn explicit_wins_even_if_missing() {
        let project = TempDir::new().unwrap();
        touch(project.path(), "iterlint.toml");
        let explicit = Path::new("/nonexistent/custom.toml");
        assert_eq!(
            resolve_with(project.path(), Some(explicit), None),
            ConfigSource::Explicit(explicit.to_path_buf())
        );
    }

    #[test]
    fn project_names_in_order() {
        let project = TempDir::new().unwrap();
        let dotted = touch(project.path(), ".iterlint.toml");
        assert_eq!(
            resolve_with(project.path(), None, None),
            ConfigSource::Project(dotted)
        );

        let plain = touch(project.path(), "iterlint.toml");
        assert_eq!(
            resolve_with(project.path(), None, None),
            ConfigSource::Project(plain)
        );
    }

    #[test]
    fn global_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_file = touch(global.path(), "config.toml");

        let source = resolve_with(project.path(), None, Some(global.path()));
        assert_eq!(source, ConfigSource::Global(global_file));
        assert!(source.is_global());

        touch(project.path(), "iterlint.toml");
        let source = resolve_with(project.path(), None, Some(global.path()));
        assert!(matches!(source, ConfigSource::Project(_)));
    }

    #[test]
    fn defaults_when_nothing_found() {
        let project = TempDir::new().unwrap();
        let empty_global = TempDir::new().unwrap();
        let source = resolve_with(project.path(), None, Some(empty_global.path()));
        assert_eq!(source, ConfigSource::Default);
        assert!(source.path().is_none());
    }

    #[test]
    fn directory_named_like_config_is_ignored() {
        let project = TempDir::new().unwrap();
        fs::create_dir(project.path().join("iterlint.toml")).unwrap();
        assert_eq!(
            resolve_with(project.path(), None, None),
            ConfigSource::Default
        );
    }
}
