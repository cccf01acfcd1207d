//! Configuration management for explainer.
//!
//! Parses `explainer.toml` with serde and provides auto-discovery of the
//! config file in parent directories. CLI settings are applied during load
//! via [`CliSettings`].
//!
//! ```toml
//! [store]
//! dir = "content"
//!
//! [languages]
//! file = "data/code-languages.yml"
//! fallback = "text"
//!
//! [render]
//! highlight = true
//! theme = "InspiredGitHub"
//!
//! [ids]
//! strategy = "random"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `store.dir` and `languages.file` support `${VAR}` and `${VAR:-default}`.
//! Relative paths resolve against the directory of the config file.

use std::borrow::Cow;
use std::env::VarError;
use std::path::{Path, PathBuf};

use explainer_id::IdStrategy;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "explainer.toml";

const DEFAULT_STORE_DIR: &str = "content";
const DEFAULT_FALLBACK: &str = "text";
const DEFAULT_THEME: &str = "InspiredGitHub";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the store directory.
    pub store_dir: Option<PathBuf>,
    /// Override the language allow-list file.
    pub languages_file: Option<PathBuf>,
    /// Override the id strategy.
    pub id_strategy: Option<IdStrategy>,
    /// Override syntax highlighting.
    pub highlight: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store section (paths as strings from TOML).
    store: StoreConfigRaw,
    /// Languages section (paths as strings from TOML).
    languages: LanguagesConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Identifier configuration.
    pub ids: IdsConfig,

    /// Resolved store configuration (set after loading).
    #[serde(skip)]
    pub store_resolved: StoreConfig,
    /// Resolved languages configuration (set after loading).
    #[serde(skip)]
    pub languages_resolved: LanguagesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StoreConfigRaw {
    dir: Option<String>,
}

/// Resolved store configuration with absolute paths.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding stored explainers.
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LanguagesConfigRaw {
    file: Option<String>,
    fallback: Option<String>,
}

/// Resolved language allow-list configuration.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LanguagesConfig {
    /// YAML allow-list file; `None` selects the built-in list.
    pub file: Option<PathBuf>,
    /// Tag substituted for unknown languages.
    pub fallback: String,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether code blocks are syntax highlighted.
    pub highlight: bool,
    /// Highlighting theme name.
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            theme: DEFAULT_THEME.to_owned(),
        }
    }
}

/// Identifier configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct IdsConfig {
    /// How id suffixes are generated.
    pub strategy: IdStrategy,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`store.dir`").
        field: String,
        /// Error message (e.g., "${`EXPLAINER_HOME`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `explainer.toml` in the current directory and its parents, falling
    /// back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(store_dir) = &settings.store_dir {
            self.store_resolved.dir.clone_from(store_dir);
        }
        if let Some(languages_file) = &settings.languages_file {
            self.languages_resolved.file = Some(languages_file.clone());
        }
        if let Some(strategy) = settings.id_strategy {
            self.ids.strategy = strategy;
        }
        if let Some(highlight) = settings.highlight {
            self.render.highlight = highlight;
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            store: StoreConfigRaw::default(),
            languages: LanguagesConfigRaw::default(),
            render: RenderConfig::default(),
            ids: IdsConfig::default(),
            store_resolved: StoreConfig {
                dir: base.join(DEFAULT_STORE_DIR),
            },
            languages_resolved: LanguagesConfig {
                file: None,
                fallback: DEFAULT_FALLBACK.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fallback = &self.languages_resolved.fallback;
        require_non_empty(fallback, "languages.fallback")?;
        if fallback.trim().contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "languages.fallback must be a single tag, got {fallback:?}"
            )));
        }
        require_non_empty(&self.render.theme, "render.theme")?;
        Ok(())
    }

    /// Expand environment variable references in the path fields.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = self.store.dir.take() {
            self.store.dir = Some(expand_path_var(dir, "store.dir")?);
        }
        if let Some(file) = self.languages.file.take() {
            self.languages.file = Some(expand_path_var(file, "languages.file")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.store_resolved = StoreConfig {
            dir: config_dir.join(self.store.dir.as_deref().unwrap_or(DEFAULT_STORE_DIR)),
        };
        self.languages_resolved = LanguagesConfig {
            file: self.languages.file.as_deref().map(|file| config_dir.join(file)),
            fallback: self
                .languages
                .fallback
                .clone()
                .unwrap_or_else(|| DEFAULT_FALLBACK.to_owned()),
        };
    }
}

/// Expand `${VAR}` and `${VAR:-default}` in a path field.
///
/// Values without `${` are returned as-is, so a bare `$` in a path stays
/// literal.
fn expand_path_var(value: String, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value);
    }

    shellexpand::env_with_context(&value, |var| std::env::var(var).map(Some))
        .map(Cow::into_owned)
        .map_err(|err| {
            let reason = match err.cause {
                VarError::NotPresent => "not set",
                VarError::NotUnicode(_) => "not valid unicode",
            };
            ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{}}} {reason}", err.var_name),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.store_resolved.dir, PathBuf::from("/test/content"));
        assert_eq!(config.languages_resolved.file, None);
        assert_eq!(config.languages_resolved.fallback, "text");
        assert!(config.render.highlight);
        assert_eq!(config.render.theme, "InspiredGitHub");
        assert_eq!(config.ids.strategy, IdStrategy::Random);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.render.highlight);
        assert_eq!(config.ids.strategy, IdStrategy::Random);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[store]
dir = "explainers"

[languages]
file = "data/code-languages.yml"
fallback = "plaintext"

[render]
highlight = false
theme = "Solarized (dark)"

[ids]
strategy = "content"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.store_resolved.dir, PathBuf::from("/project/explainers"));
        assert_eq!(
            config.languages_resolved,
            LanguagesConfig {
                file: Some(PathBuf::from("/project/data/code-languages.yml")),
                fallback: "plaintext".to_owned(),
            }
        );
        assert!(!config.render.highlight);
        assert_eq!(config.render.theme, "Solarized (dark)");
        assert_eq!(config.ids.strategy, IdStrategy::Content);
    }

    #[test]
    fn test_parse_unknown_strategy() {
        let result: Result<Config, _> = toml::from_str("[ids]\nstrategy = \"sequential\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_absolute_paths_kept() {
        let mut config: Config = toml::from_str("[store]\ndir = \"/var/explainers\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.store_resolved.dir, PathBuf::from("/var/explainers"));
    }

    #[test]
    fn test_validate_empty_fallback() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.languages_resolved.fallback = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("languages.fallback"));
    }

    #[test]
    fn test_validate_multiword_fallback() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.languages_resolved.fallback = "plain text".to_owned();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_theme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.render.theme = String::new();
        assert!(config.validate().unwrap_err().to_string().contains("render.theme"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            store_dir: Some(PathBuf::from("/custom/store")),
            id_strategy: Some(IdStrategy::Content),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.store_resolved.dir, PathBuf::from("/custom/store"));
        assert_eq!(config.ids.strategy, IdStrategy::Content);
        assert_eq!(config.languages_resolved.file, None); // Unchanged
        assert!(config.render.highlight); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_languages_and_highlight() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            languages_file: Some(PathBuf::from("/etc/langs.yml")),
            highlight: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.languages_resolved.file,
            Some(PathBuf::from("/etc/langs.yml"))
        );
        assert!(!config.render.highlight);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("explainer.toml");
        std::fs::write(&path, "[store]\ndir = \"out\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.store_resolved.dir, temp.path().join("out"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/explainer.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("explainer.toml");
        std::fs::write(&path, "[store\n").unwrap();

        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_validates() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("explainer.toml");
        std::fs::write(&path, "[languages]\nfallback = \"\"\n").unwrap();

        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_applies_cli_after_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("explainer.toml");
        std::fs::write(&path, "[ids]\nstrategy = \"random\"\n").unwrap();

        let overrides = CliSettings {
            id_strategy: Some(IdStrategy::Content),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&overrides)).unwrap();
        assert_eq!(config.ids.strategy, IdStrategy::Content);
    }

    #[test]
    fn test_discover_in_parent() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILENAME), "").unwrap();
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(temp.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_expand_store_dir() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("EXPLAINER_TEST_HOME", "/srv/explainers");
        }
        let result = expand_path_var("${EXPLAINER_TEST_HOME}/content".to_owned(), "store.dir");
        unsafe {
            std::env::remove_var("EXPLAINER_TEST_HOME");
        }
        assert_eq!(result.unwrap(), "/srv/explainers/content");
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("EXPLAINER_TEST_UNSET");
        }
        let result = expand_path_var("${EXPLAINER_TEST_UNSET:-content}".to_owned(), "store.dir");
        assert_eq!(result.unwrap(), "content");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("EXPLAINER_TEST_MISSING");
        }
        let err = expand_path_var("${EXPLAINER_TEST_MISSING}".to_owned(), "languages.file")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in languages.file: ${EXPLAINER_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_bare_dollar_kept() {
        let result = expand_path_var("data/$langs.yml".to_owned(), "languages.file");
        assert_eq!(result.unwrap(), "data/$langs.yml");
    }

    #[test]
    fn test_load_expands_before_resolving() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[store]\ndir = \"${EXPLAINER_TEST_STORE_UNSET:-stored}\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.store_resolved.dir, temp.path().join("stored"));
    }
}
