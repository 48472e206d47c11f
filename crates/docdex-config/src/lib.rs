//! Configuration management for docdex.
//!
//! Parses `docdex.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [source]
//! repo = "git@github.com:Dyalog/documentation.git"
//! branch = "main"
//! nav_file = "mkdocs.yml"
//! docs_dir = "docs"
//! extension = "md"
//!
//! [symbols]
//! file = "symbol-urls.json"
//!
//! [output]
//! database = "docdex.db"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `source.repo` and `source.branch` support `${VAR}` and `${VAR:-default}`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Use an existing local documentation tree.
    pub source_dir: Option<PathBuf>,
    /// Clone the documentation tree from this repository.
    pub repo: Option<String>,
    /// Branch to clone.
    pub branch: Option<String>,
    /// Override symbol list path.
    pub symbols_file: Option<PathBuf>,
    /// Override output database path.
    pub database: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docdex.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation source (paths are relative strings from TOML).
    source: SourceConfigRaw,
    /// Symbol list configuration.
    symbols: SymbolsConfigRaw,
    /// Output configuration.
    output: OutputConfigRaw,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved symbol list path (set after loading).
    #[serde(skip)]
    pub symbols_file: Option<PathBuf>,
    /// Resolved database path (set after loading).
    #[serde(skip)]
    pub database: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw source configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    repo: Option<String>,
    branch: Option<String>,
    dir: Option<String>,
    nav_file: Option<String>,
    docs_dir: Option<String>,
    extension: Option<String>,
}

/// Raw symbol list configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SymbolsConfigRaw {
    file: Option<String>,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    database: Option<String>,
}

/// Resolved documentation source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Repository to clone when no local tree is configured.
    pub repo: Option<String>,
    /// Branch to clone.
    pub branch: String,
    /// Local documentation tree root.
    pub dir: Option<PathBuf>,
    /// Navigation config filename at the tree root.
    pub nav_file: String,
    /// Default document root name.
    pub docs_dir: String,
    /// Document file extension, without the dot.
    pub extension: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo: None,
            branch: "main".to_owned(),
            dir: None,
            nav_file: "mkdocs.yml".to_owned(),
            docs_dir: "docs".to_owned(),
            extension: "md".to_owned(),
        }
    }
}

/// Where the documentation tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation<'a> {
    /// Existing directory.
    Local(&'a Path),
    /// Repository to clone.
    Remote { repo: &'a str, branch: &'a str },
}

impl SourceConfig {
    /// Resolve where the tree comes from. A local directory wins over a repository.
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation<'_>> {
        match (&self.dir, &self.repo) {
            (Some(dir), _) => Some(SourceLocation::Local(dir)),
            (None, Some(repo)) => Some(SourceLocation::Remote {
                repo,
                branch: &self.branch,
            }),
            (None, None) => None,
        }
    }
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
        /// Config field path (e.g., "`source.repo`").
        field: String,
        /// Error message (e.g., "${`DOCS_REPO`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docdex.toml` in current directory and parents.
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
        } else if let Some(discovered) = Self::discover_config() {
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
    ///
    /// A source directory and a repository are mutually exclusive: setting one
    /// clears the other.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.source_resolved.dir = Some(source_dir.clone());
            self.source_resolved.repo = None;
        }
        if let Some(repo) = &settings.repo {
            self.source_resolved.repo = Some(repo.clone());
            self.source_resolved.dir = None;
        }
        if let Some(branch) = &settings.branch {
            self.source_resolved.branch.clone_from(branch);
        }
        if let Some(symbols_file) = &settings.symbols_file {
            self.symbols_file = Some(symbols_file.clone());
        }
        if let Some(database) = &settings.database {
            self.database.clone_from(database);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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
    ///
    /// Without a config file the base directory itself is the documentation tree.
    fn default_with_base(base: &Path) -> Self {
        Self {
            source: SourceConfigRaw::default(),
            symbols: SymbolsConfigRaw::default(),
            output: OutputConfigRaw::default(),
            source_resolved: SourceConfig {
                dir: Some(base.to_path_buf()),
                ..SourceConfig::default()
            },
            symbols_file: None,
            database: base.join("docdex.db"),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = &self.source_resolved;
        require_non_empty(&source.branch, "source.branch")?;
        require_non_empty(&source.nav_file, "source.nav_file")?;
        require_non_empty(&source.docs_dir, "source.docs_dir")?;
        require_non_empty(&source.extension, "source.extension")?;

        if source.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "source.extension must not start with '.'".to_owned(),
            ));
        }
        if let Some(repo) = &source.repo {
            require_non_empty(repo, "source.repo")?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref repo) = self.source.repo {
            self.source.repo = Some(expand::expand_env(repo, "source.repo")?);
        }
        if let Some(ref branch) = self.source.branch {
            self.source.branch = Some(expand::expand_env(branch, "source.branch")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory and fill in defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = SourceConfig::default();
        let raw = &self.source;

        let dir = match (&raw.dir, &raw.repo) {
            (Some(dir), _) => Some(config_dir.join(dir)),
            (None, Some(_)) => None,
            (None, None) => Some(config_dir.to_path_buf()),
        };

        self.source_resolved = SourceConfig {
            repo: raw.repo.clone(),
            branch: raw.branch.clone().unwrap_or(defaults.branch),
            dir,
            nav_file: raw.nav_file.clone().unwrap_or(defaults.nav_file),
            docs_dir: raw.docs_dir.clone().unwrap_or(defaults.docs_dir),
            extension: raw.extension.clone().unwrap_or(defaults.extension),
        };
        self.symbols_file = self.symbols.file.as_ref().map(|f| config_dir.join(f));
        self.database = config_dir.join(self.output.database.as_deref().unwrap_or("docdex.db"));
    }
}
