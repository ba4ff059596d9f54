//! Configuration management for dtsflat.
//!
//! Parses `dtsflat.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `output.dir`
//! - `api.base_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override API base URL used in locators.
    pub base_url: Option<String>,
    /// Override generated id prefix.
    pub id_prefix: Option<String>,
    /// Override segmentation mode.
    pub mode: Option<SplitMode>,
    /// Override positional marker element name.
    pub marker: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dtsflat.toml";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "/api/dts";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Locator configuration.
    pub api: ApiConfig,
    /// Identifier allocation configuration.
    pub ids: IdsConfig,
    /// Segmentation configuration.
    pub split: SplitConfig,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Directory receiving all generated artifacts.
    pub dir: PathBuf,
}

/// Locator configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix prepended to the `document` and `navigation` endpoints.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

/// Identifier allocation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IdsConfig {
    /// Prefix of generated fragment ids (`{prefix}-{kind}{n}`).
    pub prefix: String,
}

impl Default for IdsConfig {
    fn default() -> Self {
        Self {
            prefix: "genid".to_owned(),
        }
    }
}

/// Segmentation policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// One fragment per `div`, nested like the source.
    #[default]
    Structural,
    /// One flat fragment per marker element.
    Positional,
}

/// Segmentation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Segmentation policy.
    pub mode: SplitMode,
    /// Local name of the marker element for positional mode.
    pub marker: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            mode: SplitMode::Structural,
            marker: "pb".to_owned(),
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
        /// Config field path (e.g., "`api.base_url`").
        field: String,
        /// Error message (e.g., "${`DTS_BASE`} not set").
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

/// Require a name usable as an XML local name or id segment.
fn require_simple_name(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | ':' | '<' | '>' | '&' | '"'))
    {
        return Err(ConfigError::Validation(format!(
            "{field} contains invalid characters: {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dtsflat.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the final configuration is invalid.
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

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.api.base_url.clone_from(base_url);
        }
        if let Some(prefix) = &settings.id_prefix {
            self.ids.prefix.clone_from(prefix);
        }
        if let Some(mode) = settings.mode {
            self.split.mode = mode;
        }
        if let Some(marker) = &settings.marker {
            self.split.marker.clone_from(marker);
        }
    }

    /// Base URL with trailing slashes removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
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
    fn default_with_base(base: &Path) -> Self {
        Self {
            output: OutputConfigRaw::default(),
            api: ApiConfig::default(),
            ids: IdsConfig::default(),
            split: SplitConfig::default(),
            output_resolved: OutputConfig {
                dir: base.join("build"),
            },
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

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`] after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_api()?;
        self.validate_ids()?;
        require_simple_name(&self.split.marker, "split.marker")?;
        Ok(())
    }

    /// Validate locator configuration.
    fn validate_api(&self) -> Result<(), ConfigError> {
        let url = &self.api.base_url;

        // Empty base URL yields host-relative locators like "/navigation?id=..."
        if url.is_empty() {
            return Ok(());
        }
        if !url.starts_with('/') && !url.starts_with("http://") && !url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "api.base_url must be an absolute path or start with http:// or https://"
                    .to_owned(),
            ));
        }
        if url.contains(['?', '#']) {
            return Err(ConfigError::Validation(
                "api.base_url cannot contain a query or fragment".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate identifier allocation configuration.
    fn validate_ids(&self) -> Result<(), ConfigError> {
        require_simple_name(&self.ids.prefix, "ids.prefix")?;
        if self.ids.prefix.ends_with('-') {
            return Err(ConfigError::Validation(
                "ids.prefix cannot end with '-'".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_in_place(&mut self.api.base_url, "api.base_url")?;
        if let Some(dir) = self.output.dir.as_mut() {
            expand::expand_in_place(dir, "output.dir")?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            dir: config_dir.join(self.output.dir.as_deref().unwrap_or("build")),
        };
    }
}
