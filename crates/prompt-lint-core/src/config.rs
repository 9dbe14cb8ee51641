//! Configuration loading and discovery.
//!
//! This module provides configuration file discovery by:
//! 1. Walking up from the current directory to find project config
//! 2. Loading user config from XDG config directory
//! 3. Merging with sensible defaults
//!
//! # Supported formats
//!
//! The following configuration file formats are supported:
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - `PROMPT_LINT_*` environment variables (`__` separates nested keys)
//! - `prompt-lint.<ext>` in current directory or any parent
//! - `.prompt-lint.<ext>` in current directory or any parent
//! - `prompt.<ext>` in current directory or any parent
//! - `.prompt.<ext>` in current directory or any parent
//! - `~/.config/prompt-lint/config.<ext>` (user config)
//!
//! Where `<ext>` is one of: `toml`, `yaml`, `yml`, `json`
//!
//! When multiple files exist in the same directory, all are merged via figment.
//! Later extensions override earlier: toml < yaml < yml < json.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use prompt_lint_core::config::{Config, ConfigLoader};
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let (config, _sources) = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! assert!(config.analyzer.validate().is_ok());
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::reports::Severity;
use crate::error::{AnalysisError, AnalysisResult, ConfigError, ConfigResult};
use crate::tokens::Encoding;

/// Default maximum prompt length, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 200_000;

/// Default price per 1,000 input tokens.
pub const DEFAULT_TOKEN_PRICE_PER_1K: f64 = 0.003;

/// Weights for combining the four analyzer scores into the overall score.
///
/// Weights are normalized by their sum, so they need not add up to 1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of the ambiguity clarity score.
    pub clarity: f64,
    /// Weight of the token efficiency score.
    pub efficiency: f64,
    /// Weight of the success probability.
    pub success: f64,
    /// Weight of the security score.
    pub security: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            clarity: 0.25,
            efficiency: 0.20,
            success: 0.35,
            security: 0.20,
        }
    }
}

impl ScoreWeights {
    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.clarity + self.efficiency + self.success + self.security
    }
}

/// Settings that control the analyzers.
///
/// Validated once by [`AnalyzerConfig::validate`] when a
/// [`PromptAnalyzer`](crate::PromptAnalyzer) is built.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Run the ambiguity analyzer.
    pub enable_ambiguity: bool,
    /// Run the token-waste analyzer.
    pub enable_token_waste: bool,
    /// Run the success predictor.
    pub enable_success_prediction: bool,
    /// Run the security scanner.
    pub enable_security: bool,
    /// Tighten thresholds and broaden pattern tables.
    pub strict_mode: bool,
    /// Drop issues below this severity from the report.
    pub min_severity_to_report: Severity,
    /// Price per 1,000 input tokens, used for cost estimates.
    pub token_price_per_1k: f64,
    /// Reject prompts longer than this many characters.
    pub max_input_chars: usize,
    /// Reference tokenizer encoding.
    pub encoding: Encoding,
    /// Overall score weights.
    pub weights: ScoreWeights,
    /// Fewest words a well-specified prompt is expected to have.
    pub min_words: usize,
    /// Most words a focused prompt is expected to have.
    pub max_words: usize,
    /// Run analyzers on the rayon thread pool.
    pub parallel: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enable_ambiguity: true,
            enable_token_waste: true,
            enable_success_prediction: true,
            enable_security: true,
            strict_mode: false,
            min_severity_to_report: Severity::Low,
            token_price_per_1k: DEFAULT_TOKEN_PRICE_PER_1K,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            encoding: Encoding::Cl100k,
            weights: ScoreWeights::default(),
            min_words: 15,
            max_words: 500,
            parallel: false,
        }
    }
}

impl AnalyzerConfig {
    /// Check that every value is in range.
    pub fn validate(&self) -> AnalysisResult<()> {
        let invalid = |msg: String| Err(AnalysisError::InvalidConfig(msg));

        if !self.token_price_per_1k.is_finite() || self.token_price_per_1k < 0.0 {
            return invalid(format!(
                "token_price_per_1k must be a finite, non-negative number (got {})",
                self.token_price_per_1k
            ));
        }
        if self.max_input_chars == 0 {
            return invalid("max_input_chars must be at least 1".to_string());
        }
        let w = &self.weights;
        for (name, value) in [
            ("clarity", w.clarity),
            ("efficiency", w.efficiency),
            ("success", w.success),
            ("security", w.security),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!(
                    "weights.{name} must be a finite, non-negative number (got {value})"
                ));
            }
        }
        if w.total() <= 0.0 {
            return invalid("at least one score weight must be positive".to_string());
        }
        if self.min_words == 0 || self.min_words > self.max_words {
            return invalid(format!(
                "expected 1 <= min_words <= max_words (got {}..{})",
                self.min_words, self.max_words
            ));
        }
        Ok(())
    }
}

/// The configuration for prompt-lint.
///
/// Deserialized from config files found during discovery (TOML, YAML, or
/// JSON) and from `PROMPT_LINT_*` environment variables.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (no file logging if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Default token budget for the `tokens` command.
    pub token_budget: Option<usize>,
    /// Analyzer settings.
    pub analyzer: AnalyzerConfig,
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Metadata about which configuration sources were loaded.
///
/// Returned alongside [`Config`] from [`ConfigLoader::load()`] so commands
/// can report the actual config files without re-discovering them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project config files found by walking up, ordered low→high precedence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// User config file from XDG config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Explicit config files loaded (e.g., from `--config` flag).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// Returns the highest-precedence config file that was loaded.
    ///
    /// Precedence: explicit files > project files > user file.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .map(Utf8PathBuf::as_path)
            .or_else(|| self.project_files.last().map(Utf8PathBuf::as_path))
            .or(self.user_file.as_deref())
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "prompt-lint";

/// Application names to search for config files (in precedence order, lowest first).
const APP_NAMES: &[&str] = &["prompt", "prompt-lint"];

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "PROMPT_LINT_";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load (for testing or programmatic use).
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    ///
    /// The loader will walk up from this directory looking for config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/prompt-lint/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Set a boundary marker to stop directory traversal.
    ///
    /// When walking up directories, stop if we find a directory containing
    /// this file or directory name. Default is `.git`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Disable boundary marker (search all the way to filesystem root).
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. `PROMPT_LINT_*` environment variables
    /// 2. Explicit files (in order added via `with_file`)
    /// 3. Project config (closest to search root)
    /// 4. User config (`~/.config/prompt-lint/config.<ext>`)
    /// 5. Default values
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let mut sources = ConfigSources::default();

        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
            sources.user_file = Some(user_config);
        }

        if let Some(ref root) = self.project_search_root {
            let project_configs = self.find_project_configs(root);
            for pc in &project_configs {
                figment = Self::merge_file(figment, pc);
            }
            sources.project_files = project_configs;
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }
        sources.explicit_files = self.explicit_files;

        // PROMPT_LINT_LOG_LEVEL=debug, PROMPT_LINT_ANALYZER__STRICT_MODE=true, etc.
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            strict = config.analyzer.strict_mode,
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// Load configuration, returning an error if no config file is found.
    pub fn load_or_error(self) -> ConfigResult<(Config, ConfigSources)> {
        let has_user = self.include_user_config && self.find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_ref()
            .is_some_and(|root| !self.find_project_configs(root).is_empty());
        let has_explicit = !self.explicit_files.is_empty();

        if !has_user && !has_project && !has_explicit {
            return Err(ConfigError::NotFound);
        }

        self.load()
    }

    /// Find project config files by walking up from the given directory.
    ///
    /// Returns all matching config files from the closest directory that has any
    /// match, ordered low-to-high precedence: `prompt` names before
    /// `prompt-lint` names, dotfiles before regular files within each app name.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let mut found = Vec::new();

            for app_name in APP_NAMES {
                for ext in CONFIG_EXTENSIONS {
                    let dotfile = dir.join(format!(".{app_name}.{ext}"));
                    if dotfile.is_file() {
                        found.push(dotfile);
                    }
                }
                for ext in CONFIG_EXTENSIONS {
                    let regular = dir.join(format!("{app_name}.{ext}"));
                    if regular.is_file() {
                        found.push(regular);
                    }
                }
            }

            if !found.is_empty() {
                return found;
            }

            // Boundary is checked after the config files so a config next to
            // the marker is still found.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}

/// Get the user config directory path.
///
/// Returns `~/.config/prompt-lint/` on Linux,
/// `~/Library/Application Support/prompt-lint/` on macOS, and equivalent on
/// other platforms.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}
