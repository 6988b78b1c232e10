//! Configuration structures for hotrun.
//!
//! This module provides configuration types for all components of the supervisor:
//!
//! - [`PathsConfig`] - Source and runtime tree names, runtime env variable
//! - [`CompilerConfig`] - External compiler command and transformable extensions
//! - [`ProcessConfig`] - Interpreter used to run the runtime entry file
//! - [`WatchConfig`] - File watcher settings
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`]. A JSON file may override any
//! subset of fields; missing fields keep their defaults.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default name of the optional configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "hotrun.json";

/// Placeholder in compiler arguments that is replaced with the source path.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Source and runtime tree settings.
///
/// # Examples
///
/// ```
/// use hr_core::PathsConfig;
///
/// let paths = PathsConfig::default();
/// assert_eq!(paths.source_dir, "app");
/// assert_eq!(paths.runtime_dir, "runtime");
/// assert_eq!(paths.env_var, "APP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source tree, used when the script has no parent directory.
    pub source_dir: Utf8PathBuf,

    /// Runtime (mirror) tree that receives compiled and copied files.
    pub runtime_dir: Utf8PathBuf,

    /// Environment variable that tells the child which tree it runs from.
    pub env_var: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: Utf8PathBuf::from("app"),
            runtime_dir: Utf8PathBuf::from("runtime"),
            env_var: "APP".to_owned(),
        }
    }
}

/// External compiler settings.
///
/// The compiler receives the file contents on stdin and must write the
/// transformed source to stdout. Every [`FILE_PLACEHOLDER`] in `args` is
/// replaced with the source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler executable.
    pub program: String,

    /// Arguments passed to the compiler.
    pub args: Vec<String>,

    /// File suffixes that go through the compiler. Everything else is copied.
    pub extensions: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "node_modules/.bin/babel".to_owned(),
            args: vec!["--filename".to_owned(), FILE_PLACEHOLDER.to_owned()],
            extensions: vec![
                ".js".to_owned(),
                ".jsx".to_owned(),
                ".es6".to_owned(),
                ".es".to_owned(),
            ],
        }
    }
}

/// Settings for the supervised child process.
///
/// The child is launched as `interpreter args... <entry file>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Program that runs the entry file.
    pub interpreter: String,

    /// Arguments placed before the entry file.
    pub args: Vec<String>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            interpreter: "node".to_owned(),
            args: Vec::new(),
        }
    }
}

/// Configuration for the file watcher.
///
/// The debounce window is fixed and not part of the configuration.
///
/// # Examples
///
/// ```
/// use hr_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { recursive: true }
    }
}

/// Root configuration for hotrun.
///
/// # Examples
///
/// ```
/// use hr_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
///
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("runtime"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source and runtime trees.
    pub paths: PathsConfig,

    /// External compiler.
    pub compiler: CompilerConfig,

    /// Supervised child process.
    pub process: ProcessConfig,

    /// File watcher.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path, "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;

        tracing::debug!(path = %path, "Loaded configuration file");
        Ok(config)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiler.program.trim().is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "compiler.program".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.compiler.extensions.is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "compiler.extensions".to_owned(),
                reason: "at least one extension is required".to_owned(),
            });
        }
        if self.process.interpreter.trim().is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "process.interpreter".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.paths.env_var.is_empty() || self.paths.env_var.contains('=') {
            return Err(ConfigError::InvalidOption {
                option: "paths.env_var".to_owned(),
                reason: "must be a non-empty name without '='".to_owned(),
            });
        }
        if self.paths.runtime_dir.as_str().is_empty() {
            return Err(ConfigError::InvalidPath {
                path: self.paths.runtime_dir.clone(),
                reason: "runtime directory must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_config_defaults() {
        let config = PathsConfig::default();
        assert_eq!(config.source_dir, "app");
        assert_eq!(config.runtime_dir, "runtime");
        assert_eq!(config.env_var, "APP");
    }

    #[test]
    fn test_compiler_config_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.extensions, vec![".js", ".jsx", ".es6", ".es"]);
        assert!(config.args.iter().any(|a| a == FILE_PLACEHOLDER));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"paths": {"runtime_dir": "dist"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.paths.runtime_dir, "dist");
        assert_eq!(config.paths.source_dir, "app");
        assert_eq!(config.process.interpreter, "node");
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.compiler.extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("compiler.extensions"));
    }

    #[test]
    fn test_validate_rejects_bad_env_var() {
        let mut config = Config::default();
        config.paths.env_var = "A=B".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join(DEFAULT_CONFIG_FILE);
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, r#"{"process": {"interpreter": "deno", "args": ["run"]}}"#)
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.process.interpreter, "deno");
        assert_eq!(config.process.args, vec!["run"]);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
