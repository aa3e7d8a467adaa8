//! Configuration management for tabgen
//!
//! This module handles loading and validating the user configuration file.
//! Every section is optional; a missing file yields the defaults.
//!
//! ```toml
//! [generate]
//! default_shell = "zsh"
//! case_insensitive = false
//! preamble = "~/.config/tabgen/preamble.sh"
//!
//! [providers.git-branches]
//! bash = "_my_git_branches"
//! fish = "__my_git_branches"
//!
//! [logging]
//! level = "warn"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::completion::MatchCase;
use crate::error::{ConfigError, Result};
use crate::render::{ProviderTable, Shell};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Script generation defaults
    #[serde(default)]
    pub generate: GenerateConfig,

    /// Native provider bindings, keyed by provider id
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderBinding>,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for the `generate` command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateConfig {
    /// Shell used when `--shell` is not given
    #[serde(default = "default_shell")]
    pub default_shell: Shell,

    /// Filter candidates without regard to case
    #[serde(default)]
    pub case_insensitive: bool,

    /// File whose contents are spliced into every script before registration
    #[serde(default)]
    pub preamble: Option<PathBuf>,
}

/// Native function names implementing one provider id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderBinding {
    #[serde(default)]
    pub bash: Option<String>,

    #[serde(default)]
    pub zsh: Option<String>,

    #[serde(default)]
    pub fish: Option<String>,
}

impl ProviderBinding {
    /// Bound function for `shell`, if any
    pub fn for_shell(&self, shell: Shell) -> Option<&str> {
        match shell {
            Shell::Bash => self.bash.as_deref(),
            Shell::Zsh => self.zsh.as_deref(),
            Shell::Fish => self.fish.as_deref(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Prefix log lines with a timestamp
    #[serde(default)]
    pub timestamps: bool,
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions
fn default_shell() -> Shell {
    Shell::Bash
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generate: GenerateConfig::default(),
            providers: BTreeMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            default_shell: default_shell(),
            case_insensitive: false,
            preamble: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: false,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)?;
        Self::from_toml_str(&text)
    }

    /// `<config dir>/tabgen/config.toml`, or `./tabgen.toml` when the
    /// platform has no config directory
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("tabgen").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("tabgen.toml"))
    }

    /// Check provider bindings for unusable function names
    pub fn validate(&self) -> Result<()> {
        for (id, binding) in &self.providers {
            for shell in Shell::ALL {
                let Some(name) = binding.for_shell(shell) else {
                    continue;
                };
                if name.is_empty() || name.chars().any(char::is_whitespace) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("providers.{id}.{shell}"),
                        value: name.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Built-in providers extended with the configured bindings
    pub fn provider_table(&self) -> ProviderTable {
        let mut table = ProviderTable::builtin();
        for (id, binding) in &self.providers {
            for shell in Shell::ALL {
                if let Some(name) = binding.for_shell(shell) {
                    table.bind(id.as_str(), shell, name);
                }
            }
        }
        table
    }

    pub fn match_case(&self) -> MatchCase {
        if self.generate.case_insensitive {
            MatchCase::Insensitive
        } else {
            MatchCase::Sensitive
        }
    }

    /// Serialize the effective configuration
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabgenError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generate.default_shell, Shell::Bash);
        assert!(!config.generate.case_insensitive);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.providers.is_empty());
        assert_eq!(config.match_case(), MatchCase::Sensitive);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::from_toml_str(
            r#"
            [generate]
            default_shell = "fish"
            case_insensitive = true

            [providers.git-branches]
            bash = "_branches"
            "#,
        )
        .unwrap();

        assert_eq!(config.generate.default_shell, Shell::Fish);
        assert_eq!(config.match_case(), MatchCase::Insensitive);
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(
            config.providers["git-branches"].for_shell(Shell::Bash),
            Some("_branches")
        );
        assert_eq!(config.providers["git-branches"].for_shell(Shell::Zsh), None);
    }

    #[test]
    fn test_invalid_format() {
        let err = Config::from_toml_str("[generate]\ndefault_shell = \"tcsh\"").unwrap_err();
        assert!(matches!(err, TabgenError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_validate_rejects_bad_function_names() {
        let mut config = Config::default();
        config.providers.insert(
            "hosts".to_string(),
            ProviderBinding {
                zsh: Some("my hosts".to_string()),
                ..Default::default()
            },
        );

        match config.validate() {
            Err(TabgenError::Config(ConfigError::InvalidValue { field, value })) => {
                assert_eq!(field, "providers.hosts.zsh");
                assert_eq!(value, "my hosts");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        config.providers.get_mut("hosts").unwrap().zsh = Some(String::new());
        assert!(config.validate().is_err());

        config.providers.get_mut("hosts").unwrap().zsh = Some("_hosts".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_table_extends_builtins() {
        let mut config = Config::default();
        config.providers.insert(
            "hosts".to_string(),
            ProviderBinding {
                fish: Some("__hosts".to_string()),
                ..Default::default()
            },
        );

        let table = config.provider_table();
        assert_eq!(table.resolve("hosts", Shell::Fish), Some("__hosts"));
        assert_eq!(table.resolve("hosts", Shell::Bash), None);
        assert!(table.resolve("file-completer", Shell::Bash).is_some());
        assert_eq!(
            table.ids().collect::<Vec<_>>(),
            vec!["directory-completer", "file-completer", "hosts"]
        );
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load_from_file(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, TabgenError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[logging]\nlevel = \"debug\"\ntimestamps = true\n").unwrap();

        let config = Config::load_from_file(Some(path.as_path())).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.timestamps);
        assert_eq!(config.logging.level.to_tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut config = Config::default();
        config.generate.default_shell = Shell::Zsh;
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }
}
