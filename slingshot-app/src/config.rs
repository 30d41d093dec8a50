//! Configuration file
//!
//! Looked up at `~/.config/slingshot/config.toml` (or the platform equivalent
//! from `dirs::config_dir()`) unless `--config` names a file. Every field is
//! optional.
//!
//! ```toml
//! app_title = "Slingshot"
//! initial_path = "/"
//!
//! [layout]
//! media_query = "(min-width: 768px)"
//! cell_width_px = 8
//!
//! [connectivity]
//! probe_addr = "1.1.1.1:53"
//!
//! [keybindings]
//! open_menu = ["m", "f2"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slingshot::{Breakpoint, BreakpointError, Keybindings};
use slingshot_components::NavLink;
use thiserror::Error;

use crate::commands::{default_keybindings, Command};
use crate::shell::ShellOptions;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid media query: {0}")]
    MediaQuery(#[from] BreakpointError),

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_title: String,
    pub footer: String,
    /// Origin internal links must share, e.g. `app://slingshot`
    pub origin: String,
    pub initial_path: String,
    pub layout: LayoutConfig,
    pub connectivity: ConnectivityConfig,
    pub snackbar: SnackbarConfig,
    pub links: Vec<LinkConfig>,
    /// Overrides merged onto the default bindings
    pub keybindings: Keybindings<Command>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub media_query: String,
    pub cell_width_px: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Without probing the shell stays in its initial connectivity state
    pub enabled: bool,
    pub probe_addr: String,
    pub interval_secs: u64,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnackbarConfig {
    pub timeout_ms: u64,
}

/// A navigation drawer entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub label: String,
    pub href: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_title: "Slingshot".into(),
            footer: "PWA Slingshot".into(),
            origin: "app://slingshot".into(),
            initial_path: "/".into(),
            layout: LayoutConfig::default(),
            connectivity: ConnectivityConfig::default(),
            snackbar: SnackbarConfig::default(),
            links: vec![LinkConfig {
                label: "Home".into(),
                href: "/home".into(),
            }],
            keybindings: Keybindings::new(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            media_query: Breakpoint::DEFAULT.to_string(),
            cell_width_px: 8,
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_addr: "1.1.1.1:53".into(),
            interval_secs: 5,
            timeout_ms: 1500,
        }
    }
}

impl Default for SnackbarConfig {
    fn default() -> Self {
        Self { timeout_ms: 3000 }
    }
}

impl Config {
    /// Returns the path to the default configuration file.
    ///
    /// Falls back to the current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("slingshot").join("config.toml")
    }

    /// Load configuration
    ///
    /// - With an explicit `path`, the file must exist.
    /// - Otherwise the default path is used, and a missing file yields
    ///   `Config::default()`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;

        config.validate()?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.breakpoint()?;

        if self.layout.cell_width_px == 0 {
            return Err(invalid("layout.cell_width_px must be greater than zero"));
        }
        if !self.initial_path.starts_with('/') {
            return Err(invalid(format!(
                "initial_path '{}' must start with '/'",
                self.initial_path
            )));
        }
        if self.origin.trim().is_empty() {
            return Err(invalid("origin must not be empty"));
        }
        if self.connectivity.enabled {
            if self.connectivity.interval_secs == 0 {
                return Err(invalid("connectivity.interval_secs must be greater than zero"));
            }
            if self.connectivity.probe_addr.trim().is_empty() {
                return Err(invalid("connectivity.probe_addr must not be empty"));
            }
        }
        Ok(())
    }

    pub fn breakpoint(&self) -> Result<Breakpoint, ConfigError> {
        Ok(Breakpoint::parse(&self.layout.media_query)?)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity.timeout_ms)
    }

    /// Shell settings with user keybindings merged onto the defaults
    pub fn shell_options(&self) -> Result<ShellOptions, ConfigError> {
        Ok(ShellOptions {
            app_title: self.app_title.clone(),
            footer: self.footer.clone(),
            breakpoint: self.breakpoint()?,
            cell_width_px: self.layout.cell_width_px,
            snackbar_timeout: Duration::from_millis(self.snackbar.timeout_ms),
            links: self
                .links
                .iter()
                .map(|link| NavLink::new(link.label.as_str(), link.href.as_str()))
                .collect(),
            keybindings: Keybindings::merge(default_keybindings(), self.keybindings.clone()),
        })
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slingshot::testing::{char_key, key};

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();

        config.validate().unwrap();
        assert_eq!(config.breakpoint().unwrap(), Breakpoint::DEFAULT);
        assert_eq!(config.snackbar.timeout_ms, 3000);
    }

    #[test]
    fn test_config_path_ends_with_expected() {
        assert!(Config::config_path().ends_with("slingshot/config.toml"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            app_title = "Demo"

            [layout]
            media_query = "(min-width: 1024px)"
            "#,
        )
        .unwrap();

        assert_eq!(config.app_title, "Demo");
        assert_eq!(config.footer, "PWA Slingshot");
        assert_eq!(config.layout.cell_width_px, 8);
        assert_eq!(config.breakpoint().unwrap(), Breakpoint::new(1024));
    }

    #[test]
    fn test_bad_media_query_fails_validation() {
        let mut config = Config::default();
        config.layout.media_query = "(max-width: 10px)".into();

        assert!(matches!(config.validate(), Err(ConfigError::MediaQuery(_))));
    }

    #[test]
    fn test_validation_rules() {
        let mut config = Config::default();
        config.initial_path = "home".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));

        let mut config = Config::default();
        config.layout.cell_width_px = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.connectivity.interval_secs = 0;
        assert!(config.validate().is_err());
        config.connectivity.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_keybinding_overrides_merge_onto_defaults() {
        let config: Config = toml::from_str(
            r#"
            [keybindings]
            open_menu = ["f2"]
            "#,
        )
        .unwrap();

        let options = config.shell_options().unwrap();

        assert_eq!(options.keybindings.command(key("f2")), Some(Command::OpenMenu));
        assert_eq!(options.keybindings.command(char_key('m')), None);
        assert_eq!(options.keybindings.command(char_key('q')), Some(Command::Quit));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "initial_path = \"/home\"\n[snackbar]\ntimeout_ms = 500\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.initial_path, "/home");
        assert_eq!(config.snackbar.timeout_ms, 500);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "app_title = [").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
