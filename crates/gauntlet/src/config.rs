//! Session configuration.
//!
//! [`Config`] is the single source of truth for how a session renders and
//! behaves, independent of where the values came from (code, environment
//! or a command line).
//!
//! # Examples
//!
//! ```rust
//! use gauntlet::{ColorMode, Config};
//!
//! let config = Config {
//!     width: 80,
//!     color_mode: ColorMode::Never,
//!     ..Config::default()
//! };
//! assert!(config.validate().is_ok());
//! assert!(!config.use_color(true));
//! ```

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default report width in characters.
pub const DEFAULT_WIDTH: usize = 110;

/// Narrowest report the layout supports.
pub const MIN_WIDTH: usize = 40;

/// Environment variable overriding [`Config::width`].
pub const ENV_WIDTH: &str = "GAUNTLET_WIDTH";
/// Environment variable overriding [`Config::color_mode`].
pub const ENV_COLOR: &str = "GAUNTLET_COLOR";
/// Environment variable enabling [`Config::backtraces`].
pub const ENV_BACKTRACE: &str = "GAUNTLET_BACKTRACE";
/// Environment variable enabling [`Config::abort_on_failure`].
pub const ENV_ABORT_ON_FAILURE: &str = "GAUNTLET_ABORT_ON_FAILURE";
/// Environment variable setting [`Config::filter`].
pub const ENV_FILTER: &str = "GAUNTLET_FILTER";

/// Runtime configuration for a test session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Total report width in characters.
    pub width: usize,

    /// Color output mode.
    pub color_mode: ColorMode,

    /// Capture and print a backtrace for panicking cases.
    pub backtraces: bool,

    /// Stop the session at the first failed invocation.
    ///
    /// The failure surfaces as a session fault instead of a counted case
    /// failure, which is handy when stepping through a single failing case.
    pub abort_on_failure: bool,

    /// Only run cases whose name contains this substring.
    pub filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            color_mode: ColorMode::Auto,
            backtraces: false,
            abort_on_failure: false,
            filter: None,
        }
    }
}

impl Config {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from the process environment.
    ///
    /// Unset variables keep their defaults. `NO_COLOR` forces
    /// [`ColorMode::Never`] unless `GAUNTLET_COLOR` says otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(width) = lookup(ENV_WIDTH) {
            config.width = width
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidWidth(width.clone()))?;
        }

        if let Some(mode) = lookup(ENV_COLOR) {
            config.color_mode = mode.parse()?;
        } else if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            config.color_mode = ColorMode::Never;
        }

        config.backtraces = lookup(ENV_BACKTRACE).is_some_and(|v| is_truthy(&v));
        config.abort_on_failure = lookup(ENV_ABORT_ON_FAILURE).is_some_and(|v| is_truthy(&v));
        config.filter = lookup(ENV_FILTER).filter(|f| !f.is_empty());

        Ok(config)
    }

    /// Sets the report width.
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the color mode.
    #[must_use]
    pub const fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Enables or disables backtrace capture.
    #[must_use]
    pub const fn with_backtraces(mut self, enabled: bool) -> Self {
        self.backtraces = enabled;
        self
    }

    /// Enables or disables aborting on the first failure.
    #[must_use]
    pub const fn with_abort_on_failure(mut self, enabled: bool) -> Self {
        self.abort_on_failure = enabled;
        self
    }

    /// Only run cases whose name contains `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Check if colors should be used.
    ///
    /// `is_terminal` tells whether the report goes to an interactive terminal.
    #[must_use]
    pub fn use_color(&self, is_terminal: bool) -> bool {
        match self.color_mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => is_terminal && env::var_os("NO_COLOR").is_none_or(|v| v.is_empty()),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the width is too small for the report layout.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_WIDTH {
            return Err(ConfigError::WidthTooSmall {
                width: self.width,
                minimum: MIN_WIDTH,
            });
        }
        Ok(())
    }

    /// Export configuration as a diagnostic string.
    #[must_use]
    pub fn to_diagnostic_string(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Width: {}", self.width));
        lines.push(format!("Color mode: {:?}", self.color_mode));
        lines.push(format!(
            "Backtraces: {}",
            if self.backtraces { "on" } else { "off" }
        ));
        lines.push(format!(
            "Abort on failure: {}",
            if self.abort_on_failure { "on" } else { "off" }
        ));
        if let Some(ref filter) = self.filter {
            lines.push(format!("Filter: {filter}"));
        }

        lines.join("\n")
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when writing to a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always use colors and cursor movement.
    Always,
    /// Plain text only.
    Never,
}

impl FromStr for ColorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(ConfigError::InvalidColorMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.color_mode, ColorMode::Auto);
        assert!(!config.backtraces);
        assert!(!config.abort_on_failure);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_from_lookup_reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_WIDTH, "80"),
            (ENV_COLOR, "always"),
            (ENV_BACKTRACE, "1"),
            (ENV_ABORT_ON_FAILURE, "yes"),
            (ENV_FILTER, "add"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.width, 80);
        assert_eq!(config.color_mode, ColorMode::Always);
        assert!(config.backtraces);
        assert!(config.abort_on_failure);
        assert_eq!(config.filter.as_deref(), Some("add"));
    }

    #[test]
    fn test_no_color_forces_never() {
        let config = Config::from_lookup(lookup(&[("NO_COLOR", "1")])).expect("valid");
        assert_eq!(config.color_mode, ColorMode::Never);

        let config = Config::from_lookup(lookup(&[("NO_COLOR", "1"), (ENV_COLOR, "always")]))
            .expect("valid");
        assert_eq!(config.color_mode, ColorMode::Always);
    }

    #[test]
    fn test_invalid_overrides() {
        assert_eq!(
            Config::from_lookup(lookup(&[(ENV_WIDTH, "wide")])),
            Err(ConfigError::InvalidWidth("wide".into()))
        );
        assert!(matches!(
            Config::from_lookup(lookup(&[(ENV_COLOR, "rainbow")])),
            Err(ConfigError::InvalidColorMode(_))
        ));
    }

    #[test]
    fn test_validate_width() {
        assert!(Config::new().with_width(MIN_WIDTH).validate().is_ok());
        assert_eq!(
            Config::new().with_width(10).validate(),
            Err(ConfigError::WidthTooSmall {
                width: 10,
                minimum: MIN_WIDTH
            })
        );
    }

    #[test]
    fn test_use_color() {
        assert!(Config::new().with_color_mode(ColorMode::Always).use_color(false));
        assert!(!Config::new().with_color_mode(ColorMode::Never).use_color(true));
        assert!(!Config::new().use_color(false));
    }

    #[test]
    fn test_serde_roundtrip_uses_lowercase_modes() {
        let config = Config::new().with_color_mode(ColorMode::Never).with_filter("x");
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(json.contains("\"never\""));
        let back: Config = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);

        let partial: Config = serde_json::from_str(r#"{"width": 90}"#).expect("defaults fill in");
        assert_eq!(partial.width, 90);
        assert_eq!(partial.color_mode, ColorMode::Auto);
    }

    #[test]
    fn test_diagnostic_string() {
        let text = Config::new().with_filter("math").to_diagnostic_string();
        assert!(text.contains("Width: 110"));
        assert!(text.contains("Filter: math"));
    }
}
