//! Precedence resolution for configuration.
//!
//! Highest to lowest:
//!
//! 1. CLI flags (including their environment variable forms)
//! 2. config.kdl in the data directory
//! 3. Built-in defaults

use crate::config::{AgriConfig, OutputFormat};
use crate::flows::Latency;
use crate::models::Theme;
use serde::Serialize;
use std::time::Duration;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Value from a CLI flag or its environment variable
    Cli,
    /// Value from config.kdl
    Config,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Cli => write!(f, "cli"),
            ValueSource::Config => write!(f, "config"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_format: Option<OutputFormat>,
    pub latency_ms: Option<u64>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_latency_ms(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub default_theme: Resolved<Theme>,
    pub output_format: Resolved<OutputFormat>,
    /// `None` means each flow keeps its own built-in delay
    pub latency_ms: Resolved<Option<u64>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            default_theme: Resolved::new(Theme::default(), ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            latency_ms: Resolved::new(None, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn default_theme(&self) -> Theme {
        self.default_theme.value
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    pub fn human(&self) -> bool {
        self.output_format.value == OutputFormat::Human
    }

    /// Delays for the simulated flows.
    pub fn latency(&self) -> Latency {
        match self.latency_ms.value {
            Some(ms) => Latency::uniform(Duration::from_millis(ms)),
            None => Latency::default(),
        }
    }
}

/// Resolve configuration from overrides and the config file.
pub fn resolve_config(file: &AgriConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    if let Some(theme) = file.default_theme {
        result.default_theme = Resolved::new(theme, ValueSource::Config);
    }

    if let Some(format) = overrides.output_format {
        result.output_format = Resolved::new(format, ValueSource::Cli);
    } else if let Some(format) = file.output_format {
        result.output_format = Resolved::new(format, ValueSource::Config);
    }

    if let Some(ms) = overrides.latency_ms {
        result.latency_ms = Resolved::new(Some(ms), ValueSource::Cli);
    } else if let Some(ms) = file.latency_ms {
        result.latency_ms = Resolved::new(Some(ms), ValueSource::Config);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_set() {
        let resolved = resolve_config(&AgriConfig::new(), &ConfigOverrides::new());
        assert_eq!(resolved.output_format.source, ValueSource::Default);
        assert_eq!(resolved.default_theme(), Theme::Green);
        assert_eq!(resolved.latency(), Latency::default());
    }

    #[test]
    fn test_config_file_beats_default() {
        let file = AgriConfig {
            default_theme: Some(Theme::Earth),
            output_format: Some(OutputFormat::Human),
            latency_ms: Some(10),
        };
        let resolved = resolve_config(&file, &ConfigOverrides::new());
        assert_eq!(resolved.default_theme.source, ValueSource::Config);
        assert!(resolved.human());
        assert_eq!(resolved.latency().chat, Duration::from_millis(10));
    }

    #[test]
    fn test_cli_beats_config_file() {
        let file = AgriConfig {
            output_format: Some(OutputFormat::Human),
            latency_ms: Some(1000),
            ..AgriConfig::default()
        };
        let overrides = ConfigOverrides::new()
            .with_output_format(OutputFormat::Json)
            .with_latency_ms(0);
        let resolved = resolve_config(&file, &overrides);
        assert_eq!(resolved.output_format, Resolved::new(OutputFormat::Json, ValueSource::Cli));
        assert_eq!(resolved.latency(), Latency::none());
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::Cli.to_string(), "cli");
        assert_eq!(ValueSource::Config.to_string(), "config");
        assert_eq!(ValueSource::Default.to_string(), "default");
    }
}
