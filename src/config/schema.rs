//! KDL schema for config.kdl.
//!
//! ```kdl
//! // AgriPulse preferences
//! default-theme "theme-earth"
//! output-format "human"  // or "json"
//! latency-ms 0
//! ```

use crate::models::Theme;
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Longest simulated delay accepted, in milliseconds.
pub const MAX_LATENCY_MS: u64 = 60_000;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DefaultTheme,
    OutputFormat,
    LatencyMs,
}

impl ConfigKey {
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::DefaultTheme,
            ConfigKey::OutputFormat,
            ConfigKey::LatencyMs,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::DefaultTheme => "default-theme",
            ConfigKey::OutputFormat => "output-format",
            ConfigKey::LatencyMs => "latency-ms",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ConfigKey::all().iter().copied().find(|k| k.as_str() == s)
    }
}

/// User preferences stored in config.kdl. Unset values fall back to
/// built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgriConfig {
    /// Theme used until the user picks one
    pub default_theme: Option<Theme>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Delay applied to every simulated flow
    pub latency_ms: Option<u64>,
}

impl AgriConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ms) = self.latency_ms {
            if ms > MAX_LATENCY_MS {
                return Err(format!(
                    "latency-ms must be at most {}, got {}",
                    MAX_LATENCY_MS, ms
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document. Unknown nodes and unparseable
    /// values are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_string(doc, ConfigKey::DefaultTheme) {
            config.default_theme = Theme::parse(s);
        }

        if let Some(s) = first_string(doc, ConfigKey::OutputFormat) {
            config.output_format = OutputFormat::parse(s);
        }

        if let Some(node) = doc.get(ConfigKey::LatencyMs.as_str()) {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    config.latency_ms = u64::try_from(i).ok();
                }
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(theme) = self.default_theme {
            push_node(
                &mut doc,
                ConfigKey::DefaultTheme,
                KdlValue::String(theme.as_str().to_string()),
            );
        }

        if let Some(format) = self.output_format {
            push_node(
                &mut doc,
                ConfigKey::OutputFormat,
                KdlValue::String(format.as_str().to_string()),
            );
        }

        if let Some(ms) = self.latency_ms {
            push_node(&mut doc, ConfigKey::LatencyMs, KdlValue::Integer(ms as i128));
        }

        doc
    }

    /// Current value of `key` as text.
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::DefaultTheme => self.default_theme.map(|t| t.as_str().to_string()),
            ConfigKey::OutputFormat => self.output_format.map(|f| f.as_str().to_string()),
            ConfigKey::LatencyMs => self.latency_ms.map(|ms| ms.to_string()),
        }
    }

    /// Set `key` from text, validating the value.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        match key {
            ConfigKey::DefaultTheme => {
                self.default_theme = Some(Theme::parse(value).ok_or_else(|| {
                    format!(
                        "Invalid theme: {}. Valid values: theme-green, theme-blue, theme-earth",
                        value
                    )
                })?);
            }
            ConfigKey::OutputFormat => {
                self.output_format = Some(OutputFormat::parse(value).ok_or_else(|| {
                    format!("Invalid output format: {}. Valid values: json, human", value)
                })?);
            }
            ConfigKey::LatencyMs => {
                let ms: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("latency-ms must be a whole number, got {}", value))?;
                self.latency_ms = Some(ms);
            }
        }
        self.validate()
    }

    /// Clear `key` back to its built-in default.
    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::DefaultTheme => self.default_theme = None,
            ConfigKey::OutputFormat => self.output_format = None,
            ConfigKey::LatencyMs => self.latency_ms = None,
        }
    }
}

fn first_string(doc: &KdlDocument, key: ConfigKey) -> Option<&str> {
    doc.get(key.as_str())
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
}

fn push_node(doc: &mut KdlDocument, key: ConfigKey, value: KdlValue) {
    let mut node = KdlNode::new(key.as_str());
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let doc: KdlDocument = r#"
            default-theme "blue"
            output-format "human"
            latency-ms 250
        "#
        .parse()
        .unwrap();
        let config = AgriConfig::from_kdl(&doc);
        assert_eq!(config.default_theme, Some(Theme::Blue));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert_eq!(config.latency_ms, Some(250));
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let doc: KdlDocument = r#"
            default-theme "purple"
            output-format "yaml"
            latency-ms -5
        "#
        .parse()
        .unwrap();
        assert_eq!(AgriConfig::from_kdl(&doc), AgriConfig::default());
    }

    #[test]
    fn test_to_kdl_round_trip() {
        let config = AgriConfig {
            default_theme: Some(Theme::Earth),
            output_format: Some(OutputFormat::Json),
            latency_ms: Some(0),
        };
        let text = config.to_kdl().to_string();
        let doc: KdlDocument = text.parse().unwrap();
        assert_eq!(AgriConfig::from_kdl(&doc), config);
    }

    #[test]
    fn test_set_validates() {
        let mut config = AgriConfig::new();
        config.set(ConfigKey::DefaultTheme, "theme-blue").unwrap();
        assert_eq!(config.get(ConfigKey::DefaultTheme).as_deref(), Some("theme-blue"));
        assert!(config.set(ConfigKey::OutputFormat, "xml").is_err());
        assert!(config.set(ConfigKey::LatencyMs, "soon").is_err());
        assert!(config.set(ConfigKey::LatencyMs, "600000").is_err());
    }

    #[test]
    fn test_config_key_parse() {
        assert_eq!(ConfigKey::parse("latency-ms"), Some(ConfigKey::LatencyMs));
        assert_eq!(ConfigKey::parse("editor"), None);
    }
}
