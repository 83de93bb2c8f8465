//! Configuration for AgriPulse.
//!
//! ## config.kdl - User preferences
//!
//! Located next to the data files (`~/.local/share/agripulse/config.kdl`,
//! or under `$AGRIPULSE_DATA_DIR`).
//!
//! Contains:
//! - `default-theme` - Theme used until the user picks one
//! - `output-format` - "json" or "human"
//! - `latency-ms` - Delay applied to every simulated flow
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > defaults. Use the [`resolver`] module for
//! resolution with source tracking.

pub mod resolver;
pub mod schema;

pub use resolver::{ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config};
pub use schema::{AgriConfig, ConfigKey, OutputFormat};

use crate::{Error, Result};
use kdl::KdlDocument;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.kdl";

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Read config.kdl from `data_dir`. A missing file is an empty config.
pub fn load_config(data_dir: &Path) -> Result<AgriConfig> {
    let path = config_path(data_dir);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AgriConfig::new()),
        Err(e) => return Err(e.into()),
    };
    let doc: KdlDocument = contents
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = AgriConfig::from_kdl(&doc);
    config.validate().map_err(Error::Config)?;
    Ok(config)
}

/// Write config.kdl into `data_dir`.
pub fn save_config(data_dir: &Path, config: &AgriConfig) -> Result<()> {
    config.validate().map_err(Error::Config)?;
    fs::create_dir_all(data_dir)?;
    let header = "// AgriPulse preferences\n";
    fs::write(
        config_path(data_dir),
        format!("{}{}", header, config.to_kdl()),
    )?;
    tracing::debug!("Wrote {}", config_path(data_dir).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_missing_file_is_empty_config() {
        let env = TestEnv::new();
        assert_eq!(load_config(env.data_path()).unwrap(), AgriConfig::new());
    }

    #[test]
    fn test_save_then_load() {
        let env = TestEnv::new();
        let mut config = AgriConfig::new();
        config.default_theme = Some(Theme::Blue);
        config.latency_ms = Some(0);
        save_config(env.data_path(), &config).unwrap();
        assert_eq!(load_config(env.data_path()).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let env = TestEnv::new();
        fs::write(config_path(env.data_path()), "default-theme \"unterminated").unwrap();
        assert!(matches!(load_config(env.data_path()), Err(Error::Config(_))));
    }
}
