//! Optional `.churnmap.toml` configuration. CLI flags always win over file
//! values; a missing file falls back to defaults.

use crate::io::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = ".churnmap.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChurnmapConfig {
    #[serde(default)]
    pub bugs: BugConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Bug-fix classification patterns, matched against commit messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BugConfig {
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_format: Option<OutputFormat>,
}

impl ChurnmapConfig {
    /// Load from an explicit path, or from `.churnmap.toml` in the current
    /// directory when present. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (DEFAULT_CONFIG_FILE.into(), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// The bug patterns as the `;`-delimited string the processor takes.
    pub fn bug_pattern_string(&self) -> String {
        self.bugs.patterns.join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_bug_patterns_and_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
            [bugs]
            patterns = ["\\bfix\\b", "\\bbug\\b"]

            [output]
            default_format = "json"
            "#
        )
        .unwrap();

        let config = ChurnmapConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.bug_pattern_string(), "\\bfix\\b;\\bbug\\b");
        assert_eq!(config.output.default_format, Some(OutputFormat::Json));
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let config = ChurnmapConfig::load(None).unwrap();
        assert!(config.bugs.patterns.is_empty());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(ChurnmapConfig::load(Some(Path::new("/nonexistent/churnmap.toml"))).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not [valid toml").unwrap();
        assert!(ChurnmapConfig::load(Some(file.path())).is_err());
    }
}
