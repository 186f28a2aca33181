//! CLI configuration loaded from an optional YAML file.
//!
//! ```yaml
//! log:
//!   level: info
//!   json: false
//!   components:
//!     abicodec-evm: trace
//! codec:
//!   max_depth: 16
//! ```

use abicodec_core::CodecConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::LogConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub codec: CodecConfig,
}

impl CliConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("read config file '{}'", path.display()))?;
                Self::from_yaml(&content)
                    .with_context(|| format!("parse config file '{}'", path.display()))
            }
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = CliConfig::from_yaml("codec:\n  max_depth: 4\n").unwrap();
        assert_eq!(config.codec.max_depth, 4);
        assert_eq!(config.log, LogConfig::default());

        let config = CliConfig::from_yaml("log:\n  level: debug\n  json: true\n").unwrap();
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
        assert_eq!(config.codec, CodecConfig::default());
    }

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }
}
