//! Bridge configuration (jsbridge.toml)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub vm: VmConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Limits applied to every VM a scope constructs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmConfig {
    /// Heap limit for the runtime, in bytes
    pub memory_limit: Option<usize>,
    /// Native stack limit for the runtime, in bytes
    pub max_stack_size: Option<usize>,
    /// Allocation volume that triggers a GC pass, in bytes
    pub gc_threshold: Option<usize>,
    /// Deepest value nesting converted back to the host
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    64
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_limit: None,
            max_stack_size: None,
            gc_threshold: None,
            max_depth: default_max_depth(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "jsbridge=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl BridgeConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config.vm.max_depth, 64);
        assert!(config.vm.memory_limit.is_none());
        assert_eq!(config.log.filter, "jsbridge=info");
    }

    #[test]
    fn test_parse_limits() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [vm]
            memory_limit = 67108864
            max_stack_size = 1048576
            max_depth = 16

            [log]
            filter = "jsbridge=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.vm.memory_limit, Some(67108864));
        assert_eq!(config.vm.max_stack_size, Some(1048576));
        assert_eq!(config.vm.gc_threshold, None);
        assert_eq!(config.vm.max_depth, 16);
        assert_eq!(config.log.filter, "jsbridge=debug");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[vm]\ngc_threshold = 4096").unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.vm.gc_threshold, Some(4096));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BridgeConfig::load("/nonexistent/jsbridge.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let err = BridgeConfig::from_toml_str("[vm]\nmax_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
