//! gmond collector configuration.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the gmond collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmondConfig {
    /// Address of the gmond XML port (`host:port`).
    pub address: String,

    /// Upper bound on connecting to the daemon and reading its report.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Prefix prepended to every published metric name.
    pub namespace: String,
}

impl Default for GmondConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8649".to_string(),
            timeout: Duration::from_secs(30),
            namespace: "ganglia".to_string(),
        }
    }
}

impl GmondConfig {
    /// Creates a configuration targeting `address` with default settings.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the metric namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.address.trim().is_empty() {
            return Err(invalid("address", "must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout", "must be greater than zero"));
        }
        validate_namespace(&self.namespace)
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// A namespace must itself be a valid metric name.
fn validate_namespace(namespace: &str) -> ConfigResult<()> {
    let mut chars = namespace.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("namespace", "must not be empty"));
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(invalid(
            "namespace",
            format!("must start with a letter or underscore: {namespace}"),
        ));
    }

    if let Some(ch) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(invalid(
            "namespace",
            format!("contains invalid character '{ch}': {namespace}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GmondConfig::default();
        assert_eq!(config.address, "127.0.0.1:8649");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.namespace, "ganglia");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let config = GmondConfig::from_toml_str(
            r#"
            address = "gmond.internal:8649"
            timeout = "5s"
            namespace = "grid"
        "#,
        )
        .unwrap();
        assert_eq!(config.address, "gmond.internal:8649");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.namespace, "grid");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = GmondConfig::from_toml_str(r#"timeout = "1m""#).unwrap();
        assert_eq!(config.address, "127.0.0.1:8649");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_toml() {
        let err = GmondConfig::from_toml_str("address = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = GmondConfig::default().with_timeout(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_validate_rejects_empty_address() {
        let config = GmondConfig::new("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_namespace() {
        assert!(validate_namespace("ganglia").is_ok());
        assert!(validate_namespace("_grid2").is_ok());

        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("2grid").is_err());
        assert!(validate_namespace("grid-east").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "address = \"10.0.0.5:8649\"").unwrap();
        writeln!(file, "timeout = \"250ms\"").unwrap();

        let config = GmondConfig::load(file.path()).unwrap();
        assert_eq!(config.address, "10.0.0.5:8649");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GmondConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
