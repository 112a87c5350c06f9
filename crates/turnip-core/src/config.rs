//! turnip.toml configuration parser.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TurnipConfig {
    pub server: ServerConfig,
    pub aws: AwsConfig,
    pub holding: HoldingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP entry point binds to.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AwsConfig {
    /// Falls back to the SDK's default region chain when unset.
    pub region: Option<String>,
    /// Endpoint override shared by ECS and ELBv2 (e.g. LocalStack).
    pub endpoint_url: Option<String>,
    /// Deadline for each remote call (e.g. "5s", "750ms").
    pub call_timeout: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            call_timeout: "5s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoldingConfig {
    /// Seconds between holding page auto-refreshes.
    pub refresh_secs: u32,
}

impl Default for HoldingConfig {
    fn default() -> Self {
        Self { refresh_secs: 10 }
    }
}

impl TurnipConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: TurnipConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field that has a constrained format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        self.call_timeout()?;
        if self.holding.refresh_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "holding.refresh_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .listen
            .parse()
            .map_err(|_| ConfigError::Invalid {
                field: "server.listen",
                value: self.server.listen.clone(),
            })
    }

    pub fn call_timeout(&self) -> Result<Duration, ConfigError> {
        match parse_duration(&self.aws.call_timeout) {
            Some(d) if !d.is_zero() => Ok(d),
            _ => Err(ConfigError::Invalid {
                field: "aws.call_timeout",
                value: self.aws.call_timeout.clone(),
            }),
        }
    }
}

/// Parse a duration string like "5s", "500ms", "1m". A bare number is seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = TurnipConfig::from_toml_str("").unwrap();
        assert_eq!(config, TurnipConfig::default());
        assert_eq!(config.holding.refresh_secs, 10);
        assert_eq!(config.call_timeout().unwrap(), Duration::from_secs(5));
        assert_eq!(config.listen_addr().unwrap().port(), 8080);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:9000"

[aws]
region = "eu-west-1"
endpoint_url = "http://localhost:4566"
call_timeout = "750ms"

[holding]
refresh_secs = 3
"#;
        let config = TurnipConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.call_timeout().unwrap(), Duration::from_millis(750));
        assert_eq!(config.holding.refresh_secs, 3);
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn rejects_bad_listen_address() {
        let err = TurnipConfig::from_toml_str("[server]\nlisten = \"nowhere\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "server.listen", .. }));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = TurnipConfig::from_toml_str("[aws]\ncall_timeout = \"0s\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "aws.call_timeout", .. }));
    }

    #[test]
    fn rejects_overflowing_timeout() {
        let err = TurnipConfig::from_toml_str("[aws]\ncall_timeout = \"307445734561825862m\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "aws.call_timeout", .. }));
        assert_eq!(parse_duration("307445734561825862m"), None);
    }

    #[test]
    fn rejects_zero_refresh() {
        let err = TurnipConfig::from_toml_str("[holding]\nrefresh_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "holding.refresh_secs", .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = TurnipConfig::from_toml_str("[server\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[holding]\nrefresh_secs = 15").unwrap();

        let config = TurnipConfig::from_file(file.path()).unwrap();
        assert_eq!(config.holding.refresh_secs, 15);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = TurnipConfig::from_file(Path::new("/nonexistent/turnip.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn parse_duration_forms() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("soon"), None);
    }
}
