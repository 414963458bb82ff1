//! Configuration management for sa-login
//!
//! Settings are layered: CLI flags and environment variables (parsed by clap)
//! override the optional YAML config file, which overrides built-in defaults.
//! The result is an immutable [`Settings`] value built once at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Default auth endpoint host
pub const DEFAULT_HOST: &str = "192.168.8.110";

/// Default auth endpoint port
pub const DEFAULT_PORT: u16 = 8222;

/// Default Kubernetes auth login path
pub const DEFAULT_PATH: &str = "/v1/auth/kubernetes/login";

/// Default URL scheme
pub const DEFAULT_SCHEME: &str = "https";

/// Default role sent with every login
pub const DEFAULT_ROLE: &str = "testapp";

/// Projected service account token mounted by Kubernetes
pub const DEFAULT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Seconds between login attempts
pub const DEFAULT_INTERVAL_SECS: u64 = 15;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest accepted interval or timeout
pub const MAX_DURATION_SECS: u64 = 24 * 60 * 60;

/// Idle pooled connections kept per host
pub const POOL_MAX_IDLE: usize = 10;

/// Idle pooled connections are closed after this long
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// One layer of optional settings.
///
/// Used both for the YAML config file and for the CLI/env layer, so the two
/// can be merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigLayer {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub scheme: Option<String>,
    pub role: Option<String>,
    pub token_path: Option<PathBuf>,
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub insecure_skip_tls_verify: Option<bool>,
}

impl ConfigLayer {
    /// Get the default config file path (~/.config/sa-login/config.yaml on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sa-login").join("config.yaml"))
    }

    /// Load the config file layer.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// only if a file is present there.
    pub fn load_at(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load_from(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load a config file layer from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let layer: ConfigLayer = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        log::debug!("Loaded configuration from {}", path.display());

        Ok(layer)
    }

    /// Fill every unset field of `self` from `lower`
    pub fn or(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            path: self.path.or(lower.path),
            scheme: self.scheme.or(lower.scheme),
            role: self.role.or(lower.role),
            token_path: self.token_path.or(lower.token_path),
            interval_secs: self.interval_secs.or(lower.interval_secs),
            timeout_secs: self.timeout_secs.or(lower.timeout_secs),
            insecure_skip_tls_verify: self
                .insecure_skip_tls_verify
                .or(lower.insecure_skip_tls_verify),
        }
    }
}

/// Server certificate trust policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Validate the server certificate chain and hostname
    #[default]
    Verify,
    /// Trust any certificate the server presents
    AcceptInvalidCerts,
}

/// Location of the login endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    /// Full login URL
    pub fn url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}://[{}]:{}{}", self.scheme, self.host, self.port, self.path)
        } else {
            format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
        }
    }
}

/// Resolved, validated runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub role: String,
    pub token_path: PathBuf,
    pub interval: Duration,
    pub timeout: Duration,
    pub pool_max_idle: usize,
    pub pool_idle_timeout: Duration,
    pub tls: TlsPolicy,
}

impl Settings {
    /// Merge the CLI layer over the file layer, apply defaults and validate
    pub fn resolve(overrides: ConfigLayer, file: ConfigLayer) -> Result<Self> {
        let merged = overrides.or(file);

        let settings = Settings {
            endpoint: Endpoint {
                scheme: merged
                    .scheme
                    .unwrap_or_else(|| DEFAULT_SCHEME.to_string())
                    .to_ascii_lowercase(),
                host: merged.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: merged.port.unwrap_or(DEFAULT_PORT),
                path: merged.path.unwrap_or_else(|| DEFAULT_PATH.to_string()),
            },
            role: merged.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            token_path: merged
                .token_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
            interval: Duration::from_secs(merged.interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS)),
            timeout: Duration::from_secs(merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            pool_max_idle: POOL_MAX_IDLE,
            pool_idle_timeout: POOL_IDLE_TIMEOUT,
            tls: if merged.insecure_skip_tls_verify.unwrap_or(false) {
                TlsPolicy::AcceptInvalidCerts
            } else {
                TlsPolicy::Verify
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings describe a usable endpoint and schedule
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> {
            Err(ConfigError::Invalid(msg.to_string()).into())
        };

        if self.endpoint.host.trim().is_empty() {
            return invalid("host must not be empty");
        }
        if self.endpoint.port == 0 {
            return invalid("port must be greater than 0");
        }
        if !self.endpoint.path.starts_with('/') {
            return invalid("path must start with '/'");
        }
        if self.endpoint.scheme != "http" && self.endpoint.scheme != "https" {
            return Err(ConfigError::Invalid(format!(
                "unsupported scheme '{}' (expected http or https)",
                self.endpoint.scheme
            ))
            .into());
        }
        if self.role.trim().is_empty() {
            return invalid("role must not be empty");
        }
        if self.interval.is_zero() {
            return invalid("interval must be at least 1 second");
        }
        if self.interval.as_secs() > MAX_DURATION_SECS {
            return invalid("interval must be at most 86400 seconds");
        }
        if self.timeout.is_zero() {
            return invalid("timeout must be at least 1 second");
        }
        if self.timeout.as_secs() > MAX_DURATION_SECS {
            return invalid("timeout must be at most 86400 seconds");
        }

        Ok(())
    }
}
