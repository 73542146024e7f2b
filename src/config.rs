//! Gateway configuration.
//!
//! # Data Flow
//! ```text
//! environment (LAMBDA_HOST, PORT, PAYLOAD_FORMAT_VERSION)
//!     + working directory (*.key / *.crt discovery)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc with the HTTP front end and translators
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated while serving
//! - The payload format is a closed two-variant set selected at startup,
//!   never per request; an unknown version is a fatal startup error
//! - TLS is enabled implicitly by dropping a cert/key pair next to the
//!   binary, matching the zero-flag workflow of a local dev tool

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Default address of the function-execution host.
pub const DEFAULT_LAMBDA_HOST: &str = "localhost:8001";

/// Default listening port for plain HTTP.
pub const DEFAULT_HTTP_PORT: u16 = 8002;

/// Default listening port when a TLS pair is present.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown payload format version: {0}")]
    UnknownFormatVersion(String),

    #[error("failed to scan working directory for TLS files: {0}")]
    TlsScan(#[source] std::io::Error),
}

/// The proxy-integration payload format the function host is written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// REST-API style events (format "1.0").
    V1,
    /// HTTP-API style events (format "2.0").
    V2,
}

impl PayloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::V1 => "1.0",
            PayloadFormat::V2 => "2.0",
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(PayloadFormat::V1),
            "2.0" => Ok(PayloadFormat::V2),
            other => Err(ConfigError::UnknownFormatVersion(other.to_string())),
        }
    }
}

/// Certificate/key file pair discovered in the working directory.
#[derive(Debug, Clone)]
pub struct TlsPair {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Root configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address of the function host, e.g. "localhost:8001".
    pub lambda_host: String,

    /// Listening port.
    pub port: u16,

    /// Selected proxy-integration format.
    pub format: PayloadFormat,

    /// TLS pair when serving HTTPS.
    pub tls: Option<TlsPair>,
}

impl GatewayConfig {
    /// Load configuration from the environment, discovering TLS files in
    /// the current working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tls = discover_tls(Path::new(".")).map_err(ConfigError::TlsScan)?;
        Self::from_values(
            env::var("LAMBDA_HOST").ok(),
            env::var("PORT").ok(),
            env::var("PAYLOAD_FORMAT_VERSION").ok(),
            tls,
        )
    }

    /// Build a configuration from raw values, applying defaults.
    pub fn from_values(
        lambda_host: Option<String>,
        port: Option<String>,
        format: Option<String>,
        tls: Option<TlsPair>,
    ) -> Result<Self, ConfigError> {
        let lambda_host = lambda_host
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_LAMBDA_HOST.to_string());

        let default_port = if tls.is_some() {
            DEFAULT_HTTPS_PORT
        } else {
            DEFAULT_HTTP_PORT
        };
        let port = match port.filter(|p| !p.is_empty()) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(p) if p != 0 => p,
                _ => {
                    tracing::warn!(port = %raw, "Ignoring unparsable PORT value");
                    default_port
                }
            },
            None => default_port,
        };

        let format = format
            .filter(|f| !f.is_empty())
            .map(|f| f.parse())
            .transpose()?
            .unwrap_or(PayloadFormat::V1);

        Ok(Self {
            lambda_host,
            port,
            format,
            tls,
        })
    }

    /// URL scheme the front end serves.
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() {
            "https"
        } else {
            "http"
        }
    }

    /// Human-readable URL of the listener, for the startup banner.
    pub fn base_url(&self) -> String {
        let scheme = self.scheme();
        let default = (scheme == "http" && self.port == 80) || (scheme == "https" && self.port == 443);
        if default {
            format!("{scheme}://localhost/")
        } else {
            format!("{scheme}://localhost:{}/", self.port)
        }
    }
}

/// Look for a `name.key` / `name.crt` pair in `dir`.
///
/// The first `*.key` file (lexicographic order) wins. A key without its
/// sibling cert logs a warning and leaves TLS disabled.
pub fn discover_tls(dir: &Path) -> std::io::Result<Option<TlsPair>> {
    let mut keys: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "key"))
        .collect();
    keys.sort();

    let Some(key_path) = keys.into_iter().next() else {
        return Ok(None);
    };

    let cert_path = key_path.with_extension("crt");
    if cert_path.exists() {
        Ok(Some(TlsPair { cert_path, key_path }))
    } else {
        tracing::warn!(
            key = %key_path.display(),
            cert = %cert_path.display(),
            "Found key file but no matching certificate"
        );
        Ok(None)
    }
}
