//! Configuration for the Scaffold client

use scaffold_core::{SignatureAlgorithm, Signer};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{ScaffoldError, ScaffoldResult};

/// Production API server
pub const DEFAULT_SERVER: &str = "https://api.getscaffold.com";

/// Path prefix for every command
pub const BASE_URI: &str = "/v1/";

/// Default transport timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Client configuration
///
/// Everything a session needs, supplied up front. TOML loading is only a
/// convenience for building this value.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Service identifier issued by Scaffold
    pub service_id: String,
    /// API key, used to sign the token exchange
    pub api_key: SecretString,
    /// Server base URL, without the `/v1/` prefix
    #[serde(default = "default_server")]
    pub server: String,
    /// Transport timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent for requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// MAC used for request signatures
    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,
}

/// Service identity and API key
///
/// Immutable once built; both halves are required.
#[derive(Debug, Clone)]
pub struct Credential {
    service_id: String,
    api_key: SecretString,
}

impl Credential {
    /// Create a credential, rejecting empty parts
    pub fn new(service_id: impl Into<String>, api_key: SecretString) -> ScaffoldResult<Self> {
        let service_id = service_id.into();
        if service_id.trim().is_empty() {
            return Err(ScaffoldError::Configuration("service_id must not be empty".to_string()));
        }
        if api_key.expose_secret().is_empty() {
            return Err(ScaffoldError::Configuration("api_key must not be empty".to_string()));
        }
        Ok(Self { service_id, api_key })
    }

    /// Get the service identifier
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Get the API key
    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    format!("scaffold-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Create a configuration for the production server
    pub fn new(service_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            api_key: SecretString::new(api_key.into()),
            server: default_server(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }

    /// Point at a different server
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Set the transport timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the signature algorithm
    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    /// Parse configuration from TOML
    pub fn from_toml_str(content: &str) -> ScaffoldResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> ScaffoldResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Get default configuration directory
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_default().join("scaffold")
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Validate configuration
    pub fn validate(&self) -> ScaffoldResult<()> {
        self.credential()?;

        let parsed = url::Url::parse(&self.server)
            .map_err(|e| ScaffoldError::Configuration(format!("invalid server URL {:?}: {}", self.server, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ScaffoldError::Configuration(format!(
                "server URL must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if parsed.query().is_some() {
            return Err(ScaffoldError::Configuration("server URL must not carry a query".to_string()));
        }

        if self.timeout_ms == 0 {
            return Err(ScaffoldError::Configuration("timeout cannot be zero".to_string()));
        }

        Ok(())
    }

    /// Service identity and API key
    pub fn credential(&self) -> ScaffoldResult<Credential> {
        Credential::new(self.service_id.clone(), self.api_key.clone())
    }

    /// Server base URL without a trailing slash
    pub fn server_base(&self) -> &str {
        self.server.trim_end_matches('/')
    }

    /// Transport timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Signer for the configured algorithm
    pub fn signer(&self) -> Signer {
        Signer::with_algorithm(self.signature_algorithm)
    }
}
