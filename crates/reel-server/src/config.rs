//! Runtime configuration, deserialised from `config.toml` and `REEL__*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use reel_auth::{AuthError, TokenVerifier};
use reel_oracle::{AuthorityConfig, DEFAULT_TIMEOUT, OracleError};
use serde::Deserialize;
use thiserror::Error;

/// Which of the three services this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Service {
  /// Content service: premium-gated movie fetches.
  Movies,
  /// Subscription authority: profiles and their entitlements.
  Users,
  /// Plan purchases, propagated to the user service.
  Subscriptions,
}

impl Service {
  pub fn default_port(self) -> u16 {
    match self {
      Self::Users => 8001,
      Self::Movies => 8002,
      Self::Subscriptions => 8003,
    }
  }
}

/// An outbound dependency: where it is and how long to wait for it.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct EndpointConfig {
  pub base_url:     Option<String>,
  pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
  /// Validate the endpoint. `name` is the config key reported when the URL
  /// is absent.
  pub fn resolve(&self, name: &'static str) -> Result<AuthorityConfig, ConfigError> {
    let base_url = self
      .base_url
      .as_deref()
      .filter(|u| !u.is_empty())
      .ok_or(ConfigError::MissingUrl(name))?;
    let timeout = match self.timeout_secs {
      None => DEFAULT_TIMEOUT,
      Some(0) => return Err(ConfigError::ZeroTimeout(name)),
      Some(secs) => Duration::from_secs(secs),
    };
    Ok(AuthorityConfig::new(base_url, timeout)?)
  }
}

/// Runtime server configuration.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  /// Defaults per [`Service::default_port`].
  pub port:                    Option<u16>,
  pub jwt_secret:              Option<String>,
  /// JSON file with initial movies and profiles.
  pub seed_path:               Option<PathBuf>,
  /// Refuse tokens whose `user_id` claim is missing or non-numeric instead
  /// of treating the caller as anonymous.
  #[serde(default)]
  pub reject_anonymous_tokens: bool,
  /// The subscription authority consulted by the movie service.
  #[serde(default)]
  pub oracle:                  EndpointConfig,
  /// The user service updated by the subscription service.
  #[serde(default)]
  pub user_service:            EndpointConfig,
}

impl std::fmt::Debug for ServerConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServerConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
      .field("seed_path", &self.seed_path)
      .field("reject_anonymous_tokens", &self.reject_anonymous_tokens)
      .field("oracle", &self.oracle)
      .field("user_service", &self.user_service)
      .finish()
  }
}

fn default_host() -> String { "0.0.0.0".to_string() }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                    default_host(),
      port:                    None,
      jwt_secret:              None,
      seed_path:               None,
      reject_anonymous_tokens: false,
      oracle:                  EndpointConfig::default(),
      user_service:            EndpointConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self, service: Service) -> String {
    format!("{}:{}", self.host, self.port.unwrap_or(service.default_port()))
  }

  /// Build the token verifier. A missing secret is fatal.
  pub fn verifier(&self) -> Result<TokenVerifier, ConfigError> {
    let secret = self
      .jwt_secret
      .as_deref()
      .filter(|s| !s.is_empty())
      .ok_or(ConfigError::MissingSecret)?;
    Ok(TokenVerifier::new(secret)?.reject_anonymous(self.reject_anonymous_tokens))
  }
}

/// Startup failures. Every one of these stops the process.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("jwt_secret is not configured")]
  MissingSecret,

  #[error("{0}.base_url is not configured")]
  MissingUrl(&'static str),

  #[error("{0}.timeout_secs must be at least 1")]
  ZeroTimeout(&'static str),

  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error(transparent)]
  Authority(#[from] OracleError),

  #[error("failed to read seed file {path:?}: {source}")]
  SeedIo {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse seed file {path:?}: {source}")]
  SeedJson {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },
}
