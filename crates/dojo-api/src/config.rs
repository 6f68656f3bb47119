//! Runtime configuration, deserialised from `config.toml` and `DOJO_*`
//! environment variables.

use std::path::PathBuf;

use dojo_core::billing::DEFAULT_DUE_DAY;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "ServerConfig::default_host")]
  pub host:       String,
  #[serde(default = "ServerConfig::default_port")]
  pub port:       u16,
  #[serde(default = "ServerConfig::default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub auth:       AuthConfig,
  #[serde(default)]
  pub billing:    BillingConfig,
}

impl ServerConfig {
  fn default_host() -> String { "127.0.0.1".to_string() }

  fn default_port() -> u16 { 8080 }

  fn default_store_path() -> PathBuf { PathBuf::from("dojo.sqlite3") }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Session-token settings.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
  /// HS256 signing secret. Empty means unset; `serve` refuses to start.
  #[serde(default)]
  pub jwt_secret:     String,
  #[serde(default = "AuthConfig::default_ttl")]
  pub token_ttl_secs: u64,
}

impl AuthConfig {
  fn default_ttl() -> u64 { 8 * 60 * 60 }
}

impl Default for AuthConfig {
  fn default() -> Self {
    Self { jwt_secret: String::new(), token_ttl_secs: Self::default_ttl() }
  }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BillingConfig {
  /// Day of month used when a generate request names none.
  #[serde(default = "BillingConfig::default_due_day")]
  pub default_due_day: u32,
}

impl BillingConfig {
  fn default_due_day() -> u32 { DEFAULT_DUE_DAY }
}

impl Default for BillingConfig {
  fn default() -> Self {
    Self { default_due_day: Self::default_due_day() }
  }
}
