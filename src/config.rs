use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the HubSpot private app access token.
pub const ACCESS_TOKEN_VAR: &str = "PRIVATE_APP_ACCESS";

const DEFAULT_BASE_URL: &str = "https://api.hubspot.com";
const DEFAULT_OBJECT_TYPE_ID: &str = "2-42357121";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub crm: CrmConfig,
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
  /// API root, without the `/crm/v3` prefix
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Custom object type id (e.g., "2-42357121")
  #[serde(default = "default_object_type_id")]
  pub object_type_id: String,
}

impl Default for CrmConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      object_type_id: default_object_type_id(),
    }
  }
}

impl CrmConfig {
  /// Parse `base_url`, rejecting anything that cannot carry a path.
  pub fn base_url(&self) -> Result<Url> {
    let url = Url::parse(&self.base_url)
      .map_err(|e| eyre!("Invalid crm.base_url {:?}: {}", self.base_url, e))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
      return Err(eyre!(
        "Invalid crm.base_url {:?}: expected an http(s) URL",
        self.base_url
      ));
    }

    Ok(url)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,
  /// Directory served for paths no route matches
  #[serde(default = "default_static_dir")]
  pub static_dir: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: default_bind(),
      static_dir: default_static_dir(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Default filter directive, used when RUST_LOG is unset
  #[serde(default = "default_log_filter")]
  pub filter: String,
  /// Write logs to this file instead of stdout
  pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      filter: default_log_filter(),
      file: None,
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_object_type_id() -> String {
  DEFAULT_OBJECT_TYPE_ID.to_string()
}

fn default_bind() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_static_dir() -> PathBuf {
  PathBuf::from("public")
}

fn default_log_filter() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./cobj-portal.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cobj-portal/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("cobj-portal.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cobj-portal").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not to an empty mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Get the HubSpot access token from the environment.
  ///
  /// The server refuses to start without it.
  pub fn get_access_token() -> Result<String> {
    Self::access_token_from(std::env::var(ACCESS_TOKEN_VAR).ok())
  }

  /// Validate a raw token value; missing and blank values are both rejected.
  pub fn access_token_from(value: Option<String>) -> Result<String> {
    match value {
      Some(token) if !token.trim().is_empty() => Ok(token),
      _ => Err(eyre!(
        "Please set the {} environment variable.",
        ACCESS_TOKEN_VAR
      )),
    }
  }
}
