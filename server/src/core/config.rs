use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SESSION_TTL_DAYS,
    MIN_SESSION_SECRET_LEN,
};

// =============================================================================
// File Config Structs (JSON, every field optional)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_origins: Option<Vec<String>>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub session_secret: Option<String>,
    pub session_ttl_days: Option<u32>,
    pub secure_cookie: Option<bool>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
            if server.cors_origins.is_some() {
                current.cors_origins = server.cors_origins;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.session_secret.is_some() {
                current.session_secret = auth.session_secret;
            }
            if auth.session_ttl_days.is_some() {
                tracing::trace!(ttl = ?auth.session_ttl_days, "Merging auth.session_ttl_days");
                current.session_ttl_days = auth.session_ttl_days;
            }
            if auth.secure_cookie.is_some() {
                current.secure_cookie = auth.secure_cookie;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed in addition to the ones derived from host/port
    pub cors_origins: Vec<String>,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Signing secret; `None` means a random per-process secret is used
    pub session_secret: Option<String>,
    pub session_ttl_days: u32,
    pub secure_cookie: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("session_ttl_days", &self.session_ttl_days)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: None,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            secure_cookie: false,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.racetime/racetime.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(file_config, cli);
        config.validate()?;

        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Layer defaults -> file config -> CLI/env overrides
    fn from_layers(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let session_secret = cli
            .session_secret
            .clone()
            .or(file_auth.session_secret)
            .filter(|s| !s.is_empty());

        Self {
            server: ServerConfig {
                host,
                port,
                cors_origins: file_server.cors_origins.unwrap_or_default(),
            },
            auth: AuthConfig {
                session_secret,
                session_ttl_days: file_auth
                    .session_ttl_days
                    .unwrap_or(DEFAULT_SESSION_TTL_DAYS),
                secure_cookie: file_auth.secure_cookie.unwrap_or(false),
            },
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.auth.session_ttl_days == 0 {
            anyhow::bail!("Configuration error: auth.session_ttl_days must be at least 1");
        }

        if let Some(secret) = &self.auth.session_secret
            && secret.len() < MIN_SESSION_SECRET_LEN
        {
            anyhow::bail!(
                "Configuration error: auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_LEN
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.racetime/racetime.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layered(json: &str, cli: &CliConfig) -> AppConfig {
        let file: FileConfig = serde_json::from_str(json).unwrap();
        AppConfig::from_layers(file, cli)
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080, "cors_origins": ["https://timing.example"] },
            "auth": { "session_ttl_days": 14, "secure_cookie": true }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host, Some("0.0.0.0".to_string()));
        assert_eq!(server.port, Some(8080));
        assert_eq!(
            server.cors_origins,
            Some(vec!["https://timing.example".to_string()])
        );
        assert_eq!(config.auth.as_ref().unwrap().session_ttl_days, Some(14));
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig =
            serde_json::from_str(r#"{ "server": { "host": "a", "port": 1 } }"#).unwrap();
        let overlay: FileConfig =
            serde_json::from_str(r#"{ "server": { "port": 2 }, "auth": { "secure_cookie": true } }"#)
                .unwrap();
        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("a"));
        assert_eq!(server.port, Some(2));
        assert_eq!(base.auth.unwrap().secure_cookie, Some(true));
    }

    #[test]
    fn test_defaults() {
        let config = layered("{}", &CliConfig::default());
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.auth.session_ttl_days, DEFAULT_SESSION_TTL_DAYS);
        assert!(config.auth.session_secret.is_none());
        assert!(!config.auth.secure_cookie);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            ..Default::default()
        };
        let config = layered(r#"{ "server": { "host": "file.host", "port": 9000 } }"#, &cli);
        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_validation_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let err = layered("{}", &cli).validate().unwrap_err();
        assert!(err.to_string().contains("server.port must be greater than 0"));
    }

    #[test]
    fn test_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        assert!(layered("{}", &cli).validate().is_err());
    }

    #[test]
    fn test_validation_short_secret() {
        let cli = CliConfig {
            session_secret: Some("too-short".to_string()),
            ..Default::default()
        };
        let err = layered("{}", &cli).validate().unwrap_err();
        assert!(err.to_string().contains("session_secret"));

        let cli = CliConfig {
            session_secret: Some("x".repeat(MIN_SESSION_SECRET_LEN)),
            ..Default::default()
        };
        assert!(layered("{}", &cli).validate().is_ok());
    }

    #[test]
    fn test_validation_zero_ttl() {
        let config = layered(r#"{ "auth": { "session_ttl_days": 0 } }"#, &CliConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_config_path_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/racetime.json")),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "server": { "port": 7070 } }"#).unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 7070);
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
