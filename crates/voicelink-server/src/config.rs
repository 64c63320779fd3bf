//! Issuer service configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use voicelink_voice::LiveKitConfig;

/// Origin the bundled web client is served from during development.
pub const DEV_CLIENT_ORIGIN: &str = "http://localhost:5173";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Media server endpoint and token signing credentials.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cross-origin settings for the web client.
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "voicelink_voice=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Origin of the deployed web client.
    #[serde(default = "default_client_url")]
    pub client_url: String,
}

impl CorsConfig {
    /// Origins allowed to call the API: the configured client plus the
    /// development client.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.client_url.trim_end_matches('/').to_string()];
        if origins[0] != DEV_CLIENT_ORIGIN {
            origins.push(DEV_CLIENT_ORIGIN.to_string());
        }
        origins
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_client_url() -> String {
    DEV_CLIENT_ORIGIN.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            client_url: default_client_url(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `VOICELINK_HOST` overrides `server.host`
/// - `VOICELINK_PORT` overrides `server.port`
/// - `VOICELINK_LIVEKIT_URL` overrides `livekit.url`
/// - `VOICELINK_LIVEKIT_API_KEY` overrides `livekit.api_key`
/// - `VOICELINK_LIVEKIT_API_SECRET` overrides `livekit.api_secret`
/// - `VOICELINK_LOG_LEVEL` overrides `logging.level`
/// - `VOICELINK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `VOICELINK_CLIENT_URL` overrides `cors.client_url`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies `VOICELINK_*` overrides read through `var`.
pub fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("VOICELINK_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("VOICELINK_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(url) = var("VOICELINK_LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = var("VOICELINK_LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = var("VOICELINK_LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
    if let Some(level) = var("VOICELINK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("VOICELINK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(client_url) = var("VOICELINK_CLIENT_URL") {
        config.cors.client_url = client_url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_replace_file_values() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = [
            ("VOICELINK_PORT", "8080"),
            ("VOICELINK_HOST", "0.0.0.0"),
            ("VOICELINK_LIVEKIT_API_KEY", "key"),
            ("VOICELINK_LIVEKIT_API_SECRET", "secret"),
            ("VOICELINK_LOG_JSON", "1"),
            ("VOICELINK_CLIENT_URL", "https://app.example.com"),
        ]
        .into_iter()
        .collect();

        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.livekit.api_key, "key");
        assert_eq!(config.livekit.api_secret, "secret");
        assert!(config.logging.json);
        assert_eq!(config.cors.client_url, "https://app.example.com");
    }

    #[test]
    fn unparseable_overrides_are_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| match k {
            "VOICELINK_PORT" => Some("not-a-port".to_string()),
            "VOICELINK_HOST" => Some("nowhere".to_string()),
            _ => None,
        });
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, default_host());
    }

    #[test]
    fn dev_origin_is_always_allowed_once() {
        assert_eq!(
            CorsConfig::default().allowed_origins(),
            vec![DEV_CLIENT_ORIGIN.to_string()]
        );
        let cors = CorsConfig {
            client_url: "https://app.example.com/".to_string(),
        };
        assert_eq!(
            cors.allowed_origins(),
            vec![
                "https://app.example.com".to_string(),
                DEV_CLIENT_ORIGIN.to_string()
            ]
        );
    }
}
