use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::utils::crypto;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_AUTH_API_URL, DEFAULT_CLIENT_ID,
    DEFAULT_FALLBACK_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROVIDER_TIMEOUT_SECS,
    ENV_JWT_SECRET, MIN_JWT_SECRET_BYTES,
};

// =============================================================================
// Environment Enum
// =============================================================================

/// Deployment environment (the `API_ENV` binding)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" | "local" => Some(Self::Development),
            "staging" | "stage" => Some(Self::Staging),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Extra CORS origins (the frontend's deployed origin, for instance)
    pub allowed_origins: Option<Vec<String>>,
}

/// Identity provider configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProviderFileConfig {
    pub url: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Emergency fallback configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FallbackFileConfig {
    pub enabled: Option<bool>,
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Session cookie configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SessionFileConfig {
    pub secure_cookies: Option<bool>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub provider: Option<ProviderFileConfig>,
    pub fallback: Option<FallbackFileConfig>,
    pub session: Option<SessionFileConfig>,
    pub environment: Option<Environment>,
    pub debug: Option<bool>,
    /// Files this config was read from, in load order
    #[serde(skip)]
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Read and merge the profile and local/`--config` files.
    ///
    /// Runs before logging is initialised; unknown keys are reported later by
    /// [`AppConfig::load`].
    pub fn discover(cli: &CliConfig) -> Result<Self> {
        let mut file_config = FileConfig::default();

        // 1. Load from profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            file_config.merge(FileConfig::load_from_file(&profile_path)?);
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            file_config.merge(FileConfig::load_from_file(&path)?);
        }

        Ok(file_config)
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.sources.push(path.display().to_string());
        tracing::trace!(config = ?config, "Parsed config file");
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
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
            if server.allowed_origins.is_some() {
                current.allowed_origins = server.allowed_origins;
            }
        }

        if let Some(provider) = other.provider {
            let current = self.provider.get_or_insert_with(ProviderFileConfig::default);
            if provider.url.is_some() {
                tracing::trace!(url = ?provider.url, "Merging provider.url");
                current.url = provider.url;
            }
            if provider.client_id.is_some() {
                current.client_id = provider.client_id;
            }
            if provider.redirect_uri.is_some() {
                current.redirect_uri = provider.redirect_uri;
            }
            if provider.timeout_secs.is_some() {
                current.timeout_secs = provider.timeout_secs;
            }
        }

        if let Some(fallback) = other.fallback {
            let current = self.fallback.get_or_insert_with(FallbackFileConfig::default);
            if fallback.enabled.is_some() {
                tracing::trace!(enabled = ?fallback.enabled, "Merging fallback.enabled");
                current.enabled = fallback.enabled;
            }
            if fallback.url.is_some() {
                current.url = fallback.url;
            }
            if fallback.timeout_secs.is_some() {
                current.timeout_secs = fallback.timeout_secs;
            }
        }

        if let Some(session) = other.session {
            let current = self.session.get_or_insert_with(SessionFileConfig::default);
            if session.secure_cookies.is_some() {
                current.secure_cookies = session.secure_cookies;
            }
        }

        if other.environment.is_some() {
            self.environment = other.environment;
        }
        if other.debug.is_some() {
            self.debug = other.debug;
        }

        if let serde_json::Value::Object(extra) = other.extra
            && !extra.is_empty()
        {
            match &mut self.extra {
                serde_json::Value::Object(current) => current.extend(extra),
                current => *current = serde_json::Value::Object(extra),
            }
        }
        self.sources.extend(other.sources);
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
    pub allowed_origins: Vec<String>,
}

/// Identity provider settings
#[derive(Clone)]
pub struct ProviderSettings {
    pub url: String,
    pub client_id: String,
    pub redirect_uri: String,
    /// `API_TOKEN`, sent as the client secret
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Client configuration for the SDK
    pub fn client_config(&self) -> kush_observer::ProviderConfig {
        let config = kush_observer::ProviderConfig::new(
            self.url.clone(),
            self.client_id.clone(),
            self.redirect_uri.clone(),
        )
        .with_timeout(Duration::from_secs(self.timeout_secs));
        match &self.api_token {
            Some(token) => config.with_client_secret(token.clone()),
            None => config,
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("api_token_set", &self.api_token.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Emergency fallback configuration
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub url: Option<String>,
    pub timeout_secs: u64,
}

/// Session and OAuth state configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// HS256 key for OAuth state tokens
    pub jwt_secret: Vec<u8>,
    /// True when no `JWT_SECRET` was provided and a per-process key was generated
    pub secret_generated: bool,
    pub secure_cookies: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret_generated", &self.secret_generated)
            .field("secure_cookies", &self.secure_cookies)
            .finish_non_exhaustive()
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderSettings,
    pub fallback: FallbackConfig,
    pub session: SessionConfig,
    pub environment: Environment,
    pub debug: bool,
}

impl AppConfig {
    /// Build the configuration from discovered config files and CLI/env
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.kush-gateway/kush-gateway.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        tracing::debug!(configs = ?file_config.sources, "Config files loaded");
        file_config.warn_unknown_fields();
        Self::from_sources(cli, file_config)
    }

    /// Layer defaults -> file config -> CLI/env overrides, then validate
    fn from_sources(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let environment = resolve_environment(cli, Some(&file_config));
        let debug = resolve_debug(cli, Some(&file_config));
        let file_server = file_config.server.unwrap_or_default();
        let file_provider = file_config.provider.unwrap_or_default();
        let file_fallback = file_config.fallback.unwrap_or_default();
        let file_session = file_config.session.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);


        // provider: CLI/env overrides file config
        let redirect_uri = cli
            .redirect_uri
            .clone()
            .or(file_provider.redirect_uri)
            .unwrap_or_else(|| default_redirect_uri(&host, port));
        let provider = ProviderSettings {
            url: cli
                .auth_api_url
                .clone()
                .or(file_provider.url)
                .unwrap_or_else(|| DEFAULT_AUTH_API_URL.to_string()),
            client_id: cli
                .client_id
                .clone()
                .or(file_provider.client_id)
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            redirect_uri,
            api_token: cli.api_token.clone(),
            timeout_secs: file_provider
                .timeout_secs
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
        };

        // fallback: enabled by default whenever a URL is configured
        let fallback_url = cli
            .fallback_url
            .clone()
            .or(file_fallback.url)
            .filter(|u| !u.is_empty());
        let fallback = FallbackConfig {
            enabled: cli
                .fallback_enabled
                .or(file_fallback.enabled)
                .unwrap_or(fallback_url.is_some()),
            url: fallback_url,
            timeout_secs: file_fallback
                .timeout_secs
                .unwrap_or(DEFAULT_FALLBACK_TIMEOUT_SECS),
        };

        // JWT secret: env only; a per-process key outside production
        let session = match &cli.jwt_secret {
            Some(secret) => SessionConfig {
                jwt_secret: secret.as_bytes().to_vec(),
                secret_generated: false,
                secure_cookies: file_session
                    .secure_cookies
                    .unwrap_or(environment != Environment::Development),
            },
            None => SessionConfig {
                jwt_secret: crypto::generate_signing_key(),
                secret_generated: true,
                secure_cookies: file_session
                    .secure_cookies
                    .unwrap_or(environment != Environment::Development),
            },
        };

        let config = Self {
            server: ServerConfig {
                host,
                port,
                allowed_origins: file_server.allowed_origins.unwrap_or_default(),
            },
            provider,
            fallback,
            session,
            environment,
            debug,
        };

        config.validate()?;
        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        validate_http_url("provider.url", &self.provider.url)?;
        validate_http_url("provider.redirect_uri", &self.provider.redirect_uri)?;

        if self.provider.client_id.is_empty() {
            anyhow::bail!("Configuration error: provider.client_id must not be empty");
        }

        if self.fallback.enabled {
            match &self.fallback.url {
                Some(url) => validate_http_url("fallback.url", url)?,
                None => anyhow::bail!(
                    "Configuration error: fallback.url is required when the fallback is enabled"
                ),
            }
        }

        if self.environment.is_production() {
            if self.session.secret_generated {
                anyhow::bail!(
                    "Configuration error: {} must be set in production",
                    ENV_JWT_SECRET
                );
            }
            if self.session.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
                anyhow::bail!(
                    "Configuration error: {} must be at least {} bytes in production",
                    ENV_JWT_SECRET,
                    MIN_JWT_SECRET_BYTES
                );
            }
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .with_context(|| format!("Configuration error: {} is not a valid URL: {}", field, value))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!(
            "Configuration error: {} must use http or https: {}",
            field,
            value
        );
    }
    Ok(())
}

/// Callback URL served by this gateway
fn default_redirect_uri(host: &str, port: u16) -> String {
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };
    format!("http://{}:{}/api/v1/auth/callback", display_host, port)
}

/// Get the profile config path (~/.kush-gateway/kush-gateway.json)
/// Environment after CLI/env and config file layering; falls back to the
/// default when no file config could be read
pub fn resolve_environment(cli: &CliConfig, file_config: Option<&FileConfig>) -> Environment {
    cli.environment
        .or(file_config.and_then(|f| f.environment))
        .unwrap_or_default()
}

pub fn resolve_debug(cli: &CliConfig, file_config: Option<&FileConfig>) -> bool {
    cli.debug || file_config.and_then(|f| f.debug).unwrap_or(false)
}

fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(cli: &CliConfig, json: &str) -> Result<AppConfig> {
        let file_config: FileConfig = serde_json::from_str(json).unwrap();
        AppConfig::from_sources(cli, file_config)
    }

    #[test]
    fn test_environment_serde_and_display() {
        let env: Environment = serde_json::from_str(r#""production""#).unwrap();
        assert_eq!(env, Environment::Production);
        assert_eq!(Environment::Staging.to_string(), "staging");
        assert_eq!(Environment::parse("PROD"), Some(Environment::Production));
        assert_eq!(Environment::parse("qa"), None);
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080, "allowed_origins": ["https://app.kush.observer"] },
            "provider": { "url": "https://idp.example", "client_id": "web", "timeout_secs": 5 },
            "fallback": { "url": "https://legacy.example/kush-fallback" },
            "environment": "staging"
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));
        assert_eq!(config.provider.as_ref().unwrap().timeout_secs, Some(5));
        assert_eq!(config.environment, Some(Environment::Staging));
    }

    #[test]
    fn test_environment_from_file_when_cli_unset() {
        let file_config: FileConfig =
            serde_json::from_str(r#"{ "environment": "production", "debug": true }"#).unwrap();

        let cli = CliConfig::default();
        assert_eq!(
            resolve_environment(&cli, Some(&file_config)),
            Environment::Production
        );
        assert!(resolve_debug(&cli, Some(&file_config)));

        let cli = CliConfig {
            environment: Some(Environment::Staging),
            ..Default::default()
        };
        assert_eq!(
            resolve_environment(&cli, Some(&file_config)),
            Environment::Staging
        );
        assert_eq!(
            resolve_environment(&CliConfig::default(), None),
            Environment::Development
        );
    }

    #[test]
    fn test_discover_reads_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.json");
        fs::write(&path, r#"{ "environment": "production", "typo": 1 }"#).unwrap();

        let cli = CliConfig {
            config: Some(path.clone()),
            ..Default::default()
        };
        let file_config = FileConfig::discover(&cli).unwrap();
        assert_eq!(file_config.environment, Some(Environment::Production));
        assert!(file_config.extra.get("typo").is_some());
        assert!(file_config.sources.contains(&path.display().to_string()));

        let missing = CliConfig {
            config: Some(dir.path().join("absent.json")),
            ..Default::default()
        };
        assert!(FileConfig::discover(&missing).is_err());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "port": 1 }, "unknown_section": {} }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert!(config.extra.get("unknown_section").is_some());
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{ "server": { "host": "0.0.0.0", "port": 1000 }, "fallback": { "enabled": false } }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{ "server": { "port": 2000 }, "fallback": { "url": "https://legacy.example/kush-fallback" } }"#,
        )
        .unwrap();
        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(2000));
        let fallback = base.fallback.as_ref().unwrap();
        assert_eq!(fallback.enabled, Some(false));
        assert_eq!(
            fallback.url.as_deref(),
            Some("https://legacy.example/kush-fallback")
        );
    }

    #[test]
    fn test_app_config_defaults() {
        let config = load(&CliConfig::default(), "{}").unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.provider.url, DEFAULT_AUTH_API_URL);
        assert_eq!(config.provider.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(
            config.provider.redirect_uri,
            "http://127.0.0.1:8787/api/v1/auth/callback"
        );
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.fallback.enabled);
        assert!(config.session.secret_generated);
        assert_eq!(config.session.jwt_secret.len(), 32);
        assert!(!config.session.secure_cookies);
        assert!(!config.debug);
    }

    #[test]
    fn test_app_config_cli_override() {
        let cli = CliConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(3000),
            debug: true,
            environment: Some(Environment::Staging),
            auth_api_url: Some("https://idp.example".to_string()),
            client_id: Some("cli-client".to_string()),
            fallback_url: Some("https://legacy.example/kush-fallback".to_string()),
            api_token: Some("token".to_string()),
            jwt_secret: Some("s".repeat(40)),
            ..Default::default()
        };
        let config = load(
            &cli,
            r#"{ "server": { "port": 1234 }, "provider": { "client_id": "file-client" } }"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.provider.url, "https://idp.example");
        assert_eq!(config.provider.client_id, "cli-client");
        assert_eq!(
            config.provider.redirect_uri,
            "http://localhost:3000/api/v1/auth/callback"
        );
        assert_eq!(config.provider.api_token.as_deref(), Some("token"));
        assert!(config.fallback.enabled);
        assert!(!config.session.secret_generated);
        assert!(config.session.secure_cookies);
        assert!(config.debug);
    }

    #[test]
    fn test_fallback_can_be_disabled_with_url() {
        let cli = CliConfig {
            fallback_enabled: Some(false),
            fallback_url: Some("https://legacy.example/kush-fallback".to_string()),
            ..Default::default()
        };
        let config = load(&cli, "{}").unwrap();
        assert!(!config.fallback.enabled);
        assert!(config.fallback.url.is_some());
    }

    #[test]
    fn test_validation_fallback_enabled_without_url() {
        let cli = CliConfig {
            fallback_enabled: Some(true),
            ..Default::default()
        };
        let err = load(&cli, "{}").unwrap_err();
        assert!(err.to_string().contains("fallback.url"));
    }

    #[test]
    fn test_validation_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        assert!(load(&cli, "{}").is_err());
    }

    #[test]
    fn test_validation_provider_url_scheme() {
        let cli = CliConfig {
            auth_api_url: Some("ftp://idp.example".to_string()),
            ..Default::default()
        };
        let err = load(&cli, "{}").unwrap_err();
        assert!(err.to_string().contains("provider.url"));
    }

    #[test]
    fn test_validation_production_requires_secret() {
        let cli = CliConfig {
            environment: Some(Environment::Production),
            ..Default::default()
        };
        let err = load(&cli, "{}").unwrap_err();
        assert!(err.to_string().contains(ENV_JWT_SECRET));

        let cli = CliConfig {
            environment: Some(Environment::Production),
            jwt_secret: Some("short".to_string()),
            ..Default::default()
        };
        assert!(load(&cli, "{}").is_err());

        let cli = CliConfig {
            environment: Some(Environment::Production),
            jwt_secret: Some("x".repeat(MIN_JWT_SECRET_BYTES)),
            ..Default::default()
        };
        assert!(load(&cli, "{}").unwrap().session.secure_cookies);
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let cli = CliConfig {
            api_token: Some("super-secret-token".to_string()),
            jwt_secret: Some("super-secret-key".to_string()),
            ..Default::default()
        };
        let config = load(&cli, "{}").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_provider_client_config() {
        let cli = CliConfig {
            api_token: Some("token".to_string()),
            ..Default::default()
        };
        let config = load(&cli, r#"{ "provider": { "timeout_secs": 3 } }"#).unwrap();
        let client = config.provider.client_config();
        assert_eq!(client.client_secret.as_deref(), Some("token"));
        assert_eq!(client.timeout, Duration::from_secs(3));
    }
}
