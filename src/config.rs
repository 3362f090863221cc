/*
 * Responsibility
 * - 環境変数の読み込み (CLIENT_ID / CLIENT_SECRET / 各 host / redirect URI など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 * - OAuth 関連は OAuthSettings にまとめ、Arc で handler 間に共有する
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

const DEFAULT_PORT: u16 = 8008;
const DEFAULT_AUTH_SERVER_HOST: &str = "https://accounts.powerdms.com";
const DEFAULT_FILE_PICKER_HOST: &str = "https://filepicker.powerdms.com";
const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the two token handlers need to talk to the authorization server
/// and hand tokens to the widget. Immutable after start-up.
#[derive(Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Scheme + host of the authorization server, without trailing slash.
    pub auth_server_host: String,
    /// Origin of the file-picker widget, without trailing slash.
    pub file_picker_host: String,
    /// Must match the URI registered with the authorization server.
    pub redirect_uri: String,
    pub upstream_timeout: Duration,
    // Store a refresh token rotated by the server on refresh (off by default)
    pub rotate_refresh_token: bool,
}

impl OAuthSettings {
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.auth_server_host)
    }

    pub fn finalize_endpoint(&self) -> String {
        format!("{}/auth-finalize", self.file_picker_host)
    }
}

// The secret never ends up in logs through `{:?}`.
impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_server_host", &self.auth_server_host)
            .field("file_picker_host", &self.file_picker_host)
            .field("redirect_uri", &self.redirect_uri)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("rotate_refresh_token", &self.rotate_refresh_token)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    /// Inbound request deadline. Always longer than `oauth.upstream_timeout`,
    /// so an upstream expiry is answered by the handler (504) first.
    pub request_timeout: Duration,
    pub oauth: Arc<OAuthSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let client_id = required(&lookup, "CLIENT_ID")?;
        let client_secret = required(&lookup, "CLIENT_SECRET")?;

        let auth_server_host = host(
            lookup("AUTH_SERVER_HOST").unwrap_or_else(|| DEFAULT_AUTH_SERVER_HOST.to_string()),
            "AUTH_SERVER_HOST",
        )?;
        let file_picker_host = host(
            lookup("FILE_PICKER_HOST").unwrap_or_else(|| DEFAULT_FILE_PICKER_HOST.to_string()),
            "FILE_PICKER_HOST",
        )?;

        let redirect_uri = lookup("REDIRECT_URI")
            .unwrap_or_else(|| format!("http://localhost:{}/callback", port));
        parse_http_url(&redirect_uri).ok_or(ConfigError::Invalid("REDIRECT_URI"))?;

        let request_timeout_seconds = seconds(
            &lookup,
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?;
        let upstream_timeout_seconds = seconds(
            &lookup,
            "UPSTREAM_TIMEOUT_SECONDS",
            DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        )?;
        if upstream_timeout_seconds >= request_timeout_seconds {
            return Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECONDS"));
        }

        let rotate_refresh_token = match lookup("ROTATE_REFRESH_TOKEN") {
            Some(s) => parse_bool(&s).ok_or(ConfigError::Invalid("ROTATE_REFRESH_TOKEN"))?,
            None => false,
        };

        Ok(Config {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout: Duration::from_secs(request_timeout_seconds),
            oauth: Arc::new(OAuthSettings {
                client_id,
                client_secret,
                auth_server_host,
                file_picker_host,
                redirect_uri,
                upstream_timeout: Duration::from_secs(upstream_timeout_seconds),
                rotate_refresh_token,
            }),
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

// Positive whole seconds.
fn seconds<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or(ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn host(raw: String, key: &'static str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    parse_http_url(&trimmed).ok_or(ConfigError::Invalid(key))?;
    Ok(trimmed)
}

fn parse_http_url(raw: &str) -> Option<Url> {
    Url::parse(raw)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
