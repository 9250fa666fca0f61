//! Settings loading from environment variables.
//!
//! `main` seeds the process environment from `.env` (overriding existing
//! values), then calls [`Settings::from_env`] once. Variables without a
//! default stay `None` here; the components that need them decide whether a
//! gap is fatal.

use std::env;
use std::fmt;

pub const DEFAULT_DB_PORT: &str = "4000";
pub const DEFAULT_AZURE_OPENAI_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_AZURE_OPENAI_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const WILDCARD: &str = "*";
const REDACTED: &str = "***";

/// Database credentials (`DB_*`).
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    /// Kept as a string; it is only ever spliced into the connection URL.
    pub port: String,
    pub database: Option<String>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

/// Which chat backend the LLM client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    AzureOpenAi,
    /// Echo provider for running without Azure credentials.
    Dummy,
}

/// Azure OpenAI deployment (`AZURE_OPENAI_*`).
#[derive(Clone, PartialEq, Eq)]
pub struct AzureOpenAiSettings {
    pub backend: LlmBackend,
    pub api_key: Option<String>,
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: Option<String>,
    pub api_version: String,
    pub deployment: String,
    /// Reject missing key/endpoint when the client is built instead of at
    /// the first call.
    pub validate_on_startup: bool,
    /// Per-request timeout. `None` leaves calls unbounded.
    pub timeout_seconds: Option<u64>,
}

impl fmt::Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiSettings")
            .field("backend", &self.backend)
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .field("validate_on_startup", &self.validate_on_startup)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// CORS policy for the HTTP surface. Each list is comma separated; `*`
/// means any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsSettings {
    pub allow_origins: String,
    pub allow_credentials: bool,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl CorsSettings {
    pub fn origins(&self) -> Vec<String> {
        split_list(&self.allow_origins)
    }

    pub fn methods(&self) -> Vec<String> {
        split_list(&self.allow_methods)
    }

    pub fn headers(&self) -> Vec<String> {
        split_list(&self.allow_headers)
    }
}

/// Returns `true` when a comma-separated list contains `*`.
pub fn is_wildcard(items: &[String]) -> bool {
    items.iter().any(|item| item == WILDCARD)
}

/// HTTP listener and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind: String,
    pub log_level: String,
}

/// Fully-resolved settings. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub azure_openai: AzureOpenAiSettings,
    pub contact_email: Option<String>,
    pub cors: CorsSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary lookup.
    /// Tests pass a map here instead of mutating env vars.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| lookup(key).map(|v| parse_flag(&v)).unwrap_or(default);

        let backend = match lookup("LLM_PROVIDER").as_deref() {
            Some("dummy") => LlmBackend::Dummy,
            _ => LlmBackend::AzureOpenAi,
        };

        Self {
            database: DatabaseSettings {
                user: lookup("DB_USER"),
                password: lookup("DB_PASSWORD"),
                host: lookup("DB_HOST"),
                port: or("DB_PORT", DEFAULT_DB_PORT),
                database: lookup("DB_DATABASE"),
            },
            azure_openai: AzureOpenAiSettings {
                backend,
                api_key: lookup("AZURE_OPENAI_API_KEY"),
                endpoint: lookup("AZURE_OPENAI_ENDPOINT"),
                api_version: or("AZURE_OPENAI_API_VERSION", DEFAULT_AZURE_OPENAI_API_VERSION),
                deployment: or("AZURE_OPENAI_DEPLOYMENT", DEFAULT_AZURE_OPENAI_DEPLOYMENT),
                validate_on_startup: flag("AZURE_OPENAI_VALIDATE", false),
                timeout_seconds: lookup("AZURE_OPENAI_TIMEOUT_SECONDS")
                    .and_then(|v| v.parse().ok())
                    .filter(|&secs| secs > 0),
            },
            contact_email: lookup("CONTACT_EMAIL"),
            cors: CorsSettings {
                allow_origins: or("CORS_ALLOW_ORIGINS", WILDCARD),
                allow_credentials: lookup("CORS_ALLOW_CREDENTIALS").is_none_or(|v| v == "True"),
                allow_methods: or("CORS_ALLOW_METHODS", WILDCARD),
                allow_headers: or("CORS_ALLOW_HEADERS", WILDCARD),
            },
            server: ServerSettings {
                bind: or("APP_BIND", DEFAULT_BIND),
                log_level: or("APP_LOG_LEVEL", DEFAULT_LOG_LEVEL),
            },
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| REDACTED)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Settings` for unit tests: dummy LLM, no credentials, no network.
#[cfg(test)]
impl Settings {
    pub fn test_default() -> Self {
        let mut settings = Self::from_lookup(|_| None);
        settings.azure_openai.backend = LlmBackend::Dummy;
        settings
    }
}
