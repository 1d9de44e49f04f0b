//! Process-lifetime configuration.
//!
//! Loaded once at start-up from the environment and shared read-only with
//! every request. The strict and lenient deployments run the same binary;
//! they differ only in the values loaded here.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use lazy_static::lazy_static;

use crate::error::ConfigError;
use crate::security::sanitizer::SensitiveKeys;

pub const ENV_CLIENT_TOKEN: &str = "CLIENT_TOKEN";
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
pub const ENV_SERVICE_KEY: &str = "SUPABASE_SERVICE_KEY";
pub const ENV_ALLOWED_ORIGINS: &str = "INGRESS_ALLOWED_ORIGINS";
pub const ENV_SENSITIVE_KEYS: &str = "INGRESS_SENSITIVE_KEYS";
pub const ENV_PAYLOAD_POLICY: &str = "INGRESS_PAYLOAD_POLICY";
pub const ENV_RELAY_TIMEOUT_SECS: &str = "INGRESS_RELAY_TIMEOUT_SECS";
pub const ENV_BIND_ADDR: &str = "INGRESS_BIND_ADDR";
pub const ENV_MAX_BODY_BYTES: &str = "INGRESS_MAX_BODY_BYTES";

const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

lazy_static! {
    /// Origin prefixes accepted when none are configured.
    pub static ref DEFAULT_ALLOWED_ORIGINS: Vec<String> = vec![
        "https://seusite.com".to_string(),
        "https://www.seusite.com".to_string(),
    ];

    /// Field names stripped from every record when none are configured.
    pub static ref DEFAULT_SENSITIVE_KEYS: HashSet<String> = [
        "email", "nome", "cpf", "phone", "telefone", "endereco", "address",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect();
}

/// What to do with a body that has no usable `datalayer` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadPolicy {
    /// Reject with 400.
    #[default]
    Strict,
    /// Synthesize a single fallback record from `info`, `url`, `timestamp`.
    Lenient,
}

impl FromStr for PayloadPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(ConfigError::Invalid {
                key: ENV_PAYLOAD_POLICY,
                reason: format!("expected 'strict' or 'lenient', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for PayloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Lenient => f.write_str("lenient"),
        }
    }
}

/// Read-only settings injected into the handler.
#[derive(Clone)]
pub struct IngressConfig {
    pub client_token: String,
    pub store_url: String,
    pub service_key: String,
    pub allowed_origins: Vec<String>,
    pub sensitive_keys: SensitiveKeys,
    pub payload_policy: PayloadPolicy,
    pub relay_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
}

// Secrets are never printed.
impl fmt::Debug for IngressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngressConfig")
            .field("store_url", &self.store_url)
            .field("allowed_origins", &self.allowed_origins)
            .field("sensitive_keys", &self.sensitive_keys)
            .field("payload_policy", &self.payload_policy)
            .field("relay_timeout", &self.relay_timeout)
            .field("bind_addr", &self.bind_addr)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl IngressConfig {
    /// Build a configuration with defaults for everything but the secrets
    /// and the store location.
    pub fn new(client_token: &str, store_url: &str, service_key: &str) -> Self {
        Self {
            client_token: client_token.to_string(),
            store_url: store_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.clone(),
            sensitive_keys: SensitiveKeys::new(DEFAULT_SENSITIVE_KEYS.iter()),
            payload_policy: PayloadPolicy::default(),
            relay_timeout: Duration::from_secs(DEFAULT_RELAY_TIMEOUT_SECS),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sensitive_keys(mut self, keys: SensitiveKeys) -> Self {
        self.sensitive_keys = keys;
        self
    }

    pub fn with_payload_policy(mut self, policy: PayloadPolicy) -> Self {
        self.payload_policy = policy;
        self
    }

    pub fn with_relay_timeout(mut self, timeout: Duration) -> Self {
        self.relay_timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Secrets are used verbatim; a blank value still counts as missing.
        let secret = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let store_url = optional(ENV_STORE_URL).ok_or(ConfigError::Missing(ENV_STORE_URL))?;

        let mut config = Self::new(
            &secret(ENV_CLIENT_TOKEN)?,
            &store_url,
            &secret(ENV_SERVICE_KEY)?,
        );

        if let Some(origins) = optional(ENV_ALLOWED_ORIGINS) {
            let origins = split_list(&origins);
            if origins.is_empty() {
                return Err(ConfigError::Invalid {
                    key: ENV_ALLOWED_ORIGINS,
                    reason: "no origins listed".to_string(),
                });
            }
            config.allowed_origins = origins;
        }

        if let Some(keys) = optional(ENV_SENSITIVE_KEYS) {
            config.sensitive_keys = SensitiveKeys::new(split_list(&keys));
        }

        if let Some(policy) = optional(ENV_PAYLOAD_POLICY) {
            config.payload_policy = policy.parse()?;
        }

        if let Some(secs) = optional(ENV_RELAY_TIMEOUT_SECS) {
            let secs: u64 = parse_number(ENV_RELAY_TIMEOUT_SECS, &secs)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: ENV_RELAY_TIMEOUT_SECS,
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.relay_timeout = Duration::from_secs(secs);
        }

        let bind = optional(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        config.bind_addr = bind.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: ENV_BIND_ADDR,
            reason: format!("{}", e),
        })?;

        if let Some(bytes) = optional(ENV_MAX_BODY_BYTES) {
            config.max_body_bytes = parse_number(ENV_MAX_BODY_BYTES, &bytes)?;
        }

        Ok(config)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
