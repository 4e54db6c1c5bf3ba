use std::fmt;
use std::time::Duration;

use clap::Args;
use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "claude-opus-4-5-20251101";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Raw agent settings as given on the command line or in the environment.
///
/// Nothing here is validated; convert into [`Config`] before use.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Base URL of the OpenAI-compatible API (e.g. https://api.openai.com/v1)
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model identifier sent upstream
    #[arg(long, env = "AGENT_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// System prompt prepended to every request
    #[arg(long, env = "AGENT_SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT, global = true)]
    pub system_prompt: String,

    /// Maximum number of tokens the upstream may generate per reply
    #[arg(long, env = "AGENT_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS, global = true)]
    pub max_tokens: u32,

    /// Upstream request timeout in seconds
    #[arg(long, env = "AGENT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates and hostnames from the upstream (testing only)
    #[arg(long, env = "AGENT_INSECURE_SKIP_TLS_VERIFY", global = true)]
    pub insecure_skip_tls_verify: bool,
}

/// Validated, immutable agent configuration.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub insecure_skip_tls_verify: bool,
}

/// The part of [`Config`] a session needs to build requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
}

impl Config {
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

impl TryFrom<Settings> for Config {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let base_url = settings
            .base_url
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENAI_BASE_URL"))?;
        let api_key = settings
            .api_key
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(format!(
                "{base_url}: scheme must be http or https"
            )));
        }

        if settings.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be greater than 0".into()));
        }
        if settings.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be greater than 0".into()));
        }

        Ok(Self {
            base_url,
            api_key,
            model: settings.model,
            system_prompt: settings.system_prompt,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_secs),
            insecure_skip_tls_verify: settings.insecure_skip_tls_verify,
        })
    }
}

// Keeps the key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .finish()
    }
}
