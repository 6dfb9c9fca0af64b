use crate::core::config::data::DEFAULT_BASE_URL;
use crate::core::config::Config;
use std::error::Error;
use std::fmt;

const QUICK_FIXES: &[&str] = &[
    "export OPENAI_API_KEY=sk-...    # Use environment variable",
    "rpchat config                   # Check which config file is used",
    "[openai] api_key = \"sk-...\"     # Or set it in the config file",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug)]
pub struct CredentialError {
    message: String,
    quick_fixes: &'static [&'static str],
    exit_code: i32,
}

impl CredentialError {
    pub fn missing_api_key() -> Self {
        Self {
            message: "❌ No API key configured and OPENAI_API_KEY environment variable not set\n\nPlease either:\n1. Add `api_key` to the [openai] section of your config, or\n2. Set environment variables:\n   export OPENAI_API_KEY=\"your-api-key-here\"\n   export OPENAI_BASE_URL=\"https://api.openai.com/v1\"  # Optional".to_string(),
            quick_fixes: QUICK_FIXES,
            exit_code: 2,
        }
    }

    pub fn quick_fixes(&self) -> &'static [&'static str] {
        self.quick_fixes
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CredentialError {}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve credentials from the config file first, then from `env`.
pub fn resolve_with<F>(config: &Config, env: F) -> Result<Credentials, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = non_empty(config.openai.api_key.clone())
        .or_else(|| non_empty(env("OPENAI_API_KEY")))
        .ok_or_else(CredentialError::missing_api_key)?;

    let base_url = non_empty(config.openai.base_url.clone())
        .or_else(|| non_empty(env("OPENAI_BASE_URL")))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(Credentials { api_key, base_url })
}

pub fn resolve(config: &Config) -> Result<Credentials, CredentialError> {
    resolve_with(config, |name| std::env::var(name).ok())
}
