use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::scenario::{Scenario, ScenarioCatalog};
use crate::core::session::{SessionSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct OpenAiSection {
    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Falls back to `OPENAI_BASE_URL`, then the public endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionSection {
    pub model: String,
    /// Zero omits `max_tokens` from requests.
    pub max_tokens: u32,
    pub store_replies: bool,
    pub request_timeout_secs: u64,
    /// Ask for confirmation before `say` sends anything.
    pub confirm_say: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            store_replies: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            confirm_say: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ClipboardSection {
    /// Split copied replies into chunks of at most `max_size` bytes.
    pub word_wrap: bool,
    pub max_size: usize,
}

impl ClipboardSection {
    /// Chunk size to use for copies, if splitting is enabled at all.
    pub fn chunk_size(&self) -> Option<usize> {
        (self.word_wrap && self.max_size >= 1).then_some(self.max_size)
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub clipboard: ClipboardSection,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Config {
    /// Configuration written by `rpchat init`.
    pub fn starter() -> Self {
        Config {
            scenarios: vec![Scenario {
                name: "Forest".to_string(),
                description: "A grim walk through the woods.".to_string(),
                narrator_personality: "grim and terse".to_string(),
                world_building: "The party travels through a dark, ancient forest where the \
                                 trees whisper and the paths shift at night."
                    .to_string(),
                dungeon_room_building: "Describe a damp cave beneath the roots, with enemies \
                                        waiting in the dark."
                    .to_string(),
            }],
            ..Default::default()
        }
    }

    pub fn catalog(&self) -> ScenarioCatalog {
        ScenarioCatalog::new(self.scenarios.clone())
    }

    /// Session settings with optional per-run overrides applied.
    pub fn session_settings(
        &self,
        model: Option<&str>,
        max_tokens: Option<u32>,
    ) -> SessionSettings {
        SessionSettings {
            model: model
                .map(str::to_string)
                .unwrap_or_else(|| self.session.model.clone()),
            max_tokens: max_tokens.unwrap_or(self.session.max_tokens),
            store_assistant_replies: self.session.store_replies,
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/rpchat/config.toml` → `~/.config/rpchat/config.toml`
/// - Windows: `C:\\Users\\user\\AppData\\Roaming\\rpchat\\config.toml` is left unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Show only enough of a secret to recognise it.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
