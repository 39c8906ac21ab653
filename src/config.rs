use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference provider settings
    pub provider: ProviderConfig,

    /// Per-turn generation settings
    pub chat: ChatConfig,

    /// Session identity
    pub session: SessionConfig,

    /// UI preferences
    pub ui: UiConfig,

    /// groq-chat home directory
    #[serde(skip)]
    pub home: PathBuf,
}

/// Inference provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Model used for chat turns
    pub chat_model: String,
    /// Small model used for the credential round-trip
    pub validation_model: String,
    /// Environment variable consulted to pre-fill the key prompt
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed session identifier; generated per process when unset
    pub id: Option<String>,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub page_title: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            chat_model: "llama3-70b-8192".to_string(),
            validation_model: "llama3-8b-8192".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "💬 Chatbot with Session Memory (Groq)".to_string(),
            page_title: "GKTrainings..Chatbot".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
            session: SessionConfig::default(),
            ui: UiConfig::default(),
            home: default_home(),
        }
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".groq-chat")
}

impl Config {
    /// Load configuration from `~/.groq-chat/config.toml`, or defaults if absent
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let app_home = home.join(".groq-chat");

        fs::create_dir_all(&app_home).context("Failed to create .groq-chat directory")?;

        let mut config = Self::load_from(&app_home.join("config.toml"))?;
        config.home = app_home;
        Ok(config)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::parse(&content)?
        } else {
            Config::default()
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                config.home = parent.to_path_buf();
            }
        }

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Save configuration to file. The credential is never part of it.
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.home).context("Failed to create .groq-chat directory")?;
        let config_path = self.config_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.home.join("logs")
    }

    /// Key from the environment (or a loaded `.env`), used only to pre-fill the gate
    pub fn env_api_key(&self) -> Option<String> {
        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_groq_llama3_models() {
        let config = Config::default();
        assert_eq!(config.provider.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.provider.chat_model, "llama3-70b-8192");
        assert_eq!(config.provider.validation_model, "llama3-8b-8192");
        assert_eq!(config.provider.api_key_env, "GROQ_API_KEY");
        assert!(config.session.id.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = Config::parse(
            r#"
            [provider]
            chat_model = "llama-3.1-8b-instant"

            [session]
            id = "user_session_001"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.chat_model, "llama-3.1-8b-instant");
        assert_eq!(config.provider.validation_model, "llama3-8b-8192");
        assert_eq!(config.provider.timeout_secs, 60);
        assert_eq!(config.session.id.as_deref(), Some("user_session_001"));
        assert!(config.chat.temperature.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::parse("provider = 3").is_err());
    }

    #[test]
    fn missing_file_yields_defaults_rooted_at_parent() {
        let dir = std::env::temp_dir().join(format!("groq-chat-cfg-{}", uuid::Uuid::new_v4()));
        let config = Config::load_from(&dir.join("config.toml")).unwrap();
        assert_eq!(config.home, dir);
        assert_eq!(config.logs_dir(), dir.join("logs"));
    }

    #[test]
    fn save_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("groq-chat-cfg-{}", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.home = dir.clone();
        config.chat.max_tokens = Some(512);
        config.save().unwrap();

        let written = fs::read_to_string(dir.join("config.toml")).unwrap();
        assert!(!written.contains("api_key ="));

        let loaded = Config::load_from(&dir.join("config.toml")).unwrap();
        assert_eq!(loaded.chat.max_tokens, Some(512));
        let _ = fs::remove_dir_all(dir);
    }
}
