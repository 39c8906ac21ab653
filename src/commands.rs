use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::info;

use crate::config::Config;
use crate::gate::{CredentialGate, Validation};
use crate::llm::{ChatBackend, LlmClient};
use crate::ui::{self, App};

/// Launch the interactive chat UI
pub async fn start_chat(config: Config) -> Result<()> {
    let backend: Arc<dyn ChatBackend> = Arc::new(LlmClient::new(&config.provider)?);
    let mut app = App::new(&config, backend);

    info!(
        session_id = app.context().session_id(),
        model = config.provider.chat_model.as_str(),
        "Starting chat"
    );
    ui::run(&mut app).await?;

    let count = app.context().message_count();
    println!("👋 Session {} ended with {} messages.", app.context().session_id(), count);
    Ok(())
}

/// Validate the key from the environment without opening the UI
pub async fn validate_key(config: Config) -> Result<()> {
    let backend: Arc<dyn ChatBackend> = Arc::new(LlmClient::new(&config.provider)?);
    let candidate = config.env_api_key().unwrap_or_default();

    let validation = check_key(backend, &config, &candidate).await;
    println!("{}", validation.message);

    if !validation.valid {
        bail!("API key from {} was rejected", config.provider.api_key_env);
    }
    Ok(())
}

/// Write the effective config (defaults plus overrides) to its file
pub fn init_config(config: Config, force: bool) -> Result<()> {
    let path = config.config_path();
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite it", path.display());
    }
    config.save()?;
    info!(path = %path.display(), "Wrote config");
    println!("✅ Wrote {}", path.display());
    Ok(())
}

async fn check_key(backend: Arc<dyn ChatBackend>, config: &Config, candidate: &str) -> Validation {
    CredentialGate::new(backend, config.provider.validation_model.clone())
        .validate(candidate)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    #[tokio::test]
    async fn check_key_uses_configured_validation_model() {
        let backend = ScriptedBackend::new("good-key", vec![]);
        let mut config = Config::default();
        config.provider.validation_model = "llama-3.1-8b-instant".to_string();

        let validation = check_key(Arc::new(backend.clone()), &config, "good-key").await;

        assert!(validation.valid);
        assert_eq!(backend.requests().await[0].1.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn init_writes_config_once_unless_forced() {
        let mut config = Config::default();
        config.home = std::env::temp_dir().join(format!("groq-chat-init-{}", uuid::Uuid::new_v4()));
        config.provider.chat_model = "llama-3.1-8b-instant".to_string();

        init_config(config.clone(), false).unwrap();
        let loaded = Config::load_from(&config.config_path()).unwrap();
        assert_eq!(loaded.provider.chat_model, "llama-3.1-8b-instant");

        let err = init_config(config.clone(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        init_config(config.clone(), true).unwrap();

        let _ = std::fs::remove_dir_all(&config.home);
    }

    #[tokio::test]
    async fn check_key_rejects_missing_key() {
        let backend = ScriptedBackend::new("good-key", vec![]);
        let validation = check_key(Arc::new(backend), &Config::default(), "").await;
        assert!(!validation.valid);
    }
}
