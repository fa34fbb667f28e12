//! Clients for the LLM vendors behind the `meeting_ai::traits::chat::Provider` trait.

use crate::error::Error;
use log::*;
use meeting_ai::traits::chat::Provider;
use service::config::{Config, LlmProvider};
use std::sync::Arc;

pub(crate) mod event_stream;
pub mod openai_compatible;
pub mod qianfan;

use openai_compatible::OpenAiCompatibleClient;
use qianfan::QianfanClient;

/// Build the chat provider selected by `LLM_PROVIDER`.
///
/// Unknown provider names fall back to Qianfan with a warning. Missing credentials
/// are logged but do not prevent startup; requests will fail with an
/// authentication error until they are configured.
pub fn chat_provider(config: &Config) -> Result<Arc<dyn Provider>, Error> {
    let provider = config.llm_provider().unwrap_or_else(|| {
        warn!(
            "Unknown LLM_PROVIDER: {}, defaulting to qianfan",
            config.llm_provider_name()
        );
        LlmProvider::Qianfan
    });

    match provider {
        LlmProvider::Qianfan => {
            let access_key = config.qianfan_access_key();
            let secret_key = config.qianfan_secret_key();
            if access_key.is_none() || secret_key.is_none() {
                warn!("QIANFAN_ACCESS_KEY / QIANFAN_SECRET_KEY not configured. Set them in .env or the environment.");
            }
            let client = QianfanClient::new(
                access_key,
                secret_key,
                config.qianfan_base_url(),
                config.default_model(),
            )?;
            info!(
                "Using Qianfan LLM provider with model: {}",
                config.default_model()
            );
            Ok(Arc::new(client))
        }
        LlmProvider::Deepseek => {
            let api_key = config.deepseek_api_key();
            if api_key.is_none() {
                warn!("DEEPSEEK_API_KEY not configured. Set it in .env or the environment.");
            }
            let client = OpenAiCompatibleClient::new(
                "deepseek",
                api_key.as_deref(),
                config.deepseek_base_url(),
                config.deepseek_model(),
            )?;
            info!(
                "Using DeepSeek LLM provider with model: {} ({})",
                config.deepseek_model(),
                config.deepseek_base_url()
            );
            Ok(Arc::new(client))
        }
    }
}

/// Pass successful responses through; turn any other status into a provider error
/// carrying the response body.
pub(crate) async fn ensure_success(
    provider_id: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, meeting_ai::Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    error!("{} API returned {}: {}", provider_id, status, message);

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        Err(meeting_ai::Error::Authentication(message))
    } else {
        Err(meeting_ai::Error::Provider {
            status: Some(status.as_u16()),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["meeting_minutes_rs"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_deepseek_selection_builds_openai_compatible_client() {
        let provider = chat_provider(&config(&[
            "--llm-provider",
            "deepseek",
            "--deepseek-api-key",
            "sk-test",
            "--deepseek-model",
            "deepseek-chat",
        ]))
        .unwrap();
        assert_eq!(provider.provider_id(), "deepseek");
        assert_eq!(provider.model(), "deepseek-chat");
    }

    #[test]
    fn test_unknown_provider_falls_back_to_qianfan() {
        let provider = chat_provider(&config(&[
            "--llm-provider",
            "mystery",
            "--default-model",
            "ERNIE-3.5-8K",
        ]))
        .unwrap();
        assert_eq!(provider.provider_id(), "qianfan");
        assert_eq!(provider.model(), "ERNIE-3.5-8K");
    }
}
