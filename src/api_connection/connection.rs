use reqwest::Client;
use std::env;
use thiserror::Error;
use tracing::{debug, warn};

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse, Provider};
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("Model returned no usable content: {0}")]
    EmptyResponse(String),
}

impl Provider {
    /// Default OpenRouter settings, reading the key from `api_key_env_var`.
    pub fn openrouter(api_key_env_var: &str) -> Self {
        Self::from_config(&AppConfig {
            api_key_env_var: api_key_env_var.to_string(),
            ..AppConfig::default()
        })
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::OpenRouter {
            api_key_env_var: config.api_key_env_var.clone(),
            endpoint: config.api_endpoint.clone(),
            site_url: config.site_url.clone(),
            app_name: config.app_name.clone(),
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::OpenRouter {
                api_key_env_var,
                endpoint,
                site_url,
                app_name,
            } => {
                let api_key = env::var(api_key_env_var)
                    .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var.clone()))?;

                debug!(model = %request.model, endpoint = %endpoint, "sending chat completion");
                let response = Client::new()
                    .post(endpoint)
                    .bearer_auth(api_key)
                    .header("HTTP-Referer", site_url)
                    .header("X-Title", app_name)
                    .json(&request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    Ok(response.json::<ChatCompletionResponse>().await?)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    warn!(%status, "chat completion rejected");
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_uses_config_defaults() {
        let defaults = AppConfig::default();
        let Provider::OpenRouter {
            api_key_env_var,
            endpoint,
            site_url,
            app_name,
        } = Provider::openrouter("MY_KEY_VAR");
        assert_eq!(api_key_env_var, "MY_KEY_VAR");
        assert_eq!(endpoint, defaults.api_endpoint);
        assert_eq!(site_url, defaults.site_url);
        assert_eq!(app_name, defaults.app_name);
    }
}
