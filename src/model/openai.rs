use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

use super::{ChatCompletionRequest, CompletionClient};
use crate::config::Config;
use crate::error::{ClientError, ConfigError};

const CONTENT_PATH: &str = "choices[0].message.content";

// A wrapper for an OpenAI-compatible chat completions API
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint();
        info!("Using chat completions endpoint at: {}", endpoint);

        if config.insecure_skip_tls_verify {
            warn!("TLS certificate and hostname verification is DISABLED for {}", endpoint);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify)
            .danger_accept_invalid_hostnames(config.insecure_skip_tls_verify)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ClientError> {
        info!(
            "Sending {} messages to {} (model: {}, max_tokens: {})",
            request.messages.len(),
            self.endpoint,
            request.model,
            request.max_tokens
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Parse the response
        let response_json: Value =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        debug!("Response JSON: {}", response_json);

        // Extract the generated text from the response
        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or(ClientError::MissingField(CONTENT_PATH))?;

        info!("Response length: {} characters", content.len());
        Ok(content.to_string())
    }
}
