//! OpenAI-compatible generation backend.
//!
//! Works with Ollama, OpenAI, OpenRouter, vLLM, llama.cpp and any other
//! endpoint exposing `/chat/completions` and `/embeddings`.

use async_trait::async_trait;
use cortex_core::error::ProviderError;
use cortex_core::message::{Message, Role};
use cortex_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// An OpenAI-compatible backend.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Local Ollama server. Ollama ignores the key.
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new("ollama", base_url.unwrap_or("http://localhost:11434/v1"), "ollama")
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                },
                content: Some(m.content.clone()),
            })
            .collect()
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(response).await
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Turn non-success HTTP statuses into typed errors.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    match status {
        200..=299 => Ok(response),
        429 => {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);
            Err(ProviderError::RateLimited { retry_after_secs })
        }
        401 | 403 => Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        )),
        _ => {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Backend returned error");
            Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            })
        }
    }
}

#[async_trait]
impl cortex_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.stop.is_empty() {
            body["stop"] = serde_json::json!(request.stop);
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self.post_json("chat/completions", &body).await?;

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            usage,
            model: api_response.model,
        })
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        let body = serde_json::json!({
            "model": request.model,
            "input": request.inputs,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %request.model,
            count = request.inputs.len(),
            "Sending embedding request"
        );

        let response = self.post_json("embeddings", &body).await?;

        let mut api_resp: EmbeddingApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse embedding response: {e}"),
            })?;

        // Some servers do not return data in input order.
        api_resp.data.sort_by_key(|d| d.index);

        if api_resp.data.len() != request.inputs.len() {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: format!(
                    "Expected {} embeddings, got {}",
                    request.inputs.len(),
                    api_resp.data.len()
                ),
            });
        }

        Ok(EmbeddingResponse {
            embeddings: api_resp.data.into_iter().map(|d| d.embedding).collect(),
            model: api_resp.model,
        })
    }
}

// --- Wire types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::Provider;

    #[test]
    fn ollama_constructor() {
        let provider = OpenAiCompatProvider::ollama(None);
        assert_eq!(provider.name(), "ollama");
        assert!(provider.base_url().contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let provider = OpenAiCompatProvider::new("x", "http://host:1/v1/", "k");
        assert_eq!(provider.base_url(), "http://host:1/v1");
    }

    #[test]
    fn message_conversion() {
        let messages = vec![Message::system("You are helpful"), Message::user("Hello")];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
        assert_eq!(api_messages[1].content.as_deref(), Some("Hello"));
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "model": "mistral",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Thought: hi"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "mistral");
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Thought: hi"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 5);
    }

    #[test]
    fn parse_embedding_response_out_of_order() {
        let data = r#"{
            "data": [
                {"embedding": [0.4, 0.5], "index": 1},
                {"embedding": [0.1, 0.2], "index": 0}
            ],
            "model": "all-minilm"
        }"#;
        let mut parsed: EmbeddingApiResponse = serde_json::from_str(data).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
        assert_eq!(parsed.data[1].embedding, vec![0.4, 0.5]);
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        // Port 9 (discard) is essentially never serving HTTP.
        let provider = OpenAiCompatProvider::new("dead", "http://127.0.0.1:9/v1", "k");
        let err = provider
            .complete(ProviderRequest {
                model: "m".into(),
                messages: vec![Message::user("hi")],
                temperature: 0.0,
                max_tokens: None,
                stop: vec!["\nObservation:".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout(_)));
    }
}
