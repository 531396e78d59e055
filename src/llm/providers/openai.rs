//! OpenAI API Provider
//!
//! Chat completions against OpenAI, or any endpoint that speaks the same
//! protocol under a different base URL.

use crate::config::Credential;
use crate::error::{Result, SqlChatError};
use crate::llm::client::LLMHttpClient;
use crate::llm::provider::{
    Completion, LLMProvider, Message, ProviderConfig, SamplingParams, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const PROVIDER_NAME: &str = "OpenAI";

pub struct OpenAIProvider {
    credential: Credential,
    model: String,
    base_url: String,
    client: LLMHttpClient,
}

impl OpenAIProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = LLMHttpClient::with_timeout(PROVIDER_NAME, config.timeout_secs)?;
        Ok(Self {
            credential: config.credential,
            model: config.model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    fn build_request<'a>(&'a self, messages: &'a [Message], params: &'a SamplingParams) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stop: &params.stop,
        }
    }

    fn parse_response(&self, body: &str) -> Result<Completion> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
            SqlChatError::upstream(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SqlChatError::upstream(PROVIDER_NAME, "response contained no choices"))?;

        let content = choice.message.content.ok_or_else(|| {
            SqlChatError::upstream(PROVIDER_NAME, "response contained no message content")
        })?;

        Ok(Completion {
            content,
            model: Some(response.model),
            finish_reason: choice.finish_reason,
            usage: response.usage.map(|u| TokenUsage {
                prompt: u.prompt_tokens,
                completion: u.completion_tokens,
            }),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate(&self, messages: &[Message], params: &SamplingParams) -> Result<Completion> {
        let request = self.build_request(messages, params);
        let headers = LLMHttpClient::build_headers(PROVIDER_NAME, self.credential.expose())?;

        let response_text = self
            .client
            .post_json(&self.completions_url(), headers, &request)
            .await?;

        let response = self.parse_response(&response_text)?;
        tracing::debug!(
            model = response.model.as_deref().unwrap_or_default(),
            tokens = response.usage.map(|u| u.total()).unwrap_or_default(),
            "completion received"
        );
        Ok(response)
    }

    /// List models with the key; a 401/403 means the key was rejected
    async fn verify_credentials(&self) -> Result<()> {
        let headers = LLMHttpClient::build_headers(PROVIDER_NAME, self.credential.expose())?;
        self.client.get(&self.models_url(), headers).await?;
        tracing::info!(model = %self.model, "credential accepted by provider");
        Ok(())
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn has_api_key(&self) -> bool {
        !self.credential.expose().is_empty()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "no_stops")]
    stop: &'a [String],
}

fn no_stops(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::stub_server::serve_once;

    fn provider_at(base_url: &str) -> OpenAIProvider {
        let mut config = ProviderConfig::new(Credential::new("sk-test-0000").unwrap());
        config.base_url = base_url.to_string();
        config.timeout_secs = 5;
        OpenAIProvider::new(config).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let provider = provider_at("https://api.openai.com/v1");
        assert_eq!(provider.model(), "gpt-4o-mini");
        assert_eq!(provider.completions_url(), "https://api.openai.com/v1/chat/completions");

        let provider = provider_at("http://localhost:8080/v1/");
        assert_eq!(provider.models_url(), "http://localhost:8080/v1/models");
    }

    #[test]
    fn test_request_uses_zero_temperature_and_stops() {
        let provider = provider_at("https://api.openai.com/v1");
        let messages = [
            Message::system("You are an agent."),
            Message::user("How many suppliers?"),
        ];
        let params = SamplingParams::default().with_stop(["\nObservation:"]);

        let json = serde_json::to_value(provider.build_request(&messages, &params)).unwrap();
        assert_eq!(json["temperature"], serde_json::json!(0.0));
        assert_eq!(json["stop"], serde_json::json!(["\nObservation:"]));
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "How many suppliers?");

        let json =
            serde_json::to_value(provider.build_request(&messages, &SamplingParams::default()))
                .unwrap();
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_parse_response() {
        let provider = provider_at("https://api.openai.com/v1");
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Final Answer: 5"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        }"#;

        let completion = provider.parse_response(body).unwrap();
        assert_eq!(completion.content, "Final Answer: 5");
        assert_eq!(completion.usage.map(|u| u.total()), Some(14));
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_malformed_response_is_upstream_error() {
        let provider = provider_at("https://api.openai.com/v1");
        assert!(matches!(
            provider.parse_response("<html>gateway</html>"),
            Err(SqlChatError::Upstream { .. })
        ));
        assert!(matches!(
            provider.parse_response(r#"{"model": "m", "choices": []}"#),
            Err(SqlChatError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejected_key_is_authentication_error() {
        let port = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        )
        .await;
        let provider = provider_at(&format!("http://127.0.0.1:{}/v1", port));

        match provider.verify_credentials().await {
            Err(SqlChatError::Authentication { provider, message }) => {
                assert_eq!(provider, "OpenAI");
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accepted_key_verifies() {
        let port = serve_once("200 OK", r#"{"object":"list","data":[]}"#).await;
        let provider = provider_at(&format!("http://127.0.0.1:{}/v1", port));
        assert!(provider.verify_credentials().await.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_error() {
        let port = serve_once("500 Internal Server Error", r#"{"error":{"message":"boom"}}"#).await;
        let provider = provider_at(&format!("http://127.0.0.1:{}/v1", port));

        let err = provider
            .generate(&[Message::user("hi")], &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SqlChatError::Upstream { status: Some(500), .. }));
    }
}
