//! LLM completion providers.

use crate::credentials::Provider;
use crate::http::{self, ProviderError};
use serde::{Deserialize, Serialize};

/// Default Groq OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default Groq model.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

const SYSTEM_PROMPT: &str = "Bạn là một nhà kể chuyện chuyên nghiệp, giỏi tạo ra những câu chuyện DÀI, CHI TIẾT và hấp dẫn. Hãy viết nội dung phong phú, sinh động với mô tả cụ thể, đối thoại và diễn biến tâm lý. QUAN TRỌNG: Chỉ trả về JSON thuần túy, không có text giải thích hoặc markdown. Bắt đầu response bằng { và kết thúc bằng }.";

/// A text-completion backend.
pub trait CompletionProvider: Send + Sync {
    /// Which credential set this provider draws keys from
    fn provider(&self) -> Provider {
        Provider::Groq
    }

    /// Complete a prompt, returning the raw model text
    fn complete(
        &self,
        api_key: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Groq chat-completions client.
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl Default for GroqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GroqClient {
    pub fn new() -> Self {
        Self {
            // Long stories take a while to generate
            http: http::build_client(std::time::Duration::from_secs(60)),
            base_url: GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check that the endpoint accepts `api_key` by listing its models.
    pub async fn test_connection(&self, api_key: &str) -> Result<(), ProviderError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(http::classify_status(status, &text))
    }
}

impl CompletionProvider for GroqClient {
    async fn complete(
        &self,
        api_key: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(http::classify_status(status, &text));
        }

        let text = response.text().await?;
        extract_content(&text)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions body.
fn extract_content(body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("chat completion body: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("empty completion".to_string()))
}
