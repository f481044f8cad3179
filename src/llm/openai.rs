/// OpenAI-compatible chat completion client.
///
/// Talks to `POST {base_url}/chat/completions` with the synchronous `ureq`
/// HTTP client and a bearer token taken from the environment. Works against
/// OpenRouter, OpenAI and any server that mirrors the same schema.
///
/// JSON completions first ask for `response_format: json_object`; some
/// models reject that parameter, so a failed call is retried once without
/// it and the prompt alone carries the instruction.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::LanguageModel;
use super::prompts::JSON_ONLY_SUFFIX;
use crate::config::schema::LlmConfig;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response body from `POST /chat/completions` (non-streaming).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous OpenAI-compatible client.
#[derive(Debug)]
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: String,
    answer_temperature: f64,
    judge_temperature: f64,
    agent: ureq::Agent,
}

impl OpenAiClient {
    /// Build a client from the resolved config, reading the API key from
    /// the environment variable named by `api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{} is not set", config.api_key_env))?;
        Ok(Self::with_api_key(config, api_key))
    }

    /// Build a client with an explicit API key.
    pub fn with_api_key(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let agent = builder.build();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            answer_temperature: config.answer_temperature,
            judge_temperature: config.judge_temperature,
            agent,
        }
    }

    /// Send chat messages and return the assistant's reply.
    pub fn chat(&self, messages: &[ChatMessage], temperature: f64, json_mode: bool) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let resp = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .context("chat completion request failed")?;

        let parsed: ChatResponse = resp
            .into_json()
            .context("failed to parse chat completion response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            anyhow::bail!("model returned an empty response");
        }

        Ok(content)
    }
}

impl LanguageModel for OpenAiClient {
    fn complete(&self, prompt: &str, system: &str) -> Result<String> {
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        self.chat(&messages, self.answer_temperature, false)
    }

    fn complete_json(&self, prompt: &str, system: &str) -> Result<String> {
        let messages = [
            ChatMessage::system(format!("{system}{JSON_ONLY_SUFFIX}")),
            ChatMessage::user(prompt),
        ];

        match self.chat(&messages, self.judge_temperature, true) {
            Ok(content) => Ok(content),
            Err(e) => {
                tracing::debug!(error = %format!("{e:#}"), "json_object mode failed, retrying without it");
                self.chat(&messages, self.judge_temperature, false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash() {
        let mut config = LlmConfig::default();
        config.base_url = "https://openrouter.ai/api/v1/".to_string();
        let client = OpenAiClient::with_api_key(&config, "sk-test");
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(client.model_name(), "google/gemini-2.0-flash-001");
    }

    #[test]
    fn from_config_requires_api_key() {
        let mut config = LlmConfig::default();
        config.api_key_env = "RAGJUDGE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = OpenAiClient::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("RAGJUDGE_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn request_omits_response_format_in_plain_mode() {
        let messages = [ChatMessage::user("hi")];
        let plain = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 0.7,
            response_format: None,
        };
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("response_format"));

        let strict = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 0.2,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };
        let json = serde_json::to_string(&strict).unwrap();
        assert!(json.contains(r#""response_format":{"type":"json_object"}"#));
    }

    #[test]
    fn response_tolerates_null_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
                .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
