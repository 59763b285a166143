//! OpenAI-compatible chat completions client.
//!
//! Used by workout generation when `use_llm` is set and by the chatbot when
//! no intent matches. Without an API key the [`DisabledLlm`] stands in and
//! every call fails with an upstream error, which callers mask.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::AppError;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one system + user turn and returns the assistant's text, capped
    /// at `max_tokens` reply tokens.
    async fn complete(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String, AppError>;
}

pub struct OpenAiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(cfg: &LlmConfig, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key,
            model: cfg.model.clone(),
        })
    }

    fn request<'a>(&'a self, system: &'a str, prompt: &'a str, max_tokens: u32) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatTurn {
                    role: "system",
                    content: system,
                },
                ChatTurn {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
            temperature: 0.7,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
        info!(model = %self.model, prompt_len = prompt.len(), max_tokens, "llm request");

        let request = self.request(system, prompt, max_tokens);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("llm request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, body = %text.chars().take(200).collect::<String>(), "llm api returned error");
            return Err(AppError::Upstream(format!("llm api error {status}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("llm response unreadable: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Upstream("llm returned no choices".into()))?;

        debug!(reply_len = content.len(), "llm reply received");
        Ok(content)
    }
}

/// Stand-in used when no API key is configured.
pub struct DisabledLlm;

#[async_trait]
impl LlmClient for DisabledLlm {
    async fn complete(&self, _system: &str, _prompt: &str, _max_tokens: u32) -> Result<String, AppError> {
        Err(AppError::Upstream("llm is not configured".into()))
    }
}

#[cfg(test)]
pub use fake::ScriptedLlm;

#[cfg(test)]
mod fake {
    use std::sync::Mutex;

    use super::*;

    /// Returns a fixed reply (or fails) and records every prompt it saw.
    pub struct ScriptedLlm {
        reply: Option<String>,
        pub prompts: Mutex<Vec<String>>,
        pub budgets: Mutex<Vec<u32>>,
    }

    impl ScriptedLlm {
        pub fn reply(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: Mutex::new(Vec::new()),
                budgets: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
                budgets: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _system: &str, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.budgets.lock().unwrap().push(max_tokens);
            self.reply
                .clone()
                .ok_or_else(|| AppError::Upstream("scripted failure".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_reports_upstream_error() {
        let err = DisabledLlm.complete("sys", "hi", 150).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn request_body_carries_the_callers_token_budget() {
        let cfg = LlmConfig {
            api_url: "http://localhost/unused".into(),
            api_key: None,
            model: "gpt-3.5-turbo".into(),
            timeout_secs: 1,
            chat_max_tokens: 150,
            workout_max_tokens: 1500,
        };
        let client = OpenAiClient::new(&cfg, "key".into()).unwrap();

        let v = serde_json::to_value(client.request("sys", "plan my week", cfg.workout_max_tokens)).unwrap();
        assert_eq!(v["model"], "gpt-3.5-turbo");
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "plan my week");
        assert_eq!(v["max_tokens"], 1500);

        let v = serde_json::to_value(client.request("sys", "hi", cfg.chat_max_tokens)).unwrap();
        assert_eq!(v["max_tokens"], 150);
    }

    #[test]
    fn response_parses_first_choice() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":" Hi! "}}]}"#)
                .unwrap();
        assert_eq!(body.choices[0].message.content, " Hi! ");
    }
}
