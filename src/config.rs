use serde::Deserialize;

use crate::engine::templates::TemplateVariety;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// OpenAI-compatible chat completions endpoint used as the chatbot and
/// workout-generation fallback. No key means the fallback is disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    /// Reply cap for chat answers.
    pub chat_max_tokens: u32,
    /// Reply cap for generated workouts; a full exercise array needs room.
    pub workout_max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
    pub template_variety: TemplateVariety,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fitcoach".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fitcoach-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24),
        };
        let llm = LlmConfig {
            api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1/chat/completions".into()),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".into()),
            timeout_secs: env_parse("LLM_TIMEOUT_SECS", 30),
            chat_max_tokens: env_parse("LLM_MAX_TOKENS", 150),
            workout_max_tokens: env_parse("LLM_WORKOUT_MAX_TOKENS", 1500),
        };
        let template_variety = match std::env::var("TEMPLATE_VARIETY").as_deref() {
            Ok("random") => TemplateVariety::Random,
            _ => TemplateVariety::Deterministic,
        };
        Ok(Self {
            database_url,
            jwt,
            llm,
            template_variety,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
