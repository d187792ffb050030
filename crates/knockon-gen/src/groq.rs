use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::generator::effect_prompt;
use crate::generator::parse_effect_titles;
use crate::generator::TextGenerator;

pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Error)]
pub enum GenError {
    #[error("GROQ_API_KEY is not set")]
    MissingApiKey,
    #[error("auth failed: {0}")]
    Auth(String),
    #[error("rate limit: {0}")]
    RateLimit(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("parsing failed: {0}")]
    Parsing(String),
    #[error("model returned an empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl GroqConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client for the Groq API. Used behind [`TextGenerator`],
/// where every failure becomes a represented error string instead of
/// propagating into the shell.
pub struct GroqClient {
    config: GroqConfig,
    http: reqwest::blocking::Client,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self, GenError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| GenError::Network(err.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> Result<Self, GenError> {
        Self::new(GroqConfig::from_env())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn complete(&self, prompt: &str) -> Result<String, GenError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenError::MissingApiKey)?;
        let body = ChatRequestBody {
            model: &self.config.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|err| GenError::Network(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|err| GenError::Network(err.to_string()))?;

        if !status.is_success() {
            let detail = snippet(&text);
            return Err(match status.as_u16() {
                401 | 403 => GenError::Auth(detail),
                429 => GenError::RateLimit(detail),
                400..=499 => GenError::InvalidRequest(detail),
                _ => GenError::Api(detail),
            });
        }

        let parsed: ChatResponseBody = serde_json::from_str(&text)
            .map_err(|err| GenError::Parsing(format!("{err}: {}", snippet(&text))))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GenError::EmptyCompletion);
        }
        Ok(content)
    }
}

impl TextGenerator for GroqClient {
    fn generate_effects(&self, text: &str, order: u32) -> Vec<String> {
        match self.complete(&effect_prompt(text, order)) {
            Ok(response) => parse_effect_titles(&response),
            Err(err) => vec![format!("Error fetching effects: {err}")],
        }
    }

    fn answer_question(&self, question: &str) -> String {
        match self.complete(question) {
            Ok(answer) => answer,
            Err(err) => format!("Error fetching response: {err}"),
        }
    }
}

fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn client_without_key() -> GroqClient {
        GroqClient::new(GroqConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn missing_api_key_becomes_a_represented_error() {
        let client = client_without_key();

        assert_eq!(
            client.generate_effects("any policy", 1),
            vec!["Error fetching effects: GROQ_API_KEY is not set".to_string()]
        );
        assert_eq!(
            client.answer_question("any question"),
            "Error fetching response: GROQ_API_KEY is not set"
        );
    }

    #[test]
    fn endpoint_tolerates_a_trailing_slash() {
        let client = GroqClient::new(GroqConfig {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
        .unwrap();

        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn error_display_matches_the_status_taxonomy() {
        assert_eq!(
            GenError::Auth("denied".to_string()).to_string(),
            "auth failed: denied"
        );
        assert_eq!(
            GenError::RateLimit("slow down".to_string()).to_string(),
            "rate limit: slow down"
        );
        assert_eq!(
            GenError::Network("timed out".to_string()).to_string(),
            "network error: timed out"
        );
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let body = "y".repeat(400);
        let cut = snippet(&body);
        assert_eq!(cut.chars().count(), 203);
        assert!(cut.ends_with("..."));
        assert_eq!(snippet("  short  "), "short");
    }
}
