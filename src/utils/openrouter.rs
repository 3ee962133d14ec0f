use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openrouter/auto";

/// Default answer-length cap. 256 fits the free tier; deployments that can
/// afford longer answers run with 512.
pub const DEFAULT_MAX_ANSWER_TOKENS: u32 = 256;

const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant. Given the following PDF content, \
     answer the user's question by extracting and listing relevant links from the text. \
     Only return links that are relevant to the user's prompt.";

#[derive(Error, Debug)]
pub enum OpenRouterError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response, passed through as "<status> - <body>" without
    /// interpretation or retry.
    #[error("{0}")]
    Api(String),

    #[error("chat completion contained no choices")]
    EmptyAnswer,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Blocking-style (single round trip, no retry) client for the OpenRouter
/// chat-completions endpoint. The 30 second client timeout is the only
/// safeguard on the call.
pub struct OpenRouterService {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenRouterService {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            model,
            endpoint: OPENROUTER_ENDPOINT.to_string(),
        }
    }

    /// Sends `question` together with a document `excerpt` and returns the
    /// model's answer, capped at `max_tokens` output tokens.
    pub async fn ask(
        &self,
        question: &str,
        excerpt: &str,
        max_tokens: u32,
    ) -> Result<String, OpenRouterError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("PDF Content:\n{}\n\nUser Prompt: {}", excerpt, question),
                },
            ],
            max_tokens,
        };

        debug!(
            "Sending chat completion request (model: {}, max_tokens: {}, excerpt: {} chars)",
            self.model,
            max_tokens,
            excerpt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OpenRouterError::Api(format!(
                "{} - {}",
                status.as_u16(),
                body
            )));
        }

        let completion: ChatResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(OpenRouterError::EmptyAnswer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_the_expected_wire_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "PDF Content:\nexcerpt\n\nUser Prompt: question".to_string(),
                },
            ],
            max_tokens: DEFAULT_MAX_ANSWER_TOKENS,
        };

        let body = serde_json::to_value(&request).expect("serializes");
        assert_eq!(body["model"], "openrouter/auto");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .starts_with("PDF Content:\n"));
    }

    #[test]
    fn answer_is_read_from_choices_message_content() {
        let payload = r#"{
            "id": "gen-1",
            "choices": [
                {"message": {"role": "assistant", "content": "Here are the links."}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(payload).expect("parses");
        assert_eq!(parsed.choices[0].message.content, "Here are the links.");
    }

    #[test]
    fn api_errors_pass_status_and_body_through_verbatim() {
        let err = OpenRouterError::Api(format!("{} - {}", 402, r#"{"error":"quota"}"#));
        assert_eq!(err.to_string(), r#"402 - {"error":"quota"}"#);
    }

    #[test]
    fn missing_choices_is_an_empty_answer() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).expect("parses");
        assert!(parsed.choices.is_empty());
    }
}
