use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::mcp::server::DocumentState;
use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::filter::filter_document_text;
use crate::utils::openrouter::OpenRouterService;

pub static ASK_DOCUMENT_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "ask-document".to_string(),
    description:
        "Ask a natural-language question about the link directory; the question plus a filtered \
         excerpt of the document are sent to OpenRouter and the model's answer is returned"
            .to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "question": {
                "type": "string",
                "description": "The question to answer from the document"
            },
            "maxAnswerTokens": {
                "type": "integer",
                "description": "Cap on the answer length in tokens (default: server setting)",
                "minimum": 1,
                "maximum": 4096
            }
        },
        "required": ["question"]
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Ask the Document".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(true),
    }),
});

#[derive(Debug, Deserialize)]
struct AskDocumentParams {
    question: String,
    #[serde(rename = "maxAnswerTokens")]
    max_answer_tokens: Option<u32>,
}

pub struct AskDocumentTool {
    api_key: Option<String>,
    model: String,
    default_max_tokens: u32,
}

impl AskDocumentTool {
    pub fn new(api_key: Option<String>, model: String, default_max_tokens: u32) -> Self {
        Self {
            api_key,
            model,
            default_max_tokens,
        }
    }

    pub async fn execute(
        &self,
        arguments: Option<serde_json::Value>,
        state: &DocumentState,
    ) -> CallToolResult {
        let params = match arguments {
            Some(args) => match serde_json::from_value::<AskDocumentParams>(args) {
                Ok(params) => params,
                Err(e) => {
                    error!("Invalid ask parameters: {}", e);
                    return CallToolResult::error(format!("Invalid parameters: {}", e));
                }
            },
            None => {
                return CallToolResult::error("Missing required parameters");
            }
        };

        if params.question.trim().is_empty() {
            return CallToolResult::error("Question must not be empty");
        }

        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                return CallToolResult::error(
                    "OpenRouter API key not configured; set OPENROUTER_API_KEY or pass --api-key",
                );
            }
        };

        let max_tokens = params.max_answer_tokens.unwrap_or(self.default_max_tokens);

        info!("Filtering document for lines relevant to the question");
        let excerpt = filter_document_text(&state.raw_text, &params.question);

        info!(
            "Requesting answer from OpenRouter (excerpt: {} chars, max_tokens: {})",
            excerpt.len(),
            max_tokens
        );

        let service = OpenRouterService::new(api_key, self.model.clone());
        match service.ask(&params.question, &excerpt, max_tokens).await {
            Ok(answer) => {
                info!("Answer received ({} chars)", answer.len());
                CallToolResult::success(answer)
            }
            Err(e) => {
                // The catalog stays usable; the failure is only this call's.
                error!("OpenRouter request failed: {}", e);
                CallToolResult::error(format!("Error: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::catalog::Catalog;

    fn state() -> DocumentState {
        let text = "🛒 Shopping\n1. Store – https://example.com/store\n".to_string();
        DocumentState {
            catalog: Catalog::build(&text),
            raw_text: text,
        }
    }

    #[tokio::test]
    async fn missing_api_key_is_a_tool_error() {
        let tool = AskDocumentTool::new(None, "openrouter/auto".to_string(), 256);
        let result = tool
            .execute(Some(json!({"question": "where to shop?"})), &state())
            .await;
        assert!(result.failed());
        assert!(result.text().contains("OPENROUTER_API_KEY"));
    }

    #[tokio::test]
    async fn blank_question_is_rejected_before_any_request() {
        let tool = AskDocumentTool::new(Some("sk-test".to_string()), "m".to_string(), 256);
        let result = tool.execute(Some(json!({"question": "  "})), &state()).await;
        assert!(result.failed());
        assert!(result.text().contains("Question must not be empty"));
    }

    #[tokio::test]
    async fn missing_arguments_are_rejected() {
        let tool = AskDocumentTool::new(Some("sk-test".to_string()), "m".to_string(), 256);
        let result = tool.execute(None, &state()).await;
        assert!(result.failed());
    }
}
