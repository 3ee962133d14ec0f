use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::transport::StdioTransport;
use super::types::*;
use crate::tools::{
    ask_document_tool::{AskDocumentTool, ASK_DOCUMENT_TOOL_DEFINITION},
    category_links_tool::{CategoryLinksTool, CATEGORY_LINKS_TOOL_DEFINITION},
    list_categories_tool::{ListCategoriesTool, LIST_CATEGORIES_TOOL_DEFINITION},
    reload_document_tool::{ReloadDocumentTool, RELOAD_DOCUMENT_TOOL_DEFINITION},
    search_links_tool::{SearchLinksTool, SEARCH_LINKS_TOOL_DEFINITION},
};
#[cfg(feature = "voice")]
use crate::tools::voice_question_tool::{VoiceQuestionTool, VOICE_QUESTION_TOOL_DEFINITION};
use crate::utils::catalog::Catalog;
use crate::utils::pdf::{cached_document_text, DocumentError};

/// Process configuration resolved from the CLI and environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub pdf_path: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub max_answer_tokens: u32,
    #[cfg(feature = "voice")]
    pub record_seconds: u64,
    #[cfg(feature = "voice")]
    pub whisper_model: Option<PathBuf>,
}

/// One loaded snapshot of the document: the raw extracted text and the
/// catalog built from it. Read-only between loads; a reload replaces the
/// whole value.
pub struct DocumentState {
    pub raw_text: String,
    pub catalog: Catalog,
}

impl DocumentState {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let raw_text = cached_document_text(path)?;
        let catalog = Catalog::build(&raw_text);
        info!(
            "Loaded {}: {} categories, {} links",
            path.display(),
            catalog.categories().len(),
            catalog.total_links()
        );
        Ok(Self { raw_text, catalog })
    }
}

pub struct LinkServer {
    transport: StdioTransport,
    config: ServerConfig,
    state: DocumentState,
    initialized: bool,
}

impl LinkServer {
    pub fn new(config: ServerConfig, state: DocumentState) -> Self {
        Self {
            transport: StdioTransport::new(),
            config,
            state,
            initialized: false,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        info!("MCP server started and listening on stdio");

        loop {
            match self.transport.read_message().await? {
                Some(RpcMessage::Request(request)) => {
                    let response = self.handle_request(request).await;
                    self.transport.write_response(response).await?;
                }
                Some(RpcMessage::Notification(notification)) => {
                    self.handle_notification(notification);
                }
                None => {
                    info!("Client disconnected");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_request(&mut self, request: RpcRequest) -> RpcResponse {
        let id = RpcResponse::normalize_id(request.id);

        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(request.params).await,
            "ping" => Ok(serde_json::json!({})),
            other => Err(RpcError::method_not_found(other)),
        };

        match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        }
    }

    fn handle_notification(&mut self, notification: RpcNotification) {
        debug!("Received notification: {}", notification.method);

        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("Client initialization completed");
                self.initialized = true;
            }
            "notifications/cancelled" => {
                debug!("Request cancelled notification received");
            }
            other => {
                warn!("Unknown notification method: {}", other);
            }
        }
    }

    fn handle_initialize(
        &mut self,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, RpcError> {
        let params = params.ok_or_else(|| RpcError::invalid_params("missing params"))?;
        let _init: InitializeParams =
            serde_json::from_value(params).map_err(RpcError::invalid_params)?;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "PDF Link Directory MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Browse, search and query a categorized PDF link directory".to_string(),
                ),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(true),
                }),
                logging: Some(serde_json::json!({})),
            },
        };

        Ok(serde_json::to_value(result).expect("initialize result serializes"))
    }

    fn handle_list_tools(&self) -> Result<serde_json::Value, RpcError> {
        let mut tools = vec![
            LIST_CATEGORIES_TOOL_DEFINITION.clone(),
            CATEGORY_LINKS_TOOL_DEFINITION.clone(),
            SEARCH_LINKS_TOOL_DEFINITION.clone(),
            RELOAD_DOCUMENT_TOOL_DEFINITION.clone(),
        ];

        // Only advertise the ask tool when a key is configured; calls to
        // it still answer with a tool error either way.
        if self.config.api_key.is_some() {
            tools.push(ASK_DOCUMENT_TOOL_DEFINITION.clone());
        }

        #[cfg(feature = "voice")]
        tools.push(VOICE_QUESTION_TOOL_DEFINITION.clone());

        let result = ListToolsResult { tools };
        Ok(serde_json::to_value(result).expect("tool list serializes"))
    }

    async fn handle_call_tool(
        &mut self,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, RpcError> {
        let params = params.ok_or_else(|| RpcError::invalid_params("missing params"))?;
        let call: CallToolParams =
            serde_json::from_value(params).map_err(RpcError::invalid_params)?;

        let tool_name = call.name.clone();
        let result = self.dispatch_tool(call).await;
        if result.failed() {
            warn!("Tool call '{}' returned an error result", tool_name);
        } else {
            debug!(
                "Tool call '{}' produced {} chars",
                tool_name,
                result.text().len()
            );
        }
        Ok(serde_json::to_value(result).expect("tool result serializes"))
    }

    async fn dispatch_tool(&mut self, call: CallToolParams) -> CallToolResult {
        match call.name.as_str() {
            "list-categories" => ListCategoriesTool::new().execute(&self.state),
            "category-links" => CategoryLinksTool::new().execute(call.arguments, &self.state),
            "search-links" => SearchLinksTool::new().execute(call.arguments, &self.state),
            "ask-document" => {
                let tool = AskDocumentTool::new(
                    self.config.api_key.clone(),
                    self.config.model.clone(),
                    self.config.max_answer_tokens,
                );
                tool.execute(call.arguments, &self.state).await
            }
            "reload-document" => {
                ReloadDocumentTool::new().execute(&self.config.pdf_path, &mut self.state)
            }
            #[cfg(feature = "voice")]
            "voice-question" => {
                let tool = VoiceQuestionTool::new(
                    self.config.record_seconds,
                    self.config.whisper_model.clone(),
                );
                tool.execute(call.arguments).await
            }
            other => CallToolResult::error(format!("Tool not found: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> DocumentState {
        let raw_text = "🛒 Shopping\n\
                        1. Example Store – https://example.com/shop\n\
                        🎓 Education\n\
                        1. Course – https://example.com/course\n"
            .to_string();
        let catalog = Catalog::build(&raw_text);
        DocumentState { raw_text, catalog }
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            pdf_path: PathBuf::from("assets/links.pdf"),
            api_key: None,
            model: "openrouter/auto".to_string(),
            max_answer_tokens: 256,
            #[cfg(feature = "voice")]
            record_seconds: 5,
            #[cfg(feature = "voice")]
            whisper_model: None,
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_a_tool_error() {
        let mut server = LinkServer::new(test_config(), test_state());
        let result = server
            .dispatch_tool(CallToolParams {
                name: "does-not-exist".to_string(),
                arguments: None,
            })
            .await;
        assert!(result.failed());
        assert!(result.text().contains("does-not-exist"));
    }

    #[tokio::test]
    async fn catalog_tools_work_without_an_api_key() {
        let mut server = LinkServer::new(test_config(), test_state());
        let result = server
            .dispatch_tool(CallToolParams {
                name: "search-links".to_string(),
                arguments: Some(serde_json::json!({"query": "course"})),
            })
            .await;
        assert!(!result.failed());
        assert!(result.text().contains("https://example.com/course"));
    }

    #[tokio::test]
    async fn ask_without_key_errors_but_server_keeps_state() {
        let mut server = LinkServer::new(test_config(), test_state());
        let result = server
            .dispatch_tool(CallToolParams {
                name: "ask-document".to_string(),
                arguments: Some(serde_json::json!({"question": "any shops?"})),
            })
            .await;
        assert!(result.failed());

        let list = server
            .dispatch_tool(CallToolParams {
                name: "list-categories".to_string(),
                arguments: None,
            })
            .await;
        assert!(!list.failed());
        assert!(list.text().contains("🛒 Shopping"));
    }

    #[test]
    fn ask_tool_is_hidden_without_a_key() {
        let server = LinkServer::new(test_config(), test_state());
        let tools = server.handle_list_tools().expect("listing succeeds");
        let names: Vec<String> = tools["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"list-categories".to_string()));
        assert!(names.contains(&"reload-document".to_string()));
        assert!(!names.contains(&"ask-document".to_string()));
    }

    #[test]
    fn ask_tool_is_listed_with_a_key() {
        let mut config = test_config();
        config.api_key = Some("sk-test".to_string());
        let server = LinkServer::new(config, test_state());
        let tools = server.handle_list_tools().expect("listing succeeds");
        assert!(tools["tools"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["name"] == "ask-document"));
    }
}
