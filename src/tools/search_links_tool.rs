use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::mcp::server::DocumentState;
use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::filter::search_links;

pub static SEARCH_LINKS_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "search-links".to_string(),
    description:
        "Search the link directory for entries whose title or category matches a query"
            .to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Case-insensitive substring to match against link titles and category labels"
            }
        },
        "required": ["query"]
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Search Links".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(false),
    }),
});

#[derive(Debug, Deserialize)]
struct SearchLinksParams {
    query: String,
}

pub struct SearchLinksTool;

impl SearchLinksTool {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        arguments: Option<serde_json::Value>,
        state: &DocumentState,
    ) -> CallToolResult {
        let params = match arguments {
            Some(args) => match serde_json::from_value::<SearchLinksParams>(args) {
                Ok(params) => params,
                Err(e) => {
                    error!("Invalid search parameters: {}", e);
                    return CallToolResult::error(format!("Invalid parameters: {}", e));
                }
            },
            None => {
                return CallToolResult::error("Missing required parameters");
            }
        };

        if params.query.is_empty() {
            return CallToolResult::error("Query must not be empty");
        }

        info!("Searching links for: \"{}\"", params.query);

        let matches = search_links(&state.catalog, &params.query);
        if matches.is_empty() {
            return CallToolResult::success(format!("No links matched \"{}\".", params.query));
        }

        let mut out = format!("## Links matching \"{}\"\n\n", params.query);
        for (position, link) in matches.iter().enumerate() {
            out.push_str(&format!("{}. {} – {}\n", position + 1, link.title, link.url));
        }
        out.push_str(&format!("\n{} match(es)", matches.len()));

        CallToolResult::success(out)
    }
}
