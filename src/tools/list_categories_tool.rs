use once_cell::sync::Lazy;
use serde_json::json;

use crate::mcp::server::DocumentState;
use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};

pub static LIST_CATEGORIES_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "list-categories".to_string(),
    description: "List the link categories found in the PDF directory, with link counts"
        .to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {}
    }),
    annotations: Some(ToolAnnotations {
        title: Some("List Categories".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(false),
    }),
});

pub struct ListCategoriesTool;

impl ListCategoriesTool {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, state: &DocumentState) -> CallToolResult {
        let catalog = &state.catalog;
        if catalog.is_empty() {
            return CallToolResult::success(
                "The document contains no recognized link categories.",
            );
        }

        let mut out = String::from("## Link categories\n\n");
        for category in catalog.categories() {
            out.push_str(&format!(
                "- {} ({} links)\n",
                category.label,
                category.links.len()
            ));
        }
        out.push_str(&format!(
            "\n{} categories, {} links total",
            catalog.categories().len(),
            catalog.total_links()
        ));

        CallToolResult::success(out)
    }
}
