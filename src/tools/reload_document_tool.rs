use once_cell::sync::Lazy;
use serde_json::json;
use std::path::Path;
use tracing::{error, info};

use crate::mcp::server::DocumentState;
use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::pdf::clear_document_cache;

pub static RELOAD_DOCUMENT_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "reload-document".to_string(),
    description: "Re-read the PDF from disk and rebuild the link catalog from scratch".to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {}
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Reload Document".to_string()),
        read_only_hint: Some(false),
        open_world_hint: Some(false),
    }),
});

pub struct ReloadDocumentTool;

impl ReloadDocumentTool {
    pub fn new() -> Self {
        Self
    }

    /// Clears the extraction cache and swaps in a freshly built state.
    /// On failure the previous snapshot stays in place.
    pub fn execute(&self, pdf_path: &Path, state: &mut DocumentState) -> CallToolResult {
        info!("Reloading document from {}", pdf_path.display());
        clear_document_cache();

        match DocumentState::load(pdf_path) {
            Ok(fresh) => {
                *state = fresh;
                CallToolResult::success(format!(
                    "Reloaded {}: {} categories, {} links.",
                    pdf_path.display(),
                    state.catalog.categories().len(),
                    state.catalog.total_links()
                ))
            }
            Err(e) => {
                error!("Reload failed: {}", e);
                CallToolResult::error(format!("Error reloading document: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::catalog::Catalog;

    #[test]
    fn failed_reload_keeps_the_previous_snapshot() {
        let text = "🛒 Shopping\n1. Store – https://example.com/store\n".to_string();
        let mut state = DocumentState {
            catalog: Catalog::build(&text),
            raw_text: text,
        };

        let result =
            ReloadDocumentTool::new().execute(Path::new("/missing/links.pdf"), &mut state);

        assert!(result.failed());
        assert!(result.text().contains("not found"));
        assert_eq!(state.catalog.total_links(), 1);
    }
}
