use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::mcp::server::DocumentState;
use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::catalog::Link;

pub static CATEGORY_LINKS_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "category-links".to_string(),
    description:
        "List the links of one category, or every link in the directory when no category is given"
            .to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "category": {
                "type": "string",
                "description": "Exact category label including its leading marker, e.g. \"🛒 Shopping\". Omit to list all categories."
            }
        }
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Category Links".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(false),
    }),
});

#[derive(Debug, Default, Deserialize)]
struct CategoryLinksParams {
    category: Option<String>,
}

pub struct CategoryLinksTool;

impl CategoryLinksTool {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        arguments: Option<serde_json::Value>,
        state: &DocumentState,
    ) -> CallToolResult {
        let params = match arguments {
            Some(args) => match serde_json::from_value::<CategoryLinksParams>(args) {
                Ok(params) => params,
                Err(e) => return CallToolResult::error(format!("Invalid parameters: {}", e)),
            },
            None => CategoryLinksParams::default(),
        };

        match params.category {
            Some(label) => {
                info!("Listing links for category: {}", label);
                let links = state.catalog.links_for(&label);
                if links.is_empty() {
                    // Unknown label and empty category read the same.
                    return CallToolResult::success(format!(
                        "No links found for category \"{}\".",
                        label
                    ));
                }
                let mut out = format!("## {}\n\n", label);
                out.push_str(&render_links(links));
                CallToolResult::success(out)
            }
            None => {
                info!("Listing all links");
                if state.catalog.is_empty() {
                    return CallToolResult::success("The directory contains no links.");
                }
                let sections: Vec<String> = state
                    .catalog
                    .categories()
                    .iter()
                    .map(|c| format!("## {}\n\n{}", c.label, render_links(&c.links)))
                    .collect();
                CallToolResult::success(sections.join("\n"))
            }
        }
    }
}

fn render_links(links: &[Link]) -> String {
    let mut out = String::new();
    for (position, link) in links.iter().enumerate() {
        out.push_str(&format!("{}. {} – {}\n", position + 1, link.title, link.url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::catalog::Catalog;

    fn state() -> DocumentState {
        let text = "🛒 Shopping\n\
                    1. Store – https://example.com/store\n\
                    2. Outlet – https://example.com/outlet\n\
                    🎬 Entertainment\n\
                    1. Cinema – https://example.com/cinema\n";
        DocumentState {
            raw_text: text.to_string(),
            catalog: Catalog::build(text),
        }
    }

    #[test]
    fn lists_one_category_in_source_order() {
        let result = CategoryLinksTool::new().execute(
            Some(json!({"category": "🛒 Shopping"})),
            &state(),
        );
        assert!(!result.failed());
        let text = result.text();
        assert!(text.contains("1. Store – https://example.com/store"));
        assert!(text.contains("2. Outlet – https://example.com/outlet"));
        assert!(!text.contains("Cinema"));
    }

    #[test]
    fn unknown_category_is_an_empty_listing_not_an_error() {
        let result = CategoryLinksTool::new().execute(
            Some(json!({"category": "📚 Books"})),
            &state(),
        );
        assert!(!result.failed());
        assert!(result.text().contains("No links found"));
    }

    #[test]
    fn omitted_category_lists_everything() {
        let result = CategoryLinksTool::new().execute(None, &state());
        assert!(!result.failed());
        let text = result.text();
        assert!(text.contains("## 🛒 Shopping"));
        assert!(text.contains("## 🎬 Entertainment"));
        assert!(text.contains("https://example.com/cinema"));
    }
}
