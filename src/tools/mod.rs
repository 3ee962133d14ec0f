pub mod ask_document_tool;
pub mod category_links_tool;
pub mod list_categories_tool;
pub mod reload_document_tool;
pub mod search_links_tool;
#[cfg(feature = "voice")]
pub mod voice_question_tool;
