// Text extraction for the link directory document.
// Thin wrapper over the `pdf-extract` crate plus a process-wide text cache.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document not found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to extract text from {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: pdf_extract::OutputError,
    },
}

// Extracted text per document path. Recompute-on-miss; cleared only
// explicitly (reload) or at process exit.
static TEXT_CACHE: Lazy<Mutex<HashMap<PathBuf, String>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Extracts the full plain text of the PDF at `path`.
///
/// Pages are concatenated in page order, each page's text followed by a
/// single newline. A page that yields no text still contributes its
/// newline, so page boundaries remain visible downstream.
pub fn extract_document_text(path: &Path) -> Result<String, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let pages = pdf_extract::extract_text_by_pages(path).map_err(|source| {
        DocumentError::Extraction {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut text = String::new();
    for page in &pages {
        text.push_str(page);
        text.push('\n');
    }

    debug!(
        "Extracted {} characters from {} pages of {}",
        text.len(),
        pages.len(),
        path.display()
    );

    Ok(text)
}

/// Cached variant of [`extract_document_text`], keyed by path.
pub fn cached_document_text(path: &Path) -> Result<String, DocumentError> {
    {
        let cache = TEXT_CACHE.lock().unwrap();
        if let Some(text) = cache.get(path) {
            debug!("Using cached text for {}", path.display());
            return Ok(text.clone());
        }
    }

    let text = extract_document_text(path)?;

    let mut cache = TEXT_CACHE.lock().unwrap();
    cache.insert(path.to_path_buf(), text.clone());
    Ok(text)
}

/// Drops every cached extraction. The next read re-parses the file.
pub fn clear_document_cache() {
    let mut cache = TEXT_CACHE.lock().unwrap();
    let dropped = cache.len();
    cache.clear();
    if dropped > 0 {
        info!("Cleared {} cached document(s)", dropped);
    }
}
