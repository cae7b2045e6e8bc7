use super::DocumentText;
use crate::error::LoadError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile};

/// Reads a PDF from disk and returns the text of each page, in page order.
pub trait PageParser: Send + Sync {
    fn parse_pages(&self, path: &Path) -> Result<Vec<String>, String>;
}

/// Page parser backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractParser;

impl PageParser for PdfExtractParser {
    fn parse_pages(&self, path: &Path) -> Result<Vec<String>, String> {
        pdf_extract::extract_text_by_pages(path).map_err(|e| e.to_string())
    }
}

/// Writes the upload to a uniquely named temp file, parses it, and removes the file
/// on every exit path (success, parser error, or a panic inside the parser).
pub async fn load_pdf(bytes: &[u8], parser: Arc<dyn PageParser>) -> Result<DocumentText, LoadError> {
    let temp = write_temp_pdf(bytes)?;
    log::debug!("Wrote upload to temporary file {}", temp.path().display());

    let parsed = tokio::task::spawn_blocking(move || parse_and_release(temp, parser.as_ref()))
        .await
        .map_err(|e| LoadError::UnreadablePDF(format!("PDF parser crashed: {}", e)))?;

    let pages = parsed?;
    let text = DocumentText::from_units(pages);
    if text.is_blank() {
        return Err(LoadError::UnreadablePDF(
            "the document contains no extractable text".to_string(),
        ));
    }
    Ok(text)
}

fn write_temp_pdf(bytes: &[u8]) -> Result<NamedTempFile, LoadError> {
    let mut temp = Builder::new()
        .prefix("doctalk-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| LoadError::UnreadablePDF(format!("Failed to create temporary file: {}", e)))?;

    temp.write_all(bytes)
        .and_then(|_| temp.flush())
        .map_err(|e| LoadError::UnreadablePDF(format!("Failed to write temporary file: {}", e)))?;

    Ok(temp)
}

// Takes ownership of the temp file so it is dropped (and deleted) even if the parser unwinds.
fn parse_and_release(temp: NamedTempFile, parser: &dyn PageParser) -> Result<Vec<String>, LoadError> {
    let pages = parser.parse_pages(temp.path());

    let path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        log::warn!("Failed to remove temporary file {}: {}", path.display(), e);
    }

    pages.map_err(LoadError::UnreadablePDF)
}
