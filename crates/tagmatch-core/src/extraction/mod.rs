pub mod pdftotext;

use crate::error::TagMatchError;
use crate::model::BBox;
use serde::{Deserialize, Serialize};

/// A single word from a page's text layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub page_number: usize,
    pub words: Vec<Word>,
}

/// A page that could not be read and was left out of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedPage {
    pub page_number: usize,
    pub reason: String,
}

/// All readable pages of one document, plus the pages that were skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub pages: Vec<PageContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_pages: Vec<SkippedPage>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract positioned words from PDF bytes. Pages that cannot be read
    /// are listed in `skipped_pages` instead of failing the whole call.
    fn extract_document(&self, pdf_bytes: &[u8]) -> Result<ExtractedDocument, TagMatchError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
