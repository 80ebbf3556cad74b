pub mod config;
pub mod extract;
pub mod mapping;
pub mod validate;

use std::path::Path;
use tagmatch_core::config::schema::ValidationConfig;
use tagmatch_core::error::TagMatchError;
use tagmatch_core::extraction::pdftotext::PdftotextExtractor;

/// Built-in settings, or the given file layered over them.
pub fn load_effective_config(path: Option<&Path>) -> Result<ValidationConfig, TagMatchError> {
    match path {
        Some(path) => tagmatch_core::config::load_config(path),
        None => tagmatch_core::config::builtin::default_config(),
    }
}

/// The pdftotext backend, checked up front so a missing poppler install is
/// reported before any file is read.
pub fn pdftotext_extractor() -> Result<PdftotextExtractor, TagMatchError> {
    if !PdftotextExtractor::is_available() {
        return Err(TagMatchError::PdftotextNotFound);
    }
    Ok(PdftotextExtractor::new())
}
