use crate::error::TagMatchError;
use crate::extraction::{ExtractedDocument, PageContent, PdfExtractor, SkippedPage, Word};
use crate::model::BBox;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox`, which reports every word with its bounding box
/// in points (origin top-left).
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    /// Fallback when the whole-document run fails: extract one page at a
    /// time so a single broken page does not lose the rest.
    fn extract_page_by_page(
        &self,
        pdf_bytes: &[u8],
        pdf_path: &Path,
    ) -> Result<ExtractedDocument, TagMatchError> {
        let page_count = lopdf::Document::load_mem(pdf_bytes)
            .map_err(|e| TagMatchError::Extraction(format!("cannot count pages: {e}")))?
            .get_pages()
            .len();

        let mut doc = ExtractedDocument::default();
        for page_number in 1..=page_count {
            let parsed = run_bbox(pdf_path, Some(page_number))
                .and_then(|xml| parse_bbox_xml(&xml, page_number));
            match parsed {
                Ok(pages) => doc.pages.extend(pages),
                Err(TagMatchError::PdftotextNotFound) => {
                    return Err(TagMatchError::PdftotextNotFound)
                }
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "skipping unreadable page");
                    doc.skipped_pages.push(SkippedPage {
                        page_number,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(doc)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_document(&self, pdf_bytes: &[u8]) -> Result<ExtractedDocument, TagMatchError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| TagMatchError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| TagMatchError::Extraction(e.to_string()))?;
        let tmp_path = tmpfile.path().to_path_buf();

        match run_bbox(&tmp_path, None).and_then(|xml| parse_bbox_xml(&xml, 1)) {
            Ok(pages) => Ok(ExtractedDocument {
                pages,
                skipped_pages: Vec::new(),
            }),
            Err(TagMatchError::PdftotextNotFound) => Err(TagMatchError::PdftotextNotFound),
            Err(e) => {
                tracing::warn!(error = %e, "whole-document extraction failed, retrying per page");
                self.extract_page_by_page(pdf_bytes, &tmp_path)
            }
        }
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Run `pdftotext -bbox`, optionally restricted to a single page.
fn run_bbox(pdf_path: &Path, page: Option<usize>) -> Result<String, TagMatchError> {
    let mut cmd = Command::new("pdftotext");
    cmd.arg("-bbox");
    if let Some(p) = page {
        cmd.arg("-f").arg(p.to_string()).arg("-l").arg(p.to_string());
    }
    let output = cmd.arg(pdf_path).arg("-").output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TagMatchError::PdftotextNotFound
        } else {
            TagMatchError::Extraction(format!("pdftotext -bbox failed: {}", e))
        }
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(TagMatchError::PdftotextFailed { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `pdftotext -bbox` XHTML into pages. `first_page` is the number of
/// the first `<page>` element (pdftotext does not number them).
fn parse_bbox_xml(xml: &str, first_page: usize) -> Result<Vec<PageContent>, TagMatchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages = Vec::new();
    let mut current: Option<PageContent> = None;
    let mut word_bbox: Option<BBox> = None;
    let mut word_text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| TagMatchError::Extraction(format!("malformed bbox output: {e}")))?;
        match event {
            Event::Start(ref e) if e.name().as_ref() == b"page" => {
                current = Some(PageContent {
                    page_number: first_page + pages.len(),
                    words: Vec::new(),
                });
            }
            Event::Empty(ref e) if e.name().as_ref() == b"page" => {
                pages.push(PageContent {
                    page_number: first_page + pages.len(),
                    words: Vec::new(),
                });
            }
            Event::Start(ref e) if e.name().as_ref() == b"word" => {
                word_bbox = parse_bbox(e);
                word_text.clear();
            }
            Event::Text(ref t) if word_bbox.is_some() => {
                let text = t
                    .unescape()
                    .map_err(|e| TagMatchError::Extraction(format!("bad word text: {e}")))?;
                word_text.push_str(&text);
            }
            Event::End(ref e) if e.name().as_ref() == b"word" => {
                if let (Some(bbox), Some(page)) = (word_bbox.take(), current.as_mut()) {
                    let text = word_text.trim();
                    if !text.is_empty() {
                        page.words.push(Word {
                            text: text.to_string(),
                            bbox,
                        });
                    }
                }
                word_text.clear();
            }
            Event::End(ref e) if e.name().as_ref() == b"page" => {
                if let Some(page) = current.take() {
                    pages.push(page);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn attr_f32(tag: &BytesStart<'_>, name: &[u8]) -> Option<f32> {
    tag.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok()?.parse().ok())
}

fn parse_bbox(word_tag: &BytesStart<'_>) -> Option<BBox> {
    Some(BBox {
        x_min: attr_f32(word_tag, b"xMin")?,
        y_min: attr_f32(word_tag, b"yMin")?,
        x_max: attr_f32(word_tag, b"xMax")?,
        y_max: attr_f32(word_tag, b"yMax")?,
    })
}
