pub mod annotate;
pub mod config;
pub mod error;
pub mod extraction;
pub mod mapping;
pub mod matcher;
pub mod model;
pub mod summary;
pub mod tags;

use annotate::{annotate_pdf, HighlightStyle, SkippedHighlight};
use config::schema::ValidationConfig;
use error::TagMatchError;
use extraction::{ExtractedDocument, PdfExtractor};
use mapping::Mapping;
use matcher::{match_tags, MatchOptions, MatchResult};
use model::{Drawing, TagOccurrence};
use serde::{Deserialize, Serialize};
use summary::Summary;
use tags::{find_tags, TagRule};

/// Something that was skipped during a run without aborting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing: Option<Drawing>,
    pub message: String,
}

/// Outcome of matching two drawings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub summary: Summary,
    /// One entry per Drawing-1 tag, in document order.
    pub results: Vec<MatchResult>,
    /// Number of tags recognised on Drawing 2.
    pub target_tags: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RunWarning>,
}

/// Match report plus the annotated Drawing 2.
#[derive(Debug, Clone)]
pub struct ValidationOutput {
    pub report: MatchReport,
    pub annotated_pdf: Vec<u8>,
}

/// Extract tags from a single drawing.
pub fn extract_tags(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    rule: &TagRule,
) -> Result<(Vec<TagOccurrence>, ExtractedDocument), TagMatchError> {
    let doc = extractor.extract_document(pdf_bytes)?;
    let tags = find_tags(&doc.pages, rule);
    Ok((tags, doc))
}

/// Main API entry point: compare Drawing 2 against Drawing 1 through the
/// mapping, without touching the PDFs.
pub fn match_drawings(
    drawing1: &[u8],
    drawing2: &[u8],
    mapping: &Mapping,
    extractor: &dyn PdfExtractor,
    config: &ValidationConfig,
) -> Result<MatchReport, TagMatchError> {
    config::validate_config(config)?;
    let source_rule = TagRule::new(&config.source_pattern)?;
    let target_rule = TagRule::new(&config.target_pattern)?.with_known_values(mapping.targets());

    tracing::info!(backend = extractor.backend_name(), "extracting drawings");
    let (source_tags, source_doc) = extract_tags(drawing1, extractor, &source_rule)?;
    let (target_tags, target_doc) = extract_tags(drawing2, extractor, &target_rule)?;
    tracing::info!(
        source = source_tags.len(),
        target = target_tags.len(),
        "tags found"
    );

    let mut warnings = Vec::new();
    collect_page_warnings(&mut warnings, Drawing::Source, &source_doc);
    collect_page_warnings(&mut warnings, Drawing::Target, &target_doc);
    for row in &mapping.skipped_rows {
        warnings.push(RunWarning {
            drawing: None,
            message: format!("Skipped mapping row {}: {}", row.row, row.reason),
        });
    }
    for tag in &mapping.duplicates {
        warnings.push(RunWarning {
            drawing: None,
            message: format!("Duplicate mapping entry for {tag}, last row used"),
        });
    }

    let options = MatchOptions {
        tolerance: config.tolerance,
    };
    let results = match_tags(&source_tags, &target_tags, mapping, &options);
    let summary = Summary::from_results(&results);
    tracing::info!(
        total = summary.total,
        matched = summary.matched,
        mismatched = summary.mismatched,
        missing = summary.missing,
        unmapped = summary.unmapped,
        "matching finished"
    );

    Ok(MatchReport {
        summary,
        results,
        target_tags: target_tags.len(),
        warnings,
    })
}

/// Run the whole pipeline and return the annotated Drawing 2 with the report.
pub fn validate_drawings(
    drawing1: &[u8],
    drawing2: &[u8],
    mapping: &Mapping,
    extractor: &dyn PdfExtractor,
    config: &ValidationConfig,
) -> Result<ValidationOutput, TagMatchError> {
    let mut report = match_drawings(drawing1, drawing2, mapping, extractor, config)?;

    let style = HighlightStyle {
        padding: config.padding,
        opacity: config.opacity,
    };
    let annotated = annotate_pdf(drawing2, &report.results, &style)?;
    for SkippedHighlight { tag, page, reason } in annotated.skipped {
        report.warnings.push(RunWarning {
            drawing: Some(Drawing::Target),
            message: format!("No highlight for {tag} on page {page}: {reason}"),
        });
    }

    Ok(ValidationOutput {
        report,
        annotated_pdf: annotated.bytes,
    })
}

fn collect_page_warnings(warnings: &mut Vec<RunWarning>, drawing: Drawing, doc: &ExtractedDocument) {
    for page in &doc.skipped_pages {
        warnings.push(RunWarning {
            drawing: Some(drawing),
            message: format!("Skipped unreadable page {}: {}", page.page_number, page.reason),
        });
    }
}
