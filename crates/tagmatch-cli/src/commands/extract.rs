use std::path::PathBuf;
use tagmatch_core::error::TagMatchError;
use tagmatch_core::tags::TagRule;

use crate::commands::{load_effective_config, pdftotext_extractor};
use crate::output;
use crate::Side;

pub fn run(
    pdf_file: PathBuf,
    side: Side,
    config_file: Option<PathBuf>,
    output_format: &str,
) -> Result<(), TagMatchError> {
    let extractor = pdftotext_extractor()?;
    let config = load_effective_config(config_file.as_deref())?;
    let pattern = match side {
        Side::Source => &config.source_pattern,
        Side::Target => &config.target_pattern,
    };
    let rule = TagRule::new(pattern)?;

    let pdf_bytes = std::fs::read(&pdf_file)?;
    let (tags, doc) = tagmatch_core::extract_tags(&pdf_bytes, &extractor, &rule)?;

    match output_format {
        "json" => println!("{}", serde_json::to_string_pretty(&tags)?),
        _ => println!("{}", output::table::format_tags(&tags, rule.pattern())),
    }

    for page in &doc.skipped_pages {
        eprintln!(
            "  warning: skipped unreadable page {}: {}",
            page.page_number, page.reason
        );
    }

    Ok(())
}
