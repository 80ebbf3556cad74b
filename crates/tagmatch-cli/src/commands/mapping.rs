use std::path::Path;
use tagmatch_core::error::TagMatchError;

pub fn validate(file: &Path, list: bool) -> Result<(), TagMatchError> {
    let mapping = tagmatch_core::mapping::load_mapping(file)?;

    println!("Mapping '{}' is valid.", file.display());
    println!("  Entries: {}", mapping.len());

    if list {
        let width = mapping.entries().map(|(s, _)| s.len()).max().unwrap_or(0);
        println!();
        for (source, target) in mapping.entries() {
            println!("  {:<width$}  ->  {}", source, target, width = width);
        }
    }

    if !mapping.skipped_rows.is_empty() {
        println!("\nSkipped rows:");
        for row in &mapping.skipped_rows {
            println!("  - row {}: {}", row.row, row.reason);
        }
    }

    if !mapping.duplicates.is_empty() {
        println!("\nDuplicate source tags (last row used):");
        for tag in &mapping.duplicates {
            println!("  - {}", tag);
        }
    }

    Ok(())
}
