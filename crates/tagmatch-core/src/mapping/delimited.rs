use crate::error::TagMatchError;
use crate::mapping::{resolve_columns, Mapping};

/// Parse a CSV mapping. The first row is the header.
///
/// Rows that cannot be decoded or lack a value are skipped, not fatal.
pub fn parse_mapping_csv(bytes: &[u8]) -> Result<Mapping, TagMatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(TagMatchError::MappingInvalid("missing header row".into()));
    }
    let (source_col, target_col) = resolve_columns(&headers);

    let mut mapping = Mapping::default();
    for (i, record) in reader.records().enumerate() {
        // header is row 1
        let fallback_row = i + 2;
        match record {
            Ok(record) => {
                let row = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_row);
                if record.iter().all(|cell| cell.is_empty()) {
                    continue;
                }
                let needed = source_col.max(target_col) + 1;
                if record.len() < needed {
                    mapping.skip_row(row, format!("expected at least {needed} columns"));
                    continue;
                }
                mapping.insert_row(row, record.get(source_col), record.get(target_col));
            }
            Err(e) => mapping.skip_row(fallback_row, e.to_string()),
        }
    }

    Ok(mapping)
}
