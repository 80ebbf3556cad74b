use std::io::Cursor;

use calamine::{Reader, Xlsx};

use crate::error::TagMatchError;
use crate::mapping::{resolve_columns, Mapping};

/// Parse an xlsx mapping from the first worksheet. Row 1 is the header,
/// laid out the same way as the CSV form.
pub fn parse_mapping_xlsx(bytes: &[u8]) -> Result<Mapping, TagMatchError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| TagMatchError::MappingInvalid(format!("failed to open xlsx: {e}")))?;

    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TagMatchError::MappingInvalid("workbook has no sheets".into()))?
        .map_err(|e| TagMatchError::MappingInvalid(format!("failed to read first sheet: {e}")))?;

    let mut rows = sheet.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| cell_as_string(c).unwrap_or_default())
            .collect(),
        None => return Err(TagMatchError::MappingInvalid("missing header row".into())),
    };
    let (source_col, target_col) = resolve_columns(&headers);

    let mut mapping = Mapping::default();
    for (i, cells) in rows.enumerate() {
        let row = i + 2;
        let source = cells.get(source_col).and_then(cell_as_string);
        let target = cells.get(target_col).and_then(cell_as_string);
        if source.is_none() && target.is_none() {
            continue;
        }
        mapping.insert_row(row, source.as_deref(), target.as_deref());
    }

    Ok(mapping)
}

fn cell_as_string(cell: &calamine::Data) -> Option<String> {
    match cell {
        calamine::Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        calamine::Data::Float(f) => Some(f.to_string()),
        calamine::Data::Int(i) => Some(i.to_string()),
        calamine::Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}
