pub mod delimited;
pub mod workbook;

use crate::error::TagMatchError;
use crate::tags::normalize_tag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Header names recognised for the source and target columns.
pub const SOURCE_HEADER: &str = "Drawing1_No";
pub const TARGET_HEADER: &str = "Drawing2_No";

/// A mapping-file row that was left out of the mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based row number in the file (the header is row 1).
    pub row: usize,
    pub reason: String,
}

/// Lookup table from Drawing-1 tag to expected Drawing-2 tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mapping {
    entries: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_rows: Vec<SkippedRow>,
    /// Source tags that appeared more than once (the last row wins).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<String>,
}

impl Mapping {
    /// Build a mapping from in-memory pairs. Values are normalized.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut mapping = Mapping::default();
        for (i, (source, target)) in pairs.into_iter().enumerate() {
            mapping.insert_row(i + 1, Some(source.as_ref()), Some(target.as_ref()));
        }
        mapping
    }

    /// Expected Drawing-2 tag for a Drawing-1 tag.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(&normalize_tag(source)).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All target values, used to recognise Drawing-2 tags that do not fit
    /// the target pattern.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|v| v.as_str())
    }

    /// Add one row; rows with a missing or empty cell are recorded as skipped.
    pub(crate) fn insert_row(&mut self, row: usize, source: Option<&str>, target: Option<&str>) {
        let source = source.map(normalize_tag).unwrap_or_default();
        let target = target.map(normalize_tag).unwrap_or_default();

        let reason = match (source.is_empty(), target.is_empty()) {
            (true, true) => Some("empty source and target tag"),
            (true, false) => Some("empty source tag"),
            (false, true) => Some("empty target tag"),
            (false, false) => None,
        };
        if let Some(reason) = reason {
            tracing::warn!(row, reason, "skipping mapping row");
            self.skipped_rows.push(SkippedRow {
                row,
                reason: reason.to_string(),
            });
            return;
        }

        if self.entries.insert(source.clone(), target).is_some() {
            tracing::warn!(row, tag = %source, "duplicate mapping entry, last row wins");
            if !self.duplicates.contains(&source) {
                self.duplicates.push(source);
            }
        }
    }

    pub(crate) fn skip_row(&mut self, row: usize, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(row, reason = %reason, "skipping mapping row");
        self.skipped_rows.push(SkippedRow { row, reason });
    }
}

/// Pick the source and target column indices from a header row.
///
/// Uses the `Drawing1_No` / `Drawing2_No` columns when present, otherwise
/// the first two columns.
pub(crate) fn resolve_columns(headers: &[String]) -> (usize, usize) {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    match (find(SOURCE_HEADER), find(TARGET_HEADER)) {
        (Some(s), Some(t)) => (s, t),
        _ => (0, 1),
    }
}

/// Load a mapping file. `.xlsx` files are read from their first sheet,
/// anything else is parsed as CSV.
pub fn load_mapping(path: &Path) -> Result<Mapping, TagMatchError> {
    let bytes = std::fs::read(path).map_err(|e| TagMatchError::MappingLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let is_xlsx = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);

    let parsed = if is_xlsx {
        workbook::parse_mapping_xlsx(&bytes)
    } else {
        delimited::parse_mapping_csv(&bytes)
    };
    let mapping = parsed.map_err(|e| TagMatchError::MappingLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    validate_mapping(&mapping)?;
    tracing::info!(
        path = %path.display(),
        entries = mapping.len(),
        skipped = mapping.skipped_rows.len(),
        "loaded mapping"
    );
    Ok(mapping)
}

/// A mapping without a single usable row cannot classify anything.
pub fn validate_mapping(mapping: &Mapping) -> Result<(), TagMatchError> {
    if mapping.is_empty() {
        return Err(TagMatchError::MappingInvalid(format!(
            "no usable rows ({} skipped)",
            mapping.skipped_rows.len()
        )));
    }
    Ok(())
}
