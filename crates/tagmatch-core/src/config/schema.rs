use serde::{Deserialize, Serialize};

/// Settings for one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Regex for Drawing-1 tags (matched against upper-cased words).
    pub source_pattern: String,
    /// Regex for Drawing-2 tags. Mapping targets are recognised as well.
    pub target_pattern: String,
    /// Half-width of the search window around a tag's anchor, in points.
    pub tolerance: f32,
    /// Extra margin around highlight boxes, in points.
    pub padding: f32,
    /// Highlight opacity, 0.0 to 1.0.
    pub opacity: f32,
}
