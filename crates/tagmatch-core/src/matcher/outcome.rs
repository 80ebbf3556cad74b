use crate::model::TagOccurrence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a Drawing-1 tag fared against Drawing 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// The expected counterpart sits at the tag's location.
    Matched,
    /// A different tag sits at the tag's location.
    Mismatched,
    /// No tag sits at the tag's location.
    Missing,
    /// The tag has no mapping entry.
    Unmapped,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Matched,
        Classification::Mismatched,
        Classification::Missing,
        Classification::Unmapped,
    ];

    /// Highlight color as RGB components in 0.0..=1.0.
    pub fn color(&self) -> [f32; 3] {
        match self {
            Classification::Matched => [0.0, 1.0, 0.0],
            Classification::Mismatched => [1.0, 0.0, 0.0],
            Classification::Missing | Classification::Unmapped => [0.53, 0.81, 0.92],
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Matched => write!(f, "Matched"),
            Classification::Mismatched => write!(f, "Mismatched"),
            Classification::Missing => write!(f, "Missing"),
            Classification::Unmapped => write!(f, "Unmapped"),
        }
    }
}

/// Result for one Drawing-1 tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// The Drawing-1 tag.
    pub occurrence: TagOccurrence,
    pub classification: Classification,
    /// Expected Drawing-2 tag from the mapping, if mapped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// The Drawing-2 tag that decided the result (matched or mismatched).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<TagOccurrence>,
    /// Anchor distance to the counterpart, in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}
