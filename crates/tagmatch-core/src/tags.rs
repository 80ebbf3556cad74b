use crate::error::TagMatchError;
use crate::extraction::{PageContent, Word};
use crate::model::{BBox, TagOccurrence};
use regex::Regex;
use std::collections::BTreeSet;

/// Decides which words on a page are tags.
///
/// Word text is upper-cased before matching. Besides the pattern, a rule can
/// carry a set of known values that are accepted verbatim (whole word only).
#[derive(Debug, Clone)]
pub struct TagRule {
    pattern: Regex,
    known: BTreeSet<String>,
}

impl TagRule {
    pub fn new(pattern: &str) -> Result<Self, TagMatchError> {
        let pattern = Regex::new(pattern).map_err(|e| {
            TagMatchError::ConfigInvalid(format!("invalid tag pattern '{pattern}': {e}"))
        })?;
        Ok(TagRule {
            pattern,
            known: BTreeSet::new(),
        })
    }

    pub fn with_known_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known
            .extend(values.into_iter().map(|v| normalize_tag(v.as_ref())));
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Tag occurrences within a single word, in offset order.
    fn find_in_word(&self, page: usize, word: &Word) -> Vec<TagOccurrence> {
        let text = normalize_tag(&word.text);
        if text.is_empty() {
            return Vec::new();
        }

        // A known value wins over any pattern match inside it.
        if self.known.contains(&text) {
            return vec![TagOccurrence {
                text,
                page,
                bbox: word.bbox,
            }];
        }

        self.pattern
            .find_iter(&text)
            .map(|m| TagOccurrence {
                text: m.as_str().to_string(),
                page,
                bbox: sub_bbox(&word.bbox, &text, m.start(), m.end()),
            })
            .collect()
    }
}

/// Canonical form used for tags and mapping values.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Find every tag on the given pages, in document order.
pub fn find_tags(pages: &[PageContent], rule: &TagRule) -> Vec<TagOccurrence> {
    let mut tags = Vec::new();
    for page in pages {
        for word in &page.words {
            tags.extend(rule.find_in_word(page.page_number, word));
        }
    }
    tags
}

/// Narrow a word's box to the byte range `start..end` of its text, assuming
/// evenly spaced characters.
fn sub_bbox(word: &BBox, text: &str, start: usize, end: usize) -> BBox {
    let total = text.chars().count();
    if total == 0 || (start == 0 && end == text.len()) {
        return *word;
    }
    let before = text[..start].chars().count() as f32;
    let inside = text[start..end].chars().count() as f32;
    let per_char = word.width() / total as f32;
    let x_min = word.x_min + before * per_char;
    BBox {
        x_min,
        y_min: word.y_min,
        x_max: x_min + inside * per_char,
        y_max: word.y_max,
    }
}
