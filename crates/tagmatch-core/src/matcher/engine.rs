use crate::mapping::Mapping;
use crate::matcher::outcome::{Classification, MatchResult};
use crate::model::TagOccurrence;
use std::collections::HashMap;

/// Matching policy.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Half-width of the square search window around a tag's anchor, in points.
    pub tolerance: f32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions { tolerance: 10.0 }
    }
}

/// Classify every Drawing-1 tag against Drawing 2.
///
/// Returns exactly one result per source tag, in source order.
pub fn match_tags(
    source: &[TagOccurrence],
    target: &[TagOccurrence],
    mapping: &Mapping,
    options: &MatchOptions,
) -> Vec<MatchResult> {
    let index = GridIndex::build(target, options.tolerance);
    source
        .iter()
        .map(|tag| classify_tag(tag, &index, mapping, options))
        .collect()
}

fn classify_tag(
    tag: &TagOccurrence,
    index: &GridIndex<'_>,
    mapping: &Mapping,
    options: &MatchOptions,
) -> MatchResult {
    let Some(expected) = mapping.get(&tag.text) else {
        tracing::debug!(tag = %tag.text, page = tag.page, "unmapped");
        return MatchResult {
            occurrence: tag.clone(),
            classification: Classification::Unmapped,
            expected: None,
            counterpart: None,
            distance: None,
        };
    };

    let candidates = index.within(tag, options.tolerance);

    // Prefer the expected value anywhere in the window; otherwise the
    // nearest tag decides.
    let (classification, counterpart) =
        match nearest(tag, candidates.iter().copied().filter(|c| c.text == expected)) {
            Some(hit) => (Classification::Matched, Some(hit)),
            None => match nearest(tag, candidates.iter().copied()) {
                Some(other) => (Classification::Mismatched, Some(other)),
                None => (Classification::Missing, None),
            },
        };

    tracing::debug!(
        tag = %tag.text,
        page = tag.page,
        expected,
        found = counterpart.map(|c| c.text.as_str()).unwrap_or("-"),
        result = %classification,
        "classified tag"
    );

    MatchResult {
        occurrence: tag.clone(),
        classification,
        expected: Some(expected.to_string()),
        distance: counterpart.map(|c| tag.distance_to(c)),
        counterpart: counterpart.cloned(),
    }
}

/// Nearest candidate by anchor distance; ties keep the earlier candidate.
fn nearest<'a, I>(tag: &TagOccurrence, candidates: I) -> Option<&'a TagOccurrence>
where
    I: Iterator<Item = &'a TagOccurrence>,
{
    let mut best: Option<(&TagOccurrence, f32)> = None;
    for candidate in candidates {
        let d = tag.distance_to(candidate);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((candidate, d));
        }
    }
    best.map(|(c, _)| c)
}

/// Buckets tag anchors into square cells per page so a window lookup only
/// visits neighbouring cells.
struct GridIndex<'a> {
    tags: &'a [TagOccurrence],
    cell: f32,
    buckets: HashMap<(usize, i64, i64), Vec<usize>>,
}

impl<'a> GridIndex<'a> {
    fn build(tags: &'a [TagOccurrence], tolerance: f32) -> Self {
        let cell = tolerance.max(1.0);
        let mut buckets: HashMap<(usize, i64, i64), Vec<usize>> = HashMap::new();
        for (i, tag) in tags.iter().enumerate() {
            let (x, y) = tag.anchor();
            buckets
                .entry((tag.page, cell_of(x, cell), cell_of(y, cell)))
                .or_default()
                .push(i);
        }
        GridIndex {
            tags,
            cell,
            buckets,
        }
    }

    /// Tags on the same page whose anchor lies within `tolerance` on both
    /// axes, in document order.
    fn within(&self, tag: &TagOccurrence, tolerance: f32) -> Vec<&'a TagOccurrence> {
        let (x, y) = tag.anchor();
        let (cx, cy) = (cell_of(x, self.cell), cell_of(y, self.cell));
        let mut hits = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.buckets.get(&(tag.page, cx + dx, cy + dy)) {
                    hits.extend(bucket.iter().copied());
                }
            }
        }
        hits.retain(|&i| {
            let (tx, ty) = self.tags[i].anchor();
            (tx - x).abs() <= tolerance && (ty - y).abs() <= tolerance
        });
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.tags[i]).collect()
    }
}

fn cell_of(v: f32, cell: f32) -> i64 {
    (v / cell).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn tag(text: &str, page: usize, x: f32, y: f32) -> TagOccurrence {
        TagOccurrence {
            text: text.into(),
            page,
            bbox: BBox::new(x, y, x + 35.0, y + 8.0),
        }
    }

    fn mapping() -> Mapping {
        Mapping::from_pairs([("5-AD001", "RHL-001"), ("5-AD002", "RHL-002")])
    }

    fn classify_one(target: &[TagOccurrence]) -> MatchResult {
        let source = [tag("5-AD001", 1, 100.0, 200.0)];
        let mut results = match_tags(&source, target, &mapping(), &MatchOptions::default());
        assert_eq!(results.len(), 1);
        results.remove(0)
    }

    #[test]
    fn test_counterpart_within_tolerance_matched() {
        let result = classify_one(&[tag("RHL-001", 1, 100.0, 201.0)]);
        assert_eq!(result.classification, Classification::Matched);
        assert_eq!(result.expected.as_deref(), Some("RHL-001"));
        assert_eq!(result.counterpart.unwrap().text, "RHL-001");
        assert_eq!(result.distance, Some(1.0));
    }

    #[test]
    fn test_wrong_tag_at_location_mismatched() {
        let result = classify_one(&[tag("RHL-002", 1, 100.0, 201.0)]);
        assert_eq!(result.classification, Classification::Mismatched);
        assert_eq!(result.counterpart.unwrap().text, "RHL-002");
    }

    #[test]
    fn test_nothing_at_location_missing() {
        let result = classify_one(&[tag("RHL-001", 1, 400.0, 500.0)]);
        assert_eq!(result.classification, Classification::Missing);
        assert!(result.counterpart.is_none());
        assert!(result.distance.is_none());
    }

    #[test]
    fn test_other_page_not_considered() {
        let result = classify_one(&[tag("RHL-001", 2, 100.0, 200.0)]);
        assert_eq!(result.classification, Classification::Missing);
    }

    #[test]
    fn test_window_edges_inclusive() {
        let result = classify_one(&[tag("RHL-001", 1, 110.0, 190.0)]);
        assert_eq!(result.classification, Classification::Matched);
        let result = classify_one(&[tag("RHL-001", 1, 110.5, 200.0)]);
        assert_eq!(result.classification, Classification::Missing);
    }

    #[test]
    fn test_unmapped_regardless_of_target() {
        let source = [tag("5-AD999", 1, 100.0, 200.0)];
        let target = [tag("RHL-001", 1, 100.0, 200.0)];
        let results = match_tags(&source, &target, &mapping(), &MatchOptions::default());
        assert_eq!(results[0].classification, Classification::Unmapped);
        assert!(results[0].expected.is_none());
        assert!(results[0].counterpart.is_none());
    }

    #[test]
    fn test_expected_value_preferred_over_nearer_tag() {
        let result = classify_one(&[
            tag("RHL-007", 1, 100.0, 200.0),
            tag("RHL-001", 1, 105.0, 205.0),
        ]);
        assert_eq!(result.classification, Classification::Matched);
        assert_eq!(result.counterpart.unwrap().anchor(), (105.0, 205.0));
    }

    #[test]
    fn test_nearest_wrong_tag_reported() {
        let result = classify_one(&[
            tag("RHL-008", 1, 108.0, 200.0),
            tag("RHL-007", 1, 101.0, 200.0),
        ]);
        assert_eq!(result.classification, Classification::Mismatched);
        assert_eq!(result.counterpart.unwrap().text, "RHL-007");
    }

    #[test]
    fn test_equal_distance_keeps_document_order() {
        let result = classify_one(&[
            tag("RHL-008", 1, 103.0, 200.0),
            tag("RHL-007", 1, 97.0, 200.0),
        ]);
        assert_eq!(result.counterpart.unwrap().text, "RHL-008");
    }

    #[test]
    fn test_zero_tolerance_requires_exact_alignment() {
        let source = [tag("5-AD001", 1, 100.0, 200.0)];
        let options = MatchOptions { tolerance: 0.0 };
        let exact = [tag("RHL-001", 1, 100.0, 200.0)];
        let off = [tag("RHL-001", 1, 100.0, 200.5)];
        assert_eq!(
            match_tags(&source, &exact, &mapping(), &options)[0].classification,
            Classification::Matched
        );
        assert_eq!(
            match_tags(&source, &off, &mapping(), &options)[0].classification,
            Classification::Missing
        );
    }

    #[test]
    fn test_one_result_per_source_tag() {
        let source = [
            tag("5-AD001", 1, 100.0, 200.0),
            tag("5-AD001", 1, 300.0, 200.0),
            tag("5-AD002", 1, 500.0, 200.0),
            tag("5-AD003", 2, 100.0, 200.0),
        ];
        let target = [tag("RHL-001", 1, 100.0, 200.0), tag("RHL-009", 1, 500.0, 202.0)];
        let results = match_tags(&source, &target, &mapping(), &MatchOptions::default());
        let classes: Vec<Classification> = results.iter().map(|r| r.classification).collect();
        assert_eq!(
            classes,
            vec![
                Classification::Matched,
                Classification::Missing,
                Classification::Mismatched,
                Classification::Unmapped,
            ]
        );
    }
}
