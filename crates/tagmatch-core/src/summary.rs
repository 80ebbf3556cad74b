use crate::matcher::{Classification, MatchResult};
use serde::{Deserialize, Serialize};

/// Per-category tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing: usize,
    pub unmapped: usize,
}

impl Summary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Summary::default();
        for r in results {
            summary.total += 1;
            match r.classification {
                Classification::Matched => summary.matched += 1,
                Classification::Mismatched => summary.mismatched += 1,
                Classification::Missing => summary.missing += 1,
                Classification::Unmapped => summary.unmapped += 1,
            }
        }
        summary
    }

    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::Matched => self.matched,
            Classification::Mismatched => self.mismatched,
            Classification::Missing => self.missing,
            Classification::Unmapped => self.unmapped,
        }
    }

    /// Rows of the summary table: (label, count), total first.
    pub fn rows(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("Total Tags Found", self.total),
            ("Matched", self.matched),
            ("Mismatched", self.mismatched),
            ("Missing", self.missing),
            ("Unmapped", self.unmapped),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, TagOccurrence};

    fn result(classification: Classification) -> MatchResult {
        MatchResult {
            occurrence: TagOccurrence {
                text: "5-AD001".into(),
                page: 1,
                bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            },
            classification,
            expected: None,
            counterpart: None,
            distance: None,
        }
    }

    #[test]
    fn test_counts_add_up_to_total() {
        let results: Vec<MatchResult> = [
            Classification::Matched,
            Classification::Matched,
            Classification::Mismatched,
            Classification::Missing,
            Classification::Unmapped,
            Classification::Unmapped,
            Classification::Unmapped,
        ]
        .into_iter()
        .map(result)
        .collect();

        let summary = Summary::from_results(&results);
        assert_eq!(summary.total, 7);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.unmapped, 3);
        let sum: usize = Classification::ALL.iter().map(|c| summary.count(*c)).sum();
        assert_eq!(sum, summary.total);
    }

    #[test]
    fn test_empty_run() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.rows()[0], ("Total Tags Found", 0));
    }
}
