use tagmatch_core::matcher::{Classification, MatchResult};
use tagmatch_core::model::TagOccurrence;
use tagmatch_core::MatchReport;

pub fn print(report: &MatchReport, show_all: bool) {
    println!("=== Validation Summary ===\n");
    for (label, count) in report.summary.rows() {
        println!("  {:<18} {:>6}", label, count);
    }
    println!();

    // Per-tag rows: everything with --show-all, otherwise only problems
    let rows: Vec<&MatchResult> = report
        .results
        .iter()
        .filter(|r| show_all || r.classification != Classification::Matched)
        .collect();

    if !rows.is_empty() {
        println!("{}", format_results(&rows));
    }

    if !report.warnings.is_empty() {
        println!("  Warnings:");
        for w in &report.warnings {
            match w.drawing {
                Some(drawing) => println!("    [{}] {}", drawing, w.message),
                None => println!("    {}", w.message),
            }
        }
        println!();
    }
}

/// Per-tag rows with columns sized to their widest value.
fn format_results(rows: &[&MatchResult]) -> String {
    let mut out = String::new();
    let tag_width = rows
        .iter()
        .map(|r| r.occurrence.text.len())
        .max()
        .unwrap_or(10)
        .max("Tag".len());
    let expected_width = rows
        .iter()
        .filter_map(|r| r.expected.as_ref().map(|e| e.len()))
        .max()
        .unwrap_or(0)
        .max("Expected".len());
    let found_width = rows
        .iter()
        .filter_map(|r| r.counterpart.as_ref().map(|c| c.text.len()))
        .max()
        .unwrap_or(0)
        .max("Found".len());

    out.push_str(&format!(
        "  {:<tw$}  {:>4}  {:<ew$}  {:<fw$}  {:>7}  Result\n",
        "Tag",
        "Page",
        "Expected",
        "Found",
        "Dist",
        tw = tag_width,
        ew = expected_width,
        fw = found_width
    ));
    out.push_str(&format!(
        "  {}\n",
        "-".repeat(tag_width + expected_width + found_width + 30)
    ));

    for r in rows {
        let found = r
            .counterpart
            .as_ref()
            .map(|c| c.text.as_str())
            .unwrap_or("-");
        let distance = r
            .distance
            .map(|d| format!("{:.1}", d))
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "  {:<tw$}  {:>4}  {:<ew$}  {:<fw$}  {:>7}  {}\n",
            r.occurrence.text,
            r.occurrence.page,
            r.expected.as_deref().unwrap_or("-"),
            found,
            distance,
            r.classification,
            tw = tag_width,
            ew = expected_width,
            fw = found_width
        ));
    }
    out
}

/// Format extracted tags as a human-readable table.
pub fn format_tags(tags: &[TagOccurrence], pattern: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("Pattern: {}\n", pattern));
    out.push_str(&format!("Tags found: {}\n", tags.len()));

    if tags.is_empty() {
        return out;
    }

    out.push('\n');
    let width = tags.iter().map(|t| t.text.len()).max().unwrap_or(10);
    for t in tags {
        out.push_str(&format!(
            "  {:<width$}  page {:>3}  at ({:.1}, {:.1})\n",
            t.text,
            t.page,
            t.bbox.x_min,
            t.bbox.y_min,
            width = width
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagmatch_core::model::BBox;

    fn tag(text: &str) -> TagOccurrence {
        TagOccurrence {
            text: text.into(),
            page: 1,
            bbox: BBox::new(0.0, 0.0, 40.0, 8.0),
        }
    }

    #[test]
    fn test_long_found_tag_keeps_columns_aligned() {
        let long = MatchResult {
            occurrence: tag("5-AD001"),
            classification: Classification::Mismatched,
            expected: Some("RHL-001".into()),
            counterpart: Some(tag("RHL-001-SPARE-LONG")),
            distance: Some(1.0),
        };
        let short = MatchResult {
            occurrence: tag("5-AD002"),
            classification: Classification::Missing,
            expected: Some("RHL-002".into()),
            counterpart: None,
            distance: None,
        };
        let table = format_results(&[&long, &short]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        // Header and both data rows put the result column at the same offset
        let header_at = lines[0].find("Result").unwrap();
        assert_eq!(lines[2].find("Mismatched"), Some(header_at));
        assert_eq!(lines[3].find("Missing"), Some(header_at));
    }
}
