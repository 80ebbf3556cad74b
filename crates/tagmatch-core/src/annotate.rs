use crate::error::TagMatchError;
use crate::matcher::MatchResult;
use crate::model::BBox;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

/// US Letter, used when a page declares neither CropBox nor MediaBox.
const DEFAULT_PAGE_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page-tree depth guard for inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct HighlightStyle {
    /// Margin around the tag box, in points.
    pub padding: f32,
    /// Fill and stroke opacity, 0.0 to 1.0.
    pub opacity: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        HighlightStyle {
            padding: 1.0,
            opacity: 0.4,
        }
    }
}

/// A result that could not be drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedHighlight {
    pub tag: String,
    pub page: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct AnnotatedPdf {
    pub bytes: Vec<u8>,
    pub highlights: usize,
    pub skipped: Vec<SkippedHighlight>,
}

/// Draw one highlight box per match result onto `pdf_bytes`.
///
/// Boxes use the counterpart's position when there is one, otherwise the
/// source tag's position, on the page with the source tag's number.
pub fn annotate_pdf(
    pdf_bytes: &[u8],
    results: &[MatchResult],
    style: &HighlightStyle,
) -> Result<AnnotatedPdf, TagMatchError> {
    let mut doc = Document::load_mem(pdf_bytes)?;
    let pages = doc.get_pages();
    let mut highlights = 0;
    let mut skipped = Vec::new();

    for result in results {
        let page = result.occurrence.page;
        let Some(&page_id) = u32::try_from(page).ok().and_then(|p| pages.get(&p)) else {
            tracing::warn!(tag = %result.occurrence.text, page, "page not in drawing, highlight skipped");
            skipped.push(SkippedHighlight {
                tag: result.occurrence.text.clone(),
                page,
                reason: format!("drawing has no page {page}"),
            });
            continue;
        };

        let page_box = page_box(&doc, page_id);
        let rotation = page_rotation(&doc, page_id);
        let bbox = result
            .counterpart
            .as_ref()
            .map(|c| c.bbox)
            .unwrap_or(result.occurrence.bbox)
            .padded(style.padding);
        let rect = to_user_space(&bbox, &page_box, rotation);

        let annot_id = add_highlight(&mut doc, page_id, rect, result, style)?;
        attach_annotation(&mut doc, page_id, annot_id)?;
        highlights += 1;
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    tracing::info!(highlights, skipped = skipped.len(), "annotated drawing");

    Ok(AnnotatedPdf {
        bytes,
        highlights,
        skipped,
    })
}

/// Map a box in the displayed (rotated) page frame, top-left origin, into
/// PDF user space `[llx, lly, urx, ury]`.
fn to_user_space(bbox: &BBox, page_box: &[f32; 4], rotation: i64) -> [f32; 4] {
    let [left, bottom, right, top] = *page_box;
    let corner = |x: f32, y: f32| -> (f32, f32) {
        match rotation {
            90 => (left + y, bottom + x),
            180 => (right - x, bottom + y),
            270 => (right - y, top - x),
            _ => (left + x, top - y),
        }
    };
    let (ax, ay) = corner(bbox.x_min, bbox.y_min);
    let (bx, by) = corner(bbox.x_max, bbox.y_max);
    [ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)]
}

fn page_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    inherited(doc, page_id, b"CropBox")
        .and_then(|v| rect_from(doc, v))
        .or_else(|| inherited(doc, page_id, b"MediaBox").and_then(|v| rect_from(doc, v)))
        .unwrap_or(DEFAULT_PAGE_BOX)
}

/// Clockwise display rotation in degrees, one of 0, 90, 180 or 270.
fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited(doc, page_id, b"Rotate")
        .and_then(|v| resolve(doc, v).as_i64().ok())
        .map(|r| r.rem_euclid(360))
        .filter(|r| r % 90 == 0)
        .unwrap_or(0)
}

/// Look up a page attribute on the page or the nearest ancestor that has it.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn rect_from(doc: &Document, value: &Object) -> Option<[f32; 4]> {
    let array = resolve(doc, value).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut nums = [0.0f32; 4];
    for (slot, item) in nums.iter_mut().zip(array) {
        *slot = number(resolve(doc, item))?;
    }
    // Normalize so the box reads [llx, lly, urx, ury].
    Some([
        nums[0].min(nums[2]),
        nums[1].min(nums[3]),
        nums[0].max(nums[2]),
        nums[1].max(nums[3]),
    ])
}

fn resolve<'a>(doc: &'a Document, value: &'a Object) -> &'a Object {
    match value {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(value),
        _ => value,
    }
}

fn number(value: &Object) -> Option<f32> {
    match value {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f as f32),
        _ => None,
    }
}

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

fn add_highlight(
    doc: &mut Document,
    page_id: ObjectId,
    rect: [f32; 4],
    result: &MatchResult,
    style: &HighlightStyle,
) -> Result<ObjectId, TagMatchError> {
    let color: Vec<Object> = result
        .classification
        .color()
        .iter()
        .map(|c| real(*c))
        .collect();
    let appearance_id = doc.add_object(appearance_stream(rect, &color, style.opacity)?);

    let annot = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Square",
        "Rect" => rect.iter().map(|v| real(*v)).collect::<Vec<Object>>(),
        "C" => color.clone(),
        "IC" => color,
        "CA" => real(style.opacity),
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(1)],
        "F" => Object::Integer(4),
        "P" => page_id,
        "T" => Object::string_literal("tagmatch"),
        "Contents" => Object::string_literal(describe(result)),
        "AP" => dictionary! { "N" => appearance_id },
    };
    Ok(doc.add_object(annot))
}

/// Form XObject drawing the filled, stroked box so viewers that ignore
/// annotation colors still show it.
fn appearance_stream(
    rect: [f32; 4],
    color: &[Object],
    opacity: f32,
) -> Result<Stream, TagMatchError> {
    let width = rect[2] - rect[0];
    let height = rect[3] - rect[1];

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(b"GS0".to_vec())]),
            Operation::new("rg", color.to_vec()),
            Operation::new("RG", color.to_vec()),
            Operation::new(
                "re",
                vec![real(0.0), real(0.0), real(width), real(height)],
            ),
            Operation::new("B", vec![]),
            Operation::new("Q", vec![]),
        ],
    };
    let data = content
        .encode()
        .map_err(|e| TagMatchError::Annotation(format!("cannot encode appearance: {e}")))?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![real(0.0), real(0.0), real(width), real(height)],
        "Resources" => dictionary! {
            "ExtGState" => dictionary! {
                "GS0" => dictionary! {
                    "Type" => "ExtGState",
                    "CA" => real(opacity),
                    "ca" => real(opacity),
                },
            },
        },
    };
    Ok(Stream::new(dict, data))
}

fn describe(result: &MatchResult) -> String {
    let found = result
        .counterpart
        .as_ref()
        .map(|c| c.text.as_str())
        .unwrap_or("-");
    match &result.expected {
        Some(expected) => format!(
            "{}: {} (expected {}, found {})",
            result.occurrence.text, result.classification, expected, found
        ),
        None => format!("{}: {}", result.occurrence.text, result.classification),
    }
}

/// Append an annotation to the page's /Annots, which may be missing, an
/// inline array, or a reference to an array.
fn attach_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), TagMatchError> {
    let existing = doc.get_dictionary(page_id)?.get(b"Annots").ok().cloned();

    match existing {
        Some(Object::Reference(array_id)) => {
            doc.get_object_mut(array_id)?
                .as_array_mut()
                .map_err(|_| TagMatchError::Annotation("page /Annots is not an array".into()))?
                .push(Object::Reference(annot_id));
        }
        Some(Object::Array(mut annots)) => {
            annots.push(Object::Reference(annot_id));
            page_dict_mut(doc, page_id)?.set("Annots", annots);
        }
        _ => {
            page_dict_mut(doc, page_id)?.set("Annots", vec![Object::Reference(annot_id)]);
        }
    }
    Ok(())
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, TagMatchError> {
    doc.get_object_mut(page_id)?
        .as_dict_mut()
        .map_err(|_| TagMatchError::Annotation(format!("page {page_id:?} is not a dictionary")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Classification;
    use crate::model::TagOccurrence;

    fn blank_pdf(page_count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..page_count {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count as i64),
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn tag(text: &str, page: usize, x: f32, y: f32) -> TagOccurrence {
        TagOccurrence {
            text: text.into(),
            page,
            bbox: BBox::new(x, y, x + 40.0, y + 8.0),
        }
    }

    fn page_annots(doc: &Document, page: u32) -> Vec<Dictionary> {
        let page_id = doc.get_pages()[&page];
        let annots = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        annots
            .iter()
            .map(|a| {
                doc.get_dictionary(a.as_reference().unwrap())
                    .unwrap()
                    .clone()
            })
            .collect()
    }

    fn floats(obj: &Object) -> Vec<f32> {
        obj.as_array()
            .unwrap()
            .iter()
            .map(|o| number(o).unwrap())
            .collect()
    }

    #[test]
    fn test_matched_highlight_uses_counterpart_box() {
        let results = vec![MatchResult {
            occurrence: tag("5-AD001", 1, 100.0, 200.0),
            classification: Classification::Matched,
            expected: Some("RHL-001".into()),
            counterpart: Some(tag("RHL-001", 1, 100.0, 201.0)),
            distance: Some(1.0),
        }];
        let out = annotate_pdf(&blank_pdf(1), &results, &HighlightStyle::default()).unwrap();
        assert_eq!(out.highlights, 1);
        assert!(out.skipped.is_empty());

        let doc = Document::load_mem(&out.bytes).unwrap();
        let annots = page_annots(&doc, 1);
        assert_eq!(annots.len(), 1);
        let annot = &annots[0];
        assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Square");
        // (100,201)-(140,209) padded by 1, flipped against a 842pt page
        let rect = floats(annot.get(b"Rect").unwrap());
        assert_eq!(rect, vec![99.0, 632.0, 141.0, 642.0]);
        assert_eq!(floats(annot.get(b"C").unwrap()), vec![0.0, 1.0, 0.0]);
        assert!(annot.get(b"AP").is_ok());
    }

    #[test]
    fn test_missing_highlight_uses_source_box() {
        let results = vec![MatchResult {
            occurrence: tag("5-AD002", 1, 10.0, 20.0),
            classification: Classification::Missing,
            expected: Some("RHL-002".into()),
            counterpart: None,
            distance: None,
        }];
        let style = HighlightStyle {
            padding: 0.0,
            opacity: 0.4,
        };
        let out = annotate_pdf(&blank_pdf(1), &results, &style).unwrap();
        let doc = Document::load_mem(&out.bytes).unwrap();
        let annot = &page_annots(&doc, 1)[0];
        assert_eq!(floats(annot.get(b"Rect").unwrap()), vec![10.0, 814.0, 50.0, 822.0]);
        let fill = floats(annot.get(b"IC").unwrap());
        for (got, want) in fill.iter().zip([0.53, 0.81, 0.92]) {
            assert!((got - want).abs() < 1e-4);
        }
    }

    #[test]
    fn test_absent_page_skipped() {
        let results = vec![MatchResult {
            occurrence: tag("5-AD003", 3, 10.0, 20.0),
            classification: Classification::Unmapped,
            expected: None,
            counterpart: None,
            distance: None,
        }];
        let out = annotate_pdf(&blank_pdf(1), &results, &HighlightStyle::default()).unwrap();
        assert_eq!(out.highlights, 0);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].page, 3);
    }

    #[test]
    fn test_annotations_append_to_existing() {
        let results: Vec<MatchResult> = (0..3)
            .map(|i| MatchResult {
                occurrence: tag("5-AD009", 1, 10.0 + i as f32 * 50.0, 20.0),
                classification: Classification::Unmapped,
                expected: None,
                counterpart: None,
                distance: None,
            })
            .collect();
        let once = annotate_pdf(&blank_pdf(1), &results[..1], &HighlightStyle::default()).unwrap();
        let twice = annotate_pdf(&once.bytes, &results[1..], &HighlightStyle::default()).unwrap();
        let doc = Document::load_mem(&twice.bytes).unwrap();
        assert_eq!(page_annots(&doc, 1).len(), 3);
    }

    #[test]
    fn test_to_user_space_respects_box_origin() {
        let bbox = BBox::new(10.0, 20.0, 30.0, 25.0);
        assert_eq!(
            to_user_space(&bbox, &[5.0, 0.0, 600.0, 800.0], 0),
            [15.0, 775.0, 35.0, 780.0]
        );
    }

    #[test]
    fn test_to_user_space_undoes_rotation() {
        let page = [0.0, 0.0, 595.0, 842.0];
        let bbox = BBox::new(780.0, 500.0, 820.0, 508.0);
        assert_eq!(to_user_space(&bbox, &page, 90), [500.0, 780.0, 508.0, 820.0]);
        let bbox = BBox::new(10.0, 20.0, 50.0, 28.0);
        assert_eq!(to_user_space(&bbox, &page, 180), [545.0, 20.0, 585.0, 28.0]);
        assert_eq!(to_user_space(&bbox, &page, 270), [567.0, 792.0, 575.0, 832.0]);
    }

    #[test]
    fn test_rotated_page_highlight_stays_on_page() {
        let mut doc = Document::load_mem(&blank_pdf(1)).unwrap();
        let page_id = doc.get_pages()[&1];
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Rotate", Object::Integer(90));
        let mut rotated = Vec::new();
        doc.save_to(&mut rotated).unwrap();

        let results = vec![MatchResult {
            occurrence: tag("5-AD004", 1, 780.0, 500.0),
            classification: Classification::Missing,
            expected: Some("RHL-004".into()),
            counterpart: None,
            distance: None,
        }];
        let style = HighlightStyle {
            padding: 0.0,
            opacity: 0.4,
        };
        let out = annotate_pdf(&rotated, &results, &style).unwrap();
        let doc = Document::load_mem(&out.bytes).unwrap();
        let rect = floats(page_annots(&doc, 1)[0].get(b"Rect").unwrap());
        assert_eq!(rect, vec![500.0, 780.0, 508.0, 820.0]);
        assert!(rect[2] <= 595.0 && rect[3] <= 842.0);
    }

    #[test]
    fn test_describe() {
        let result = MatchResult {
            occurrence: tag("5-AD001", 1, 0.0, 0.0),
            classification: Classification::Mismatched,
            expected: Some("RHL-001".into()),
            counterpart: Some(tag("RHL-002", 1, 0.0, 0.0)),
            distance: Some(0.0),
        };
        assert_eq!(
            describe(&result),
            "5-AD001: Mismatched (expected RHL-001, found RHL-002)"
        );
    }

    #[test]
    fn test_invalid_pdf_rejected() {
        assert!(matches!(
            annotate_pdf(b"not a pdf", &[], &HighlightStyle::default()),
            Err(TagMatchError::Pdf(_))
        ));
    }
}
