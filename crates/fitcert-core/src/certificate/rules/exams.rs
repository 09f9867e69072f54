//! Medical test battery detection.

use std::collections::BTreeMap;

use tracing::debug;

use crate::certificate::rules::checkbox::{self, Detection};
use crate::certificate::rules::resolve::{EvidenceSource, FieldResolver};
use crate::models::certificate::TestItem;
use crate::segment::table::{Table, TableType};
use crate::segment::{SectionKind, Segment, SegmentKind};

/// Detected done-flags and result readings for the test battery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamFindings {
    pub exams: BTreeMap<TestItem, bool>,
    pub results: BTreeMap<TestItem, String>,
}

/// Runs the detection cascade for every test. Every member gets a
/// done-flag (false unless evidence says otherwise); results are kept
/// only when non-placeholder.
pub fn detect_exams(
    tables: &[Table],
    segments: &[Segment],
    raw_text: &str,
    window: usize,
) -> ExamFindings {
    let mut findings = ExamFindings::default();

    for test in TestItem::ALL {
        let detection = detect_one(test, tables, segments, raw_text, window);
        let detection = detection.unwrap_or_else(Detection::not_done);
        if detection.done {
            debug!(test = %test, result = ?detection.result, "medical test marked done");
        }
        findings.exams.insert(test, detection.done);
        if let Some(result) = detection.result.filter(|r| !checkbox::is_placeholder(r)) {
            findings.results.insert(test, result);
        }
    }
    findings
}

/// Evidence sources in priority order; the first one that answers at
/// all (positively or negatively) settles the test.
fn detect_one(
    test: TestItem,
    tables: &[Table],
    segments: &[Segment],
    raw_text: &str,
    window: usize,
) -> Option<Detection> {
    let names = test.alternate_names();
    let vision = test.is_vision_family();

    let mut resolver = FieldResolver::new();
    for source in EvidenceSource::RANKED {
        if resolver.resolved() {
            break;
        }
        let detection = match source {
            EvidenceSource::TypedTable => tables
                .iter()
                .filter(|t| t.table_type == TableType::MedicalTests)
                .find_map(|t| checkbox::table_row_detection(t, names)),
            EvidenceSource::MatchingSection => segments
                .iter()
                .filter(|s| s.section_kind().is_some_and(|k| k.holds_tests()))
                .find_map(|s| checkbox::detect_in_text(&s.content, names, window, vision)),
            EvidenceSource::OtherTable => tables
                .iter()
                .filter(|t| t.table_type == TableType::Unknown)
                .find_map(|t| checkbox::table_row_detection(t, names)),
            EvidenceSource::OtherSection => segments
                .iter()
                .filter(|s| {
                    matches!(s.kind, SegmentKind::Section(kind) if !kind.holds_tests()
                        && kind != SectionKind::Restrictions)
                })
                .find_map(|s| checkbox::detect_in_text(&s.content, names, window, vision)),
            EvidenceSource::RawText => {
                checkbox::detect_in_text(raw_text, names, window, vision)
            }
        };
        if let Some(detection) = detection {
            resolver.offer(source, detection);
        }
    }
    resolver.into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{extract_segments, extract_tables};
    use pretty_assertions::assert_eq;

    fn run(text: &str) -> ExamFindings {
        let tables = extract_tables(text);
        let segments = extract_segments(text);
        detect_exams(&tables, &segments, text, checkbox::MARKER_WINDOW)
    }

    #[test]
    fn typed_table_settles_tests() {
        let findings = run("\
## Medical Examination

| Test | Done | Results |
|------|------|---------|
| BLOODS | [x] | Normal |
| FAR, NEAR VISION | [x] | 20/20 |
| HEARING | [ ] | N/A |
");
        assert_eq!(findings.exams[&TestItem::Blood], true);
        assert_eq!(findings.results[&TestItem::Blood], "Normal");
        assert_eq!(findings.exams[&TestItem::Vision], true);
        assert_eq!(findings.results[&TestItem::Vision], "20/20");
        assert_eq!(findings.exams[&TestItem::Hearing], false);
        assert!(!findings.results.contains_key(&TestItem::Hearing));
        // unmentioned members stay false
        assert_eq!(findings.exams[&TestItem::DrugScreen], false);
        assert_eq!(findings.exams.len(), 9);
    }

    #[test]
    fn typed_table_outranks_prose() {
        let findings = run("\
| Test | Done |
|------|------|
| X-RAY | [ ] |

The X-Ray section mentions it is marked elsewhere [x].
");
        assert_eq!(findings.exams[&TestItem::Xray], false);
    }

    #[test]
    fn section_list_detection() {
        let findings = run("\
## Medical Tests

- **NIGHT VISION**: ✓
- **DRUG SCREEN**: Done
");
        assert_eq!(findings.exams[&TestItem::NightVision], true);
        assert_eq!(findings.exams[&TestItem::DrugScreen], true);
    }

    #[test]
    fn snellen_reading_counts_for_vision() {
        let findings = run("## Vision Tests\n\nSIDE & DEPTH recorded at 6/6.\n");
        assert_eq!(findings.exams[&TestItem::DepthVision], true);
        assert_eq!(findings.results[&TestItem::DepthVision], "6/6");
    }

    #[test]
    fn bare_mention_is_not_evidence() {
        let findings = run("The clinic offers a Lung Function assessment on request.");
        assert_eq!(findings.exams[&TestItem::Lung], false);
        assert!(findings.results.is_empty());
    }
}
