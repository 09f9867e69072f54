//! Segment Extractor: carves the raw document into typed regions.
//!
//! Recognition is forgiving by design. OCR output varies wildly, so
//! each recognizer works independently and an empty result is valid;
//! downstream stages always have the raw text to fall back on.

pub mod keyvalue;
pub mod table;

use tracing::debug;

use crate::certificate::rules::patterns;

pub use keyvalue::{KeyValuePair, extract_key_values};
pub use table::{Table, TableType, extract_tables};

/// The logical section a heading introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    DocumentDetails,
    MedicalExaminationForm,
    ExaminationType,
    MedicalTests,
    VisionTests,
    OtherTests,
    FitnessDeclaration,
    Restrictions,
    Referral,
    ReviewDate,
    Comments,
    Other,
}

impl SectionKind {
    /// Classifies a heading title. Checks run most-specific first so
    /// "Medical Examination Form" never lands in the test section.
    pub fn from_title(title: &str) -> SectionKind {
        let title = title.trim().trim_end_matches(':').to_lowercase();
        let checks: [(&str, SectionKind); 18] = [
            ("document details", SectionKind::DocumentDetails),
            ("medical examination form", SectionKind::MedicalExaminationForm),
            ("examination type", SectionKind::ExaminationType),
            ("examination results", SectionKind::MedicalTests),
            ("medical examination", SectionKind::MedicalTests),
            ("medical tests", SectionKind::MedicalTests),
            ("vision tests", SectionKind::VisionTests),
            ("vision test", SectionKind::VisionTests),
            ("other tests", SectionKind::OtherTests),
            ("medical fitness declaration", SectionKind::FitnessDeclaration),
            ("medical fitness evaluation", SectionKind::FitnessDeclaration),
            ("fitness declaration", SectionKind::FitnessDeclaration),
            ("fitness evaluation", SectionKind::FitnessDeclaration),
            ("medical fitness", SectionKind::FitnessDeclaration),
            ("restriction", SectionKind::Restrictions),
            ("referr", SectionKind::Referral),
            ("review date", SectionKind::ReviewDate),
            ("comments", SectionKind::Comments),
        ];
        for (needle, kind) in checks {
            if title.contains(needle) {
                return kind;
            }
        }
        SectionKind::Other
    }

    /// Sections that carry medical test evidence.
    pub fn holds_tests(&self) -> bool {
        matches!(
            self,
            SectionKind::MedicalTests
                | SectionKind::VisionTests
                | SectionKind::OtherTests
                | SectionKind::MedicalExaminationForm
        )
    }
}

/// What a segment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Table,
    KeyValueBlock,
    Section(SectionKind),
    Figure,
}

/// One typed region of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Flattened text content of the region.
    pub content: String,
    /// The raw slice the segment was recognized from.
    pub original_form: String,
}

impl Segment {
    pub fn section_kind(&self) -> Option<SectionKind> {
        match self.kind {
            SegmentKind::Section(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Splits the document into typed segments: headed sections, dedicated
/// key-value blocks, table blocks, and figure references/descriptions.
pub fn extract_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();

    let headings: Vec<(usize, usize, usize, String)> = patterns::HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let level = caps.get(1)?.as_str().len();
            let title = caps.get(2)?.as_str().to_string();
            Some((whole.start(), whole.end(), level, title))
        })
        .collect();

    for (i, (start, body_start, _level, title)) in headings.iter().enumerate() {
        // content runs to the next heading of any level, so every
        // section holds only its own lines and never a sibling's
        let end = headings
            .get(i + 1)
            .map(|(next_start, _, _, _)| *next_start)
            .unwrap_or(text.len());
        let content = text[*body_start..end].trim().to_string();
        let original_form = text[*start..end].to_string();
        let title_lower = title.to_lowercase();

        let kind = if title_lower.contains("key-value pair") || title_lower.contains("key value") {
            SegmentKind::KeyValueBlock
        } else if title_lower.contains("figure description") || title_lower.contains("figure") {
            SegmentKind::Figure
        } else {
            SegmentKind::Section(SectionKind::from_title(title))
        };
        segments.push(Segment { kind, content, original_form });
    }

    for m in patterns::HTML_TABLE.find_iter(text) {
        segments.push(Segment {
            kind: SegmentKind::Table,
            content: m.as_str().to_string(),
            original_form: m.as_str().to_string(),
        });
    }
    for m in patterns::PIPE_TABLE.find_iter(text) {
        segments.push(Segment {
            kind: SegmentKind::Table,
            content: m.as_str().to_string(),
            original_form: m.as_str().to_string(),
        });
    }
    for caps in patterns::IMAGE_REF.captures_iter(text) {
        let alt = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if let Some(whole) = caps.get(0) {
            segments.push(Segment {
                kind: SegmentKind::Figure,
                content: alt.to_string(),
                original_form: whole.as_str().to_string(),
            });
        }
    }

    debug!(count = segments.len(), "extracted segments");
    segments
}

/// Content of every dedicated key-value block, for the harvester.
pub fn key_value_blocks(segments: &[Segment]) -> Vec<&str> {
    segments
        .iter()
        .filter(|s| s.kind == SegmentKind::KeyValueBlock)
        .map(|s| s.content.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_section_titles() {
        assert_eq!(SectionKind::from_title("Document Details"), SectionKind::DocumentDetails);
        assert_eq!(
            SectionKind::from_title("Medical Examination Form"),
            SectionKind::MedicalExaminationForm
        );
        assert_eq!(SectionKind::from_title("MEDICAL EXAMINATION"), SectionKind::MedicalTests);
        assert_eq!(
            SectionKind::from_title("Medical Fitness Declaration:"),
            SectionKind::FitnessDeclaration
        );
        assert_eq!(SectionKind::from_title("Restrictions"), SectionKind::Restrictions);
        assert_eq!(
            SectionKind::from_title("Referred or follow up actions"),
            SectionKind::Referral
        );
        assert_eq!(SectionKind::from_title("Weather"), SectionKind::Other);
    }

    #[test]
    fn sections_hold_only_their_own_lines() {
        let text = "\
## Document Details
Name: J. Doe

### Notes
inner

## Restrictions
Heights ✓
";
        let segments = extract_segments(text);
        let details = segments
            .iter()
            .find(|s| s.kind == SegmentKind::Section(SectionKind::DocumentDetails))
            .unwrap();
        assert!(details.content.contains("Name: J. Doe"));
        assert!(!details.content.contains("inner"));
        assert!(!details.content.contains("Heights"));
        let restrictions = segments
            .iter()
            .find(|s| s.kind == SegmentKind::Section(SectionKind::Restrictions))
            .unwrap();
        assert_eq!(restrictions.content, "Heights ✓");
    }

    #[test]
    fn recognizes_key_value_blocks_and_figures() {
        let text = "\
## Key-Value Pair
ID NO: 8501015800085

## Figure Description
The FIT option is crossed out.

![certificate stamp](img/stamp.png)
";
        let segments = extract_segments(text);
        let blocks = key_value_blocks(&segments);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("ID NO"));
        let figures: Vec<_> =
            segments.iter().filter(|s| s.kind == SegmentKind::Figure).collect();
        assert_eq!(figures.len(), 2);
        assert!(figures[0].content.contains("crossed out"));
        assert_eq!(figures[1].content, "certificate stamp");
    }

    #[test]
    fn empty_input_is_valid() {
        assert!(extract_segments("").is_empty());
        assert!(extract_segments("plain prose, no structure").is_empty());
    }
}
