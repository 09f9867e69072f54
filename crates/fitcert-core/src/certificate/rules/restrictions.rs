//! Workplace restriction detection.

use std::collections::BTreeMap;

use tracing::debug;

use crate::certificate::rules::checkbox::{self, Detection};
use crate::certificate::rules::patterns;
use crate::certificate::rules::resolve::{EvidenceSource, FieldResolver};
use crate::models::certificate::RestrictionItem;
use crate::segment::table::{Table, TableType};
use crate::segment::{SectionKind, Segment, SegmentKind};

/// Runs the detection cascade for every restriction. A restriction is
/// `true` only with positive evidence; a bare mention of the label is
/// never enough.
pub fn detect_restrictions(
    tables: &[Table],
    segments: &[Segment],
    raw_text: &str,
    window: usize,
) -> BTreeMap<RestrictionItem, bool> {
    let mut map: BTreeMap<RestrictionItem, bool> =
        RestrictionItem::ALL.iter().map(|r| (*r, false)).collect();

    // prose like "nothing was ticked" inside a restrictions section
    // overrides everything
    let none_applied = segments
        .iter()
        .filter(|s| s.section_kind() == Some(SectionKind::Restrictions))
        .any(|s| patterns::NO_RESTRICTIONS.is_match(&s.content));
    if none_applied {
        debug!("restrictions section states none are applied");
        return map;
    }

    for restriction in RestrictionItem::ALL {
        if let Some(detection) = detect_one(restriction, tables, segments, raw_text, window) {
            if detection.done {
                debug!(restriction = %restriction, "restriction applies");
            }
            map.insert(restriction, detection.done);
        }
    }
    map
}

fn detect_one(
    restriction: RestrictionItem,
    tables: &[Table],
    segments: &[Segment],
    raw_text: &str,
    window: usize,
) -> Option<Detection> {
    let names = restriction.alternate_names();

    let mut resolver = FieldResolver::new();
    for source in EvidenceSource::RANKED {
        if resolver.resolved() {
            break;
        }
        let detection = match source {
            EvidenceSource::TypedTable => tables
                .iter()
                .filter(|t| t.table_type == TableType::Restrictions)
                .find_map(|t| checkbox::table_row_detection(t, names)),
            EvidenceSource::MatchingSection => segments
                .iter()
                .filter(|s| s.section_kind() == Some(SectionKind::Restrictions))
                .find_map(|s| checkbox::detect_in_text(&s.content, names, window, false)),
            EvidenceSource::OtherTable => tables
                .iter()
                .filter(|t| t.table_type == TableType::Unknown)
                .find_map(|t| checkbox::table_row_detection(t, names)),
            EvidenceSource::OtherSection => segments
                .iter()
                .filter(|s| {
                    matches!(s.kind, SegmentKind::Section(kind)
                        if kind != SectionKind::Restrictions && !kind.holds_tests())
                })
                .find_map(|s| checkbox::detect_in_text(&s.content, names, window, false)),
            EvidenceSource::RawText => {
                checkbox::detect_in_text(raw_text, names, window, false)
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

    fn run(text: &str) -> BTreeMap<RestrictionItem, bool> {
        let tables = extract_tables(text);
        let segments = extract_segments(text);
        detect_restrictions(&tables, &segments, text, checkbox::MARKER_WINDOW)
    }

    #[test]
    fn table_with_ticks() {
        let map = run("\
## Restrictions

| Restriction | Applied |
|-------------|---------|
| Heights | ✓ |
| Dust Exposure | |
| Wear Spectacles | ☑ |
");
        assert_eq!(map[&RestrictionItem::Heights], true);
        assert_eq!(map[&RestrictionItem::Dust], false);
        assert_eq!(map[&RestrictionItem::Spectacles], true);
        assert_eq!(map[&RestrictionItem::Chemical], false);
        assert_eq!(map.len(), 8);
    }

    #[test]
    fn nothing_ticked_overrides_mentions() {
        let map = run("\
## Restrictions

Heights, Dust Exposure, Wear Spectacles are listed but nothing was ticked.
");
        assert!(map.values().all(|applied| !applied));
    }

    #[test]
    fn mention_without_marker_is_false() {
        let map = run("\
Employees with a Confined Spaces restriction must notify the supervisor.
Motorized Equipment operators follow site policy.
");
        assert!(map.values().all(|applied| !applied));
    }

    #[test]
    fn checklist_lines_in_section() {
        let map = run("\
## Restrictions

- Wear Hearing Protection [x]
- Remain on Treatment for Chronic Conditions [ ]
- Chemical Exposure [x]
");
        assert_eq!(map[&RestrictionItem::HearingProtection], true);
        assert_eq!(map[&RestrictionItem::Treatment], false);
        assert_eq!(map[&RestrictionItem::Chemical], true);
    }
}
