//! Fitness declaration and examination type detection.
//!
//! Both fields pick exactly one option out of a closed set. Options
//! are evaluated in declared order and the first one with positive
//! evidence wins; an explicit `[ ]` against an option rules it out for
//! the scope being scanned.

use tracing::debug;

use crate::certificate::rules::checkbox;
use crate::certificate::rules::patterns;
use crate::models::certificate::{ExaminationType, FitnessDeclaration};
use crate::segment::table::{Table, TableType};
use crate::segment::{SectionKind, Segment, SegmentKind};

/// Resolves the fitness declaration, consulting sources in priority
/// order and falling back to figure descriptions of a struck-through
/// verdict.
pub fn detect_fitness(
    tables: &[Table],
    segments: &[Segment],
    raw_text: &str,
    window: usize,
) -> Option<FitnessDeclaration> {
    let from_tables = |wanted: TableType| {
        tables
            .iter()
            .filter(move |t| t.table_type == wanted)
            .find_map(|t| option_from_table(t, &FitnessDeclaration::ALL, cell_matches_fitness))
    };

    let declaration = from_tables(TableType::FitnessDeclaration)
        .or_else(|| {
            segments
                .iter()
                .filter(|s| s.section_kind() == Some(SectionKind::FitnessDeclaration))
                .find_map(|s| option_from_text(&s.content, &FitnessDeclaration::ALL, fitness_positions, window))
        })
        .or_else(|| from_tables(TableType::Unknown))
        .or_else(|| {
            segments
                .iter()
                .filter(|s| {
                    matches!(s.kind, SegmentKind::Section(kind)
                        if kind != SectionKind::FitnessDeclaration)
                })
                .find_map(|s| option_from_text(&s.content, &FitnessDeclaration::ALL, fitness_positions, window))
        })
        .or_else(|| option_from_text(raw_text, &FitnessDeclaration::ALL, fitness_positions, window))
        .or_else(|| crossed_out_verdict(segments));

    if let Some(declaration) = declaration {
        debug!(declaration = %declaration, "fitness declaration resolved");
    }
    declaration
}

/// Resolves the examination type.
pub fn detect_examination_type(
    tables: &[Table],
    segments: &[Segment],
    raw_text: &str,
    window: usize,
) -> Option<ExaminationType> {
    let from_tables = |wanted: TableType| {
        tables
            .iter()
            .filter(move |t| t.table_type == wanted)
            .find_map(|t| option_from_table(t, &ExaminationType::ALL, cell_matches_exam_type))
    };

    let kind = from_tables(TableType::ExaminationType)
        .or_else(|| {
            segments
                .iter()
                .filter(|s| s.section_kind() == Some(SectionKind::ExaminationType))
                .find_map(|s| option_from_text(&s.content, &ExaminationType::ALL, exam_type_positions, window))
        })
        .or_else(|| from_tables(TableType::Unknown))
        .or_else(|| {
            segments
                .iter()
                .filter(|s| {
                    matches!(s.kind, SegmentKind::Section(kind)
                        if kind != SectionKind::ExaminationType)
                })
                .find_map(|s| option_from_text(&s.content, &ExaminationType::ALL, exam_type_positions, window))
        })
        .or_else(|| option_from_text(raw_text, &ExaminationType::ALL, exam_type_positions, window));

    if let Some(kind) = kind {
        debug!(examination_type = %kind, "examination type resolved");
    }
    kind
}

/// A figure description of the FIT verdict being crossed out or
/// negated reads as `unfit`.
fn crossed_out_verdict(segments: &[Segment]) -> Option<FitnessDeclaration> {
    segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Figure)
        .any(|s| {
            !checkbox::name_positions(&s.content, "FIT").is_empty()
                && patterns::CROSSED_OUT.is_match(&s.content)
        })
        .then_some(FitnessDeclaration::Unfit)
}

/// Picks the checked option out of a table, trying the header-column
/// layout first (options as headers, markers in the data row) and the
/// row layout second (option label cell plus a marked sibling cell).
fn option_from_table<T: Copy>(
    table: &Table,
    options: &[T],
    cell_matches: fn(&str, T) -> bool,
) -> Option<T> {
    for &option in options {
        if let Some(idx) = table.headers.iter().position(|h| cell_matches(h, option)) {
            let marked = table
                .rows
                .iter()
                .any(|row| row.get(idx).is_some_and(|cell| checkbox::has_marker(cell)));
            if marked {
                return Some(option);
            }
        }
    }
    for &option in options {
        for row in &table.rows {
            let Some(idx) = row.iter().position(|cell| cell_matches(cell, option)) else {
                continue;
            };
            let marked = row
                .iter()
                .enumerate()
                .any(|(i, cell)| i != idx && checkbox::has_marker(cell));
            if marked {
                return Some(option);
            }
        }
    }
    None
}

/// Picks the first option with positive in-text evidence. Lines pairing
/// an option with `[ ]` rule that option out before the window pass.
fn option_from_text<T: Copy>(
    text: &str,
    options: &[T],
    positions: fn(&str, T) -> Vec<(usize, usize)>,
    window: usize,
) -> Option<T> {
    for &option in options {
        match option_selected(text, option, positions, window) {
            Some(true) => return Some(option),
            _ => continue,
        }
    }
    None
}

fn option_selected<T: Copy>(
    text: &str,
    option: T,
    positions: fn(&str, T) -> Vec<(usize, usize)>,
    window: usize,
) -> Option<bool> {
    let hits = positions(text, option);
    if hits.is_empty() {
        return None;
    }

    let mut saw_unchecked = false;
    for line in text.lines() {
        if positions(line, option).is_empty() {
            continue;
        }
        if checkbox::has_marker(line) {
            return Some(true);
        }
        if patterns::EMPTY_MARKER.is_match(line) {
            saw_unchecked = true;
        }
    }
    if saw_unchecked {
        return Some(false);
    }

    for (start, end) in hits {
        let scope = checkbox::window_around(text, start, end, window);
        if checkbox::has_marker(scope) || patterns::DESCRIPTIVE_SELECTED.is_match(scope) {
            return Some(true);
        }
    }
    None
}

/// Whole-word occurrences of a fitness option's labels. "FIT" followed
/// by "with ..." belongs to the longer options and is excluded here.
fn fitness_positions(text: &str, option: FitnessDeclaration) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for name in option.alternate_names() {
        for (start, end) in checkbox::name_positions(text, name) {
            if option == FitnessDeclaration::Fit && followed_by_with(text, end) {
                continue;
            }
            out.push((start, end));
        }
    }
    out
}

fn exam_type_positions(text: &str, option: ExaminationType) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for name in option.alternate_names() {
        out.extend(checkbox::name_positions(text, name));
    }
    out
}

fn followed_by_with(text: &str, end: usize) -> bool {
    text[end..]
        .trim_start_matches(|c: char| c == '*' || c == ':' || c == '_' || c.is_whitespace())
        .to_ascii_lowercase()
        .starts_with("with")
}

fn cell_matches_fitness(cell: &str, option: FitnessDeclaration) -> bool {
    let cell = cell.to_uppercase();
    match option {
        FitnessDeclaration::Fit => {
            cell.contains("FIT") && !cell.contains("UNFIT") && !cell.contains("WITH")
        }
        FitnessDeclaration::FitWithRestriction => cell.contains("FIT WITH RESTRICTION"),
        FitnessDeclaration::FitWithCondition => cell.contains("FIT WITH CONDITION"),
        FitnessDeclaration::TemporaryUnfit => {
            cell.contains("TEMPORARY UNFIT") || cell.contains("TEMPORARILY UNFIT")
        }
        FitnessDeclaration::Unfit => cell.contains("UNFIT") && !cell.contains("TEMPORAR"),
    }
}

fn cell_matches_exam_type(cell: &str, option: ExaminationType) -> bool {
    checkbox::contains_any(cell, option.alternate_names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{extract_segments, extract_tables};
    use pretty_assertions::assert_eq;

    fn fitness(text: &str) -> Option<FitnessDeclaration> {
        let tables = extract_tables(text);
        let segments = extract_segments(text);
        detect_fitness(&tables, &segments, text, checkbox::MARKER_WINDOW)
    }

    fn exam_type(text: &str) -> Option<ExaminationType> {
        let tables = extract_tables(text);
        let segments = extract_segments(text);
        detect_examination_type(&tables, &segments, text, checkbox::MARKER_WINDOW)
    }

    #[test]
    fn header_column_fitness_table() {
        let text = "\
| FIT | Fit with Restriction | Fit with Condition | Temporary Unfit | UNFIT |
|-----|----------------------|--------------------|-----------------|-------|
| [x] | [ ] | [ ] | [ ] | [ ] |
";
        assert_eq!(fitness(text), Some(FitnessDeclaration::Fit));
    }

    #[test]
    fn header_column_table_marks_later_option() {
        let text = "\
| FIT | Fit with Restriction | Fit with Condition | Temporary Unfit | UNFIT |
|-----|----------------------|--------------------|-----------------|-------|
| [ ] | [ ] | [ ] | [ ] | [x] |
";
        assert_eq!(fitness(text), Some(FitnessDeclaration::Unfit));
    }

    #[test]
    fn row_layout_fitness_table() {
        let text = "\
## Medical Fitness Declaration

| Verdict | Mark |
|---------|------|
| Fit with Restriction | ☑ |
| UNFIT | |
";
        assert_eq!(fitness(text), Some(FitnessDeclaration::FitWithRestriction));
    }

    #[test]
    fn checklist_prefers_marked_option() {
        let text = "\
## Medical Fitness Declaration

- **FIT**: [ ]
- **Temporary Unfit**: [x]
";
        assert_eq!(fitness(text), Some(FitnessDeclaration::TemporaryUnfit));
    }

    #[test]
    fn fit_does_not_fire_inside_longer_options() {
        let text = "- **Fit with Condition**: [x]\n";
        assert_eq!(fitness(text), Some(FitnessDeclaration::FitWithCondition));
    }

    #[test]
    fn crossed_out_figure_reads_unfit() {
        let text = "\
## Figure Description
The word FIT is crossed out with a large X that spans the cell.
";
        assert_eq!(fitness(text), Some(FitnessDeclaration::Unfit));
    }

    #[test]
    fn examination_type_from_checklist() {
        let text = "\
- **Pre-Employment**: [x]
- **Periodical**: [ ]
- **Exit**: [ ]
";
        assert_eq!(exam_type(text), Some(ExaminationType::PreEmployment));
    }

    #[test]
    fn examination_type_later_option_checked() {
        let text = "\
- **Pre-Employment**: [ ]
- **Periodical**: [x]
- **Exit**: [ ]
";
        assert_eq!(exam_type(text), Some(ExaminationType::Periodical));
    }

    #[test]
    fn no_evidence_resolves_nothing() {
        assert_eq!(fitness("routine physical, outcome pending"), None);
        assert_eq!(exam_type("scheduling notes only"), None);
    }
}
