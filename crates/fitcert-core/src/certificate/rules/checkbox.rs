//! Generic checkbox/completion detection.
//!
//! One engine serves tests, restrictions, fitness options and
//! examination types. Every detectable item supplies its alternate
//! label list; the engine answers "is this item marked here, and with
//! what result" using a fixed strategy cascade:
//!
//! 1. a label sharing a line with a positive marker (or an explicit
//!    empty `[ ]`, which is a definitive *no*),
//! 2. table cells adjacent to the label cell,
//! 3. a positive marker within a bounded window around the label,
//! 4. prose describing the checkbox as selected,
//! 5. numeric cues (Snellen fractions, "Normal") for vision items.

use crate::certificate::rules::patterns;
use crate::segment::table::Table;

/// Marker search window in characters around a matched label.
pub const MARKER_WINDOW: usize = 150;

/// Outcome of one detection: marked or not, plus an optional result
/// reading. `done == false` is a definitive negative, not absence of
/// evidence; absence is `None` at the call sites.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub done: bool,
    pub result: Option<String>,
}

impl Detection {
    pub fn done() -> Self {
        Detection { done: true, result: None }
    }

    pub fn not_done() -> Self {
        Detection { done: false, result: None }
    }

    pub fn with_result(result: impl Into<String>) -> Self {
        Detection { done: true, result: Some(result.into()) }
    }
}

/// True when `value` is a placeholder rather than a real reading.
pub fn is_placeholder(value: &str) -> bool {
    matches!(value.trim(), "" | "-" | "–" | "N/A" | "n/a" | "NA" | "na")
}

/// Case-insensitive whole-word search for `name` in `text`.
/// Returns byte ranges of every occurrence.
pub fn name_positions(text: &str, name: &str) -> Vec<(usize, usize)> {
    let haystack = text.to_ascii_lowercase();
    let needle = name.to_ascii_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    haystack
        .match_indices(&needle)
        .filter(|(start, matched)| {
            let end = start + matched.len();
            let before_ok = text[..*start]
                .chars()
                .next_back()
                .map(|c| !c.is_alphanumeric())
                .unwrap_or(true);
            let after_ok = text[end..]
                .chars()
                .next()
                .map(|c| !c.is_alphanumeric())
                .unwrap_or(true);
            before_ok && after_ok
        })
        .map(|(start, matched)| (start, start + matched.len()))
        .collect()
}

/// First whole-word occurrence of any of `names`.
pub fn contains_any(text: &str, names: &[&str]) -> bool {
    names.iter().any(|name| !name_positions(text, name).is_empty())
}

/// True when `text` holds a positive marker or completion word.
pub fn has_marker(text: &str) -> bool {
    patterns::CHECKED_MARKER.is_match(text) || patterns::DONE_WORD.is_match(text)
}

/// Window of `window` characters either side of the byte range,
/// snapped to char boundaries (tick glyphs are multi-byte).
pub fn window_around<'a>(text: &'a str, start: usize, end: usize, window: usize) -> &'a str {
    let lo = snap_floor(text, start.saturating_sub(window));
    let hi = snap_ceil(text, (end + window).min(text.len()));
    &text[lo..hi]
}

fn snap_floor(text: &str, mut i: usize) -> usize {
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn snap_ceil(text: &str, mut i: usize) -> usize {
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Strategy 1: a line holding both the label and a marker. An explicit
/// `[ ]` on the label's line is a definitive negative.
pub fn line_detection(text: &str, names: &[&str]) -> Option<Detection> {
    let mut saw_unchecked = false;
    for line in text.lines() {
        if !contains_any(line, names) {
            continue;
        }
        if has_marker(line) {
            let result = patterns::RESULT_LABEL
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|v| !is_placeholder(v));
            return Some(Detection { done: true, result });
        }
        if patterns::EMPTY_MARKER.is_match(line) {
            saw_unchecked = true;
        }
    }
    if saw_unchecked { Some(Detection::not_done()) } else { None }
}

/// Strategy 3: any positive marker within the window around a label
/// occurrence.
pub fn marker_near_name(text: &str, names: &[&str], window: usize) -> bool {
    names.iter().any(|name| {
        name_positions(text, name)
            .into_iter()
            .any(|(start, end)| has_marker(window_around(text, start, end, window)))
    })
}

/// Strategy 4: prose describing a selected checkbox near a label.
pub fn descriptive_near_name(text: &str, names: &[&str], window: usize) -> bool {
    names.iter().any(|name| {
        name_positions(text, name).into_iter().any(|(start, end)| {
            patterns::DESCRIPTIVE_SELECTED.is_match(window_around(text, start, end, window))
        })
    })
}

/// Strategy 5 (vision family only): a Snellen fraction or the word
/// "Normal" near the label counts as a completed test with a result.
pub fn numeric_cue_near_name(text: &str, names: &[&str], window: usize) -> Option<String> {
    for name in names {
        for (start, end) in name_positions(text, name) {
            let scope = window_around(text, start, end, window);
            if let Some(m) = patterns::SNELLEN.find(scope) {
                return Some(m.as_str().trim().to_string());
            }
            if !name_positions(scope, "Normal").is_empty() {
                return Some("Normal".to_string());
            }
        }
    }
    None
}

/// Strategy 2: the label in a table row, evidence in sibling cells.
///
/// Columns named "done"/"result" are preferred; otherwise the cells
/// right of the label cell are read positionally. A non-placeholder
/// result cell counts as completion even without a marker.
pub fn table_row_detection(table: &Table, names: &[&str]) -> Option<Detection> {
    let done_col = table.column_by_header("done");
    let result_col = table
        .column_by_header("result")
        .or_else(|| table.column_by_header("status"));

    for row in &table.rows {
        let Some(name_idx) = row.iter().position(|cell| contains_any(cell, names)) else {
            continue;
        };
        let done_cell = done_col
            .or(Some(name_idx + 1))
            .and_then(|idx| row.get(idx))
            .map(String::as_str);
        let result_cell = result_col
            .or(Some(name_idx + 2))
            .and_then(|idx| row.get(idx))
            .map(String::as_str);

        let result = result_cell
            .filter(|v| !is_placeholder(v))
            .map(|v| v.trim().to_string());
        let done = done_cell.map(has_marker).unwrap_or(false)
            || result.is_some()
            || row
                .iter()
                .enumerate()
                .any(|(idx, cell)| idx != name_idx && has_marker(cell));
        return Some(Detection { done, result });
    }
    None
}

/// Full in-text cascade for one item over one text scope.
pub fn detect_in_text(
    text: &str,
    names: &[&str],
    window: usize,
    vision_family: bool,
) -> Option<Detection> {
    if !contains_any(text, names) {
        return None;
    }
    if let Some(detection) = line_detection(text, names) {
        return Some(detection);
    }
    if marker_near_name(text, names, window) || descriptive_near_name(text, names, window) {
        let result = vision_family
            .then(|| numeric_cue_near_name(text, names, window))
            .flatten();
        return Some(Detection { done: true, result });
    }
    if vision_family {
        if let Some(reading) = numeric_cue_near_name(text, names, window) {
            return Some(Detection::with_result(reading));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::table::extract_tables;
    use pretty_assertions::assert_eq;

    #[test]
    fn whole_word_label_matching() {
        assert_eq!(name_positions("HEARING test", "Hearing").len(), 1);
        // "FIT" must not fire inside "UNFIT" or "fitness"
        assert!(name_positions("declared UNFIT for duty", "FIT").is_empty());
        assert!(name_positions("fitness declaration", "FIT").is_empty());
    }

    #[test]
    fn line_with_marker_wins() {
        let text = "- **BLOODS**: [x]\n- **HEARING**: [ ]\n";
        let detection = line_detection(text, &["BLOODS"]).unwrap();
        assert!(detection.done);
        let detection = line_detection(text, &["HEARING"]).unwrap();
        assert!(!detection.done);
        assert_eq!(line_detection(text, &["X-RAY"]), None);
    }

    #[test]
    fn marker_window_is_bounded() {
        let near = "Working at Heights ........ ✓";
        assert!(marker_near_name(near, &["Working at Heights"], MARKER_WINDOW));
        let filler = "x".repeat(200);
        let far = format!("Working at Heights {filler} [x]");
        assert!(!marker_near_name(&far, &["Working at Heights"], MARKER_WINDOW));
    }

    #[test]
    fn window_slicing_survives_multibyte_neighbors() {
        let text = "✓✓✓ HEARING ✓✓✓";
        assert!(marker_near_name(text, &["HEARING"], 2));
    }

    #[test]
    fn descriptive_phrase_counts() {
        let text = "The Drug Screen checkbox is filled in on the form.";
        assert!(descriptive_near_name(text, &["Drug Screen"], MARKER_WINDOW));
        assert!(!descriptive_near_name(
            "Drug Screen described in policy",
            &["Drug Screen"],
            MARKER_WINDOW
        ));
    }

    #[test]
    fn snellen_cue_for_vision() {
        let text = "FAR, NEAR VISION recorded as 20/20 both eyes";
        assert_eq!(
            numeric_cue_near_name(text, &["FAR, NEAR VISION"], MARKER_WINDOW),
            Some("20/20".to_string())
        );
        let detection =
            detect_in_text(text, &["FAR, NEAR VISION"], MARKER_WINDOW, true).unwrap();
        assert!(detection.done);
        assert_eq!(detection.result.as_deref(), Some("20/20"));
    }

    #[test]
    fn table_row_evidence() {
        let tables = extract_tables(
            "| Test | Done | Results |\n|---|---|---|\n| BLOODS | [x] | Normal |\n| X-RAY | | N/A |\n",
        );
        let table = &tables[0];
        let bloods = table_row_detection(table, &["BLOODS"]).unwrap();
        assert!(bloods.done);
        assert_eq!(bloods.result.as_deref(), Some("Normal"));
        let xray = table_row_detection(table, &["X-RAY", "X-Ray", "X Ray"]).unwrap();
        assert!(!xray.done);
        assert_eq!(xray.result, None);
        assert_eq!(table_row_detection(table, &["HEARING"]), None);
    }

    #[test]
    fn result_cell_without_marker_implies_done() {
        let tables = extract_tables(
            "| Test | Done | Results |\n|---|---|---|\n| LUNG FUNCTION | | 85% capacity |\n",
        );
        let lung = table_row_detection(&tables[0], &["LUNG FUNCTION"]).unwrap();
        assert!(lung.done);
        assert_eq!(lung.result.as_deref(), Some("85% capacity"));
    }
}
