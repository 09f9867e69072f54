//! Shared compiled regex patterns for certificate extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// HTML comments injected by OCR post-processing.
    pub static ref HTML_COMMENT: Regex = Regex::new(r"<!--[\s\S]*?-->").unwrap();

    /// A whole `<table>...</table>` block.
    pub static ref HTML_TABLE: Regex = Regex::new(r"(?is)<table[^>]*>[\s\S]*?</table>").unwrap();

    /// One `<tr>...</tr>` row.
    pub static ref HTML_TABLE_ROW: Regex = Regex::new(r"(?is)<tr[^>]*>([\s\S]*?)</tr>").unwrap();

    /// One `<th>` header cell, capture = inner text.
    pub static ref HTML_TABLE_HEADER: Regex =
        Regex::new(r"(?is)<th[^>]*>([\s\S]*?)</th>").unwrap();

    /// One `<td>` data cell, capture = inner text.
    pub static ref HTML_TABLE_CELL: Regex = Regex::new(r"(?is)<td[^>]*>([\s\S]*?)</td>").unwrap();

    /// Residual tags when flattening cell content.
    pub static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();

    /// Markdown pipe table: header row, alignment row, one or more data
    /// rows.
    pub static ref PIPE_TABLE: Regex =
        Regex::new(r"\|(.+)\|\s*\n\|([-:|\s]+)\|\s*\n((?:\|.*\|\s*(?:\n|$))+)").unwrap();

    /// A markdown heading line. Captures: hashes, title.
    pub static ref HEADING: Regex = Regex::new(r"(?m)^(#{1,6})[ \t]+(.+?)[ \t]*$").unwrap();

    /// Markdown image reference. Captures: alt text, target.
    pub static ref IMAGE_REF: Regex = Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").unwrap();

    /// `**Key**: value` pair.
    pub static ref BOLD_KEY_VALUE: Regex =
        Regex::new(r"\*\*([^:\n*]+?)\*\*\s*:\s*([^\n]+)").unwrap();

    /// Plain `Key: value` line (key restricted to label-ish text).
    pub static ref PLAIN_KEY_VALUE: Regex =
        Regex::new(r"(?m)^\s*([A-Za-z][A-Za-z0-9 &/.-]*[A-Za-z.])\s*:\s*([^\n]+)$").unwrap();

    /// Loose `key: value` used inside dedicated key-value blocks.
    pub static ref KV_LINE: Regex = Regex::new(r"(?m)^([^:\n]+?)\s*:\s*(.+)$").unwrap();

    /// Positive checkbox markers: `[x]`, `[X]`, tick glyphs.
    pub static ref CHECKED_MARKER: Regex = Regex::new(r"\[[xX]\]|[✓☑☒]").unwrap();

    /// Explicit empty checkbox.
    pub static ref EMPTY_MARKER: Regex = Regex::new(r"\[\s*\]").unwrap();

    /// Completion words accepted alongside markers.
    pub static ref DONE_WORD: Regex = Regex::new(r"\b(?:Done|DONE|Yes|YES)\b").unwrap();

    /// Prose describing a filled checkbox near a label.
    pub static ref DESCRIPTIVE_SELECTED: Regex = Regex::new(
        r"(?i)is\s+(?:selected|checked|marked|ticked|filled)|checkbox\s+is\s+filled|option\s+is\s+marked|indicating\s+(?:it\s+is\s+)?selected",
    )
    .unwrap();

    /// Snellen fraction, e.g. `20/20` or `6/6`.
    pub static ref SNELLEN: Regex = Regex::new(r"\b\d{1,2}\s*/\s*\d{1,2}\b").unwrap();

    /// Result label near a test name.
    pub static ref RESULT_LABEL: Regex =
        Regex::new(r"(?i)\bresults?\s*:\s*([^\n|,\]]+)").unwrap();

    /// Prose stating no restriction applies.
    pub static ref NO_RESTRICTIONS: Regex = Regex::new(
        r"(?i)nothing\s+(?:was|is)\s+ticked|no\s+ticks|none\s+(?:are|is|were)\s+applied|no\s+restrictions?\s+(?:are|is|were)?\s*(?:applied|applicable|indicated)",
    )
    .unwrap();

    /// Figure prose describing a struck-through option.
    pub static ref CROSSED_OUT: Regex = Regex::new(
        r"(?i)crossed\s*(?:-|\s)?out|struck\s+through|X\s+(?:that\s+)?spans|negated|marked\s+as\s+incorrect",
    )
    .unwrap();

    /// Generic date with day/month/year groups.
    pub static ref DATE_DMY: Regex =
        Regex::new(r"\b(\d{1,2})[-./ ](\d{1,2})[-./ ](\d{2,4})\b").unwrap();

    /// Inline emphasis markers stripped during normalization.
    pub static ref EMPHASIS: Regex = Regex::new(r"\*\*|__").unwrap();

    /// Runs of whitespace collapsed to a single space.
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_marker_variants() {
        for sample in ["[x]", "[X]", "✓", "☑", "☒"] {
            assert!(CHECKED_MARKER.is_match(sample), "should match {sample}");
        }
        assert!(!CHECKED_MARKER.is_match("[ ]"));
        assert!(EMPTY_MARKER.is_match("[ ]"));
    }

    #[test]
    fn pipe_table_shape() {
        let text = "| Test | Done |\n|------|------|\n| BLOODS | [x] |\n";
        assert!(PIPE_TABLE.is_match(text));
        // no data row -> no table
        assert!(!PIPE_TABLE.is_match("| Test | Done |\n|------|------|\n"));
    }

    #[test]
    fn snellen_and_result_cues() {
        assert!(SNELLEN.is_match("vision recorded at 20/20 both eyes"));
        assert!(!SNELLEN.is_match("section 120/200 of the act"));
        let caps = RESULT_LABEL.captures("Hearing Result: Normal\n").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str().trim(), "Normal");
    }

    #[test]
    fn no_restrictions_phrases() {
        for sample in [
            "nothing was ticked in this section",
            "there are no ticks",
            "none are applied",
            "No restrictions applicable",
        ] {
            assert!(NO_RESTRICTIONS.is_match(sample), "should match {sample}");
        }
    }
}
