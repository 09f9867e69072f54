//! Key-value pair harvesting.
//!
//! Pairs come from three places: dedicated "Key-Value Pair" blocks,
//! `**Key**: value` bold pairs anywhere, and plain `Key: value` lines.
//! Later duplicates of a key are ignored so the most explicit source
//! wins.

use tracing::debug;

use crate::certificate::rules::patterns;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

/// Harvests key-value pairs from `text` in source-priority order:
/// dedicated blocks first, then bold pairs, then plain lines.
pub fn extract_key_values(text: &str, kv_blocks: &[&str]) -> Vec<KeyValuePair> {
    let mut pairs: Vec<KeyValuePair> = Vec::new();

    for block in kv_blocks {
        for caps in patterns::KV_LINE.captures_iter(block) {
            push_pair(&mut pairs, &caps[1], &caps[2]);
        }
    }
    for caps in patterns::BOLD_KEY_VALUE.captures_iter(text) {
        push_pair(&mut pairs, &caps[1], &caps[2]);
    }
    for caps in patterns::PLAIN_KEY_VALUE.captures_iter(text) {
        push_pair(&mut pairs, &caps[1], &caps[2]);
    }

    debug!(count = pairs.len(), "harvested key-value pairs");
    pairs
}

fn push_pair(pairs: &mut Vec<KeyValuePair>, key: &str, value: &str) {
    let key = key.replace("**", "").trim().to_string();
    let value = value.replace("**", "").trim().to_string();
    if key.is_empty() || value.is_empty() {
        return;
    }
    // URLs and markdown artifacts are not field labels
    if key.contains("http") || key.contains('|') || key.starts_with('#') {
        return;
    }
    if pairs.iter().any(|p| p.key.eq_ignore_ascii_case(&key)) {
        return;
    }
    pairs.push(KeyValuePair { key, value });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn harvests_bold_and_plain_pairs() {
        let text = "\
**Initials & Surname**: T.A. Nkosi
Company Name: Bluff Mining Ltd
Job Title: Drill Operator
";
        let pairs = extract_key_values(text, &[]);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].key, "Initials & Surname");
        assert_eq!(pairs[0].value, "T.A. Nkosi");
        assert_eq!(pairs[1].key, "Company Name");
    }

    #[test]
    fn dedicated_blocks_win_over_later_duplicates() {
        let block = "ID NO: 8501015800085\nPosition: Fitter";
        let text = "ID NO: 0000000000000\n";
        let pairs = extract_key_values(text, &[block]);
        let id = pairs.iter().find(|p| p.key == "ID NO").unwrap();
        assert_eq!(id.value, "8501015800085");
    }

    #[test]
    fn skips_urls_and_empty_values() {
        let text = "see https://example.com/page: broken\nComments: \n";
        let pairs = extract_key_values(text, &[]);
        assert!(pairs.is_empty());
    }
}
