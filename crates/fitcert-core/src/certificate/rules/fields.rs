//! Field Locator: scalar fields via ordered label aliases.
//!
//! Each field carries its label aliases most-specific first ("Initials
//! & Surname" before "Name"), and is resolved through a four-step
//! cascade: exact key-value match, partial key-value match, labeled
//! value inside section content, labeled value anywhere in the raw
//! text. The first non-empty hit wins; unresolved fields stay empty.

use regex::Regex;
use tracing::debug;

use crate::segment::keyvalue::KeyValuePair;

/// One scalar field and its label aliases, in match-priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub labels: &'static [&'static str],
}

pub const NAME: FieldSpec = FieldSpec {
    name: "name",
    labels: &["Initials & Surname", "Patient Name", "Full Name", "Employee", "Name"],
};

pub const ID_NUMBER: FieldSpec = FieldSpec {
    name: "id_number",
    labels: &["ID NO", "ID Number", "Identity Number", "National ID", "ID"],
};

pub const COMPANY: FieldSpec = FieldSpec {
    name: "company",
    labels: &["Company Name", "Employer", "Organization", "Company"],
};

pub const EXAM_DATE: FieldSpec = FieldSpec {
    name: "exam_date",
    labels: &[
        "Date of Examination",
        "Examination Date",
        "Exam Date",
        "Date of Medical",
        "Assessment Date",
    ],
};

pub const EXPIRY_DATE: FieldSpec = FieldSpec {
    name: "expiry_date",
    labels: &["Expiry Date", "Valid Until", "Expires On", "Expiration Date", "Valid To"],
};

pub const JOB: FieldSpec = FieldSpec {
    name: "job",
    labels: &["Job Title", "Position", "Occupation", "Designation", "Role"],
};

pub const REFERRAL: FieldSpec = FieldSpec {
    name: "referral",
    labels: &["Referred or follow up actions", "Referral", "Follow Up Actions"],
};

pub const REVIEW_DATE: FieldSpec = FieldSpec {
    name: "review_date",
    labels: &["Review Date", "Next Review", "Follow Up Date"],
};

pub const COMMENTS: FieldSpec = FieldSpec {
    name: "comments",
    labels: &["Comments", "Additional Notes", "Remarks"],
};

/// All scalar fields of the record.
pub const ALL_FIELDS: [FieldSpec; 9] = [
    NAME, ID_NUMBER, COMPANY, EXAM_DATE, EXPIRY_DATE, JOB, REFERRAL, REVIEW_DATE, COMMENTS,
];

/// Resolves one scalar field. `section_texts` holds the content of
/// every headed section, in document order.
pub fn locate(
    spec: &FieldSpec,
    pairs: &[KeyValuePair],
    section_texts: &[&str],
    raw_text: &str,
) -> String {
    // 1. exact key match, label priority outermost
    for label in spec.labels {
        for pair in pairs {
            if pair.key.eq_ignore_ascii_case(label) && usable(&pair.value) {
                return pair.value.clone();
            }
        }
    }

    // 2. partial key match either way round
    for label in spec.labels {
        let label_lower = label.to_lowercase();
        for pair in pairs {
            let key_lower = pair.key.to_lowercase();
            if (key_lower.contains(&label_lower) || label_lower.contains(&key_lower))
                && usable(&pair.value)
            {
                return pair.value.clone();
            }
        }
    }

    // 3. labeled value inside section content
    for label in spec.labels {
        for section in section_texts {
            if let Some(value) = labeled_value(section, label) {
                return value;
            }
        }
    }

    // 4. labeled value anywhere in the document
    for label in spec.labels {
        if let Some(value) = labeled_value(raw_text, label) {
            return value;
        }
    }

    debug!(field = spec.name, "field not found, defaulting to empty");
    String::new()
}

/// `Label: value` with optional bold markup around the label.
fn labeled_value(text: &str, label: &str) -> Option<String> {
    let escaped = regex::escape(label);
    let pattern = format!(r"(?im)(?:\*\*)?{escaped}(?:\*\*)?\s*:\s*([^\n]+)");
    // label aliases are static and escape cleanly
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("**", "").trim().to_string())
        .filter(|value| usable(value))
}

fn usable(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.starts_with('#') && value != "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(key: &str, value: &str) -> KeyValuePair {
        KeyValuePair { key: key.to_string(), value: value.to_string() }
    }

    #[test]
    fn exact_key_match_respects_label_priority() {
        let pairs = vec![pair("Name", "Wrong Pick"), pair("Initials & Surname", "T.A. Nkosi")];
        assert_eq!(locate(&NAME, &pairs, &[], ""), "T.A. Nkosi");
    }

    #[test]
    fn partial_key_match() {
        let pairs = vec![pair("Employee ID Number", "8501015800085")];
        assert_eq!(locate(&ID_NUMBER, &pairs, &[], ""), "8501015800085");
    }

    #[test]
    fn falls_back_to_section_then_raw_text() {
        let section = "**Company Name**: Bluff Mining Ltd";
        assert_eq!(locate(&COMPANY, &[], &[section], ""), "Bluff Mining Ltd");

        let raw = "somewhere in prose\nOccupation: Drill Operator\n";
        assert_eq!(locate(&JOB, &[], &[], raw), "Drill Operator");
    }

    #[test]
    fn unresolved_field_is_empty() {
        assert_eq!(locate(&EXPIRY_DATE, &[], &[], "no dates here"), "");
    }

    #[test]
    fn skips_unusable_values() {
        let pairs = vec![pair("Review Date", "-")];
        let raw = "Review Date: -\nNext Review: 26.01.2025\n";
        assert_eq!(locate(&REVIEW_DATE, &pairs, &[], raw), "26.01.2025");
    }
}
