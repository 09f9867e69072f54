//! Normalization of extracted values. Every operation here is total:
//! unrecognized input passes through cleaned but otherwise unchanged.

use chrono::Local;

use crate::certificate::rules::patterns;
use crate::models::certificate::CertificateRecord;

/// Strips OCR markup artifacts and collapses whitespace runs.
pub fn clean_text(value: &str) -> String {
    let value = patterns::HTML_COMMENT.replace_all(value, " ");
    let value = patterns::HTML_TAG.replace_all(&value, " ");
    let value = patterns::EMPHASIS.replace_all(&value, "");
    patterns::WHITESPACE_RUN.replace_all(&value, " ").trim().to_string()
}

/// Strips everything but digits, then groups a 13-digit national ID
/// as `DDDDDD DDDD DDD`. Any other digit count stays digits-only.
pub fn format_id_number(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 13 {
        format!("{} {} {}", &digits[..6], &digits[6..10], &digits[10..])
    } else {
        digits
    }
}

/// Reformats a recognizable day/month/year as `DD.MM.YYYY`, expanding
/// 2-digit years (<50 → 20xx, otherwise 19xx). Values with no date
/// pattern pass through unchanged. The components are not validated
/// against the calendar: OCR typos keep their digits.
pub fn format_date(value: &str) -> String {
    let cleaned = clean_text(value);
    let Some(caps) = patterns::DATE_DMY.captures(&cleaned) else {
        return cleaned;
    };
    let (Ok(day), Ok(month), Ok(year)) = (
        caps[1].parse::<u32>(),
        caps[2].parse::<u32>(),
        caps[3].parse::<i32>(),
    ) else {
        return cleaned;
    };
    let year = if caps[3].len() == 2 {
        if year < 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    };
    format!("{day:02}.{month:02}.{year:04}")
}

/// Today's date in the record's date format, used by the fallback
/// record.
pub fn today_stamp() -> String {
    Local::now().format("%d.%m.%Y").to_string()
}

/// Applies the field-appropriate normalization to every scalar and
/// result value, and closes the test/restriction maps over their full
/// key sets.
pub fn normalize_record(mut record: CertificateRecord) -> CertificateRecord {
    record.name = clean_text(&record.name);
    record.id_number = format_id_number(&record.id_number);
    record.company = clean_text(&record.company);
    record.exam_date = format_date(&record.exam_date);
    record.expiry_date = format_date(&record.expiry_date);
    record.job = clean_text(&record.job);
    record.referral = clean_text(&record.referral);
    record.review_date = format_date(&record.review_date);
    record.comments = clean_text(&record.comments);

    record.medical_results = record
        .medical_results
        .into_iter()
        .map(|(test, result)| (test, clean_text(&result)))
        .filter(|(_, result)| !result.is_empty())
        .collect();

    record.close_defaults();
    record
}
