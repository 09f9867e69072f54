//! Pipeline orchestration: document text in, normalized record out.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::certificate::rules::{checkbox, exams, fields, fitness, patterns, restrictions};
use crate::error::{ExtractionError, Result};
use crate::models::certificate::CertificateRecord;
use crate::models::envelope::DocumentEnvelope;
use crate::normalize;
use crate::segment::{self, Segment, extract_key_values, extract_segments, extract_tables};

/// Extraction behind a trait so callers can swap the engine in tests.
pub trait CertificateExtractor {
    /// Extracts from raw document text. Total: never fails, never
    /// panics; hopeless input yields the minimal fallback record.
    fn extract_from_text(&self, text: &str) -> CertificateRecord;

    /// Extracts from an envelope, falling back to evidence captions
    /// when no markdown is present.
    fn extract(&self, envelope: &DocumentEnvelope) -> CertificateRecord {
        match envelope.document_text() {
            Some(text) => self.extract_from_text(&text),
            None => {
                warn!("envelope carries no document text");
                CertificateRecord::fallback(&ExtractionError::NoData.to_string())
            }
        }
    }
}

/// Detailed outcome of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub record: CertificateRecord,
    /// Advisory notes, e.g. required fields that stayed empty.
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
}

/// The rule-based extraction engine.
///
/// Stages: segment extraction, scalar field location, checkbox/test
/// detection with source-priority conflict resolution, normalization.
#[derive(Debug, Clone)]
pub struct CertificateParser {
    marker_window: usize,
}

impl CertificateParser {
    pub fn new() -> Self {
        CertificateParser { marker_window: checkbox::MARKER_WINDOW }
    }

    /// Overrides the character window used for marker adjacency.
    pub fn with_marker_window(mut self, window: usize) -> Self {
        self.marker_window = window;
        self
    }

    /// Runs the full pipeline, reporting warnings and timing alongside
    /// the record.
    pub fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let started = Instant::now();
        let cleaned = patterns::HTML_COMMENT.replace_all(text, " ").into_owned();

        let segments = extract_segments(&cleaned);
        let tables = extract_tables(&cleaned);
        let kv_blocks = segment::key_value_blocks(&segments);
        let pairs = extract_key_values(&cleaned, &kv_blocks);
        debug!(
            segments = segments.len(),
            tables = tables.len(),
            pairs = pairs.len(),
            "document segmented"
        );

        let section_texts: Vec<&str> = segments
            .iter()
            .filter(|s| matches!(s.kind, segment::SegmentKind::Section(_)))
            .map(|s| s.content.as_str())
            .collect();

        let mut record = CertificateRecord::new();
        record.name = fields::locate(&fields::NAME, &pairs, &section_texts, &cleaned);
        record.id_number = fields::locate(&fields::ID_NUMBER, &pairs, &section_texts, &cleaned);
        record.company = fields::locate(&fields::COMPANY, &pairs, &section_texts, &cleaned);
        record.exam_date = fields::locate(&fields::EXAM_DATE, &pairs, &section_texts, &cleaned);
        record.expiry_date =
            fields::locate(&fields::EXPIRY_DATE, &pairs, &section_texts, &cleaned);
        record.job = fields::locate(&fields::JOB, &pairs, &section_texts, &cleaned);
        record.referral = fields::locate(&fields::REFERRAL, &pairs, &section_texts, &cleaned);
        record.review_date =
            fields::locate(&fields::REVIEW_DATE, &pairs, &section_texts, &cleaned);
        record.comments = fields::locate(&fields::COMMENTS, &pairs, &section_texts, &cleaned);

        if let Some(kind) =
            fitness::detect_examination_type(&tables, &segments, &cleaned, self.marker_window)
        {
            record.examination_type = kind.key().to_string();
        }
        let findings = exams::detect_exams(&tables, &segments, &cleaned, self.marker_window);
        record.medical_exams = findings.exams;
        record.medical_results = findings.results;
        record.restrictions =
            restrictions::detect_restrictions(&tables, &segments, &cleaned, self.marker_window);
        if let Some(declaration) =
            fitness::detect_fitness(&tables, &segments, &cleaned, self.marker_window)
        {
            record.fitness_declaration = declaration.key().to_string();
        }

        let record = normalize::normalize_record(record);
        let warnings = record
            .missing_fields()
            .into_iter()
            .map(|field| format!("required field '{field}' not found"))
            .collect::<Vec<_>>();
        for warning in &warnings {
            warn!("{warning}");
        }

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(elapsed_ms = processing_time_ms, "certificate extraction finished");
        Ok(ExtractionResult { record, warnings, processing_time_ms })
    }

    /// Segments kept around for callers that inspect structure.
    pub fn segment_document(&self, text: &str) -> Vec<Segment> {
        extract_segments(text)
    }
}

impl Default for CertificateParser {
    fn default() -> Self {
        CertificateParser::new()
    }
}

impl CertificateExtractor for CertificateParser {
    fn extract_from_text(&self, text: &str) -> CertificateRecord {
        match self.parse(text) {
            Ok(outcome) => outcome.record,
            Err(e) => {
                warn!(error = %e, "extraction failed, emitting fallback record");
                CertificateRecord::fallback(&format!("extraction failed: {e}"))
            }
        }
    }
}
