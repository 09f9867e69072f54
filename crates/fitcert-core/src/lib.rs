//! fitcert-core: certificate-of-fitness field extraction.
//!
//! Turns markdown-ish OCR output of an occupational medical fitness
//! certificate into a normalized [`CertificateRecord`]. The pipeline
//! runs five stages over the input text:
//!
//! 1. segment extraction (tables, key-value blocks, headed sections,
//!    figures),
//! 2. scalar field location via ordered label aliases,
//! 3. checkbox/test detection over alternate-name lists,
//! 4. conflict resolution across evidence sources,
//! 5. normalization (markup stripping, ID grouping, date formatting).
//!
//! Extraction is total: missing evidence produces defaults, and even a
//! catastrophic failure yields a minimal fallback record rather than
//! an error.
//!
//! ```
//! use fitcert_core::{CertificateExtractor, CertificateParser};
//!
//! let parser = CertificateParser::new();
//! let record = parser.extract_from_text("**ID NO**: 8501015800085");
//! assert_eq!(record.id_number, "850101 5800 085");
//! ```

pub mod certificate;
pub mod error;
pub mod models;
pub mod normalize;
pub mod segment;

pub use certificate::{CertificateExtractor, CertificateParser, ExtractionResult};
pub use error::{ExtractionError, Result};
pub use models::certificate::{
    CertificateRecord, ExaminationType, FitnessDeclaration, RestrictionItem, TestItem,
    map_to_certificate_fields,
};
pub use models::envelope::{DocumentEnvelope, EvidenceChunk};
pub use segment::{Segment, SegmentKind, Table, TableType};
